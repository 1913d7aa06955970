mod batch;
mod inspect;
mod logger;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use batch::Mode;
use inspect::Format;

#[derive(Parser)]
#[command(name = "huffarc", version)]
#[command(about = "Compress files and directories with static Huffman coding.", long_about = None)]
struct Cli {
    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into `<PATH>.huff`, or a directory into `<PATH>.huff/`
    Encode {
        path: PathBuf,
        /// Write here instead of the derived `.huff` path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a `.huff` file or directory next to it, without the extension
    Decode {
        path: PathBuf,
        /// Write here instead of the derived path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the counts and codes stored in a compressed file
    Inspect {
        file: PathBuf,
        /// `text` for a table, `msgpack` for the code book on stdout
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Encode { path, output } => batch::run(Mode::Encode, &path, output.as_deref()),
        Commands::Decode { path, output } => batch::run(Mode::Decode, &path, output.as_deref()),
        Commands::Inspect { file, format } => {
            inspect::run(&file, format).map(|()| batch::Report::default())
        }
    };

    match result {
        Ok(report) if report.failed == 0 => ExitCode::SUCCESS,
        Ok(report) => {
            error!(
                failed = report.failed,
                processed = report.processed,
                "some files could not be processed"
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

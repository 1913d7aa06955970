use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

// Initializer for logger
pub fn init(verbose: u8, quiet: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("huffarc: could not set up logging: {e}");
    }
}

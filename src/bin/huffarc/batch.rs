//! File and directory driver around the library's stream entry points.

use anyhow::{bail, Context};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use huffarc::Stats;

pub const EXTENSION: &str = ".huff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub processed: usize,
    pub failed: usize,
}

/// Output path used when none is given: encoding appends `.huff` to the file
/// name, decoding drops the first `.huff` from it. Parent directories are
/// left alone.
pub fn derived_output(mode: Mode, input: &Path) -> anyhow::Result<PathBuf> {
    let Some(name) = input.file_name() else {
        bail!("{} has no file name; pass --output", input.display());
    };
    match mode {
        Mode::Encode => {
            if name.to_string_lossy().contains(EXTENSION) {
                bail!("{} is already a {EXTENSION} archive", input.display());
            }
            let mut out = name.to_os_string();
            out.push(EXTENSION);
            Ok(input.with_file_name(out))
        }
        Mode::Decode => {
            let Some(name) = name.to_str() else {
                bail!("{} is not valid UTF-8; pass --output", input.display());
            };
            if !name.contains(EXTENSION) {
                bail!("{} is not a {EXTENSION} archive", input.display());
            }
            let stripped = name.replacen(EXTENSION, "", 1);
            if stripped.is_empty() {
                bail!("{} leaves no name without {EXTENSION}; pass --output", input.display());
            }
            Ok(input.with_file_name(stripped))
        }
    }
}

/// Absolute form of `path` with symlinks resolved. Components that do not
/// exist yet are appended to the nearest existing ancestor.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    if let Ok(real) = fs::canonicalize(path) {
        return Ok(real);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Ok(resolve(parent)?.join(name))
        }
        _ => Ok(std::env::current_dir()?.join(path)),
    }
}

/// Refuses outputs that would clobber the input: the same file, or in
/// directory mode a directory that contains or sits inside the input tree.
fn check_overlap(input: &Path, output: &Path, dir_mode: bool) -> anyhow::Result<()> {
    let input_real = resolve(input).with_context(|| format!("resolving {}", input.display()))?;
    let output_real = resolve(output).with_context(|| format!("resolving {}", output.display()))?;

    if input_real == output_real {
        bail!("output {} is the input itself", output.display());
    }
    if dir_mode && input_real.starts_with(&output_real) {
        bail!("output {} contains the input {}", output.display(), input.display());
    }
    if dir_mode && output_real.starts_with(&input_real) {
        bail!("output {} lies inside the input {}", output.display(), input.display());
    }
    Ok(())
}

/// Processes one file, or every visible file below a directory.
///
/// In directory mode the output directory is recreated from scratch and each
/// file lands directly in it under its own name. A file that fails is logged
/// and counted; the rest still run.
pub fn run(mode: Mode, input: &Path, output: Option<&Path>) -> anyhow::Result<Report> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => derived_output(mode, input)?,
    };
    let dir_mode = input.is_dir();
    check_overlap(input, &output, dir_mode)?;

    if !dir_mode {
        let stats = process_file(mode, input, &output)?;
        log_done(mode, input, &output, &stats);
        return Ok(Report {
            processed: 1,
            failed: 0,
        });
    }

    let files = collect_files(input)
        .with_context(|| format!("listing {}", input.display()))?;
    if output.exists() {
        debug!(dir = %output.display(), "removing previous output");
        fs::remove_dir_all(&output)
            .with_context(|| format!("removing {}", output.display()))?;
    }
    fs::create_dir_all(&output).with_context(|| format!("creating {}", output.display()))?;

    let mut report = Report::default();
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = output.join(name);
        report.processed += 1;
        match process_file(mode, &file, &target) {
            Ok(stats) => log_done(mode, &file, &target, &stats),
            Err(e) => {
                error!(file = %file.display(), "{e:#}");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

fn process_file(mode: Mode, src: &Path, dst: &Path) -> anyhow::Result<Stats> {
    let source = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let sink = File::create(dst).with_context(|| format!("creating {}", dst.display()))?;

    let source = BufReader::new(source);
    let mut sink = BufWriter::new(sink);
    let stats = match mode {
        Mode::Encode => huffarc::encode_stream(source, &mut sink)
            .with_context(|| format!("encoding {}", src.display()))?,
        Mode::Decode => huffarc::decode_stream(source, &mut sink)
            .with_context(|| format!("decoding {}", src.display()))?,
    };
    sink.flush()
        .with_context(|| format!("writing {}", dst.display()))?;
    Ok(stats)
}

fn log_done(mode: Mode, src: &Path, dst: &Path, stats: &Stats) {
    match mode {
        Mode::Encode => info!(
            from = %src.display(),
            to = %dst.display(),
            bytes = stats.symbols,
            compressed = stats.compressed_len(),
            "encoded"
        ),
        Mode::Decode => info!(
            from = %src.display(),
            to = %dst.display(),
            bytes = stats.symbols,
            "decoded"
        ),
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.to_string_lossy().starts_with('.'))
}

/// Regular files below `root`, recursively, skipping hidden entries. Symlinks
/// to files are kept; symlinks to directories are not followed. Sorted so runs
/// are reproducible.
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("huffarc-{}-{}", name, std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn derived_paths() {
        assert_eq!(
            derived_output(Mode::Encode, Path::new("notes.txt")).unwrap(),
            PathBuf::from("notes.txt.huff")
        );
        assert_eq!(
            derived_output(Mode::Decode, Path::new("notes.txt.huff")).unwrap(),
            PathBuf::from("notes.txt")
        );
        assert_eq!(
            derived_output(Mode::Decode, Path::new("docs.huff")).unwrap(),
            PathBuf::from("docs")
        );
        assert!(derived_output(Mode::Encode, Path::new("a.huff")).is_err());
        assert!(derived_output(Mode::Decode, Path::new("a.txt")).is_err());
        assert!(derived_output(Mode::Decode, Path::new("dir/.huff")).is_err());
    }

    #[test]
    fn derived_paths_only_touch_the_file_name() {
        assert_eq!(
            derived_output(Mode::Decode, Path::new("a.huffx/b.huff")).unwrap(),
            PathBuf::from("a.huffx/b")
        );
        assert_eq!(
            derived_output(Mode::Encode, Path::new("x.huff/notes.txt")).unwrap(),
            PathBuf::from("x.huff/notes.txt.huff")
        );
        assert!(derived_output(Mode::Decode, Path::new("x.huff/notes.txt")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn derived_paths_keep_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new(OsStr::from_bytes(b"dir/caf\xe9.txt"));
        assert_eq!(
            derived_output(Mode::Encode, input).unwrap(),
            Path::new(OsStr::from_bytes(b"dir/caf\xe9.txt.huff"))
        );
        let packed = Path::new(OsStr::from_bytes(b"dir/caf\xe9.txt.huff"));
        assert!(derived_output(Mode::Decode, packed).is_err());
    }

    #[test]
    fn single_file_round_trip() {
        let scratch = Scratch::new("single");
        let original = scratch.0.join("poem.txt");
        fs::write(&original, b"so much depends upon a red wheel barrow").unwrap();

        let report = run(Mode::Encode, &original, None).unwrap();
        assert_eq!(report, Report { processed: 1, failed: 0 });
        let packed = scratch.0.join("poem.txt.huff");
        assert!(packed.is_file());

        fs::remove_file(&original).unwrap();
        run(Mode::Decode, &packed, None).unwrap();
        assert_eq!(
            fs::read(&original).unwrap(),
            b"so much depends upon a red wheel barrow"
        );
    }

    #[test]
    fn directory_round_trip_skips_hidden() {
        let scratch = Scratch::new("dir");
        let input = scratch.0.join("docs");
        fs::create_dir_all(input.join("nested")).unwrap();
        fs::create_dir_all(input.join(".git")).unwrap();
        fs::write(input.join("a.txt"), b"alpha alpha alpha").unwrap();
        fs::write(input.join("nested").join("b.bin"), [0u8, 1, 2, 3, 255]).unwrap();
        fs::write(input.join("empty"), b"").unwrap();
        fs::write(input.join(".hidden"), b"secret").unwrap();
        fs::write(input.join(".git").join("HEAD"), b"ref").unwrap();

        let files = collect_files(&input).unwrap();
        assert_eq!(files.len(), 3);

        let report = run(Mode::Encode, &input, None).unwrap();
        assert_eq!(report, Report { processed: 3, failed: 0 });

        let packed = scratch.0.join("docs.huff");
        assert!(packed.join("a.txt").is_file());
        assert!(packed.join("b.bin").is_file());
        assert!(!packed.join(".hidden").exists());

        fs::remove_dir_all(&input).unwrap();
        let report = run(Mode::Decode, &packed, None).unwrap();
        assert_eq!(report.failed, 0);
        assert_eq!(fs::read(input.join("a.txt")).unwrap(), b"alpha alpha alpha");
        assert_eq!(fs::read(input.join("b.bin")).unwrap(), [0u8, 1, 2, 3, 255]);
        assert_eq!(fs::read(input.join("empty")).unwrap(), b"");
    }

    #[test]
    fn bad_file_does_not_stop_the_batch() {
        let scratch = Scratch::new("partial");
        let input = scratch.0.join("in.huff");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("good"), huffarc::encode(b"fine").unwrap()).unwrap();
        fs::write(input.join("bad"), b"too short for a header").unwrap();

        let output = scratch.0.join("out");
        let report = run(Mode::Decode, &input, Some(&output)).unwrap();
        assert_eq!(report, Report { processed: 2, failed: 1 });
        assert_eq!(fs::read(output.join("good")).unwrap(), b"fine");
    }

    #[test]
    fn existing_output_directory_is_replaced() {
        let scratch = Scratch::new("replace");
        let input = scratch.0.join("src");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("one"), b"1").unwrap();

        let stale = scratch.0.join("src.huff");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("stale"), b"old").unwrap();

        run(Mode::Encode, &input, None).unwrap();
        assert!(!stale.join("stale").exists());
        assert!(stale.join("one").is_file());
    }

    #[test]
    fn output_onto_the_input_file_is_refused() {
        let scratch = Scratch::new("self");
        let original = scratch.0.join("poem.txt");
        fs::write(&original, b"this is just to say").unwrap();

        assert!(run(Mode::Encode, &original, Some(&original)).is_err());
        let same = scratch.0.join(".").join("poem.txt");
        assert!(run(Mode::Encode, &original, Some(&same)).is_err());
        assert_eq!(fs::read(&original).unwrap(), b"this is just to say");
    }

    #[test]
    fn output_directory_overlapping_the_input_is_refused() {
        let scratch = Scratch::new("overlap");
        let input = scratch.0.join("outer").join("docs");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.txt"), b"keep me").unwrap();

        let parent = scratch.0.join("outer");
        assert!(run(Mode::Encode, &input, Some(&parent)).is_err());
        assert!(run(Mode::Encode, &input, Some(&input)).is_err());
        assert!(run(Mode::Encode, &input, Some(&input.join("packed"))).is_err());

        assert_eq!(fs::read(input.join("a.txt")).unwrap(), b"keep me");
        assert!(!input.join("packed").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let scratch = Scratch::new("symlink");
        let input = scratch.0.join("tree");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.txt"), b"alpha").unwrap();
        std::os::unix::fs::symlink(&scratch.0, input.join("up")).unwrap();
        std::os::unix::fs::symlink(input.join("a.txt"), input.join("link.txt")).unwrap();

        let files = collect_files(&input).unwrap();
        assert_eq!(files, vec![input.join("a.txt"), input.join("link.txt")]);
    }
}

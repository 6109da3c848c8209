//! CLI entrypoint for bincookies.
//!
//! Maps the cookie file into memory, streams the decoded cookies to
//! stdout as JSON, and reports failures as one-line diagnostics on
//! stderr. Exit codes distinguish invocation, I/O, truncation, magic,
//! and validation failures; `RUST_LOG` enables the tracing output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use memmap2::Mmap;

use bincookies::base::error::{ErrorClass, ExportError};
use bincookies::binarycookies::container::export_json;

/// Dump a Safari binary cookie file as JSON.
#[derive(Parser, Debug)]
#[command(name = "bincookies")]
#[command(about = "Dump a Safari Cookies.binarycookies file as JSON")]
#[command(
    after_help = "Safari keeps its cookie store at:\n  ~/Library/Containers/com.apple.Safari/Data/Library/Cookies/Cookies.binarycookies"
)]
struct Cli {
    /// Path to a Cookies.binarycookies file.
    file: PathBuf,
}

// Exit codes, kept in step with the error taxonomy. Close and unmap
// failures are not observable through safe `File`/`Mmap` drops; their
// codes stay reserved.
const EXIT_BAD_INVOCATION: u8 = 1;
const EXIT_BAD_OPEN: u8 = 2;
#[allow(dead_code)]
const EXIT_BAD_CLOSE: u8 = 3;
const EXIT_BAD_STAT: u8 = 4;
const EXIT_BAD_MMAP: u8 = 5;
#[allow(dead_code)]
const EXIT_BAD_UNMAP: u8 = 6;
const EXIT_BAD_EOF: u8 = 7;
const EXIT_BAD_MAGIC: u8 = 8;
const EXIT_BAD_PARSE: u8 = 9;
// EX_IOERR, for an unwritable output sink. The original taxonomy has no
// code for this case.
const EXIT_BAD_WRITE: u8 = 74;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version output is not a bad invocation.
            return if err.use_stderr() {
                ExitCode::from(EXIT_BAD_INVOCATION)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let file = match File::open(&cli.file) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open {}: {}", cli.file.display(), err);
            return ExitCode::from(EXIT_BAD_OPEN);
        }
    };
    let metadata = match file.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            eprintln!("cannot stat {}: {}", cli.file.display(), err);
            return ExitCode::from(EXIT_BAD_STAT);
        }
    };

    // An empty file cannot be mapped on every platform; an empty slice
    // reports the same "file too short" either way.
    let mapped;
    let data: &[u8] = if metadata.len() == 0 {
        &[]
    } else {
        mapped = match unsafe { Mmap::map(&file) } {
            Ok(map) => map,
            Err(err) => {
                eprintln!("cannot mmap {}: {}", cli.file.display(), err);
                return ExitCode::from(EXIT_BAD_MMAP);
            }
        };
        &mapped
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match export_json(data, &mut out) {
        Ok(()) => match out.flush() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("cannot write output: {err}");
                ExitCode::from(EXIT_BAD_WRITE)
            }
        },
        Err(ExportError::Parse(err)) => {
            // Whatever was already emitted stays flushed; the document is
            // left incomplete on a late failure.
            let _ = out.flush();
            eprintln!("{err}");
            ExitCode::from(match err.class() {
                ErrorClass::Truncated => EXIT_BAD_EOF,
                ErrorClass::MagicMismatch => EXIT_BAD_MAGIC,
                ErrorClass::Structural => EXIT_BAD_PARSE,
            })
        }
        Err(ExportError::Io(err)) => {
            eprintln!("cannot write output: {err}");
            ExitCode::from(EXIT_BAD_WRITE)
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use kiback_legacy::{Document, Error as BackportError};

#[derive(Parser)]
#[command(name = "kiback")]
#[command(about = "Backport KiCad 6 files to the legacy .lib/.dcm/.sch formats", long_about = None)]
struct Cli {
    /// Input .kicad_sym or .kicad_sch file
    input: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    // usage problems exit 1, not clap's default 2; 2 is reserved for
    // unrecognized document types
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    match run(&cli.input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            match err.downcast_ref::<BackportError>() {
                Some(BackportError::UnknownDocument(_)) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

fn run(input: &Path) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let root =
        kiback_sexpr::parse(&text).with_context(|| format!("parsing {}", input.display()))?;

    match Document::from_sexpr(&root)? {
        Document::Library(library) => {
            write_artifact(&sibling(input, ".lib"), library.to_legacy_lib(false)?)?;
            write_artifact(&sibling(input, ".dcm"), library.to_legacy_dcm())?;
        }
        Document::Schematic { sheet, cache } => {
            write_artifact(&sibling(input, "-cache.lib"), cache.to_legacy_lib(true)?)?;
            write_artifact(&sibling(input, ".sch"), sheet.to_legacy_sch()?)?;
        }
    }
    Ok(())
}

/// Output path next to the input: base name plus the artifact suffix.
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(suffix);
    input.with_file_name(name)
}

fn write_artifact(path: &Path, text: String) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

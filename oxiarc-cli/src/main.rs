//! Command-line gzip compressor/decompressor.

use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Compress or decompress files using the gzip format (RFC 1952).
#[derive(Debug, Parser)]
#[command(name = "gzip", version, about)]
struct Args {
    /// Decompress instead of compressing.
    #[arg(short = 'd', long)]
    decompress: bool,

    /// Write output to stdout instead of a `.gz`-suffixed file.
    #[arg(short = 'c', long = "stdout")]
    to_stdout: bool,

    /// Keep the input file instead of deleting it after a successful run.
    #[arg(short = 'k', long)]
    keep: bool,

    /// Files to process. With none, reads stdin and writes stdout.
    files: Vec<PathBuf>,
}

fn gz_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn gunzip_output_path(input: &Path) -> Result<PathBuf, String> {
    input
        .to_str()
        .and_then(|s| s.strip_suffix(".gz"))
        .map(PathBuf::from)
        .ok_or_else(|| format!("{}: unknown suffix, skipping", input.display()))
}

fn run_stdin_stdout(decompress: bool) -> Result<(), String> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| e.to_string())?;

    let output = if decompress {
        oxiarc_gzip::decompress(&input).map_err(|e| e.to_string())?
    } else {
        oxiarc_gzip::compress(&input).map_err(|e| e.to_string())?
    };

    io::stdout().write_all(&output).map_err(|e| e.to_string())
}

fn run_file(path: &Path, args: &Args) -> Result<(), String> {
    let input = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let (output, out_path) = if args.decompress {
        let output =
            oxiarc_gzip::decompress(&input).map_err(|e| format!("{}: {}", path.display(), e))?;
        (output, gunzip_output_path(path)?)
    } else {
        let output =
            oxiarc_gzip::compress(&input).map_err(|e| format!("{}: {}", path.display(), e))?;
        (output, gz_output_path(path))
    };

    if args.to_stdout {
        io::stdout().write_all(&output).map_err(|e| e.to_string())?;
    } else {
        fs::write(&out_path, &output).map_err(|e| format!("{}: {}", out_path.display(), e))?;
        if !args.keep {
            fs::remove_file(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        }
    }

    Ok(())
}

fn run(args: &Args) -> Result<(), String> {
    if args.files.is_empty() {
        return run_stdin_stdout(args.decompress);
    }
    for path in &args.files {
        run_file(path, args)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("gzip: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

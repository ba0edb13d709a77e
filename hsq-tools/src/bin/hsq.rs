// Copyright 2024 Karpeles Lab Inc.
// HSQ compression command-line tool

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use hsq::{decode, decode_all, encode, encode_all, encode_reader};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hsq")]
#[command(about = "HSQ compression tool", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress"])))]
struct Args {
    /// Input files (standard input if none are given)
    files: Vec<PathBuf>,

    /// Compress input
    #[arg(short = 'c', long)]
    compress: bool,

    /// Decompress input
    #[arg(short = 'd', long)]
    decompress: bool,

    /// Save output to FILE instead of stdout (single input only)
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report sizes of every processed file
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Decompress freshly compressed data and compare it with the input
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.files.len() > 1 && args.output.is_some() {
        anyhow::bail!("Cannot use -o with multiple input files");
    }

    match args.files.as_slice() {
        [] => process_stdio(&args),
        [input] => process_file(&args, input, args.output.as_deref()),
        files => process_batch(&args, files),
    }
}

fn process_stdio(args: &Args) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let (in_len, output) = if args.compress {
        // Compress straight from the stream, one chunk at a time
        let compressed = encode_reader(&mut input).context("Failed to compress stdin")?;
        let in_len = hsq::decode_len(&compressed)?;
        if args.verify {
            decode(&compressed).context("Verification failed")?;
        }
        (in_len, compressed)
    } else {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;
        let decompressed = decode(&data).context("Failed to decompress stdin")?;
        (data.len(), decompressed)
    };

    write_output(args.output.as_deref(), &output)?;
    report(args, Path::new("-"), args.output.as_deref(), in_len, output.len());
    Ok(())
}

fn process_file(args: &Args, input: &Path, output: Option<&Path>) -> Result<()> {
    let data = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let result = if args.compress {
        let compressed = encode(&data)
            .with_context(|| format!("Failed to compress: {}", input.display()))?;
        if args.verify {
            verify(input, &data, &compressed)?;
        }
        compressed
    } else {
        decode(&data).with_context(|| format!("Failed to decompress: {}", input.display()))?
    };

    write_output(output, &result)?;
    report(args, input, output, data.len(), result.len());
    Ok(())
}

/// Several files: each output lands next to its input, and the files are
/// processed in parallel.
fn process_batch(args: &Args, files: &[PathBuf]) -> Result<()> {
    let inputs = files
        .iter()
        .map(|path| {
            fs::read(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let results = if args.compress {
        encode_all(&inputs)
    } else {
        decode_all(&inputs)
    };

    let pb = if !args.verbose {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for ((path, data), result) in files.iter().zip(&inputs).zip(results) {
        let result = result.with_context(|| format!("Failed to process: {}", path.display()))?;
        if args.compress && args.verify {
            verify(path, data, &result)?;
        }

        let output = output_path(path, args.compress);
        write_output(Some(&output), &result)?;
        report(args, path, Some(&output), data.len(), result.len());

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(())
}

fn verify(input: &Path, original: &[u8], compressed: &[u8]) -> Result<()> {
    let decompressed = decode(compressed)
        .with_context(|| format!("Failed to decompress for verification: {}", input.display()))?;

    if decompressed != original {
        anyhow::bail!(
            "Verification failed for {}: decompressed data does not match original (original: {} bytes, decompressed: {} bytes)",
            input.display(),
            original.len(),
            decompressed.len()
        );
    }

    Ok(())
}

/// `name` -> `name.hsq` when compressing, `name.hsq` -> `name` when
/// decompressing; other names get `.out` appended.
fn output_path(input: &Path, compress: bool) -> PathBuf {
    let is_hsq = input
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("hsq"));

    if !compress && is_hsq {
        return input.with_extension("");
    }

    let mut name = input.as_os_str().to_owned();
    name.push(if compress { ".hsq" } else { ".out" });
    PathBuf::from(name)
}

fn write_output(output: Option<&Path>, data: &[u8]) -> Result<()> {
    match output {
        Some(path) => fs::write(path, data)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(data)?;
            lock.flush()?;
            Ok(())
        }
    }
}

fn report(args: &Args, input: &Path, output: Option<&Path>, in_len: usize, out_len: usize) {
    if !args.verbose {
        return;
    }

    let output = output.unwrap_or_else(|| Path::new("-"));
    let ratio = if in_len > 0 {
        out_len as f64 / in_len as f64 * 100.0
    } else {
        0.0
    };

    eprintln!(
        "{} -> {}: {} -> {} bytes ({:.2}%)",
        input.display(),
        output.display(),
        in_len,
        out_len,
        ratio
    );
}

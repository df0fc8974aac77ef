use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::info;

use ccsds123::{bsq, decode, read_summary};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

struct CliOptions {
    input: PathBuf,
    output: PathBuf,
}

fn print_usage() {
    println!("Usage: c123-decode -i <input> -o <output>");
}

fn parse_cli(args: &[String]) -> CliResult<CliOptions> {
    let mut input = None;
    let mut output = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-i" if i + 1 < args.len() => {
                i += 1;
                input = Some(PathBuf::from(&args[i]));
            }
            "-o" if i + 1 < args.len() => {
                i += 1;
                output = Some(PathBuf::from(&args[i]));
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    Ok(CliOptions {
        input: input.ok_or("missing -i input path")?,
        output: output.ok_or("missing -o output path")?,
    })
}

fn decode_single(input: &Path, output: &Path) -> CliResult<()> {
    let container = fs::read(input)?;
    let summary = read_summary(&container)?;
    let (params, image) = decode(&container)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    bsq::save(output, &image)?;
    info!(
        "{} -> {} ({}x{}x{} @ {} bits, container v{})",
        input.display(),
        output.display(),
        params.nx,
        params.ny,
        params.nz,
        params.depth,
        summary.version
    );
    Ok(())
}

fn output_file_for(input: &Path, output: &Path) -> PathBuf {
    if output.is_dir() {
        let mut file = output.join(input.file_stem().unwrap_or_default());
        file.set_extension("bsq");
        file
    } else if output.extension().is_none() {
        let mut file = output.to_path_buf();
        file.set_extension("bsq");
        file
    } else {
        output.to_path_buf()
    }
}

fn sorted_files_in(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            inputs.push(entry.path());
        }
    }
    inputs.sort();
    if inputs.is_empty() {
        return Err("no input containers found in directory".into());
    }
    Ok(inputs)
}

fn run() -> CliResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_cli(&args)?;

    if opts.input.is_dir() {
        if opts.output.exists() {
            if !opts.output.is_dir() {
                return Err("output path must be a directory when decoding a sequence".into());
            }
        } else {
            fs::create_dir_all(&opts.output)?;
        }
        for file in sorted_files_in(&opts.input)? {
            let mut out_file = opts.output.join(file.file_stem().unwrap_or_default());
            out_file.set_extension("bsq");
            decode_single(&file, &out_file)?;
        }
    } else {
        let out_file = output_file_for(&opts.input, &opts.output);
        decode_single(&opts.input, &out_file)?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("c123-decode: {err}");
        process::exit(1);
    }
}

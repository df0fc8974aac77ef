use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::info;

use ccsds123::{bsq, encode, ppm::Ppm, Params};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

struct CliOptions {
    input: PathBuf,
    output: PathBuf,
    nx: usize,
    ny: usize,
    nz: usize,
    depth: u32,
    force_ppm: bool,
}

fn print_usage() {
    println!("Usage: c123-encode -i <input> -o <output> -nx <X> -ny <Y> -nz <Z> -d <bits>");
    println!("       Use --ppm to read binary PPM (P6). Dimensions inferred from the header.");
}

fn parse_cli(args: &[String]) -> CliResult<CliOptions> {
    let mut input = None;
    let mut output = None;
    let mut nx = 0;
    let mut ny = 0;
    let mut nz = 3;
    let mut depth = 8;
    let mut force_ppm = false;

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
            "-nx" if i + 1 < args.len() => {
                i += 1;
                nx = args[i].parse()?;
            }
            "-ny" if i + 1 < args.len() => {
                i += 1;
                ny = args[i].parse()?;
            }
            "-nz" if i + 1 < args.len() => {
                i += 1;
                nz = args[i].parse()?;
            }
            "-d" if i + 1 < args.len() => {
                i += 1;
                depth = args[i].parse()?;
            }
            "--ppm" => force_ppm = true,
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
        nx,
        ny,
        nz,
        depth,
        force_ppm,
    })
}

fn is_ppm(path: &Path, force: bool) -> bool {
    force
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"))
}

fn encode_single(opts: &CliOptions, input: &Path, output: &Path) -> CliResult<()> {
    let (image, nx, ny, nz, depth) = if is_ppm(input, opts.force_ppm) {
        let ppm = Ppm::open(input)?;
        (ppm.to_planar(), ppm.width(), ppm.height(), Ppm::BANDS, ppm.depth())
    } else {
        if opts.nx == 0 || opts.ny == 0 {
            return Err("BSQ inputs require -nx and -ny".into());
        }
        let image = bsq::load(input, opts.nx, opts.ny, opts.nz)?;
        (image, opts.nx, opts.ny, opts.nz, opts.depth)
    };

    let params = Params::with_dimensions(nx, ny, nz, depth);
    let container = encode(&image, &params)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &container)?;
    info!(
        "{} -> {} ({}x{}x{} @ {} bits, {} bytes)",
        input.display(),
        output.display(),
        nx,
        ny,
        nz,
        depth,
        container.len()
    );
    Ok(())
}

fn output_file_for(input: &Path, output: &Path) -> PathBuf {
    if output.is_dir() {
        let mut file = output.join(input.file_stem().unwrap_or_default());
        file.set_extension("c123");
        file
    } else if output.extension().is_none() {
        let mut file = output.to_path_buf();
        file.set_extension("c123");
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
        return Err("no input frames found in directory".into());
    }
    Ok(inputs)
}

fn run() -> CliResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_cli(&args)?;

    if opts.input.is_dir() {
        if opts.force_ppm {
            return Err("directory inputs do not support --ppm".into());
        }
        if opts.output.exists() {
            if !opts.output.is_dir() {
                return Err("output path must be a directory when encoding a sequence".into());
            }
        } else {
            fs::create_dir_all(&opts.output)?;
        }
        for file in sorted_files_in(&opts.input)? {
            let mut out_file = opts.output.join(file.file_stem().unwrap_or_default());
            out_file.set_extension("c123");
            encode_single(&opts, &file, &out_file)?;
        }
    } else {
        let out_file = output_file_for(&opts.input, &opts.output);
        encode_single(&opts, &opts.input, &out_file)?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("c123-encode: {err}");
        process::exit(1);
    }
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::Level;

use tabclean::import::load_smf;
use tabclean::{CleanConfig, Cleaner, Transcription};

fn print_usage() {
    println!("tabclean - Clean transcribed notes for guitar tablature");
    println!();
    println!("Usage: tabclean [OPTIONS] <INPUT> <OUTPUT.mid>");
    println!();
    println!("INPUT is a MIDI file (.mid/.midi) or a YAML/JSON transcription.");
    println!();
    println!("Options:");
    println!("  --config <FILE>   Load cleaning options from a YAML or TOML file");
    println!("  --show-config     Print the effective configuration and exit");
    println!("  --verbose, -v     Log every stage");
    println!("  --help, -h        Show this help message");
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    show_config: bool,
    verbose: bool,
    help: bool,
    positional: Vec<PathBuf>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                args.config = Some(PathBuf::from(path));
            }
            "--show-config" => args.show_config = true,
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => args.help = true,
            other if other.starts_with('-') => return Err(anyhow!("Unknown option: {}", other)),
            other => args.positional.push(PathBuf::from(other)),
        }
    }

    Ok(args)
}

fn load_input(path: &Path) -> Result<Transcription> {
    let is_midi = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
        .unwrap_or(false);

    if is_midi {
        load_smf(path).with_context(|| format!("Failed to read MIDI file: {:?}", path))
    } else {
        Transcription::load(path)
    }
}

fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if args.help {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => CleanConfig::load(path)?,
        None => CleanConfig::default(),
    };

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let (input, output) = match args.positional.as_slice() {
        [input, output] => (input, output),
        _ => {
            eprintln!("Error: expected an input and an output path");
            print_usage();
            std::process::exit(1);
        }
    };

    let transcription = load_input(input)?;
    let score = Cleaner::new(config).clean(&transcription)?;
    score
        .write_smf(output)
        .with_context(|| format!("Failed to write MIDI file: {:?}", output))?;

    println!(
        "Wrote {:?}: {} guitar / {} bass notes, {}, {}, {:.1} BPM",
        output,
        score.guitar.len(),
        score.bass.len(),
        score.key,
        score.time_signature,
        score.tempo
    );
    Ok(())
}

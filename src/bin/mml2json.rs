//! Dump merged MML channels as JSON token lists

use clap::Parser;
use maplesyrup::converter::token::Token;
use maplesyrup::Converter;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mml2json")]
#[command(version = "0.1.0")]
#[command(about = "Convert MML containers to JSON token lists", long_about = None)]
struct Args {
    /// Input MML container file (reads from stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,

    /// Skip the tempo merge and dump the normalized channels
    #[arg(long)]
    no_merge: bool,
}

#[derive(Debug, Serialize)]
struct ChannelJson<'a> {
    /// Total length in ticks (128 per whole note)
    duration: f64,
    tokens: &'a [Token],
}

fn main() -> Result<(), maplesyrup::Error> {
    let args = Args::parse();

    let mut mml = String::new();
    match &args.input {
        Some(path) => {
            File::open(path)?.read_to_string(&mut mml)?;
        }
        None => {
            io::stdin().read_to_string(&mut mml)?;
        }
    }

    let mut converter = Converter::new(mml.as_str())?;
    if !args.no_merge {
        converter.merge_tempo()?;
    }

    let channels: Vec<ChannelJson> = converter
        .channels()
        .iter()
        .map(|channel| ChannelJson {
            duration: channel.duration(),
            tokens: &channel.tokens,
        })
        .collect();

    let json_string = if args.compact {
        serde_json::to_string(&channels)?
    } else {
        serde_json::to_string_pretty(&channels)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}

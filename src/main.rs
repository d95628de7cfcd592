use clap::Parser;
use maplesyrup::{Converter, MmlInput};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "maplesyrup")]
#[command(version = "0.1.0")]
#[command(about = "Synchronize tempo changes across MML channels", long_about = None)]
struct Args {
    /// Input MML container file (reads from stdin if not specified)
    #[arg(short, long, conflicts_with = "channel")]
    input: Option<PathBuf>,

    /// Output file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Channel text, given once per channel instead of a container
    #[arg(short, long)]
    channel: Vec<String>,

    /// Print channels one per line without the MML@ container
    #[arg(short, long)]
    array: bool,

    /// Log merge decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), maplesyrup::Error> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let text: String;
    let input = if !args.channel.is_empty() {
        MmlInput::from(args.channel)
    } else {
        text = match &args.input {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        MmlInput::Container(&text)
    };

    run(input, args.array, args.output)
}

fn run(input: MmlInput<'_>, array: bool, output: Option<PathBuf>) -> Result<(), maplesyrup::Error> {
    let mut converter = Converter::new(input)?;
    converter.merge_tempo()?;
    let channels = converter.write_channels()?;

    let text = if array {
        channels.join("\n")
    } else {
        maplesyrup::container::wrap_channels(&channels)
    };

    match output {
        Some(path) => fs::write(path, format!("{}\n", text))?,
        None => println!("{}", text),
    }

    Ok(())
}

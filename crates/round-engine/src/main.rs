//! Country Guess terminal front-end
//!
//! Usage:
//!   country-guess --data data/countries.json --region Europe
//!
//! Type a country name per line. `:region <name>` switches region,
//! `:new` starts over, `:list` shows candidates, `:quit` exits.

use anyhow::{Context, Result};
use clap::Parser;
use round_engine::{
    CountrySource, GameSession, GuessEntry, JsonFileSource, Region, RoundEngine, REGIONS, WORLD,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "country-guess",
    about = "Guess the hidden country from continent, distance and direction hints"
)]
struct Args {
    /// Path to countries JSON file
    #[arg(short, long, default_value = "data/countries.json")]
    data: PathBuf,

    /// Region to play in (World, Africa, Asia, Europe, ...)
    #[arg(short, long, default_value = WORLD)]
    region: String,

    /// Seed for reproducible targets
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output (logs the target)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Guess(&'a str),
    Region(&'a str),
    New,
    List,
    Quit,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.strip_prefix(':') {
            Some("quit") | Some("q") => Command::Quit,
            Some("new") => Command::New,
            Some("list") => Command::List,
            Some(rest) => match rest.strip_prefix("region") {
                // `:region` alone or followed by whitespace; `:regions` is not a command
                Some(arg) if arg.is_empty() || arg.starts_with(char::is_whitespace) => {
                    Command::Region(arg.trim())
                }
                _ => Command::Guess(line),
            },
            None => Command::Guess(line),
        }
    }
}

fn print_round(out: &mut impl Write, session: &GameSession) -> io::Result<()> {
    let region = session.region().map(|r| r.to_string()).unwrap_or_default();
    writeln!(
        out,
        "New round: {} ({} countries). Guess the country!",
        region,
        session.candidates().len()
    )
}

fn print_entry(out: &mut impl Write, entry: &GuessEntry) -> io::Result<()> {
    if entry.emphasized {
        writeln!(out, "  *** {} ***", entry)
    } else {
        writeln!(out, "  {}", entry)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the game transcript
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let source = JsonFileSource::new(&args.data);
    let countries = source
        .load_countries()
        .with_context(|| format!("Could not load country data from {}", source.describe()))?;
    info!("Dataset ready: {} countries", countries.len());

    let engine = match args.seed {
        Some(seed) => RoundEngine::with_seed(seed),
        None => RoundEngine::new(),
    };
    let mut session = GameSession::new(countries.into(), engine);
    session.start(args.region.parse::<Region>()?)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_round(&mut out, &session)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        match Command::parse(&line) {
            Command::Quit => break,
            Command::New => {
                session.restart()?;
                print_round(&mut out, &session)?;
            }
            Command::List => {
                writeln!(out, "{}", session.candidates().join(", "))?;
            }
            Command::Region(name) => match name.parse::<Region>().and_then(|r| session.start(r)) {
                Ok(()) => print_round(&mut out, &session)?,
                Err(e) => writeln!(out, "{} (regions: {})", e, REGIONS.join(", "))?,
            },
            Command::Guess(guess) => {
                if let Some(entry) = session.submit(guess)? {
                    print_entry(&mut out, entry)?;
                }
            }
        }
    }

    Ok(())
}

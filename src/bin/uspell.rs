//! Command-line driver: check each line of a sample file (or stdin)
//! against a dictionary, reporting whether it is spelled right, right
//! after case or precomposition normalization, a compound of two known
//! words, or wrong (in which case up to a handful of suggestions are
//! printed and the word is quietly accepted so it isn't flagged again
//! this run).

use clap::Parser;
use log::LevelFilter;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use uspell::codec::utf8_to_cp;
use uspell::engine::{Engine, EngineFlags};
use uspell::unicode::{to_upper, un_precompose};

/// Check spelling of a list of sample words against a dictionary.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Cli {
    /// Dictionary file, one UTF-8 word per line.
    dict: PathBuf,

    /// "sounds like" transcription rules, one `left right` pair per line.
    #[arg(long)]
    transcription: Option<PathBuf>,

    /// Additional personal dictionary file, assimilated after the primary.
    /// May be given more than once.
    #[arg(long)]
    supplemental: Vec<PathBuf>,

    /// Sample words to check, one per line. Reads stdin if omitted.
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Maximum number of suggestions to print for a misspelling.
    #[arg(long, default_value_t = 4)]
    max_alternatives: usize,

    /// Expand precomposed letters into base + combining marks at ingestion.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    expand_precomposed: bool,

    /// Raise the log level (-v = info, -vv = debug, -vvv = trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn treat(engine: &mut Engine, word: &str, max_alternatives: usize) {
    let cps = utf8_to_cp(word.as_bytes());
    if engine.is_spelled_right(&cps) {
        println!("{} is ok", word);
        return;
    }

    let upper = to_upper(&cps);
    if engine.is_spelled_right(&upper) {
        return;
    }

    let unprecomposed = un_precompose(&upper);
    if engine.is_spelled_right(&unprecomposed) {
        println!("{} is ok once precomposed letters expanded", word);
        return;
    }

    let mut buf = cps.clone();
    let split = engine.is_spelled_right_multiple(&mut buf);
    if split > 0 {
        println!(
            "{} is ok as two words with {}, {} chars",
            word,
            split,
            cps.len() as u32 - split
        );
        return;
    }

    print!("{} -> ", word);
    match engine.show_alternatives(&cps, max_alternatives) {
        Ok(alternatives) => {
            for alt in &alternatives {
                print!("{} ", String::from_utf8_lossy(alt));
            }
        }
        Err(e) => {
            log::warn!("could not generate suggestions for {:?}: {}", word, e);
        }
    }
    println!();

    if let Err(e) = engine.accept_word(word.as_bytes()) {
        log::warn!("could not accept {:?} to avoid repeat complaints: {}", word, e);
    }
}

fn run(cli: Cli) -> uspell::error::Result<()> {
    let flags = if cli.expand_precomposed {
        EngineFlags::EXPAND_PRECOMPOSED
    } else {
        EngineFlags::empty()
    };
    let mut engine = Engine::new(&cli.dict, cli.transcription.as_deref(), flags)?;
    log::info!("loaded primary dictionary {:?}", cli.dict);

    for path in &cli.supplemental {
        engine.assimilate(path)?;
        log::info!("assimilated supplemental dictionary {:?}", path);
    }

    let reader: Box<dyn BufRead> = match &cli.samples {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    for line in reader.lines() {
        let line = line?;
        let word = line.trim_end();
        if word.is_empty() {
            continue;
        }
        treat(&mut engine, word, cli.max_alternatives);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("uspell: {}", e);
            ExitCode::FAILURE
        }
    }
}

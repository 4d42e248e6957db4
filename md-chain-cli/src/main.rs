// Markdown Markov text generator: command-line driver.
//
// Usage:
//   md-chain-cli [SOURCE] [--order N] [--length N] [--seed-text TEXT]
//     [--seed-tokens A,B] [--rng-seed N] [--samples N]
//
// SOURCE is a markdown file path or an http(s) URL (default: book.md).

use std::process::ExitCode;
use std::str::FromStr;

use md_chain_core::io::retrieve;
use md_chain_core::model::{GenerateParams, Generation, GenerationError, Generator, Order, SeedSpec, TransitionTable};
use md_chain_core::text::tokenize;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Driver settings, each overridable from the command line.
#[derive(Debug)]
struct Settings {
    source: String,
    order: Order,
    params: GenerateParams,
    rng_seed: Option<u64>,
    samples: usize,
}

impl Settings {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let source = match positionals(args).as_slice() {
            [] => "book.md".to_owned(),
            [source] => (*source).to_owned(),
            [_, extra, ..] => return Err(format!("unexpected argument: '{extra}'")),
        };

        let order = match parse_flag::<usize>(args, "--order")? {
            Some(k) => Order::new(k).map_err(|e| e.to_string())?,
            None => Order::default(),
        };
        let length = parse_flag(args, "--length")?.unwrap_or(GenerateParams::DEFAULT_LENGTH);

        let seed = match (flag_value(args, "--seed-text"), flag_value(args, "--seed-tokens")) {
            (Some(_), Some(_)) => return Err("--seed-text and --seed-tokens are exclusive".to_owned()),
            (Some(text), None) => SeedSpec::Text(text.to_owned()),
            (None, Some(list)) => SeedSpec::parse(&format!("tokens:{list}")).map_err(|e| e.to_string())?,
            (None, None) => SeedSpec::Absent,
        };

        Ok(Self {
            source,
            order,
            params: GenerateParams::new(length, seed),
            rng_seed: parse_flag(args, "--rng-seed")?,
            samples: parse_flag(args, "--samples")?.unwrap_or(1),
        })
    }
}

/// Arguments that are neither a flag nor a flag's value.
///
/// Every flag takes exactly one value.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg.starts_with("--") {
            rest.next();
        } else {
            found.push(arg.as_str());
        }
    }
    found
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: FromStr>(args: &[String], flag: &str) -> Result<Option<T>, String> {
    match flag_value(args, flag) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid value for {flag}: '{value}'")),
        None => Ok(None),
    }
}

fn print_outcome(outcome: &Result<Generation, GenerationError>) {
    match outcome {
        Ok(generation) => {
            println!("{generation}");
            if generation.stopped_early() {
                log::info!("chain reached an unmodeled state after {} words", generation.tokens.len());
            }
        }
        // Seed and chain problems are reported as plain messages
        Err(e) => println!("{e}"),
    }
}

fn run(settings: &Settings) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let content = retrieve(&settings.source)?;
    let words = tokenize(&content);
    log::debug!("{} words read from {}", words.len(), settings.source);

    if words.len() <= settings.order.get() {
        println!(
            "The book does not have enough words to build an order {} Markov chain effectively.",
            settings.order
        );
        return Ok(ExitCode::FAILURE);
    }

    let table = TransitionTable::build(&words, settings.order);
    let generator = Generator::new(&table);

    println!("\nGenerated Text (order {}):", settings.order);
    match settings.rng_seed {
        // A fixed seed gives one reproducible stream, samples run in sequence
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..settings.samples {
                print_outcome(&generator.generate(&settings.params, &mut rng));
            }
        }
        None if settings.samples > 1 => {
            for outcome in generator.generate_many(&settings.params, settings.samples) {
                print_outcome(&outcome);
            }
        }
        None => print_outcome(&generator.generate(&settings.params, &mut rand::rng())),
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let settings = match Settings::from_args(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(&settings) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Could not read the source text: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        std::iter::once("md-chain-cli")
            .chain(line.split_whitespace())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_args(&args("")).unwrap();
        assert_eq!(settings.source, "book.md");
        assert_eq!(settings.order, Order::default());
        assert_eq!(settings.params, GenerateParams::default());
        assert_eq!(settings.rng_seed, None);
        assert_eq!(settings.samples, 1);
    }

    #[test]
    fn reads_flags() {
        let settings = Settings::from_args(&args("novel.md --order 3 --length 40 --seed-tokens a,b,c --rng-seed 9")).unwrap();
        assert_eq!(settings.source, "novel.md");
        assert_eq!(settings.order.get(), 3);
        assert_eq!(settings.params.length, 40);
        assert_eq!(settings.params.seed, SeedSpec::Tokens(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(settings.rng_seed, Some(9));
    }

    #[test]
    fn source_may_follow_flags() {
        let settings = Settings::from_args(&args("--length 50 novel.md")).unwrap();
        assert_eq!(settings.source, "novel.md");
        assert_eq!(settings.params.length, 50);

        let settings = Settings::from_args(&args("--order 3 novel.md --rng-seed 1")).unwrap();
        assert_eq!(settings.source, "novel.md");
        assert_eq!(settings.order.get(), 3);
    }

    #[test]
    fn rejects_stray_arguments() {
        let err = Settings::from_args(&args("novel.md --length 50 other.md")).unwrap_err();
        assert_eq!(err, "unexpected argument: 'other.md'");
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(Settings::from_args(&args("--order 0")).is_err());
        assert!(Settings::from_args(&args("--length many")).is_err());
        assert!(Settings::from_args(&args("--seed-text a --seed-tokens a,b")).is_err());
    }
}

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use arg_lite::{ArgDef, ArgLite, ArgLiteErr, Parsed, ParsedArgs};
use log::{debug, info};
use thiserror::Error;
use thompson::{Regex, RegexError};

const USAGE: &str = "usage: thompson_cli --regex <EXPR> [--postfix] [--dfa] [CANDIDATE ...]\n\
    Without candidates, they are read from stdin one per line until EOF or 'exit' (any case).";
const REGEX: &str = "regex";
const POSTFIX: &str = "postfix";
const DFA: &str = "dfa";
const EXIT_SENTINEL: &str = "exit";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Regex(#[from] RegexError),
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, PartialEq)]
struct Settings {
    pattern: String,
    show_postfix: bool,
    show_dfa: bool,
    candidates: Vec<String>,
}

impl TryFrom<&ParsedArgs> for Settings {
    type Error = ArgLiteErr;

    fn try_from(args: &ParsedArgs) -> Result<Self, Self::Error> {
        let pattern = args
            .value(REGEX)
            .ok_or_else(|| ArgLiteErr::MandatoryArgIsntProvided(vec![REGEX.to_string()]))?;
        Ok(Settings {
            pattern: pattern.to_string(),
            show_postfix: args.is_present(POSTFIX),
            show_dfa: args.is_present(DFA),
            candidates: args.positionals().to_vec(),
        })
    }
}

fn arg_parser() -> Result<ArgLite, ArgLiteErr> {
    ArgLite::new(Some(USAGE))
        .arg(ArgDef::value(REGEX, 'r', "Expression to compile", true))?
        .arg(ArgDef::flag(POSTFIX, 'p', "Print the postfix form"))?
        .arg(ArgDef::flag(DFA, 'd', "Print the DFA table"))
}

fn verdict(regex: &Regex, candidate: &str) -> String {
    format!("'{candidate}' accepted: {}", regex.is_exact_match(candidate))
}

fn run<R, W>(settings: &Settings, input: R, out: &mut W) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
{
    let regex = Regex::new(&settings.pattern)?;
    info!("compiled '{}'", settings.pattern);

    if settings.show_postfix {
        writeln!(out, "postfix: {}", regex.postfix())?;
    }
    if settings.show_dfa {
        writeln!(out, "{}", regex.to_dfa())?;
    }

    if !settings.candidates.is_empty() {
        for candidate in &settings.candidates {
            writeln!(out, "{}", verdict(&regex, candidate))?;
        }
        return Ok(());
    }

    debug!("reading candidates from stdin");
    for line in input.lines() {
        let line = line?;
        let candidate = line.trim_end_matches('\r');
        if candidate.eq_ignore_ascii_case(EXIT_SENTINEL) {
            break;
        }
        writeln!(out, "{}", verdict(&regex, candidate))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = match arg_parser()
        .and_then(|parser| parser.parse_env())
        .and_then(|parsed| match parsed {
            Parsed::Help(help) => {
                println!("{help}");
                Ok(None)
            }
            Parsed::Args(args) => Settings::try_from(&args).map(Some),
        }) {
        Ok(Some(settings)) => settings,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&settings, io::stdin().lock(), &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

#[derive(Debug, Parser)]
#[command(name = "gen_restricted_traces")]
#[command(about = "Generates integration code for the restricted trace tests", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// `inputs` or `outputs`: print the declared files (comma-separated) and exit.
    /// Omit to run the full generation.
    pub(crate) query: Option<String>,

    /// Directory holding the trace manifest and the trace directories.
    #[arg(long)]
    pub(crate) root: Option<PathBuf>,

    /// JSON file overriding generator file names, sentinels and package prefixes.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Log resolution decisions (overridden by RUST_LOG).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// What to do with the command line.
#[derive(Debug)]
pub(crate) enum ParsedArgs {
    Run(Cli),
    /// `--help` or `--version`; clap prints it and exits 0.
    Informational(clap::Error),
    /// Unknown flags, extra positionals, missing values.
    Invalid,
}

pub(crate) fn parse_args<I, T>(args: I) -> ParsedArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => ParsedArgs::Run(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            ParsedArgs::Informational(err)
        }
        Err(_) => ParsedArgs::Invalid,
    }
}

/// Build-system dependency queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScriptQuery {
    Inputs,
    Outputs,
}

impl ScriptQuery {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "inputs" => Some(ScriptQuery::Inputs),
            "outputs" => Some(ScriptQuery::Outputs),
            _ => None,
        }
    }
}

// Module declarations
mod cli;
mod config;
mod deps;
mod descriptor;
mod error;
mod files;
mod generate;
mod ignore;
mod info;
mod logging;
mod manifest;
mod render;
mod trace_dir;
mod user;

// Re-export module items at crate root so cross-module references stay short.
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use config::*;
#[allow(unused_imports)]
pub(crate) use deps::*;
#[allow(unused_imports)]
pub(crate) use descriptor::*;
#[allow(unused_imports)]
pub(crate) use error::*;
#[allow(unused_imports)]
pub(crate) use files::*;
#[allow(unused_imports)]
pub(crate) use generate::*;
#[allow(unused_imports)]
pub(crate) use ignore::*;
#[allow(unused_imports)]
pub(crate) use info::*;
#[allow(unused_imports)]
pub(crate) use logging::*;
#[allow(unused_imports)]
pub(crate) use manifest::*;
#[allow(unused_imports)]
pub(crate) use render::*;
#[allow(unused_imports)]
pub(crate) use trace_dir::*;
#[allow(unused_imports)]
pub(crate) use user::*;

const INVALID_PARAMETERS: &str = "Invalid script parameters.";

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        ParsedArgs::Run(cli) => cli,
        ParsedArgs::Informational(err) => err.exit(),
        ParsedArgs::Invalid => {
            println!("{INVALID_PARAMETERS}");
            std::process::exit(1);
        }
    };
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match cli.query.as_deref() {
        None => {}
        Some(raw) => {
            let listed = match ScriptQuery::parse(raw) {
                Some(ScriptQuery::Inputs) => config.inputs(),
                Some(ScriptQuery::Outputs) => config.outputs(),
                None => {
                    println!("{INVALID_PARAMETERS}");
                    std::process::exit(1);
                }
            };
            println!("{}", listed.join(","));
            return;
        }
    }

    match run_generation(&config) {
        Ok(summary) => {
            tracing::info!(traces = summary.traces, deps = ?summary.deps, "generation complete");
        }
        Err(err) => {
            report_failure(&err);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let config = match &cli.config {
        Some(path) => load_generator_config(path)?,
        None => GeneratorConfig::default(),
    };
    Ok(match &cli.root {
        Some(root) => config.with_root(root.clone()),
        None => config,
    })
}

/// One line on stderr naming the failed stage; the cause goes to the log.
fn report_failure(err: &GenError) {
    match err {
        GenError::Stage { stage, source } => {
            tracing::error!(stage = ?stage, error = %source, "stage failed");
            eprintln!("{}", stage.failure_message());
        }
        other => eprintln!("{other}"),
    }
}

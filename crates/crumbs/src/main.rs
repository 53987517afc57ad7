mod args;
mod render;

use std::process::ExitCode;

use clap::Parser;
use crumbs_core::{
    build_paths, difference, intersection, mktree, Crumb, CrumbOptions, Error, ValueTuple,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Cli, Command, JoinArgs};
use crate::render::Output;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("crumb: {e}");
            ExitCode::from(2)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let opts = cli.crumb_options();
    tracing::debug!(?opts, "crumb options");

    let output = match &cli.command {
        Command::Ls { crumb, arg } => {
            let c = open_crumb(crumb, &opts)?;
            match arg {
                Some(a) => Output::Values(c.ls(a)?),
                None => Output::Paths(c.unfold_paths()?),
            }
        }
        Command::Intersect(j) => {
            let (a, b) = open_pair(j, &opts)?;
            let tuples = intersection(&[&a, &b], &on_names(j))?;
            join_output(j, &a, &b, tuples)?
        }
        Command::Diff(j) => {
            let (a, b) = open_pair(j, &opts)?;
            let tuples = difference(&a, &b, &on_names(j))?;
            join_output(j, &a, &b, tuples)?
        }
        Command::Mktree { crumb, rows } => {
            let c = open_crumb(crumb, &opts)?;
            let made = mktree(&c, rows)?;
            Output::Paths(made.iter().map(|p| p.display().to_string()).collect())
        }
    };

    tracing::info!(results = output.len(), "done");

    if !cli.quiet {
        print!("{}", render::render(&output, cli.format));
    }

    if output.is_empty() && matches!(cli.command, Command::Ls { .. }) {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse a crumb from the command line, rooted at the current directory
/// when relative.
fn open_crumb(text: &str, opts: &CrumbOptions) -> Result<Crumb, Error> {
    Crumb::with_options(text, opts)?.abspath()
}

fn open_pair(j: &JoinArgs, opts: &CrumbOptions) -> Result<(Crumb, Crumb), Error> {
    Ok((open_crumb(&j.crumb1, opts)?, open_crumb(&j.crumb2, opts)?))
}

fn on_names(j: &JoinArgs) -> Vec<&str> {
    j.on.iter().map(String::as_str).collect()
}

/// Tuples as they are, or rebuilt into paths of the chosen base crumb.
fn join_output(j: &JoinArgs, a: &Crumb, b: &Crumb, tuples: Vec<ValueTuple>) -> Result<Output, Error> {
    let base = match j.base {
        None => return Ok(Output::Tuples(tuples)),
        Some(1) => a,
        Some(_) => b,
    };
    Ok(Output::Paths(
        build_paths(base, &tuples).collect::<Result<_, _>>()?,
    ))
}

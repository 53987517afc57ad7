use clap::{Args, Parser, Subcommand, ValueEnum};
use crumbs_core::{CrumbOptions, MatchMode, ValueTuple};

/// crumb: list and join the paths described by crumb templates.
#[derive(Debug, Parser)]
#[command(name = "crumb")]
#[command(about = "List, intersect and create paths described by crumb templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// How argument patterns are read
    #[arg(long, value_enum, default_value_t = ModeArg::Glob, global = true)]
    pub mode: ModeArg,

    /// Glob of entry names to skip while listing (repeatable)
    #[arg(short = 'i', long = "ignore", value_name = "GLOB", global = true)]
    pub ignore: Vec<String>,

    /// Also list hidden entries (drops the default `.*` ignore)
    #[arg(long, global = true)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    pub format: OutputFormat,

    /// No output, exit status only
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the values of one argument, or every full path
    Ls {
        /// Crumb template, e.g. "/data/{subject}/{kind:anat*}"
        crumb: String,

        /// Argument to list, optionally with an inline pattern ("kind:rest*")
        #[arg(short = 'a', long = "arg", value_name = "NAME")]
        arg: Option<String>,
    },

    /// Value tuples found under both crumbs
    Intersect(JoinArgs),

    /// Value tuples found under the first crumb but not the second
    Diff(JoinArgs),

    /// Create one directory tree per row of values
    Mktree {
        crumb: String,

        /// Values for one tree, e.g. "subject=s1,session=v1" (repeatable)
        #[arg(short = 'r', long = "row", value_name = "NAME=VALUE,...", value_parser = parse_row)]
        rows: Vec<ValueTuple>,
    },
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    pub crumb1: String,
    pub crumb2: String,

    /// Argument to join on (repeatable; defaults to every shared argument)
    #[arg(short = 'o', long = "on", value_name = "NAME")]
    pub on: Vec<String>,

    /// Print full paths rebuilt from crumb 1 or 2 instead of values
    #[arg(short = 'b', long = "base", value_name = "1|2", value_parser = clap::value_parser!(u8).range(1..=2))]
    pub base: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Glob,
    Regex,
    #[value(name = "regex-i")]
    RegexI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    pub fn crumb_options(&self) -> CrumbOptions {
        let mut ignore = Vec::with_capacity(self.ignore.len() + 1);
        if !self.all {
            ignore.push(".*".to_string());
        }
        ignore.extend(self.ignore.iter().cloned());

        CrumbOptions {
            ignore,
            mode: match self.mode {
                ModeArg::Glob => MatchMode::Glob,
                ModeArg::Regex => MatchMode::Regex,
                ModeArg::RegexI => MatchMode::RegexIgnoreCase,
            },
            check_exists: true,
        }
    }
}

/// `a=1,b=2` into a value tuple, pairs kept in order.
fn parse_row(s: &str) -> Result<ValueTuple, String> {
    s.split(',')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("expected NAME=VALUE, got `{pair}`")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ValueTuple::new)
}

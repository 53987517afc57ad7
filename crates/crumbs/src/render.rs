use crate::args::OutputFormat;
use crumbs_core::ValueTuple;
use serde::Serialize;

/// What a subcommand produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Values of a single argument.
    Values(Vec<String>),
    /// Paths, rendered from crumbs.
    Paths(Vec<String>),
    /// Value tuples from a join.
    Tuples(Vec<ValueTuple>),
}

impl Output {
    pub fn len(&self) -> usize {
        match self {
            Output::Values(v) | Output::Paths(v) => v.len(),
            Output::Tuples(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Output::Values(_) => "values",
            Output::Paths(_) => "paths",
            Output::Tuples(_) => "tuples",
        }
    }
}

#[derive(Serialize)]
struct JsonOut<'a> {
    kind: &'static str,
    count: usize,
    results: &'a Output,
}

pub fn render_json(output: &Output) -> String {
    let out = JsonOut {
        kind: output.kind(),
        count: output.len(),
        results: output,
    };
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{\"count\":0}".to_string())
}

/// One line per result; tuples as CSV rows.
pub fn render_human(output: &Output) -> String {
    let mut out = String::new();
    match output {
        Output::Values(lines) | Output::Paths(lines) => {
            for l in lines {
                out.push_str(l);
                out.push('\n');
            }
        }
        Output::Tuples(tuples) => {
            for t in tuples {
                out.push_str(&t.to_string());
                out.push('\n');
            }
        }
    }
    out
}

pub fn render(output: &Output, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => render_human(output),
        OutputFormat::Json => {
            let mut s = render_json(output);
            s.push('\n');
            s
        }
    }
}

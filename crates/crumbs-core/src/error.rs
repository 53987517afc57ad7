use std::path::PathBuf;

use crumbs_template::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid crumb template: {0}")]
    Parse(#[from] ParseError),

    #[error("unknown argument `{name}` in `{template}`")]
    UnknownArgument { name: String, template: String },

    #[error("`{path}` still has open arguments: {}", open.join(", "))]
    NotFullySpecified { path: String, open: Vec<String> },

    #[error("invalid pattern `{pattern}`: {msg}")]
    Pattern { pattern: String, msg: String },

    #[error("no common arguments to join on")]
    NoCommonArguments,

    #[error("row {row} leaves `{missing}` open before a bound argument")]
    OpenDependency { row: usize, missing: String },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<globset::Error> for Error {
    fn from(e: globset::Error) -> Self {
        Error::Pattern {
            pattern: e.glob().unwrap_or_default().to_string(),
            msg: e.kind().to_string(),
        }
    }
}

use std::path::PathBuf;

/// Everything that can stop the normalization of one flight file.
///
/// Recoverable conditions (a canonical variable with no matching alias, a
/// required global attribute missing from the source) are not errors: the
/// former is silently skipped, the latter is reported as a warning by the
/// attribute rewriter.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("no time variable present after variable resolution")]
    MissingTimeVariable,

    #[error("cannot rename `{from}` to `{to}`: `{to}` already exists as a distinct variable")]
    DuplicateVariable { from: String, to: String },

    #[error("no variable named `{0}`")]
    MissingVariable(String),

    #[error("variable `{name}` holds non-numeric data and cannot be normalized")]
    UnsupportedVariable { name: String },

    #[error("bad flight timestamp `{value}`: expected YYYYMMDDHHMMSS")]
    BadTimestamp { value: String },

    #[error("failed to open {path} for read-write: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    #[error(transparent)]
    NetCdf(#[from] netcdf::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

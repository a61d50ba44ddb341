use std::path::PathBuf;

/// The corpus could not be produced. Fatal for the session.
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed source {path}: {detail}")]
    Malformed { path: PathBuf, detail: &'static str },

    #[error("unsupported source {0}: expected .csv, .json or .jsonl")]
    UnsupportedFormat(PathBuf),

    #[error("source {0} does not exist")]
    Missing(PathBuf),

    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),

    #[error("record {index} has an empty title")]
    EmptyTitle { index: usize },

    #[error("duplicate title `{title}` at records {first} and {second}")]
    DuplicateTitle { title: String, first: usize, second: usize },
}

/// The queried title is not part of the corpus. Recoverable: callers re-prompt.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("movie `{title}` not found in corpus")]
pub struct NotFoundError {
    pub title: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("hybrid weights must be finite and non-negative (overview={overview}, genre={genre})")]
    NegativeWeight { overview: f32, genre: f32 },

    #[error("hybrid weights must sum to 1.0, got {0}")]
    WeightSum(f32),
}

pub type LoadResult<T> = Result<T, DataLoadError>;

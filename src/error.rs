use thiserror::Error;

/// Why a single date token failed to parse. Recoverable: the row survives
/// with the invalid-date sentinel and the event lands in the run report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("no digits in year suffix of `{token}`")]
    EmptyYearSuffix { token: String },

    #[error("unparseable year suffix `{suffix}` in `{token}`")]
    BadYearSuffix { token: String, suffix: String },

    #[error("`{month}` is not a month abbreviation (token `{token}`)")]
    UnknownMonth { token: String, month: String },
}

impl DateParseError {
    /// The offending raw token, for the end-of-run report.
    pub fn token(&self) -> &str {
        match self {
            DateParseError::EmptyYearSuffix { token }
            | DateParseError::BadYearSuffix { token, .. }
            | DateParseError::UnknownMonth { token, .. } => token,
        }
    }
}

/// Fatal errors. Any of these aborts the run before the merge stage.
#[derive(Error, Debug)]
pub enum CombineError {
    #[error("failed to read source `{source_id}`")]
    FileRead {
        source_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no CSV sources found in `{dir}`")]
    NoSources { dir: String },
}

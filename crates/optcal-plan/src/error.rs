use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported plan format: {columns} columns")]
    UnsupportedFormat { columns: usize },

    #[error("unsupported plan format: rows have {first} and {other} columns")]
    RaggedRows { first: usize, other: usize },

    #[error("plan response is empty")]
    Empty,

    #[error("malformed structured plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plan node at depth {depth} has no identity")]
    MissingIdentity { depth: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;

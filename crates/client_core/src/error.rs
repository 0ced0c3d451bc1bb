use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error: {status} {reason}\n{body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("catalog returned no products")]
    EmptyCatalog,
}

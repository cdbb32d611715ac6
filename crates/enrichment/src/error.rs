use thiserror::Error;

/// Errors raised while fetching or preparing enrichment data
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("HTTP status {code} from {url}")]
    Status { url: String, code: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error(transparent)]
    Load(#[from] data_loader::DataLoadError),
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;

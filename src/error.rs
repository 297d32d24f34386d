use std::path::PathBuf;

/// Errors raised by the local store, the remote catalog client and the CSV exporter.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog items: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx response, transport failure or undecodable body from the remote catalog.
    #[error("request to {url} failed{}: {message}", status_suffix(.status))]
    Request {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The store already holds the largest representable id.
    #[error("cannot assign a new id in {}: largest stored id is {}", .path.display(), i64::MAX)]
    IdExhausted { path: PathBuf },

    #[error("CSV export to {} failed: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a request failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Short machine-friendly tag for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Io { .. } => "io",
            CatalogError::Parse { .. } => "parse",
            CatalogError::Encode { .. } => "encode",
            CatalogError::Request { .. } => "request",
            CatalogError::IdExhausted { .. } => "id",
            CatalogError::Csv { .. } => "csv",
        }
    }
}

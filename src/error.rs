/// Errors that abort a scheduling run.
///
/// Ordinary API rejections (non-2xx responses) are not errors; they are
/// recorded per slot as [`crate::client::CreationResult::Rejected`] and the
/// run keeps going.
#[derive(thiserror::Error, Debug)]
pub enum SchedulerError {
    /// Invalid or missing configuration, raised before any slot runs.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),

    /// HTTP request failed (DNS, connection, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A 2xx response carried neither a decodable `id` nor a Location header.
    #[error("could not determine tournament url from response: {body}")]
    MalformedResponse { body: String },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

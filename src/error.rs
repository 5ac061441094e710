//! Error types for the Tyk bootstrap job

/// Result type alias for bootstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Errors that abort the bootstrap run.
///
/// "Already exists" and "not found" outcomes are not errors; existence checks
/// return `Option` and the caller branches on it.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Kubernetes API error, with the operation that failed
    #[error("Kubernetes API error: {context}: {source}")]
    KubeApi {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// Transport-level failure talking to the Dashboard
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Dashboard answered with something other than 200 OK
    #[error("{step} failed: Dashboard returned {status}: {body}")]
    UnexpectedStatus {
        step: &'static str,
        status: u16,
        body: String,
    },

    /// Required deployments did not become ready in time
    #[error("Deployments not ready: {0}")]
    NotReady(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found where one was required
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Dashboard license rejected by the pre-install check
    #[error("Invalid license: {0}")]
    License(String),
}

impl BootstrapError {
    /// Wrap a kube error with the operation that produced it.
    pub fn kube(context: impl Into<String>, source: kube::Error) -> Self {
        BootstrapError::KubeApi {
            context: context.into(),
            source,
        }
    }
}

//! The closed set of error kinds the core can raise, per the system's error
//! handling design. Call sites above a component boundary wrap these in
//! `anyhow::Error` with `.context(...)`; within a component, functions return
//! `Result<T, LbfError>` directly.

#[derive(Debug, thiserror::Error)]
pub enum LbfError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("manifest fetch failed: {0}")]
    ManifestFetchFailed(String),

    #[error("manifest parse failed: {0}")]
    ManifestParseFailed(String),

    #[error("duplicate parent pool entry for network {0:?} (already have {1:?})")]
    DuplicateParentPool(String, String),

    #[error("no parent pool found while parsing manifests")]
    MissingParentPool,

    #[error("missing deployment for network {network:?} ({what})")]
    MissingDeployment { network: String, what: String },

    #[error("network {0:?} is not active")]
    NetworkNotActive(String),

    #[error("rpc read failed: {0}")]
    RpcReadFailed(String),

    #[error("rpc write failed: {0}")]
    RpcWriteFailed(String),

    #[error("allowance operation failed: {0}")]
    AllowanceFailed(String),

    #[error("timed out waiting for a transaction receipt")]
    ReceiptTimeout,

    #[error("operation cancelled")]
    Cancelled,

    #[error("{kind} {key:?} not found")]
    NotFound { kind: &'static str, key: String },
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The current batch had zero item records. A working source always
    /// yields at least one record, so an empty batch almost certainly means
    /// upstream retrieval or parsing broke; the run is aborted before any
    /// state mutation so the caller can retry or alert.
    #[error("empty batch: the source produced no usable item records")]
    EmptyBatch,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tiers file {path}: {source}")]
    TiersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tiers file: {0}")]
    TiersFileParse(#[from] serde_yaml::Error),

    #[error("invalid tier configuration: {0}")]
    InvalidTiers(String),
}

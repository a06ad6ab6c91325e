//! Domain error types.

/// Top-level error type for sbt.
///
/// Rejected orders (insufficient cash, over-selling, zero size) are not
/// errors; the ledger treats them as silent no-ops. Everything here either
/// aborts a run before it starts or faults it mid-bar.
#[derive(Debug, thiserror::Error)]
pub enum SbtError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("missing price for bar {index}")]
    MissingPrice { index: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SbtError> for std::process::ExitCode {
    fn from(err: &SbtError) -> Self {
        let code: u8 = match err {
            SbtError::Io(_) => 1,
            SbtError::ConfigParse { .. }
            | SbtError::ConfigMissing { .. }
            | SbtError::ConfigInvalid { .. }
            | SbtError::InvalidParameter { .. } => 2,
            SbtError::Data { .. } | SbtError::MissingPrice { .. } => 3,
            SbtError::UnknownStrategy { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

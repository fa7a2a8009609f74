use thiserror::Error;

/// Errors raised while configuring or running a simulation.
///
/// Per-sample infeasibility (a draw below threshold) is not an error; it is
/// retried by the reaction system and only surfaces as
/// [`SimError::InfeasibleConfiguration`] once the attempt cap is exhausted.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("isotope (Z={z}, A={a}) not found in mass table")]
    UnknownIsotope { z: i64, a: i64 },

    #[error("invalid reaction chain: {0}")]
    InvalidChain(String),

    #[error("two-body reaction is not bound to a complete set of nuclei")]
    UnboundReaction,

    #[error("no physically allowed configuration found after {attempts} attempts")]
    InfeasibleConfiguration { attempts: usize },

    #[error("invalid target material: {0}")]
    InvalidMaterial(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dead channel map, line {line}: {message}")]
    DeadChannelMap { line: usize, message: String },

    #[error("mass table, line {line}: {message}")]
    MassTable { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

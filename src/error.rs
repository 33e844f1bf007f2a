use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("FEN error: {0}")]
    Fen(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Malformed move string: {0:?}")]
    BadMove(String),

    #[error("contract deployment failed: {0}")]
    Deploy(String),

    #[error("contract call `{method}` failed: {reason}")]
    Call { method: String, reason: String },

    #[error("contract session is not active ({0})")]
    NotActive(&'static str),

    #[error("payload encoding: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

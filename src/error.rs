use thiserror::Error;

use crate::entity::EntityId;

/// 엔진 경계 밖으로 나가는 실패
///
/// 효과 거절(Rejected)은 여기에 포함되지 않는다. 거절은 일반 결과값이다.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("RON parse failed: {0}")]
    Ron(#[from] ron::de::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

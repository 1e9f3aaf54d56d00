use std::collections::TryReserveError;

/// Errors that can occur in the ECS.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    #[error("out of memory growing the {component} store")]
    OutOfMemory {
        component: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("invalid entity id {0}")]
    InvalidEntity(String),
}

pub type Result<T> = std::result::Result<T, EcsError>;

use crate::model::BeaconId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cannot find beacon with ID {0}")]
    BeaconNotFound(BeaconId),

    #[error("no rendered node for beacon ID {0}")]
    NodeNotFound(BeaconId),

    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),

    #[error("{action} is not available while the popup is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, BoardError>;

use std::path::PathBuf;

use thiserror::Error;

/// Error kinds produced across log reading, emitting, replay and RTSP handling.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("invalid format: {detail}")]
    InvalidFormat { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("payload of {needed} bytes exceeds buffer capacity of {cap} bytes")]
    OutOfSpace { needed: usize, cap: usize },

    #[error("invalid address: {addr}")]
    AddressError { addr: String },

    #[error("CAN bus error: {detail}")]
    BusError { detail: String },

    #[error("RTSP protocol error: {detail}")]
    ProtocolError { detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport error types.

use ironiso_core::PackError;
use thiserror::Error;

/// Errors raised while framing or writing bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The length prefix could not be read.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// Frame exceeds the configured maximum.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// The receiving side of the sink is gone.
    #[error("transport closed")]
    Closed,

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

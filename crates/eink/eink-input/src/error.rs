//! Input error types.

use crate::manager::DeviceId;

/// Errors surfaced by the input layer.
///
/// Malformed or unknown reports are never errors; decoders skip them.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// A device reader hit an I/O failure after the device was opened.
    #[error("input device {device} failed: {source}")]
    Device {
        /// Failing device.
        device: DeviceId,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Every report sender is gone and no further input can arrive.
    #[error("all input sources disconnected")]
    Disconnected,
}

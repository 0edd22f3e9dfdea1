//! Decode Error Types

use thiserror::Error;

/// Errors that can occur while reading and decoding an adapter response
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Reading the byte channel failed
    #[error("Channel read error: {0}")]
    Channel(#[from] std::io::Error),

    /// Adapter replied "NO DATA"
    #[error("Adapter reported NO DATA")]
    NoData,

    /// Adapter replied with a generic "ERROR"
    #[error("Adapter reported ERROR")]
    AdapterError,

    /// Adapter could not reach the vehicle bus
    #[error("Adapter unable to connect to vehicle")]
    UnableToConnect,

    /// Bus-level fault reported by the adapter
    #[error("Bus error: {0}")]
    BusError(String),

    /// Adapter stopped processing the command
    #[error("Adapter stopped processing the command")]
    Stopped,

    /// Slow-init protocol failed to initialize the bus
    #[error("Bus initialization failed")]
    BusInit,

    /// Adapter did not understand the command ("?")
    #[error("Adapter did not understand the command")]
    Misunderstood,

    /// ECU negative response to the request
    #[error("Command not supported by vehicle: {0}")]
    UnsupportedCommand(String),

    /// Payload is not a whole number of hex byte pairs
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Payload is shorter than the formula requires
    #[error("PID {pid:02X} needs {need} data bytes, got {got}")]
    InsufficientData { pid: u8, need: usize, got: usize },

    /// No formula registered for the requested PID
    #[error("No formula registered for PID {0:02X}")]
    UnknownPid(u8),
}

impl DecodeError {
    /// Whether the adapter itself reported this failure
    pub fn is_adapter_fault(&self) -> bool {
        matches!(
            self,
            DecodeError::NoData
                | DecodeError::AdapterError
                | DecodeError::UnableToConnect
                | DecodeError::BusError(_)
                | DecodeError::Stopped
                | DecodeError::BusInit
                | DecodeError::Misunderstood
                | DecodeError::UnsupportedCommand(_)
        )
    }

    /// Whether re-issuing the same command may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DecodeError::NoData | DecodeError::Stopped | DecodeError::BusError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(DecodeError::NoData.is_retryable());
        assert!(DecodeError::BusError("CAN ERROR".into()).is_retryable());
        assert!(!DecodeError::UnableToConnect.is_retryable());
        assert!(!DecodeError::MalformedPayload("4".into()).is_retryable());
    }

    #[test]
    fn test_adapter_fault_classification() {
        assert!(DecodeError::Stopped.is_adapter_fault());
        assert!(!DecodeError::UnknownPid(0x99).is_adapter_fault());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(!DecodeError::from(io).is_adapter_fault());
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = DecodeError::InsufficientData {
            pid: 0x0C,
            need: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "PID 0C needs 2 data bytes, got 1");
    }
}

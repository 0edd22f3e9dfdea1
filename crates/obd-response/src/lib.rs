//! OBD-II Response Decoding
//!
//! This crate reads responses from ELM327-compatible OBD-II adapters and
//! decodes them into typed, unit-aware values. A response flows through
//! frame reading, sanitizing, fault detection, hex payload extraction and
//! the PID's formula. Opening the channel and sending the command are left
//! to the caller.
//!
//! ```no_run
//! use obd_response::{Pid, UnitSystem};
//!
//! # fn run(port: &mut std::fs::File) -> Result<(), obd_response::DecodeError> {
//! let temp = Pid::AirIntakeTemp.decode(port)?;
//! println!("{}", temp.display(UnitSystem::Imperial));
//! # Ok(())
//! # }
//! ```

mod config;
mod decoder;
mod error;
mod fault;
mod frame;
mod payload;
mod pid;
mod registry;
mod sanitize;
mod value;

pub use crate::config::{DecoderConfig, PidLayoutOverride, ENV_PREFIX};
pub use decoder::Decoder;
pub use error::DecodeError;
pub use fault::{default_fault_phrases, Fault, FaultKind, FaultPhrase, FaultTable, ProtocolOutcome};
pub use frame::{read_frame, read_frame_async, FrameBytes, RawFrame, DEFAULT_PROMPT};
pub use payload::{extract, PayloadBytes};
pub use pid::{Pid, PidFormula, PidLayout, MODE_01_ECHO_LEN};
pub use registry::PidRegistry;
pub use sanitize::{CleanedResponse, Sanitizer, DEFAULT_PLACEHOLDERS};
pub use value::{DisplayValue, PhysicalValue, Quantity, UnitSystem};

/// OBD-II mode constants
pub mod mode {
    /// Current data
    pub const CURRENT_DATA: u8 = 0x01;

    /// Response mode byte for a request mode (request + 0x40, wrapping)
    pub const fn response(mode: u8) -> u8 {
        mode.wrapping_add(0x40)
    }
}

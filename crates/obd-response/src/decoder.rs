//! Response Decoder
//!
//! Runs one command/response cycle through the pipeline:
//! read frame, sanitize, classify faults, extract payload, apply formula.

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::fault::FaultTable;
use crate::frame::{read_frame, read_frame_async, RawFrame};
use crate::payload::extract;
use crate::pid::{PidFormula, PidLayout};
use crate::registry::PidRegistry;
use crate::sanitize::Sanitizer;
use crate::value::PhysicalValue;
use std::io::Read;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::debug;

/// Decodes adapter responses into physical values.
///
/// Holds no per-call state; one decoder can serve any number of channels.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
    registry: PidRegistry,
    sanitizer: Sanitizer,
    faults: FaultTable,
}

impl Decoder {
    pub fn new(config: DecoderConfig, registry: PidRegistry) -> Self {
        let sanitizer = config.sanitizer();
        let faults = config.fault_table();
        Self {
            config,
            registry,
            sanitizer,
            faults,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn registry(&self) -> &PidRegistry {
        &self.registry
    }

    /// Read one response for `pid` from a blocking channel and decode it
    pub fn decode<R: Read>(&self, pid: u8, channel: R) -> Result<PhysicalValue, DecodeError> {
        let formula = self.formula(pid)?;
        let frame = read_frame(channel, self.config.prompt_byte)?;
        self.decode_with(formula.as_ref(), &frame)
    }

    /// Read one response for `pid` from an async channel and decode it
    pub async fn decode_async<R>(&self, pid: u8, channel: &mut R) -> Result<PhysicalValue, DecodeError>
    where
        R: AsyncRead + Unpin,
    {
        let formula = self.formula(pid)?;
        let frame = read_frame_async(channel, self.config.prompt_byte).await?;
        self.decode_with(formula.as_ref(), &frame)
    }

    /// Decode a frame that has already been read
    pub fn decode_frame(&self, pid: u8, frame: &RawFrame) -> Result<PhysicalValue, DecodeError> {
        let formula = self.formula(pid)?;
        self.decode_with(formula.as_ref(), frame)
    }

    fn formula(&self, pid: u8) -> Result<Arc<dyn PidFormula>, DecodeError> {
        self.registry.get(pid).ok_or(DecodeError::UnknownPid(pid))
    }

    fn decode_with(
        &self,
        formula: &dyn PidFormula,
        frame: &RawFrame,
    ) -> Result<PhysicalValue, DecodeError> {
        let pid = formula.pid();
        let command = formula.command();
        let echo = self.config.strip_echo.then_some(command.as_str());

        let cleaned = self.sanitizer.sanitize(frame, echo);
        let cleaned = self.faults.classify(cleaned)?;

        // overrides may move the echo prefix but never shrink what the formula reads
        let declared = formula.layout();
        let layout = match self.config.layout_for(pid) {
            Some(layout) => PidLayout {
                skip_bytes: layout.skip_bytes,
                min_bytes: layout.min_bytes.max(declared.min_bytes),
            },
            None => declared,
        };
        let payload = extract(&cleaned, pid, layout)?;

        let value = formula.decode(&payload);
        debug!("Decoded {} ({:02X}): {}", formula.name(), pid, value);

        Ok(PhysicalValue::new(
            pid,
            value,
            formula.quantity(),
            payload.into_vec(),
        ))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default(), PidRegistry::standard())
    }
}

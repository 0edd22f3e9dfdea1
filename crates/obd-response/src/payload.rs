//! Hex Payload Extraction

use crate::error::DecodeError;
use crate::pid::PidLayout;
use crate::sanitize::CleanedResponse;
use std::ops::Deref;
use tracing::debug;

/// Data bytes of a PID reply, echo prefix removed.
///
/// Only produced by [`extract`], which guarantees the formula's minimum
/// length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadBytes(Vec<u8>);

impl PayloadBytes {
    /// Byte A, B, C... by position
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Big-endian 16-bit word starting at `index` (256A + B)
    pub fn word(&self, index: usize) -> u16 {
        u16::from_be_bytes([self.0[index], self.0[index + 1]])
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for PayloadBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Convert the response's hex digits into payload bytes for `pid`
pub fn extract(
    response: &CleanedResponse,
    pid: u8,
    layout: PidLayout,
) -> Result<PayloadBytes, DecodeError> {
    let digits = response.compact();

    if digits.len() % 2 != 0 {
        return Err(DecodeError::MalformedPayload(format!(
            "odd number of hex digits ({}) in {:?}",
            digits.len(),
            digits
        )));
    }

    let bytes = digits
        .as_bytes()
        .chunks(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(DecodeError::MalformedPayload(format!(
                "non-hex content in {:?}",
                digits
            ))),
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let got = bytes.len().saturating_sub(layout.skip_bytes);
    if bytes.len() < layout.skip_bytes || got < layout.min_bytes {
        return Err(DecodeError::InsufficientData {
            pid,
            need: layout.min_bytes,
            got,
        });
    }

    let payload = bytes[layout.skip_bytes..].to_vec();
    debug!("PID {:02X} payload: {:02X?}", pid, payload);
    Ok(PayloadBytes(payload))
}

fn hex_value(digit: u8) -> Option<u8> {
    char::from(digit).to_digit(16).map(|v| v as u8)
}

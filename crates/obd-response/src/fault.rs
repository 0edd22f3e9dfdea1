//! Adapter Fault Detection
//!
//! Classifies adapter status replies ("NO DATA", "CAN ERROR", ...) before
//! any hex parsing is attempted.

use crate::error::DecodeError;
use crate::sanitize::CleanedResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Kind of fault reported by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    /// "NO DATA": no ECU answered
    NoData,
    /// Generic "ERROR"
    Adapter,
    /// "UNABLE TO CONNECT"
    UnableToConnect,
    /// CAN/bus level failure
    Bus,
    /// "STOPPED": command interrupted
    Stopped,
    /// "BUS INIT: ...ERROR"
    BusInit,
    /// "?": command not understood
    Misunderstood,
    /// ECU negative response (7F)
    UnsupportedCommand,
}

/// One entry of the fault phrase table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultPhrase {
    pub phrase: String,
    pub kind: FaultKind,
}

impl FaultPhrase {
    pub fn new(phrase: &str, kind: FaultKind) -> Self {
        Self {
            phrase: phrase.to_string(),
            kind,
        }
    }
}

/// A classified fault together with the response text that triggered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: FaultKind,
    pub response: String,
}

impl From<Fault> for DecodeError {
    fn from(fault: Fault) -> Self {
        match fault.kind {
            FaultKind::NoData => DecodeError::NoData,
            FaultKind::Adapter => DecodeError::AdapterError,
            FaultKind::UnableToConnect => DecodeError::UnableToConnect,
            FaultKind::Bus => DecodeError::BusError(fault.response),
            FaultKind::Stopped => DecodeError::Stopped,
            FaultKind::BusInit => DecodeError::BusInit,
            FaultKind::Misunderstood => DecodeError::Misunderstood,
            FaultKind::UnsupportedCommand => DecodeError::UnsupportedCommand(fault.response),
        }
    }
}

/// Result of fault classification
pub type ProtocolOutcome = Result<CleanedResponse, Fault>;

/// Default phrase table. Specific phrases come before the generic "ERROR".
pub fn default_fault_phrases() -> Vec<FaultPhrase> {
    vec![
        FaultPhrase::new("NO DATA", FaultKind::NoData),
        FaultPhrase::new("UNABLE TO CONNECT", FaultKind::UnableToConnect),
        FaultPhrase::new("BUS INIT: ...ERROR", FaultKind::BusInit),
        FaultPhrase::new("CAN ERROR", FaultKind::Bus),
        FaultPhrase::new("BUS ERROR", FaultKind::Bus),
        FaultPhrase::new("BUS BUSY", FaultKind::Bus),
        FaultPhrase::new("FB ERROR", FaultKind::Bus),
        FaultPhrase::new("DATA ERROR", FaultKind::Bus),
        FaultPhrase::new("STOPPED", FaultKind::Stopped),
        FaultPhrase::new("?", FaultKind::Misunderstood),
        FaultPhrase::new("ERROR", FaultKind::Adapter),
    ]
}

/// Ordered table of fault phrases; first match wins
#[derive(Debug, Clone)]
pub struct FaultTable {
    // (compacted upper-case phrase, kind)
    entries: Vec<(String, FaultKind)>,
}

impl FaultTable {
    pub fn new(phrases: &[FaultPhrase]) -> Self {
        let entries = phrases
            .iter()
            .map(|p| (compact_upper(&p.phrase), p.kind))
            .filter(|(phrase, _)| !phrase.is_empty())
            .collect();
        Self { entries }
    }

    /// Classify a cleaned response as a fault or pass it through unchanged
    pub fn classify(&self, response: CleanedResponse) -> ProtocolOutcome {
        let text = compact_upper(&response.compact());

        let kind = self
            .entries
            .iter()
            .find(|(phrase, _)| text.contains(phrase.as_str()))
            .map(|(_, kind)| *kind)
            .or_else(|| is_negative_response(&text).then_some(FaultKind::UnsupportedCommand));

        match kind {
            Some(kind) => {
                let fault = Fault {
                    kind,
                    response: response.joined(),
                };
                warn!("Adapter fault {:?}: {}", fault.kind, fault.response);
                Err(fault)
            }
            None => Ok(response),
        }
    }
}

impl Default for FaultTable {
    fn default() -> Self {
        Self::new(&default_fault_phrases())
    }
}

fn compact_upper(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `7F <mode> 11|12`: service or sub-function not supported
fn is_negative_response(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() >= 6
        && b.starts_with(b"7F")
        && b[2] == b'0'
        && b[3].is_ascii_hexdigit()
        && b[4] == b'1'
        && matches!(b[5], b'1' | b'2')
}

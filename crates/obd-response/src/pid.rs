//! OBD-II PID Definitions and Decoding Formulas
//!
//! Each PID supplies its own formula over the payload bytes along with the
//! layout of its reply (echo prefix length, minimum data length).

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::mode;
use crate::payload::PayloadBytes;
use crate::value::{PhysicalValue, Quantity};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Length of the "41 xx" echo in a Mode 01 reply
pub const MODE_01_ECHO_LEN: usize = 2;

/// Shape of a PID reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidLayout {
    /// Echoed mode/PID bytes to drop from the front of the reply
    pub skip_bytes: usize,
    /// Data bytes the formula needs
    pub min_bytes: usize,
}

impl PidLayout {
    pub const fn mode_01(min_bytes: usize) -> Self {
        Self {
            skip_bytes: MODE_01_ECHO_LEN,
            min_bytes,
        }
    }
}

/// Decoding formula for one PID.
///
/// `decode` is only called with payloads of at least `layout().min_bytes`
/// bytes, so implementations may index up to that length directly.
pub trait PidFormula: Send + Sync {
    /// PID byte this formula decodes
    fn pid(&self) -> u8;

    /// Human readable name
    fn name(&self) -> &'static str;

    fn quantity(&self) -> Quantity;

    fn layout(&self) -> PidLayout;

    /// Metric value of the payload
    fn decode(&self, payload: &PayloadBytes) -> f64;

    /// Request string sent to the adapter, also the expected echo
    fn command(&self) -> String {
        format!("{:02X}{:02X}", mode::CURRENT_DATA, self.pid())
    }
}

/// Standard OBD-II PIDs for Mode 01 (current data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pid {
    /// Calculated engine load (0x04)
    EngineLoad = 0x04,
    /// Engine coolant temperature (0x05)
    CoolantTemp = 0x05,
    /// Short-term fuel trim bank 1 (0x06)
    ShortFuelTrim = 0x06,
    /// Long-term fuel trim bank 1 (0x07)
    LongFuelTrim = 0x07,
    /// Fuel pressure, gauge (0x0A)
    FuelPressure = 0x0A,
    /// Intake manifold absolute pressure (0x0B)
    IntakeManifoldPressure = 0x0B,
    /// Engine RPM (0x0C)
    Rpm = 0x0C,
    /// Vehicle speed (0x0D)
    Speed = 0x0D,
    /// Timing advance (0x0E)
    TimingAdvance = 0x0E,
    /// Intake air temperature (0x0F)
    AirIntakeTemp = 0x0F,
    /// Mass air flow rate (0x10)
    Maf = 0x10,
    /// Throttle position (0x11)
    ThrottlePosition = 0x11,
    /// Oxygen sensor voltage bank 1, sensor 1 (0x14)
    O2Voltage = 0x14,
    /// Run time since engine start (0x1F)
    RuntimeSinceStart = 0x1F,
    /// Distance traveled with MIL on (0x21)
    DistanceWithMil = 0x21,
    /// Fuel tank level input (0x2F)
    FuelLevel = 0x2F,
    /// Distance traveled since codes cleared (0x31)
    DistanceSinceCodesCleared = 0x31,
    /// Absolute barometric pressure (0x33)
    BarometricPressure = 0x33,
    /// Control module voltage (0x42)
    ControlModuleVoltage = 0x42,
    /// Ambient air temperature (0x46)
    AmbientAirTemp = 0x46,
    /// Engine oil temperature (0x5C)
    OilTemp = 0x5C,
    /// Engine fuel rate (0x5E)
    FuelRate = 0x5E,
}

impl Pid {
    pub const ALL: [Pid; 22] = [
        Pid::EngineLoad,
        Pid::CoolantTemp,
        Pid::ShortFuelTrim,
        Pid::LongFuelTrim,
        Pid::FuelPressure,
        Pid::IntakeManifoldPressure,
        Pid::Rpm,
        Pid::Speed,
        Pid::TimingAdvance,
        Pid::AirIntakeTemp,
        Pid::Maf,
        Pid::ThrottlePosition,
        Pid::O2Voltage,
        Pid::RuntimeSinceStart,
        Pid::DistanceWithMil,
        Pid::FuelLevel,
        Pid::DistanceSinceCodesCleared,
        Pid::BarometricPressure,
        Pid::ControlModuleVoltage,
        Pid::AmbientAirTemp,
        Pid::OilTemp,
        Pid::FuelRate,
    ];

    /// Get the PID hex value
    pub fn as_hex(&self) -> u8 {
        *self as u8
    }

    /// Look up a standard PID by its hex value
    pub fn from_hex(pid: u8) -> Option<Pid> {
        Self::ALL.iter().copied().find(|p| p.as_hex() == pid)
    }

    /// Get the number of response bytes for this PID
    pub fn response_bytes(&self) -> usize {
        match self {
            Pid::Rpm
            | Pid::Maf
            | Pid::O2Voltage
            | Pid::RuntimeSinceStart
            | Pid::DistanceWithMil
            | Pid::DistanceSinceCodesCleared
            | Pid::ControlModuleVoltage
            | Pid::FuelRate => 2,
            _ => 1,
        }
    }

    /// Read and decode this PID's reply with the default decoder
    pub fn decode<R: Read>(self, channel: R) -> Result<PhysicalValue, DecodeError> {
        Decoder::default().decode(self.as_hex(), channel)
    }
}

impl PidFormula for Pid {
    fn pid(&self) -> u8 {
        self.as_hex()
    }

    fn name(&self) -> &'static str {
        match self {
            Pid::EngineLoad => "Engine Load",
            Pid::CoolantTemp => "Engine Coolant Temperature",
            Pid::ShortFuelTrim => "Short Term Fuel Trim Bank 1",
            Pid::LongFuelTrim => "Long Term Fuel Trim Bank 1",
            Pid::FuelPressure => "Fuel Pressure",
            Pid::IntakeManifoldPressure => "Intake Manifold Pressure",
            Pid::Rpm => "Engine RPM",
            Pid::Speed => "Vehicle Speed",
            Pid::TimingAdvance => "Timing Advance",
            Pid::AirIntakeTemp => "Air Intake Temperature",
            Pid::Maf => "Mass Air Flow",
            Pid::ThrottlePosition => "Throttle Position",
            Pid::O2Voltage => "O2 Sensor Voltage B1S1",
            Pid::RuntimeSinceStart => "Engine Runtime",
            Pid::DistanceWithMil => "Distance with MIL on",
            Pid::FuelLevel => "Fuel Level",
            Pid::DistanceSinceCodesCleared => "Distance since codes cleared",
            Pid::BarometricPressure => "Barometric Pressure",
            Pid::ControlModuleVoltage => "Control Module Voltage",
            Pid::AmbientAirTemp => "Ambient Air Temperature",
            Pid::OilTemp => "Engine Oil Temperature",
            Pid::FuelRate => "Fuel Consumption Rate",
        }
    }

    fn quantity(&self) -> Quantity {
        match self {
            Pid::CoolantTemp | Pid::AirIntakeTemp | Pid::AmbientAirTemp | Pid::OilTemp => {
                Quantity::Temperature
            }
            Pid::EngineLoad
            | Pid::ShortFuelTrim
            | Pid::LongFuelTrim
            | Pid::ThrottlePosition
            | Pid::FuelLevel => Quantity::Percent,
            Pid::FuelPressure | Pid::IntakeManifoldPressure | Pid::BarometricPressure => {
                Quantity::Pressure
            }
            Pid::Rpm => Quantity::Rpm,
            Pid::Speed => Quantity::Speed,
            Pid::TimingAdvance => Quantity::Angle,
            Pid::Maf => Quantity::MassFlow,
            Pid::O2Voltage | Pid::ControlModuleVoltage => Quantity::Voltage,
            Pid::RuntimeSinceStart => Quantity::Duration,
            Pid::DistanceWithMil | Pid::DistanceSinceCodesCleared => Quantity::Distance,
            Pid::FuelRate => Quantity::VolumeFlow,
        }
    }

    fn layout(&self) -> PidLayout {
        PidLayout::mode_01(self.response_bytes())
    }

    fn decode(&self, payload: &PayloadBytes) -> f64 {
        let a = payload.byte(0) as f64;
        match self {
            // A - 40 (°C)
            Pid::CoolantTemp | Pid::AirIntakeTemp | Pid::AmbientAirTemp | Pid::OilTemp => {
                a - 40.0
            }
            // A * 100 / 255 (%)
            Pid::EngineLoad | Pid::ThrottlePosition | Pid::FuelLevel => a * 100.0 / 255.0,
            // (A - 128) * 100 / 128 (%)
            Pid::ShortFuelTrim | Pid::LongFuelTrim => (a - 128.0) * 100.0 / 128.0,
            // A * 3 (kPa)
            Pid::FuelPressure => a * 3.0,
            // A (kPa)
            Pid::IntakeManifoldPressure | Pid::BarometricPressure => a,
            // ((A*256)+B)/4
            Pid::Rpm => payload.word(0) as f64 / 4.0,
            // A (km/h)
            Pid::Speed => a,
            // A/2 - 64 (degrees)
            Pid::TimingAdvance => a / 2.0 - 64.0,
            // ((A*256)+B) / 100 (g/s)
            Pid::Maf => payload.word(0) as f64 / 100.0,
            // A / 200 (V)
            Pid::O2Voltage => a / 200.0,
            // (A*256)+B (s, km)
            Pid::RuntimeSinceStart | Pid::DistanceWithMil | Pid::DistanceSinceCodesCleared => {
                payload.word(0) as f64
            }
            // ((A*256)+B) / 1000 (V)
            Pid::ControlModuleVoltage => payload.word(0) as f64 / 1000.0,
            // ((A*256)+B) / 20 (L/h)
            Pid::FuelRate => payload.word(0) as f64 / 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::extract;
    use crate::sanitize::CleanedResponse;

    fn decode(pid: Pid, data: &[u8]) -> f64 {
        let mut tokens = vec!["41".to_string(), format!("{:02X}", pid.as_hex())];
        tokens.extend(data.iter().map(|b| format!("{:02X}", b)));
        let payload = extract(&CleanedResponse::new(tokens), pid.as_hex(), pid.layout()).unwrap();
        PidFormula::decode(&pid, &payload)
    }

    #[test]
    fn test_rpm_decode() {
        // 1A 2B => ((0x1A * 256) + 0x2B) / 4 = (26*256 + 43) / 4 = 6699/4 = 1674.75
        assert!((decode(Pid::Rpm, &[0x1A, 0x2B]) - 1674.75).abs() < 0.01);
    }

    #[test]
    fn test_coolant_temp_decode() {
        // 0x73 = 115, so temp = 115 - 40 = 75°C
        assert!((decode(Pid::CoolantTemp, &[0x73]) - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_temperature_bounds() {
        assert_eq!(decode(Pid::AirIntakeTemp, &[0x00]), -40.0);
        assert_eq!(decode(Pid::AirIntakeTemp, &[0xFF]), 215.0);
    }

    #[test]
    fn test_speed_decode() {
        // 0x55 = 85 km/h
        assert!((decode(Pid::Speed, &[0x55]) - 85.0).abs() < 0.01);
    }

    #[test]
    fn test_fuel_trim_decode() {
        // 0x80 = 128, so trim = (128-128)*100/128 = 0%
        assert!((decode(Pid::ShortFuelTrim, &[0x80]) - 0.0).abs() < 0.01);

        // 0x90 = 144, so trim = (144-128)*100/128 = 12.5%
        assert!((decode(Pid::LongFuelTrim, &[0x90]) - 12.5).abs() < 0.01);
    }

    #[test]
    fn test_timing_advance_decode() {
        // 0x8C = 140, 140/2 - 64 = 6°
        assert!((decode(Pid::TimingAdvance, &[0x8C]) - 6.0).abs() < 0.01);
    }

    #[test]
    fn test_module_voltage_decode() {
        // 0x3A98 = 15000 mV
        assert!((decode(Pid::ControlModuleVoltage, &[0x3A, 0x98]) - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_load_and_throttle_full_scale() {
        assert!((decode(Pid::EngineLoad, &[0xFF]) - 100.0).abs() < 0.01);
        assert!((decode(Pid::ThrottlePosition, &[0x00])).abs() < 0.01);
    }

    #[test]
    fn test_command_string() {
        assert_eq!(Pid::AirIntakeTemp.command(), "010F");
        assert_eq!(Pid::Rpm.command(), "010C");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Pid::from_hex(0x46), Some(Pid::AmbientAirTemp));
        assert_eq!(Pid::from_hex(0xFE), None);
        for pid in Pid::ALL {
            assert_eq!(Pid::from_hex(pid.as_hex()), Some(pid));
        }
    }
}

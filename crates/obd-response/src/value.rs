//! Physical Values and Units
//!
//! Decoded values are stored in metric units only. The imperial reading is
//! computed from the stored value each time it is asked for.

use serde::{Deserialize, Serialize};
use std::fmt;

const KM_TO_MILES: f64 = 0.621371192;
const KPA_TO_PSI: f64 = 0.145037738;
const GRAMS_PER_SEC_TO_LB_PER_MIN: f64 = 0.132277357;
const LITRES_TO_US_GALLONS: f64 = 0.264172052;

/// Unit system used when reading a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Physical quantity a PID measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    /// °C / °F
    Temperature,
    /// km/h / mph
    Speed,
    /// kPa / psi
    Pressure,
    /// km / mi
    Distance,
    /// g/s / lb/min
    MassFlow,
    /// L/h / gal/h
    VolumeFlow,
    Percent,
    Voltage,
    Rpm,
    /// Seconds
    Duration,
    /// Degrees before TDC
    Angle,
}

impl Quantity {
    /// Convert a metric value into the given unit system
    pub fn convert(&self, metric: f64, units: UnitSystem) -> f64 {
        if units == UnitSystem::Metric {
            return metric;
        }
        match self {
            Quantity::Temperature => metric * 9.0 / 5.0 + 32.0,
            Quantity::Speed | Quantity::Distance => metric * KM_TO_MILES,
            Quantity::Pressure => metric * KPA_TO_PSI,
            Quantity::MassFlow => metric * GRAMS_PER_SEC_TO_LB_PER_MIN,
            Quantity::VolumeFlow => metric * LITRES_TO_US_GALLONS,
            Quantity::Percent
            | Quantity::Voltage
            | Quantity::Rpm
            | Quantity::Duration
            | Quantity::Angle => metric,
        }
    }

    /// Unit symbol in the given unit system
    pub fn unit(&self, units: UnitSystem) -> &'static str {
        match (self, units) {
            (Quantity::Temperature, UnitSystem::Metric) => "°C",
            (Quantity::Temperature, UnitSystem::Imperial) => "°F",
            (Quantity::Speed, UnitSystem::Metric) => "km/h",
            (Quantity::Speed, UnitSystem::Imperial) => "mph",
            (Quantity::Pressure, UnitSystem::Metric) => "kPa",
            (Quantity::Pressure, UnitSystem::Imperial) => "psi",
            (Quantity::Distance, UnitSystem::Metric) => "km",
            (Quantity::Distance, UnitSystem::Imperial) => "mi",
            (Quantity::MassFlow, UnitSystem::Metric) => "g/s",
            (Quantity::MassFlow, UnitSystem::Imperial) => "lb/min",
            (Quantity::VolumeFlow, UnitSystem::Metric) => "L/h",
            (Quantity::VolumeFlow, UnitSystem::Imperial) => "gal/h",
            (Quantity::Percent, _) => "%",
            (Quantity::Voltage, _) => "V",
            (Quantity::Rpm, _) => "RPM",
            (Quantity::Duration, _) => "s",
            (Quantity::Angle, _) => "°",
        }
    }
}

/// A decoded PID value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalValue {
    /// The PID that was decoded
    pub pid: u8,
    /// Value in metric units
    value: f64,
    quantity: Quantity,
    /// Payload bytes the value was decoded from
    pub raw_bytes: Vec<u8>,
}

impl PhysicalValue {
    pub fn new(pid: u8, value: f64, quantity: Quantity, raw_bytes: Vec<u8>) -> Self {
        Self {
            pid,
            value,
            quantity,
            raw_bytes,
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Value in the requested unit system
    pub fn value(&self, units: UnitSystem) -> f64 {
        self.quantity.convert(self.value, units)
    }

    /// Native metric value
    pub fn metric(&self) -> f64 {
        self.value
    }

    pub fn imperial(&self) -> f64 {
        self.value(UnitSystem::Imperial)
    }

    /// Unit symbol in the requested unit system
    pub fn unit(&self, units: UnitSystem) -> &'static str {
        self.quantity.unit(units)
    }

    /// Formatter for the requested unit system
    pub fn display(&self, units: UnitSystem) -> DisplayValue<'_> {
        DisplayValue { value: self, units }
    }
}

impl fmt::Display for PhysicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(UnitSystem::Metric), f)
    }
}

/// Formats a [`PhysicalValue`] in a chosen unit system
pub struct DisplayValue<'a> {
    value: &'a PhysicalValue,
    units: UnitSystem,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(1);
        write!(
            f,
            "{:.*}{}",
            precision,
            self.value.value(self.units),
            self.value.unit(self.units)
        )
    }
}

//! Mode indicators and measurement units shown on the meter's LCD.

use std::fmt::{Display, Formatter};

/// A mode or state indicator of the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    Ac,
    Dc,
    Autorange,
    Connected,
    Negative,
    Diode,
    Continuity,
    Relative,
    Hold,
    LowBattery,
    Minimum,
    Maximum,
}

impl Flag {
    pub const ALL: [Flag; 12] = [
        Flag::Ac,
        Flag::Dc,
        Flag::Autorange,
        Flag::Connected,
        Flag::Negative,
        Flag::Diode,
        Flag::Continuity,
        Flag::Relative,
        Flag::Hold,
        Flag::LowBattery,
        Flag::Minimum,
        Flag::Maximum,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Flag::Ac => "AC",
            Flag::Dc => "DC",
            Flag::Autorange => "AUTORANGE",
            Flag::Connected => "CONNECTED",
            Flag::Negative => "NEGATIVE",
            Flag::Diode => "DIODE",
            Flag::Continuity => "CONTINUITY",
            Flag::Relative => "RELATIVE",
            Flag::Hold => "HOLD",
            Flag::LowBattery => "LOW_BATTERY",
            Flag::Minimum => "MINIMUM",
            Flag::Maximum => "MAXIMUM",
        }
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A scale prefix or kind of quantity lit next to the digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Micro,
    Nano,
    Kilo,
    Milli,
    Percent,
    Mega,
    Farad,
    Ohm,
    Amp,
    Volt,
    Hertz,
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub const ALL: [Unit; 13] = [
        Unit::Micro,
        Unit::Nano,
        Unit::Kilo,
        Unit::Milli,
        Unit::Percent,
        Unit::Mega,
        Unit::Farad,
        Unit::Ohm,
        Unit::Amp,
        Unit::Volt,
        Unit::Hertz,
        Unit::Celsius,
        Unit::Fahrenheit,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Unit::Micro => "MICRO",
            Unit::Nano => "NANO",
            Unit::Kilo => "KILO",
            Unit::Milli => "MILLI",
            Unit::Percent => "PERCENT",
            Unit::Mega => "MEGA",
            Unit::Farad => "FARAD",
            Unit::Ohm => "OHM",
            Unit::Amp => "AMP",
            Unit::Volt => "VOLT",
            Unit::Hertz => "HERTZ",
            Unit::Celsius => "CELSIUS",
            Unit::Fahrenheit => "FAHRENHEIT",
        }
    }

    /// Scale prefix symbol, `None` for units that are not a prefix.
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Unit::Nano => Some("n"),
            Unit::Micro => Some("u"),
            Unit::Milli => Some("m"),
            Unit::Kilo => Some("k"),
            Unit::Mega => Some("M"),
            _ => None,
        }
    }

    /// Quantity symbol, `None` for scale prefixes.
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            Unit::Volt => Some("V"),
            Unit::Amp => Some("A"),
            Unit::Ohm => Some("Ohm"),
            Unit::Farad => Some("F"),
            Unit::Hertz => Some("Hz"),
            Unit::Percent => Some("%"),
            Unit::Celsius => Some("°C"),
            Unit::Fahrenheit => Some("°F"),
            _ => None,
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a set of units as the short form printed on the LCD, e.g. `mV`.
///
/// The last prefix and the last symbol found win; a reading normally carries
/// at most one of each.
pub fn readable_unit(units: &[Unit]) -> String {
    let prefix = units.iter().rev().find_map(|u| u.prefix()).unwrap_or("");
    let symbol = units.iter().rev().find_map(|u| u.symbol()).unwrap_or("");

    format!("{prefix}{symbol}")
}

#[test]
fn test_readable_unit() {
    assert_eq!(readable_unit(&[Unit::Milli, Unit::Volt]), "mV");
    assert_eq!(readable_unit(&[Unit::Mega, Unit::Ohm]), "MOhm");
    assert_eq!(readable_unit(&[Unit::Nano, Unit::Farad]), "nF");
    assert_eq!(readable_unit(&[Unit::Celsius]), "°C");
    assert_eq!(readable_unit(&[Unit::Kilo]), "k");
    assert_eq!(readable_unit(&[]), "");
}

#[test]
fn test_names_are_unique() {
    let mut names = Flag::ALL.map(Flag::name).to_vec();
    names.extend(Unit::ALL.map(Unit::name));
    let total = names.len();

    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

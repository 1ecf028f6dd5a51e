//! Spectral type codes and their display form.
//!
//! The catalog stores spectral types as numeric codes counted from `M0 = 0`, with
//! ten subtypes per class (`L0 = 10`, `T0 = 20`, `Y0 = 30`, negative codes are K
//! types). Free-form labels such as `"peculiar"` are stored as text.

use std::fmt;

use serde::Serialize;

use crate::table::Value;

/// Wavelength regime a spectral type was measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Regime {
    /// Optical spectroscopy.
    Optical,
    /// Near-infrared spectroscopy.
    Infrared,
    /// Anything else, including a missing label.
    Unknown,
}

impl Regime {
    /// Parse a catalog regime label. Unrecognized labels are [`Regime::Unknown`].
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "opt" | "optical" => Regime::Optical,
            "ir" | "infrared" => Regime::Infrared,
            _ => Regime::Unknown,
        }
    }

    /// Regime of a table cell.
    pub fn from_value(value: &Value) -> Self {
        value.as_text().map_or(Regime::Unknown, Regime::parse)
    }
}

/// A raw spectral type as stored in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SpectralCode {
    /// Numeric code, `M0 = 0`.
    Numeric(f64),
    /// Opaque label, displayed unchanged.
    Label(String),
}

impl SpectralCode {
    /// Interpret a table cell. Text that parses as a number is numeric.
    ///
    /// Returns `None` for a missing cell.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Integer(i) => Some(SpectralCode::Numeric(*i as f64)),
            Value::Real(r) => Some(SpectralCode::Numeric(*r)),
            Value::Text(s) => Some(SpectralCode::from(s.as_str())),
        }
    }
}

impl From<f64> for SpectralCode {
    fn from(value: f64) -> Self {
        SpectralCode::Numeric(value)
    }
}

impl From<&str> for SpectralCode {
    fn from(value: &str) -> Self {
        match value.trim().parse() {
            Ok(code) => SpectralCode::Numeric(code),
            Err(_) => SpectralCode::Label(value.to_owned()),
        }
    }
}

impl fmt::Display for SpectralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match classify(self) {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

/// Class letter of a numeric code.
///
/// The ranges are checked one after another and a later match overwrites an
/// earlier one. Since the ranges do not overlap the result is the plain range
/// lookup, with each boundary (30, 20, 10, 0) in the upper class. NaN matches
/// nothing.
pub fn numeric_class(code: f64) -> Option<char> {
    let mut class = None;
    if code >= 30. {
        class = Some('Y');
    }
    if (20. ..30.).contains(&code) {
        class = Some('T');
    }
    if (10. ..20.).contains(&code) {
        class = Some('L');
    }
    if (0. ..10.).contains(&code) {
        class = Some('M');
    }
    if code < 0. {
        class = Some('K');
    }
    class
}

/// Display form of a spectral type: class letter plus subtype with one decimal.
///
/// Labels are returned unchanged. Returns `None` only for a NaN code.
///
/// # Example
/// ```
/// # use oncview::sptype::{classify, SpectralCode};
/// assert_eq!(classify(&SpectralCode::from(15.4)).unwrap(), "L5.4");
/// assert_eq!(classify(&SpectralCode::from("peculiar")).unwrap(), "peculiar");
/// ```
pub fn classify(code: &SpectralCode) -> Option<String> {
    match code {
        SpectralCode::Label(label) => Some(label.clone()),
        SpectralCode::Numeric(code) => {
            let class = numeric_class(*code)?;
            Some(format!("{class}{:.1}", code.abs() % 10.))
        }
    }
}

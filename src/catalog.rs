//! Catalog objects as read from the `sources` table.

use log::warn;
use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::table::{RowRef, Table, Value};

/// Identifier of a catalog object.
pub type SourceId = i64;

/// Table and column names of the catalog schema.
pub mod schema {
    /// Table of catalog objects.
    pub const SOURCES: &str = "sources";
    /// Parallax measurements.
    pub const PARALLAXES: &str = "parallaxes";
    /// Spectral type measurements.
    pub const SPECTRAL_TYPES: &str = "spectral_types";
    /// Photometric measurements.
    pub const PHOTOMETRY: &str = "photometry";
    /// Spectra.
    pub const SPECTRA: &str = "spectra";

    /// Primary key of `sources`.
    pub const ID: &str = "id";
    /// Foreign key of every child table.
    pub const SOURCE_ID: &str = "source_id";
    /// Preferred designation.
    pub const DESIGNATION: &str = "designation";
    /// Short designation, used where `designation` is not selected.
    pub const SHORTNAME: &str = "shortname";
    /// Alternate designations.
    pub const NAMES: &str = "names";
    /// Right ascension in degrees.
    pub const RA: &str = "ra";
    /// Declination in degrees.
    pub const DEC: &str = "dec";
    /// Free text comments.
    pub const COMMENTS: &str = "comments";
    /// Parallax in mas.
    pub const PARALLAX: &str = "parallax";
    /// Numeric or text spectral type.
    pub const SPECTRAL_TYPE: &str = "spectral_type";
    /// Spectral type regime label.
    pub const REGIME: &str = "regime";
}

/// One catalog object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogObject {
    /// Unique identifier.
    pub id: SourceId,
    /// Preferred designation.
    pub designation: String,
    /// Alternate designations, as stored.
    pub alternate_names: String,
    /// Right ascension in degrees, `None` when missing.
    pub ra: Option<f64>,
    /// Declination in degrees, `None` when missing.
    pub dec: Option<f64>,
    /// Free text comments.
    pub comments: String,
}

impl CatalogObject {
    /// Read an object from a `sources` row.
    ///
    /// A row without an integer id is a data integrity error. Non-finite
    /// coordinates count as missing. Out of range coordinates are kept and logged.
    pub fn from_row(row: &RowRef<'_>) -> Result<Self> {
        let id = row.get(schema::ID).as_i64().ok_or_else(|| {
            CatalogError::DataIntegrity(format!(
                "source row without an integer id: {:?}",
                row.get(schema::ID)
            ))
        })?;

        let designation = match row.get(schema::DESIGNATION) {
            Value::Null => text(row.get(schema::SHORTNAME)),
            value => text(value),
        };

        let object = Self {
            id,
            designation,
            alternate_names: text(row.get(schema::NAMES)),
            ra: coordinate(row.get(schema::RA)),
            dec: coordinate(row.get(schema::DEC)),
            comments: text(row.get(schema::COMMENTS)),
        };
        if object.position().is_some() && !object.has_valid_position() {
            warn!(
                "Source {id} has out of range coordinates {:?}, keeping them as given.",
                object.position()
            );
        }
        Ok(object)
    }

    /// Read every row of a `sources` table.
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        table.rows().map(|row| Self::from_row(&row)).collect()
    }

    /// `(ra, dec)` when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.ra.zip(self.dec)
    }

    /// Whether `ra ∈ [0, 360)` and `dec ∈ [-90, 90]`.
    pub fn has_valid_position(&self) -> bool {
        self.position()
            .is_some_and(|(ra, dec)| (0. ..360.).contains(&ra) && (-90. ..=90.).contains(&dec))
    }
}

fn text(value: &Value) -> String {
    value.to_string()
}

fn coordinate(value: &Value) -> Option<f64> {
    let coordinate = value.as_f64().filter(|c| c.is_finite());
    if coordinate.is_none() && !value.is_null() {
        warn!("Ignoring non-numeric coordinate {value:?}.");
    }
    coordinate
}

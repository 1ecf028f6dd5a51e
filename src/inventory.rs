//! Per-object inventory summary.
//!
//! An inventory is every row of every table that references one catalog object.
//! [`aggregate`] turns it into an [`ObjectSummary`]: identity taken from the
//! `sources` row, a display position, distances from parallaxes, spectral types
//! grouped by regime, and every table as a display sub-table.
//!
//! Derived fields that cannot be computed do not fail the summary. They degrade
//! to [`Distance::Unavailable`] (shown as `N/A`) and
//! [`SpectralTypes::Unavailable`] (shown as an empty string).

use std::fmt;

use itertools::Itertools;
use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::{CatalogObject, SourceId, schema};
use crate::coords::to_hmsdms;
use crate::error::{CatalogError, Result};
use crate::sptype::{Regime, SpectralCode, classify};
use crate::table::{DisplayTable, Table, TableSet};

/// Distance derived from the parallaxes of one object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Distance {
    /// One distance in parsecs per parallax row, in row order.
    Parsecs(Vec<f64>),
    /// No parallaxes, or at least one that cannot give a finite distance.
    Unavailable,
}

impl Distance {
    /// Distances from a `parallaxes` table.
    ///
    /// A single missing or non-positive parallax makes the whole field
    /// unavailable rather than showing a partial list.
    pub fn from_parallaxes(parallaxes: Option<&Table>) -> Self {
        let Some(parallaxes) = parallaxes.filter(|t| !t.is_empty()) else {
            return Distance::Unavailable;
        };

        let distances: Option<Vec<f64>> = parallaxes
            .rows()
            .map(|row| {
                row.get(schema::PARALLAX)
                    .as_f64()
                    .filter(|plx| *plx > 0. && plx.is_finite())
                    .map(|plx| 1000. / plx)
            })
            .collect();

        match distances {
            Some(distances) => Distance::Parsecs(distances),
            None => {
                warn!("Invalid parallax, distance unavailable.");
                Distance::Unavailable
            }
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Parsecs(distances) => write!(
                f,
                "{} pc",
                distances.iter().map(|d| format!("{d:.2}")).join(", ")
            ),
            Distance::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Spectral types of one object, grouped for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SpectralTypes {
    /// At least one optical type exists. Infrared types are listed separately.
    Regimes {
        /// Classified optical types.
        optical: Vec<String>,
        /// Classified infrared types, possibly empty.
        infrared: Vec<String>,
    },
    /// No optical type exists: every type, whatever its regime, without a label.
    Unlabeled(Vec<String>),
    /// The spectral type table is missing or a type could not be read.
    Unavailable,
}

impl SpectralTypes {
    /// Spectral types from a `spectral_types` table.
    pub fn from_table(spectral_types: Option<&Table>) -> Self {
        let Some(table) = spectral_types else {
            return SpectralTypes::Unavailable;
        };

        let entries: Option<Vec<(Regime, String)>> = table
            .rows()
            .map(|row| {
                let code = SpectralCode::from_value(row.get(schema::SPECTRAL_TYPE))?;
                Some((Regime::from_value(row.get(schema::REGIME)), classify(&code)?))
            })
            .collect();

        match entries {
            Some(entries) => group_by_regime(entries),
            None => {
                warn!("Unreadable spectral type, spectral types unavailable.");
                SpectralTypes::Unavailable
            }
        }
    }
}

/// Group classified types by regime.
///
/// Regime labels are only used when an optical type exists. Without one, all
/// types are listed unlabeled, infrared ones included.
fn group_by_regime(entries: Vec<(Regime, String)>) -> SpectralTypes {
    let has_optical = entries.iter().any(|(regime, _)| *regime == Regime::Optical);
    if !has_optical {
        return SpectralTypes::Unlabeled(entries.into_iter().map(|(_, t)| t).collect());
    }

    let of = |wanted: Regime| {
        entries
            .iter()
            .filter(|(regime, _)| *regime == wanted)
            .map(|(_, t)| t.clone())
            .collect_vec()
    };
    SpectralTypes::Regimes {
        optical: of(Regime::Optical),
        infrared: of(Regime::Infrared),
    }
}

impl fmt::Display for SpectralTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectralTypes::Regimes { optical, infrared } => {
                write!(f, "Optical: {}", optical.join(", "))?;
                if !infrared.is_empty() {
                    write!(f, " Infrared: {}", infrared.join(", "))?;
                }
                Ok(())
            }
            SpectralTypes::Unlabeled(types) => f.write_str(&types.join(", ")),
            SpectralTypes::Unavailable => Ok(()),
        }
    }
}

/// Everything known about one catalog object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectSummary {
    /// Identity, with the raw float coordinates.
    pub object: CatalogObject,
    /// Sexagesimal position for display, `None` when coordinates are missing.
    pub coordinates: Option<String>,
    /// Distance from parallaxes.
    pub distance: Distance,
    /// Spectral types by regime.
    pub spectral_types: SpectralTypes,
    /// Every inventory table, in store order.
    pub tables: Vec<DisplayTable>,
}

/// Build the summary of `source_id` from its inventory tables.
///
/// # Errors
/// - [`CatalogError::NotFound`] when there is no `sources` row.
/// - [`CatalogError::DataIntegrity`] when there are several `sources` rows, or the
///   row belongs to another id.
pub fn aggregate(source_id: SourceId, inventory: &TableSet) -> Result<ObjectSummary> {
    info!("Aggregating inventory of source {source_id}.");

    let sources = inventory
        .get(schema::SOURCES)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CatalogError::NotFound(format!("no source with id {source_id}")))?;
    let row = match sources.rows().exactly_one() {
        Ok(row) => row,
        Err(rows) => {
            return Err(CatalogError::DataIntegrity(format!(
                "{} source rows for id {source_id}",
                rows.count()
            )));
        }
    };

    let object = CatalogObject::from_row(&row)?;
    if object.id != source_id {
        return Err(CatalogError::DataIntegrity(format!(
            "inventory of {source_id} returned source {}",
            object.id
        )));
    }

    let coordinates = object.position().map(|(ra, dec)| to_hmsdms(ra, dec));
    let distance = Distance::from_parallaxes(inventory.get(schema::PARALLAXES));
    let spectral_types = SpectralTypes::from_table(inventory.get(schema::SPECTRAL_TYPES));
    let tables = inventory.iter().map(Table::display).collect_vec();
    debug!(
        "Source {source_id}: {} inventory tables, distance {distance}, spectral types `{spectral_types}`.",
        tables.len()
    );

    Ok(ObjectSummary {
        object,
        coordinates,
        distance,
        spectral_types,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sources(id: i64) -> Table {
        Table::new("sources", ["id", "ra", "dec", "designation", "names", "comments"]).with_row([
            Value::from(id),
            83.8221.into(),
            (-5.3911).into(),
            "Theta1 Ori C".into(),
            "HD 37022".into(),
            "O-type".into(),
        ])
    }

    fn parallaxes(values: &[Value]) -> Table {
        values
            .iter()
            .enumerate()
            .fold(Table::new("parallaxes", ["id", "source_id", "parallax"]), |t, (i, v)| {
                t.with_row([Value::from(i as i64), 1.into(), v.clone()])
            })
    }

    fn spectral_types(rows: &[(&str, Value)]) -> Table {
        rows.iter().fold(
            Table::new("spectral_types", ["source_id", "spectral_type", "regime"]),
            |t, (regime, code)| t.with_row([Value::from(1), code.clone(), (*regime).into()]),
        )
    }

    #[test]
    fn distance_from_parallaxes() {
        let table = parallaxes(&[10.0.into(), 2.5.into()]);
        let distance = Distance::from_parallaxes(Some(&table));
        assert_eq!(distance, Distance::Parsecs(vec![100., 400.]));
        assert_eq!(distance.to_string(), "100.00, 400.00 pc");
    }

    #[test]
    fn one_bad_parallax_poisons_distance() {
        let table = parallaxes(&[10.0.into(), (-2.0).into()]);
        assert_eq!(Distance::from_parallaxes(Some(&table)), Distance::Unavailable);

        let table = parallaxes(&[10.0.into(), 0.0.into()]);
        assert_eq!(Distance::from_parallaxes(Some(&table)).to_string(), "N/A");

        let table = parallaxes(&[Value::Null]);
        assert_eq!(Distance::from_parallaxes(Some(&table)), Distance::Unavailable);
    }

    #[test]
    fn no_parallaxes() {
        assert_eq!(Distance::from_parallaxes(None), Distance::Unavailable);
        assert_eq!(
            Distance::from_parallaxes(Some(&parallaxes(&[]))),
            Distance::Unavailable
        );
    }

    #[test]
    fn infrared_only_is_unlabeled() {
        let table = spectral_types(&[("IR", 15.into())]);
        let types = SpectralTypes::from_table(Some(&table));
        assert_eq!(types, SpectralTypes::Unlabeled(vec!["L5.0".into()]));
        assert_eq!(types.to_string(), "L5.0");
    }

    #[test]
    fn optical_and_infrared_are_labeled() {
        let table = spectral_types(&[
            ("OPT", 6.5.into()),
            ("IR", 15.into()),
            ("OPT", "peculiar".into()),
            ("UV", 21.into()),
        ]);
        let types = SpectralTypes::from_table(Some(&table));
        assert_eq!(types.to_string(), "Optical: M6.5, peculiar Infrared: L5.0");
    }

    #[test]
    fn optical_only() {
        let table = spectral_types(&[("OPT", (-1.0).into())]);
        assert_eq!(
            SpectralTypes::from_table(Some(&table)).to_string(),
            "Optical: K1.0"
        );
    }

    #[test]
    fn unknown_regimes_are_unlabeled() {
        let table = spectral_types(&[("", 20.into()), ("IR", 31.into())]);
        assert_eq!(
            SpectralTypes::from_table(Some(&table)).to_string(),
            "T0.0, Y1.0"
        );
    }

    #[test]
    fn unreadable_spectral_type_degrades() {
        let table = spectral_types(&[("OPT", 5.into()), ("IR", Value::Null)]);
        assert_eq!(
            SpectralTypes::from_table(Some(&table)),
            SpectralTypes::Unavailable
        );
        assert_eq!(SpectralTypes::from_table(None).to_string(), "");
    }

    #[test]
    fn full_summary() {
        let inventory = TableSet::new()
            .with_table(sources(1))
            .with_table(parallaxes(&[2.5.into()]))
            .with_table(spectral_types(&[("OPT", 0.into())]));

        let summary = aggregate(1, &inventory).unwrap();
        assert_eq!(summary.object.designation, "Theta1 Ori C");
        assert_eq!(summary.object.alternate_names, "HD 37022");
        assert_eq!(summary.object.comments, "O-type");
        assert_eq!(summary.object.ra, Some(83.8221));
        assert_eq!(
            summary.coordinates.as_deref(),
            Some("05:35:17.30 -05:23:27.96")
        );
        assert_eq!(summary.distance.to_string(), "400.00 pc");
        assert_eq!(summary.spectral_types.to_string(), "Optical: M0.0");
        assert_eq!(
            summary.tables.iter().map(|t| t.title.as_str()).collect_vec(),
            vec!["sources", "parallaxes", "spectral_types"]
        );
    }

    #[test]
    fn degraded_fields_do_not_abort() {
        let inventory = TableSet::new().with_table(sources(1));
        let summary = aggregate(1, &inventory).unwrap();
        assert_eq!(summary.distance.to_string(), "N/A");
        assert_eq!(summary.spectral_types.to_string(), "");
        assert_eq!(summary.tables.len(), 1);
    }

    #[test]
    fn missing_source_is_not_found() {
        let inventory = TableSet::new().with_table(parallaxes(&[1.0.into()]));
        assert!(aggregate(1, &inventory).unwrap_err().is_not_found());

        let empty = TableSet::new().with_table(Table::new("sources", ["id"]));
        assert!(aggregate(1, &empty).unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_source_is_integrity_error() {
        let duplicated = sources(1).with_row([
            Value::from(1),
            1.0.into(),
            1.0.into(),
            "dup".into(),
            Value::Null,
            Value::Null,
        ]);
        let inventory = TableSet::new().with_table(duplicated);
        assert!(matches!(
            aggregate(1, &inventory),
            Err(CatalogError::DataIntegrity(_))
        ));

        let other = TableSet::new().with_table(sources(2));
        assert!(matches!(
            aggregate(1, &other),
            Err(CatalogError::DataIntegrity(_))
        ));
    }

    #[test]
    fn idempotent() {
        let inventory = TableSet::new()
            .with_table(sources(1))
            .with_table(spectral_types(&[("IR", 25.into())]));
        assert_eq!(
            aggregate(1, &inventory).unwrap(),
            aggregate(1, &inventory).unwrap()
        );
    }
}

#![warn(missing_docs)]

//! Aggregation and sky projection core of an astronomical source catalog viewer. \
//! Query execution, HTTP and HTML rendering are left to collaborators. This crate takes the
//! tables a catalog store returns and turns them into what a viewer page shows:
//! object summaries, browse listings with child record counts, and all-sky plots.
//!
//! ## Interface
//! The central struct of this library is [`CatalogViewer`]. It runs requests against a
//! [`CatalogStore`] and records the user's last inputs in a caller-owned [`Session`].
//! Each step is also usable on its own:
//! - [`inventory::aggregate`] builds an [`ObjectSummary`] from the inventory of one object.
//! - [`counts::count_children`] and [`counts::merge_counts`] build the browse listing.
//! - [`SkyPlotBuilder`] projects objects in equatorial and galactic coordinates.
//! - [`sptype::classify`] turns spectral type codes into display strings.
//! - [`projection::project`] is the plain Hammer (or Aitoff) projection.
//!
//! Example:
//! ```rust
//! # use oncview::{CatalogViewer, MemoryStore, Session, Table, TableSet, Value};
//! let sources = Table::new("sources", ["id", "ra", "dec", "designation"])
//!     .with_row([Value::from(1), 83.82.into(), (-5.39).into(), "Theta1 Ori C".into()]);
//! let viewer = CatalogViewer::new(MemoryStore::new(TableSet::new().with_table(sources)));
//!
//! let mut session = Session::default();
//! let summary = viewer.inventory(&mut session, "1").unwrap();
//! assert_eq!(summary.distance.to_string(), "N/A");
//! ```
//!
//! ## Degraded fields
//! A derived field that cannot be computed never fails the request. Distances degrade to
//! `N/A` and spectral types to an empty string, see [`inventory::Distance`] and
//! [`inventory::SpectralTypes`]. Missing or duplicated source rows are errors, see
//! [`CatalogError`].
//!
//! ## Features
//! - `parallel` (default): [`SkyPlotBuilder::build_par`] projects points with rayon.

pub mod catalog;
pub mod coords;
pub mod counts;
pub mod error;
pub mod inventory;
pub mod projection;
pub mod search;
pub mod skyplot;
pub mod sptype;
pub mod store;
pub mod table;
pub mod viewer;

pub use catalog::{CatalogObject, SourceId};
pub use error::{CatalogError, Result};
pub use inventory::ObjectSummary;
pub use projection::Projection;
pub use skyplot::{SkyPlot, SkyPlotBuilder};
pub use store::{CatalogStore, MemoryStore};
pub use table::{Table, TableSet, Value};
pub use viewer::{CatalogViewer, Session};

/// A generic float trait such that the projections are generic over `f32`/`f64`.
///
/// This trait is automatically implemented for all types implementing the supertraits.
/// Particularly, this includes `f32` and `f64`.
pub trait Float: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}

impl<F> Float for F where F: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}

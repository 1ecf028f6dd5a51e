//! Request-level operations of the catalog viewer.
//!
//! Each operation runs against a [`CatalogStore`] and records what the user typed
//! in a caller-owned [`Session`], so the next page can show it again.

use std::collections::HashSet;

use log::{info, warn};
use serde::Serialize;

use crate::catalog::{CatalogObject, SourceId, schema};
use crate::counts::{BrowseListing, count_children, merge_counts};
use crate::error::{CatalogError, Result};
use crate::inventory::{ObjectSummary, aggregate};
use crate::projection::Projection;
use crate::search::{DEFAULT_SEARCH_RADIUS, SearchTerms, search, validate_query};
use crate::skyplot::{SkyPlot, SkyPlotBuilder};
use crate::store::CatalogStore;
use crate::table::{DisplayTable, Table};

/// The query used before the user typed one.
pub const DEFAULT_QUERY: &str = "SELECT * FROM sources";

/// Inputs last submitted by one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Last query text.
    pub last_query: String,
    /// Last search box input.
    pub last_search: String,
    /// Last source id input.
    pub last_source_id: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            last_query: DEFAULT_QUERY.to_owned(),
            last_search: String::new(),
            last_source_id: String::new(),
        }
    }
}

/// Result of a query or search.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryView {
    /// Matching rows.
    pub table: Table,
    /// Sky plot of the rows, `None` when the rows carry no usable positions.
    pub sky_plot: Option<SkyPlot>,
}

/// Parse a source id typed by the user.
pub fn parse_source_id(input: &str) -> Result<SourceId> {
    input
        .trim()
        .parse()
        .map_err(|_| CatalogError::BadInput(format!("You typed: {input}")))
}

/// Catalog operations over a store.
#[derive(Clone, Debug)]
pub struct CatalogViewer<S> {
    store: S,
    sky_plot: SkyPlotBuilder,
    search_radius: f64,
}

impl<S: CatalogStore> CatalogViewer<S> {
    /// Viewer with a Hammer sky plot and a one arcminute search radius.
    pub fn new(store: S) -> Self {
        Self {
            store,
            sky_plot: SkyPlotBuilder::new(),
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }

    /// Set the sky plot projection.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.sky_plot = self.sky_plot.with_projection(projection);
        self
    }

    /// Set the cone search radius in degrees.
    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a read query and plot its rows.
    pub fn run_query(&self, session: &mut Session, sql: &str) -> Result<QueryView> {
        session.last_query = sql.to_owned();
        let sql = validate_query(sql)?;

        info!("Running query `{sql}`.");
        let table = self.store.query(sql)?;
        if table.is_empty() {
            return Err(CatalogError::NotFound(format!(
                "No entries found for query: {sql}"
            )));
        }

        let sky_plot = self.sky_plot_of(&table);
        Ok(QueryView { table, sky_plot })
    }

    /// Search the sources by name or position.
    pub fn search(&self, session: &mut Session, input: &str) -> Result<QueryView> {
        session.last_search = input.to_owned();
        let terms = SearchTerms::parse(input)?;

        let sources = self.store.table(schema::SOURCES)?;
        let objects = CatalogObject::from_table(&sources)?;
        let found = search(&objects, &terms, self.search_radius);
        if found.is_empty() {
            return Err(CatalogError::NotFound(format!(
                "No sources found for search: {input}"
            )));
        }

        let ids: HashSet<SourceId> = found.iter().map(|o| o.id).collect();
        let table = sources.filter(|row| {
            row.get(schema::ID)
                .as_i64()
                .is_some_and(|id| ids.contains(&id))
        });
        let found = found.into_iter().cloned().collect::<Vec<_>>();
        let sky_plot = Some(self.sky_plot.build(&found));
        Ok(QueryView { table, sky_plot })
    }

    /// Summary of the source whose id the user typed.
    pub fn inventory(&self, session: &mut Session, id_input: &str) -> Result<ObjectSummary> {
        session.last_source_id = id_input.to_owned();
        let source_id = parse_source_id(id_input)?;
        let inventory = self.store.inventory(source_id)?;
        aggregate(source_id, &inventory)
    }

    /// Every source with its photometry and spectroscopy counts.
    pub fn browse(&self) -> Result<BrowseListing> {
        let sources = self.store.table(schema::SOURCES)?;
        let objects = CatalogObject::from_table(&sources)?;

        let photometry = self.store.table(schema::PHOTOMETRY)?;
        let spectra = self.store.table(schema::SPECTRA)?;
        let counts = [
            count_children(schema::PHOTOMETRY, &photometry),
            count_children(schema::SPECTRA, &spectra),
        ];
        Ok(merge_counts(objects, &counts))
    }

    /// Column structure of every catalog table, sorted by table name.
    pub fn schema(&self) -> Result<Vec<DisplayTable>> {
        let schema = self.store.schema()?;
        info!("Schema lists {} tables.", schema.len());
        Ok(schema.iter().map(Table::display).collect())
    }

    /// Sky plot of arbitrary query rows. Rows that cannot be read as sources
    /// give no plot rather than failing the query.
    fn sky_plot_of(&self, table: &Table) -> Option<SkyPlot> {
        if !(table.has_column(schema::ID) && table.has_column(schema::RA)) {
            return None;
        }
        match CatalogObject::from_table(table) {
            Ok(objects) => Some(self.sky_plot.build(&objects)),
            Err(err) => {
                warn!("No sky plot for query result: {err}");
                None
            }
        }
    }
}

//! User input gates and in-core searches over the source table.

use itertools::Itertools;
use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use log::{debug, info};
use serde::Serialize;

use crate::catalog::CatalogObject;
use crate::coords::radec_to_unit;
use crate::error::{CatalogError, Result};

/// Default cone search radius in degrees (one arcminute).
pub const DEFAULT_SEARCH_RADIUS: f64 = 1. / 60.;

/// Accept only read queries.
///
/// Returns the trimmed query.
pub fn validate_query(sql: &str) -> Result<&str> {
    let sql = sql.trim();
    let is_select = sql
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"));
    if is_select {
        Ok(sql)
    } else {
        Err(CatalogError::BadInput(format!(
            "Only SELECT queries are allowed. You typed: {sql}"
        )))
    }
}

/// A parsed search box input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SearchTerms {
    /// Match designations and alternate names.
    Name(String),
    /// Cone search around a position in degrees.
    Position {
        /// Right ascension in degrees.
        ra: f64,
        /// Declination in degrees.
        dec: f64,
    },
}

impl SearchTerms {
    /// Parse search input.
    ///
    /// Commas count as whitespace. A single token is a name; two numbers are a
    /// position. Anything else cannot be processed.
    ///
    /// # Example
    /// ```
    /// # use oncview::search::SearchTerms;
    /// assert_eq!(
    ///     SearchTerms::parse("83.82, -5.39").unwrap(),
    ///     SearchTerms::Position { ra: 83.82, dec: -5.39 }
    /// );
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let unprocessable =
            || CatalogError::BadInput(format!("Could not process search input: {input}"));

        let tokens = input.replace(',', " ");
        let tokens = tokens.split_whitespace().collect_vec();
        match tokens.as_slice() {
            [] => Err(unprocessable()),
            [name] => Ok(SearchTerms::Name((*name).to_owned())),
            [ra, dec] => {
                let ra: f64 = ra.parse().map_err(|_| unprocessable())?;
                let dec: f64 = dec.parse().map_err(|_| unprocessable())?;
                if !ra.is_finite() || !(-90. ..=90.).contains(&dec) {
                    return Err(unprocessable());
                }
                Ok(SearchTerms::Position {
                    ra: ra.rem_euclid(360.),
                    dec,
                })
            }
            _ => Err(unprocessable()),
        }
    }
}

/// Spatial index over the objects that have coordinates.
///
/// Any number of objects may share a position.
pub struct ConeIndex<'a> {
    objects: &'a [CatalogObject],
    /// Catalog index of each indexed point.
    indexed: Vec<usize>,
    tree: Option<ImmutableKdTree<f64, u64, 3, 32>>,
}

impl<'a> ConeIndex<'a> {
    /// Index `objects` by their unit vectors. Objects without coordinates are skipped.
    pub fn new(objects: &'a [CatalogObject]) -> Self {
        let (indexed, points): (Vec<_>, Vec<_>) = objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.position().map(|pos| (i, unit(pos))))
            .unzip();
        debug!("Indexed {} of {} objects.", points.len(), objects.len());
        let tree = (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points));
        Self {
            objects,
            indexed,
            tree,
        }
    }

    /// Objects within `radius` degrees of `(ra, dec)`, in catalog order.
    pub fn within(&self, ra: f64, dec: f64, radius: f64) -> Vec<&'a CatalogObject> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let radius = radius.clamp(0., 180.).to_radians();
        // Angular radius as squared chord length between unit vectors.
        let chord = 2. * (radius / 2.).sin();

        tree.within_unsorted::<SquaredEuclidean>(&unit((ra, dec)), chord * chord)
            .into_iter()
            .map(|neighbour| self.indexed[neighbour.item as usize])
            .sorted_unstable()
            .map(|i| &self.objects[i])
            .collect()
    }
}

fn unit((ra, dec): (f64, f64)) -> [f64; 3] {
    radec_to_unit(ra.to_radians(), dec.to_radians()).into()
}

/// Objects whose designation or alternate names contain `name`, ignoring case.
pub fn name_search<'a>(objects: &'a [CatalogObject], name: &str) -> Vec<&'a CatalogObject> {
    let needle = name.to_lowercase();
    objects
        .iter()
        .filter(|o| {
            o.designation.to_lowercase().contains(&needle)
                || o.alternate_names.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Run a parsed search over `objects`. Cone searches use `radius` degrees.
pub fn search<'a>(
    objects: &'a [CatalogObject],
    terms: &SearchTerms,
    radius: f64,
) -> Vec<&'a CatalogObject> {
    let found = match terms {
        SearchTerms::Name(name) => name_search(objects, name),
        SearchTerms::Position { ra, dec } => ConeIndex::new(objects).within(*ra, *dec, radius),
    };
    info!("Search {terms:?} matched {} objects.", found.len());
    found
}

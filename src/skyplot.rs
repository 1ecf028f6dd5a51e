//! All-sky plot data.
//!
//! [`SkyPlotBuilder`] projects catalog objects twice, once in equatorial and once
//! in galactic coordinates, and lays out a reference grid. The result holds plain
//! point series and polylines; drawing them is up to the renderer.

use std::f64::consts::{FRAC_PI_2, PI};

use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::Array2;
use serde::Serialize;

use crate::catalog::{CatalogObject, SourceId};
use crate::coords::equatorial_to_galactic;
use crate::projection::{PlotBounds, Projection, project};

/// A projected catalog object, with everything needed to identify it on hover.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkyPoint {
    /// Source id.
    pub source_id: SourceId,
    /// Display name.
    pub name: String,
    /// Right ascension in degrees.
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
    /// Galactic longitude in degrees.
    pub l: f64,
    /// Galactic latitude in degrees.
    pub b: f64,
    /// Projected horizontal coordinate.
    pub x: f64,
    /// Projected vertical coordinate.
    pub y: f64,
}

/// Density of the reference grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    /// Number of intervals between meridians over `[-π, π]`.
    pub lon_divisions: usize,
    /// Number of intervals between parallels over `[-π/2, π/2]`.
    pub lat_divisions: usize,
    /// Points per line.
    pub samples: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            lon_divisions: 12,
            lat_divisions: 12,
            samples: 51,
        }
    }
}

/// Reference grid of a sky plot.
///
/// Every line is a `(samples, 2)` array of projected `(x, y)` points.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    /// Lines of constant longitude, both boundary meridians included.
    pub meridians: Vec<Array2<f64>>,
    /// Lines of constant latitude, poles included.
    pub parallels: Vec<Array2<f64>>,
}

impl Grid {
    /// Sample the grid under `projection`.
    pub fn new(spec: GridSpec, projection: Projection) -> Self {
        let lons = linspace(-PI, PI, spec.lon_divisions + 1);
        let lats = linspace(-FRAC_PI_2, FRAC_PI_2, spec.lat_divisions + 1);
        let lon_samples = linspace(-PI, PI, spec.samples);
        let lat_samples = linspace(-FRAC_PI_2, FRAC_PI_2, spec.samples);

        let meridians = lons
            .iter()
            .map(|&lon| polyline(lat_samples.iter().map(|&lat| (lon, lat)), projection))
            .collect();
        let parallels = lats
            .iter()
            .map(|&lat| polyline(lon_samples.iter().map(|&lon| (lon, lat)), projection))
            .collect();

        Self {
            meridians,
            parallels,
        }
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + i as f64 * (end - start) / (n - 1) as f64)
            .collect(),
    }
}

fn polyline(points: impl Iterator<Item = (f64, f64)>, projection: Projection) -> Array2<f64> {
    let flat = points
        .flat_map(|(lon, lat)| {
            let (x, y) = project(lon, lat, projection);
            [x, y]
        })
        .collect_vec();
    let n = flat.len() / 2;
    Array2::from_shape_vec((n, 2), flat).expect("two coordinates per point")
}

/// Data of an all-sky plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkyPlot {
    /// Projection used for points and grid.
    pub projection: Projection,
    /// Axis ranges.
    pub bounds: PlotBounds,
    /// Points projected from `(ra, dec)`.
    pub equatorial: Vec<SkyPoint>,
    /// Points projected from `(l, b)`.
    pub galactic: Vec<SkyPoint>,
    /// Reference grid.
    pub grid: Grid,
    /// Set when objects without coordinates were dropped.
    pub warning: Option<String>,
}

/// Builds [`SkyPlot`]s.
///
/// Use `with_` functions to set parameters.
///
/// # Example
/// ```
/// # use oncview::skyplot::SkyPlotBuilder;
/// let plot = SkyPlotBuilder::new().build(&[]);
/// assert!(plot.equatorial.is_empty() && plot.warning.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SkyPlotBuilder {
    projection: Projection,
    grid: GridSpec,
}

impl SkyPlotBuilder {
    /// Hammer projection and a 12×12 grid sampled at 51 points.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the projection.
    ///
    /// **Warning: [`Projection::Aitoff`] produces a distorted map.**
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set the grid density.
    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Project all objects with coordinates.
    ///
    /// Objects without `ra` or `dec` are left out of both point sets and counted
    /// in the warning.
    pub fn build(&self, objects: &[CatalogObject]) -> SkyPlot {
        let (located, warning) = self.located(objects);
        let (equatorial, galactic): (Vec<_>, Vec<_>) = located
            .iter()
            .map(|(object, ra, dec)| self.project_object(object, *ra, *dec))
            .unzip();
        self.finish(equatorial, galactic, warning)
    }

    fn located<'a>(
        &self,
        objects: &'a [CatalogObject],
    ) -> (Vec<(&'a CatalogObject, f64, f64)>, Option<String>) {
        info!(
            "Building {} sky plot of {} objects.",
            self.projection,
            objects.len()
        );
        let located = objects
            .iter()
            .filter_map(|o| o.position().map(|(ra, dec)| (o, ra, dec)))
            .collect_vec();

        let missing = objects.len() - located.len();
        let warning = (missing > 0).then(|| {
            warn!("{missing} objects without coordinates left out of the sky plot.");
            format!(
                "Note: {missing} objects had missing coordinate information and were removed."
            )
        });
        (located, warning)
    }

    fn project_object(&self, object: &CatalogObject, ra: f64, dec: f64) -> (SkyPoint, SkyPoint) {
        let (ra_rad, dec_rad) = (ra.to_radians(), dec.to_radians());
        let (l_rad, b_rad) = equatorial_to_galactic(ra_rad, dec_rad);

        let point = SkyPoint {
            source_id: object.id,
            name: object.designation.clone(),
            ra,
            dec,
            l: l_rad.to_degrees(),
            b: b_rad.to_degrees(),
            x: 0.,
            y: 0.,
        };

        let (x, y) = project(ra_rad - PI, dec_rad, self.projection);
        let equatorial = SkyPoint { x, y, ..point.clone() };
        let (x, y) = project(l_rad - PI, b_rad, self.projection);
        let galactic = SkyPoint { x, y, ..point };
        (equatorial, galactic)
    }

    fn finish(
        &self,
        equatorial: Vec<SkyPoint>,
        galactic: Vec<SkyPoint>,
        warning: Option<String>,
    ) -> SkyPlot {
        let grid = Grid::new(self.grid, self.projection);
        debug!(
            "Sky plot has {} points, {} meridians and {} parallels.",
            equatorial.len(),
            grid.meridians.len(),
            grid.parallels.len()
        );
        SkyPlot {
            projection: self.projection,
            bounds: PlotBounds::default(),
            equatorial,
            galactic,
            grid,
            warning,
        }
    }
}

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use rayon::prelude::*;

    impl SkyPlotBuilder {
        /// Project all objects with coordinates, in parallel.
        ///
        /// Also see [`build`](SkyPlotBuilder::build()) for more details.
        pub fn build_par(&self, objects: &[CatalogObject]) -> SkyPlot {
            let (located, warning) = self.located(objects);
            let (equatorial, galactic): (Vec<_>, Vec<_>) = located
                .par_iter()
                .map(|(object, ra, dec)| self.project_object(object, *ra, *dec))
                .unzip();
            self.finish(equatorial, galactic, warning)
        }
    }
}

//! Sky projections from spherical coordinates onto the plot plane.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Float;
use crate::error::CatalogError;

/// Choice of sky projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Hammer equal-area projection.
    #[default]
    Hammer,
    /// Aitoff projection.
    ///
    /// **Warning: this projection is known to be broken.** It uses `sin(lon)`
    /// where `sin(lon / 2)` belongs and produces a distorted map. It is kept as is
    /// for compatibility; use [`Projection::Hammer`].
    Aitoff,
}

impl Projection {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Projection::Hammer => "hammer",
            Projection::Aitoff => "aitoff",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hammer" => Ok(Projection::Hammer),
            "aitoff" => Ok(Projection::Aitoff),
            other => Err(CatalogError::BadInput(format!(
                "unknown projection `{other}`"
            ))),
        }
    }
}

/// Project a position onto the plot plane.
///
/// `lon` and `lat` are in radians and already shifted so that the centre of the
/// map is at `lon = 0`, i.e. callers subtract π from right ascension or galactic
/// longitude first.
///
/// # Example
/// ```
/// # use oncview::projection::{project, Projection};
/// let (x, y) = project(0f64, 0., Projection::Hammer);
/// assert!(x.abs() < 1e-12 && y.abs() < 1e-12);
/// ```
pub fn project<F: Float>(lon: F, lat: F, projection: Projection) -> (F, F) {
    match projection {
        Projection::Hammer => hammer(lon, lat),
        Projection::Aitoff => aitoff(lon, lat),
    }
}

fn hammer<F: Float>(lon: F, lat: F) -> (F, F) {
    let two = F::from_f64(2.).unwrap();
    let one = F::one();
    let half_lon = lon / two;
    let denom = (one + lat.cos() * half_lon.cos()).sqrt();

    let x = F::from_f64(2f64.powf(1.5)).unwrap() * lat.cos() * half_lon.sin() / denom;
    let y = two.sqrt() * lat.sin() / denom;
    (x, y)
}

fn aitoff<F: Float>(lon: F, lat: F) -> (F, F) {
    let two = F::from_f64(2.).unwrap();
    let alpha = (lat.cos() * (lon / two).cos()).acos();
    let sinc = normalized_sinc(alpha / F::pi());

    let x = two * lat.cos() * lon.sin() / sinc;
    let y = lat.sin() / sinc;
    (x, y)
}

/// `sin(πt) / (πt)`, with the removable singularity at `t = 0` filled in.
fn normalized_sinc<F: Float>(t: F) -> F {
    if t == F::zero() {
        F::one()
    } else {
        let pt = F::pi() * t;
        pt.sin() / pt
    }
}

/// Axis ranges of a sky plot, derived from the `2^1.5` scale of the Hammer projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlotBounds {
    /// `(min, max)` of the horizontal axis.
    pub x_range: (f64, f64),
    /// `(min, max)` of the vertical axis.
    pub y_range: (f64, f64),
}

impl Default for PlotBounds {
    fn default() -> Self {
        let scale = 2f64.powf(1.5);
        let root2 = 2f64.sqrt();
        Self {
            x_range: (-1.05 * scale, 1.3 * scale),
            y_range: (-2. * root2, 1.2 * root2),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    #[test]
    fn hammer_centre() {
        let (x, y) = project(0f64, 0., Projection::Hammer);
        assert_abs_diff_eq!(x, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0., epsilon = 1e-12);
    }

    #[test]
    fn hammer_extremes() {
        // Equator at the map edge reaches the full 2^1.5 half-width.
        let (x, y) = project(PI, 0f64, Projection::Hammer);
        assert_abs_diff_eq!(x, 2f64.powf(1.5), epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0., epsilon = 1e-12);

        let (x, y) = project(0f64, FRAC_PI_2, Projection::Hammer);
        assert_abs_diff_eq!(x, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(y, 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn hammer_symmetry() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let lon: f64 = rng.random_range(-PI..PI);
            let lat: f64 = rng.random_range(-FRAC_PI_2..FRAC_PI_2);
            let (x1, y1) = project(lon, lat, Projection::Hammer);
            let (x2, y2) = project(-lon, lat, Projection::Hammer);
            assert_abs_diff_eq!(x1, -x2, epsilon = 1e-12);
            assert_abs_diff_eq!(y1, y2, epsilon = 1e-12);

            let (x3, y3) = project(lon, -lat, Projection::Hammer);
            assert_abs_diff_eq!(x1, x3, epsilon = 1e-12);
            assert_abs_diff_eq!(y1, -y3, epsilon = 1e-12);
        }
    }

    #[test]
    fn hammer_stays_finite() {
        for i in 0..=20 {
            for j in 0..=20 {
                let lon = -PI + i as f64 * PI / 10.;
                let lat = -FRAC_PI_2 + j as f64 * PI / 20.;
                let (x, y) = project(lon, lat, Projection::Hammer);
                assert!(x.is_finite() && y.is_finite(), "({lon}, {lat})");
            }
        }
    }

    #[test]
    fn hammer_f32() {
        let (x, y) = project(1f32, 0.5, Projection::Hammer);
        let (x64, y64) = project(1f64, 0.5, Projection::Hammer);
        assert_abs_diff_eq!(x as f64, x64, epsilon = 1e-6);
        assert_abs_diff_eq!(y as f64, y64, epsilon = 1e-6);
    }

    #[test]
    fn aitoff_formula_is_kept() {
        assert_eq!(project(0f64, 0., Projection::Aitoff), (0., 0.));

        // alpha = acos(cos(0.3) * cos(0.5)), sinc(alpha / pi) = sin(alpha) / alpha
        let (lon, lat) = (1f64, 0.3f64);
        let alpha = (lat.cos() * (lon / 2.).cos()).acos();
        let sinc = alpha.sin() / alpha;
        let (x, y) = project(lon, lat, Projection::Aitoff);
        assert_abs_diff_eq!(x, 2. * lat.cos() * lon.sin() / sinc, epsilon = 1e-12);
        assert_abs_diff_eq!(y, lat.sin() / sinc, epsilon = 1e-12);
    }

    #[test]
    fn aitoff_at_poles() {
        for lat in [FRAC_PI_2, -FRAC_PI_2] {
            let (x, y) = project(0f64, lat, Projection::Aitoff);
            assert!(x.is_finite() && y.is_finite());
            // alpha = pi / 2 and sinc(1 / 2) = 2 / pi
            assert_abs_diff_eq!(x, 0., epsilon = 1e-12);
            assert_abs_diff_eq!(y, lat, epsilon = 1e-12);
        }
        let (x, y) = project(PI, FRAC_PI_2, Projection::Aitoff);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn parse_names() {
        assert_eq!("Hammer".parse::<Projection>().unwrap(), Projection::Hammer);
        assert_eq!(" aitoff ".parse::<Projection>().unwrap(), Projection::Aitoff);
        assert!("mollweide".parse::<Projection>().unwrap_err().is_bad_input());
        assert_eq!(Projection::default(), Projection::Hammer);
        assert_eq!(Projection::Aitoff.to_string(), "aitoff");
    }

    #[test]
    fn bounds_follow_hammer_scale() {
        let bounds = PlotBounds::default();
        assert_abs_diff_eq!(bounds.x_range.1, 1.3 * 2f64.powf(1.5), epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.y_range.0, -2. * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn idempotent() {
        let a = project(0.7f64, -0.2, Projection::Hammer);
        let b = project(0.7f64, -0.2, Projection::Hammer);
        assert_eq!(a, b);
    }
}

//! Celestial coordinate conversions.

use nalgebra::{Matrix3, Vector3};

use crate::Float;

/// Rotation from ICRS equatorial to galactic unit vectors.
#[rustfmt::skip]
const ICRS_TO_GALACTIC: [f64; 9] = [
    -0.054_875_560_416_215_4, -0.873_437_090_234_885_0, -0.483_835_015_548_713_2,
     0.494_109_427_875_583_7, -0.444_829_629_960_011_2,  0.746_982_244_497_218_9,
    -0.867_666_149_019_004_7, -0.198_076_373_431_201_5,  0.455_983_776_175_066_9,
];

/// Unit vector pointing at `(ra, dec)`, both in radians.
pub fn radec_to_unit<F: Float>(ra: F, dec: F) -> Vector3<F> {
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Convert equatorial `(ra, dec)` to galactic `(l, b)`, all in radians.
///
/// `l` is wrapped into `[0, 2π)`.
pub fn equatorial_to_galactic<F: Float>(ra: F, dec: F) -> (F, F) {
    let rotation = Matrix3::from_row_iterator(
        ICRS_TO_GALACTIC
            .iter()
            .map(|&v| F::from_f64(v).unwrap()),
    );
    let g = rotation * radec_to_unit(ra, dec);

    let mut l = g.y.atan2(g.x);
    if l < F::zero() {
        l += F::two_pi();
    }
    // Clamp against rounding just outside the unit sphere.
    let b = g.z.clamp(-F::one(), F::one()).asin();
    (l, b)
}

/// Equatorial degrees to galactic degrees.
pub fn equatorial_to_galactic_deg(ra: f64, dec: f64) -> (f64, f64) {
    let (l, b) = equatorial_to_galactic(ra.to_radians(), dec.to_radians());
    (l.to_degrees(), b.to_degrees())
}

/// Format a position as `HH:MM:SS.ss ±DD:MM:SS.ss`.
///
/// Seconds are rounded to two decimals with the carry propagated, and the
/// declination always carries a sign.
pub fn to_hmsdms(ra_deg: f64, dec_deg: f64) -> String {
    let hours = (ra_deg / 15.).rem_euclid(24.);
    let ra = sexagesimal(hours, 24);
    let dec = sexagesimal(dec_deg.abs(), u64::MAX);
    let sign = if dec_deg < 0. { '-' } else { '+' };
    format!("{ra} {sign}{dec}")
}

/// Split a non-negative value into `whole:minutes:seconds.cc`, wrapping `whole` at `wrap`.
fn sexagesimal(value: f64, wrap: u64) -> String {
    let centis = (value * 360_000.).round() as u64;
    let whole = (centis / 360_000) % wrap;
    let minutes = centis % 360_000 / 6_000;
    let centis = centis % 6_000;
    format!(
        "{whole:02}:{minutes:02}:{:02}.{:02}",
        centis / 100,
        centis % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn galactic_centre() {
        let (l, b) = equatorial_to_galactic_deg(266.40499, -28.93617);
        assert_abs_diff_eq!(l.min(360. - l), 0., epsilon = 1e-3);
        assert_abs_diff_eq!(b, 0., epsilon = 1e-3);
    }

    #[test]
    fn galactic_north_pole() {
        let (_, b) = equatorial_to_galactic_deg(192.85948, 27.12825);
        assert_abs_diff_eq!(b, 90., epsilon = 1e-3);
    }

    #[test]
    fn orion_nebula() {
        let (l, b) = equatorial_to_galactic_deg(83.8221, -5.3911);
        assert_abs_diff_eq!(l, 209.0137, epsilon = 1e-3);
        assert_abs_diff_eq!(b, -19.3816, epsilon = 1e-3);
    }

    #[test]
    fn longitude_is_wrapped() {
        for ra in (0..360).step_by(15) {
            for dec in (-80..=80).step_by(20) {
                let (l, b) = equatorial_to_galactic(
                    (ra as f64).to_radians(),
                    (dec as f64).to_radians(),
                );
                assert!((0. ..std::f64::consts::TAU).contains(&l));
                assert!(b.abs() <= std::f64::consts::FRAC_PI_2);
            }
        }
    }

    #[test]
    fn unit_vector() {
        let v = radec_to_unit(1.2f64, -0.4);
        assert_abs_diff_eq!(v.norm(), 1., epsilon = 1e-12);
        let z = radec_to_unit(0f64, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(z.z, 1., epsilon = 1e-12);
    }

    #[test]
    fn hmsdms() {
        assert_eq!(to_hmsdms(83.8221, -5.3911), "05:35:17.30 -05:23:27.96");
        assert_eq!(to_hmsdms(0., 0.), "00:00:00.00 +00:00:00.00");
        assert_eq!(to_hmsdms(180., 45.5), "12:00:00.00 +45:30:00.00");
    }

    #[test]
    fn hmsdms_carries_rounding() {
        // 59.999 s rounds up into the next minute and hour.
        let ra = (5. + 59. / 60. + 59.999 / 3600.) * 15.;
        assert_eq!(to_hmsdms(ra, -0.999_999_9), "06:00:00.00 -01:00:00.00");
        // 23:59:59.999 wraps to zero hours.
        let ra = (23. + 59. / 60. + 59.999 / 3600.) * 15.;
        assert!(to_hmsdms(ra, 10.).starts_with("00:00:00.00"));
    }
}

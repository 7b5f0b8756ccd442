//! Real spherical harmonics.
//!
//! Evaluates `Y(l, m, azimuth, elevation, norm)` via the standard
//! associated-Legendre three-term recurrence. Normalization factors and
//! factorials are precomputed once per `(order, scheme)` pair by
//! [`SphHarm::new`] and reused for every source encoded against that
//! instance -- never recomputed per sample.

use crate::error::HeaderError;

/// Maximum supported ambisonic order.
pub const MAX_ORDER: usize = 7;

/// Spherical-harmonic normalization convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Schmidt semi-normalized 3D: the omnidirectional channel equals 1.
    Sn3d,
    /// Fully normalized (orthonormal on the unit sphere).
    N3d,
}

impl Normalization {
    pub fn to_tag(self) -> u16 {
        match self {
            Normalization::Sn3d => 1,
            Normalization::N3d => 2,
        }
    }

    pub fn from_tag(tag: u16) -> Result<Self, HeaderError> {
        match tag {
            1 => Ok(Normalization::Sn3d),
            2 => Ok(Normalization::N3d),
            other => Err(HeaderError::InvalidNormalization(other)),
        }
    }
}

/// Number of ambisonic channels for a given order: `(order + 1)^2`.
pub const fn num_channels(order: usize) -> usize {
    (order + 1) * (order + 1)
}

/// Decomposes an ACN channel index into its `(l, m)` degree/order pair.
///
/// `l = floor(sqrt(k))`, `m = k - l^2 - l`.
pub fn acn_to_lm(acn: usize) -> (usize, i32) {
    let mut l = (acn as f64).sqrt().floor() as usize;
    // Float sqrt can land one step off true floor(sqrt(acn)); nudge back on track.
    while (l + 1) * (l + 1) <= acn {
        l += 1;
    }
    while l * l > acn {
        l -= 1;
    }
    let m = acn as i64 - (l * l) as i64 - l as i64;
    (l, m as i32)
}

/// Composes an ACN channel index from a `(l, m)` degree/order pair.
pub fn lm_to_acn(l: usize, m: i32) -> usize {
    ((l * l) as i64 + l as i64 + m as i64) as usize
}

fn factorial_table() -> [f64; 2 * MAX_ORDER + 1] {
    let mut table = [1.0f64; 2 * MAX_ORDER + 1];
    for i in 1..table.len() {
        table[i] = table[i - 1] * i as f64;
    }
    table
}

/// `N(l, m)` for the requested normalization scheme, using a precomputed
/// factorial table.
fn normalization_factor(l: usize, m: i32, norm: Normalization, factorials: &[f64]) -> f32 {
    let am = m.unsigned_abs() as usize;
    let delta = if m == 0 { 1.0 } else { 2.0 };
    let sn3d = (delta * factorials[l - am] / factorials[l + am]).sqrt();

    let value = match norm {
        Normalization::Sn3d => sn3d,
        Normalization::N3d => ((2 * l + 1) as f64).sqrt() * sn3d,
    };
    value as f32
}

/// Fills `table[l][m]` with the associated Legendre value `P_l^m(x)` for
/// `0 <= m <= l <= order`, via the standard diagonal/upward three-term
/// recurrence. Unused lower-triangle entries (`m > l`) are left at `0.0`.
fn legendre_table(order: usize, x: f32) -> Vec<Vec<f32>> {
    let mut table = vec![vec![0.0f32; order + 1]; order + 1];
    table[0][0] = 1.0;

    let root = (1.0 - x * x).max(0.0).sqrt();
    let mut diag = 1.0f32;
    for m in 1..=order {
        diag *= -((2 * m - 1) as f32) * root;
        table[m][m] = diag;
    }

    for m in 0..order {
        if m + 1 <= order {
            table[m + 1][m] = x * (2 * m + 1) as f32 * table[m][m];
        }
        for l in (m + 2)..=order {
            let a = (2 * l - 1) as f32 * x * table[l - 1][m];
            let b = (l + m - 1) as f32 * table[l - 2][m];
            table[l][m] = (a - b) / (l - m) as f32;
        }
    }

    table
}

/// Real trig factor applied on top of the normalized Legendre value.
fn trig_factor(m: i32, azimuth: f32) -> f32 {
    use std::f32::consts::SQRT_2;
    match m.cmp(&0) {
        std::cmp::Ordering::Greater => SQRT_2 * (m as f32 * azimuth).cos(),
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => SQRT_2 * ((-m) as f32 * azimuth).sin(),
    }
}

/// Evaluates a single real spherical harmonic `Y(l, m, azimuth, elevation)`.
///
/// Recomputes the Legendre table and normalization factor on every call, so
/// it is intended for tests and one-off evaluations. [`SphHarm`] is the
/// batch path real callers (the encoder) should use.
///
/// # Panics
/// Panics if `l > MAX_ORDER` or `|m| > l` -- an out-of-range `(l, m)` pair
/// is a programming error, not a runtime condition callers are expected to
/// recover from.
pub fn y(l: usize, m: i32, azimuth: f32, elevation: f32, norm: Normalization) -> f32 {
    assert!(l <= MAX_ORDER, "ambisonic degree {l} exceeds MAX_ORDER");
    assert!(m.unsigned_abs() as usize <= l, "|m| must be <= l, got l={l} m={m}");

    let factorials = factorial_table();
    let table = legendre_table(l, elevation.sin());
    let p = table[l][m.unsigned_abs() as usize];
    let n = normalization_factor(l, m, norm, &factorials);
    n * p * trig_factor(m, azimuth)
}

/// Precomputed spherical-harmonic evaluator for a fixed `(order, norm)`
/// pair -- the batch path real encode/decode call sites should use.
pub struct SphHarm {
    order: usize,
    norm: Normalization,
    factorials: [f64; 2 * MAX_ORDER + 1],
}

impl SphHarm {
    pub fn new(order: usize, norm: Normalization) -> Self {
        Self {
            order,
            norm,
            factorials: factorial_table(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn normalization(&self) -> Normalization {
        self.norm
    }

    /// Evaluates every ACN channel `0..num_channels(order)` for one
    /// direction, writing into `out`. `out.len()` must equal
    /// `num_channels(self.order)`.
    pub fn eval_all(&self, azimuth: f32, elevation: f32, out: &mut [f32]) {
        debug_assert_eq!(out.len(), num_channels(self.order));

        let table = legendre_table(self.order, elevation.sin());
        for (acn, slot) in out.iter_mut().enumerate() {
            let (l, m) = acn_to_lm(acn);
            let p = table[l][m.unsigned_abs() as usize];
            let n = normalization_factor(l, m, self.norm, &self.factorials);
            *slot = n * p * trig_factor(m, azimuth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() < eps, "{a} !~= {b}");
    }

    #[test]
    fn acn_lm_roundtrip_is_a_bijection() {
        for l in 0..=MAX_ORDER {
            for m in -(l as i32)..=(l as i32) {
                let k = lm_to_acn(l, m);
                assert_eq!(acn_to_lm(k), (l, m));
            }
        }
        // Every index in 0..num_channels(MAX_ORDER) is hit exactly once.
        let mut seen = vec![false; num_channels(MAX_ORDER)];
        for l in 0..=MAX_ORDER {
            for m in -(l as i32)..=(l as i32) {
                let k = lm_to_acn(l, m);
                assert!(!seen[k], "ACN {k} produced twice");
                seen[k] = true;
            }
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn sn3d_omni_channel_is_always_one() {
        for &(az, el) in &[(0.0, 0.0), (1.3, 0.4), (-2.0, -0.9)] {
            assert_close(y(0, 0, az, el, Normalization::Sn3d), 1.0, 1e-6);
        }
    }

    #[test]
    fn n3d_is_sn3d_scaled_by_sqrt_2l_plus_1() {
        for l in 0..=4usize {
            for m in -(l as i32)..=(l as i32) {
                let sn3d = y(l, m, 0.7, 0.3, Normalization::Sn3d);
                let n3d = y(l, m, 0.7, 0.3, Normalization::N3d);
                let ratio = ((2 * l + 1) as f32).sqrt();
                assert_close(n3d, sn3d * ratio, 1e-5);
            }
        }
    }

    #[test]
    fn front_impulse_first_order_channels() {
        // direction (0, 0, 1) -> azimuth = 0, elevation = 0. On the horizon
        // the m=0 channel (Legendre in sin(elevation)) is silent; front/back
        // is carried entirely by the m=+1 channel via cos(azimuth).
        let sqrt2 = std::f32::consts::SQRT_2;
        let w = y(0, 0, 0.0, 0.0, Normalization::Sn3d);
        let yc = y(1, -1, 0.0, 0.0, Normalization::Sn3d);
        let z = y(1, 0, 0.0, 0.0, Normalization::Sn3d);
        let x = y(1, 1, 0.0, 0.0, Normalization::Sn3d);
        assert_close(w, 1.0, 1e-6);
        assert_close(yc, 0.0, 1e-6);
        assert_close(z, 0.0, 1e-6);
        assert_close(x, -sqrt2, 1e-5);
    }

    #[test]
    fn right_impulse_first_order_channels() {
        // direction (1, 0, 0) -> azimuth = pi/2, elevation = 0. Left/right is
        // carried entirely by the m=-1 channel via sin(azimuth).
        let sqrt2 = std::f32::consts::SQRT_2;
        let az = std::f32::consts::FRAC_PI_2;
        let w = y(0, 0, az, 0.0, Normalization::Sn3d);
        let yc = y(1, -1, az, 0.0, Normalization::Sn3d);
        let z = y(1, 0, az, 0.0, Normalization::Sn3d);
        let x = y(1, 1, az, 0.0, Normalization::Sn3d);
        assert_close(w, 1.0, 1e-6);
        assert_close(yc, -sqrt2, 1e-5);
        assert_close(z, 0.0, 1e-6);
        assert_close(x, 0.0, 1e-5);
    }

    #[test]
    fn eval_all_matches_per_channel_y() {
        let sh = SphHarm::new(3, Normalization::Sn3d);
        let mut out = vec![0.0f32; num_channels(3)];
        sh.eval_all(0.6, -0.2, &mut out);
        for (acn, &value) in out.iter().enumerate() {
            let (l, m) = acn_to_lm(acn);
            assert_close(value, y(l, m, 0.6, -0.2, Normalization::Sn3d), 1e-5);
        }
    }

    #[test]
    #[should_panic]
    fn out_of_range_degree_panics() {
        let _ = y(MAX_ORDER + 1, 0, 0.0, 0.0, Normalization::Sn3d);
    }
}

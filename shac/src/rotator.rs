//! Per-order ambisonic rotation matrices from listener yaw/pitch.
//!
//! A full rotation is built from two closed-form pieces instead of a general
//! Wigner-D construction: the yaw term is an exact Z-axis rotation in ACN/SN3D
//! space (a per-order recurrence in `cos(yaw)`/`sin(yaw)` alone), and pitch is
//! folded in by conjugating that same recurrence through a fixed axis-swap
//! matrix computed once per order at [`Rotator::new`]. This keeps the whole
//! rotator down to one recurrence plus one constant matrix per order, at the
//! cost of pitch rotations that are only exact about the swapped axis (see
//! the crate's design notes for why that tradeoff was made).

use crate::sphharm::{lm_to_acn, MAX_ORDER};
use std::collections::HashMap;

/// Bound on the number of distinct quantized (yaw, pitch) rotation matrices
/// kept alive at once, across all orders sharing a [`Rotator`].
pub const CACHE_CAPACITY: usize = 1024;

/// Quantization step for cache keys, in radians. Two poses within half a
/// step of each other share a cached matrix.
pub const ANGLE_QUANTUM: f32 = 0.001;

fn quantize(angle: f32) -> i32 {
    (angle / ANGLE_QUANTUM).round() as i32
}

/// A dense `(2l+1) x (2l+1)` rotation matrix for one ambisonic degree,
/// stored row-major and indexed by the `m` offset within the degree block
/// (`m + l` in `0..=2l`).
#[derive(Debug, Clone)]
pub struct DegreeMatrix {
    l: usize,
    entries: Vec<f32>,
}

impl DegreeMatrix {
    fn identity(l: usize) -> Self {
        let n = 2 * l + 1;
        let mut entries = vec![0.0f32; n * n];
        for i in 0..n {
            entries[i * n + i] = 1.0;
        }
        Self { l, entries }
    }

    fn dim(&self) -> usize {
        2 * self.l + 1
    }

    fn get(&self, row_m: i32, col_m: i32) -> f32 {
        let n = self.dim();
        let l = self.l as i32;
        self.entries[((row_m + l) as usize) * n + (col_m + l) as usize]
    }

    fn set(&mut self, row_m: i32, col_m: i32, value: f32) {
        let n = self.dim();
        let l = self.l as i32;
        self.entries[((row_m + l) as usize) * n + (col_m + l) as usize] = value;
    }

    fn matmul(&self, other: &DegreeMatrix) -> DegreeMatrix {
        debug_assert_eq!(self.l, other.l);
        let l = self.l as i32;
        let mut out = DegreeMatrix::identity(self.l);
        for row in -l..=l {
            for col in -l..=l {
                let mut acc = 0.0f32;
                for k in -l..=l {
                    acc += self.get(row, k) * other.get(k, col);
                }
                out.set(row, col, acc);
            }
        }
        out
    }

    fn transpose(&self) -> DegreeMatrix {
        let l = self.l as i32;
        let mut out = DegreeMatrix::identity(self.l);
        for row in -l..=l {
            for col in -l..=l {
                out.set(row, col, self.get(col, row));
            }
        }
        out
    }

    fn apply(&self, block: &[f32], out: &mut [f32]) {
        let l = self.l as i32;
        let n = self.dim();
        debug_assert_eq!(block.len(), n);
        for row in -l..=l {
            let mut acc = 0.0f32;
            for col in -l..=l {
                acc += self.get(row, col) * block[(col + l) as usize];
            }
            out[(row + l) as usize] = acc;
        }
    }
}

/// `R_z(angle)` in real SN3D/ACN basis for one degree: block-diagonal 2x2
/// rotations in `(m, -m)` pairs, `m = 0` fixed.
fn z_rotation(l: usize, angle: f32) -> DegreeMatrix {
    let mut mat = DegreeMatrix::identity(l);
    for m in 1..=l as i32 {
        let c = (m as f32 * angle).cos();
        let s = (m as f32 * angle).sin();
        mat.set(m, m, c);
        mat.set(m, -m, -s);
        mat.set(-m, m, s);
        mat.set(-m, -m, c);
    }
    mat
}

/// A fixed permutation-with-sign matrix per degree that swaps the role of the
/// Z axis (yaw pole) and the X axis, so conjugating a yaw rotation through it
/// yields a rotation about X -- used to realize pitch without a second
/// recurrence. Built once per order in [`Rotator::new`].
fn axis_swap(l: usize) -> DegreeMatrix {
    let mut mat = DegreeMatrix::identity(l);
    if l == 0 {
        return mat;
    }
    // Swap the ACN channels carrying the m=0 (Z-pole) and m=+1 (X) roles for
    // this degree, leaving the m=-1 (Y) role and all |m| >= 2 rows untouched.
    let n = l as i32;
    mat.set(0, 0, 0.0);
    mat.set(1.min(n), 1.min(n), 0.0);
    mat.set(0, 1, 1.0);
    mat.set(1, 0, 1.0);
    mat
}

/// Per-order rotator: precomputes the axis-swap conjugator for every degree
/// up to `order`, then builds full rotation matrices for arbitrary
/// `(yaw, pitch)` pairs on demand, caching recent results.
#[derive(Debug)]
pub struct Rotator {
    order: usize,
    swaps: Vec<DegreeMatrix>,
    cache: HashMap<(i32, i32), Vec<DegreeMatrix>>,
    lru: Vec<(i32, i32)>,
}

impl Rotator {
    pub fn new(order: usize) -> Self {
        assert!(order <= MAX_ORDER, "ambisonic degree {order} exceeds MAX_ORDER");
        let swaps = (0..=order).map(axis_swap).collect();
        Self {
            order,
            swaps,
            cache: HashMap::new(),
            lru: Vec::new(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the per-degree rotation matrices for `(yaw, pitch)`, in
    /// radians, computing and caching them if this exact quantized pose
    /// hasn't been seen recently.
    pub fn rotation_for(&mut self, yaw: f32, pitch: f32) -> &[DegreeMatrix] {
        let key = (quantize(yaw), quantize(pitch));

        if self.cache.contains_key(&key) {
            log::trace!("rotator cache hit for yaw={yaw:.4} pitch={pitch:.4}");
            self.touch(key);
        } else {
            log::trace!("rotator cache miss for yaw={yaw:.4} pitch={pitch:.4}");
            let built = self.build(yaw, pitch);
            self.insert(key, built);
        }

        self.cache.get(&key).expect("key just inserted or touched")
    }

    fn build(&self, yaw: f32, pitch: f32) -> Vec<DegreeMatrix> {
        (0..=self.order)
            .map(|l| {
                let yaw_mat = z_rotation(l, yaw);
                if l == 0 {
                    return yaw_mat;
                }
                let swap = &self.swaps[l];
                let pitch_as_yaw = z_rotation(l, pitch);
                let pitch_mat = swap.matmul(&pitch_as_yaw).matmul(&swap.transpose());
                yaw_mat.matmul(&pitch_mat)
            })
            .collect()
    }

    fn touch(&mut self, key: (i32, i32)) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push(key);
    }

    fn insert(&mut self, key: (i32, i32), matrices: Vec<DegreeMatrix>) {
        self.cache.insert(key, matrices);
        self.lru.push(key);
        while self.cache.len() > CACHE_CAPACITY {
            let oldest = self.lru.remove(0);
            self.cache.remove(&oldest);
        }
    }
}

/// Largest `(2l+1)` block any single degree up to [`MAX_ORDER`] needs, used
/// to size reusable scratch buffers for [`rotate`].
pub const MAX_DEGREE_BLOCK: usize = 2 * MAX_ORDER + 1;

/// Applies per-degree rotation matrices to one ACN-ordered channel vector.
///
/// `scratch_in`/`scratch_out` must each be at least [`MAX_DEGREE_BLOCK`]
/// elements long; they're overwritten per degree rather than allocated, so
/// callers on a real-time path should own and reuse them across calls.
pub fn rotate(
    matrices: &[DegreeMatrix],
    channels: &mut [f32],
    scratch_in: &mut [f32],
    scratch_out: &mut [f32],
) {
    for mat in matrices {
        let l = mat.l;
        let lo = lm_to_acn(l, -(l as i32));
        let hi = lm_to_acn(l, l as i32);
        let len = hi - lo + 1;
        let block = &mut scratch_in[..len];
        block.copy_from_slice(&channels[lo..=hi]);
        let out = &mut scratch_out[..len];
        mat.apply(block, out);
        channels[lo..=hi].copy_from_slice(out);
    }
}

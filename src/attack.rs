//! Key-recovery attacks on the encoded affine layers.
//!
//! The white-box construction is not cryptographically secure: the public
//! `(matrix, vector)` sequence leaks enough structure to recover the master
//! key and both external encodings. [`linear`] breaks boxes protected by
//! linear self-equivalences with closed-form coefficient read-off;
//! [`affine`] breaks affine self-equivalence encodings by solving small
//! polynomial systems with Gröbner bases.

pub mod affine;
pub mod linear;

use crate::equivalence::AffineMap;

/// Everything an attack recovers: the master key and the two external
/// encodings that were applied by the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recovery {
    pub key: Vec<u64>,
    pub input_encoding: AffineMap,
    pub output_encoding: AffineMap,
}

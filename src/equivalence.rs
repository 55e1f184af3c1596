//! Self-equivalences of the modular-addition step.
//!
//! A self-equivalence of `S(x, y) = (x ⊞ y, y)` is a pair of affine
//! bijections `(a, b)` over GF(2) with `S ∘ a = b ∘ S`. Conjugating the
//! affine layer of a Speck round by a fresh self-equivalence leaves the
//! encryption function unchanged while mixing the round key into the layer's
//! matrix and vector, which is the entire trick behind the white-box
//! construction.
//!
//! The providers in the submodules generate such pairs: [`linear`] and
//! [`affine`] from explicit closed-form block constructions, [`anf`] from a
//! precomputed coefficient table, and [`combined`] by composing other
//! providers. All of them parameterize a family of self-equivalences by a
//! short vector of GF(2) coefficients; the closed-form constructions also
//! instantiate symbolically, with the coefficients as polynomial variables,
//! which is what the algebraic attack runs on.

pub mod affine;
pub mod anf;
pub mod combined;
pub mod linear;

use {
    crate::{
        bits::{BitMatrix, BitVector},
        error::Error,
        poly::{Gf2, Poly, Ring, RingMat},
    },
    rand::{Rng, RngCore},
};

/// An affine map `v ↦ M·v + c` over GF(2).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AffineMap {
    pub matrix: BitMatrix,
    pub vector: BitVector,
}

impl AffineMap {
    #[must_use]
    pub fn new(matrix: BitMatrix, vector: BitVector) -> Self {
        Self { matrix, vector }
    }

    /// The identity map on vectors of the given length.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self::new(BitMatrix::identity(len), BitVector::zero(len))
    }

    #[must_use]
    pub fn apply(&self, v: &BitVector) -> BitVector {
        &(&self.matrix * v) + &self.vector
    }
}

/// A self-equivalence `(a, b)` of `S`, satisfying `S(a(v)) = b(S(v))` for
/// every `v`. Both maps are affine bijections.
#[derive(Clone, Debug)]
pub struct SelfEquivalence {
    pub a: AffineMap,
    pub b: AffineMap,
}

/// A source of random self-equivalences of `S`.
pub trait SelfEquivalenceProvider {
    fn word_size(&self) -> usize;

    /// Generate a random self-equivalence.
    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence;
}

/// A provider whose self-equivalences are determined by a vector of GF(2)
/// coefficients.
pub trait CoefficientProvider: SelfEquivalenceProvider {
    /// The number of coefficients consumed per self-equivalence.
    fn coefficients_size(&self) -> usize;

    /// Whether a coefficient vector satisfies the provider's constraints.
    fn check_constraints(&self, coefficients: &[Gf2]) -> bool {
        coefficients.len() == self.coefficients_size()
    }

    /// Generate the self-equivalence determined by the coefficients.
    fn self_equivalence(&self, coefficients: &[Gf2]) -> Result<SelfEquivalence, Error>;
}

/// A self-equivalence with polynomial entries, kept in the shape the
/// algebraic attack consumes: the `b` side is stored as `B⁻¹` and the
/// pre-image offset `b'` (with `b = B·b'`), because inverting a matrix of
/// polynomials is not meaningful.
#[derive(Clone, Debug)]
pub struct SymbolicSelfEquivalence {
    pub a: RingMat<Poly>,
    pub a_offset: Vec<Poly>,
    pub b_inverse: RingMat<Poly>,
    pub b_offset: Vec<Poly>,
}

/// A provider that can instantiate its construction with the coefficients as
/// polynomial variables.
pub trait SymbolicProvider: CoefficientProvider {
    /// Build the symbolic self-equivalence for the given coefficient
    /// polynomials.
    fn symbolic_self_equivalence(&self, coefficients: &[Poly]) -> SymbolicSelfEquivalence;
}

/// Sample random coefficients until the provider's constraints hold, then
/// build the self-equivalence. The constraints of every provider here are
/// satisfied with probability at least 3/4 per trial, so this terminates
/// quickly.
pub(crate) fn random_by_coefficients<P: CoefficientProvider + ?Sized>(
    provider: &P,
    rng: &mut dyn RngCore,
) -> SelfEquivalence {
    loop {
        let coefficients: Vec<Gf2> = (0..provider.coefficients_size())
            .map(|_| Gf2(rng.gen()))
            .collect();
        if !provider.check_constraints(&coefficients) {
            continue;
        }
        match provider.self_equivalence(&coefficients) {
            Ok(se) => return se,
            Err(_) => continue,
        }
    }
}

/// Split the conjugated matrix `M = L·A'·L⁻¹` and offset `m = L·a'` of an
/// implicit self-equivalence into the `(A, a)` and `(B, b)` halves. The top
/// left block of `M` is `A` directly; the bottom right block is `B⁻¹` and is
/// inverted here, with the offset mapped through it.
pub(crate) fn split_implicit(
    conjugation: &BitMatrix,
    a_prime: &BitMatrix,
    a_offset: &BitVector,
    word_size: usize,
) -> Result<SelfEquivalence, Error> {
    let inverse = conjugation.inverse()?;
    let m = &(conjugation * a_prime) * &inverse;
    let offset = conjugation * a_offset;

    let half = 2 * word_size;
    let a_matrix = m.submatrix(0, 0, half, half);
    let mut a_vector = BitVector::zero(half);
    let mut b_pre = BitVector::zero(half);
    for i in 0..half {
        a_vector.set(i, offset.get(i));
        b_pre.set(i, offset.get(half + i));
    }
    let b_matrix = m.submatrix(half, half, half, half).inverse()?;
    let b_vector = &b_matrix * &b_pre;
    Ok(SelfEquivalence {
        a: AffineMap::new(a_matrix, a_vector),
        b: AffineMap::new(b_matrix, b_vector),
    })
}

/// The symbolic counterpart of [`split_implicit`]: conjugate over the
/// polynomial ring and return the halves without inverting `B⁻¹`.
pub(crate) fn split_implicit_symbolic(
    conjugation: &BitMatrix,
    a_prime: &RingMat<Poly>,
    a_offset: &[Poly],
    word_size: usize,
) -> SymbolicSelfEquivalence {
    let lifted = RingMat::<Poly>::from_bits(conjugation);
    let inverse = RingMat::<Poly>::from_bits(
        &conjugation
            .inverse()
            .expect("conjugation patterns are invertible"),
    );
    let m = lifted.mul(a_prime).mul(&inverse);
    let offset = lifted.mul_vec(a_offset);

    let half = 2 * word_size;
    SymbolicSelfEquivalence {
        a: m.submatrix(0, 0, half, half),
        a_offset: offset[..half].to_vec(),
        b_inverse: m.submatrix(half, half, half, half),
        b_offset: offset[half..].to_vec(),
    }
}

/// Convert GF(2) coefficients into ring constants for the generic
/// constructions.
pub(crate) fn lift_coefficients<R: Ring>(coefficients: &[Gf2]) -> Vec<R> {
    coefficients.iter().map(|c| R::from_bit(c.0)).collect()
}

/// Build a `4×4` block matrix from a pattern of zero and identity blocks,
/// each of size `word_size`.
pub(crate) fn block_pattern(word_size: usize, pattern: [[bool; 4]; 4]) -> BitMatrix {
    let mut m = BitMatrix::zero(4 * word_size, 4 * word_size);
    for (block_row, row) in pattern.iter().enumerate() {
        for (block_col, bit) in row.iter().enumerate() {
            if *bit {
                for i in 0..word_size {
                    m.set(block_row * word_size + i, block_col * word_size + i, true);
                }
            }
        }
    }
    m
}

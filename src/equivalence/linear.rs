//! Linear self-equivalences of the modular addition, from a closed-form
//! block construction.
//!
//! The construction consumes `2w` coefficients and produces a pair of linear
//! bijections (the offsets are always zero). Four `w×w` blocks are filled
//! from the coefficients, tiled into an implicit `4w×4w` matrix `A'`, and
//! conjugated by a fixed pattern matrix `L`; the top left and (inverted)
//! bottom right quarters of the result are the two sides of the
//! self-equivalence.

use {
    super::{
        block_pattern, lift_coefficients, random_by_coefficients, split_implicit,
        split_implicit_symbolic, CoefficientProvider, SelfEquivalence, SelfEquivalenceProvider,
        SymbolicProvider, SymbolicSelfEquivalence,
    },
    crate::{
        bits::{BitMatrix, BitVector},
        error::Error,
        poly::{Gf2, Poly, Ring, RingMat},
    },
    rand::RngCore,
};

pub struct LinearSelfEquivalenceProvider {
    word_size: usize,
    conjugation: BitMatrix,
}

impl LinearSelfEquivalenceProvider {
    #[must_use]
    pub fn new(word_size: usize) -> Self {
        let conjugation = block_pattern(
            word_size,
            [
                [false, true, true, false],
                [true, true, true, false],
                [false, false, true, false],
                [true, false, true, true],
            ],
        );
        Self {
            word_size,
            conjugation,
        }
    }

    /// Fill the implicit matrix `A'` from the coefficients, which are
    /// consumed back to front.
    pub(crate) fn implicit<R: Ring>(&self, coefficients: &[R]) -> RingMat<R> {
        let ws = self.word_size;
        let mut coefficients = coefficients.to_vec();
        let mut pop = || coefficients.pop().expect("coefficient count checked");

        let mut c0 = RingMat::<R>::identity(ws);
        for i in 0..ws - 1 {
            c0.set(ws - 1, i, pop());
        }

        let mut c1 = RingMat::<R>::identity(ws);
        for i in 0..ws - 1 {
            c1.set(ws - 1, i, pop());
        }

        let mut d0 = RingMat::<R>::zero(ws, ws);
        d0.set(ws - 1, 0, pop());
        for i in 1..ws - 1 {
            d0.set(ws - 1, i, c0.get(ws - 1, i).clone());
        }

        let mut d1 = RingMat::<R>::zero(ws, ws);
        d1.set(ws - 1, 0, pop());
        for i in 1..ws - 1 {
            d1.set(ws - 1, i, c0.get(ws - 1, i).add(c1.get(ws - 1, i)));
        }

        let zero = RingMat::<R>::zero(ws, ws);
        let c01 = c0.add(&c1);
        RingMat::block(&[
            &[&c0, &d0, &d0, &zero],
            &[&d1, &c1, &c01, &d0],
            &[&d0, &zero, &c0, &d0],
            &[&c01, &d0, &d1, &c1],
        ])
    }
}

impl SelfEquivalenceProvider for LinearSelfEquivalenceProvider {
    fn word_size(&self) -> usize {
        self.word_size
    }

    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence {
        random_by_coefficients(self, rng)
    }
}

impl CoefficientProvider for LinearSelfEquivalenceProvider {
    fn coefficients_size(&self) -> usize {
        2 * self.word_size
    }

    fn self_equivalence(&self, coefficients: &[Gf2]) -> Result<SelfEquivalence, Error> {
        if coefficients.len() != self.coefficients_size() {
            return Err(Error::InvalidCoefficients(format!(
                "expected {} coefficients but got {}",
                self.coefficients_size(),
                coefficients.len()
            )));
        }
        let a_prime = self.implicit::<Gf2>(&lift_coefficients(coefficients));
        let offset = BitVector::zero(4 * self.word_size);
        split_implicit(&self.conjugation, &a_prime.to_bits(), &offset, self.word_size)
    }
}

impl SymbolicProvider for LinearSelfEquivalenceProvider {
    fn symbolic_self_equivalence(&self, coefficients: &[Poly]) -> SymbolicSelfEquivalence {
        assert_eq!(coefficients.len(), self.coefficients_size());
        let a_prime = self.implicit::<Poly>(coefficients);
        let offset = vec![Poly::zero(); 4 * self.word_size];
        split_implicit_symbolic(&self.conjugation, &a_prime, &offset, self.word_size)
    }
}

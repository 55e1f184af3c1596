//! Composition of self-equivalences from multiple providers.

use {
    super::{AffineMap, SelfEquivalence, SelfEquivalenceProvider},
    crate::bits::{BitMatrix, BitVector},
    rand::RngCore,
};

/// Combines multiple delegate providers: a self-equivalence is drawn from
/// each and folded into a single composite, which inherits the defining
/// invariant because self-equivalences form a group under composition.
pub struct CombinedSelfEquivalenceProvider {
    word_size: usize,
    delegates: Vec<Box<dyn SelfEquivalenceProvider>>,
}

impl CombinedSelfEquivalenceProvider {
    #[must_use]
    pub fn new(word_size: usize, delegates: Vec<Box<dyn SelfEquivalenceProvider>>) -> Self {
        assert!(delegates
            .iter()
            .all(|delegate| delegate.word_size() == word_size));
        Self {
            word_size,
            delegates,
        }
    }
}

impl SelfEquivalenceProvider for CombinedSelfEquivalenceProvider {
    fn word_size(&self) -> usize {
        self.word_size
    }

    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence {
        let half = 2 * self.word_size;
        let mut a = AffineMap::new(BitMatrix::identity(half), BitVector::zero(half));
        let mut b = AffineMap::new(BitMatrix::identity(half), BitVector::zero(half));
        for delegate in &self.delegates {
            let se = delegate.random_self_equivalence(rng);
            // The a side composes inside out, the b side outside in.
            a = AffineMap::new(
                &a.matrix * &se.a.matrix,
                &(&a.matrix * &se.a.vector) + &a.vector,
            );
            b = AffineMap::new(
                &se.b.matrix * &b.matrix,
                &(&se.b.matrix * &b.vector) + &se.b.vector,
            );
        }
        SelfEquivalence { a, b }
    }
}

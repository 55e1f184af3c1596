use {
    super::rng,
    crate::{
        equivalence::{
            affine::{Type1AffineSelfEquivalenceProvider, Type2AffineSelfEquivalenceProvider},
            combined::CombinedSelfEquivalenceProvider,
            linear::LinearSelfEquivalenceProvider,
            CoefficientProvider, SelfEquivalence, SelfEquivalenceProvider,
        },
        BitVector, Gf2,
    },
    rand::RngCore,
};

/// Apply `S(x, y) = (x ⊞ y, y)` to a bit vector over words of `w` bits.
fn modular_addition(w: usize, v: &BitVector) -> BitVector {
    let mask = (1u64 << w) - 1;
    let x = v.word(0, w);
    let y = v.word(w, w);
    let mut result = BitVector::zero(2 * w);
    let sum = x.wrapping_add(y) & mask;
    for i in 0..w {
        result.set(i, (sum >> i) & 1 == 1);
        result.set(w + i, (y >> i) & 1 == 1);
    }
    result
}

/// Assert the defining invariant `S(a(v)) = b(S(v))` on a vector.
fn check(w: usize, se: &SelfEquivalence, v: &BitVector) {
    let left = modular_addition(w, &se.a.apply(v));
    let right = se.b.apply(&modular_addition(w, v));
    assert_eq!(left, right);
}

/// Check the invariant exhaustively over every input vector at a small word
/// size, for many random self-equivalences of each closed-form provider.
#[test]
fn invariant_exhaustive_small_words() {
    let w = 4;
    let providers: Vec<Box<dyn SelfEquivalenceProvider>> = vec![
        Box::new(LinearSelfEquivalenceProvider::new(w)),
        Box::new(Type1AffineSelfEquivalenceProvider::new(w)),
        Box::new(Type2AffineSelfEquivalenceProvider::new(w)),
    ];
    let mut rng = rng(20);
    for provider in &providers {
        for _ in 0..20 {
            let se = provider.random_self_equivalence(&mut rng);
            assert!(se.a.matrix.is_invertible());
            assert!(se.b.matrix.is_invertible());
            for bits in 0..1u64 << (2 * w) {
                let mut v = BitVector::zero(2 * w);
                for i in 0..2 * w {
                    v.set(i, (bits >> i) & 1 == 1);
                }
                check(w, &se, &v);
            }
        }
    }
}

/// Check the invariant on sampled vectors at the 32-bit block size, for
/// every provider including the combined one.
#[test]
fn invariant_sampled() {
    let w = 16;
    let providers: Vec<Box<dyn SelfEquivalenceProvider>> = vec![
        Box::new(LinearSelfEquivalenceProvider::new(w)),
        Box::new(Type1AffineSelfEquivalenceProvider::new(w)),
        Box::new(Type2AffineSelfEquivalenceProvider::new(w)),
        Box::new(CombinedSelfEquivalenceProvider::new(
            w,
            vec![
                Box::new(Type1AffineSelfEquivalenceProvider::new(w)),
                Box::new(Type2AffineSelfEquivalenceProvider::new(w)),
            ],
        )),
    ];
    let mut rng = rng(21);
    for provider in &providers {
        for _ in 0..10 {
            let se = provider.random_self_equivalence(&mut rng);
            for _ in 0..100 {
                let v = BitVector::random(2 * w, &mut rng);
                check(w, &se, &v);
            }
        }
    }
}

/// Coefficient vectors of the wrong length are rejected.
#[test]
fn invalid_coefficients() {
    let provider = LinearSelfEquivalenceProvider::new(16);
    assert!(provider.self_equivalence(&[Gf2(true); 3]).is_err());
    let provider = Type1AffineSelfEquivalenceProvider::new(16);
    assert!(provider.self_equivalence(&[Gf2(true); 3]).is_err());
}

/// Type 2 rejects coefficients whose first two entries are both zero.
#[test]
fn type2_constraint() {
    let provider = Type2AffineSelfEquivalenceProvider::new(16);
    let mut coefficients = vec![Gf2(false); provider.coefficients_size()];
    assert!(provider.self_equivalence(&coefficients).is_err());
    coefficients[0] = Gf2(true);
    assert!(provider.self_equivalence(&coefficients).is_ok());
}

/// Distinct coefficients give distinct self-equivalences (the construction
/// does not collapse).
#[test]
fn coefficients_matter() {
    let provider = LinearSelfEquivalenceProvider::new(16);
    let mut rng = rng(22);
    let mut first: Vec<Gf2> = (0..provider.coefficients_size())
        .map(|_| Gf2(rng.next_u32() & 1 == 1))
        .collect();
    let a = provider.self_equivalence(&first).unwrap();
    first[0] = Gf2(!first[0].0);
    let b = provider.self_equivalence(&first).unwrap();
    assert_ne!(a.a.matrix, b.a.matrix);
}

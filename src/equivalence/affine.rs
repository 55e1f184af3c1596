//! Affine self-equivalences of the modular addition, from two closed-form
//! block constructions.
//!
//! Each construction consumes `2w + 7` coefficients and fills a set of
//! `w×w` blocks plus a length-`4w` offset through an explicit table of
//! entry assignments. The filled blocks tile into an implicit `4w×4w`
//! matrix which is conjugated by a type-specific pattern matrix, exactly as
//! in the linear construction, except that the offsets are now nonzero.
//!
//! The entry tables are not illuminating to read: they are the solved form
//! of the self-equivalence conditions, and the only sensible way to work
//! with them is to check the defining invariant afterwards, which the test
//! suite does for every supported word size. The coefficient consumption
//! order (popped from the back of the list, except the two leading type 2
//! coefficients) is part of the construction and must not be changed.

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

/// Generates type 1 affine self-equivalences.
pub struct Type1AffineSelfEquivalenceProvider {
    word_size: usize,
    conjugation: BitMatrix,
}

impl Type1AffineSelfEquivalenceProvider {
    #[must_use]
    pub fn new(word_size: usize) -> Self {
        assert!(word_size >= 3);
        let conjugation = block_pattern(
            word_size,
            [
                [true, false, true, true],
                [false, false, true, true],
                [false, false, true, false],
                [false, true, true, false],
            ],
        );
        Self {
            word_size,
            conjugation,
        }
    }

    fn implicit<R: Ring>(&self, coefficients: &[R]) -> (RingMat<R>, Vec<R>) {
        let ws = self.word_size;
        let mut coefficients = coefficients.to_vec();
        let mut pop = || coefficients.pop().expect("coefficient count checked");
        let one = R::one();

        let mut c = RingMat::<R>::identity(ws);
        c.set(ws - 1, 0, pop());
        c.set(ws - 1, ws - 2, pop());

        let mut d = RingMat::<R>::identity(ws);
        for i in 1..ws {
            d.set(ws - 1, i, pop());
        }

        let mut e = RingMat::<R>::identity(ws);
        e.set(1, 0, pop());
        for i in 1..ws - 1 {
            e.set(ws - 1, i, pop());
        }

        let mut f = RingMat::<R>::identity(ws);
        f.set(1, 0, pop());
        f.set(ws - 1, 0, pop());
        f.set(ws - 1, ws - 2, pop());

        let mut g = RingMat::<R>::zero(ws, ws);
        g.set(ws - 1, 0, pop());

        let mut h = RingMat::<R>::zero(ws, ws);
        h.set(ws - 1, 0, pop());

        d.set(
            ws - 1,
            0,
            f.get(1, 0).add(f.get(ws - 1, 0)).add(g.get(ws - 1, 0)),
        );

        for i in 2..ws - 1 {
            e.set(i, 0, e.get(1, 0).clone());
        }
        e.set(
            ws - 1,
            0,
            c.get(ws - 1, 0).add(e.get(1, 0)).add(g.get(ws - 1, 0)),
        );
        e.set(ws - 1, ws - 1, d.get(ws - 1, ws - 1).clone());

        for i in 2..ws - 1 {
            f.set(i, 0, f.get(1, 0).clone());
        }
        for i in 1..ws - 2 {
            f.set(ws - 1, i, d.get(ws - 1, i).add(e.get(ws - 1, i)));
        }

        for i in 1..ws - 1 {
            g.set(ws - 1, i, e.get(ws - 1, i).clone());
        }
        g.set(ws - 1, ws - 1, d.get(ws - 1, ws - 1).add(&one));

        for i in 1..ws - 1 {
            h.set(i, 0, e.get(1, 0).add(f.get(1, 0)));
        }

        let mut ii = RingMat::<R>::zero(ws, ws);
        ii.set(
            ws - 1,
            0,
            c.get(ws - 1, 0)
                .add(e.get(1, 0))
                .add(f.get(ws - 1, 0))
                .add(g.get(ws - 1, 0))
                .add(h.get(ws - 1, 0)),
        );
        for i in 1..ws - 2 {
            ii.set(ws - 1, i, d.get(ws - 1, i).clone());
        }
        ii.set(
            ws - 1,
            ws - 2,
            e.get(ws - 1, ws - 2).add(f.get(ws - 1, ws - 2)),
        );
        ii.set(ws - 1, ws - 1, d.get(ws - 1, ws - 1).add(&one));

        let mut j = RingMat::<R>::zero(ws, ws);
        for i in 1..ws - 1 {
            j.set(i, 0, f.get(1, 0).clone());
        }
        j.set(ws - 1, 0, f.get(1, 0).add(g.get(ws - 1, 0)));
        for i in 1..ws - 2 {
            j.set(ws - 1, i, e.get(ws - 1, i).clone());
        }
        j.set(
            ws - 1,
            ws - 2,
            d.get(ws - 1, ws - 2).add(f.get(ws - 1, ws - 2)),
        );
        j.set(ws - 1, ws - 1, d.get(ws - 1, ws - 1).add(&one));

        let mut a = vec![R::zero(); 4 * ws];
        a[0] = f.get(1, 0).clone();
        a[ws - 2] = d
            .get(ws - 1, ws - 2)
            .add(e.get(ws - 1, ws - 2))
            .add(f.get(ws - 1, ws - 2));
        a[ws - 1] = pop();
        a[ws] = e.get(1, 0).clone();
        a[2 * ws - 2] = c.get(ws - 1, ws - 2).clone();
        a[2 * ws - 1] = pop();
        a[2 * ws] = f.get(1, 0).clone();
        let carry = e.get(1, 0).mul(&f.get(1, 0).add(&one));
        for entry in a.iter_mut().take(3 * ws - 2).skip(2 * ws + 1) {
            *entry = carry.clone();
        }
        a[3 * ws - 2] = carry
            .add(d.get(ws - 1, ws - 2))
            .add(e.get(ws - 1, ws - 2))
            .add(f.get(ws - 1, ws - 2));
        a[3 * ws - 1] = carry
            .add(&c.get(ws - 1, ws - 2).mul(
                &d.get(ws - 1, ws - 2)
                    .add(e.get(ws - 1, ws - 2))
                    .add(f.get(ws - 1, ws - 2))
                    .add(&one),
            ))
            .add(&a[ws - 1]);
        a[3 * ws] = e.get(1, 0).clone();
        a[4 * ws - 2] = c.get(ws - 1, ws - 2).clone();
        a[4 * ws - 1] = a[2 * ws - 1].clone();

        assert!(coefficients.is_empty());

        let zero = RingMat::<R>::zero(ws, ws);
        let a_prime = RingMat::block(&[
            &[&c, &zero, &g, &g],
            &[&zero, &d, &ii, &zero],
            &[&zero, &j, &e, &zero],
            &[&h, &j, &zero, &f],
        ]);
        (a_prime, a)
    }
}

impl SelfEquivalenceProvider for Type1AffineSelfEquivalenceProvider {
    fn word_size(&self) -> usize {
        self.word_size
    }

    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence {
        random_by_coefficients(self, rng)
    }
}

impl CoefficientProvider for Type1AffineSelfEquivalenceProvider {
    fn coefficients_size(&self) -> usize {
        2 * self.word_size + 7
    }

    fn self_equivalence(&self, coefficients: &[Gf2]) -> Result<SelfEquivalence, Error> {
        if coefficients.len() != self.coefficients_size() {
            return Err(Error::InvalidCoefficients(format!(
                "expected {} coefficients but got {}",
                self.coefficients_size(),
                coefficients.len()
            )));
        }
        let (a_prime, a) = self.implicit::<Gf2>(&lift_coefficients(coefficients));
        split_implicit(
            &self.conjugation,
            &a_prime.to_bits(),
            &gf2_vector(&a),
            self.word_size,
        )
    }
}

impl SymbolicProvider for Type1AffineSelfEquivalenceProvider {
    fn symbolic_self_equivalence(&self, coefficients: &[Poly]) -> SymbolicSelfEquivalence {
        assert_eq!(coefficients.len(), self.coefficients_size());
        let (a_prime, a) = self.implicit::<Poly>(coefficients);
        split_implicit_symbolic(&self.conjugation, &a_prime, &a, self.word_size)
    }
}

/// Generates type 2 affine self-equivalences. The first two coefficients
/// must not both be zero.
pub struct Type2AffineSelfEquivalenceProvider {
    word_size: usize,
    conjugation: BitMatrix,
}

impl Type2AffineSelfEquivalenceProvider {
    #[must_use]
    pub fn new(word_size: usize) -> Self {
        assert!(word_size >= 3);
        let conjugation = block_pattern(
            word_size,
            [
                [true, false, true, true],
                [false, true, true, false],
                [false, false, true, false],
                [false, false, true, true],
            ],
        );
        Self {
            word_size,
            conjugation,
        }
    }

    fn implicit<R: Ring>(&self, coefficients: &[R]) -> (RingMat<R>, Vec<R>) {
        let ws = self.word_size;
        let one = R::one();
        // The two leading coefficients are consumed from the front, the rest
        // from the back.
        let c00 = coefficients[0].clone();
        let d00 = coefficients[1].clone();
        let mut coefficients = coefficients[2..].to_vec();
        let mut pop = || coefficients.pop().expect("coefficient count checked");

        let mut c = RingMat::<R>::identity(ws);
        c.set(0, 0, c00.clone());
        c.set(ws - 1, 0, pop());

        let mut d = RingMat::<R>::identity(ws);
        d.set(0, 0, d00.clone());
        d.set(ws - 1, ws - 2, pop());

        let mut e = RingMat::<R>::identity(ws);
        for i in 1..ws - 1 {
            e.set(ws - 1, i, pop());
        }

        let mut f = RingMat::<R>::identity(ws);
        f.set(ws - 1, 0, pop());

        let mut g = RingMat::<R>::identity(ws);
        for i in 1..ws {
            g.set(ws - 1, i, pop());
        }

        let mut h = RingMat::<R>::identity(ws);
        h.set(ws - 1, ws - 2, pop());

        let mut ii = RingMat::<R>::zero(ws, ws);
        ii.set(ws - 1, 0, pop());

        let mut j = RingMat::<R>::zero(ws, ws);
        j.set(ws - 1, 0, pop());

        let cd = c00.add(&d00);

        let mut k = RingMat::<R>::zero(ws, ws);
        k.set(0, 0, cd.clone());
        k.set(
            ws - 1,
            0,
            f.get(ws - 1, 0).mul(&cd).add(&d00.mul(ii.get(ws - 1, 0))),
        );

        d.set(
            ws - 1,
            0,
            c00.mul(j.get(ws - 1, 0))
                .add(&d00.mul(&c.get(ws - 1, 0).add(j.get(ws - 1, 0))))
                .add(&k.get(ws - 1, 0).mul(&g.get(ws - 1, ws - 1).add(&one))),
        );

        e.set(0, 0, c00.clone());
        e.set(
            ws - 1,
            0,
            c00.mul(f.get(ws - 1, 0)).add(&ii.get(ws - 1, 0).mul(&cd)),
        );

        f.set(0, 0, d00.clone());
        for i in 1..ws - 1 {
            f.set(ws - 1, i, e.get(ws - 1, i).clone());
        }

        ii.set(0, 0, cd.clone());

        j.set(0, 0, cd.clone());
        for i in 1..ws - 2 {
            j.set(
                ws - 1,
                i,
                e.get(ws - 1, i)
                    .mul(g.get(ws - 1, ws - 1))
                    .add(g.get(ws - 1, i)),
            );
        }
        j.set(
            ws - 1,
            ws - 2,
            d.get(ws - 1, ws - 2)
                .add(
                    &e.get(ws - 1, ws - 2)
                        .mul(&g.get(ws - 1, ws - 1).add(&one)),
                )
                .add(h.get(ws - 1, ws - 2)),
        );
        j.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut l = RingMat::<R>::zero(ws, ws);
        l.set(0, 0, cd.clone());
        l.set(
            ws - 1,
            0,
            c00.mul(c.get(ws - 1, 0))
                .add(&c00.mul(j.get(ws - 1, 0)))
                .add(&d00.mul(c.get(ws - 1, 0)))
                .add(&e.get(ws - 1, 0).mul(g.get(ws - 1, ws - 1)))
                .add(e.get(ws - 1, 0)),
        );
        for i in 1..ws - 2 {
            l.set(ws - 1, i, e.get(ws - 1, i).add(g.get(ws - 1, i)));
        }
        l.set(
            ws - 1,
            ws - 2,
            d.get(ws - 1, ws - 2)
                .add(e.get(ws - 1, ws - 2))
                .add(g.get(ws - 1, ws - 2)),
        );
        l.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        g.set(0, 0, d00.clone());
        g.set(ws - 1, 0, e.get(ws - 1, 0).add(l.get(ws - 1, 0)));

        h.set(0, 0, c00.clone());
        for i in 1..ws - 2 {
            h.set(ws - 1, i, e.get(ws - 1, i).add(g.get(ws - 1, i)));
        }
        h.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).clone());
        h.set(ws - 1, 0, d.get(ws - 1, 0).add(l.get(ws - 1, 0)));

        let mut m = RingMat::<R>::zero(ws, ws);
        m.set(0, 0, cd.clone());
        m.set(
            ws - 1,
            0,
            d.get(ws - 1, 0)
                .add(e.get(ws - 1, 0))
                .add(k.get(ws - 1, 0))
                .add(l.get(ws - 1, 0)),
        );
        for i in 1..ws - 2 {
            m.set(ws - 1, i, g.get(ws - 1, i).clone());
        }
        m.set(
            ws - 1,
            ws - 2,
            e.get(ws - 1, ws - 2).add(h.get(ws - 1, ws - 2)),
        );
        m.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut n = RingMat::<R>::zero(ws, ws);
        n.set(0, 0, cd.clone());
        n.set(ws - 1, 0, l.get(ws - 1, 0).clone());
        for i in 1..ws - 1 {
            n.set(ws - 1, i, e.get(ws - 1, i).add(g.get(ws - 1, i)));
        }
        n.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut o = RingMat::<R>::zero(ws, ws);
        o.set(
            ws - 1,
            0,
            d.get(ws - 1, 0)
                .add(h.get(ws - 1, 0))
                .add(m.get(ws - 1, 0)),
        );
        for i in 1..ws - 2 {
            o.set(ws - 1, i, e.get(ws - 1, i).clone());
        }
        o.set(
            ws - 1,
            ws - 2,
            d.get(ws - 1, ws - 2).add(e.get(ws - 1, ws - 2)),
        );

        let mut p = RingMat::<R>::zero(ws, ws);
        p.set(ws - 1, 0, d.get(ws - 1, 0).add(g.get(ws - 1, 0)));
        for i in 1..ws - 1 {
            p.set(ws - 1, i, g.get(ws - 1, i).clone());
        }
        p.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut q = RingMat::<R>::zero(ws, ws);
        q.set(
            ws - 1,
            0,
            e.get(ws - 1, 0)
                .add(g.get(ws - 1, 0))
                .add(k.get(ws - 1, 0)),
        );
        for i in 1..ws - 1 {
            q.set(ws - 1, i, e.get(ws - 1, i).add(g.get(ws - 1, i)));
        }
        q.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut r = RingMat::<R>::zero(ws, ws);
        r.set(ws - 1, 0, k.get(ws - 1, 0).add(m.get(ws - 1, 0)));
        for i in 1..ws - 2 {
            r.set(ws - 1, i, g.get(ws - 1, i).clone());
        }
        r.set(
            ws - 1,
            ws - 2,
            e.get(ws - 1, ws - 2).add(h.get(ws - 1, ws - 2)),
        );
        r.set(ws - 1, ws - 1, g.get(ws - 1, ws - 1).add(&one));

        let mut a = vec![R::zero(); 4 * ws];
        a[0] = cd.clone();
        a[ws - 2] = e
            .get(ws - 1, ws - 2)
            .add(g.get(ws - 1, ws - 2))
            .add(h.get(ws - 1, ws - 2));
        a[ws - 1] = pop();
        a[ws] = c00.add(&one);
        a[2 * ws - 2] = d.get(ws - 1, ws - 2).clone();
        a[2 * ws - 1] = pop();
        a[2 * ws] = cd.clone();
        a[3 * ws - 2] = a[ws - 2].clone();
        a[3 * ws - 1] = c00
            .mul(&d00)
            .add(&c00)
            .add(&d00)
            .add(&d.get(ws - 1, ws - 2).mul(&a[ws - 2].add(&one)))
            .add(&a[ws - 1])
            .add(&one);
        a[3 * ws] = c00.add(&one);
        a[4 * ws - 2] = d.get(ws - 1, ws - 2).clone();
        a[4 * ws - 1] = a[2 * ws - 1].clone();

        assert!(coefficients.is_empty());

        let zero = RingMat::<R>::zero(ws, ws);
        let a_prime = RingMat::block(&[
            &[&d, &l, &p, &o],
            &[&k, &e, &q, &r],
            &[&zero, &zero, &g, &m],
            &[&zero, &zero, &n, &h],
        ]);
        (a_prime, a)
    }
}

impl SelfEquivalenceProvider for Type2AffineSelfEquivalenceProvider {
    fn word_size(&self) -> usize {
        self.word_size
    }

    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence {
        random_by_coefficients(self, rng)
    }
}

impl CoefficientProvider for Type2AffineSelfEquivalenceProvider {
    fn coefficients_size(&self) -> usize {
        2 * self.word_size + 7
    }

    fn check_constraints(&self, coefficients: &[Gf2]) -> bool {
        coefficients.len() == self.coefficients_size()
            && (coefficients[0].0 || coefficients[1].0)
    }

    fn self_equivalence(&self, coefficients: &[Gf2]) -> Result<SelfEquivalence, Error> {
        if !self.check_constraints(coefficients) {
            return Err(Error::InvalidCoefficients(format!(
                "expected {} coefficients with the first two not both zero",
                self.coefficients_size()
            )));
        }
        let (a_prime, a) = self.implicit::<Gf2>(&lift_coefficients(coefficients));
        split_implicit(
            &self.conjugation,
            &a_prime.to_bits(),
            &gf2_vector(&a),
            self.word_size,
        )
    }
}

impl SymbolicProvider for Type2AffineSelfEquivalenceProvider {
    fn symbolic_self_equivalence(&self, coefficients: &[Poly]) -> SymbolicSelfEquivalence {
        assert_eq!(coefficients.len(), self.coefficients_size());
        let (a_prime, a) = self.implicit::<Poly>(coefficients);
        split_implicit_symbolic(&self.conjugation, &a_prime, &a, self.word_size)
    }
}

fn gf2_vector(values: &[Gf2]) -> BitVector {
    let mut v = BitVector::zero(values.len());
    for (i, value) in values.iter().enumerate() {
        v.set(i, value.0);
    }
    v
}

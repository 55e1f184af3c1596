//! Gröbner bases in the boolean polynomial ring.
//!
//! The ideals solved here come from equating two affine matrix products, so
//! the generators are degree ≤ 2 in a few dozen to a couple hundred
//! variables, and the solution sets are tiny (usually a single point, or two
//! points differing in one pair of variables). Buchberger's algorithm with
//! the boolean-ring adjustments is entirely sufficient at this scale.
//!
//! Working directly with square-free monomials means the field equations
//! `x² = x` are built into the arithmetic. Their S-polynomials do not vanish
//! for free though: for a generator `f` and a variable `x` dividing the
//! leading term of `f`, the pair reduces to `x·tail(f) + lead(f)`, which is
//! queued alongside the ordinary critical pairs.

use super::Poly;

/// Compute the reduced Gröbner basis of the ideal generated by `generators`
/// (together with the implicit field equations).
pub fn groebner_basis(generators: Vec<Poly>) -> Vec<Poly> {
    let mut basis: Vec<Poly> = Vec::new();
    for generator in generators {
        let reduced = normal_form(&generator, &basis);
        if !reduced.is_zero() {
            basis.push(reduced);
        }
    }
    interreduce(&mut basis);

    // Critical pairs: (i, j) for S-polynomials of basis elements, and
    // (i, i) for the field-equation pairs of element i. The basis only grows
    // during the completion loop, so the indices stay valid.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for i in 0..basis.len() {
        enqueue_pairs(&mut pairs, i);
    }

    while let Some((i, j)) = pairs.pop() {
        let s = if i == j {
            field_pairs(&basis[i])
        } else {
            vec![s_polynomial(&basis[i], &basis[j])]
        };
        for poly in s {
            let reduced = normal_form(&poly, &basis);
            if !reduced.is_zero() {
                enqueue_pairs(&mut pairs, basis.len());
                basis.push(reduced);
            }
        }
    }

    interreduce(&mut basis);
    basis.sort_by(|a, b| a.leading_monomial().cmp(&b.leading_monomial()));
    basis
}

/// Reduce `poly` to normal form modulo `basis`: repeatedly cancel any term
/// divisible by a basis leading term. With a graded monomial order each step
/// replaces a term by strictly smaller ones, so this terminates.
pub fn normal_form(poly: &Poly, basis: &[Poly]) -> Poly {
    let mut result = poly.clone();
    'reduce: loop {
        for term in result.terms().rev().cloned().collect::<Vec<_>>() {
            for divisor in basis {
                let Some(lead) = divisor.leading_monomial() else {
                    continue;
                };
                if lead.divides(&term) {
                    let cofactor = Poly::from_monomial(term.div(lead));
                    result = result.add(&cofactor.mul(divisor));
                    continue 'reduce;
                }
            }
        }
        return result;
    }
}

fn enqueue_pairs(pairs: &mut Vec<(usize, usize)>, index: usize) {
    for other in 0..index {
        pairs.push((other, index));
    }
    pairs.push((index, index));
}

/// The classical S-polynomial, with idempotent cofactor multiplication.
fn s_polynomial(f: &Poly, g: &Poly) -> Poly {
    let (lf, lg) = (f.leading_monomial().unwrap(), g.leading_monomial().unwrap());
    let lcm = lf.mul(lg);
    let cf = Poly::from_monomial(lcm.div(lf));
    let cg = Poly::from_monomial(lcm.div(lg));
    cf.mul(f).add(&cg.mul(g))
}

/// S-polynomials of `f` against the field equations of the variables in its
/// leading term: `x·tail(f) + lead(f)` for each such variable `x`.
fn field_pairs(f: &Poly) -> Vec<Poly> {
    let Some(lead) = f.leading_monomial().cloned() else {
        return Vec::new();
    };
    let tail = f.add(&Poly::from_monomial(lead.clone()));
    lead.vars()
        .iter()
        .map(|x| {
            Poly::variable(*x)
                .mul(&tail)
                .add(&Poly::from_monomial(lead.clone()))
        })
        .collect()
}

/// Replace every element by its normal form modulo the others and drop
/// zeros, until stable.
fn interreduce(basis: &mut Vec<Poly>) {
    loop {
        let mut changed = false;
        let mut index = 0;
        while index < basis.len() {
            let element = basis.swap_remove(index);
            let reduced = normal_form(&element, basis);
            if reduced != element {
                changed = true;
            }
            if reduced.is_zero() {
                continue;
            }
            basis.push(reduced);
            let last = basis.len() - 1;
            basis.swap(index, last);
            index += 1;
        }
        if !changed {
            return;
        }
    }
}

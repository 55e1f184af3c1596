use crate::{
    poly::groebner::{groebner_basis, normal_form},
    Poly,
};

/// A linear system with a unique solution reduces to assignments.
#[test]
fn linear_system() {
    // x + y = 0, y + 1 = 0, so x = y = 1.
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let basis = groebner_basis(vec![x.add(&y), y.add(&Poly::one())]);
    assert_eq!(basis.len(), 2);
    assert!(basis.contains(&x.add(&Poly::one())));
    assert!(basis.contains(&y.add(&Poly::one())));
}

/// A quadratic system with a unique solution still reduces to assignments.
#[test]
fn quadratic_system() {
    // x*y + 1 = 0 forces x = y = 1 over GF(2).
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let basis = groebner_basis(vec![x.mul(&y).add(&Poly::one())]);
    assert!(basis.contains(&x.add(&Poly::one())));
    assert!(basis.contains(&y.add(&Poly::one())));
}

/// A system with two solutions keeps the relation between the free
/// variables.
#[test]
fn two_point_variety() {
    // x + y + 1 = 0 and z = 0: solutions (x, y) in {(0,1), (1,0)}.
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let z = Poly::variable(2);
    let basis = groebner_basis(vec![x.add(&y).add(&Poly::one()), z.clone()]);
    assert!(basis.contains(&z));
    assert!(basis.contains(&x.add(&y).add(&Poly::one())));
    assert_eq!(basis.len(), 2);
}

/// An inconsistent system contains 1.
#[test]
fn inconsistent_system() {
    // x = 0 and x + 1 = 0.
    let x = Poly::variable(0);
    let basis = groebner_basis(vec![x.clone(), x.add(&Poly::one())]);
    assert!(basis.contains(&Poly::one()));
}

/// Normal forms substitute assignments into larger polynomials.
#[test]
fn normal_form_reduces() {
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    // Modulo x + 1, the polynomial x*y + x reduces to y + 1.
    let reduced = normal_form(&x.mul(&y).add(&x), &[x.add(&Poly::one())]);
    assert_eq!(reduced, y.add(&Poly::one()));
    // Modulo x, it reduces to zero.
    let reduced = normal_form(&x.mul(&y).add(&x), &[x.clone()]);
    assert!(reduced.is_zero());
}

/// The field equations are implicit: a square-free product of a generator
/// with a variable stays in the ideal.
#[test]
fn boolean_closure() {
    // From x*y + x (= x*(y + 1)) and y, the basis must contain x.
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let basis = groebner_basis(vec![x.mul(&y).add(&x), y.clone()]);
    assert!(basis.contains(&x));
    assert!(basis.contains(&y));
}

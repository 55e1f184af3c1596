use {
    crate::{poly::parse::parse_poly, Poly, VarSet},
    std::collections::HashMap,
};

/// Multiplication is idempotent in the boolean ring: `(x + y)² = x + y`.
#[test]
fn multiplication_is_idempotent() {
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let sum = x.add(&y);
    assert_eq!(sum.mul(&sum), sum);
    assert_eq!(x.mul(&x), x);
}

/// Addition is XOR of term sets.
#[test]
fn addition_cancels() {
    let x = Poly::variable(0);
    assert!(x.add(&x).is_zero());
    let p = x.add(&Poly::one());
    assert_eq!(p.add(&Poly::one()), x);
}

/// `(x + 1)(y + 1) = xy + x + y + 1`.
#[test]
fn distribution() {
    let x = Poly::variable(0);
    let y = Poly::variable(1);
    let product = x.add(&Poly::one()).mul(&y.add(&Poly::one()));
    let expected = x.mul(&y).add(&x).add(&y).add(&Poly::one());
    assert_eq!(product, expected);
}

/// Substituting a polynomial for a variable.
#[test]
fn substitution() {
    // f = x*y + z, with x := y + 1, becomes y*y + y + z = z.
    let f = Poly::variable(0).mul(&Poly::variable(1)).add(&Poly::variable(2));
    let map = HashMap::from([(0, Poly::variable(1).add(&Poly::one()))]);
    let expected = Poly::variable(1)
        .mul(&Poly::variable(1))
        .add(&Poly::variable(1))
        .add(&Poly::variable(2));
    assert_eq!(f.substitute(&map), expected);
    assert_eq!(f.substitute(&map), Poly::variable(2));
}

/// Partial assignment of constants.
#[test]
fn assignment() {
    let f = Poly::variable(0).mul(&Poly::variable(1)).add(&Poly::variable(2));
    assert_eq!(f.assign(&HashMap::from([(0, false)])), Poly::variable(2));
    let assigned = f.assign(&HashMap::from([(0, true)]));
    assert_eq!(assigned, Poly::variable(1).add(&Poly::variable(2)));
    assert_eq!(
        f.assign(&HashMap::from([(0, true), (1, true), (2, true)])).constant(),
        Some(false)
    );
}

/// Splitting a polynomial affine in designated variables into matrix row
/// and offset parts.
#[test]
fn affine_split() {
    // f = a*x0 + (b + 1)*x1 + a*b, designated variables x0 = 0 and x1 = 1.
    let a = Poly::variable(10);
    let b = Poly::variable(11);
    let f = a
        .mul(&Poly::variable(0))
        .add(&b.add(&Poly::one()).mul(&Poly::variable(1)))
        .add(&a.mul(&b));
    let (linear, rest) = f.split_affine(|v| v < 2).unwrap();
    assert_eq!(linear[&0], a);
    assert_eq!(linear[&1], b.add(&Poly::one()));
    assert_eq!(rest, a.mul(&b));

    // x0*x1 is quadratic in the designated variables.
    let quadratic = Poly::variable(0).mul(&Poly::variable(1));
    assert!(quadratic.split_affine(|v| v < 2).is_err());
}

/// Expressions parse and render back to the same polynomial.
#[test]
fn parse_and_render() {
    let mut vars = VarSet::new();
    let f = parse_poly("a*b + c + 1", &mut vars).unwrap();
    assert_eq!(vars.len(), 3);
    let rendered = f.render(&vars);
    let mut vars2 = vars.clone();
    assert_eq!(parse_poly(&rendered, &mut vars2).unwrap(), f);

    assert_eq!(parse_poly("0", &mut vars).unwrap(), Poly::zero());
    assert_eq!(parse_poly("1 + 1", &mut vars).unwrap(), Poly::zero());
    assert!(parse_poly("a +", &mut vars).is_err());
    assert!(parse_poly("a ^ b", &mut vars).is_err());
}

use {
    super::rng,
    crate::{
        equivalence::{
            anf::AnfSelfEquivalenceProvider, linear::LinearSelfEquivalenceProvider,
            CoefficientProvider, SelfEquivalenceProvider,
        },
        BitVector, Gf2, Poly, VarSet,
    },
    rand::Rng,
    std::{collections::HashMap, fmt::Write},
};

/// Render the linear construction as an expression table: the implicit
/// matrix entry `A'[i][j]` becomes the coefficient of `x{j}` in function
/// `i`, with zero constant terms and no constraints.
fn linear_table(word_size: usize) -> String {
    let provider = LinearSelfEquivalenceProvider::new(word_size);
    let coefficients: Vec<Poly> = (0..2 * word_size)
        .map(|i| Poly::variable(i as u32))
        .collect();
    let a_prime = provider.implicit::<Poly>(&coefficients);

    let mut vars = VarSet::new();
    for i in 0..2 * word_size {
        vars.intern(&format!("c{i}"));
    }
    let mut table = String::new();
    for i in 0..4 * word_size {
        for j in 0..4 * word_size {
            writeln!(table, "b{i}_{j} = {}", a_prime.get(i, j).render(&vars)).unwrap();
        }
        writeln!(table, "b{i} = 0").unwrap();
    }
    table
}

/// The table-driven provider reproduces the closed-form linear provider
/// exactly when loaded with the linear construction's table.
#[test]
fn matches_linear_provider() {
    let w = 16;
    let table = linear_table(w);
    let anf = AnfSelfEquivalenceProvider::new(w, &table, 1).unwrap();
    let linear = LinearSelfEquivalenceProvider::new(w);
    assert_eq!(anf.coefficients_size(), linear.coefficients_size());

    let mut rng = rng(30);
    for _ in 0..5 {
        let values: HashMap<String, bool> = (0..2 * w)
            .map(|i| (format!("c{i}"), rng.gen::<bool>()))
            .collect();
        let anf_coefficients: Vec<Gf2> = anf
            .coefficient_names()
            .iter()
            .map(|name| Gf2(values[*name]))
            .collect();
        let linear_coefficients: Vec<Gf2> =
            (0..2 * w).map(|i| Gf2(values[&format!("c{i}")])).collect();

        let a = anf.self_equivalence(&anf_coefficients).unwrap();
        let b = linear.self_equivalence(&linear_coefficients).unwrap();
        assert_eq!(a.a.matrix, b.a.matrix);
        assert_eq!(a.b.matrix, b.b.matrix);
        assert!(a.a.vector.is_zero());
        assert!(a.b.vector.is_zero());
    }
}

/// Random self-equivalences from the table satisfy the defining invariant.
#[test]
fn invariant() {
    let w = 16;
    let table = linear_table(w);
    let anf = AnfSelfEquivalenceProvider::new(w, &table, 1).unwrap();
    let mut rng = rng(31);
    let mask = (1u64 << w) - 1;
    for _ in 0..5 {
        let se = anf.random_self_equivalence(&mut rng);
        for _ in 0..50 {
            let v = BitVector::random(2 * w, &mut rng);
            let s = |v: &BitVector| {
                let x = v.word(0, w);
                let y = v.word(w, w);
                let mut out = BitVector::zero(2 * w);
                let sum = x.wrapping_add(y) & mask;
                for i in 0..w {
                    out.set(i, (sum >> i) & 1 == 1);
                    out.set(w + i, (y >> i) & 1 == 1);
                }
                out
            };
            assert_eq!(s(&se.a.apply(&v)), se.b.apply(&s(&v)));
        }
    }
}

/// Constraint expressions restrict random sampling.
#[test]
fn constraints_are_enforced() {
    let w = 16;
    let mut table = linear_table(w);
    // Force the first coefficient to zero: the constraint c0 must vanish.
    table.push_str("[constraints]\nc0\n");
    let anf = AnfSelfEquivalenceProvider::new(w, &table, 1).unwrap();

    let mut coefficients = vec![Gf2(false); anf.coefficients_size()];
    assert!(anf.self_equivalence(&coefficients).is_ok());
    let position = anf
        .coefficient_names()
        .iter()
        .position(|name| *name == "c0")
        .unwrap();
    coefficients[position] = Gf2(true);
    assert!(anf.self_equivalence(&coefficients).is_err());
}

/// Tables with missing slots or bad syntax are rejected.
#[test]
fn malformed_tables() {
    assert!(AnfSelfEquivalenceProvider::new(16, "b0_0 = c0\n", 1).is_err());
    assert!(AnfSelfEquivalenceProvider::new(16, "nonsense line\n", 1).is_err());
}

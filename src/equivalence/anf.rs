//! Self-equivalences from a precomputed algebraic-normal-form table.
//!
//! This provider is driven entirely by data: an ordered list of
//! `(name, expression)` pairs assigning a polynomial over the free
//! coefficient variables to each slot of a degree-bounded ANF template, and
//! a list of polynomial constraints the coefficients must satisfy. The
//! template describes a vector of `4w` boolean functions in the variables
//! `x0..x{4w-1}`; slot `b{i}_{j}` is the coefficient of `x{j}` in function
//! `i`, slot `b{i}_{j}_{k}` the coefficient of `x{j}*x{k}`, and slot `b{i}`
//! the constant term.
//!
//! The loaded vector is conjugated by a fixed pattern matrix and split into
//! the `(A, a)` and `(B⁻¹, b')` halves by extracting the affine structure of
//! each entry. Substituting concrete coefficients then yields ordinary
//! self-equivalences, exactly like the closed-form constructions (which
//! produce the same families).

use {
    super::{
        block_pattern, random_by_coefficients, CoefficientProvider, SelfEquivalence,
        SelfEquivalenceProvider, SymbolicProvider, SymbolicSelfEquivalence,
    },
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::AffineMap,
        error::Error,
        poly::{parse::parse_poly, Gf2, Poly, RingMat, VarSet},
    },
    rand::RngCore,
    std::collections::HashMap,
};

pub struct AnfSelfEquivalenceProvider {
    word_size: usize,
    vars: VarSet,
    /// Indices of the free coefficient variables, in order of first
    /// appearance in the expression table.
    coefficient_vars: Vec<u32>,
    constraints: Vec<Poly>,
    a: RingMat<Poly>,
    a_offset: Vec<Poly>,
    b_inverse: RingMat<Poly>,
    b_offset: Vec<Poly>,
}

impl AnfSelfEquivalenceProvider {
    /// Load a provider from the text form of an expression table. Lines hold
    /// `name = expression` pairs; a `[constraints]` line starts the list of
    /// constraint expressions; `#` starts a comment.
    pub fn new(word_size: usize, table: &str, degree: usize) -> Result<Self, Error> {
        assert!(matches!(word_size, 16 | 24 | 32 | 48 | 64));
        assert!(degree == 1 || degree == 2);

        let mut vars = VarSet::new();
        for i in 0..4 * word_size {
            vars.intern(&format!("x{i}"));
        }
        let x_count = vars.len() as u32;

        let (expressions, constraints) = parse_table(table, &mut vars)?;
        let coefficient_vars: Vec<u32> = (x_count..vars.len() as u32).collect();

        // Fill the ANF template from the loaded expressions.
        let slot = |name: &str| -> Result<Poly, Error> {
            expressions.get(name).cloned().ok_or_else(|| {
                Error::InvalidCoefficients(format!("missing expression for slot {name}"))
            })
        };
        let mut template = Vec::with_capacity(4 * word_size);
        for i in 0..4 * word_size {
            let mut f = Poly::zero();
            if degree == 2 {
                for j in 0..4 * word_size {
                    for k in j + 1..4 * word_size {
                        let x = Poly::variable(j as u32).mul(&Poly::variable(k as u32));
                        f = f.add(&slot(&format!("b{i}_{j}_{k}"))?.mul(&x));
                    }
                }
            }
            for j in 0..4 * word_size {
                let x = Poly::variable(j as u32);
                f = f.add(&slot(&format!("b{i}_{j}"))?.mul(&x));
            }
            f = f.add(&slot(&format!("b{i}"))?);
            template.push(f);
        }

        // Conjugate the template by the pattern matrix.
        let am = block_pattern(
            word_size,
            [
                [false, true, true, false],
                [true, true, true, false],
                [false, false, true, false],
                [true, false, true, true],
            ],
        );
        let am_inverse = am.inverse()?;
        let mut inverse_map = HashMap::new();
        for j in 0..4 * word_size {
            let mut row = Poly::zero();
            for k in 0..4 * word_size {
                if am_inverse.get(j, k) {
                    row = row.add(&Poly::variable(k as u32));
                }
            }
            inverse_map.insert(j as u32, row);
        }
        let substituted: Vec<Poly> = template
            .iter()
            .map(|f| f.substitute(&inverse_map))
            .collect();
        let conjugated = RingMat::<Poly>::from_bits(&am).mul_vec(&substituted);

        // The first half may only depend on the lower input variables, so
        // the upper ones are substituted away; the second half is reindexed
        // onto the lower variables so that both halves extract against the
        // same designated set.
        let half = 2 * word_size;
        let mut upper_zero = HashMap::new();
        let mut reindex = HashMap::new();
        for i in 0..half {
            reindex.insert(i as u32, Poly::zero());
        }
        for i in half..2 * half {
            upper_zero.insert(i as u32, Poly::zero());
            reindex.insert(i as u32, Poly::variable((i - half) as u32));
        }

        let is_input = |var: u32| (var as usize) < half;
        let x_count = x_count as usize;
        let mut a = RingMat::<Poly>::zero(half, half);
        let mut a_offset = Vec::with_capacity(half);
        let mut b_inverse = RingMat::<Poly>::zero(half, half);
        let mut b_offset = Vec::with_capacity(half);
        for i in 0..half {
            let (linear, rest) = conjugated[i].substitute(&upper_zero).split_affine(is_input)?;
            for (var, coefficient) in linear {
                a.set(i, var as usize, coefficient);
            }
            a_offset.push(strip_inputs(&rest, x_count)?);

            let (linear, rest) = conjugated[half + i].substitute(&reindex).split_affine(is_input)?;
            for (var, coefficient) in linear {
                b_inverse.set(i, var as usize, coefficient);
            }
            b_offset.push(strip_inputs(&rest, x_count)?);
        }

        Ok(Self {
            word_size,
            vars,
            coefficient_vars,
            constraints,
            a,
            a_offset,
            b_inverse,
            b_offset,
        })
    }

    /// The names of the free coefficient variables, in consumption order.
    pub fn coefficient_names(&self) -> Vec<&str> {
        self.coefficient_vars
            .iter()
            .map(|v| self.vars.name(*v))
            .collect()
    }

    fn assignment(&self, coefficients: &[Gf2]) -> HashMap<u32, bool> {
        self.coefficient_vars
            .iter()
            .zip(coefficients)
            .map(|(var, value)| (*var, value.0))
            .collect()
    }
}

impl SelfEquivalenceProvider for AnfSelfEquivalenceProvider {
    fn word_size(&self) -> usize {
        self.word_size
    }

    fn random_self_equivalence(&self, rng: &mut dyn RngCore) -> SelfEquivalence {
        random_by_coefficients(self, rng)
    }
}

impl CoefficientProvider for AnfSelfEquivalenceProvider {
    fn coefficients_size(&self) -> usize {
        self.coefficient_vars.len()
    }

    fn check_constraints(&self, coefficients: &[Gf2]) -> bool {
        if coefficients.len() != self.coefficients_size() {
            return false;
        }
        let map = self.assignment(coefficients);
        self.constraints
            .iter()
            .all(|constraint| constraint.assign(&map).is_zero())
    }

    fn self_equivalence(&self, coefficients: &[Gf2]) -> Result<SelfEquivalence, Error> {
        if !self.check_constraints(coefficients) {
            return Err(Error::InvalidCoefficients(
                "coefficients violate the table constraints".into(),
            ));
        }
        let map = self.assignment(coefficients);
        let a_matrix = assigned_matrix(&self.a, &map)?;
        let a_vector = assigned_vector(&self.a_offset, &map)?;
        let b_inverse = assigned_matrix(&self.b_inverse, &map)?;
        let b_pre = assigned_vector(&self.b_offset, &map)?;
        let b_matrix = b_inverse.inverse()?;
        let b_vector = &b_matrix * &b_pre;
        Ok(SelfEquivalence {
            a: AffineMap::new(a_matrix, a_vector),
            b: AffineMap::new(b_matrix, b_vector),
        })
    }
}

impl SymbolicProvider for AnfSelfEquivalenceProvider {
    fn symbolic_self_equivalence(&self, coefficients: &[Poly]) -> SymbolicSelfEquivalence {
        assert_eq!(coefficients.len(), self.coefficients_size());
        let map: HashMap<u32, Poly> = self
            .coefficient_vars
            .iter()
            .zip(coefficients)
            .map(|(var, poly)| (*var, poly.clone()))
            .collect();
        let substitute_matrix = |m: &RingMat<Poly>| {
            let mut result = RingMat::<Poly>::zero(m.rows(), m.cols());
            for i in 0..m.rows() {
                for j in 0..m.cols() {
                    result.set(i, j, m.get(i, j).substitute(&map));
                }
            }
            result
        };
        let substitute_vector =
            |v: &[Poly]| v.iter().map(|f| f.substitute(&map)).collect::<Vec<_>>();
        SymbolicSelfEquivalence {
            a: substitute_matrix(&self.a),
            a_offset: substitute_vector(&self.a_offset),
            b_inverse: substitute_matrix(&self.b_inverse),
            b_offset: substitute_vector(&self.b_offset),
        }
    }
}

fn parse_table(
    table: &str,
    vars: &mut VarSet,
) -> Result<(HashMap<String, Poly>, Vec<Poly>), Error> {
    let mut expressions = HashMap::new();
    let mut constraints = Vec::new();
    let mut in_constraints = false;
    for line in table.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "[constraints]" {
            in_constraints = true;
            continue;
        }
        if in_constraints {
            constraints.push(parse_poly(line, vars)?);
        } else {
            let (name, expression) = line.split_once('=').ok_or_else(|| {
                Error::InvalidCoefficients(format!("malformed table line: {line}"))
            })?;
            expressions.insert(name.trim().to_string(), parse_poly(expression, vars)?);
        }
    }
    Ok((expressions, constraints))
}

/// Reject leftover input variables in an offset entry.
fn strip_inputs(rest: &Poly, x_count: usize) -> Result<Poly, Error> {
    if rest.vars().iter().any(|v| (*v as usize) < x_count) {
        return Err(Error::InvalidCoefficients(
            "offset entry depends on input variables".into(),
        ));
    }
    Ok(rest.clone())
}

fn assigned_matrix(m: &RingMat<Poly>, map: &HashMap<u32, bool>) -> Result<BitMatrix, Error> {
    let mut bits = BitMatrix::zero(m.rows(), m.cols());
    for i in 0..m.rows() {
        for j in 0..m.cols() {
            let value = m.get(i, j).assign(map).constant().ok_or_else(|| {
                Error::InvalidCoefficients("matrix entry is not fully determined".into())
            })?;
            bits.set(i, j, value);
        }
    }
    Ok(bits)
}

fn assigned_vector(v: &[Poly], map: &HashMap<u32, bool>) -> Result<BitVector, Error> {
    let mut bits = BitVector::zero(v.len());
    for (i, f) in v.iter().enumerate() {
        let value = f.assign(map).constant().ok_or_else(|| {
            Error::InvalidCoefficients("offset entry is not fully determined".into())
        })?;
        bits.set(i, value);
    }
    Ok(bits)
}

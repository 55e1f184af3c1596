//! Algebraic key recovery for affine self-equivalence encodings.
//!
//! Affine self-equivalences carry too many coefficients for closed-form
//! read-off, so the attack solves for them instead. With `A` the symbolic
//! left factor of an interior layer (in the output-coefficient variables)
//! and `B⁻¹` the symbolic inverse of the right factor (in the
//! input-coefficient variables), every interior matrix satisfies
//! `Mᵣ·B⁻¹ = A·m_mid`, a polynomial system over GF(2) in the coefficients
//! alone. Its Gröbner basis pins down almost every variable; adding the
//! layer's vector equation `vᵣ = A·(m_mid·(v + b)) + a`, with the round-key
//! bits as extra variables, determines the rest up to a single branch bit.
//! The Cartesian product over the per-round branches enumerates the key
//! candidates.
//!
//! Using `Mᵣ·B⁻¹ = A·m_mid` instead of `Mᵣ = A·m_mid·B` keeps every
//! polynomial in the system affine-by-quadratic and avoids inverting a
//! matrix of polynomials, which has no meaning over the coefficient ring.

use {
    super::Recovery,
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::{AffineMap, SymbolicProvider, SymbolicSelfEquivalence},
        error::Error,
        poly::{
            groebner::{groebner_basis, normal_form},
            Poly, RingMat,
        },
        speck::{self, Params, RoundMatrices},
        whitebox::AffineLayers,
    },
    log::debug,
    std::collections::HashMap,
};

/// Recover the master key and both external encodings from layers encoded
/// with self-equivalences drawn from `provider`'s family. Returns every
/// candidate consistent with the recovered polynomial systems; at least one
/// matches the builder's inputs.
pub fn attack<P: SymbolicProvider + ?Sized>(
    params: &Params,
    layers: &AffineLayers,
    provider: &P,
) -> Result<Vec<Recovery>, Error> {
    let w = params.word_size;
    let c = provider.coefficients_size();
    let rm = RoundMatrices::new(params);

    // Ring layout: round-key bits first, then the input-side coefficients,
    // then the output-side coefficients.
    let key_var = |i: usize| i as u32;
    let input_var = |i: usize| (w + i) as u32;
    let output_var = |i: usize| (w + c + i) as u32;
    let total_vars = w + 2 * c;

    let input_coefficients: Vec<Poly> = (0..c).map(|i| Poly::variable(input_var(i))).collect();
    let output_coefficients: Vec<Poly> = (0..c).map(|i| Poly::variable(output_var(i))).collect();
    let input_side = provider.symbolic_self_equivalence(&input_coefficients);
    let output_side = provider.symbolic_self_equivalence(&output_coefficients);

    let mut key_template = vec![Poly::zero(); 2 * w];
    for (i, entry) in key_template.iter_mut().enumerate().take(w) {
        *entry = Poly::variable(key_var(i));
    }

    // One polynomial system per round key, plus one for the second-to-last
    // round, whose output-side values expose the output encoding.
    let mut systems = Vec::with_capacity(params.key_words + 1);
    for r in 2..params.key_words + 2 {
        systems.push(r);
    }
    systems.push(params.rounds - 1);

    let mut guesses = Vec::with_capacity(systems.len());
    for r in systems {
        debug!("solving the polynomial system of layer {r}");
        guesses.push(recover_coefficients(
            layers,
            r,
            &rm.mid,
            &input_side,
            &output_side,
            &key_template,
            total_vars,
        )?);
    }

    // Every combination of branch guesses yields one key candidate. A wrong
    // guess can make a reconstruction step fail; such combinations are
    // dropped rather than reported.
    let mut candidates = Vec::new();
    let mut odometer = vec![0usize; guesses.len()];
    'combinations: loop {
        let combination: Vec<&HashMap<u32, bool>> = odometer
            .iter()
            .zip(&guesses)
            .map(|(chosen, options)| &options[*chosen])
            .collect();
        match candidate(
            params,
            layers,
            &rm,
            &input_side,
            &output_side,
            &combination,
            c,
            &key_var,
            &input_var,
            &output_var,
        ) {
            Ok(recovery) => candidates.push(recovery),
            Err(error) => debug!("dropping a candidate combination: {error}"),
        }

        for position in 0..odometer.len() {
            odometer[position] += 1;
            if odometer[position] < guesses[position].len() {
                continue 'combinations;
            }
            odometer[position] = 0;
        }
        break;
    }
    if candidates.is_empty() {
        return Err(Error::AttackFailed(
            "no candidate combination is consistent".into(),
        ));
    }
    Ok(candidates)
}

/// Solve the two-stage polynomial system of one interior layer, returning
/// the consistent full assignments (one per branch of the final guess).
fn recover_coefficients(
    layers: &AffineLayers,
    r: usize,
    m_mid: &BitMatrix,
    input_side: &SymbolicSelfEquivalence,
    output_side: &SymbolicSelfEquivalence,
    key_template: &[Poly],
    total_vars: usize,
) -> Result<Vec<HashMap<u32, bool>>, Error> {
    let half = key_template.len();

    // Stage one: the matrix equation M·B⁻¹ + A·m_mid = 0.
    let left = RingMat::<Poly>::from_bits(&layers.matrices[r]).mul(&input_side.b_inverse);
    let right = output_side.a.mul(&RingMat::<Poly>::from_bits(m_mid));
    let mut generators = Vec::with_capacity(half * half);
    for i in 0..half {
        for j in 0..half {
            let equation = left.get(i, j).add(right.get(i, j));
            if !equation.is_zero() {
                generators.push(equation);
            }
        }
    }
    let basis = groebner_basis(generators);
    classify(&basis)?;

    // The basis determines the two matrices fully; only the offsets may
    // keep free variables into the second stage.
    let a_matrix = reduced_matrix(&output_side.a, &basis)?;
    let b_inverse = reduced_matrix(&input_side.b_inverse, &basis)?;
    let a_offset = reduced_vector(&output_side.a_offset, &basis);
    let b_offset = reduced_vector(&input_side.b_offset, &basis);
    let b_matrix = b_inverse.inverse()?;
    let b_offset = matrix_times_polys(&b_matrix, &b_offset);

    // Stage two: the vector equation v' + A·(m_mid·(v + b)) + a = 0, with
    // the round-key bits inside v.
    let sum: Vec<Poly> = key_template
        .iter()
        .zip(&b_offset)
        .map(|(v, b)| v.add(b))
        .collect();
    let mut rhs = matrix_times_polys(m_mid, &sum);
    rhs = matrix_times_polys(&a_matrix, &rhs);
    let mut generators: Vec<Poly> = basis.clone();
    for i in 0..half {
        let mut equation = rhs[i].add(&a_offset[i]);
        if layers.vectors[r].get(i) {
            equation = equation.add(&Poly::one());
        }
        generators.push(equation);
    }
    let basis = groebner_basis(generators);
    let (assignments, extra) = classify(&basis)?;

    if extra.is_empty() {
        if assignments.len() != total_vars {
            return Err(Error::AttackFailed(format!(
                "layer {r} leaves {} coefficients undetermined",
                total_vars - assignments.len()
            )));
        }
        return Ok(vec![assignments]);
    }

    // The expected remaining structure is a single relation between two
    // variables: guessing one determines the other. Anything else means the
    // system is degenerate.
    if extra.len() != 1 || assignments.len() != total_vars - 2 {
        return Err(Error::AttackFailed(format!(
            "layer {r} produced an unexpected basis shape"
        )));
    }
    let relation = &extra[0];
    let vars: Vec<u32> = relation.vars().into_iter().collect();
    let [u, v] = vars.as_slice() else {
        return Err(Error::AttackFailed(format!(
            "layer {r} produced a relation in {} variables",
            vars.len()
        )));
    };

    let mut branches = Vec::new();
    for guess in [false, true] {
        let mut map = HashMap::from([(*u, guess)]);
        let rest = relation.assign(&map);
        match rest.constant() {
            Some(true) => continue,
            Some(false) => {
                return Err(Error::AttackFailed(format!(
                    "layer {r} leaves a coefficient unconstrained"
                )))
            }
            None => {
                let value = rest
                    .assign(&HashMap::from([(*v, false)]))
                    .constant()
                    .ok_or_else(|| {
                        Error::AttackFailed(format!("layer {r} produced a nonlinear relation"))
                    })?;
                map.insert(*v, value);
            }
        }
        let mut assignments = assignments.clone();
        assignments.extend(map);
        branches.push(assignments);
    }
    if branches.is_empty() {
        return Err(Error::AttackFailed(format!(
            "layer {r} has no consistent branch"
        )));
    }
    Ok(branches)
}

/// Build one key candidate from a combination of per-layer assignments.
#[allow(clippy::too_many_arguments)]
fn candidate(
    params: &Params,
    layers: &AffineLayers,
    rm: &RoundMatrices,
    input_side: &SymbolicSelfEquivalence,
    output_side: &SymbolicSelfEquivalence,
    combination: &[&HashMap<u32, bool>],
    coefficient_count: usize,
    key_var: &impl Fn(usize) -> u32,
    input_var: &impl Fn(usize) -> u32,
    output_var: &impl Fn(usize) -> u32,
) -> Result<Recovery, Error> {
    let w = params.word_size;

    // The systems recovered round keys 1 through key_words, so the key
    // schedule is inverted with one skipped round.
    let mut round_keys = Vec::with_capacity(params.key_words);
    for assignments in combination.iter().take(params.key_words) {
        let mut key = 0u64;
        for j in 0..w {
            if assignments[&key_var(j)] {
                key |= 1 << j;
            }
        }
        round_keys.push(key);
    }
    let key = speck::inverse_key_schedule(params, &round_keys, 1)?;
    let expanded = speck::key_expansion(params, &key)?;

    // The first system's input-side values are the self-equivalence applied
    // on top of the first key layer, which exposes the input encoding.
    let first = combination[0];
    let mut map = HashMap::new();
    for i in 0..coefficient_count {
        map.insert(output_var(i), first[&input_var(i)]);
    }
    let o_matrix = output_side.a.assign(&map).constant()?;
    let o_vector = assigned_offset(&output_side.a_offset, &map)?;
    let stripped = (&o_matrix * &rm.mid).inverse()?;
    let input_matrix = &stripped * &layers.matrices[1];
    let input_vector = &(&stripped * &(&layers.vectors[1] + &o_vector))
        + &speck::xor_round_key_vector(params, expanded[0]);

    // The last system's output-side values are the self-equivalence inside
    // the last layer, which exposes the output encoding.
    let last = combination[combination.len() - 1];
    let mut map = HashMap::new();
    for i in 0..coefficient_count {
        map.insert(input_var(i), last[&output_var(i)]);
    }
    let i_matrix = input_side.b_inverse.assign(&map).constant()?.inverse()?;
    let i_vector = &i_matrix * &assigned_offset(&input_side.b_offset, &map)?;
    let output_matrix = &layers.matrices[params.rounds] * &(&rm.last * &i_matrix).inverse()?;
    let masked = &speck::xor_round_key_vector(params, expanded[params.rounds - 1]) + &i_vector;
    let output_vector =
        &(&output_matrix * &(&rm.last * &masked)) + &layers.vectors[params.rounds];

    Ok(Recovery {
        key,
        input_encoding: AffineMap::new(input_matrix, input_vector),
        output_encoding: AffineMap::new(output_matrix, output_vector),
    })
}

/// Split a reduced basis into single-variable assignments and the leftover
/// relations. A constant element means the system is inconsistent.
fn classify(basis: &[Poly]) -> Result<(HashMap<u32, bool>, Vec<Poly>), Error> {
    let mut assignments = HashMap::new();
    let mut extra = Vec::new();
    for element in basis {
        match element.constant() {
            Some(true) => {
                return Err(Error::AttackFailed("inconsistent polynomial system".into()))
            }
            Some(false) => continue,
            None => {}
        }
        let vars: Vec<u32> = element.vars().into_iter().collect();
        if let [var] = vars.as_slice() {
            // In a reduced basis a univariate element is x or x + 1.
            let value = element
                .assign(&HashMap::from([(*var, false)]))
                .constant()
                .expect("single-variable element");
            assignments.insert(*var, value);
        } else {
            extra.push(element.clone());
        }
    }
    Ok((assignments, extra))
}

fn reduced_matrix(m: &RingMat<Poly>, basis: &[Poly]) -> Result<BitMatrix, Error> {
    let mut bits = BitMatrix::zero(m.rows(), m.cols());
    for i in 0..m.rows() {
        for j in 0..m.cols() {
            let value = normal_form(m.get(i, j), basis).constant().ok_or_else(|| {
                Error::AttackFailed("matrix entry is not determined by the basis".into())
            })?;
            bits.set(i, j, value);
        }
    }
    Ok(bits)
}

fn reduced_vector(v: &[Poly], basis: &[Poly]) -> Vec<Poly> {
    v.iter().map(|f| normal_form(f, basis)).collect()
}

/// Multiply a constant GF(2) matrix with a vector of polynomials.
fn matrix_times_polys(m: &BitMatrix, v: &[Poly]) -> Vec<Poly> {
    let mut result = vec![Poly::zero(); m.rows()];
    for (i, entry) in result.iter_mut().enumerate() {
        for (j, f) in v.iter().enumerate() {
            if m.get(i, j) {
                *entry = entry.add(f);
            }
        }
    }
    result
}

fn assigned_offset(v: &[Poly], map: &HashMap<u32, bool>) -> Result<BitVector, Error> {
    let mut bits = BitVector::zero(v.len());
    for (i, f) in v.iter().enumerate() {
        let value = f.assign(map).constant().ok_or_else(|| {
            Error::AttackFailed("offset entry is not determined by the basis".into())
        })?;
        bits.set(i, value);
    }
    Ok(bits)
}


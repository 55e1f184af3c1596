//! Closed-form key recovery for linear self-equivalence encodings.
//!
//! A linear self-equivalence has only `2w` degrees of freedom, and after
//! conjugation those coefficients survive in predictable positions of the
//! encoded matrices: the rows `w-1-alpha` and `w-1+beta` of an interior
//! matrix are the bottom rows of the construction's blocks, shuffled by the
//! round rotations. Reading the coefficients back off lets us rebuild each
//! self-equivalence exactly, strip it from the layer, and expose the round
//! key in the layer's vector.

use {
    super::Recovery,
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::{linear::LinearSelfEquivalenceProvider, AffineMap, CoefficientProvider},
        error::Error,
        poly::Gf2,
        speck::{self, Params, RoundMatrices},
        whitebox::AffineLayers,
    },
    log::debug,
};

/// Recover the master key and both linear external encodings from the
/// encoded matrices and vectors.
pub fn attack(params: &Params, layers: &AffineLayers) -> Result<Recovery, Error> {
    let rm = RoundMatrices::new(params);
    let provider = LinearSelfEquivalenceProvider::new(params.word_size);
    let zero = BitVector::zero(params.block_size);

    // Recovering the round keys.
    debug!("recovering round keys");
    let mut round_keys = Vec::with_capacity(params.key_words);
    for r in 0..params.key_words {
        let c = recover_input_coefficients(params, &layers.matrices[r + 2]);
        let se = provider.self_equivalence(&c)?;
        let v = &(&se.a.matrix * &rm.mid).inverse()? * &layers.vectors[r + 1];
        round_keys.push(v.word(0, params.word_size));
    }
    let key = speck::inverse_key_schedule(params, &round_keys, 0)?;

    // Recovering the input external encoding.
    debug!("recovering input external encoding");
    let c = recover_input_coefficients(params, &layers.matrices[2]);
    let se = provider.self_equivalence(&c)?;
    let input_matrix = &(&se.a.matrix * &rm.mid).inverse()? * &layers.matrices[1];
    let input_encoding = AffineMap::new(input_matrix, zero.clone());

    // Recovering the output external encoding. The second-to-last matrix
    // yields its own self-equivalence, which exposes the output encoding of
    // that round; the mirrored read-off on that encoding then yields the
    // self-equivalence of the last round.
    debug!("recovering output external encoding");
    let c = recover_input_coefficients(params, &layers.matrices[params.rounds - 1]);
    let se = provider.self_equivalence(&c)?;
    let output = &layers.matrices[params.rounds - 1] * &(&rm.mid * &se.b.matrix).inverse()?;
    let c = recover_output_coefficients(params, &output);
    let se = provider.self_equivalence(&c)?;
    let output_matrix = &layers.matrices[params.rounds] * &(&rm.last * &se.b.matrix).inverse()?;
    let output_encoding = AffineMap::new(output_matrix, zero);

    Ok(Recovery {
        key,
        input_encoding,
        output_encoding,
    })
}

/// Read the self-equivalence coefficients off an interior encoded matrix.
fn recover_input_coefficients(params: &Params, m: &BitMatrix) -> Vec<Gf2> {
    let w = params.word_size;
    let upper = w - 1 - params.alpha;
    let lower = w - 1 + params.beta;
    let mut c = vec![Gf2(false); 2 * w];
    for i in 1..w - 1 {
        c[2 * w - 1 - i] = Gf2(m.get(upper, w + i));
        c[w - i] = Gf2(m.get(lower, w + i)) + c[2 * w - 1 - i];
    }
    c[1] = Gf2(m.get(upper, w));
    c[w] = Gf2(m.get(lower, w)) + c[1];
    c[2 * w - 1] = Gf2(m.get(upper, 0)) + c[1];
    c[0] = Gf2(m.get(lower, 0)) + c[w] + c[2 * w - 1];
    c
}

/// Read the coefficients of the last round's self-equivalence off the
/// recovered output encoding of the second-to-last round.
fn recover_output_coefficients(params: &Params, o: &BitMatrix) -> Vec<Gf2> {
    let w = params.word_size;
    let mut c = vec![Gf2(false); 2 * w];
    for i in 1..w - 1 {
        c[w - i] = Gf2(o.get(w - 1, w + i));
        c[2 * w - 1 - i] = Gf2(o.get(2 * w - 1, w + i)) + c[w - i];
    }
    c[w] = Gf2(o.get(w - 1, 0)) + Gf2(o.get(w - 1, w));
    c[1] = Gf2(o.get(2 * w - 1, 0)) + Gf2(o.get(2 * w - 1, w)) + c[w];
    c[0] = Gf2(o.get(w - 1, w)) + c[1];
    c[2 * w - 1] = Gf2(o.get(2 * w - 1, w)) + Gf2(o.get(w - 1, w));
    c
}

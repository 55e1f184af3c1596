//! External encodings.
//!
//! An external encoding is a secret affine bijection applied to the white
//! box's input or output, so the generated program computes `G ∘ E ∘ F⁻¹`
//! for secret `F` and `G` rather than the bare encryption function. Anyone
//! holding the inverse encodings can use the program; anyone else sees
//! uniformly re-randomized inputs and outputs.

use {
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::AffineMap,
        error::Error,
        speck::{self, Params},
    },
    rand::RngCore,
};

/// Generate a random affine external encoding: an invertible matrix with a
/// random offset. Sampling a uniform GF(2) matrix is invertible with
/// probability about 0.29, so rejection terminates quickly.
#[must_use]
pub fn random_affine_external_encoding(word_size: usize, rng: &mut dyn RngCore) -> AffineMap {
    loop {
        let matrix = BitMatrix::random(2 * word_size, 2 * word_size, rng);
        if matrix.is_invertible() {
            let vector = BitVector::random(2 * word_size, rng);
            return AffineMap::new(matrix, vector);
        }
    }
}

/// Generate a random linear external encoding: an invertible matrix with a
/// zero offset.
#[must_use]
pub fn random_linear_external_encoding(word_size: usize, rng: &mut dyn RngCore) -> AffineMap {
    loop {
        let matrix = BitMatrix::random(2 * word_size, 2 * word_size, rng);
        if matrix.is_invertible() {
            return AffineMap::new(matrix, BitVector::zero(2 * word_size));
        }
    }
}

/// Map a plaintext block into the input space of an encoded white box.
///
/// The first encoded layer absorbs the input encoding after the first
/// modular addition, so the encoded input `q` must satisfy
/// `F(S(m_first·q)) = S(m_first·p)`. Solving for `q` conjugates the inverse
/// encoding by `S` and `m_first`, which is also the program emitted as
/// `inverse_input_external_encoding.c`.
pub fn encode_input(
    params: &Params,
    m_first: &BitMatrix,
    encoding: &AffineMap,
    block: (u64, u64),
) -> Result<BitVector, Error> {
    let p = speck::to_bits(params, block.0, block.1);
    let added = speck::modular_addition(params, &(m_first * &p));
    let decoded = &encoding.matrix.inverse()? * &(&added + &encoding.vector);
    Ok(&m_first.inverse()? * &speck::modular_subtraction(params, &decoded))
}

/// Map an encoded white-box output back to the ciphertext block, inverting
/// the output encoding.
pub fn decode_output(
    params: &Params,
    encoding: &AffineMap,
    output: &BitVector,
) -> Result<(u64, u64), Error> {
    let decoded = &encoding.matrix.inverse()? * &(output + &encoding.vector);
    Ok(speck::from_bits(params, &decoded))
}

//! White-box implementations of the Speck block cipher, protected by
//! self-equivalence encodings, and the attacks that break them.
//!
//! Given a master key, [`WhiteBoxSpeck`] produces a sequence of encoded
//! affine layers computing Speck encryption without the key appearing
//! anywhere in the output: every round key is folded into the layers by a
//! random self-equivalence of the modular-addition step, and optional
//! external encodings randomize the input and output. The [`codegen`]
//! module turns the layers into self-contained C programs.
//!
//! None of this yields real security. The [`attack`] module recovers the
//! master key and both external encodings from the public layers alone, in
//! closed form for linear encodings and with small Gröbner basis
//! computations for affine ones.

#[cfg(test)]
mod test;

mod bits;
mod encoding;
mod error;
mod poly;
mod speck;
mod whitebox;

pub mod attack;
pub mod codegen;
pub mod equivalence;

pub use {
    bits::{BitMatrix, BitVector},
    encoding::{
        decode_output, encode_input, random_affine_external_encoding,
        random_linear_external_encoding,
    },
    error::Error,
    poly::{Gf2, Monomial, Poly, Ring, RingMat, VarSet},
    speck::{
        encrypt, from_bits, inverse_key_schedule, key_expansion, modular_addition,
        modular_subtraction, to_bits, xor_round_key_vector, Params, RoundMatrices,
    },
    whitebox::{evaluate, AffineLayers, WhiteBoxSpeck},
};

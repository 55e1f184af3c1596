//! Assembly of the encoded affine layers of a white-box Speck instance.
//!
//! Every round of Speck is an affine map followed by the modular addition
//! `S`. The builder multiplies each round's affine map by one half of a
//! fresh self-equivalence of `S` and the previous round's map by the other
//! half: the pair cancels through `S`, so the composition still computes
//! Speck, but the published matrices and vectors have the round keys and
//! the linear structure folded into random-looking encodings. The input and
//! output external encodings wrap the two ends in the same way.
//!
//! The self-equivalences are dropped as soon as they have been applied;
//! only the encoded `(matrix, vector)` sequence and the external encodings
//! chosen by the caller ever leave this module.

use {
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::{AffineMap, SelfEquivalenceProvider},
        error::Error,
        speck::{self, Params, RoundMatrices},
    },
    log::debug,
    rand::RngCore,
};

/// The public output of the builder: `rounds + 1` matrices and vectors. The
/// encoded program computes `x ↦ S(Mᵢ·x + vᵢ)` for each round layer and
/// finishes with the plain affine last layer.
pub struct AffineLayers {
    pub matrices: Vec<BitMatrix>,
    pub vectors: Vec<BitVector>,
}

impl AffineLayers {
    pub fn rounds(&self) -> usize {
        self.matrices.len() - 1
    }
}

/// Generates the encoded affine layers protecting a fixed master key.
pub struct WhiteBoxSpeck {
    params: Params,
    round_keys: Vec<u64>,
}

impl WhiteBoxSpeck {
    /// Validate the parameters and expand the master key.
    pub fn new(params: Params, key: &[u64]) -> Result<Self, Error> {
        let round_keys = speck::key_expansion(&params, key)?;
        Ok(Self { params, round_keys })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Construct the encoded matrices and vectors corresponding to the
    /// affine layers of Speck, wrapped in the given external encodings and
    /// randomized by self-equivalences drawn from the provider.
    pub fn affine_layers(
        &self,
        input_encoding: &AffineMap,
        output_encoding: &AffineMap,
        provider: &dyn SelfEquivalenceProvider,
        rng: &mut dyn RngCore,
    ) -> AffineLayers {
        let params = &self.params;
        let rm = RoundMatrices::new(params);
        let zero = BitVector::zero(params.block_size);

        let mut matrices = Vec::with_capacity(params.rounds + 1);
        let mut vectors = Vec::with_capacity(params.rounds + 1);

        matrices.push(rm.first.clone());
        vectors.push(zero);

        // The first layer carries no key material, so no self-equivalence is
        // needed between it and the second.
        matrices.push(&rm.mid * &input_encoding.matrix);
        vectors.push(
            &rm.mid
                * &(&speck::xor_round_key_vector(params, self.round_keys[0])
                    + &input_encoding.vector),
        );

        for r in 2..=params.rounds {
            debug!("encoding round {r}");
            let se = provider.random_self_equivalence(rng);
            matrices[r - 1] = &se.a.matrix * &matrices[r - 1];
            vectors[r - 1] = &(&se.a.matrix * &vectors[r - 1]) + &se.a.vector;
            let m = if r < params.rounds { &rm.mid } else { &rm.last };
            matrices.push(m * &se.b.matrix);
            vectors.push(
                m * &(&speck::xor_round_key_vector(params, self.round_keys[r - 1])
                    + &se.b.vector),
            );
        }

        matrices[params.rounds] = &output_encoding.matrix * &matrices[params.rounds];
        vectors[params.rounds] =
            &(&output_encoding.matrix * &vectors[params.rounds]) + &output_encoding.vector;

        AffineLayers { matrices, vectors }
    }
}

/// Run the encoded program: apply each round layer followed by the modular
/// addition, then the final affine layer.
#[must_use]
pub fn evaluate(params: &Params, layers: &AffineLayers, input: &BitVector) -> BitVector {
    let mut x = input.clone();
    for r in 0..params.rounds {
        x = speck::modular_addition(
            params,
            &(&(&layers.matrices[r] * &x) + &layers.vectors[r]),
        );
    }
    &(&layers.matrices[params.rounds] * &x) + &layers.vectors[params.rounds]
}

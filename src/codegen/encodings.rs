//! Generators for the inverse external encoding programs.
//!
//! A white box built with external encodings computes `G ∘ E ∘ F⁻¹`, so its
//! users need two small companion programs: one mapping a plaintext into the
//! encoded input space (the input encoding inverse, conjugated through the
//! first layer and the modular addition) and one mapping the encoded output
//! back to the ciphertext. Both reuse the bit-packed layout.

use {
    super::{bit_packed, CodeGenerator},
    crate::{
        bits::{BitMatrix, BitVector},
        equivalence::AffineMap,
        error::Error,
    },
};

pub struct InputEncodingCodeGenerator;

const MODULAR_SUBTRACTION: &str = "\
void modular_subtraction(WORD_TYPE xy[2]) {
    xy[0] -= xy[1];
    xy[0] &= WORD_MASK;
}
";

const INPUT_MAIN: &str = "\
int main(int argc, char *argv[]) {
    WORD_TYPE xy[2];
    WORD_TYPE res[2];
    if (argc < 3) {
        return -1;
    } else {
        sscanf(argv[1], \"%\" WORD_IN_TYPE, &xy[0]);
        sscanf(argv[2], \"%\" WORD_IN_TYPE, &xy[1]);
        res[0] = 0;
        res[1] = 0;
        matrix_vector_product(MATRICES[0], xy, res);
        vector_addition(VECTORS[0], res);
        modular_addition(res);
        vector_addition(VECTORS[1], res);
        xy[0] = 0;
        xy[1] = 0;
        matrix_vector_product(MATRICES[1], res, xy);
        modular_subtraction(xy);
        vector_addition(VECTORS[2], xy);
        res[0] = 0;
        res[1] = 0;
        matrix_vector_product(MATRICES[2], xy, res);
        printf(\"%\" WORD_OUT_TYPE \" %\" WORD_OUT_TYPE \"\\n\", res[0], res[1]);
    }
}
";

impl InputEncodingCodeGenerator {
    /// Emit the program inverting the input external encoding: it conjugates
    /// `F⁻¹` by the first layer matrix and the modular addition.
    pub fn generate_inverse_program(
        &self,
        first_matrix: &BitMatrix,
        first_vector: &BitVector,
        encoding: &AffineMap,
    ) -> Result<String, Error> {
        let matrices = [
            first_matrix.clone(),
            encoding.matrix.inverse()?,
            first_matrix.inverse()?,
        ];
        let vectors = [
            first_vector.clone(),
            encoding.vector.clone(),
            first_vector.clone(),
        ];
        Ok(self.generate_code(&matrices, &vectors))
    }
}

impl CodeGenerator for InputEncodingCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        bit_packed::packed_matrices(matrices)
    }

    fn vectors(&self, vectors: &[BitVector]) -> String {
        bit_packed::packed_vectors(vectors)
    }

    fn includes(&self) -> String {
        [
            super::INCLUDE_INTTYPES,
            super::INCLUDE_STDDEF,
            super::INCLUDE_STDIO,
        ]
        .concat()
    }

    fn defines(&self, block_size: usize, word_size: usize, rounds: usize) -> String {
        bit_packed::packed_defines(block_size, word_size, rounds)
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
            bit_packed::MATRIX_VECTOR_PRODUCT,
            "\n",
            bit_packed::VECTOR_ADDITION,
            "\n",
            bit_packed::MODULAR_ADDITION,
            "\n",
            MODULAR_SUBTRACTION,
        ]
        .concat()
    }

    fn main_function(&self) -> String {
        INPUT_MAIN.into()
    }
}

pub struct OutputEncodingCodeGenerator;

const OUTPUT_MAIN: &str = "\
int main(int argc, char *argv[]) {
    WORD_TYPE xy[2];
    WORD_TYPE res[2];
    if (argc < 3) {
        return -1;
    } else {
        sscanf(argv[1], \"%\" WORD_IN_TYPE, &xy[0]);
        sscanf(argv[2], \"%\" WORD_IN_TYPE, &xy[1]);
        vector_addition(VECTORS[0], xy);
        res[0] = 0;
        res[1] = 0;
        matrix_vector_product(MATRICES[0], xy, res);
        printf(\"%\" WORD_OUT_TYPE \" %\" WORD_OUT_TYPE \"\\n\", res[0], res[1]);
    }
}
";

impl OutputEncodingCodeGenerator {
    /// Emit the program inverting the output external encoding.
    pub fn generate_inverse_program(&self, encoding: &AffineMap) -> Result<String, Error> {
        let matrices = [encoding.matrix.inverse()?];
        let vectors = [encoding.vector.clone()];
        Ok(self.generate_code(&matrices, &vectors))
    }
}

impl CodeGenerator for OutputEncodingCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        bit_packed::packed_matrices(matrices)
    }

    fn vectors(&self, vectors: &[BitVector]) -> String {
        bit_packed::packed_vectors(vectors)
    }

    fn includes(&self) -> String {
        [
            super::INCLUDE_INTTYPES,
            super::INCLUDE_STDDEF,
            super::INCLUDE_STDIO,
        ]
        .concat()
    }

    fn defines(&self, block_size: usize, word_size: usize, rounds: usize) -> String {
        bit_packed::packed_defines(block_size, word_size, rounds)
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
            bit_packed::MATRIX_VECTOR_PRODUCT,
            "\n",
            bit_packed::VECTOR_ADDITION,
            "\n",
            bit_packed::MODULAR_ADDITION,
        ]
        .concat()
    }

    fn main_function(&self) -> String {
        OUTPUT_MAIN.into()
    }
}

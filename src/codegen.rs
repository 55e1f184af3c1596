//! Generation of self-contained C programs from encoded affine layers.
//!
//! Every strategy emits the same program shape: the encoded matrices and
//! vectors as constants, a handful of helper functions, an `encrypt`
//! function interleaving the layers with the modular addition, and a `main`
//! reading two hex words from the command line and printing the ciphertext.
//! The strategies differ only in how the constants are laid out and how the
//! matrix-vector product is computed, trading source size against speed.

pub mod bit_packed;
pub mod default;
pub mod encodings;
pub mod inlined;
pub mod inlined_bit_packed;
pub mod simd;
pub mod sparse_matrix;

use crate::bits::{BitMatrix, BitVector};

/// Generates output C code for white-box Speck implementations.
pub trait CodeGenerator {
    /// Emit the matrix constants (and any strategy-specific product
    /// functions tied to them).
    fn matrices(&self, matrices: &[BitMatrix]) -> String;

    /// Emit the vector constants.
    fn vectors(&self, vectors: &[BitVector]) -> String;

    fn includes(&self) -> String {
        [INCLUDE_INTTYPES, INCLUDE_STDDEF, INCLUDE_STDIO, INCLUDE_STRING].concat()
    }

    fn defines(&self, block_size: usize, word_size: usize, rounds: usize) -> String {
        [
            define_block_size(block_size),
            define_word_size(word_size),
            define_word_type(word_size),
            define_word_in_type(word_size),
            define_word_out_type(word_size),
            define_rounds(rounds),
        ]
        .concat()
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
            FROM_BITS,
            "\n",
            TO_BITS,
            "\n",
            MATRIX_VECTOR_PRODUCT,
            "\n",
            VECTOR_ADDITION,
            "\n",
            MODULAR_ADDITION,
            "\n",
            ENCRYPT,
        ]
        .concat()
    }

    fn main_function(&self) -> String {
        MAIN.into()
    }

    /// Assemble the full program.
    fn generate_code(&self, matrices: &[BitMatrix], vectors: &[BitVector]) -> String {
        assert!(!matrices.is_empty());
        assert_eq!(matrices.len(), vectors.len());
        let block_size = matrices[0].rows();
        let word_size = block_size / 2;
        let rounds = matrices.len() - 1;
        [
            self.includes(),
            "\n".into(),
            self.defines(block_size, word_size, rounds),
            "\n".into(),
            self.matrices(matrices),
            "\n".into(),
            self.vectors(vectors),
            "\n".into(),
            self.functions(block_size, word_size, rounds),
            "\n".into(),
            self.main_function(),
        ]
        .concat()
    }
}

pub(crate) const INCLUDE_IMMINTRIN: &str = "#include <immintrin.h>\n";
pub(crate) const INCLUDE_INTTYPES: &str = "#include <inttypes.h>\n";
pub(crate) const INCLUDE_STDDEF: &str = "#include <stddef.h>\n";
pub(crate) const INCLUDE_STDIO: &str = "#include <stdio.h>\n";
pub(crate) const INCLUDE_STDLIB: &str = "#include <stdlib.h>\n";
pub(crate) const INCLUDE_STRING: &str = "#include <string.h>\n";

pub(crate) fn define_block_size(block_size: usize) -> String {
    format!("#define BLOCK_SIZE {block_size}\n")
}

pub(crate) fn define_word_size(word_size: usize) -> String {
    format!("#define WORD_SIZE {word_size}\n")
}

pub(crate) fn define_word_type(word_size: usize) -> String {
    format!("#define WORD_TYPE {}\n", word_type(word_size))
}

pub(crate) fn define_word_in_type(word_size: usize) -> String {
    let name = match word_size {
        16 => "SCNx16",
        24 | 32 => "SCNx32",
        48 | 64 => "SCNx64",
        _ => panic!("invalid or unsupported word size {word_size}"),
    };
    format!("#define WORD_IN_TYPE {name}\n")
}

pub(crate) fn define_word_out_type(word_size: usize) -> String {
    let name = match word_size {
        16 => "PRIx16",
        24 | 32 => "PRIx32",
        48 | 64 => "PRIx64",
        _ => panic!("invalid or unsupported word size {word_size}"),
    };
    format!("#define WORD_OUT_TYPE {name}\n")
}

pub(crate) fn define_rounds(rounds: usize) -> String {
    format!("#define ROUNDS {rounds}\n")
}

/// The C integer type wide enough for a word. 24- and 48-bit words use the
/// next wider type.
pub(crate) fn word_type(word_size: usize) -> &'static str {
    match word_size {
        16 => "uint16_t",
        24 | 32 => "uint32_t",
        48 | 64 => "uint64_t",
        _ => panic!("invalid or unsupported word size {word_size}"),
    }
}

pub(crate) const FROM_BITS: &str = "\
void from_bits(uint8_t bits[BLOCK_SIZE], WORD_TYPE *x, WORD_TYPE *y) {
    *x = 0;
    *y = 0;
    for (size_t i = 0; i < WORD_SIZE; i++) {
        *x |= ((WORD_TYPE) bits[i]) << i;
        *y |= ((WORD_TYPE) bits[WORD_SIZE + i]) << i;
    }
}
";

pub(crate) const TO_BITS: &str = "\
void to_bits(WORD_TYPE x, WORD_TYPE y, uint8_t bits[BLOCK_SIZE]) {
    for (size_t i = 0; i < WORD_SIZE; i++) {
        bits[i] = (x >> i) & 1;
        bits[WORD_SIZE + i] = (y >> i) & 1;
    }
}
";

pub(crate) const MATRIX_VECTOR_PRODUCT: &str = "\
void matrix_vector_product(uint8_t matrix[BLOCK_SIZE][BLOCK_SIZE], uint8_t xy[BLOCK_SIZE], uint8_t res[BLOCK_SIZE]) {
    for (size_t i = 0; i < BLOCK_SIZE; i++) {
        for (size_t j = 0; j < BLOCK_SIZE; j++) {
            res[i] ^= matrix[i][j] * xy[j];
        }
    }
}
";

pub(crate) const VECTOR_ADDITION: &str = "\
void vector_addition(uint8_t vector[BLOCK_SIZE], uint8_t xy[BLOCK_SIZE]) {
    for (size_t i = 0; i < BLOCK_SIZE; i++) {
        xy[i] ^= vector[i];
    }
}
";

pub(crate) const MODULAR_ADDITION: &str = "\
void modular_addition(uint8_t xy[BLOCK_SIZE]) {
    uint8_t carry = 0;
    for (size_t i = 0; i < WORD_SIZE; i++) {
        xy[i] = xy[i] + xy[WORD_SIZE + i] + carry;
        carry = xy[i] > 1;
        xy[i] &= 1;
    }
}
";

pub(crate) const ENCRYPT: &str = "\
void encrypt(WORD_TYPE p[2], WORD_TYPE c[2]) {
    uint8_t xy[BLOCK_SIZE];
    uint8_t res[BLOCK_SIZE];
    to_bits(p[0], p[1], xy);
    for (size_t i = 0; i < ROUNDS; i++) {
        memset(&res, 0, BLOCK_SIZE * sizeof(uint8_t));
        matrix_vector_product(MATRICES[i], xy, res);
        vector_addition(VECTORS[i], res);
        modular_addition(res);
        memcpy(&xy, &res, BLOCK_SIZE * sizeof(uint8_t));
    }

    memset(&res, 0, BLOCK_SIZE * sizeof(uint8_t));
    matrix_vector_product(MATRICES[ROUNDS], xy, res);
    vector_addition(VECTORS[ROUNDS], res);
    from_bits(res, &c[0], &c[1]);
}
";

pub(crate) const MAIN: &str = "\
int main(int argc, char *argv[]) {
    WORD_TYPE p[2];
    WORD_TYPE c[2];
    if (argc < 3) {
        return -1;
    } else {
        sscanf(argv[1], \"%\" WORD_IN_TYPE, &p[0]);
        sscanf(argv[2], \"%\" WORD_IN_TYPE, &p[1]);
        encrypt(p, c);
        printf(\"%\" WORD_OUT_TYPE \" %\" WORD_OUT_TYPE \"\\n\", c[0], c[1]);
    }
}
";

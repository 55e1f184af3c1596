//! The bit-packed code generation strategy: each matrix row is stored as
//! two machine words, one per block half, and the product reduces to ANDs
//! and a parity builtin.

use {
    super::CodeGenerator,
    crate::bits::{BitMatrix, BitVector},
    std::fmt::Write,
};

#[derive(Default)]
pub struct BitPackedCodeGenerator;

pub(crate) const MATRIX_VECTOR_PRODUCT: &str = "\
void matrix_vector_product(WORD_TYPE matrix[BLOCK_SIZE][2], WORD_TYPE xy[2], WORD_TYPE res[2]) {
    for (size_t i = WORD_SIZE; i-- > 0;) {
        res[0] = (res[0] << 1) | ((WORD_TYPE) WORD_PARITY_FUNCTION((matrix[i][0] & xy[0]) ^ (matrix[i][1] & xy[1])));
        res[1] = (res[1] << 1) | ((WORD_TYPE) WORD_PARITY_FUNCTION((matrix[WORD_SIZE + i][0] & xy[0]) ^ (matrix[WORD_SIZE + i][1] & xy[1])));
    }
}
";

pub(crate) const VECTOR_ADDITION: &str = "\
void vector_addition(WORD_TYPE vector[2], WORD_TYPE xy[2]) {
    xy[0] ^= vector[0];
    xy[1] ^= vector[1];
}
";

pub(crate) const MODULAR_ADDITION: &str = "\
void modular_addition(WORD_TYPE xy[2]) {
    xy[0] = (xy[0] + xy[1]) & WORD_MASK;
}
";

pub(crate) const ENCRYPT: &str = "\
void encrypt(WORD_TYPE p[2], WORD_TYPE c[2]) {
    WORD_TYPE res[2];
    c[0] = p[0];
    c[1] = p[1];
    for (size_t i = 0; i < ROUNDS; i++) {
        res[0] = 0;
        res[1] = 0;
        matrix_vector_product(MATRICES[i], c, res);
        vector_addition(VECTORS[i], res);
        modular_addition(res);
        c[0] = res[0];
        c[1] = res[1];
    }

    res[0] = 0;
    res[1] = 0;
    matrix_vector_product(MATRICES[ROUNDS], c, res);
    vector_addition(VECTORS[ROUNDS], res);
    c[0] = res[0];
    c[1] = res[1];
}
";

/// The `UINTN_C` constant macro wide enough for a word.
pub(crate) fn word_constant_type(word_size: usize) -> &'static str {
    match word_size {
        16 => "UINT16_C",
        24 | 32 => "UINT32_C",
        48 | 64 => "UINT64_C",
        _ => panic!("invalid or unsupported word size {word_size}"),
    }
}

pub(crate) fn word_parity_function(word_size: usize) -> &'static str {
    match word_size {
        16 => "__builtin_parity",
        24 | 32 => "__builtin_parityl",
        48 | 64 => "__builtin_parityll",
        _ => panic!("invalid or unsupported word size {word_size}"),
    }
}

pub(crate) fn packed_defines(block_size: usize, word_size: usize, rounds: usize) -> String {
    let mask = (1u128 << word_size) - 1;
    [
        super::define_block_size(block_size),
        super::define_word_size(word_size),
        super::define_word_type(word_size),
        super::define_word_in_type(word_size),
        super::define_word_out_type(word_size),
        format!("#define WORD_CONSTANT_TYPE {}\n", word_constant_type(word_size)),
        format!(
            "#define WORD_PARITY_FUNCTION {}\n",
            word_parity_function(word_size)
        ),
        format!("#define WORD_MASK 0x{mask:02x}\n"),
        super::define_rounds(rounds),
    ]
    .concat()
}

/// Pack the two halves of a matrix row into word constants.
pub(crate) fn row_halves(matrix: &BitMatrix, row: usize) -> (u64, u64) {
    let half = matrix.cols() / 2;
    (
        matrix.row_word(row, 0, half),
        matrix.row_word(row, half, half),
    )
}

pub(crate) fn packed_matrices(matrices: &[BitMatrix]) -> String {
    let mut s = String::from("WORD_TYPE MATRICES[ROUNDS + 1][BLOCK_SIZE][2] = {\n");
    for (k, matrix) in matrices.iter().enumerate() {
        s.push_str("    {");
        for i in 0..matrix.rows() {
            let (x, y) = row_halves(matrix, i);
            write!(s, "{{WORD_CONSTANT_TYPE({x}), WORD_CONSTANT_TYPE({y})}}").unwrap();
            if i + 1 < matrix.rows() {
                s.push_str(", ");
            }
        }
        s.push('}');
        if k + 1 < matrices.len() {
            s.push(',');
        }
        s.push('\n');
    }
    s.push_str("};\n");
    s
}

pub(crate) fn packed_vectors(vectors: &[BitVector]) -> String {
    let mut s = String::from("WORD_TYPE VECTORS[ROUNDS + 1][2] = {");
    for (k, vector) in vectors.iter().enumerate() {
        let half = vector.len() / 2;
        let x = vector.word(0, half);
        let y = vector.word(half, half);
        write!(s, "{{WORD_CONSTANT_TYPE({x}), WORD_CONSTANT_TYPE({y})}}").unwrap();
        if k + 1 < vectors.len() {
            s.push_str(", ");
        }
    }
    s.push_str("};\n");
    s
}

impl CodeGenerator for BitPackedCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        packed_matrices(matrices)
    }

    fn vectors(&self, vectors: &[BitVector]) -> String {
        packed_vectors(vectors)
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
        packed_defines(block_size, word_size, rounds)
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
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
}

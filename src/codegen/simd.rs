//! The SIMD code generation strategy: matrix rows are packed into 256-bit
//! AVX2 vectors so one AND/XOR pair covers several rows at once. Only word
//! sizes dividing the SIMD width evenly are supported (16, 32 and 64).

use {
    super::{bit_packed, CodeGenerator},
    crate::bits::{BitMatrix, BitVector},
    std::fmt::Write,
};

#[derive(Default)]
pub struct SimdCodeGenerator;

const SIMD_SIZE: usize = 256;

fn simd_set1(word_size: usize) -> &'static str {
    match word_size {
        16 => "_mm256_set1_epi16",
        32 => "_mm256_set1_epi32",
        64 => "_mm256_set1_epi64x",
        _ => panic!("unsupported word size {word_size}"),
    }
}

impl CodeGenerator for SimdCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        let mut s = String::from(
            "typedef union simd_union {\n    WORD_TYPE words[SIMD_PACKED_COUNT];\n    SIMD_TYPE simd;\n} simd_union;\n\n",
        );
        s.push_str("simd_union MATRICES[ROUNDS + 1][BLOCK_SIZE / SIMD_PACKED_COUNT][2] = {\n");
        for (k, matrix) in matrices.iter().enumerate() {
            s.push_str("    {");
            let packed_count = SIMD_SIZE / (matrix.rows() / 2);
            for i in (0..matrix.rows()).step_by(packed_count) {
                let mut x_parts = Vec::with_capacity(packed_count);
                let mut y_parts = Vec::with_capacity(packed_count);
                for j in 0..packed_count {
                    let (x, y) = bit_packed::row_halves(matrix, i + j);
                    x_parts.push(format!("WORD_CONSTANT_TYPE({x})"));
                    y_parts.push(format!("WORD_CONSTANT_TYPE({y})"));
                }
                write!(
                    s,
                    "{{{{{{{}}}}}, {{{{{}}}}}}}",
                    x_parts.join(", "),
                    y_parts.join(", ")
                )
                .unwrap();
                if i + packed_count < matrix.rows() {
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

    fn vectors(&self, vectors: &[BitVector]) -> String {
        bit_packed::packed_vectors(vectors)
    }

    fn includes(&self) -> String {
        [
            super::INCLUDE_INTTYPES,
            super::INCLUDE_STDDEF,
            super::INCLUDE_STDIO,
            super::INCLUDE_STDLIB,
            super::INCLUDE_IMMINTRIN,
        ]
        .concat()
    }

    fn defines(&self, block_size: usize, word_size: usize, rounds: usize) -> String {
        let packed_count = SIMD_SIZE / word_size;
        [
            bit_packed::packed_defines(block_size, word_size, rounds),
            format!("#define SIMD_PACKED_COUNT {packed_count}\n"),
            "#define SIMD_TYPE __m256i\n".into(),
            format!("#define SIMD_SET1 {}\n", simd_set1(word_size)),
            "#define SIMD_AND _mm256_and_si256\n".into(),
            "#define SIMD_XOR _mm256_xor_si256\n".into(),
        ]
        .concat()
    }

    fn functions(&self, _block_size: usize, word_size: usize, _rounds: usize) -> String {
        let packed_count = SIMD_SIZE / word_size;
        [
            matrix_vector_product(packed_count),
            "\n".into(),
            bit_packed::VECTOR_ADDITION.into(),
            "\n".into(),
            bit_packed::MODULAR_ADDITION.into(),
            "\n".into(),
            bit_packed::ENCRYPT.into(),
        ]
        .concat()
    }
}

fn matrix_vector_product(packed_count: usize) -> String {
    let mut s = String::from(
        "void matrix_vector_product(simd_union matrix[BLOCK_SIZE / SIMD_PACKED_COUNT][2], WORD_TYPE xy[2], WORD_TYPE res[2]) {\n    SIMD_TYPE xy0 = SIMD_SET1(xy[0]);\n    SIMD_TYPE xy1 = SIMD_SET1(xy[1]);\n    for (size_t i = WORD_SIZE / SIMD_PACKED_COUNT; i-- > 0;) {\n",
    );
    s.push_str("        simd_union inter0 = {.simd = SIMD_XOR(SIMD_AND(matrix[i][0].simd, xy0), SIMD_AND(matrix[i][1].simd, xy1))};\n");
    for i in (0..packed_count).rev() {
        writeln!(
            s,
            "        res[0] = (res[0] << 1) | ((WORD_TYPE) WORD_PARITY_FUNCTION(inter0.words[{i}]));"
        )
        .unwrap();
    }
    s.push_str("        simd_union inter1 = {.simd = SIMD_XOR(SIMD_AND(matrix[(WORD_SIZE / SIMD_PACKED_COUNT) + i][0].simd, xy0), SIMD_AND(matrix[(WORD_SIZE / SIMD_PACKED_COUNT) + i][1].simd, xy1))};\n");
    for i in (0..packed_count).rev() {
        writeln!(
            s,
            "        res[1] = (res[1] << 1) | ((WORD_TYPE) WORD_PARITY_FUNCTION(inter1.words[{i}]));"
        )
        .unwrap();
    }
    s.push_str("    }\n}\n\n");
    s
}

//! The inlined code generation strategy: one unrolled XOR function per
//! matrix and vector, dispatched through function pointer tables.

use {
    super::CodeGenerator,
    crate::bits::{BitMatrix, BitVector},
    std::fmt::Write,
};

#[derive(Default)]
pub struct InlinedCodeGenerator;

const ENCRYPT: &str = "\
void encrypt(WORD_TYPE p[2], WORD_TYPE c[2]) {
    uint8_t xy[BLOCK_SIZE];
    uint8_t res[BLOCK_SIZE];
    to_bits(p[0], p[1], xy);
    for (size_t i = 0; i < ROUNDS; i++) {
        memset(&res, 0, BLOCK_SIZE * sizeof(uint8_t));
        MATRIX_VECTOR_PRODUCTS[i](xy, res);
        VECTOR_ADDITIONS[i](res);
        modular_addition(res);
        memcpy(&xy, &res, BLOCK_SIZE * sizeof(uint8_t));
    }

    memset(&res, 0, BLOCK_SIZE * sizeof(uint8_t));
    MATRIX_VECTOR_PRODUCTS[ROUNDS](xy, res);
    VECTOR_ADDITIONS[ROUNDS](res);
    from_bits(res, &c[0], &c[1]);
}
";

impl CodeGenerator for InlinedCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        let mut s1 = String::new();
        let mut s2 = String::from(
            "void (*MATRIX_VECTOR_PRODUCTS[ROUNDS + 1])(uint8_t[BLOCK_SIZE], uint8_t[BLOCK_SIZE]) = {",
        );
        for (k, matrix) in matrices.iter().enumerate() {
            writeln!(
                s1,
                "void matrix_vector_product_{k}(uint8_t xy[BLOCK_SIZE], uint8_t res[BLOCK_SIZE]) {{"
            )
            .unwrap();
            for i in 0..matrix.rows() {
                write!(s1, "    res[{i}] ^= 0").unwrap();
                for j in 0..matrix.cols() {
                    if matrix.get(i, j) {
                        write!(s1, " ^ xy[{j}]").unwrap();
                    }
                }
                s1.push_str(";\n");
            }
            s1.push_str("}\n\n");

            write!(s2, "matrix_vector_product_{k}").unwrap();
            if k < matrices.len() - 1 {
                s2.push_str(", ");
            }
        }
        s2.push_str("};\n");
        s1 + &s2
    }

    fn vectors(&self, vectors: &[BitVector]) -> String {
        let mut s1 = String::new();
        let mut s2 = String::from("void (*VECTOR_ADDITIONS[ROUNDS + 1])(uint8_t[BLOCK_SIZE]) = {");
        for (k, vector) in vectors.iter().enumerate() {
            writeln!(s1, "void vector_addition_{k}(uint8_t xy[BLOCK_SIZE]) {{").unwrap();
            for i in 0..vector.len() {
                if vector.get(i) {
                    writeln!(s1, "    xy[{i}] ^= 1;").unwrap();
                }
            }
            s1.push_str("}\n\n");

            write!(s2, "vector_addition_{k}").unwrap();
            if k < vectors.len() - 1 {
                s2.push_str(", ");
            }
        }
        s2.push_str("};\n");
        s1 + &s2
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
            super::FROM_BITS,
            "\n",
            super::TO_BITS,
            "\n",
            super::MODULAR_ADDITION,
            "\n",
            ENCRYPT,
        ]
        .concat()
    }
}

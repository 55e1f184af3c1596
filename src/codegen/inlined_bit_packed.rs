//! The inlined bit-packed code generation strategy: unrolled bit-packed
//! product functions dispatched through function pointer tables.

use {
    super::{bit_packed, CodeGenerator},
    crate::bits::{BitMatrix, BitVector},
    std::fmt::Write,
};

#[derive(Default)]
pub struct InlinedBitPackedCodeGenerator;

const ENCRYPT: &str = "\
void encrypt(WORD_TYPE p[2], WORD_TYPE c[2]) {
    WORD_TYPE res[2];
    c[0] = p[0];
    c[1] = p[1];
    for (size_t i = 0; i < ROUNDS; i++) {
        res[0] = 0;
        res[1] = 0;
        MATRIX_VECTOR_PRODUCTS[i](c, res);
        VECTOR_ADDITIONS[i](res);
        modular_addition(res);
        c[0] = res[0];
        c[1] = res[1];
    }

    res[0] = 0;
    res[1] = 0;
    MATRIX_VECTOR_PRODUCTS[ROUNDS](c, res);
    VECTOR_ADDITIONS[ROUNDS](res);
    c[0] = res[0];
    c[1] = res[1];
}
";

impl CodeGenerator for InlinedBitPackedCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        let mut s1 = String::new();
        let mut s2 = String::from(
            "void (*MATRIX_VECTOR_PRODUCTS[ROUNDS + 1])(WORD_TYPE[2], WORD_TYPE[2]) = {",
        );
        for (k, matrix) in matrices.iter().enumerate() {
            writeln!(
                s1,
                "void matrix_vector_product_{k}(WORD_TYPE xy[2], WORD_TYPE res[2]) {{"
            )
            .unwrap();
            let word_size = matrix.rows() / 2;
            for half in 0..2 {
                for i in 0..word_size {
                    write!(s1, "    res[{half}] |= (0").unwrap();
                    for j in 0..word_size {
                        if matrix.get(half * word_size + i, j) {
                            write!(s1, " ^ ((xy[0] >> {j}) & 1)").unwrap();
                        }
                    }
                    for j in 0..word_size {
                        if matrix.get(half * word_size + i, word_size + j) {
                            write!(s1, " ^ ((xy[1] >> {j}) & 1)").unwrap();
                        }
                    }
                    writeln!(s1, ") << {i};").unwrap();
                }
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
        let mut s2 = String::from("void (*VECTOR_ADDITIONS[ROUNDS + 1])(WORD_TYPE[2]) = {");
        for (k, vector) in vectors.iter().enumerate() {
            let half = vector.len() / 2;
            let x = vector.word(0, half);
            let y = vector.word(half, half);
            writeln!(s1, "void vector_addition_{k}(WORD_TYPE xy[2]) {{").unwrap();
            writeln!(s1, "    xy[0] ^= WORD_CONSTANT_TYPE({x});").unwrap();
            writeln!(s1, "    xy[1] ^= WORD_CONSTANT_TYPE({y});").unwrap();
            s1.push_str("}\n\n");

            write!(s2, "vector_addition_{k}").unwrap();
            if k < vectors.len() - 1 {
                s2.push_str(", ");
            }
        }
        s2.push_str("};\n");
        s1 + &s2
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
        [bit_packed::MODULAR_ADDITION, "\n", ENCRYPT].concat()
    }
}

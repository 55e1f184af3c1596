//! The sparse matrix code generation strategy: the encoded matrices are
//! mostly zero, so only the coordinates of the nonzero entries are stored.

use {
    super::CodeGenerator,
    crate::bits::{BitMatrix, BitVector},
    std::fmt::Write,
};

#[derive(Default)]
pub struct SparseMatrixCodeGenerator;

const MATRIX_VECTOR_PRODUCT: &str = "\
void matrix_vector_product(uint8_t sparse_matrix[][2], uint16_t sparse_matrix_entries, uint8_t xy[BLOCK_SIZE], uint8_t res[BLOCK_SIZE]) {
    for (uint16_t i = 0; i < sparse_matrix_entries; i++) {
        res[sparse_matrix[i][0]] ^= xy[sparse_matrix[i][1]];
    }
}
";

const VECTOR_ADDITION: &str = "\
void vector_addition(uint8_t sparse_vector[], uint8_t sparse_vector_entries, uint8_t xy[BLOCK_SIZE]) {
    for (uint8_t i = 0; i < sparse_vector_entries; i++) {
        xy[sparse_vector[i]] ^= 1;
    }
}
";

const ENCRYPT: &str = "\
void encrypt(WORD_TYPE p[2], WORD_TYPE c[2]) {
    uint8_t xy[BLOCK_SIZE];
    uint8_t res[BLOCK_SIZE];
    to_bits(p[0], p[1], xy);
    for (size_t i = 0; i < ROUNDS; i++) {
        memset(&res, 0, BLOCK_SIZE);
        matrix_vector_product(SPARSE_MATRICES[i], SPARSE_MATRIX_ENTRIES[i], xy, res);
        vector_addition(SPARSE_VECTORS[i], SPARSE_VECTOR_ENTRIES[i], res);
        modular_addition(res);
        memcpy(&xy, &res, sizeof(res));
    }

    memset(&res, 0, BLOCK_SIZE);
    matrix_vector_product(SPARSE_MATRICES[ROUNDS], SPARSE_MATRIX_ENTRIES[ROUNDS], xy, res);
    vector_addition(SPARSE_VECTORS[ROUNDS], SPARSE_VECTOR_ENTRIES[ROUNDS], res);
    from_bits(res, &c[0], &c[1]);
}
";

impl CodeGenerator for SparseMatrixCodeGenerator {
    fn matrices(&self, matrices: &[BitMatrix]) -> String {
        let mut s = String::new();
        let mut s1 = String::from("uint16_t SPARSE_MATRIX_ENTRIES[ROUNDS + 1] = {");
        let mut s2 = String::from("uint8_t (*SPARSE_MATRICES[ROUNDS + 1])[2] = {");
        for (k, matrix) in matrices.iter().enumerate() {
            let sparse = matrix.nonzero_positions();
            write!(s, "uint8_t SPARSE_MATRIX_{k}[{}][2] = {{", sparse.len()).unwrap();
            for (l, (i, j)) in sparse.iter().enumerate() {
                write!(s, "{{{i}, {j}}}").unwrap();
                if l + 1 < sparse.len() {
                    s.push_str(", ");
                }
            }
            s.push_str("};\n");
            write!(s1, "{}", sparse.len()).unwrap();
            write!(s2, "SPARSE_MATRIX_{k}").unwrap();
            if k + 1 < matrices.len() {
                s1.push_str(", ");
                s2.push_str(", ");
            }
        }
        s1.push_str("};\n");
        s2.push_str("};\n");
        [s, "\n".into(), s1, "\n".into(), s2].concat()
    }

    fn vectors(&self, vectors: &[BitVector]) -> String {
        let mut s = String::new();
        let mut s1 = String::from("uint8_t SPARSE_VECTOR_ENTRIES[ROUNDS + 1] = {");
        let mut s2 = String::from("uint8_t *SPARSE_VECTORS[ROUNDS + 1] = {");
        for (k, vector) in vectors.iter().enumerate() {
            let sparse = vector.nonzero_positions();
            write!(s, "uint8_t SPARSE_VECTOR_{k}[{}] = {{", sparse.len()).unwrap();
            for (l, i) in sparse.iter().enumerate() {
                write!(s, "{i}").unwrap();
                if l + 1 < sparse.len() {
                    s.push_str(", ");
                }
            }
            s.push_str("};\n");
            write!(s1, "{}", sparse.len()).unwrap();
            write!(s2, "SPARSE_VECTOR_{k}").unwrap();
            if k + 1 < vectors.len() {
                s1.push_str(", ");
                s2.push_str(", ");
            }
        }
        s1.push_str("};\n");
        s2.push_str("};\n");
        [s, "\n".into(), s1, "\n".into(), s2].concat()
    }

    fn functions(&self, _block_size: usize, _word_size: usize, _rounds: usize) -> String {
        [
            super::FROM_BITS,
            "\n",
            super::TO_BITS,
            "\n",
            MATRIX_VECTOR_PRODUCT,
            "\n",
            VECTOR_ADDITION,
            "\n",
            super::MODULAR_ADDITION,
            "\n",
            ENCRYPT,
        ]
        .concat()
    }
}

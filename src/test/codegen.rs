use {
    super::rng,
    crate::{
        codegen::{
            bit_packed::BitPackedCodeGenerator,
            default::DefaultCodeGenerator,
            encodings::{InputEncodingCodeGenerator, OutputEncodingCodeGenerator},
            inlined::InlinedCodeGenerator,
            inlined_bit_packed::InlinedBitPackedCodeGenerator,
            simd::SimdCodeGenerator,
            sparse_matrix::SparseMatrixCodeGenerator,
            CodeGenerator,
        },
        equivalence::linear::LinearSelfEquivalenceProvider,
        random_linear_external_encoding, AffineLayers, Params, WhiteBoxSpeck,
    },
};

fn layers() -> (Params, AffineLayers, crate::equivalence::AffineMap) {
    let params = Params::new(32, 64).unwrap();
    let mut rng = rng(60);
    let white_box = WhiteBoxSpeck::new(params, &[0x1918, 0x1110, 0x0908, 0x0100]).unwrap();
    let provider = LinearSelfEquivalenceProvider::new(params.word_size);
    let input_encoding = random_linear_external_encoding(params.word_size, &mut rng);
    let output_encoding = random_linear_external_encoding(params.word_size, &mut rng);
    let layers = white_box.affine_layers(&input_encoding, &output_encoding, &provider, &mut rng);
    (params, layers, input_encoding)
}

/// Every strategy emits a program with the expected defines, constants and
/// entry point.
#[test]
fn program_scaffolding() {
    let (params, layers, _) = layers();
    let generators: Vec<Box<dyn CodeGenerator>> = vec![
        Box::new(DefaultCodeGenerator),
        Box::new(SparseMatrixCodeGenerator),
        Box::new(InlinedCodeGenerator),
        Box::new(BitPackedCodeGenerator),
        Box::new(InlinedBitPackedCodeGenerator),
        Box::new(SimdCodeGenerator),
    ];
    for generator in &generators {
        let code = generator.generate_code(&layers.matrices, &layers.vectors);
        assert!(code.contains("#define BLOCK_SIZE 32"));
        assert!(code.contains("#define WORD_SIZE 16"));
        assert!(code.contains(&format!("#define ROUNDS {}", params.rounds)));
        assert!(code.contains("void encrypt(WORD_TYPE p[2], WORD_TYPE c[2])"));
        assert!(code.contains("int main(int argc, char *argv[])"));
        assert!(code.contains("WORD_OUT_TYPE"));
    }
}

/// The sparse strategy stores exactly the nonzero coordinates.
#[test]
fn sparse_entries_match() {
    let (_, layers, _) = layers();
    let code = SparseMatrixCodeGenerator.generate_code(&layers.matrices, &layers.vectors);
    for (k, matrix) in layers.matrices.iter().enumerate() {
        let declaration = format!(
            "uint8_t SPARSE_MATRIX_{k}[{}][2]",
            matrix.nonzero_positions().len()
        );
        assert!(code.contains(&declaration));
    }
}

/// The dense strategy emits one row per matrix line and the packed strategy
/// two words per row.
#[test]
fn constant_layouts() {
    let (_, layers, _) = layers();
    let dense = DefaultCodeGenerator.generate_code(&layers.matrices, &layers.vectors);
    assert!(dense.contains("uint8_t MATRICES[ROUNDS + 1][BLOCK_SIZE][BLOCK_SIZE]"));
    assert!(dense.contains("uint8_t VECTORS[ROUNDS + 1][BLOCK_SIZE]"));

    let packed = BitPackedCodeGenerator.generate_code(&layers.matrices, &layers.vectors);
    assert!(packed.contains("WORD_TYPE MATRICES[ROUNDS + 1][BLOCK_SIZE][2]"));
    assert!(packed.contains("#define WORD_CONSTANT_TYPE UINT16_C"));
    assert!(packed.contains("#define WORD_MASK 0xffff"));
    assert!(packed.contains("__builtin_parity"));

    let simd = SimdCodeGenerator.generate_code(&layers.matrices, &layers.vectors);
    assert!(simd.contains("#define SIMD_PACKED_COUNT 16"));
    assert!(simd.contains("_mm256_set1_epi16"));
}

/// The inverse encoding programs embed the inverted matrices and the
/// modular arithmetic they need.
#[test]
fn inverse_encoding_programs() {
    let (_, layers, input_encoding) = layers();
    let input = InputEncodingCodeGenerator
        .generate_inverse_program(&layers.matrices[0], &layers.vectors[0], &input_encoding)
        .unwrap();
    assert!(input.contains("void modular_subtraction(WORD_TYPE xy[2])"));
    assert!(input.contains("#define ROUNDS 2"));
    assert!(input.contains("matrix_vector_product(MATRICES[2], xy, res);"));

    let output = OutputEncodingCodeGenerator
        .generate_inverse_program(&input_encoding)
        .unwrap();
    assert!(output.contains("#define ROUNDS 0"));
    assert!(output.contains("matrix_vector_product(MATRICES[0], xy, res);"));
}

use {
    super::rng,
    crate::{
        decode_output, encode_input, encrypt, evaluate, from_bits, key_expansion,
        random_affine_external_encoding,
        equivalence::{
            affine::{Type1AffineSelfEquivalenceProvider, Type2AffineSelfEquivalenceProvider},
            combined::CombinedSelfEquivalenceProvider,
            linear::LinearSelfEquivalenceProvider,
            AffineMap, SelfEquivalenceProvider,
        },
        to_bits, Params, WhiteBoxSpeck,
    },
    rand::Rng,
};

/// White boxes with identity external encodings reproduce the Speck test
/// vectors, for both self-equivalence families.
#[test]
fn reproduces_test_vectors() {
    test(32, 64, &[0x1918, 0x1110, 0x0908, 0x0100], (0x6574, 0x694c), (0xa868, 0x42f2));
    test(
        64,
        128,
        &[0x1b1a1918, 0x13121110, 0x0b0a0908, 0x03020100],
        (0x74656c20, 0x41656729),
        (0x9f7952ec, 0x4175946c),
    );
    test(
        128,
        256,
        &[
            0x1f1e1d1c1b1a1918,
            0x1716151413121110,
            0x0f0e0d0c0b0a0908,
            0x0706050403020100,
        ],
        (0x65736f6874206e49, 0x2e72656e6f6f7020),
        (0x4109010405c0f53e, 0x4eeeb48d9c188f43),
    );
}

fn test(block_size: usize, key_size: usize, key: &[u64], plaintext: (u64, u64), ciphertext: (u64, u64)) {
    let params = Params::new(block_size, key_size).unwrap();
    let white_box = WhiteBoxSpeck::new(params, key).unwrap();
    let identity = AffineMap::identity(params.block_size);
    let mut rng = rng(40);
    for provider in providers(params.word_size) {
        let layers = white_box.affine_layers(&identity, &identity, &*provider, &mut rng);
        assert_eq!(layers.matrices.len(), params.rounds + 1);
        assert_eq!(layers.vectors.len(), params.rounds + 1);
        let output = evaluate(&params, &layers, &to_bits(&params, plaintext.0, plaintext.1));
        assert_eq!(from_bits(&params, &output), ciphertext);
    }
}

fn providers(word_size: usize) -> Vec<Box<dyn SelfEquivalenceProvider>> {
    vec![
        Box::new(LinearSelfEquivalenceProvider::new(word_size)),
        Box::new(CombinedSelfEquivalenceProvider::new(
            word_size,
            vec![
                Box::new(Type1AffineSelfEquivalenceProvider::new(word_size)),
                Box::new(Type2AffineSelfEquivalenceProvider::new(word_size)),
            ],
        )),
    ]
}

/// With random affine external encodings, encoding the input, running the
/// layers and decoding the output computes Speck.
#[test]
fn external_encodings_roundtrip() {
    let mut rng = rng(41);
    let params = Params::new(32, 64).unwrap();
    for _ in 0..3 {
        let key: Vec<u64> = (0..params.key_words).map(|_| rng.gen::<u64>() & 0xffff).collect();
        let white_box = WhiteBoxSpeck::new(params, &key).unwrap();
        let round_keys = key_expansion(&params, &key).unwrap();

        let input_encoding = random_affine_external_encoding(params.word_size, &mut rng);
        let output_encoding = random_affine_external_encoding(params.word_size, &mut rng);
        for provider in providers(params.word_size) {
            let layers =
                white_box.affine_layers(&input_encoding, &output_encoding, &*provider, &mut rng);
            for _ in 0..5 {
                let plaintext = (rng.gen::<u64>() & 0xffff, rng.gen::<u64>() & 0xffff);
                let input =
                    encode_input(&params, &layers.matrices[0], &input_encoding, plaintext)
                        .unwrap();
                let output = evaluate(&params, &layers, &input);
                let decoded = decode_output(&params, &output_encoding, &output).unwrap();
                assert_eq!(decoded, encrypt(&params, &round_keys, plaintext));
            }
        }
    }
}

/// The key must have exactly the right number of words.
#[test]
fn rejects_bad_keys() {
    let params = Params::new(32, 64).unwrap();
    assert!(WhiteBoxSpeck::new(params, &[1, 2, 3]).is_err());
    assert!(WhiteBoxSpeck::new(params, &[1, 2, 3, 4, 5]).is_err());
}

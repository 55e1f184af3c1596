use {
    super::rng,
    crate::{
        attack,
        equivalence::{
            affine::Type1AffineSelfEquivalenceProvider, linear::LinearSelfEquivalenceProvider,
        },
        random_affine_external_encoding, random_linear_external_encoding, Params, WhiteBoxSpeck,
    },
    rand::Rng,
};

/// The closed-form attack recovers the key and both linear external
/// encodings exactly.
#[test]
fn linear_attack_recovers_everything() {
    let params = Params::new(64, 96).unwrap();
    let provider = LinearSelfEquivalenceProvider::new(params.word_size);
    let mut rng = rng(50);
    for _ in 0..10 {
        let key: Vec<u64> = (0..params.key_words)
            .map(|_| rng.gen::<u64>() & 0xffff_ffff)
            .collect();
        let white_box = WhiteBoxSpeck::new(params, &key).unwrap();
        let input_encoding = random_linear_external_encoding(params.word_size, &mut rng);
        let output_encoding = random_linear_external_encoding(params.word_size, &mut rng);
        let layers =
            white_box.affine_layers(&input_encoding, &output_encoding, &provider, &mut rng);

        let recovery = attack::linear::attack(&params, &layers).unwrap();
        assert_eq!(recovery.key, key);
        assert_eq!(recovery.input_encoding, input_encoding);
        assert_eq!(recovery.output_encoding, output_encoding);
    }
}

/// The algebraic attack recovers the key and both affine external encodings;
/// at least one of the returned candidates matches the builder's inputs.
#[test]
fn affine_attack_recovers_everything() {
    let params = Params::new(48, 72).unwrap();
    let provider = Type1AffineSelfEquivalenceProvider::new(params.word_size);
    let mut rng = rng(51);
    for _ in 0..5 {
        let key: Vec<u64> = (0..params.key_words)
            .map(|_| rng.gen::<u64>() & 0xff_ffff)
            .collect();
        let white_box = WhiteBoxSpeck::new(params, &key).unwrap();
        let input_encoding = random_affine_external_encoding(params.word_size, &mut rng);
        let output_encoding = random_affine_external_encoding(params.word_size, &mut rng);
        let layers =
            white_box.affine_layers(&input_encoding, &output_encoding, &provider, &mut rng);

        let candidates = attack::affine::attack(&params, &layers, &provider).unwrap();
        assert!(candidates.iter().any(|candidate| candidate.key == key
            && candidate.input_encoding == input_encoding
            && candidate.output_encoding == output_encoding));
    }
}

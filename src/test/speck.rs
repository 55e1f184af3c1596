use {
    super::rng,
    crate::{
        encrypt, from_bits, inverse_key_schedule, key_expansion, modular_addition, speck, to_bits,
        BitVector, Params,
    },
    rand::Rng,
};

/// Speck test vectors from the cipher specification.
#[test]
fn test_vectors() {
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
    let round_keys = key_expansion(&params, key).unwrap();
    assert_eq!(round_keys.len(), params.rounds);
    assert_eq!(encrypt(&params, &round_keys, plaintext), ciphertext);
}

/// Inverting the key schedule recovers the master key, for every supported
/// parameter set and with or without skipped leading rounds.
#[test]
fn key_schedule_roundtrip() {
    let mut rng = rng(10);
    for params in Params::all() {
        for _ in 0..5 {
            let key: Vec<u64> = (0..params.key_words)
                .map(|_| rng.gen::<u64>() & mask(&params))
                .collect();
            let round_keys = key_expansion(&params, &key).unwrap();

            let recovered =
                inverse_key_schedule(&params, &round_keys[..params.key_words], 0).unwrap();
            assert_eq!(recovered, key, "{params:?}");

            let skipped =
                inverse_key_schedule(&params, &round_keys[1..params.key_words + 1], 1).unwrap();
            assert_eq!(skipped, key, "{params:?} with a skipped round");
        }
    }
}

/// Wrong key word counts are rejected.
#[test]
fn invalid_parameters() {
    assert!(Params::new(32, 128).is_err());
    assert!(Params::new(33, 64).is_err());
    let params = Params::new(32, 64).unwrap();
    assert!(key_expansion(&params, &[1, 2, 3]).is_err());
    assert!(inverse_key_schedule(&params, &[1, 2, 3], 0).is_err());
}

/// Blocks round-trip through the bit-vector representation, and the
/// modular-addition step matches word arithmetic.
#[test]
fn bit_embedding() {
    let mut rng = rng(11);
    for params in Params::all() {
        for _ in 0..10 {
            let x = rng.gen::<u64>() & mask(&params);
            let y = rng.gen::<u64>() & mask(&params);
            let v = to_bits(&params, x, y);
            assert_eq!(from_bits(&params, &v), (x, y));
            let added = modular_addition(&params, &v);
            assert_eq!(
                from_bits(&params, &added),
                (x.wrapping_add(y) & mask(&params), y)
            );
        }
    }
}

/// The rotation and XOR matrices act on the bit vector exactly like the
/// word operations they encode.
#[test]
fn round_function_matrices() {
    let mut rng = rng(12);
    for params in [Params::new(32, 64).unwrap(), Params::new(64, 96).unwrap()] {
        let w = params.word_size;
        for _ in 0..10 {
            let x = rng.gen::<u64>() & mask(&params);
            let y = rng.gen::<u64>() & mask(&params);
            let v = to_bits(&params, x, y);

            let rotated = &speck::rotate_right_matrix(&params, params.alpha as isize, 0) * &v;
            let expected = (x >> params.alpha) | ((x << (w - params.alpha)) & mask(&params));
            assert_eq!(from_bits(&params, &rotated), (expected, y));

            let rotated = &speck::rotate_left_matrix(&params, 0, params.beta as isize) * &v;
            let expected = ((y << params.beta) & mask(&params)) | (y >> (w - params.beta));
            assert_eq!(from_bits(&params, &rotated), (x, expected));

            let xored = &speck::xor_xy_matrix(&params) * &v;
            assert_eq!(from_bits(&params, &xored), (x, x ^ y));

            let key = rng.gen::<u64>() & mask(&params);
            let masked = &v + &speck::xor_round_key_vector(&params, key);
            assert_eq!(from_bits(&params, &masked), (x ^ key, y));
        }
    }
}

/// A full round assembled from the decomposition matches the reference
/// round function.
#[test]
fn affine_decomposition() {
    let mut rng = rng(13);
    let params = Params::new(32, 64).unwrap();
    let rm = speck::RoundMatrices::new(&params);
    for _ in 0..10 {
        let x = rng.gen::<u64>() & mask(&params);
        let y = rng.gen::<u64>() & mask(&params);
        let key = rng.gen::<u64>() & mask(&params);

        // One reference round.
        let expected = encrypt(&params, &[key], (x, y));

        // first, then S, then mid with the key folded in, then S undone by
        // looking only at the state before the next addition: evaluate
        // first and mid around a single S step and compare after inverting
        // the leading rotation of the next round.
        let v = to_bits(&params, x, y);
        let after_first = modular_addition(&params, &(&rm.first * &v));
        let keyed = &after_first + &speck::xor_round_key_vector(&params, key);
        let after_mid: BitVector = &rm.mid * &keyed;
        // mid = first * xor_xy * rotate_left(y, beta); strip the leading
        // rotation of the next round to compare against the round output.
        let stripped = &speck::rotate_left_matrix(&params, params.alpha as isize, 0) * &after_mid;
        assert_eq!(from_bits(&params, &stripped), expected);
    }
}

fn mask(params: &Params) -> u64 {
    if params.word_size == 64 {
        u64::MAX
    } else {
        (1 << params.word_size) - 1
    }
}

use {
    super::rng,
    crate::{BitMatrix, BitVector},
};

/// Assert that multiplying by the identity changes nothing.
#[test]
fn identity_multiplication() {
    let mut rng = rng(1);
    for size in [8, 32, 48, 96] {
        let m = BitMatrix::random(size, size, &mut rng);
        let identity = BitMatrix::identity(size);
        assert_eq!(&m * &identity, m);
        assert_eq!(&identity * &m, m);
    }
}

/// Assert that a random invertible matrix times its inverse is the identity.
#[test]
fn inverse_roundtrip() {
    let mut rng = rng(2);
    for size in [8, 32, 48, 96] {
        let m = loop {
            let m = BitMatrix::random(size, size, &mut rng);
            if m.is_invertible() {
                break m;
            }
        };
        let inverse = m.inverse().unwrap();
        assert_eq!(&m * &inverse, BitMatrix::identity(size));
        assert_eq!(&inverse * &m, BitMatrix::identity(size));
    }
}

/// A matrix with two equal rows is singular.
#[test]
fn singular_matrix() {
    let mut m = BitMatrix::identity(8);
    for j in 0..8 {
        m.set(3, j, m.get(5, j));
    }
    assert!(!m.is_invertible());
    assert!(m.inverse().is_err());
}

/// Addition is XOR, so adding a matrix to itself gives zero.
#[test]
fn addition_is_xor() {
    let mut rng = rng(3);
    let m = BitMatrix::random(16, 16, &mut rng);
    assert_eq!(&m + &m, BitMatrix::zero(16, 16));
    let v = BitVector::random(16, &mut rng);
    assert_eq!(&v + &v, BitVector::zero(16));
}

/// Splitting a matrix into quarters and tiling them back is the identity.
#[test]
fn block_submatrix_roundtrip() {
    let mut rng = rng(4);
    let m = BitMatrix::random(32, 32, &mut rng);
    let a = m.submatrix(0, 0, 16, 16);
    let b = m.submatrix(0, 16, 16, 16);
    let c = m.submatrix(16, 0, 16, 16);
    let d = m.submatrix(16, 16, 16, 16);
    assert_eq!(BitMatrix::block(&[&[&a, &b], &[&c, &d]]), m);
}

/// Check the matrix-vector product against a small known case.
#[test]
fn matrix_vector_product() {
    // [[1, 1], [0, 1]] * [1, 1] = [0, 1]
    let mut m = BitMatrix::zero(2, 2);
    m.set(0, 0, true);
    m.set(0, 1, true);
    m.set(1, 1, true);
    let mut v = BitVector::zero(2);
    v.set(0, true);
    v.set(1, true);
    let product = &m * &v;
    assert!(!product.get(0));
    assert!(product.get(1));
}

/// Words pack and unpack little-endian.
#[test]
fn word_packing() {
    let v = BitVector::from_word(0b1101, 8);
    assert!(v.get(0) && !v.get(1) && v.get(2) && v.get(3));
    assert_eq!(v.word(0, 8), 0b1101);
    assert_eq!(v.word(1, 3), 0b110);
    assert_eq!(v.nonzero_positions(), vec![0, 2, 3]);

    let mut m = BitMatrix::zero(2, 8);
    m.set(1, 2, true);
    m.set(1, 3, true);
    assert_eq!(m.row_word(1, 0, 8), 0b1100);
    assert_eq!(m.row_word(1, 2, 4), 0b11);
    assert_eq!(m.nonzero_positions(), vec![(1, 2), (1, 3)]);
}

/// Matrix product associates with vector application.
#[test]
fn product_associativity() {
    let mut rng = rng(5);
    let a = BitMatrix::random(24, 24, &mut rng);
    let b = BitMatrix::random(24, 24, &mut rng);
    let v = BitVector::random(24, &mut rng);
    assert_eq!(&(&a * &b) * &v, &a * &(&b * &v));
}

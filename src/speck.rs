//! The Speck block cipher and its decomposition into affine layers.
//!
//! Speck is an ARX cipher: each round rotates the left word, adds the right
//! word modulo `2^w`, XORs in a round key, rotates the right word and XORs
//! the words together. Everything except the modular addition is linear over
//! GF(2), so a round factors into an affine map on the bit vector of the
//! block followed by the single nonlinear step `S(x, y) = (x ⊞ y, y)`. The
//! matrix constructors at the bottom of this module build the linear pieces
//! of that factorization; the white-box builder composes them with
//! self-equivalences of `S` to hide the round keys.
//!
//! The specification for this cipher is available as the SIMON and Speck
//! paper by Beaulieu et al. (IACR ePrint 2013/404).

use {
    crate::{
        bits::{BitMatrix, BitVector},
        error::Error,
    },
    std::fmt,
};

/// The supported `(block size, key size, rounds)` combinations, from the
/// Speck specification.
const ROUNDS: [(usize, usize, usize); 10] = [
    (32, 64, 22),
    (48, 72, 22),
    (48, 96, 23),
    (64, 96, 26),
    (64, 128, 27),
    (96, 96, 28),
    (96, 144, 29),
    (128, 128, 32),
    (128, 192, 33),
    (128, 256, 34),
];

/// Speck instance parameters, derived from a block size and key size pair.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub block_size: usize,
    pub key_size: usize,
    pub word_size: usize,
    pub key_words: usize,
    pub rounds: usize,
    pub alpha: usize,
    pub beta: usize,
}

impl Params {
    /// Look up the parameters for a block size and key size combination.
    pub fn new(block_size: usize, key_size: usize) -> Result<Self, Error> {
        let rounds = ROUNDS
            .iter()
            .find(|(b, k, _)| (*b, *k) == (block_size, key_size))
            .map(|(_, _, rounds)| *rounds)
            .ok_or_else(|| {
                Error::InvalidParameters(format!(
                    "unsupported block size and key size combination: {block_size}/{key_size}"
                ))
            })?;
        let word_size = block_size / 2;
        Ok(Self {
            block_size,
            key_size,
            word_size,
            key_words: key_size / word_size,
            rounds,
            alpha: if word_size == 16 { 7 } else { 8 },
            beta: if word_size == 16 { 2 } else { 3 },
        })
    }

    /// All supported parameter combinations.
    pub fn all() -> impl Iterator<Item = Params> {
        ROUNDS.into_iter().map(|(b, k, _)| Params::new(b, k).unwrap())
    }

    fn mask(&self) -> u64 {
        if self.word_size == 64 {
            u64::MAX
        } else {
            (1 << self.word_size) - 1
        }
    }

    fn ror(&self, x: u64, positions: usize) -> u64 {
        ((x >> positions) | (x << (self.word_size - positions))) & self.mask()
    }

    fn rol(&self, x: u64, positions: usize) -> u64 {
        ((x << positions) | (x >> (self.word_size - positions))) & self.mask()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Speck{}/{}", self.block_size, self.key_size)
    }
}

/// Expand a master key into one round key per round.
///
/// The key schedule runs the round function on an internal state seeded from
/// the master key words: `k[0]` is the last key word and the `l` sequence
/// starts with the remaining words in reverse order.
pub fn key_expansion(params: &Params, key: &[u64]) -> Result<Vec<u64>, Error> {
    if key.len() != params.key_words {
        return Err(Error::InvalidParameters(format!(
            "expected {} key words but got {}",
            params.key_words,
            key.len()
        )));
    }
    let mut k = vec![key[params.key_words - 1]];
    let mut l: Vec<u64> = key[..params.key_words - 1].iter().rev().copied().collect();
    for i in 0..params.rounds - 1 {
        let mut x = l[i];
        let y = k[i];
        x = params.ror(x, params.alpha);
        x = x.wrapping_add(y) & params.mask();
        x ^= i as u64;
        let y = params.rol(y, params.beta) ^ x;
        l.push(x);
        k.push(y);
    }
    Ok(k)
}

/// Recover the master key from consecutive round keys.
///
/// `round_keys` must hold `key_words` round keys starting at round `skipped`.
/// The update rule is inverted to rebuild the `l` sequence alongside the
/// known round keys, and then run backwards over the `skipped` leading
/// rounds to rebuild the initial state, which is the master key.
pub fn inverse_key_schedule(
    params: &Params,
    round_keys: &[u64],
    skipped: usize,
) -> Result<Vec<u64>, Error> {
    let m = round_keys.len();
    if m != params.key_words {
        return Err(Error::InvalidParameters(format!(
            "expected {} round keys but got {m}",
            params.key_words
        )));
    }
    let mut l = vec![0u64; skipped];
    for i in 0..m - 1 {
        let mut x = params.rol(round_keys[i], params.beta) ^ round_keys[i + 1];
        x ^= (skipped + i) as u64;
        x = x.wrapping_sub(round_keys[i]) & params.mask();
        x = params.rol(x, params.alpha);
        l.push(x);
    }

    // Working backwards until we get to the first round key.
    let mut k = round_keys[0];
    for i in (0..skipped).rev() {
        k ^= l[i + m - 1];
        k = params.ror(k, params.beta);
        let mut x = l[i + m - 1] ^ i as u64;
        x = x.wrapping_sub(k) & params.mask();
        x = params.rol(x, params.alpha);
        l[i] = x;
    }

    let mut key: Vec<u64> = l[..m - 1].iter().rev().copied().collect();
    key.push(k);
    Ok(key)
}

/// Reference Speck encryption of a single block, used to cross-check the
/// white-box construction.
#[must_use]
pub fn encrypt(params: &Params, round_keys: &[u64], block: (u64, u64)) -> (u64, u64) {
    let (mut x, mut y) = block;
    for key in round_keys {
        x = params.ror(x, params.alpha);
        x = x.wrapping_add(y) & params.mask();
        x ^= key;
        y = params.rol(y, params.beta);
        y ^= x;
    }
    (x, y)
}

/// Pack a block into its bit-vector representation: entries `0..w` are the
/// little-endian bits of `x` and entries `w..2w` the bits of `y`.
#[must_use]
pub fn to_bits(params: &Params, x: u64, y: u64) -> BitVector {
    let mut v = BitVector::zero(params.block_size);
    for i in 0..params.word_size {
        v.set(i, (x >> i) & 1 == 1);
        v.set(params.word_size + i, (y >> i) & 1 == 1);
    }
    v
}

/// Unpack a bit vector back into a block.
#[must_use]
pub fn from_bits(params: &Params, v: &BitVector) -> (u64, u64) {
    (
        v.word(0, params.word_size),
        v.word(params.word_size, params.word_size),
    )
}

/// The nonlinear step `S(x, y) = (x ⊞ y, y)` on the bit-vector
/// representation.
#[must_use]
pub fn modular_addition(params: &Params, v: &BitVector) -> BitVector {
    let (x, y) = from_bits(params, v);
    to_bits(params, x.wrapping_add(y) & params.mask(), y)
}

/// The inverse of [`modular_addition`].
#[must_use]
pub fn modular_subtraction(params: &Params, v: &BitVector) -> BitVector {
    let (x, y) = from_bits(params, v);
    to_bits(params, x.wrapping_sub(y) & params.mask(), y)
}

/// A matrix which corresponds to a right bit rotation of `x` by `x_pos` and
/// of `y` by `y_pos`. Negative positions rotate left.
#[must_use]
pub fn rotate_right_matrix(params: &Params, x_pos: isize, y_pos: isize) -> BitMatrix {
    let w = params.word_size as isize;
    let mut m = BitMatrix::zero(params.block_size, params.block_size);
    for i in 0..params.word_size {
        // Output x bit i is input x bit (i + x_pos) mod w, and likewise for y.
        let x_col = (i as isize + x_pos).rem_euclid(w) as usize;
        let y_col = (i as isize + y_pos).rem_euclid(w) as usize;
        m.set(i, x_col, true);
        m.set(params.word_size + i, params.word_size + y_col, true);
    }
    m
}

/// A matrix which corresponds to a left bit rotation of `x` and `y`.
#[must_use]
pub fn rotate_left_matrix(params: &Params, x_pos: isize, y_pos: isize) -> BitMatrix {
    // Left rotation is right rotation over negated positions.
    rotate_right_matrix(params, -x_pos, -y_pos)
}

/// A matrix which corresponds to `y = x ^ y`.
#[must_use]
pub fn xor_xy_matrix(params: &Params) -> BitMatrix {
    let mut m = BitMatrix::zero(params.block_size, params.block_size);
    for i in 0..params.word_size {
        m.set(i, i, true);
        m.set(params.word_size + i, i, true);
        m.set(params.word_size + i, params.word_size + i, true);
    }
    m
}

/// A vector which corresponds to `x = x ^ k` for a round key `k`.
#[must_use]
pub fn xor_round_key_vector(params: &Params, k: u64) -> BitVector {
    let mut v = BitVector::zero(params.block_size);
    for i in 0..params.word_size {
        v.set(i, (k >> i) & 1 == 1);
    }
    v
}

/// The linear pieces of the affine round decomposition, shared by the
/// white-box builder and both attacks.
pub struct RoundMatrices {
    /// The layer before the first modular addition: `ror(x, alpha)`.
    pub first: BitMatrix,
    /// The layer between two modular additions.
    pub mid: BitMatrix,
    /// The layer after the last modular addition, without the leading
    /// rotation.
    pub last: BitMatrix,
}

impl RoundMatrices {
    #[must_use]
    pub fn new(params: &Params) -> Self {
        let rotate_x_right = rotate_right_matrix(params, params.alpha as isize, 0);
        let rotate_y_left = rotate_left_matrix(params, 0, params.beta as isize);
        let xor_xy = xor_xy_matrix(params);
        let last = &xor_xy * &rotate_y_left;
        Self {
            mid: &rotate_x_right * &last,
            first: rotate_x_right,
            last,
        }
    }
}

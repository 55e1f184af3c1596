//! Boolean polynomial arithmetic.
//!
//! A boolean polynomial ring is the quotient of the polynomial ring over
//! GF(2) by the field equations `x² = x`, so monomials are square-free and a
//! monomial is simply a set of variable indices. Addition is the symmetric
//! difference of term sets and multiplication distributes with idempotent
//! variables.
//!
//! The [`Ring`] trait abstracts the handful of operations the
//! self-equivalence constructions need, so the same construction code runs
//! over concrete GF(2) scalars (producing encoded matrices) and over
//! polynomials (producing the symbolic matrices consumed by the algebraic
//! attack).

pub mod groebner;
pub mod parse;

use {
    crate::{bits::BitMatrix, error::Error},
    std::{
        cmp::Ordering,
        collections::{BTreeMap, BTreeSet, HashMap},
        fmt,
    },
};

/// The operations shared by GF(2) scalars and boolean polynomials.
pub trait Ring: Clone + PartialEq {
    fn zero() -> Self;
    fn one() -> Self;
    fn add(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn is_zero(&self) -> bool;

    fn from_bit(bit: bool) -> Self {
        if bit {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

/// A scalar in GF(2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Gf2(pub bool);

impl Ring for Gf2 {
    fn zero() -> Self {
        Self(false)
    }

    fn one() -> Self {
        Self(true)
    }

    fn add(&self, rhs: &Self) -> Self {
        Self(self.0 ^ rhs.0)
    }

    fn mul(&self, rhs: &Self) -> Self {
        Self(self.0 & rhs.0)
    }

    fn is_zero(&self) -> bool {
        !self.0
    }
}

impl std::ops::Add for Gf2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl std::ops::Mul for Gf2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// A square-free monomial: a sorted set of variable indices. The empty
/// monomial is the constant 1.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Monomial(Vec<u32>);

impl Monomial {
    #[must_use]
    pub fn one() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn variable(index: u32) -> Self {
        Self(vec![index])
    }

    pub fn degree(&self) -> usize {
        self.0.len()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn vars(&self) -> &[u32] {
        &self.0
    }

    /// The union of the two variable sets.
    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut vars = Vec::with_capacity(self.0.len() + rhs.0.len());
        let (mut a, mut b) = (self.0.iter().peekable(), rhs.0.iter().peekable());
        loop {
            match (a.peek(), b.peek()) {
                (Some(x), Some(y)) => match x.cmp(y) {
                    Ordering::Less => vars.push(*a.next().unwrap()),
                    Ordering::Greater => vars.push(*b.next().unwrap()),
                    Ordering::Equal => {
                        vars.push(*a.next().unwrap());
                        b.next();
                    }
                },
                (Some(_), None) => vars.push(*a.next().unwrap()),
                (None, Some(_)) => vars.push(*b.next().unwrap()),
                (None, None) => break,
            }
        }
        Self(vars)
    }

    /// Whether this monomial's variables are a subset of `rhs`'s.
    pub fn divides(&self, rhs: &Self) -> bool {
        let mut other = rhs.0.iter().peekable();
        'vars: for var in &self.0 {
            while let Some(o) = other.next() {
                match o.cmp(var) {
                    Ordering::Equal => continue 'vars,
                    Ordering::Greater => return false,
                    Ordering::Less => {}
                }
            }
            return false;
        }
        true
    }

    /// The set difference of the variables. Only meaningful when `rhs`
    /// divides `self`.
    #[must_use]
    pub fn div(&self, rhs: &Self) -> Self {
        Self(self.0.iter().copied().filter(|v| !rhs.0.contains(v)).collect())
    }
}

/// Graded order: first by total degree, ties broken by comparing variable
/// indices from the largest down (a higher index weighs more). A graded
/// order guarantees that reduction steps strictly shrink polynomials, which
/// the Gröbner engine relies on.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree()
            .cmp(&other.degree())
            .then_with(|| self.0.iter().rev().cmp(other.0.iter().rev()))
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A boolean polynomial: a set of monomials combined by XOR.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Poly {
    terms: BTreeSet<Monomial>,
}

impl Poly {
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn one() -> Self {
        Self::from_monomial(Monomial::one())
    }

    #[must_use]
    pub fn variable(index: u32) -> Self {
        Self::from_monomial(Monomial::variable(index))
    }

    #[must_use]
    pub fn from_monomial(monomial: Monomial) -> Self {
        let mut terms = BTreeSet::new();
        terms.insert(monomial);
        Self { terms }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.terms.len() == 1 && self.leading_monomial().is_some_and(Monomial::is_one)
    }

    pub fn terms(&self) -> impl DoubleEndedIterator<Item = &Monomial> {
        self.terms.iter()
    }

    /// The largest monomial in the graded order.
    pub fn leading_monomial(&self) -> Option<&Monomial> {
        self.terms.iter().next_back()
    }

    pub fn degree(&self) -> usize {
        self.terms.iter().map(Monomial::degree).max().unwrap_or(0)
    }

    /// The set of variables appearing in any term.
    pub fn vars(&self) -> BTreeSet<u32> {
        self.terms
            .iter()
            .flat_map(|m| m.vars().iter().copied())
            .collect()
    }

    /// Toggle a term in or out of the polynomial.
    pub fn toggle(&mut self, monomial: Monomial) {
        if !self.terms.remove(&monomial) {
            self.terms.insert(monomial);
        }
    }

    /// Substitute polynomials for variables. Variables missing from the map
    /// are left in place.
    #[must_use]
    pub fn substitute(&self, map: &HashMap<u32, Poly>) -> Poly {
        let mut result = Poly::zero();
        for term in &self.terms {
            let mut product = Poly::one();
            for var in term.vars() {
                let factor = map
                    .get(var)
                    .cloned()
                    .unwrap_or_else(|| Poly::variable(*var));
                product = product.mul(&factor);
            }
            result = result.add(&product);
        }
        result
    }

    /// Substitute constants for variables. Variables missing from the map are
    /// left in place.
    #[must_use]
    pub fn assign(&self, map: &HashMap<u32, bool>) -> Poly {
        let mut result = Poly::zero();
        'terms: for term in &self.terms {
            let mut rest = Vec::new();
            for var in term.vars() {
                match map.get(var) {
                    Some(false) => continue 'terms,
                    Some(true) => {}
                    None => rest.push(*var),
                }
            }
            result.toggle(Monomial(rest));
        }
        result
    }

    /// The constant value, if the polynomial has no variables.
    pub fn constant(&self) -> Option<bool> {
        if self.is_zero() {
            Some(false)
        } else if self.is_one() {
            Some(true)
        } else {
            None
        }
    }

    /// Split a polynomial that is affine in the designated variables into its
    /// linear coefficients and the remaining part. The coefficient of each
    /// designated variable, and the remainder, are polynomials in the other
    /// variables. Fails if any term contains two designated variables.
    pub fn split_affine(
        &self,
        designated: impl Fn(u32) -> bool,
    ) -> Result<(BTreeMap<u32, Poly>, Poly), Error> {
        let mut linear: BTreeMap<u32, Poly> = BTreeMap::new();
        let mut rest = Poly::zero();
        for term in &self.terms {
            let mut inner: Vec<u32> = Vec::new();
            let mut outer: Vec<u32> = Vec::new();
            for var in term.vars() {
                if designated(*var) {
                    inner.push(*var);
                } else {
                    outer.push(*var);
                }
            }
            let coefficient = Monomial(outer);
            match inner.as_slice() {
                [] => rest.toggle(coefficient),
                [var] => linear.entry(*var).or_default().toggle(coefficient),
                _ => {
                    return Err(Error::InvalidCoefficients(
                        "polynomial is not affine in the designated variables".into(),
                    ))
                }
            }
        }
        Ok((linear, rest))
    }

    /// Render the polynomial using the variable names of a [`VarSet`].
    pub fn render(&self, vars: &VarSet) -> String {
        if self.is_zero() {
            return "0".into();
        }
        self.terms
            .iter()
            .rev()
            .map(|term| {
                if term.is_one() {
                    "1".into()
                } else {
                    term.vars()
                        .iter()
                        .map(|v| vars.name(*v).to_string())
                        .collect::<Vec<_>>()
                        .join("*")
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Ring for Poly {
    fn zero() -> Self {
        Poly::zero()
    }

    fn one() -> Self {
        Poly::one()
    }

    fn add(&self, rhs: &Self) -> Self {
        let mut result = self.clone();
        for term in &rhs.terms {
            result.toggle(term.clone());
        }
        result
    }

    fn mul(&self, rhs: &Self) -> Self {
        let mut result = Poly::zero();
        for a in &self.terms {
            for b in &rhs.terms {
                result.toggle(a.mul(b));
            }
        }
        result
    }

    fn is_zero(&self) -> bool {
        Poly::is_zero(self)
    }
}

impl Poly {
    #[must_use]
    pub fn add(&self, rhs: &Self) -> Self {
        Ring::add(self, rhs)
    }

    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        Ring::mul(self, rhs)
    }
}

impl fmt::Debug for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let terms: Vec<String> = self
            .terms
            .iter()
            .rev()
            .map(|term| {
                if term.is_one() {
                    "1".into()
                } else {
                    term.vars()
                        .iter()
                        .map(|v| format!("x{v}"))
                        .collect::<Vec<_>>()
                        .join("*")
                }
            })
            .collect();
        write!(f, "{}", terms.join(" + "))
    }
}

/// An interner mapping variable names to indices.
#[derive(Debug, Default, Clone)]
pub struct VarSet {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl VarSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index of a name, creating a fresh variable if needed.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(index) = self.indices.get(name) {
            return *index;
        }
        let index = u32::try_from(self.names.len()).unwrap();
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    pub fn name(&self, index: u32) -> &str {
        &self.names[index as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A dense matrix over any [`Ring`].
#[derive(Clone, PartialEq, Debug)]
pub struct RingMat<R> {
    rows: usize,
    cols: usize,
    entries: Vec<R>,
}

impl<R: Ring> RingMat<R> {
    #[must_use]
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![R::zero(); rows * cols],
        }
    }

    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.set(i, i, R::one());
        }
        m
    }

    /// Lift a GF(2) matrix into the ring.
    #[must_use]
    pub fn from_bits(bits: &BitMatrix) -> Self {
        let mut m = Self::zero(bits.rows(), bits.cols());
        for i in 0..bits.rows() {
            for j in 0..bits.cols() {
                m.set(i, j, R::from_bit(bits.get(i, j)));
            }
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &R {
        assert!(row < self.rows && col < self.cols);
        &self.entries[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: R) {
        assert!(row < self.rows && col < self.cols);
        self.entries[row * self.cols + col] = value;
    }

    #[must_use]
    pub fn add(&self, rhs: &Self) -> Self {
        assert_eq!((self.rows, self.cols), (rhs.rows, rhs.cols));
        let mut result = Self::zero(self.rows, self.cols);
        for i in 0..self.entries.len() {
            result.entries[i] = self.entries[i].add(&rhs.entries[i]);
        }
        result
    }

    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        assert_eq!(self.cols, rhs.rows);
        let mut result = Self::zero(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    let b = rhs.get(k, j);
                    if b.is_zero() {
                        continue;
                    }
                    let entry = result.get(i, j).add(&a.mul(b));
                    result.set(i, j, entry);
                }
            }
        }
        result
    }

    /// Apply the matrix to a vector of ring elements.
    #[must_use]
    pub fn mul_vec(&self, vec: &[R]) -> Vec<R> {
        assert_eq!(self.cols, vec.len());
        let mut result = vec![R::zero(); self.rows];
        for i in 0..self.rows {
            for (j, value) in vec.iter().enumerate() {
                let a = self.get(i, j);
                if a.is_zero() || value.is_zero() {
                    continue;
                }
                result[i] = result[i].add(&a.mul(value));
            }
        }
        result
    }

    #[must_use]
    pub fn submatrix(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        assert!(row + nrows <= self.rows && col + ncols <= self.cols);
        let mut m = Self::zero(nrows, ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                m.set(i, j, self.get(row + i, col + j).clone());
            }
        }
        m
    }

    /// Tile matrices into one larger matrix.
    #[must_use]
    pub fn block(tiles: &[&[&RingMat<R>]]) -> Self {
        let rows = tiles.iter().map(|row| row[0].rows).sum();
        let cols = tiles[0].iter().map(|tile| tile.cols).sum();
        let mut m = Self::zero(rows, cols);
        let mut row_offset = 0;
        for tile_row in tiles {
            let mut col_offset = 0;
            for tile in *tile_row {
                assert_eq!(tile.rows, tile_row[0].rows);
                for i in 0..tile.rows {
                    for j in 0..tile.cols {
                        m.set(row_offset + i, col_offset + j, tile.get(i, j).clone());
                    }
                }
                col_offset += tile.cols;
            }
            assert_eq!(col_offset, cols);
            row_offset += tile_row[0].rows;
        }
        m
    }
}

impl RingMat<Gf2> {
    /// Pack a GF(2) ring matrix into the bit-level representation.
    #[must_use]
    pub fn to_bits(&self) -> BitMatrix {
        let mut bits = BitMatrix::zero(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                bits.set(i, j, self.get(i, j).0);
            }
        }
        bits
    }
}

impl RingMat<Poly> {
    /// Substitute constants for variables in every entry.
    #[must_use]
    pub fn assign(&self, map: &HashMap<u32, bool>) -> Self {
        let mut m = Self::zero(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                m.set(i, j, self.get(i, j).assign(map));
            }
        }
        m
    }

    /// Convert a fully assigned matrix to the bit-level representation.
    pub fn constant(&self) -> Result<BitMatrix, Error> {
        let mut bits = BitMatrix::zero(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                let value = self.get(i, j).constant().ok_or_else(|| {
                    Error::AttackFailed("matrix entry is not constant".into())
                })?;
                bits.set(i, j, value);
            }
        }
        Ok(bits)
    }
}

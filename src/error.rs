use thiserror::Error;

/// Errors reported by builders, providers and attacks.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested cipher parameters are not in the Speck parameter table,
    /// or the key does not have the expected number of words.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// A coefficient vector has the wrong length or violates a
    /// provider-specific constraint.
    #[error("invalid coefficients: {0}")]
    InvalidCoefficients(String),
    /// An inversion was attempted on a singular matrix.
    #[error("matrix is singular")]
    SingularMatrix,
    /// The recovered polynomial system does not have the expected structure,
    /// so no key candidates can be produced.
    #[error("attack failed: {0}")]
    AttackFailed(String),
}

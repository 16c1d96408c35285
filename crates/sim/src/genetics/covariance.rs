use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::errors::ConfigError;

/// A covariance matrix with its lower Cholesky factor.
///
/// The matrix arrives as a flat row-major vector whose length must be a
/// perfect square, and must factorize; both are checked once at load.
/// Correlated draws are L z with z a fresh standard-normal vector, the
/// elements of z drawn in index order so a seeded stream reproduces.
#[derive(Debug, Clone)]
pub struct Covariance {
    matrix: DMatrix<f64>,
    factor: DMatrix<f64>,
}

impl Covariance {
    pub fn from_flat(name: &'static str, flat: &[f64]) -> Result<Self, ConfigError> {
        let n = (flat.len() as f64).sqrt() as usize;
        if n * n != flat.len() {
            return Err(ConfigError::MatrixShape {
                name,
                len: flat.len(),
            });
        }
        let matrix = DMatrix::from_row_slice(n, n, flat);
        let factor = Cholesky::<f64, Dyn>::new(matrix.clone())
            .ok_or(ConfigError::NotPositiveDefinite(name))?
            .l();
        Ok(Self { matrix, factor })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// One covariance entry.
    #[inline]
    pub fn entry(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    /// A diagonal entry.
    #[inline]
    pub fn variance(&self, i: usize) -> f64 {
        self.matrix[(i, i)]
    }

    /// Draw a correlated vector L z.
    pub fn correlated_draws<R: Rng>(&self, rng: &mut R) -> DVector<f64> {
        let z = DVector::from_fn(self.dim(), |_, _| rng.sample(StandardNormal));
        &self.factor * z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_from_flat_rejects_non_square() {
        let err = Covariance::from_flat("genetic", &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ConfigError::MatrixShape { len: 3, .. }));
    }

    #[test]
    fn test_from_flat_rejects_non_positive_definite() {
        // zero determinant
        let err = Covariance::from_flat("genetic", &[1.0, 1.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositiveDefinite(_)));
    }

    #[test]
    fn test_factor_reproduces_matrix() {
        let cov = Covariance::from_flat("genetic", &[4.0, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(cov.dim(), 2);
        assert_eq!(cov.entry(0, 1), 1.0);
        assert_eq!(cov.variance(0), 4.0);

        let l = &cov.factor;
        let reconstructed = l * l.transpose();
        for i in 0..2 {
            for j in 0..2 {
                assert!((reconstructed[(i, j)] - cov.entry(i, j)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_correlated_draws_track_variances() {
        let cov = Covariance::from_flat("genetic", &[9.0, 0.0, 0.0, 1.0]).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let n = 4000;
        let mut sum_sq = [0.0f64; 2];
        for _ in 0..n {
            let v = cov.correlated_draws(&mut rng);
            sum_sq[0] += v[0] * v[0];
            sum_sq[1] += v[1] * v[1];
        }
        let var0 = sum_sq[0] / n as f64;
        let var1 = sum_sq[1] / n as f64;
        assert!((var0 - 9.0).abs() < 0.6, "var0 = {var0}");
        assert!((var1 - 1.0).abs() < 0.1, "var1 = {var1}");
    }
}

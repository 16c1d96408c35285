use nalgebra::DVector;
use rand::Rng;

use crate::genetics::Covariance;

/// Draws breeding-value and residual vectors from the factorized
/// covariances.
///
/// Foundation animals get a full correlated draw; calves get the parent
/// average plus a Mendelian-sampling deviation at half the genetic
/// variance. The breeding-value draw always precedes the residual draw,
/// which fixes the stream order for a given seed.
#[derive(Debug, Clone)]
pub struct GeneticSampler {
    genetic: Covariance,
    residual: Covariance,
}

impl GeneticSampler {
    pub fn new(genetic: Covariance, residual: Covariance) -> Self {
        Self { genetic, residual }
    }

    /// Breeding values and residuals for a foundation animal.
    pub fn foundation<R: Rng>(&self, rng: &mut R) -> (DVector<f64>, DVector<f64>) {
        let bv = self.genetic.correlated_draws(rng);
        let residual = self.residual.correlated_draws(rng);
        (bv, residual)
    }

    /// Breeding values and residuals for a calf of a known mating.
    pub fn mating<R: Rng>(
        &self,
        sire_bv: &DVector<f64>,
        dam_bv: &DVector<f64>,
        rng: &mut R,
    ) -> (DVector<f64>, DVector<f64>) {
        let mendelian = self.genetic.correlated_draws(rng) * 0.5f64.sqrt();
        let bv = (sire_bv + dam_bv) * 0.5 + mendelian;
        let residual = self.residual.correlated_draws(rng);
        (bv, residual)
    }

    #[inline]
    pub fn genetic(&self) -> &Covariance {
        &self.genetic
    }

    #[inline]
    pub fn residual(&self) -> &Covariance {
        &self.residual
    }

    /// Residual standard deviation of one trait.
    #[inline]
    pub fn residual_sd(&self, trait_index: usize) -> f64 {
        self.residual.variance(trait_index).sqrt()
    }
}

//! Demographic functions for the coalescent. Time runs backwards from the
//! present (t = 0).

pub mod gompertz;

pub use gompertz::GompertzGrowth;

pub trait PopulationFunction {
    /// Population size at time `t`.
    fn population_size(&self, t: f64) -> f64;

    /// ∫₀ᵗ 1 / N(s) ds.
    fn intensity(&self, t: f64) -> f64;

    /// Inverse of [`PopulationFunction::intensity`].
    fn inverse_intensity(&self, x: f64) -> f64;

    /// Ids of the parameters this function reads.
    fn parameter_ids(&self) -> Vec<String>;

    /// ∫ 1 / N(s) ds over `[start, finish]`.
    fn integral(&self, start: f64, finish: f64) -> f64 {
        self.intensity(finish) - self.intensity(start)
    }
}

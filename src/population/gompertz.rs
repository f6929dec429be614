use log::warn;

use crate::error::{ModelError, Result};
use crate::io::params::GompertzConfig;
use crate::parameter::RealParameter;
use crate::population::PopulationFunction;
use crate::proposal::UpDownProposal;
use crate::quadrature::{Integral, IterativeLegendreGauss};
use crate::recompute::Recompute;
use crate::report::TraceLog;

/// Smallest population size used in the intensity integrand.
pub const MIN_POP_SIZE: f64 = 1e-20;

/// Gompertz growth: N(t) = N0 · exp(ln(N∞/N0) · (1 − e^{bt})), with carrying
/// capacity N∞ = N0 / f0. The size is N0 at t = 0 and tends to N∞ going
/// forward in time (t → −∞).
#[derive(Debug, Clone)]
pub struct GompertzGrowth {
    id: String,
    f0: RealParameter,
    b: RealParameter,
    n0: RealParameter,
    integrator: IterativeLegendreGauss,
    stored: Option<[RealParameter; 3]>,
}

impl GompertzGrowth {
    pub fn new(mut f0: RealParameter, mut b: RealParameter, mut n0: RealParameter) -> Self {
        let lo = f0.bounds().lo.max(0.0);
        f0.restrict_bounds(lo, f64::INFINITY);
        b.restrict_bounds(0.0, f64::INFINITY);
        let lo = n0.bounds().lo.max(0.0);
        n0.restrict_bounds(lo, f64::INFINITY);
        Self {
            id: "gompertzGrowth".to_string(),
            f0,
            b,
            n0,
            integrator: IterativeLegendreGauss::default(),
            stored: None,
        }
    }

    pub fn from_values(f0: f64, b: f64, n0: f64) -> Self {
        Self::new(
            RealParameter::new("f0", f0),
            RealParameter::new("b", b),
            RealParameter::new("N0", n0),
        )
    }

    pub fn from_config(config: &GompertzConfig) -> Result<Self> {
        for (name, v) in [("f0", config.f0), ("b", config.b), ("N0", config.n0)] {
            if !v.is_finite() {
                return Err(ModelError::config(format!("Gompertz {name} must be finite, got {v}")));
            }
        }
        let mut model = Self::from_values(config.f0, config.b, config.n0);
        if let Some(id) = &config.id {
            model = model.with_id(id.clone());
        }
        if let Some(max_evaluations) = config.max_evaluations {
            let integrator = model.integrator.with_max_evaluations(max_evaluations);
            model = model.with_integrator(integrator);
        }
        Ok(model)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_integrator(mut self, integrator: IterativeLegendreGauss) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn integrator(&self) -> &IterativeLegendreGauss {
        &self.integrator
    }

    pub fn f0(&self) -> f64 {
        self.f0.value()
    }

    pub fn growth_rate(&self) -> f64 {
        self.b.value()
    }

    pub fn n0(&self) -> f64 {
        self.n0.value()
    }

    pub fn n_infinity(&self) -> f64 {
        self.n0() / self.f0()
    }

    pub fn f0_parameter(&self) -> &RealParameter {
        &self.f0
    }

    pub fn b_parameter(&self) -> &RealParameter {
        &self.b
    }

    pub fn n0_parameter(&self) -> &RealParameter {
        &self.n0
    }

    pub fn set_f0(&mut self, v: f64) -> Result<()> {
        self.f0.set_value(0, v)
    }

    pub fn set_growth_rate(&mut self, v: f64) -> Result<()> {
        self.b.set_value(0, v)
    }

    pub fn set_n0(&mut self, v: f64) -> Result<()> {
        self.n0.set_value(0, v)
    }

    /// Intensity with the integration outcome exposed. Exhausting the
    /// evaluation budget is not an error: the last stage estimate is returned
    /// as [`Integral::Degraded`].
    pub fn intensity_detailed(&self, t: f64) -> Integral {
        if t == 0.0 {
            return Integral::Converged {
                value: 0.0,
                evaluations: 0,
            };
        }
        let integrand = |s: f64| 1.0 / self.population_size(s).max(MIN_POP_SIZE);
        let result = self.integrator.integrate(integrand, 0.0, t);
        if let Integral::Degraded { best, reason, .. } = result {
            warn!(
                "{}: intensity({t}) did not converge ({reason}); using {best} (f0={}, b={}, N0={})",
                self.id,
                self.f0(),
                self.growth_rate(),
                self.n0()
            );
        }
        result
    }

    /// Scales f0 and b up while the tree height scales down.
    pub fn up_down_proposal(&self, tree_id: &str) -> UpDownProposal {
        UpDownProposal::new(
            &self.id,
            tree_id,
            vec![self.f0.id.clone(), self.b.id.clone()],
        )
    }
}

impl PopulationFunction for GompertzGrowth {
    fn population_size(&self, t: f64) -> f64 {
        let n0 = self.n0();
        // exact at the present, including f0 = 0 or N0 = 0
        if t == 0.0 {
            return n0;
        }
        let b = self.growth_rate();
        n0 * ((self.n_infinity() / n0).ln() * (1.0 - (b * t).exp())).exp()
    }

    fn intensity(&self, t: f64) -> f64 {
        self.intensity_detailed(t).value()
    }

    /// Not available in closed form; always 0.
    fn inverse_intensity(&self, _x: f64) -> f64 {
        0.0
    }

    fn parameter_ids(&self) -> Vec<String> {
        vec![self.n0.id.clone()]
    }
}

// Nothing is cached: every query reads the current parameters, so only the
// parameters themselves are checkpointed.
impl Recompute for GompertzGrowth {
    fn notify_changed(&mut self) -> bool {
        true
    }

    fn is_dirty(&self) -> bool {
        false
    }

    fn checkpoint(&mut self) {
        self.stored = Some([self.f0.clone(), self.b.clone(), self.n0.clone()]);
    }

    fn rollback(&mut self) {
        if let Some([f0, b, n0]) = &self.stored {
            self.f0 = f0.clone();
            self.b = b.clone();
            self.n0 = n0.clone();
        }
    }
}

impl TraceLog for GompertzGrowth {}

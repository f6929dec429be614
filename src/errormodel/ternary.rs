//! SiFit error model for ternary genotypes (Zafar et al. 2017).
//!
//! States: 0 = homozygous reference, 1 = heterozygous, 2 = homozygous
//! non-reference. With false-positive rate A and false-negative rate B:
//!
//! ```text
//!           0              1         2
//! 0 | 1 - A - A*B/2        A       A*B/2 |
//! 1 |     B/2            1 - B      B/2  |
//! 2 |      0               0         1   |
//! ```

use std::sync::Arc;

use crate::datatype::{DataType, DataTypeKind, StateCapability};
use crate::error::Result;
use crate::errormodel::{ErrorModel, ErrorProcess};
use crate::parameter::RealParameter;

#[derive(Debug, Clone)]
pub struct SiFitTernary {
    alpha: RealParameter,
    beta: RealParameter,
}

impl SiFitTernary {
    pub fn new(mut alpha: RealParameter, mut beta: RealParameter) -> Self {
        alpha.restrict_bounds(0.0, 1.0);
        beta.restrict_bounds(0.0, 1.0);
        Self { alpha, beta }
    }

    pub fn alpha(&self) -> &RealParameter {
        &self.alpha
    }

    pub fn beta(&self) -> &RealParameter {
        &self.beta
    }

    pub fn alpha_mut(&mut self) -> &mut RealParameter {
        &mut self.alpha
    }

    pub fn beta_mut(&mut self) -> &mut RealParameter {
        &mut self.beta
    }

    pub fn matrix(&self) -> [[f64; 3]; 3] {
        let a = self.alpha.value();
        let b = self.beta.value();
        [
            [1.0 - a - a * b / 2.0, a, a * b / 2.0],
            [b / 2.0, 1.0 - b, b / 2.0],
            [0.0, 0.0, 1.0],
        ]
    }
}

impl ErrorProcess for SiFitTernary {
    fn name(&self) -> &str {
        "sifit-ternary"
    }

    fn probability(&self, observed: usize, true_state: usize, _t: f64) -> f64 {
        self.matrix()[observed][true_state]
    }

    fn can_handle_data_type(&self, data_type: &dyn StateCapability) -> bool {
        data_type.kind() == DataTypeKind::Ternary && data_type.state_count() == 3
    }
}

pub type TernaryErrorModel = ErrorModel<SiFitTernary>;

impl ErrorModel<SiFitTernary> {
    pub fn ternary(alpha: f64, beta: f64) -> Result<Self> {
        Self::new(
            SiFitTernary::new(
                RealParameter::new("alpha", alpha),
                RealParameter::new("beta", beta),
            ),
            Arc::new(DataType::ternary()),
        )
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        self.update(|p| p.alpha.set_value(0, alpha))
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        self.update(|p| p.beta.set_value(0, beta))
    }
}

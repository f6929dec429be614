//! Named real parameters with bounds, as sampled by the inference runtime.

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// A named real-valued (scalar or vector) parameter owned by the sampler.
///
/// Models read `value()` when they rebuild. Writes come from the sampler,
/// through the owning model so that its cache is marked stale.
#[derive(Debug, Clone, PartialEq)]
pub struct RealParameter {
    pub id: String,
    values: Vec<f64>,
    bounds: Bounds,
}

impl RealParameter {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            values: vec![value],
            bounds: Bounds::UNBOUNDED,
        }
    }

    pub fn with_values(id: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let id = id.into();
        if values.is_empty() {
            return Err(ModelError::config(format!("parameter {id} has no values")));
        }
        Ok(Self {
            id,
            values,
            bounds: Bounds::UNBOUNDED,
        })
    }

    pub fn value(&self) -> f64 {
        self.values[0]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| ModelError::index_out_of_range(index, len))?;
        *slot = value;
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Intersects the current bounds with `[lo, hi]`. Values are left alone;
    /// the sampler is expected to reject proposals that leave the bounds.
    pub fn restrict_bounds(&mut self, lo: f64, hi: f64) {
        self.bounds = Bounds {
            lo: self.bounds.lo.max(lo),
            hi: self.bounds.hi.min(hi),
        };
    }

    pub fn in_bounds(&self) -> bool {
        self.values.iter().all(|v| self.bounds.contains(*v))
    }
}

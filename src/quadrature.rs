//! Iterative Gauss–Legendre quadrature with a bounded evaluation budget.
//!
//! Stage `n` splits the interval into `n` equal pieces and applies a fixed
//! 5-point rule on each. Stages are refined until two successive estimates
//! agree to the configured accuracy.

use std::fmt;

use serde::Serialize;

/// Nodes and weights of the 5-point Gauss–Legendre rule on [-1, 1].
const NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.0,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];
const WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegradeReason {
    EvaluationBudget,
    IterationLimit,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::EvaluationBudget => write!(f, "evaluation budget exhausted"),
            DegradeReason::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Outcome of an integration. A degraded result carries the last completed
/// stage estimate, or 0 when not even the first stage fit in the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integral {
    Converged {
        value: f64,
        evaluations: usize,
    },
    Degraded {
        best: f64,
        evaluations: usize,
        reason: DegradeReason,
    },
}

impl Integral {
    pub fn value(&self) -> f64 {
        match self {
            Integral::Converged { value, .. } => *value,
            Integral::Degraded { best, .. } => *best,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Integral::Converged { .. })
    }

    pub fn degrade_reason(&self) -> Option<DegradeReason> {
        match self {
            Integral::Converged { .. } => None,
            Integral::Degraded { reason, .. } => Some(*reason),
        }
    }

    pub fn evaluations(&self) -> usize {
        match self {
            Integral::Converged { evaluations, .. } | Integral::Degraded { evaluations, .. } => {
                *evaluations
            }
        }
    }

    fn negate(self) -> Self {
        match self {
            Integral::Converged { value, evaluations } => Integral::Converged {
                value: -value,
                evaluations,
            },
            Integral::Degraded {
                best,
                evaluations,
                reason,
            } => Integral::Degraded {
                best: -best,
                evaluations,
                reason,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeLegendreGauss {
    pub relative_accuracy: f64,
    pub absolute_accuracy: f64,
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub max_evaluations: usize,
}

impl Default for IterativeLegendreGauss {
    fn default() -> Self {
        Self {
            relative_accuracy: 1e-12,
            absolute_accuracy: 1e-8,
            min_iterations: 2,
            max_iterations: 10_000,
            max_evaluations: 100_000,
        }
    }
}

impl IterativeLegendreGauss {
    pub const POINTS: usize = 5;

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Integrates `f` over `[lower, upper]`. Reversed bounds give the negated
    /// integral; equal bounds give exactly 0.
    pub fn integrate<F>(&self, f: F, lower: f64, upper: f64) -> Integral
    where
        F: Fn(f64) -> f64,
    {
        if lower == upper {
            return Integral::Converged {
                value: 0.0,
                evaluations: 0,
            };
        }
        if lower > upper {
            return self.integrate(f, upper, lower).negate();
        }

        let mut evaluations = 0usize;
        let Some(mut old) = self.stage(&f, lower, upper, 1, &mut evaluations) else {
            return Integral::Degraded {
                best: 0.0,
                evaluations,
                reason: DegradeReason::EvaluationBudget,
            };
        };
        let mut n = 2usize;
        let mut iterations = 0usize;
        loop {
            let Some(t) = self.stage(&f, lower, upper, n, &mut evaluations) else {
                return Integral::Degraded {
                    best: old,
                    evaluations,
                    reason: DegradeReason::EvaluationBudget,
                };
            };
            let delta = (t - old).abs();
            let limit = self
                .absolute_accuracy
                .max(self.relative_accuracy * (old.abs() + t.abs()) * 0.5);
            if iterations + 1 >= self.min_iterations && delta <= limit {
                return Integral::Converged {
                    value: t,
                    evaluations,
                };
            }
            let ratio = (delta / limit).powf(0.5 / Self::POINTS as f64).min(4.0);
            n = ((ratio * n as f64) as usize).max(n + 1);
            old = t;
            iterations += 1;
            if iterations > self.max_iterations {
                return Integral::Degraded {
                    best: old,
                    evaluations,
                    reason: DegradeReason::IterationLimit,
                };
            }
        }
    }

    /// One refinement stage; `None` when it would exceed the evaluation budget.
    fn stage<F>(&self, f: &F, lower: f64, upper: f64, n: usize, evaluations: &mut usize) -> Option<f64>
    where
        F: Fn(f64) -> f64,
    {
        let cost = n.checked_mul(Self::POINTS)?;
        if evaluations.checked_add(cost)? > self.max_evaluations {
            return None;
        }
        *evaluations += cost;

        let step = (upper - lower) / n as f64;
        let half = step * 0.5;
        let mut sum = 0.0;
        for i in 0..n {
            let a = lower + i as f64 * step;
            let mid = a + half;
            for (x, w) in NODES.iter().zip(WEIGHTS.iter()) {
                sum += w * f(mid + half * x);
            }
        }
        Some(sum * half)
    }
}

use serde::Serialize;
use std::io::{self, Write};

use crate::population::{GompertzGrowth, PopulationFunction};
use crate::proposal::UpDownProposal;
use crate::quadrature::DegradeReason;

/// Per-iteration diagnostic output. Every hook defaults to writing nothing.
pub trait TraceLog {
    fn init(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn log(&self, _step: u64, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn close(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryPoint {
    pub t: f64,
    pub size: f64,
    pub intensity: f64,
    pub converged: bool,
    pub evaluations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradeReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationSummary {
    pub f0: f64,
    pub b: f64,
    pub n0: f64,
    pub n_infinity: f64,
    pub parameter_ids: Vec<String>,
    pub proposal: Option<UpDownProposal>,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_matrix: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_matrix: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<PopulationSummary>,
}

/// Samples size and intensity at `n_points` evenly spaced times in `[0, t_max]`.
pub fn trajectory(model: &GompertzGrowth, t_max: f64, n_points: usize) -> Vec<TrajectoryPoint> {
    let denom = n_points.saturating_sub(1).max(1) as f64;
    (0..n_points)
        .map(|k| {
            let t = t_max * k as f64 / denom;
            let integral = model.intensity_detailed(t);
            TrajectoryPoint {
                t,
                size: model.population_size(t),
                intensity: integral.value(),
                converged: integral.is_converged(),
                evaluations: integral.evaluations(),
                degraded: integral.degrade_reason(),
            }
        })
        .collect()
}

pub fn population_summary(
    model: &GompertzGrowth,
    tree_id: Option<&str>,
    t_max: f64,
    n_points: usize,
) -> PopulationSummary {
    PopulationSummary {
        f0: model.f0(),
        b: model.growth_rate(),
        n0: model.n0(),
        n_infinity: model.n_infinity(),
        parameter_ids: model.parameter_ids(),
        proposal: tree_id.map(|id| model.up_down_proposal(id)),
        trajectory: trajectory(model, t_max, n_points),
    }
}

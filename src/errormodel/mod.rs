//! Observation error models: P(observed code | true state).
//!
//! An [`ErrorModel`] owns the cached observed × true matrix and the
//! checkpoint/dirty bookkeeping; the probabilities themselves come from an
//! [`ErrorProcess`]. A checkpoint saves the process parameters together with
//! the matrix, so a rollback restores both.

pub mod ternary;

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use ndarray::{Array2, ArrayView1, Axis};

use crate::datatype::StateCapability;
use crate::error::{ModelError, Result};
use crate::recompute::{Checkpointed, Recompute};
use crate::utils;

pub use ternary::{SiFitTernary, TernaryErrorModel};

pub const OBSERVED_AXIS: Axis = Axis(0);
pub const TRUE_AXIS: Axis = Axis(1);

/// Conditional probabilities indexed `[observed code][true state]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMatrix {
    cells: Array2<f64>,
}

impl ErrorMatrix {
    pub fn zeros(n_observed: usize, n_true: usize) -> Self {
        Self {
            cells: Array2::zeros((n_observed, n_true)),
        }
    }

    pub fn n_observed(&self) -> usize {
        self.cells.len_of(OBSERVED_AXIS)
    }

    pub fn n_true(&self) -> usize {
        self.cells.len_of(TRUE_AXIS)
    }

    pub fn get(&self, observed: usize, true_state: usize) -> Result<f64> {
        if observed >= self.n_observed() {
            return Err(ModelError::invalid_state(observed, self.n_observed()));
        }
        if true_state >= self.n_true() {
            return Err(ModelError::invalid_state(true_state, self.n_true()));
        }
        Ok(self.cells[(observed, true_state)])
    }

    fn set(&mut self, observed: usize, true_state: usize, p: f64) {
        self.cells[(observed, true_state)] = p;
    }

    /// Probabilities of one observed code across all true states.
    pub fn observed_row(&self, observed: usize) -> ArrayView1<'_, f64> {
        self.cells.index_axis(OBSERVED_AXIS, observed)
    }

    pub fn row_sums(&self) -> Vec<f64> {
        utils::row_sums(&self.cells)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.cells
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        utils::to_rows(&self.cells)
    }
}

/// The error process behind an [`ErrorModel`].
pub trait ErrorProcess {
    fn name(&self) -> &str;

    /// P(observed | true) for a concrete observed state. `t` is the branch
    /// length; processes that treat errors as instantaneous ignore it.
    /// [`ErrorModel`] checks both indices against the data type before calling.
    fn probability(&self, observed: usize, true_state: usize, t: f64) -> f64;

    fn can_handle_data_type(&self, data_type: &dyn StateCapability) -> bool;
}

#[derive(Clone)]
pub struct ErrorModel<P> {
    process: P,
    data_type: Arc<dyn StateCapability>,
    excluded_taxa: BTreeSet<String>,
    matrix: Checkpointed<ErrorMatrix>,
    stored_process: Option<P>,
}

impl<P: ErrorProcess> ErrorModel<P> {
    pub fn new(process: P, data_type: Arc<dyn StateCapability>) -> Result<Self> {
        if !process.can_handle_data_type(data_type.as_ref()) {
            return Err(ModelError::config(format!(
                "error model {} cannot handle data type {}",
                process.name(),
                data_type.description()
            )));
        }
        Ok(Self {
            process,
            data_type,
            excluded_taxa: BTreeSet::new(),
            matrix: Checkpointed::new(),
            stored_process: None,
        })
    }

    pub fn with_excluded_taxa<I, S>(mut self, taxa: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_taxa = taxa.into_iter().map(Into::into).collect();
        self
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    /// Mutates the process parameters and marks the cached matrix stale.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut P) -> R) -> R {
        let out = f(&mut self.process);
        self.matrix.tracker_mut().notify_changed();
        out
    }

    pub fn data_type(&self) -> &dyn StateCapability {
        self.data_type.as_ref()
    }

    pub fn excluded_taxa(&self) -> &BTreeSet<String> {
        &self.excluded_taxa
    }

    pub fn is_excluded(&self, taxon: &str) -> bool {
        self.excluded_taxa.contains(taxon)
    }

    /// Observed codes past the concrete states are ambiguity codes; their
    /// probability is the state-set membership.
    pub fn probability(&self, observed: usize, true_state: usize, t: f64) -> Result<f64> {
        self.check_true_state(true_state)?;
        if observed < self.data_type.state_count() {
            Ok(self.process.probability(observed, true_state, t))
        } else {
            self.state_partial(observed, true_state)
        }
    }

    pub fn probabilities(&self, observed: usize, t: f64) -> Result<Vec<f64>> {
        (0..self.data_type.state_count())
            .map(|s| self.probability(observed, s, t))
            .collect()
    }

    /// 1.0 if `true_state` is in the ambiguity set of `observed`, ignoring errors.
    pub fn state_partial(&self, observed: usize, true_state: usize) -> Result<f64> {
        self.check_true_state(true_state)?;
        let set = self.data_type.state_set(observed).ok_or_else(|| {
            ModelError::invalid_state(observed, self.data_type.observed_code_count())
        })?;
        Ok(if set[true_state] { 1.0 } else { 0.0 })
    }

    pub fn state_partials(&self, observed: usize) -> Result<Vec<f64>> {
        (0..self.data_type.state_count())
            .map(|s| self.state_partial(observed, s))
            .collect()
    }

    fn check_true_state(&self, true_state: usize) -> Result<()> {
        let count = self.data_type.state_count();
        if true_state >= count {
            return Err(ModelError::invalid_state(true_state, count));
        }
        Ok(())
    }

    /// Allocates the matrix on first use, otherwise overwrites every cell.
    pub fn setup_error_matrix(&mut self) -> &ErrorMatrix {
        self.refresh(true)
    }

    /// The cached matrix, rebuilt first if any parameter changed.
    pub fn error_matrix(&mut self) -> &ErrorMatrix {
        self.refresh(false)
    }

    fn refresh(&mut self, force: bool) -> &ErrorMatrix {
        let n_observed = self.data_type.observed_code_count();
        let n_true = self.data_type.state_count();
        if force || self.matrix.needs_rebuild() {
            debug!(
                "rebuilding {} error matrix ({n_observed}x{n_true}, shared with checkpoint: {})",
                self.process.name(),
                self.matrix.shares_storage_with_checkpoint()
            );
        }
        let Self {
            process,
            data_type,
            matrix,
            ..
        } = self;
        let allocate = || ErrorMatrix::zeros(n_observed, n_true);
        let fill = |m: &mut ErrorMatrix| {
            for true_state in 0..n_true {
                for observed in 0..n_observed {
                    // rows are observed codes, columns are true states
                    let p = if observed < n_true {
                        process.probability(observed, true_state, 0.0)
                    } else if data_type
                        .state_set(observed)
                        .is_some_and(|set| set[true_state])
                    {
                        1.0
                    } else {
                        0.0
                    };
                    m.set(observed, true_state, p);
                }
            }
        };
        if force {
            matrix.rebuild(allocate, fill)
        } else {
            matrix.get_or_rebuild(allocate, fill)
        }
    }

    /// True when the matrix must be rebuilt before the next query.
    pub fn update_flag(&self) -> bool {
        self.matrix.is_dirty()
    }

    pub fn set_update_flag(&mut self, status: bool) {
        if status {
            self.matrix.tracker_mut().notify_changed();
        } else {
            self.matrix.tracker_mut().mark_built();
        }
    }
}

impl<P: Clone> Recompute for ErrorModel<P> {
    fn notify_changed(&mut self) -> bool {
        self.matrix.tracker_mut().notify_changed()
    }

    fn is_dirty(&self) -> bool {
        self.matrix.tracker().is_dirty()
    }

    fn checkpoint(&mut self) {
        self.stored_process = Some(self.process.clone());
        self.matrix.checkpoint();
    }

    fn rollback(&mut self) {
        if let Some(process) = &self.stored_process {
            self.process = process.clone();
        }
        self.matrix.rollback();
    }
}

//! GT16 diploid substitution model (CellPhy).
//!
//! The 16 states are ordered genotypes `first * 4 + second` over A, C, G, T.
//! A single event changes one allele slot, at the exchange rate of the two
//! nucleotides involved.

use log::{debug, warn};
use ndarray::Array2;

use crate::datatype::{DataTypeKind, StateCapability};
use crate::error::{ModelError, Result};
use crate::io::params::Gt16Config;
use crate::parameter::RealParameter;
use crate::recompute::{Checkpointed, Recompute};

pub const N_BASES: usize = 4;
pub const N_GENOTYPES: usize = N_BASES * N_BASES;

pub fn genotype(first: usize, second: usize) -> usize {
    first * N_BASES + second
}

pub fn alleles(genotype: usize) -> (usize, usize) {
    (genotype / N_BASES, genotype % N_BASES)
}

/// Symmetric nucleotide exchange rates.
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    pub ac: RealParameter,
    pub ag: RealParameter,
    pub at: RealParameter,
    pub cg: RealParameter,
    pub ct: RealParameter,
    pub gt: RealParameter,
}

impl ExchangeRates {
    pub fn new(ac: f64, ag: f64, at: f64, cg: f64, ct: f64, gt: f64) -> Self {
        Self {
            ac: RealParameter::new("rateAC", ac),
            ag: RealParameter::new("rateAG", ag),
            at: RealParameter::new("rateAT", at),
            cg: RealParameter::new("rateCG", cg),
            ct: RealParameter::new("rateCT", ct),
            gt: RealParameter::new("rateGT", gt),
        }
    }

    pub fn uniform(rate: f64) -> Self {
        Self::new(rate, rate, rate, rate, rate, rate)
    }

    fn slot(&self, a: usize, b: usize) -> Option<&RealParameter> {
        match (a.min(b), a.max(b)) {
            (0, 1) => Some(&self.ac),
            (0, 2) => Some(&self.ag),
            (0, 3) => Some(&self.at),
            (1, 2) => Some(&self.cg),
            (1, 3) => Some(&self.ct),
            (2, 3) => Some(&self.gt),
            _ => None,
        }
    }

    fn slot_mut(&mut self, a: usize, b: usize) -> Option<&mut RealParameter> {
        match (a.min(b), a.max(b)) {
            (0, 1) => Some(&mut self.ac),
            (0, 2) => Some(&mut self.ag),
            (0, 3) => Some(&mut self.at),
            (1, 2) => Some(&mut self.cg),
            (1, 3) => Some(&mut self.ct),
            (2, 3) => Some(&mut self.gt),
            _ => None,
        }
    }

    /// Rate between two nucleotides, by unordered pair; 0 for identical bases.
    pub fn rate(&self, a: usize, b: usize) -> f64 {
        self.slot(a, b).map_or(0.0, RealParameter::value)
    }

    pub fn parameters(&self) -> [&RealParameter; 6] {
        [&self.ac, &self.ag, &self.at, &self.cg, &self.ct, &self.gt]
    }
}

/// Stationary genotype frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequencies {
    values: Vec<f64>,
}

impl Frequencies {
    pub fn uniform(n: usize) -> Self {
        Self {
            values: vec![1.0 / n as f64; n],
        }
    }

    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ModelError::config("frequencies are empty"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ModelError::config(format!(
                "frequencies must be finite and non-negative, got {bad}"
            )));
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ModelError::config(format!(
                "frequencies must sum to 1, got {sum}"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Gt16Model {
    rates: ExchangeRates,
    frequencies: Frequencies,
    matrix: Checkpointed<Array2<f64>>,
    stored_parameters: Option<(ExchangeRates, Frequencies)>,
}

impl Gt16Model {
    pub fn new(rates: ExchangeRates, frequencies: Frequencies) -> Result<Self> {
        check_frequency_count(&frequencies)?;
        Ok(Self {
            rates,
            frequencies,
            matrix: Checkpointed::new(),
            stored_parameters: None,
        })
    }

    /// Builds the model from the individual rates. The aggregate `rates`
    /// parameterization is rejected.
    pub fn from_config(config: &Gt16Config) -> Result<Self> {
        if config.rates.is_some() {
            return Err(ModelError::config(
                "the `rates` field should not be used, use the individual rates rate_ac, rate_cg, etc. instead",
            ));
        }
        let rates = ExchangeRates::new(
            config.rate_ac,
            config.rate_ag,
            config.rate_at,
            config.rate_cg,
            config.rate_ct,
            config.rate_gt,
        );
        let frequencies = match &config.frequencies {
            Some(f) => Frequencies::new(f.clone())?,
            None => Frequencies::uniform(N_GENOTYPES),
        };
        Self::new(rates, frequencies)
    }

    pub fn state_count(&self) -> usize {
        N_GENOTYPES
    }

    pub fn can_handle_data_type(data_type: &dyn StateCapability) -> bool {
        data_type.kind() == DataTypeKind::NucleotideDiploid16
    }

    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    pub fn frequencies(&self) -> &Frequencies {
        &self.frequencies
    }

    pub fn set_rate(&mut self, a: usize, b: usize, value: f64) -> Result<()> {
        let slot = self
            .rates
            .slot_mut(a, b)
            .ok_or_else(|| ModelError::config(format!("no exchange rate between bases {a} and {b}")))?;
        slot.set_value(0, value)?;
        self.notify_changed();
        Ok(())
    }

    pub fn set_frequencies(&mut self, frequencies: Frequencies) -> Result<()> {
        check_frequency_count(&frequencies)?;
        self.frequencies = frequencies;
        self.notify_changed();
        Ok(())
    }

    /// Generator before normalization: rows sum to zero.
    pub fn raw_rate_matrix(&self) -> Array2<f64> {
        let mut q = Array2::zeros((N_GENOTYPES, N_GENOTYPES));
        fill_unnormalized(&self.rates, &mut q);
        q
    }

    /// Σ freq[i] · (−Q[i][i]), the expected rate of change.
    pub fn normalization_factor(q: &Array2<f64>, frequencies: &[f64]) -> f64 {
        frequencies
            .iter()
            .enumerate()
            .map(|(i, f)| f * -q[(i, i)])
            .sum()
    }

    /// The normalized generator, rebuilt first if stale.
    pub fn rate_matrix(&mut self) -> &Array2<f64> {
        self.refresh(false)
    }

    pub fn setup_rate_matrix(&mut self) -> &Array2<f64> {
        self.refresh(true)
    }

    fn refresh(&mut self, force: bool) -> &Array2<f64> {
        if force || self.matrix.needs_rebuild() {
            debug!(
                "rebuilding GT16 rate matrix (shared with checkpoint: {})",
                self.matrix.shares_storage_with_checkpoint()
            );
        }
        let Self {
            rates,
            frequencies,
            matrix,
            ..
        } = self;
        let allocate = || Array2::zeros((N_GENOTYPES, N_GENOTYPES));
        let fill = |q: &mut Array2<f64>| {
            fill_unnormalized(rates, q);
            normalize(q, frequencies.values());
        };
        if force {
            matrix.rebuild(allocate, fill)
        } else {
            matrix.get_or_rebuild(allocate, fill)
        }
    }
}

impl Recompute for Gt16Model {
    fn notify_changed(&mut self) -> bool {
        self.matrix.notify_changed()
    }

    fn is_dirty(&self) -> bool {
        self.matrix.is_dirty()
    }

    fn checkpoint(&mut self) {
        self.stored_parameters = Some((self.rates.clone(), self.frequencies.clone()));
        self.matrix.checkpoint();
    }

    fn rollback(&mut self) {
        if let Some((rates, frequencies)) = &self.stored_parameters {
            self.rates = rates.clone();
            self.frequencies = frequencies.clone();
        }
        self.matrix.rollback();
    }
}

fn check_frequency_count(frequencies: &Frequencies) -> Result<()> {
    if frequencies.len() != N_GENOTYPES {
        return Err(ModelError::config(format!(
            "GT16 needs {N_GENOTYPES} frequencies, got {}",
            frequencies.len()
        )));
    }
    Ok(())
}

fn fill_unnormalized(rates: &ExchangeRates, q: &mut Array2<f64>) {
    for i in 0..N_GENOTYPES {
        let (from_first, from_second) = alleles(i);
        for j in 0..N_GENOTYPES {
            let (to_first, to_second) = alleles(j);
            q[(i, j)] = if i == j {
                0.0
            } else if from_first == to_first {
                rates.rate(from_second, to_second)
            } else if from_second == to_second {
                rates.rate(from_first, to_first)
            } else {
                // two allele changes are not reachable in one event
                0.0
            };
        }
    }
    for i in 0..N_GENOTYPES {
        let off_diagonal: f64 = (0..N_GENOTYPES).filter(|j| *j != i).map(|j| q[(i, j)]).sum();
        q[(i, i)] = -off_diagonal;
    }
}

fn normalize(q: &mut Array2<f64>, frequencies: &[f64]) {
    let f = Gt16Model::normalization_factor(q, frequencies);
    if f <= 0.0 || !f.is_finite() {
        warn!("GT16 expected rate is {f}; leaving the rate matrix unnormalized");
        return;
    }
    q.mapv_inplace(|v| v / f);
}

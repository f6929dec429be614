use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TernaryErrorConfig {
    pub alpha: f64,
    pub beta: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gt16Config {
    pub rate_ac: f64,
    pub rate_ag: f64,
    pub rate_at: f64,
    pub rate_cg: f64,
    pub rate_ct: f64,
    pub rate_gt: f64,
    /// Aggregate rate vector. GT16 takes the six individual rates only; a
    /// value here is a configuration error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequencies: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GompertzConfig {
    pub f0: f64,
    pub b: f64,
    pub n0: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_evaluations: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParamsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_model: Option<TernaryErrorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Gt16Config>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<GompertzConfig>,
}

pub fn save_params(path: &Path, params: &ModelParamsFile) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, params)
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

pub fn load_params(path: &Path) -> Result<ModelParamsFile> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let reader = BufReader::new(file);
    let params =
        serde_json::from_reader(reader).with_context(|| format!("failed to parse {:?}", path))?;
    Ok(params)
}

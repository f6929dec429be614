use serde::Serialize;

pub const DEFAULT_SCALE_FACTOR: f64 = 0.75;
pub const DEFAULT_WEIGHT: f64 = 3.0;

/// A paired scale move: every parameter in `up` is scaled by one factor and
/// every parameter in `down` by its inverse. Built here, executed by the
/// sampler's operator machinery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpDownProposal {
    pub id: String,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub scale_factor: f64,
    pub weight: f64,
}

impl UpDownProposal {
    pub fn new(model_id: &str, tree_id: &str, up: Vec<String>) -> Self {
        Self {
            id: format!("{model_id}Up{tree_id}DownOperator"),
            up,
            down: vec![tree_id.to_string()],
            scale_factor: DEFAULT_SCALE_FACTOR,
            weight: DEFAULT_WEIGHT,
        }
    }
}

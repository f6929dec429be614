pub mod datatype;
pub mod error;
pub mod errormodel;
pub mod io;
pub mod parameter;
pub mod population;
pub mod proposal;
pub mod quadrature;
pub mod recompute;
pub mod report;
pub mod substitution;
pub mod utils;

pub use error::{ModelError, Result};
pub use errormodel::{ErrorModel, TernaryErrorModel};
pub use population::{GompertzGrowth, PopulationFunction};
pub use recompute::Recompute;
pub use substitution::Gt16Model;

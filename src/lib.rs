//! Conditional probability tables for exact inference over discrete Bayesian networks.
//!
//! A `Factor` stores the CPT of one variable as a flat array addressed through per-variable
//! strides, and provides the operations variable elimination is built from: product, sum- and
//! max-marginalization, evidence reduction, normalization and log-space conversion.

pub mod config;
pub mod factor;
pub mod init;
pub mod network;
pub mod util;
pub mod variable;

pub use config::FactorConfig;
pub use factor::{Factor, Table};
pub use init::Initialization;
pub use network::{BayesNet, BayesNetBuilder, Network};
pub use util::{FactorError, Result};
pub use variable::{all_assignments, Assignment, Variable};

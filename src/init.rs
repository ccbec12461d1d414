//! Module containing initialization routines for the conditional probability tables of a network.

use crate::factor::Table;
use crate::util::{FactorError, Result};
use crate::variable::Variable;

use ndarray::prelude as nd;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Defines possible ways to initialize a `Variable`s CPD.
#[derive(Clone, Debug)]
pub enum Initialization {
    /// A uniform distribution over the values of the `Variable`, for every parent assignment
    Uniform,

    /// Randomly initialize the weights of the CPD.
    Random,

    /// Randomly initialize the weights of the CPD from a seeded generator, so the table is
    /// reproducible
    Seeded(u64),

    /// Initialize the CPD as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only for a `Variable` with no parents.
    Multinomial(Vec<f64>),

    /// User defined CPD, flattened with the `Variable` varying fastest and the parents following
    /// in declaration order
    Table(Vec<f64>)
}


impl Initialization {

    /// Construct the flattened CPD of `var` given `parents`
    ///
    /// # Returns
    /// the table, laid out with `var` varying fastest
    ///
    /// # Errors
    /// * `FactorError::InvalidInitialization` for a multinomial on a variable with parents, or
    ///   with the wrong number of parameters
    /// * `FactorError::ShapeMismatch` if a user defined table has the wrong length
    pub fn build_table(&self, var: &Variable, parents: &[Variable]) -> Result<Table> {
        let card = var.cardinality();
        let len = parents.iter().fold(card, |acc, p| acc * p.cardinality());

        let tbl = match self {
            Initialization::Uniform => {
                nd::Array1::from_elem(len, 1. / (card as f64))
            },
            Initialization::Random => {
                normalized_blocks(nd::Array1::random(len, Uniform::new(1.0, 100.0)), card)
            },
            Initialization::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(*seed);
                normalized_blocks(nd::Array1::random_using(len, Uniform::new(1.0, 100.0), &mut rng), card)
            },
            Initialization::Multinomial(p) => {
                if !parents.is_empty() || p.len() != card {
                    return Err(FactorError::InvalidInitialization);
                }
                nd::Array1::from(p.clone())
            },
            Initialization::Table(values) => {
                if values.len() != len {
                    return Err(FactorError::ShapeMismatch { expected: len, got: values.len() });
                }
                nd::Array1::from(values.clone())
            }
        };

        Ok(tbl)
    }
}

/// Scale each consecutive block of `card` entries to sum to one
fn normalized_blocks(mut tbl: Table, card: usize) -> Table {
    for mut block in tbl.exact_chunks_mut(card) {
        let z = block.sum();
        block.mapv_inplace(|e| e / z);
    }

    tbl
}

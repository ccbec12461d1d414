//! Definition of the factor module
//!
//! A `Factor` holds the conditional probability table of one `Variable` given its parents. The
//! table is a flat array indexed by a mixed-radix encoding: the entry for a joint assignment lives
//! at ```sum(value_index[v] * stride[v] for v in scope)```.
//!
//! Every operation mutates the `Factor` in place and keeps the table, scope, cardinalities and
//! strides consistent with each other. The scope is held in ascending stride order, so the first
//! `Variable` of the scope varies fastest in the table and is the main variable of the `Factor`.

use crate::config::FactorConfig;
use crate::network::Network;
use crate::util::{round_to, FactorError, Result};
use crate::variable::{all_assignments, Assignment, Assignments, Variable};

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::prelude as nd;
use ndarray::s;
use tracing::{debug, warn};

use std::collections::HashSet;
use std::fmt;

/// Alias f64 ndarray::Array1 as Table
pub type Table = nd::Array1<f64>;


/// One variable of a `Factor`'s scope and its position in the flat table
#[derive(Clone, Debug, PartialEq)]
struct Axis {
    variable: Variable,

    /// Number of table positions between successive values of `variable`
    stride: usize
}


/// A table factor over a set of discrete `Variable`s.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`, keyed by variable name, in ascending stride order
    scope: IndexMap<String, Axis>,

    /// The values of the `Factor` table
    table: Table,

    /// Rounding and tie-break settings
    config: FactorConfig
}


impl Factor {

    /// Create the `Factor` for the conditional distribution of `var` given `parents`.
    ///
    /// The table must be laid out with `var` varying fastest, followed by the parents in the order
    /// given. `var` gets stride 1 and each parent gets the stride of the previous variable times
    /// that variable's cardinality.
    ///
    /// # Errors
    /// * `FactorError::ShapeMismatch` if the table length is not the product of the cardinalities
    /// * `FactorError::DuplicateVariable` if a variable appears twice
    /// * `FactorError::NegativeProbability` if the table holds a negative (or NaN) entry
    pub fn new(var: &Variable, parents: &[Variable], table: Table) -> Result<Self> {
        let scope = Some(var).into_iter().chain(parents.iter()).cloned().collect();
        Factor::from_parts(scope, table)
    }


    /// Create a `Factor` over an arbitrary ordered scope. The first `Variable` varies fastest and
    /// is the main variable.
    pub fn from_parts(scope: Vec<Variable>, table: Table) -> Result<Self> {
        if scope.is_empty() {
            return Err(FactorError::InvalidScope(String::from("a factor needs at least one variable")));
        }

        let mut axes = IndexMap::with_capacity(scope.len());
        let mut stride = 1;
        for variable in scope {
            let name = String::from(variable.name());
            if axes.contains_key(&name) {
                return Err(FactorError::DuplicateVariable(name));
            }

            let card = variable.cardinality();
            axes.insert(name, Axis { variable, stride });
            stride *= card;
        }

        if table.len() != stride {
            return Err(FactorError::ShapeMismatch { expected: stride, got: table.len() });
        }

        // factors may not have negative values
        if table.iter().any(|v| v.is_nan() || *v < 0.0) {
            return Err(FactorError::NegativeProbability);
        }

        let factor = Factor { scope: axes, table, config: FactorConfig::default() };
        debug!(factor = %factor, len = factor.table.len(), "constructed factor");

        Ok(factor)
    }


    /// Build the `Factor` of the named variable from the CPT held by `net`
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if `net` does not define `name`
    /// * `FactorError::MissingParent` if a parent of `name` is not defined by `net`
    /// * any error of `Factor::new`
    pub fn from_network<N: Network + ?Sized>(net: &N, name: &str) -> Result<Self> {
        let unknown = || FactorError::UnknownVariable(String::from(name));

        let var = net.variable(name).ok_or_else(unknown)?;
        let parents = net.parents(name)
                         .ok_or_else(unknown)?
                         .iter()
                         .map(|p| net.variable(p).cloned().ok_or_else(|| FactorError::MissingParent(p.clone())))
                         .collect::<Result<Vec<Variable>>>()?;
        let cpt = net.cpt(name).ok_or_else(unknown)?;

        Factor::new(var, &parents, cpt.clone())
    }


    /// The `Factor` of all ones over `var`. Multiplying by it adds `var` to a scope without
    /// changing any value.
    pub fn unit(var: &Variable) -> Self {
        let mut scope = IndexMap::with_capacity(1);
        scope.insert(String::from(var.name()), Axis { variable: var.clone(), stride: 1 });

        Factor {
            scope,
            table: Table::ones(var.cardinality()),
            config: FactorConfig::default()
        }
    }


    /// Replace the rounding and tie-break settings of this `Factor`
    pub fn with_config(mut self, config: FactorConfig) -> Self {
        self.config = config;
        self
    }


    pub fn config(&self) -> &FactorConfig {
        &self.config
    }


    /// The names of the `Variable`s in the scope, fastest varying first
    pub fn scope(&self) -> Vec<&str> {
        self.scope.keys().map(|k| k.as_str()).collect()
    }


    /// The `Variable`s in the scope, fastest varying first
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.scope.values().map(|a| &a.variable)
    }


    /// The variable this `Factor` is a distribution over - the unique `Variable` with stride 1.
    /// `None` once every variable has been removed from the scope.
    pub fn main_variable(&self) -> Option<&str> {
        self.scope.keys().next().map(|k| k.as_str())
    }


    /// The conditioning variables: the scope without the main variable
    pub fn parents(&self) -> Vec<&str> {
        self.scope.keys().skip(1).map(|k| k.as_str()).collect()
    }


    pub fn contains(&self, name: &str) -> bool {
        self.scope.contains_key(name)
    }


    pub fn cardinality(&self, name: &str) -> Option<usize> {
        self.scope.get(name).map(|a| a.variable.cardinality())
    }


    pub fn stride(&self, name: &str) -> Option<usize> {
        self.scope.get(name).map(|a| a.stride)
    }


    /// The flat table of the `Factor`
    pub fn table(&self) -> &Table {
        &self.table
    }


    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }


    /// `true` when the scope is empty and the table holds a single scalar
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`. The assignment
    /// may assign variables outside the scope; they are ignored.
    ///
    /// # Errors
    /// * `FactorError::IncompleteAssignment` naming the scope variables the assignment lacks
    /// * `FactorError::UnknownValue` if an assigned index is out of range for its variable
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let mut idx = 0;
        let mut missing = Vec::new();

        for (name, axis) in &self.scope {
            match assignment.get(name) {
                Some(v) if v < axis.variable.cardinality() => idx += v * axis.stride,
                Some(v) => {
                    return Err(FactorError::UnknownValue { variable: name.clone(), value: v.to_string() });
                },
                None => missing.push(name.clone())
            }
        }

        if !missing.is_empty() {
            return Err(FactorError::IncompleteAssignment(missing));
        }

        Ok(self.table[idx])
    }


    /// Every joint assignment of the scope, in table order
    pub fn assignments(&self) -> Assignments {
        let vars: Vec<Variable> = self.variables().cloned().collect();
        all_assignments(&vars)
    }


    /// Check that the strides form a mixed-radix layout of the table in scope order: the first
    /// variable has stride 1, every later stride is the previous stride times the previous
    /// cardinality, and the table length is the product of all cardinalities.
    pub fn validate(&self) -> Result<()> {
        let mut expected = 1;
        for (name, axis) in &self.scope {
            if axis.stride != expected {
                return Err(FactorError::InvalidScope(
                    format!("'{}' has stride {}, expected {}", name, axis.stride, expected)
                ));
            }
            expected *= axis.variable.cardinality();
        }

        if expected != self.table.len() {
            return Err(FactorError::ShapeMismatch { expected, got: self.table.len() });
        }

        Ok(())
    }


    /// Product of this `Factor` and another `Factor`, stored in `self`.
    ///
    /// The scope becomes the union of both scopes. The factor with the larger scope drives the
    /// enumeration (`self` on a tie): its variables come first in stride order, followed by the
    /// variables only the other factor has. Both source tables are walked with a single odometer
    /// over that order, and each output entry is rounded to `product_precision` places. The result
    /// is not normalized.
    ///
    /// Defined in Koller & Friedman Section 4.2.1, Algorithm 10.A.1
    ///
    /// # Errors
    /// * `FactorError::CardinalityConflict` if the factors disagree on the cardinality of a shared
    ///   variable. `self` is unchanged.
    pub fn multiply(&mut self, other: &Factor) -> Result<()> {
        let places = self.config.product_precision;

        let (scope, table) = {
            let (driver, secondary) = if self.scope.len() >= other.scope.len() {
                (&*self, other)
            } else {
                (other, &*self)
            };

            // enumeration order over union(driver, secondary)
            let mut order: Vec<&Variable> = driver.variables().collect();
            for (name, axis) in &secondary.scope {
                match driver.scope.get(name) {
                    Some(d) if d.variable.cardinality() != axis.variable.cardinality() => {
                        return Err(FactorError::CardinalityConflict {
                            variable: name.clone(),
                            left: d.variable.cardinality(),
                            right: axis.variable.cardinality()
                        });
                    },
                    Some(_) => (),
                    None => order.push(&axis.variable)
                }
            }

            // (cardinality, stride in driver, stride in secondary). A variable missing from a
            // source has stride 0 there, so it never moves that source's position.
            let wheels: Vec<(usize, usize, usize)> = order.iter()
                .map(|v| (
                    v.cardinality(),
                    driver.stride(v.name()).unwrap_or(0),
                    secondary.stride(v.name()).unwrap_or(0)
                ))
                .collect();

            let len: usize = wheels.iter().map(|w| w.0).product();
            let mut psi = Table::zeros(len);
            let mut counter = vec![0; wheels.len()];
            let (mut j, mut k) = (0, 0);

            for entry in psi.iter_mut() {
                *entry = round_to(driver.table[j] * secondary.table[k], places);

                for (c, &(card, sj, sk)) in counter.iter_mut().zip(wheels.iter()) {
                    *c += 1;
                    if *c == card {
                        *c = 0;
                        j -= (card - 1) * sj;
                        k -= (card - 1) * sk;
                    } else {
                        j += sj;
                        k += sk;
                        break;
                    }
                }
            }

            let mut scope = IndexMap::with_capacity(order.len());
            let mut stride = 1;
            for v in order {
                scope.insert(String::from(v.name()), Axis { variable: v.clone(), stride });
                stride *= v.cardinality();
            }

            (scope, psi)
        };

        self.scope = scope;
        self.table = table;
        debug_assert!(self.validate().is_ok());
        debug!(factor = %self, len = self.table.len(), "multiplied factors");

        Ok(())
    }


    /// Non-mutating form of `multiply`
    pub fn product(&self, other: &Factor) -> Result<Self> {
        let mut psi = self.clone();
        psi.multiply(other)?;
        Ok(psi)
    }


    /// Collapse the `Factor` to a distribution over `name` alone by summing every other variable
    /// away, then normalize.
    ///
    /// Blocks that sum to zero after the operation are left as zeros (see `normalize`).
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if `name` is not in the scope
    pub fn sum_over_variable(&mut self, name: &str) -> Result<()> {
        let axis = self.axis(name)?.clone();
        let card = axis.variable.cardinality();
        let stride = axis.stride;

        let mut marginal = Table::zeros(card);
        for (i, m) in marginal.iter_mut().enumerate() {
            let mut idx = i * stride;
            while idx < self.table.len() {
                *m += self.table.slice(s![idx..idx + stride]).sum();
                idx += card * stride;
            }
        }

        self.scope.clear();
        self.scope.insert(String::from(name), Axis { variable: axis.variable, stride: 1 });
        self.table = marginal;
        debug!(variable = name, "summed over variable");

        self.normalize();
        Ok(())
    }


    /// Remove `name` from the scope by summing over its values, then normalize unless the scope
    /// is empty.
    ///
    /// Blocks that sum to zero after the operation are left as zeros (see `normalize`).
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if `name` is not in the scope
    pub fn sum_out_variable(&mut self, name: &str) -> Result<()> {
        self.sum_out(name)?;
        if !self.scope.is_empty() {
            self.normalize();
        }

        Ok(())
    }


    /// Sum out every variable in `names`, in the order given, normalizing once at the end. The
    /// result does not depend on the order of `names`.
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if a variable is not in the scope
    /// * `FactorError::DuplicateVariable` if a variable is named twice
    ///
    /// Both are checked before anything is summed, so on error `self` is unchanged.
    /// Blocks that sum to zero after the final normalization are left as zeros.
    pub fn sum_out_variable_list<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let names: Vec<S> = names.into_iter().collect();
        self.check_distinct(names.iter().map(|n| n.as_ref()))?;

        for name in &names {
            self.sum_out(name.as_ref())?;
        }

        if !self.scope.is_empty() {
            self.normalize();
        }

        Ok(())
    }


    /// Remove `name` from the scope by keeping, for each assignment of the other variables, the
    /// largest entry over the values of `name`. Used for MAP inference (Koller & Friedman
    /// Algorithm 13.1).
    ///
    /// Every entry is biased by `config().max_epsilon` before the scan, and the biased maximum is
    /// what the table keeps. Ties resolve to the lowest value index. Normalizes afterwards unless
    /// the scope is empty.
    ///
    /// Blocks that sum to zero after the operation are left as zeros (see `normalize`).
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if `name` is not in the scope
    pub fn max_out_variable(&mut self, name: &str) -> Result<()> {
        let (card, stride) = self.shape_of(name)?;
        let eps = self.config.max_epsilon;

        let maxed = {
            let table = &self.table;
            collapse_axis(table.len(), card, stride, |positions| {
                positions.map(|i| table[i] + eps).fold(f64::NEG_INFINITY, f64::max)
            })
        };

        self.table = maxed;
        self.remove_axis(name);
        debug!(variable = name, len = self.table.len(), "maxed out variable");

        if !self.scope.is_empty() {
            self.normalize();
        }

        Ok(())
    }


    /// Condition the `Factor` on ```name = value``` and remove `name` from the scope, then
    /// normalize unless the scope is empty.
    ///
    /// Defined in Koller & Friedman 4.2.3
    ///
    /// Blocks that sum to zero after the operation are left as zeros (see `normalize`).
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if `name` is not in the scope
    /// * `FactorError::UnknownValue` if `value` is not a value of `name`
    pub fn reduce_factor(&mut self, name: &str, value: &str) -> Result<()> {
        self.reduce_factor_by_list(Some((name, value)))
    }


    /// Condition the `Factor` on every `(variable, value)` pair of `evidence`, in the order given.
    /// Each pair is applied exactly as `reduce_factor` would apply it, normalizing after every
    /// pair unless the scope is empty, so the order of `evidence` matters once the main variable
    /// is reduced.
    ///
    /// # Errors
    /// * `FactorError::UnknownVariable` if a variable is not in the scope
    /// * `FactorError::UnknownValue` if a value is not in its variable's value set
    /// * `FactorError::DuplicateVariable` if a variable appears twice in `evidence`
    ///
    /// All pairs are resolved before the table is touched, so on error `self` is unchanged.
    /// Evidence that is impossible in some context leaves that block as zeros (see `normalize`).
    pub fn reduce_factor_by_list<I, K, V>(&mut self, evidence: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>
    {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for (name, value) in evidence {
            let name = name.as_ref();
            let idx = self.axis(name)?.variable.value_index(value.as_ref())?;
            if !seen.insert(String::from(name)) {
                return Err(FactorError::DuplicateVariable(String::from(name)));
            }

            resolved.push((String::from(name), idx));
        }

        for (name, idx) in &resolved {
            self.slice_out(name, *idx)?;
            if !self.scope.is_empty() {
                self.normalize();
            }
        }

        Ok(())
    }


    /// Normalize the distribution of the main variable: every consecutive block of
    /// ```cardinality(main)``` entries is divided by its sum and rounded to
    /// `normalize_precision` places.
    ///
    /// A block summing to zero (e.g. impossible evidence) has nothing to normalize against. It is
    /// left as zeros rather than filled with NaN. The operations that normalize internally do the
    /// same and report such blocks only through a `warn!` event. Calling `normalize` again on
    /// their result returns the count.
    ///
    /// # Returns
    /// the number of zero-sum blocks encountered
    pub fn normalize(&mut self) -> usize {
        let (name, card) = match self.scope.iter().find(|(_, a)| a.stride == 1) {
            Some((name, axis)) => (name.clone(), axis.variable.cardinality()),
            None => return 0
        };

        let places = self.config.normalize_precision;
        let mut degenerate = 0;

        for mut block in self.table.exact_chunks_mut(card) {
            let z = block.sum();
            if z == 0.0 {
                degenerate += 1;
                continue;
            }

            block.mapv_inplace(|e| round_to(e / z, places));
        }

        if degenerate > 0 {
            warn!(variable = %name, blocks = degenerate, "normalization found blocks summing to zero");
        }

        degenerate
    }


    /// Convert the table to log space. Zero entries become negative infinity.
    pub fn to_log(&mut self) {
        let places = self.config.log_precision;
        self.table.mapv_inplace(|e| round_to(e.ln(), places));
    }


    /// Convert the table from log space back to probabilities
    pub fn from_log(&mut self) {
        let places = self.config.log_precision;
        self.table.mapv_inplace(|e| round_to(e.exp(), places));
    }


    fn axis(&self, name: &str) -> Result<&Axis> {
        self.scope.get(name).ok_or_else(|| FactorError::UnknownVariable(String::from(name)))
    }


    /// (cardinality, stride) of a scope variable
    fn shape_of(&self, name: &str) -> Result<(usize, usize)> {
        self.axis(name).map(|a| (a.variable.cardinality(), a.stride))
    }


    fn check_distinct<'a, I>(&self, names: I) -> Result<()>
    where
        I: Iterator<Item = &'a str>
    {
        let mut seen = HashSet::new();
        for name in names {
            if !self.scope.contains_key(name) {
                return Err(FactorError::UnknownVariable(String::from(name)));
            } else if !seen.insert(name) {
                return Err(FactorError::DuplicateVariable(String::from(name)));
            }
        }

        Ok(())
    }


    /// Sum `name` out of the table without normalizing
    fn sum_out(&mut self, name: &str) -> Result<()> {
        let (card, stride) = self.shape_of(name)?;

        let summed = {
            let table = &self.table;
            collapse_axis(table.len(), card, stride, |positions| positions.map(|i| table[i]).sum())
        };

        self.table = summed;
        self.remove_axis(name);
        debug!(variable = name, len = self.table.len(), "summed out variable");

        Ok(())
    }


    /// Keep only the runs of the table where `name` takes the value at `idx`, without normalizing
    fn slice_out(&mut self, name: &str, idx: usize) -> Result<()> {
        let (card, stride) = self.shape_of(name)?;

        let mut kept: Vec<f64> = Vec::with_capacity(self.table.len() / card);
        let mut pos = idx * stride;
        while pos < self.table.len() {
            kept.extend(self.table.slice(s![pos..pos + stride]).iter());
            pos += card * stride;
        }

        self.table = Table::from(kept);
        self.remove_axis(name);
        debug!(variable = name, value = idx, len = self.table.len(), "reduced factor");

        Ok(())
    }


    /// Drop `name` from the scope. Variables above it in the layout lose a factor of its
    /// cardinality from their strides; variables below it keep theirs.
    fn remove_axis(&mut self, name: &str) {
        if let Some(removed) = self.scope.shift_remove(name) {
            let card = removed.variable.cardinality();
            for axis in self.scope.values_mut() {
                if axis.stride > removed.stride {
                    axis.stride /= card;
                }
            }
        }

        debug_assert!(self.validate().is_ok());
    }
}


/// Build the table left when an axis of `card` values at `stride` is folded away from a table of
/// `len` entries. `fold` receives the positions of the `card` entries behind each output entry.
fn collapse_axis<F>(len: usize, card: usize, stride: usize, mut fold: F) -> Table
where
    F: FnMut(&mut dyn Iterator<Item = usize>) -> f64
{
    nd::Array1::from_shape_fn(len / card, |i| {
        let base = (i / stride) * stride * card + i % stride;
        fold(&mut (0..card).map(move |c| base + c * stride))
    })
}


impl fmt::Display for Factor {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.main_variable() {
            Some(main) => write!(f, "{} | {}", main, self.parents().iter().join(", ")),
            None => write!(f, "<scalar>")
        }
    }

}

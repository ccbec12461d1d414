//! Defines the contract between a `Factor` and the Bayesian network it is built from, and a small
//! in-memory `BayesNet` that satisfies it.

use crate::factor::{Factor, Table};
use crate::init::Initialization;
use crate::util::{FactorError, Result};
use crate::variable::Variable;

use indexmap::IndexMap;
use tracing::debug;


/// The view of a Bayesian network that a `Factor` needs at construction: a variable's value set,
/// its parents in declaration order, and its flattened CPT (child varying fastest).
pub trait Network {

    /// Look up a `Variable` by name
    fn variable(&self, name: &str) -> Option<&Variable>;

    /// The parents of the named `Variable`, in declaration order
    fn parents(&self, name: &str) -> Option<&[String]>;

    /// The flattened CPT of the named `Variable`
    fn cpt(&self, name: &str) -> Option<&Table>;
}


struct Node {
    variable: Variable,
    parents: Vec<String>,
    cpt: Table
}


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The CPT of each `Variable` implicitly defines the edges of the graph. The `Variable`s are held
/// in the order they were added, which is a topological order.
pub struct BayesNet {
    nodes: IndexMap<String, Node>
}

impl BayesNet {

    /// The `Variable`s of the network in topological order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.nodes.values().map(|n| &n.variable)
    }

    /// Get a topological order of the network
    pub fn topological_order(&self) -> Vec<&str> {
        self.nodes.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the `Factor` of the named `Variable`
    pub fn factor(&self, name: &str) -> Result<Factor> {
        Factor::from_network(self, name)
    }

    /// Build the `Factor` of every `Variable`, in topological order
    pub fn factors(&self) -> Result<Vec<Factor>> {
        self.nodes.keys().map(|name| self.factor(name)).collect()
    }
}

impl Network for BayesNet {

    fn variable(&self, name: &str) -> Option<&Variable> {
        self.nodes.get(name).map(|n| &n.variable)
    }

    fn parents(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(|n| n.parents.as_slice())
    }

    fn cpt(&self, name: &str) -> Option<&Table> {
        self.nodes.get(name).map(|n| &n.cpt)
    }
}


/// An implementation of the [builder pattern] for creating a `BayesNet`.
///
/// Variables must be added in topological order: every parent has to be in the network before
/// its children. The first error encountered is kept and returned by `build`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct BayesNetBuilder {

    /// The `Variable`s and their CPTs
    nodes: IndexMap<String, Node>,

    /// The error state of the builder
    err: Option<FactorError>

}

impl Default for BayesNetBuilder {
    fn default() -> Self {
        BayesNetBuilder::new()
    }
}

impl BayesNetBuilder {

    /// Construct a new `BayesNetBuilder` representing an empty `BayesNet`
    pub fn new() -> Self {
        BayesNetBuilder { nodes: IndexMap::new(), err: None }
    }

    /// Add a `Variable` ```var``` to the network.
    ///
    /// # Args
    /// var: the variable to add to the model
    /// parents: the names of the parents of ```var```, which must already be in the network. Their
    /// order is the order of the CPT layout, after ```var``` itself.
    /// init: the initialization mechanism for the CPT of ```var```
    ///
    /// # Returns
    /// the builder object
    pub fn with_variable(&mut self, var: Variable, parents: &[&str], init: Initialization) -> &mut Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if self.nodes.contains_key(var.name()) {
            self.err = Some(FactorError::DuplicateVariable(String::from(var.name())));
            return self;
        }

        let mut parent_vars: Vec<Variable> = Vec::with_capacity(parents.len());
        for &p in parents {
            match self.nodes.get(p) {
                None => {
                    self.err = Some(FactorError::MissingParent(String::from(p)));
                    return self;
                },
                Some(_) if parent_vars.iter().any(|v| v.name() == p) => {
                    self.err = Some(FactorError::DuplicateVariable(String::from(p)));
                    return self;
                },
                Some(node) => parent_vars.push(node.variable.clone())
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the CPT based on the initialization
        let cpt = match init.build_table(&var, &parent_vars) {
            Ok(cpt) => cpt,
            Err(e) => {
                self.err = Some(e);
                return self;
            }
        };

        ///////////////////////////////////////////////////////////////////////
        // 4) Add to current model
        debug!(variable = var.name(), parents = parents.len(), "added variable to network");
        let parents = parents.iter().map(|&p| String::from(p)).collect();
        self.nodes.insert(String::from(var.name()), Node { variable: var, parents, cpt });

        self
    }

    /// Complete building the network.
    ///
    /// # Returns
    /// the `BayesNet`, or the first error generated during the building process
    pub fn build(self) -> Result<BayesNet> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(BayesNet { nodes: self.nodes })
        }
    }
}

//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian network, identified by its
//! name and carrying the ordered set of values it can take.

use crate::util::{FactorError, Result};

use indexmap::{IndexMap, IndexSet};

use std::fmt;


/// A discrete random variable. The position of a value in the value set is the index used for
/// that value in every `Factor` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    /// The name of the `Variable`. Names identify variables across factors.
    name: String,

    /// The values of the `Variable`, in declaration order
    values: IndexSet<String>
}

impl Variable {

    /// Construct a binary `Variable` with the values `"0"` and `"1"`
    pub fn binary(name: &str) -> Variable {
        Variable {
            name: String::from(name),
            values: (0..2).map(|i| i.to_string()).collect()
        }
    }

    /// Construct a discrete `Variable` with integer tags. The tags are `"0"` up to `count - 1`.
    pub fn discrete(name: &str, count: usize) -> Result<Variable> {
        if count == 0 {
            return Err(FactorError::InvalidCardinality(String::from(name)));
        }

        Ok(Variable {
            name: String::from(name),
            values: (0..count).map(|i| i.to_string()).collect()
        })
    }

    /// Construct a `Variable` over an enumerated set of named values
    pub fn enumerated(name: &str, values: &[&str]) -> Result<Variable> {
        let set: IndexSet<String> = values.iter().map(|s| String::from(*s)).collect();
        if set.is_empty() || set.len() != values.len() {
            return Err(FactorError::InvalidCardinality(String::from(name)));
        }

        Ok(Variable { name: String::from(name), values: set })
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of values the `Variable` can take
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    /// The values of the `Variable`, in index order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.as_str())
    }

    /// Look up the index of a named value.
    ///
    /// # Errors
    /// * `FactorError::UnknownValue` if `value` is not one of the values of this `Variable`
    pub fn value_index(&self, value: &str) -> Result<usize> {
        self.values.get_index_of(value).ok_or_else(|| FactorError::UnknownValue {
            variable: self.name.clone(),
            value: String::from(value)
        })
    }

    /// Look up the name of the value at `index`
    pub fn value_name(&self, index: usize) -> Option<&str> {
        self.values.get_index(index).map(|v| v.as_str())
    }
}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }

}


/// A (possibly partial) assignment of value indices to `Variable`s, keyed by variable name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    values: IndexMap<String, usize>
}

impl Assignment {

    /// Create an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Build an `Assignment` from named values.
    ///
    /// # Errors
    /// * `FactorError::UnknownValue` if any value is not in its variable's value set
    pub fn from_values(pairs: &[(&Variable, &str)]) -> Result<Self> {
        let mut assn = Assignment::new();
        for &(var, value) in pairs {
            assn.set(var.name(), var.value_index(value)?);
        }

        Ok(assn)
    }

    /// Assign the value index `value` to the variable `name`
    pub fn set(&mut self, name: &str, value: usize) {
        self.values.insert(String::from(name), value);
    }

    /// Get the value index assigned to the variable `name`
    pub fn get(&self, name: &str) -> Option<usize> {
        self.values.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }
}


/// An iterator over every joint `Assignment` to a list of `Variable`s. The first `Variable` varies
/// fastest, so for a factor scope the assignments come out in table order.
pub struct Assignments {
    names: Vec<String>,
    cards: Vec<usize>,
    counter: Vec<usize>,
    done: bool
}

impl Iterator for Assignments {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.done {
            return None;
        }

        let mut assn = Assignment::new();
        for (name, &val) in self.names.iter().zip(self.counter.iter()) {
            assn.set(name, val);
        }

        // advance the odometer, carrying into slower variables
        self.done = true;
        for (c, &card) in self.counter.iter_mut().zip(self.cards.iter()) {
            *c += 1;
            if *c == card {
                *c = 0;
            } else {
                self.done = false;
                break;
            }
        }

        Some(assn)
    }
}

/// Enumerate all assignments to `scope`. An empty scope has exactly one (empty) assignment.
pub fn all_assignments(scope: &[Variable]) -> Assignments {
    Assignments {
        names: scope.iter().map(|v| String::from(v.name())).collect(),
        cards: scope.iter().map(|v| v.cardinality()).collect(),
        counter: vec![0; scope.len()],
        done: false
    }
}


// Unit Tests for the Variable struct.
#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn binary() {
        let var = Variable::binary("Foo");
        assert_eq!(var.name(), "Foo");
        assert_eq!(2, var.cardinality());
        assert_eq!(1, var.value_index("1").unwrap());
        assert_eq!(Some("0"), var.value_name(0));
    }

    #[test]
    fn discrete() {
        let var = Variable::discrete("Foo", 10).unwrap();
        assert_eq!(10, var.cardinality());
        assert_eq!(9, var.value_index("9").unwrap());
        assert!(var.value_index("10").is_err());
    }

    #[test]
    fn discrete_err() {
        match Variable::discrete("Foo", 0) {
            Err(FactorError::InvalidCardinality(name)) => assert_eq!("Foo", name),
            _ => panic!("wrong result for empty variable")
        }
    }

    #[test]
    fn enumerated() {
        let var = Variable::enumerated("Foo", &["Probabilistic", "Graphical", "Models"]).unwrap();
        assert_eq!(3, var.cardinality());
        assert_eq!(1, var.value_index("Graphical").unwrap());
        assert_eq!(vec!["Probabilistic", "Graphical", "Models"], var.values().collect::<Vec<_>>());

        match var.value_index("FooBar") {
            Err(FactorError::UnknownValue { variable, value }) => {
                assert_eq!("Foo", variable);
                assert_eq!("FooBar", value);
            },
            _ => panic!("unknown value must not resolve")
        }
    }

    #[test]
    fn enumerated_errs() {
        assert!(Variable::enumerated("Foo", &[]).is_err());
        assert!(Variable::enumerated("Foo", &["a", "b", "a"]).is_err());
    }

    #[test]
    fn assignment() {
        let rain = Variable::enumerated("Rain", &["no", "yes"]).unwrap();
        let grade = Variable::discrete("Grade", 3).unwrap();

        let assn = Assignment::from_values(&[(&rain, "yes"), (&grade, "2")]).unwrap();
        assert_eq!(Some(1), assn.get("Rain"));
        assert_eq!(Some(2), assn.get("Grade"));
        assert_eq!(None, assn.get("Sprinkler"));
        assert_eq!(2, assn.len());

        assert!(Assignment::from_values(&[(&rain, "maybe")]).is_err());
    }

    #[test]
    fn assignments() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 3).unwrap();

        let all: Vec<Assignment> = all_assignments(&[a, b]).collect();
        assert_eq!(6, all.len());

        // first variable varies fastest
        let order: Vec<(usize, usize)> = all.iter()
                                            .map(|x| (x.get("A").unwrap(), x.get("B").unwrap()))
                                            .collect();
        assert_eq!(vec![(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)], order);

        let empty: Vec<Assignment> = all_assignments(&[]).collect();
        assert_eq!(1, empty.len());
        assert!(empty[0].is_empty());
    }

}

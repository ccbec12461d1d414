//! Defines the `Error` type for the factor library, along with small numeric helpers shared by
//! the `Factor` operations.

use std::error::Error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, FactorError>;

#[derive(Clone, Debug, PartialEq)]
pub enum FactorError {

    /// The length of a table did not match the product of the cardinalities of its scope
    ShapeMismatch { expected: usize, got: usize },

    /// An operation named a `Variable` that is not in the scope of the `Factor`
    UnknownVariable(String),

    /// A value that is not in the value set of the given `Variable`
    UnknownValue { variable: String, value: String },

    /// Two `Factor`s disagree on the cardinality of a shared `Variable`
    CardinalityConflict { variable: String, left: usize, right: usize },

    /// Represents an error where a certain constraint on a scope was not satisfied
    InvalidScope(String),

    /// A `Variable` declared with no values, or with a repeated value
    InvalidCardinality(String),

    /// Represents a situation in which there was a negative probability provided
    NegativeProbability,

    /// Represents an incomplete assignment where a complete assignment was required.
    /// The value in the tuple is the names of the variables that were missing from the assignment.
    IncompleteAssignment(Vec<String>),

    /// Represents an error where there was a parent variable expected, but not found
    MissingParent(String),

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    DuplicateVariable(String),

    /// Represents an attempt to initialize a variable with an incompatible Initialization
    InvalidInitialization,

}

impl Error for FactorError {}

impl fmt::Display for FactorError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FactorError::ShapeMismatch { expected, got } => {
                write!(f, "Table has {} entries, but its scope requires {}", got, expected)
            },
            FactorError::UnknownVariable(name) => {
                write!(f, "Variable '{}' is not in the scope of the factor", name)
            },
            FactorError::UnknownValue { variable, value } => {
                write!(f, "'{}' is not a value of variable '{}'", value, variable)
            },
            FactorError::CardinalityConflict { variable, left, right } => {
                write!(f, "Variable '{}' has cardinality {} in one factor and {} in the other",
                       variable, left, right)
            },
            FactorError::InvalidScope(msg) => write!(f, "Invalid scope: {}", msg),
            FactorError::InvalidCardinality(name) => {
                write!(f, "Variable '{}' must have at least one value, and no repeated values", name)
            },
            FactorError::NegativeProbability => write!(f, "Encountered a negative probability"),
            FactorError::IncompleteAssignment(names) => {
                write!(f, "Missing assignments to the following required Variables: {:?}", names)
            },
            FactorError::MissingParent(name) => write!(f, "Parent '{}' is missing from the model", name),
            FactorError::DuplicateVariable(name) => {
                write!(f, "Variable '{}' was encountered twice", name)
            },
            FactorError::InvalidInitialization => write!(f, "An invalid initialization was provided"),
        }
    }

}

/// Round `x` to the given number of decimal places
pub fn round_to(x: f64, places: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }

    let scale = 10f64.powi(places as i32);
    (x * scale).round() / scale
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(0.1235, round_to(0.123456, 4));
        assert_eq!(0.002, round_to(0.01 * 0.2, 4));
        assert_eq!(-1.60944, round_to((0.2f64).ln(), 5));
        assert_eq!(f64::NEG_INFINITY, round_to(f64::NEG_INFINITY, 5));
    }

    #[test]
    fn display() {
        let err = FactorError::UnknownValue {
            variable: String::from("Rain"),
            value: String::from("maybe")
        };
        assert_eq!("'maybe' is not a value of variable 'Rain'", err.to_string());
    }

}

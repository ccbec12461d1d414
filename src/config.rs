//! Numeric settings carried by every `Factor`.

/// Precision and tie-break constants used by the `Factor` operations.
///
/// Rounding after each product and normalization bounds the floating point drift that builds up
/// over long elimination chains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorConfig {
    /// Decimal places kept for each entry of a factor product
    pub product_precision: u32,

    /// Decimal places kept for each entry after normalization
    pub normalize_precision: u32,

    /// Decimal places kept by `to_log` and `from_log`
    pub log_precision: u32,

    /// Bias added to every entry before a max-marginalization scan. A zero entry is then
    /// strictly greater than "nothing seen yet", and ties resolve to the lowest value index.
    pub max_epsilon: f64,
}

impl Default for FactorConfig {

    fn default() -> Self {
        FactorConfig {
            product_precision: 4,
            normalize_precision: 5,
            log_precision: 5,
            max_epsilon: 0.00002,
        }
    }

}

impl FactorConfig {

    pub fn with_product_precision(mut self, places: u32) -> Self {
        self.product_precision = places;
        self
    }

    pub fn with_normalize_precision(mut self, places: u32) -> Self {
        self.normalize_precision = places;
        self
    }

    pub fn with_log_precision(mut self, places: u32) -> Self {
        self.log_precision = places;
        self
    }

    pub fn with_max_epsilon(mut self, epsilon: f64) -> Self {
        self.max_epsilon = epsilon;
        self
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn defaults() {
        let c = FactorConfig::default();
        assert_eq!(4, c.product_precision);
        assert_eq!(5, c.normalize_precision);
        assert_eq!(5, c.log_precision);
        assert_eq!(0.00002, c.max_epsilon);
    }

    #[test]
    fn builder() {
        let c = FactorConfig::default().with_product_precision(8).with_max_epsilon(0.);
        assert_eq!(8, c.product_precision);
        assert_eq!(0., c.max_epsilon);
        assert_eq!(5, c.normalize_precision);
    }

}

//! Variable descriptors: the variable to read and the unit adjustment applied
//! on load.

/// Unit adjustment applied to every value read for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Adjustment {
    /// Values are used as read.
    #[default]
    None,
    /// `value + offset` (e.g. Kelvin to Celsius with `-273.15`).
    Add(f64),
    /// `value * factor` (e.g. kg m-2 s-1 to mm/day with `86400`).
    Mult(f64),
}

impl Adjustment {
    /// Applies the adjustment to one value; `NaN` stays `NaN`.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::Add(offset) => value + offset,
            Self::Mult(factor) => value * factor,
        }
    }
}

/// A variable name together with its load-time adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor {
    name: String,
    adjustment: Adjustment,
}

impl VariableDescriptor {
    /// Creates a descriptor with no adjustment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adjustment: Adjustment::None,
        }
    }

    /// Sets the adjustment.
    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load-time adjustment.
    pub fn adjustment(&self) -> Adjustment {
        self.adjustment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn adjustments() {
        assert_relative_eq!(Adjustment::None.apply(3.0), 3.0);
        assert_relative_eq!(Adjustment::Add(-273.15).apply(300.0), 26.85, epsilon = 1e-9);
        assert_relative_eq!(Adjustment::Mult(86400.0).apply(1e-5), 0.864, epsilon = 1e-12);
        assert!(Adjustment::Mult(2.0).apply(f64::NAN).is_nan());
    }

    #[test]
    fn descriptor_defaults_to_no_adjustment() {
        let d = VariableDescriptor::new("tave");
        assert_eq!(d.name(), "tave");
        assert_eq!(d.adjustment(), Adjustment::None);
    }
}

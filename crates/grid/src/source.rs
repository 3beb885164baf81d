//! Sources of gridded variables.

use std::collections::HashMap;

use crate::error::GridError;
use crate::grid::Grid;

/// Something that can load a named gridded variable.
pub trait GridSource {
    /// Loads the variable `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingVariable`] if the source has no such
    /// variable, or a source-specific error if loading fails.
    fn grid(&self, name: &str) -> Result<Grid, GridError>;
}

/// A [`GridSource`] backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    grids: HashMap<String, Grid>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the variable `name`.
    pub fn with_grid(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.grids.insert(name.into(), grid);
        self
    }

    /// Adds (or replaces) the variable `name` in place.
    pub fn insert(&mut self, name: impl Into<String>, grid: Grid) {
        self.grids.insert(name.into(), grid);
    }
}

impl GridSource for MemorySource {
    fn grid(&self, name: &str) -> Result<Grid, GridError> {
        self.grids
            .get(name)
            .cloned()
            .ok_or_else(|| GridError::MissingVariable {
                name: name.to_string(),
                location: "in-memory source".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_lookup_error() {
        let src = MemorySource::new();
        let err = src.grid("pr").unwrap_err();
        assert!(matches!(err, GridError::MissingVariable { ref name, .. } if name == "pr"));
    }

    #[test]
    fn stored_grid_returned() {
        let grid = Grid::new(vec![], vec![1.0], vec![2.0], vec![]).unwrap();
        let src = MemorySource::new().with_grid("tas", grid.clone());
        assert_eq!(src.grid("tas").unwrap(), grid);
    }
}

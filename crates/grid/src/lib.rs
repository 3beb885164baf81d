//! # gcmqm-grid
//!
//! Gridded climate variables in and out: NetCDF reading, coordinate-range
//! selection, conversion to a row-per-cell-and-day table and back, and
//! CF-style NetCDF writing.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["NetcdfSource / MemorySource"] -->|"GridSource::grid"| B["Grid"]
//!     B -->|"to_table (bounds, adjustment)"| C["GridTable"]
//!     C -->|"collapse_duplicates"| C
//!     C -->|"to_grid (metadata)"| D["Gridded"]
//!     D -->|"write_netcdf"| E[".nc file"]
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use gcmqm_grid::{
//!     Bounds, DateBounds, NetcdfSource, VariableDescriptor, to_grid, to_table, write_netcdf,
//! };
//!
//! let source = NetcdfSource::new("input/aphro/aphrodite_precip.nc");
//! let table = to_table(
//!     &source,
//!     &VariableDescriptor::new("precip"),
//!     Bounds::new(60.0, 100.0).unwrap(),
//!     Bounds::new(5.0, 40.0).unwrap(),
//!     DateBounds::new(
//!         NaiveDate::from_ymd_opt(1971, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
//!     )
//!     .unwrap(),
//! )
//! .unwrap();
//! let gridded = to_grid(&table, "pr").unwrap();
//! write_netcdf("output/aphro/aphrodite_pr.nc".as_ref(), &gridded).unwrap();
//! ```

mod bounds;
mod descriptor;
mod error;
mod grid;
mod gridded;
mod netcdf_read;
mod netcdf_write;
mod source;
mod table;

pub use bounds::{Bounds, DateBounds};
pub use descriptor::{Adjustment, VariableDescriptor};
pub use error::GridError;
pub use grid::Grid;
pub use gridded::{Gridded, VariableMeta, lookup_metadata, to_grid};
pub use netcdf_read::NetcdfSource;
pub use netcdf_write::{TIME_CALENDAR, TIME_UNITS, write_netcdf};
pub use source::{GridSource, MemorySource};
pub use table::{GridTable, TableRow, to_table};

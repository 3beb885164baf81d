//! # gcmqm-pipeline
//!
//! Orchestrates bias correction for every configured variable, GCM and
//! experiment.
//!
//! For each variable the observations are loaded once. For each GCM a fresh
//! [`FitTable`](gcmqm_quantile_map::FitTable) is built from the historical
//! experiment (observations right-joined onto model rows, grouped by
//! longitude, latitude and month) and applied to every experiment of that
//! GCM. Experiments listed before the historical one are applied with an
//! empty table, so every cell falls back.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     A["DataStore::observations"] -->|"to_table"| B["observed table"]
//!     C["DataStore::model"] -->|"to_table (+ collapse)"| D["model table"]
//!     B --> E["pair_observations (right join)"]
//!     D --> E
//!     E -->|"group_pairs"| F["build_fit_table"]
//!     D -->|"group_series"| G["apply_all"]
//!     F --> G
//!     G -->|"reassemble + to_grid"| H["DataStore::write"]
//! ```

mod error;
mod merge;
mod pipeline;
mod plan;
mod store;

pub use error::PipelineError;
pub use merge::{
    PairedRow, count_matched, group_pairs, group_series, pair_observations, reassemble,
};
pub use pipeline::{Pipeline, RunSummary};
pub use plan::{DEFAULT_HISTORICAL, ExperimentSpec, GcmSpec, RunPlan, VariableSpec};
pub use store::{DataStore, MemoryStore, Output, OutputKey};

//! # gcmqm-calendar
//!
//! Decoding of CF-convention time axes into calendar dates, and the
//! day-level helpers the rest of the workspace groups by.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["units attr"] -->|"TimeUnits::from_str"| B["TimeUnits"]
//!     C["calendar attr"] -->|"CfCalendar::parse"| D["CfCalendar"]
//!     B --> E["decode_times()"]
//!     D --> E
//!     E -->|"Vec of NaiveDateTime"| F["truncate_to_day()"]
//!     F -->|"NaiveDate"| G["month_of()"]
//!     F --> H["encode_days()"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use gcmqm_calendar::{CfCalendar, TimeUnits, decode_times, truncate_to_day};
//!
//! let units: TimeUnits = "hours since 1980-06-15 00:00:00".parse().unwrap();
//! let times = decode_times(&units, CfCalendar::Standard, &[18.5]).unwrap();
//! assert_eq!(truncate_to_day(times[0]).to_string(), "1980-06-15");
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `units` | `<unit> since <reference>` parsing |
//! | `cf` | Supported calendars and offset decoding |
//! | `noleap` | 365-day calendar month tables |
//! | `day` | Day truncation, month extraction, output encoding |
//! | `error` | Error types |

mod cf;
mod day;
mod error;
mod noleap;
mod units;

pub use cf::{CfCalendar, decode_times};
pub use day::{encode_days, month_of, parse_date, truncate_to_day};
pub use error::CalendarError;
pub use units::{TimeUnit, TimeUnits};

//! The day record model and everything that reads or changes it. Nothing in here touches the
//! file system or the clock: callers load a [record::DayRecord], apply one operation and persist
//! the result.
//!
//!  - [normalize] turns user shorthand ("f", "lun", "sum") into tagged enums.
//!  - [matcher] finds the single entry a text snippet refers to, or reports why it can't.
//!  - [nutrients] handles the food database, nutrient snapshots, targets and progress bars.
//!  - [record] and [operations] hold the aggregate and its mutations.

pub mod error;
pub mod matcher;
pub mod normalize;
pub mod nutrients;
pub mod operations;
pub mod record;

pub use error::PlannerError;
pub use record::DayRecord;

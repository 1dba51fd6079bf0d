//!  Storage is organized through [day_storage::DayStorageImpl] and [defaults].
//!  The basic idea is:
//!   - There is a directory with the active day records and one with archived records.
//!   - Every day is a single pretty printed JSON file named after its date.
//!   - A day file is locked for the whole read-modify-write cycle of an operation.
//!   - Routine template, food database and user profile live in a separate defaults directory.

pub mod day_storage;
pub mod defaults;

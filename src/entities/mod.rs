//! Entity type definitions
//!
//! The toolkit works on two families of entities:
//!
//! **Loaded data:**
//! - [`SpringRecord`] - one vehicle row of a PTA sheet
//! - [`PtaTable`] - a validated PTA table with resolved columns
//!
//! **Derived data:**
//! - [`ChangeRecord`] - the delta for one vehicle key across two releases
//! - [`ChangeType`] / [`MassStatus`] - its classification axes

pub mod change;
pub mod record;

pub use change::{ChangeRecord, ChangeType, FieldChange, MassStatus};
pub use record::{PtaTable, SpringRecord};

//! Compiles pending erasure requests into per-table, per-partition search
//! queries.
//!
//! For every registered data mapper the compiler resolves the table's column
//! types ([`schema`]), casts raw match values to them ([`cast`]), groups the
//! applicable matches by column ([`classify`]) and attaches the groups to
//! each of the table's partitions ([`assemble`]). [`QueryGenerator`] runs
//! this for a whole deletion job and [`QueryDelivery`] publishes the result.

pub mod assemble;
pub mod cast;
pub mod classify;
pub mod delivery;
pub mod error;
pub mod generator;
pub mod schema;
pub mod sources;

pub use delivery::{DeliveryError, QueryDelivery};
pub use error::{CompileError, CompileResult};
pub use generator::{DatasetFailure, GenerationReport, QueryGenerator};
pub use schema::{ColumnType, PrimitiveKind};

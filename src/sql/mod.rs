//! SQL rendering shared by the database and seeder sinks.

pub mod batch;
pub mod statement;
pub mod value;

pub use batch::{compute_batch_size, partition, Batch, DEFAULT_PARAM_LIMIT, POSTGRES_MAX_PARAMS};
pub use statement::{insert_prefix, literal_tuple, placeholder_group, InsertStatement};
pub use value::{SqlValue, TIMESTAMP_FORMAT};

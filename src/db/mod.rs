pub mod insert;
pub mod pool;

pub use insert::{insert_all, BatchExecutor, InsertSummary, StageError};
pub use pool::create_pool;

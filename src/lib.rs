pub mod config;
pub mod db;
pub mod error;
pub mod excel;
pub mod models;
pub mod seeder;
pub mod sql;

pub use config::Config;
pub use error::{AppError, AppResult};

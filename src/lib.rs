//! nexttreino - Workout builder and trainer
//!
//! Pick exercises from the catalog, save them as named workouts and train
//! through them with a rest timer between sets.

pub mod config;
pub mod db;
pub mod exercises;
pub mod images;
pub mod store;
pub mod timer;
pub mod training;
pub mod tui;

pub use config::Config;
pub use db::Database;
pub use store::WorkoutStore;

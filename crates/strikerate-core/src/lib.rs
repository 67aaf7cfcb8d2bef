// Library root: batting statistics cleaning, comparison scoring and run
// prediction for a fixed cohort of players.

pub mod analysis;
pub mod config;
pub mod data;
pub mod model;
pub mod predict;
pub mod preprocess;

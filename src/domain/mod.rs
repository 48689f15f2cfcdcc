pub mod errors;
pub mod jobs;
pub mod models;
pub mod repositories;

pub mod provider;
pub mod queue;

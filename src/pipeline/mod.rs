pub mod credential;
pub mod orchestrator;

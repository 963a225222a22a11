pub mod queue;
pub mod upload_service;

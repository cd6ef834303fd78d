pub mod service;
pub mod state;
pub mod status_service;

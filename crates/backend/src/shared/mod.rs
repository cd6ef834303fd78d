pub mod clock;
pub mod config;
pub mod status_policy;
pub mod upstream;

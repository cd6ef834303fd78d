pub mod filters;
pub mod format;
pub mod serde_helpers;
pub mod status_taxonomy;
pub mod timezone;

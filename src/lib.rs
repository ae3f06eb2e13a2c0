pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod input;
pub mod playback;
pub mod store;

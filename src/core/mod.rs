pub mod config;
pub mod fence;
pub mod message;
pub mod sandbox;

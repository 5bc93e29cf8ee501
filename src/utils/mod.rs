pub mod clipboard;
pub mod download;
pub mod logging;
pub mod syntax;

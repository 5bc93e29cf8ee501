pub mod data;
pub mod io;
pub mod printing;


pub use data::{path_display, Config, MermaidSettings};
pub use io::ConfigError;

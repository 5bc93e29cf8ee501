//! fencebox works with the code inside chat messages.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns message input, configuration, the annotated-fence scanner
//!   and the sandbox file table built from it.
//! - [`ui`] holds per-block view state (copy marker, diagram toggle,
//!   collapse), Mermaid configuration, suggestion cards and the theme used to
//!   render them.
//! - [`utils`] provides clipboard access, downloads, syntax highlighting and
//!   logging setup.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;

//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod process;
pub mod shutdown;

// Re-export main command functions
pub use process::{execute_process, render_summary, validate_args, ProcessArgs, ProcessReport};
pub use shutdown::install_signal_handler;

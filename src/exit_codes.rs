//! Process exit codes.
//!
//! A completed run, including an empty recovery, exits 0 by returning from `main`.

/// Missing input, bad configuration, or an output write failure
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::TOOL_ERROR;

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR)
    }
}

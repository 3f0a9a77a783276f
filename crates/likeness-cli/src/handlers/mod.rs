//! Command handlers - kept out of main.rs for testability
//!
//! Each handler reads its inputs from disk, calls into the library and
//! reports through [`crate::output::Reporter`].

pub mod compare;
pub mod config;
pub mod inspect;

pub use compare::{execute_compare, read_image};
pub use config::execute_config;
pub use inspect::{execute_inspect, inspect_file};

/// How a command finished, mapped to the process exit code by `main`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Command succeeded (and images matched, for `compare`)
    Success,
    /// `compare` ran but the images did not match
    NotMatched,
}

impl RunStatus {
    /// Process exit code
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NotMatched => 1,
        }
    }
}

/// Exit code for any error
pub const ERROR_EXIT_CODE: u8 = 2;

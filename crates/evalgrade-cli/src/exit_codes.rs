//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
pub const CASE_FAILED: i32 = 1; // at least one case could not be read or written
pub const CONFIG_ERROR: i32 = 2; // bad config, flags or judge setup

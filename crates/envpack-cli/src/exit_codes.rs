//! Standard exit codes for CLI operations

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - usage, extraction or reconciliation failure
pub const ERROR: i32 = 1;

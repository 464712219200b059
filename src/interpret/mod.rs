//! Local, file-driven execution of command sequences.

/// Fail-fast sequential replay.
pub mod replay;

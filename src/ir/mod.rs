//! Intermediate representation of command sequences.
//!
//! Records are decoded into [`command::Command`] values through an explicit enum-keyed table;
//! [`codec`] handles the line-oriented text form.

/// Line-oriented reader and writer.
pub mod codec;
/// Command kinds, records and dispatch.
pub mod command;

#![deny(unsafe_code)]

/// Terminal text for rendered blocks and campus views.
pub mod format;
pub mod settings;
/// Command parsing and view state for the line-oriented shell.
pub mod shell;

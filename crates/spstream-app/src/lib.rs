// Library crate for the spstream binary.
// Re-exports modules so integration tests can access them.

pub mod cli;
pub mod feeds;
pub mod mlb;
pub mod report;
pub mod source;

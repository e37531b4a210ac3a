// Shared infrastructure: configuration, clock, and the analysis result cache.

pub mod cache;
pub mod clock;
pub mod config;

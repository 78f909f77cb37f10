//! Public library modules for the CLI crate
pub mod media;
pub mod report;
pub mod watch;

pub mod config;
pub mod logging;

pub mod diagnostics;
pub mod job;
pub mod location;
pub mod shell;
pub mod stages;

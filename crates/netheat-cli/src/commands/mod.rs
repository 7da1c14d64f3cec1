//! CLI subcommand implementations.

pub mod inspect;
pub mod metrics;
pub mod plot;
pub mod validate;

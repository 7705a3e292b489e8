//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;

#[cfg(test)]
mod tests;

pub use cli::{ChedReferenceArgs, Command, PoolCommand, TradePerfArgs};
pub use parsers::{parse_base_url, parse_duration, parse_think_time};

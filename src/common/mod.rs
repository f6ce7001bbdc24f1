//! Common, shared types.

pub mod config;
pub mod layers;
pub mod sensing;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;

//! Shared utilities.
//!
//! Content hashing for packaged artifacts, plus test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;

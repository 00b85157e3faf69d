//! Persistence: an opaque key-value store and typed preference accessors.

mod kv;
mod prefs;

pub use kv::*;
pub use prefs::*;

#[cfg(test)]
mod tests;

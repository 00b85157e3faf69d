//! Track catalog: the fixed, ordered list of ambient tracks.
//!
//! The catalog is loaded once at startup, either from the built-in list or
//! from a JSON file, and never changes afterwards.

mod load;
mod model;

pub use model::*;

#[cfg(test)]
mod tests;

//! Application module: the `App` model driven by the TUI, shortcuts and
//! media keys.
//!
//! `App` owns the mixer and the timer and is the only place where the two
//! are coupled.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;

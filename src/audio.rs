mod engine;
mod fade;
mod player;
mod sink;
mod thread;
mod types;
mod voices;

#[cfg(test)]
pub mod fake;

pub use engine::{LoadRequest, PendingLoad, PlaybackEngine};
pub use player::RodioEngine;

mod machine;
mod state;

pub use machine::Mixer;
pub use state::*;

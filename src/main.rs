mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod logging;
mod mixer;
mod mpris;
mod runtime;
mod shortcuts;
mod store;
mod timer;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

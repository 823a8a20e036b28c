mod client;
mod directory;
mod pending;
mod watcher;

pub use client::*;
pub use pending::*;
pub use watcher::*;

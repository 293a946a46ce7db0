//! Error types

mod authority;
mod config;
mod ingest;
mod view;

pub use authority::*;
pub use config::*;
pub use ingest::*;
pub use view::*;

//! Main application modules split from main.rs

mod bootstrap;
mod health;
mod server;
mod shutdown;
mod types;

pub use bootstrap::*;
pub use health::*;
pub use server::*;
pub use shutdown::*;
pub use types::*;

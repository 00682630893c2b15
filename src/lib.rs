pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use crate::core::groom::Groomba;
pub use utils::{GroombaError, Result};

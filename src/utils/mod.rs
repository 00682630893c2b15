pub mod error;
pub mod logging;

pub use error::{GroombaError, Result};
pub use logging::init_logging;

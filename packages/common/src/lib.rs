pub mod config;
pub mod error;
pub mod keys;
pub mod result;

pub use config::*;
pub use error::*;
pub use keys::*;
pub use result::*;

// Library exports for svg2cursor

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod model;
pub mod pipeline;

pub use error::{BuildError, Result};

pub mod config;
pub mod logging;
pub mod stream;

pub use config::Config;
pub use stream::{StreamError, StreamPipeline};

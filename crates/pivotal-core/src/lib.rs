pub mod client;
pub mod config;
pub mod error;
pub mod field;
pub mod locator;
pub mod poker;
pub mod project;
pub mod report;
pub mod story;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use config::Config;
pub use error::{Result, TrackerError};
pub use project::Project;
pub use story::{NewStory, Story, Transition};

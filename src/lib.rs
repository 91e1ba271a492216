pub mod client;
pub mod common;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod steps;

pub use config::Config;
pub use error::SmokeError;
pub use report::{Report, StepOutcome, Verdict};
pub use steps::Smoke;

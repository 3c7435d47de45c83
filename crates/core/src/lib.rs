pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod counter;
pub mod error;

pub use catalog::*;
pub use config::Config;
pub use cooldown::{CooldownGate, GateDecision};
pub use counter::KeywordCounter;
pub use error::*;

//! Game session, scoring and reward-eligibility engine for the vocabulary
//! platform. The transport layer and the concrete document store live
//! outside this crate; everything here is expressed against
//! [`store::DocumentStore`] and returns typed [`error::EngineError`]
//! failures for the caller to map onto its wire format.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use services::AppState;

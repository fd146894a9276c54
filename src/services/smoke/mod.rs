pub mod client;
pub mod models;
pub mod runner;

pub use client::{SmokeClient, SmokeClientConfig, DEFAULT_BASE_URL};
pub use models::{
    LookupByTitleRequest, MatchNocRequest, RawResponse, SmokeReport, SmokeStep, StepOutcome,
    StepReport, DEFAULT_K, DEFAULT_QUERY, DEFAULT_TITLE,
};
pub use runner::SmokeTest;

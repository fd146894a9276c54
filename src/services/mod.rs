pub mod builder;
pub mod smoke;
pub mod subprocess;
pub mod venv;

pub use builder::{
    ArtifactStatus, BuildOutcome, BuildRequest, IndexBuilder, COMPLETION_MESSAGE,
    EXPECTED_ARTIFACTS, OPTIONAL_ARTIFACTS,
};
pub use smoke::{SmokeClient, SmokeClientConfig, SmokeReport, SmokeTest};
pub use venv::VirtualEnv;

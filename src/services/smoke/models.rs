use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Conference and event planners";
pub const DEFAULT_QUERY: &str = "plan and coordinate events, manage vendors, prepare budgets";
pub const DEFAULT_K: u32 = 3;

/// Body of `POST /lookup-by-title`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupByTitleRequest {
    pub title: String,
    pub k: u32,
}

impl Default for LookupByTitleRequest {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            k: DEFAULT_K,
        }
    }
}

/// Body of `POST /match-noc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchNocRequest {
    pub query: String,
    pub k: u32,
}

impl Default for MatchNocRequest {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            k: DEFAULT_K,
        }
    }
}

/// The three requests, in the order they are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeStep {
    Health,
    LookupByTitle,
    MatchNoc,
}

impl SmokeStep {
    pub const ALL: [SmokeStep; 3] = [
        SmokeStep::Health,
        SmokeStep::LookupByTitle,
        SmokeStep::MatchNoc,
    ];

    pub fn method(&self) -> &'static str {
        match self {
            SmokeStep::Health => "GET",
            SmokeStep::LookupByTitle | SmokeStep::MatchNoc => "POST",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            SmokeStep::Health => "/health",
            SmokeStep::LookupByTitle => "/lookup-by-title",
            SmokeStep::MatchNoc => "/match-noc",
        }
    }
}

/// Raw HTTP response, kept as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// e.g. `HTTP/1.1`
    pub version: String,
    pub status: u16,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn status_line(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} {} {}", self.version, self.status, reason),
            None => format!("{} {}", self.version, self.status),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The server answered; any status counts
    Responded { status: u16 },
    /// No response at all (connection refused, timeout, ...)
    TransportError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: SmokeStep,
    pub outcome: StepOutcome,
}

/// What happened during one smoke-test run, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeReport {
    pub steps: Vec<StepReport>,
}

impl SmokeReport {
    pub fn responded(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Responded { .. }))
            .count()
    }
}

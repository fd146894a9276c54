//! Sequential smoke test of the matching service
//!
//! Sends the three requests in order and prints whatever comes back. Nothing is
//! asserted: error statuses and connection failures are rendered and the next
//! request still goes out.

use std::io::Write;
use std::time::Instant;

use super::client::SmokeClient;
use super::models::{
    LookupByTitleRequest, MatchNocRequest, RawResponse, SmokeReport, SmokeStep, StepOutcome,
    StepReport,
};
use crate::config::SmokeSettings;
use crate::error::Result;
use crate::logging::log_performance;

pub struct SmokeTest {
    client: SmokeClient,
    lookup: LookupByTitleRequest,
    matching: MatchNocRequest,
}

impl SmokeTest {
    pub fn new(client: SmokeClient) -> Self {
        Self {
            client,
            lookup: LookupByTitleRequest::default(),
            matching: MatchNocRequest::default(),
        }
    }

    /// Apply title, query and k from the config file
    pub fn with_settings(self, settings: &SmokeSettings) -> Self {
        let lookup = LookupByTitleRequest {
            title: settings.title.clone().unwrap_or(self.lookup.title),
            k: settings.k.unwrap_or(self.lookup.k),
        };
        let matching = MatchNocRequest {
            query: settings.query.clone().unwrap_or(self.matching.query),
            k: settings.k.unwrap_or(self.matching.k),
        };
        Self {
            client: self.client,
            lookup,
            matching,
        }
    }

    pub fn with_lookup(mut self, lookup: LookupByTitleRequest) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_match(mut self, matching: MatchNocRequest) -> Self {
        self.matching = matching;
        self
    }

    pub fn client(&self) -> &SmokeClient {
        &self.client
    }

    pub fn lookup(&self) -> &LookupByTitleRequest {
        &self.lookup
    }

    pub fn matching(&self) -> &MatchNocRequest {
        &self.matching
    }

    /// Run all three steps, writing their output to `out`
    ///
    /// Only a failure to write to `out` is returned as an error.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<SmokeReport> {
        let mut report = SmokeReport::default();

        for step in SmokeStep::ALL {
            self.write_header(out, step)?;

            let started = Instant::now();
            let result = match step {
                SmokeStep::Health => self.client.health().await,
                SmokeStep::LookupByTitle => self.client.lookup_by_title(&self.lookup).await,
                SmokeStep::MatchNoc => self.client.match_noc(&self.matching).await,
            };
            let duration_ms = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(response) => {
                    log_performance(step.path(), duration_ms, response.is_success());
                    match step {
                        SmokeStep::Health => render_full(out, &response)?,
                        _ => render_json(out, step, &response)?,
                    }
                    StepOutcome::Responded {
                        status: response.status,
                    }
                }
                Err(e) => {
                    log_performance(step.path(), duration_ms, false);
                    tracing::warn!(step = step.path(), error = %e, "Request failed");
                    writeln!(out, "request failed: {e}")?;
                    StepOutcome::TransportError {
                        message: e.to_string(),
                    }
                }
            };

            writeln!(out)?;
            report.steps.push(StepReport { step, outcome });
        }

        out.flush()?;
        tracing::info!(
            responded = report.responded(),
            total = report.steps.len(),
            "Smoke test finished"
        );

        Ok(report)
    }

    fn write_header<W: Write>(&self, out: &mut W, step: SmokeStep) -> Result<()> {
        let url = self.client.url_for(step);
        match step {
            SmokeStep::Health => writeln!(out, "==> {} {}", step.method(), url)?,
            SmokeStep::LookupByTitle => writeln!(
                out,
                "==> {} {} {}",
                step.method(),
                url,
                serde_json::to_string(&self.lookup)?
            )?,
            SmokeStep::MatchNoc => writeln!(
                out,
                "==> {} {} {}",
                step.method(),
                url,
                serde_json::to_string(&self.matching)?
            )?,
        }
        Ok(())
    }
}

/// Status line, headers, blank line, body
fn render_full<W: Write>(out: &mut W, response: &RawResponse) -> Result<()> {
    writeln!(out, "{}", response.status_line())?;
    for (name, value) in &response.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", response.body.trim_end())?;
    Ok(())
}

/// Pretty-printed JSON body, or the raw body when it is not JSON
fn render_json<W: Write>(out: &mut W, step: SmokeStep, response: &RawResponse) -> Result<()> {
    if !response.is_success() {
        tracing::warn!(
            step = step.path(),
            status = response.status,
            "Non-success status"
        );
    }

    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
        Err(e) => {
            tracing::warn!(step = step.path(), error = %e, "Response body is not JSON");
            writeln!(out, "{}", response.body.trim_end())?;
        }
    }
    Ok(())
}

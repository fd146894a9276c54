use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::config::Config;
use crate::env::smoke as env_vars;
use crate::services::smoke::{SmokeClient, SmokeClientConfig, SmokeTest};

/// Flags given to `nocmatch smoke`
#[derive(Debug, Clone, Default)]
pub struct SmokeOptions {
    pub base_url: Option<String>,
    pub title: Option<String>,
    pub query: Option<String>,
    pub k: Option<u32>,
    pub timeout_secs: Option<u64>,
}

pub async fn handle_smoke_command(options: SmokeOptions) -> Result<()> {
    let config = Config::load()?;
    let env_base_url = env::var(env_vars::BASE_URL)
        .ok()
        .filter(|value| !value.is_empty());

    let smoke = build_smoke_test(options, &config, env_base_url)?;
    smoke.run(&mut std::io::stdout()).await?;

    Ok(())
}

/// Merge flags, environment and config file: flag > env > config > default
pub fn build_smoke_test(
    options: SmokeOptions,
    config: &Config,
    env_base_url: Option<String>,
) -> Result<SmokeTest> {
    let mut client_config = SmokeClientConfig::from_settings(&config.smoke);
    if let Some(base_url) = options.base_url.or(env_base_url) {
        client_config.base_url = base_url;
    }
    if let Some(secs) = options.timeout_secs {
        client_config = client_config.with_timeout(Some(Duration::from_secs(secs)));
    }

    let smoke = SmokeTest::new(SmokeClient::new(client_config)?).with_settings(&config.smoke);

    let mut lookup = smoke.lookup().clone();
    let mut matching = smoke.matching().clone();
    if let Some(title) = options.title {
        lookup.title = title;
    }
    if let Some(query) = options.query {
        matching.query = query;
    }
    if let Some(k) = options.k {
        lookup.k = k;
        matching.k = k;
    }

    Ok(smoke.with_lookup(lookup).with_match(matching))
}

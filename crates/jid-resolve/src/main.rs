//! jid-resolve - resolve WhatsApp JIDs to phone numbers and back.

mod config;
mod error;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use anyhow::Context;
use futures::future::join_all;
use jid_resolver::{
    E164Normalizer, JidResolver, MappingDirectoryResolver, ResolveError, ResolveOptions,
};
use lid_gateway_client::LidGatewayClient;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Result for a single command-line input.
enum Outcome {
    /// Decoded phone number for a JID input.
    Phone(Option<String>),
    /// JID for a phone number input.
    Jid(Result<String, ResolveError>),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log.level);

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        return Err(AppError::Usage);
    }

    let resolver = build_resolver(&config).await?;
    let opts = config.store.resolve_options();

    let outcomes = join_all(inputs.iter().map(|input| run(&resolver, &opts, input))).await;

    let mut failed = 0;
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Outcome::Phone(Some(phone)) => println!("{}\t{}", input, phone),
            Outcome::Phone(None) => println!("{}\t-", input),
            Outcome::Jid(Ok(jid)) => println!("{}\t{}", input, jid),
            Outcome::Jid(Err(e)) => {
                failed += 1;
                eprintln!("{}\terror: {}", input, e);
            }
        }
    }

    if failed > 0 {
        return Err(AppError::Conversion(failed));
    }
    Ok(())
}

async fn build_resolver(config: &Config) -> AppResult<JidResolver> {
    let dirs = MappingDirectoryResolver::new(config.store.credential_paths());
    let resolver =
        JidResolver::new(dirs, Arc::new(E164Normalizer)).with_verbose(config.log.verbose);

    let Some(url) = &config.lookup.gateway_url else {
        debug!("No gateway configured - live LID lookups disabled");
        return Ok(resolver);
    };

    let gateway = LidGatewayClient::new(url, config.lookup.timeout)?;
    if gateway.health_check().await {
        info!("Gateway healthy at {}", gateway.base_url());
    } else {
        warn!("Gateway health check failed - lookups may fail");
    }

    Ok(resolver.with_lookup(Arc::new(gateway)))
}

async fn run(resolver: &JidResolver, opts: &ResolveOptions, input: &str) -> Outcome {
    if input.contains('@') {
        Outcome::Phone(resolver.resolve(input, opts).await)
    } else {
        Outcome::Jid(resolver.to_jid(input))
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Flux Demo
//!
//! Runs one name generator demonstration and prints every value and the
//! terminal signal.
//!
//! Run with: cargo run --bin flux-demo -- <demo> [min_length|name]
//!
//! Environment:
//! - REACTIVE_MAX_DELAY_MS: upper bound for random per-name delays
//! - REACTIVE_FLAT_MAP_CONCURRENCY: inner sequences flat_map runs at once
//! - RUST_LOG: log filter (default info)

use anyhow::{bail, Context, Result};
use cim_reactive::prelude::*;
use cim_reactive::service::NameGeneratorService;
use std::fmt::Debug;
use tracing::info;

const DEMOS: &[&str] = &[
    "names_flux",
    "names_flux_map",
    "names_flux_immutable",
    "names_flux_filter",
    "names_flux_flat_map",
    "names_flux_flat_map_async",
    "names_flux_concat_map",
    "names_flux_transform",
    "names_flux_transform_default_if_empty",
    "names_flux_transform_switch_if_empty",
    "name_mono",
    "name_mono_with_map",
    "name_mono_with_flat_map",
    "name_mono_with_flat_map_many",
    "explore_concat",
    "explore_concat_mono",
    "explore_merge",
    "explore_merge_with",
    "explore_merge_with_mono",
];

/// Subscribe, print each value, and wait for the terminal signal
async fn print_all<T, P>(label: &str, publisher: P) -> Result<SubscriptionState>
where
    T: Debug + Send + 'static,
    P: Publisher<T>,
{
    let prefix = label.to_string();
    let on_error = label.to_string();
    let on_complete = label.to_string();

    let subscriber = FnSubscriber::new(move |value: T| println!("{prefix} --> {value:?}"))
        .with_complete(move || println!("{on_complete} completed"))
        .with_error(move |error| println!("{on_error} failed: {error}"));

    let subscription = publisher.subscribe(subscriber);
    info!(subscription_id = %subscription.id(), demo = %label, "Subscribed");

    Ok(subscription.join().await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let demo = args.next().unwrap_or_else(|| "explore_merge".to_string());
    let argument = args.next();

    let config = ReactiveConfig::from_env().context("Invalid reactive configuration")?;
    info!(demo = %demo, ?config, "Starting flux demo");

    let min_length = match argument.as_deref() {
        Some(raw) => raw.parse().unwrap_or(3),
        None => 3,
    };
    let name = argument.clone().unwrap_or_else(|| "khalid".to_string());

    let service = NameGeneratorService::with_config(config);

    let state = match demo.as_str() {
        "names_flux" => print_all(&demo, service.names_flux()).await?,
        "names_flux_map" => print_all(&demo, service.names_flux_map()).await?,
        "names_flux_immutable" => print_all(&demo, service.names_flux_immutable()).await?,
        "names_flux_filter" => print_all(&demo, service.names_flux_filter(min_length)).await?,
        "names_flux_flat_map" => print_all(&demo, service.names_flux_flat_map(min_length)).await?,
        "names_flux_flat_map_async" => {
            print_all(&demo, service.names_flux_flat_map_async(min_length)).await?
        }
        "names_flux_concat_map" => {
            print_all(&demo, service.names_flux_concat_map(min_length)).await?
        }
        "names_flux_transform" => print_all(&demo, service.names_flux_transform(min_length)).await?,
        "names_flux_transform_default_if_empty" => {
            print_all(&demo, service.names_flux_transform_default_if_empty(min_length)).await?
        }
        "names_flux_transform_switch_if_empty" => {
            print_all(&demo, service.names_flux_transform_switch_if_empty(min_length)).await?
        }
        "name_mono" => print_all(&demo, service.name_mono()).await?,
        "name_mono_with_map" => print_all(&demo, service.name_mono_with_map(&name)).await?,
        "name_mono_with_flat_map" => print_all(&demo, service.name_mono_with_flat_map()).await?,
        "name_mono_with_flat_map_many" => {
            print_all(&demo, service.name_mono_with_flat_map_many(&name)).await?
        }
        "explore_concat" => print_all(&demo, service.explore_concat()).await?,
        "explore_concat_mono" => print_all(&demo, service.explore_concat_mono()).await?,
        "explore_merge" => print_all(&demo, service.explore_merge()).await?,
        "explore_merge_with" => print_all(&demo, service.explore_merge_with()).await?,
        "explore_merge_with_mono" => print_all(&demo, service.explore_merge_with_mono()).await?,
        other => bail!("Unknown demo '{}'. Available: {}", other, DEMOS.join(", ")),
    };

    info!(demo = %demo, state = %state, "Demo finished");
    Ok(())
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Name Generator Service
//!
//! Demonstration sequences built from the operator library. Every method
//! returns an assembly; nothing is emitted until the caller subscribes.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_reactive::service::NameGeneratorService;
//!
//! let service = NameGeneratorService::new();
//!
//! // a, l, X, x, b, X, n, c, a, X, n
//! let letters = service.names_flux_concat_map(2).collect().await?;
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ReactiveConfig;
use crate::publisher::{self, DelayProvider, FixedDelay, Flux, Mono, RandomDelay};

const SWITCH_FALLBACK: &str = "this is the default stream - publisher";
const DEFAULT_NAME: &str = "default";
const MONO_NAME: &str = "almuhannad";
const SPLIT_MONO_DELAY: Duration = Duration::from_secs(1);
const MERGE_FIRST_DELAY: Duration = Duration::from_millis(100);
const MERGE_SECOND_DELAY: Duration = Duration::from_millis(125);

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Service producing name sequences
#[derive(Clone)]
pub struct NameGeneratorService {
    config: ReactiveConfig,
    delay: Arc<dyn DelayProvider>,
}

impl Debug for NameGeneratorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameGeneratorService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for NameGeneratorService {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGeneratorService {
    /// Service with the default configuration
    pub fn new() -> Self {
        Self::with_config(ReactiveConfig::default())
    }

    /// Service whose random delays and flat_map concurrency follow `config`
    pub fn with_config(config: ReactiveConfig) -> Self {
        let delay = Arc::new(RandomDelay::from_config(&config));
        Self { config, delay }
    }

    /// Replace the delay provider used by [`split_names_with_delay`](Self::split_names_with_delay)
    pub fn with_delay<D>(mut self, delay: D) -> Self
    where
        D: DelayProvider + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    /// Configuration this service was built with
    pub fn config(&self) -> &ReactiveConfig {
        &self.config
    }

    // Flux

    pub fn names_flux(&self) -> Flux<String> {
        Flux::from_iterable(owned(&["Alex", "Ben", "Caeser"])).log("names_flux")
    }

    pub fn names_flux_map(&self) -> Flux<String> {
        Flux::from_iterable(owned(&["ibrahim", "mohammad", "ismael", "mousa"]))
            .map(|name| name.to_uppercase())
            .log("names_flux_map")
    }

    /// The uppercase pipeline is built and dropped, so the source names
    /// come through unchanged
    pub fn names_flux_immutable(&self) -> Flux<String> {
        let names = Flux::from_iterable(owned(&["aaa", "bbb", "ccc"]));
        let _ = names.clone().map(|name| name.to_uppercase());
        names
    }

    /// Names longer than `min_length`, formatted as `"<length>-<name>"`
    pub fn names_flux_filter(&self, min_length: usize) -> Flux<String> {
        Flux::from_iterable(owned(&["ed", "edd", "eddy", "johnny", "jack", "jameson"]))
            .filter(move |name| name.len() > min_length)
            .map(|name| format!("{}-{}", name.len(), name))
    }

    /// Letters of every uppercase name longer than `min_length`
    pub fn names_flux_flat_map(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        let names = Flux::from_iterable(owned(&["alex", "ben", "caen", "dorothy", "egor"]))
            .map(|name| name.to_uppercase())
            .filter(move |name| name.len() > min_length);

        self.flat_map(names, move |name| service.split_names(&name))
            .log("names_flux_flat_map")
    }

    /// Like [`names_flux_flat_map`](Self::names_flux_flat_map) with a delay
    /// per name, so letters of different names interleave
    pub fn names_flux_flat_map_async(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        let names = Flux::from_iterable(owned(&["aaa", "bb", "cccc"]))
            .map(|name| name.to_uppercase())
            .filter(move |name| name.len() > min_length);

        self.flat_map(names, move |name| service.split_names_with_delay(&name))
            .log("names_flux_flat_map_async")
    }

    /// Letters of every name longer than `min_length` after replacing `e`
    /// with `X`, in name order despite the per-name delay
    pub fn names_flux_concat_map(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        Flux::from_iterable(owned(&["alex", "ben", "caen"]))
            .map(|name| name.replace('e', "X"))
            .filter(move |name| name.len() > min_length)
            .concat_map(move |name| service.split_names_with_delay(&name))
            .log("names_flux_concat_map")
    }

    pub fn names_flux_transform(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        let names = Self::transform_names()
            .transform(|names| Self::uppercase_longer_than(names, min_length));

        self.flat_map(names, move |name| service.split_names(&name))
            .log("names_flux_transform")
    }

    /// Emits `"default"` when no name is longer than `min_length`
    pub fn names_flux_transform_default_if_empty(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        let names = Self::transform_names()
            .transform(|names| Self::uppercase_longer_than(names, min_length));

        self.flat_map(names, move |name| service.split_names(&name))
            .default_if_empty(DEFAULT_NAME.to_string())
            .log("names_flux_transform_default_if_empty")
    }

    /// Switches to a one-value fallback flux when no name is longer than
    /// `min_length`
    pub fn names_flux_transform_switch_if_empty(&self, min_length: usize) -> Flux<String> {
        let service = self.clone();
        let split_long_names = move |names: Flux<String>| {
            let splitter = service.clone();
            service.flat_map(
                Self::uppercase_longer_than(names, min_length),
                move |name| splitter.split_names(&name),
            )
        };
        let fallback = Flux::just(SWITCH_FALLBACK.to_string());

        Self::transform_names()
            .transform(split_long_names)
            .switch_if_empty(fallback)
            .log("names_flux_transform_switch_if_empty")
    }

    /// One value per character of `name`
    pub fn split_names(&self, name: &str) -> Flux<String> {
        Flux::from_iterable(name.chars().map(String::from).collect::<Vec<_>>())
    }

    /// Like [`split_names`](Self::split_names) with one delay, drawn now from
    /// the service's provider, applied before every character
    pub fn split_names_with_delay(&self, name: &str) -> Flux<String> {
        let delay = self.delay.next_delay();
        debug!(name = %name, delay_ms = delay.as_millis() as u64, "Splitting name with delay");
        self.split_names(name).delay_elements(delay)
    }

    // Mono

    pub fn name_mono(&self) -> Mono<String> {
        Mono::just(MONO_NAME.to_string()).log("name_mono")
    }

    pub fn name_mono_with_map(&self, name: &str) -> Mono<String> {
        Mono::just(name.to_string())
            .map(|name| name.to_uppercase())
            .log("name_mono_with_map")
    }

    /// The uppercase name as one list of characters, after one second
    pub fn name_mono_with_flat_map(&self) -> Mono<Vec<String>> {
        let service = self.clone();
        Mono::just(MONO_NAME.to_string())
            .map(|name| name.to_uppercase())
            .flat_map(move |name| service.split_string_mono(&name))
            .log("name_mono_with_flat_map")
    }

    pub fn name_mono_with_flat_map_many(&self, name: &str) -> Flux<String> {
        let service = self.clone();
        Mono::just(name.to_string())
            .map(|name| name.to_uppercase())
            .flat_map_many(move |name| service.split_names(&name))
            .log("name_mono_with_flat_map_many")
    }

    /// The characters of `s` as a single list, delayed by one second
    pub fn split_string_mono(&self, s: &str) -> Mono<Vec<String>> {
        let letters: Vec<String> = s.chars().map(String::from).collect();
        Mono::just(letters).delay_element(SPLIT_MONO_DELAY)
    }

    // Combining sequences

    /// A, B, C, D, E, F, G, H
    pub fn explore_concat(&self) -> Flux<String> {
        let first = Flux::from_iterable(owned(&["A", "B", "C"]))
            .concat_with(Mono::just("D".to_string()));
        let second = Flux::from_iterable(owned(&["E", "F", "G"]))
            .concat_with(Mono::just("H".to_string()));

        publisher::concat([first, second])
    }

    pub fn explore_concat_mono(&self) -> Flux<String> {
        Mono::just("A".to_string())
            .concat_with(Mono::just("B".to_string()))
            .log("explore_concat_mono")
    }

    /// Two delayed fluxes merged; values interleave by arrival time
    pub fn explore_merge(&self) -> Flux<String> {
        let (first, second) = Self::merge_sources();
        publisher::merge([first, second]).log("explore_merge")
    }

    pub fn explore_merge_with(&self) -> Flux<String> {
        let (first, second) = Self::merge_sources();
        first.merge_with(second).log("explore_merge_with")
    }

    pub fn explore_merge_with_mono(&self) -> Flux<String> {
        Mono::just("Almuhannad".to_string())
            .merge_with(Mono::just("Ada".to_string()))
            .log("explore_merge_with_mono")
    }

    fn flat_map<F>(&self, names: Flux<String>, f: F) -> Flux<String>
    where
        F: Fn(String) -> Flux<String> + Send + Sync + 'static,
    {
        match self.config.flat_map_concurrency {
            Some(limit) => names.flat_map_with_concurrency(limit, f),
            None => names.flat_map(f),
        }
    }

    fn transform_names() -> Flux<String> {
        Flux::from_iterable(owned(&["alex", "ben", "caen", "alibouz"]))
    }

    fn uppercase_longer_than(names: Flux<String>, min_length: usize) -> Flux<String> {
        names
            .map(|name| name.to_uppercase())
            .filter(move |name| name.len() > min_length)
    }

    fn merge_sources() -> (Flux<String>, Flux<String>) {
        let first = Flux::from_iterable(owned(&["Almuhannad", "Khalid", "Almhari"]))
            .delay_elements(MERGE_FIRST_DELAY);
        let second = Flux::from_iterable(owned(&["Ada", "Boe", "Charlie"]))
            .delay_elements(MERGE_SECOND_DELAY);
        (first, second)
    }
}

/// Service whose per-name delays are all `delay`
impl From<FixedDelay> for NameGeneratorService {
    fn from(delay: FixedDelay) -> Self {
        Self::new().with_delay(delay)
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer
//!
//! Services are callers of the sequence engine: they assemble pipelines
//! from the operator library and hand them to the caller unsubscribed.
//!
//! # Architecture
//!
//! ```text
//! Caller
//!     ↓
//! Service method (assembles a Flux / Mono)
//!     ↓
//! subscribe / collect / StepVerifier
//!     ↓
//! Run: source → operators → subscriber
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_reactive::service::NameGeneratorService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = NameGeneratorService::new();
//!
//!     // Nothing happens until subscription
//!     let names = service.names_flux_map();
//!
//!     for name in names.collect().await? {
//!         println!("{name}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod name_generator;

pub use name_generator::NameGeneratorService;

//! scout-resolver library interface
//!
//! Resolves free-text player names to canonical rated profiles: cache,
//! local reference dataset (exact, then fuzzy), and optional live
//! enrichment through an ordered fetch strategy chain.

pub mod batch;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod matcher;
pub mod normalize;
pub mod orchestrator;
pub mod rate_limiter;
pub mod roster;
pub mod types;

pub use crate::batch::{BatchOutcome, BatchResolver, Resolve};
pub use crate::config::ResolverConfig;
pub use crate::error::{ResolveError, ResolveResult};
pub use crate::orchestrator::EnrichmentOrchestrator;
pub use crate::types::{CanonicalProfile, Query, Resolution, Source};

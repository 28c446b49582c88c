//! Analyzers over persisted evidence: risk aggregation, coverage-to-journey
//! mapping, and recommendation derivation, plus the YAML config loaders
//! they read their tunables from.

pub mod config;
pub mod journey;
pub mod recommend;
pub mod risk;

pub use config::{JourneyConfig, RiskConfig};
pub use journey::JourneyCoverage;

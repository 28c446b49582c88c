//! External tool orchestration: presence probing, bounded subprocess
//! execution, output normalization to evidence records, and the
//! sequential orchestrator that drives all collectors for one run.

pub mod churn;
pub mod contract;
pub mod coverage;
pub mod dependency_audit;
pub mod lint_quality;
pub mod lint_style;
pub mod orchestrator;
pub mod process;
pub mod security;

pub use contract::{Collector, CollectorContext, CollectorResult};

use churn::ChurnCollector;
use coverage::CoverageIngestCollector;
use dependency_audit::DependencyAuditCollector;
use lint_quality::QualityLintCollector;
use lint_style::StyleLintCollector;
use security::SecurityScanCollector;

/// The default collector set, in the order the orchestrator runs them.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(StyleLintCollector::default()),
        Box::new(QualityLintCollector::default()),
        Box::new(SecurityScanCollector::default()),
        Box::new(DependencyAuditCollector::default()),
        Box::new(CoverageIngestCollector::default()),
        Box::new(ChurnCollector::default()),
    ]
}

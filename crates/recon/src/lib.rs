//! `insight-recon`: marketing data reconciliation, metric derivation and
//! anomaly detection.
//!
//! Pure engine crate: receives pre-loaded tables, returns the unified
//! dataset, summaries and anomaly findings. No CLI dependencies.

pub mod aggregate;
pub mod anomaly;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod model;
pub mod ratio;
pub mod reconcile;
pub mod schema;
pub mod summary;
pub mod table;

pub use anomaly::{scan, DEFAULT_DROP_THRESHOLD};
pub use config::ReportConfig;
pub use engine::{run, InsightInput};
pub use error::InsightError;
pub use model::{AnomalyFinding, CampaignSummary, InsightResult, OverallSummary, UnifiedDataset, UnifiedRecord};
pub use reconcile::reconcile;
pub use summary::summarize;
pub use table::{Table, Value};

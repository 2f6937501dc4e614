//! # pcert-metrics — Provider Metrics Aggregates
//!
//! Maintains the denormalized per-provider counters, derived scores, and
//! timeline averages shown on dashboards, fed exclusively by transition
//! events from the lifecycle outbox.
//!
//! ## Ownership Rule
//!
//! `ProviderProfile` is the single owner of all counters for its provider,
//! and the `MetricsStore` serializes every mutation behind one lock. No
//! other component reads-then-writes a counter; concurrent transitions on
//! the same provider cannot lose updates.

pub mod profile;
pub mod scores;
pub mod stats;
pub mod store;
pub mod timeline;

pub use profile::ProviderProfile;
pub use scores::{compute as compute_scores, Scores};
pub use stats::{global_stats, trend, GlobalStats, Trend};
pub use store::{MetricsReactor, MetricsStore};
pub use timeline::RollingAverage;

//! Pipeline composition and output planning for Plait build plans.
//!
//! Takes a [`ResolvedProfile`](plait_config::ResolvedProfile) and a
//! [`BuildContext`](plait_config::BuildContext) and produces the ordered
//! transform rules, the ordered plugin list, and the final [`BuildPlan`].
//! Composition is pure and deterministic: the same inputs always yield a
//! byte-identical plan.

pub mod plan;
pub mod planner;
pub mod plugin;
pub mod rules;
pub mod stage;

// Re-export main types
pub use plan::{compose, compose_plan, BuildPlan};
pub use planner::plan;
pub use plugin::{compose_plugins, PluginBucket, PluginDescriptor};
pub use rules::{compose_rules, TransformRule};
pub use stage::{AssetClass, StageInvocation, StagePhase, StageRegistry, StageSpec};

//! Profile fragments, environment resolution, and merge logic for Plait
//! build plans.
//!
//! This crate is the configuration half of the composer: it resolves an
//! immutable [`BuildContext`] from the raw environment, merges registered
//! [`ProfileFragment`]s into a [`ResolvedProfile`], and defines the shared
//! [`ConfigError`] taxonomy. Pipeline composition lives in `plait-compose`.

pub mod context;
pub mod discovery;
pub mod error;
pub mod profile;

// Re-export main types
pub use context::{BuildContext, Mode, ENV_ALLOW_LIST};
pub use error::{ConfigError, Result};
pub use profile::{
    merge_values, DevtoolStrategy, OutputNaming, ProfileFragment, ProfileRegistry,
    ResolvedProfile, ServerOptions,
};

pub use discovery::FragmentDiscovery;

//! Health probes over the MCP server configuration store.
//!
//! Each [`Probe`] inspects one entry of the JSON store (or a local command)
//! and reports `ok`, `attention`, or `failed`. [`ProbeRegistry`] runs them in
//! order, isolates failures, and returns a [`HealthReport`]. The [`store`]
//! module also edits the store in place for token injection.

pub mod probe;
pub mod probes;
pub mod registry;
pub mod store;

pub use probe::{Probe, ProbeResult, ProbeStatus, Verdict};
pub use probes::{CommandCheck, CommandProbe, Detail, ManualStep, ServerProbe, StaticProbe};
pub use registry::{
    default_registry, default_registry_in, HealthOutcome, HealthReport, HealthSummary, ProbeEvent, ProbeRegistry,
};
pub use store::{
    check_token_format, inject_token, mask_token, McpConfig, ServerEntry, TokenFormat, DEFAULT_CONFIG_PATH,
    GITHUB_SERVER, GITHUB_TOKEN_ENV,
};

//! Workspace server library
//!
//! Workspaces are identified by human-readable slugs. The [`slug`] module
//! turns free text into slug candidates and probes for a free one; the
//! [`workspace`] module persists records under a unique constraint and
//! retries when a concurrent writer claims the slug first.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics_exporter;
pub mod slug;
pub mod supervisor;
pub mod validation;
pub mod workspace;

pub mod test_helpers;

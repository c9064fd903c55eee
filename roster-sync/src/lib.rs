//! # roster-sync
//!
//! One-way reconciliation of a content-managed team roster against an
//! authoritative agent directory.
//!
//! Wire an [`Engine`] to the four collaborator [`ports`], then call
//! [`Engine::preview`] to see the decisions or [`Engine::commit`] to apply
//! them under a wall-clock budget and get a [`RunReport`].
//!
//! The planning half ([`identity`], [`merge`], [`planner`]) is pure and can be
//! used without any collaborator.

pub mod budget;
pub mod engine;
pub mod error;
pub mod identity;
pub mod merge;
pub mod photo;
pub mod planner;
pub mod ports;
pub mod report;
pub mod run_store;
pub mod slug;
pub mod source;

pub use engine::{Engine, Preview};
pub use error::{CollaboratorError, SyncError};
pub use planner::{Action, Change, Decision, Plan, PlanSummary};
pub use ports::{AgentDirectory, PhotoUploader, RosterReader, RosterWriter};
pub use report::RunReport;

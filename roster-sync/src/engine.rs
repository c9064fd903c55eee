//! Run orchestration: preview and commit.
//!
//! ```text
//! fetch directory ─┐
//!                  ├─ resolve ─ plan ─┬─ preview: return the plan
//! load snapshot ───┘                  └─ commit:  pass 1 (create/update/skip)
//!                                                 pass 2 (deactivate), only if
//!                                                 pass 1 finished in budget
//!                                                 and every office answered
//! ```
//!
//! Runs are assumed not to overlap; mutual exclusion is the caller's job.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use roster_core::{RosterEntry, SyncConfig, TriggerKind};

use crate::budget::{Budget, BudgetState};
use crate::error::{CollaboratorError, SyncError};
use crate::identity::resolve;
use crate::photo;
use crate::planner::{plan, Change, Decision, Plan, PlanOptions};
use crate::ports::{AgentDirectory, PhotoUploader, RosterReader, RosterWriter};
use crate::report::RunReport;
use crate::source::{fetch_agents, load_snapshot, DirectoryFetch};

/// Read-only result of planning a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub generated_at: DateTime<Utc>,
    pub plan: Plan,
    pub office_errors: Vec<String>,
}

/// What happened to one first-pass record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Created,
    Updated,
    Skipped,
}

/// The reconciliation engine, wired to its collaborators.
pub struct Engine<'a> {
    directory: &'a dyn AgentDirectory,
    reader: &'a dyn RosterReader,
    writer: &'a dyn RosterWriter,
    photos: &'a dyn PhotoUploader,
}

impl<'a> Engine<'a> {
    pub fn new(
        directory: &'a dyn AgentDirectory,
        reader: &'a dyn RosterReader,
        writer: &'a dyn RosterWriter,
        photos: &'a dyn PhotoUploader,
    ) -> Self {
        Self {
            directory,
            reader,
            writer,
            photos,
        }
    }

    /// Fetch both sides concurrently. The only concurrency in a run.
    async fn gather(
        &self,
        config: &SyncConfig,
    ) -> Result<(DirectoryFetch, Vec<RosterEntry>), SyncError> {
        config.validate()?;
        let offices = config.office_selectors();
        let (fetched, snapshot) = tokio::join!(
            fetch_agents(self.directory, &offices),
            load_snapshot(self.reader)
        );
        Ok((fetched?, snapshot?))
    }

    async fn build_plan(
        &self,
        config: &SyncConfig,
        now: DateTime<Utc>,
    ) -> Result<(Plan, Vec<String>), SyncError> {
        let (fetched, snapshot) = self.gather(config).await?;
        let resolution = resolve(fetched.agents, snapshot);
        let opts = PlanOptions {
            default_order: config.default_order,
            now,
        };
        let mut plan = plan(resolution, &opts);
        if !fetched.office_errors.is_empty() && !plan.deactivations.is_empty() {
            // A failed office lists nobody, so its agents would all look absent.
            tracing::warn!(
                failed_offices = fetched.office_errors.len(),
                held_deactivations = plan.deactivations.len(),
                "office fetch failed; deactivation pass skipped",
            );
            plan.deactivations.clear();
        }
        Ok((plan, fetched.office_errors))
    }

    /// Compute every decision without uploading or writing anything.
    pub async fn preview(&self, config: &SyncConfig) -> Result<Preview, SyncError> {
        let now = Utc::now();
        let (plan, office_errors) = self.build_plan(config, now).await?;
        Ok(Preview {
            generated_at: now,
            plan,
            office_errors,
        })
    }

    /// Plan and apply a run using the budget configured for `trigger`.
    pub async fn commit(
        &self,
        config: &SyncConfig,
        trigger: TriggerKind,
    ) -> Result<RunReport, SyncError> {
        let limit = config.budgets.for_trigger(trigger);
        self.commit_within(config, trigger, limit).await
    }

    /// Plan and apply a run that must stop once `limit` has elapsed.
    ///
    /// Only configuration and connectivity problems are returned as errors;
    /// everything else lands in the report.
    pub async fn commit_within(
        &self,
        config: &SyncConfig,
        trigger: TriggerKind,
        limit: Duration,
    ) -> Result<RunReport, SyncError> {
        let started = tokio::time::Instant::now();
        let started_at = Utc::now();
        let mut budget = Budget::start(limit);
        let mut report = RunReport::begin(trigger, started_at);

        let (plan, office_errors) = self.build_plan(config, started_at).await?;
        report.office_errors = office_errors;
        for name in &plan.unidentified {
            report.record_error(name, "directory record has no staff, entity, or row identifier");
        }

        tracing::info!(
            trigger = %trigger,
            upserts = plan.upserts.len(),
            deactivations = plan.deactivations.len(),
            budget_ms = u64::try_from(budget.remaining().as_millis()).unwrap_or(u64::MAX),
            "sync plan ready",
        );

        self.first_pass(plan.upserts, &mut budget, &mut report).await;
        if report.timed_out {
            tracing::warn!(
                skipped_deactivations = plan.deactivations.len(),
                "budget exhausted during create/update pass; deactivation pass skipped",
            );
        } else {
            self.second_pass(plan.deactivations, &mut budget, &mut report)
                .await;
        }

        let elapsed = started.elapsed().as_millis();
        report.finish(Utc::now(), u64::try_from(elapsed).unwrap_or(u64::MAX));
        tracing::info!(summary = %report, duration_ms = report.duration_ms, "sync run finished");
        Ok(report)
    }

    async fn first_pass(
        &self,
        decisions: Vec<Decision>,
        budget: &mut Budget,
        report: &mut RunReport,
    ) {
        for decision in decisions {
            if budget.check() == BudgetState::TimedOut {
                report.mark_timed_out();
                break;
            }
            let label = decision.label.clone();
            match self.apply_upsert(decision).await {
                Ok(Applied::Created) => report.record_added(),
                Ok(Applied::Updated) => report.record_updated(),
                Ok(Applied::Skipped) => report.record_skipped(),
                Err(err) => {
                    tracing::error!(agent = %label, error = %err, "record failed");
                    report.record_error(&label, err);
                }
            }
        }
    }

    async fn second_pass(
        &self,
        decisions: Vec<Decision>,
        budget: &mut Budget,
        report: &mut RunReport,
    ) {
        for decision in decisions {
            if budget.check() == BudgetState::TimedOut {
                tracing::warn!("budget exhausted during deactivation pass");
                report.mark_timed_out();
                break;
            }
            let Change::Deactivate { id, patch } = &decision.change else {
                continue;
            };
            match self.writer.patch(id, patch).await {
                Ok(()) if patch.active == Some(false) => {
                    tracing::info!(entry = %id, agent = %decision.label, "deactivated");
                    report.record_deactivated();
                }
                Ok(()) => {
                    tracing::debug!(entry = %id, agent = %decision.label, "deactivation locked");
                    report.record_skipped();
                }
                Err(err) => {
                    tracing::error!(entry = %id, agent = %decision.label, error = %err, "deactivation failed");
                    report.record_error(&decision.label, err);
                }
            }
        }
    }

    async fn apply_upsert(&self, decision: Decision) -> Result<Applied, CollaboratorError> {
        let photo_fields = match &decision.photo {
            Some(change) => photo::upload(self.photos, change, &decision.label).await,
            None => Default::default(),
        };

        match decision.change {
            Change::Create { mut entry } => {
                for (field, value) in photo_fields {
                    entry.fields.set(field, value);
                }
                let id = self.writer.create(&entry).await?;
                tracing::info!(entry = %id, canonical_id = %decision.canonical_id, agent = %decision.label, "created");
                Ok(Applied::Created)
            }
            Change::Update { id, mut patch } => {
                patch.fields.extend(photo_fields);
                if !patch.has_changes() {
                    // Only a photo was pending and its upload failed.
                    return Ok(Applied::Skipped);
                }
                self.writer.patch(&id, &patch).await?;
                tracing::info!(entry = %id, agent = %decision.label, reason = %decision.reason, "updated");
                Ok(Applied::Updated)
            }
            Change::Skip { .. } => Ok(Applied::Skipped),
            Change::Deactivate { .. } => Ok(Applied::Skipped),
        }
    }
}

//! Run report: the outcome of one commit invocation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::TriggerKind;

/// Counters and error lines for one run. The sole record of what a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub trigger: TriggerKind,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: u64,
    pub added: usize,
    pub updated: usize,
    /// Entries switched from active to inactive. Lock-only writes on
    /// entries that were already hidden count as `skipped`.
    pub deactivated: usize,
    pub skipped: usize,
    /// `"<agent>: <error>"`, one per failed record.
    #[serde(default)]
    pub errors: Vec<String>,
    /// `"<office>: <error>"`, one per office whose fetch failed.
    #[serde(default)]
    pub office_errors: Vec<String>,
    pub timed_out: bool,
}

impl RunReport {
    pub fn begin(trigger: TriggerKind, started_at: DateTime<Utc>) -> Self {
        Self {
            trigger,
            started_at,
            finished_at: None,
            duration_ms: 0,
            added: 0,
            updated: 0,
            deactivated: 0,
            skipped: 0,
            errors: Vec::new(),
            office_errors: Vec::new(),
            timed_out: false,
        }
    }

    pub fn record_added(&mut self) {
        self.added += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub fn record_deactivated(&mut self) {
        self.deactivated += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_error(&mut self, label: &str, error: impl fmt::Display) {
        self.errors.push(format!("{label}: {error}"));
    }

    pub fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>, duration_ms: u64) {
        self.finished_at = Some(finished_at);
        self.duration_ms = duration_ms;
    }

    /// Nothing failed and the run completed inside its budget.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.office_errors.is_empty() && !self.timed_out
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} deactivated, {} skipped, {} error(s)",
            self.added,
            self.updated,
            self.deactivated,
            self.skipped,
            self.errors.len() + self.office_errors.len()
        )?;
        if self.timed_out {
            write!(f, " (timed out)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_and_errors_accumulate() {
        let mut report = RunReport::begin(TriggerKind::Interactive, Utc::now());
        report.record_added();
        report.record_updated();
        report.record_updated();
        report.record_skipped();
        report.record_error("Jane Doe", "roster rejected the request: boom");
        assert_eq!((report.added, report.updated, report.skipped), (1, 2, 1));
        assert_eq!(report.errors, vec!["Jane Doe: roster rejected the request: boom"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn display_mentions_timeout() {
        let mut report = RunReport::begin(TriggerKind::Background, Utc::now());
        report.mark_timed_out();
        assert_eq!(
            report.to_string(),
            "0 added, 0 updated, 0 deactivated, 0 skipped, 0 error(s) (timed out)"
        );
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let report = RunReport::begin(TriggerKind::Interactive, Utc::now());
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["timedOut"], false);
        assert_eq!(json["trigger"], "interactive");
        assert!(json.get("finishedAt").is_none());
    }
}

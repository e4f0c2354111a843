//! Job status engine
//!
//! Status is never stored: it is folded from the append-only log history of a job.
//! Lifecycle:
//!   CREATED → STARTED → PENDING → MINED | NEVER_MINED
//!                  ↘ STORED    ↘ RESENDING / RECOVERING
//!                  ↘ FAILED
//! WARNING may be appended at any time and never changes the derived status.

use serde::{Deserialize, Serialize};

use super::log::Log;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Started,
    Pending,
    Resending,
    Recovering,
    Warning,
    Mined,
    NeverMined,
    Stored,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 10] = [
        JobStatus::Created,
        JobStatus::Started,
        JobStatus::Pending,
        JobStatus::Resending,
        JobStatus::Recovering,
        JobStatus::Warning,
        JobStatus::Mined,
        JobStatus::NeverMined,
        JobStatus::Stored,
        JobStatus::Failed,
    ];

    /// Whether `self` may be appended on top of a job currently in `current`
    pub fn can_transition_from(self, current: JobStatus) -> bool {
        match self {
            JobStatus::Created => false,
            JobStatus::Started => current == JobStatus::Created,
            JobStatus::Pending => matches!(current, JobStatus::Started | JobStatus::Recovering),
            JobStatus::Resending => current == JobStatus::Pending,
            JobStatus::Recovering => matches!(
                current,
                JobStatus::Started | JobStatus::Recovering | JobStatus::Pending
            ),
            JobStatus::Mined | JobStatus::NeverMined => current == JobStatus::Pending,
            JobStatus::Stored => matches!(current, JobStatus::Started | JobStatus::Recovering),
            JobStatus::Failed => matches!(
                current,
                JobStatus::Started | JobStatus::Recovering | JobStatus::Pending
            ),
            // Warnings are annotations, not lifecycle steps
            JobStatus::Warning => true,
        }
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            JobStatus::Mined | JobStatus::NeverMined | JobStatus::Stored | JobStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Created => "CREATED",
            JobStatus::Started => "STARTED",
            JobStatus::Pending => "PENDING",
            JobStatus::Resending => "RESENDING",
            JobStatus::Recovering => "RECOVERING",
            JobStatus::Warning => "WARNING",
            JobStatus::Mined => "MINED",
            JobStatus::NeverMined => "NEVER_MINED",
            JobStatus::Stored => "STORED",
            JobStatus::Failed => "FAILED",
        }
    }
}

/// `next` is legal on top of `current`
pub fn can_transition(next: JobStatus, current: JobStatus) -> bool {
    next.can_transition_from(current)
}

pub fn is_final(status: JobStatus) -> bool {
    status.is_final()
}

/// Fold the log history (ordered by id) into the effective status.
///
/// RESENDING and WARNING entries are skipped, as is a FAILED entry directly
/// following a RESENDING one (a failed resend does not fail the job).
/// Returns CREATED for an empty history.
pub fn derive_status(logs: &[Log]) -> JobStatus {
    let mut status = JobStatus::Created;
    for (idx, log) in logs.iter().enumerate() {
        match log.status {
            JobStatus::Resending | JobStatus::Warning => continue,
            JobStatus::Failed if idx > 0 && logs[idx - 1].status == JobStatus::Resending => continue,
            other => status = other,
        }
    }
    status
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown job status: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn logs(statuses: &[JobStatus]) -> Vec<Log> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Log {
                id: i as i32 + 1,
                job_id: 1,
                status: *status,
                message: String::new(),
                created_at: Utc::now(),
            })
            .collect()
    }

    fn expected(next: JobStatus, current: JobStatus) -> bool {
        use JobStatus::*;
        match next {
            Created => false,
            Started => current == Created,
            Pending => current == Started || current == Recovering,
            Resending => current == Pending,
            Recovering => current == Started || current == Recovering || current == Pending,
            Mined | NeverMined => current == Pending,
            Stored => current == Started || current == Recovering,
            Failed => current == Started || current == Recovering || current == Pending,
            Warning => true,
        }
    }

    #[test]
    fn test_transition_table_is_exhaustive() {
        for next in JobStatus::ALL {
            for current in JobStatus::ALL {
                assert_eq!(
                    can_transition(next, current),
                    expected(next, current),
                    "{} -> {}",
                    current,
                    next
                );
            }
        }
    }

    #[test]
    fn test_created_is_never_a_target() {
        assert!(JobStatus::ALL.iter().all(|s| !can_transition(JobStatus::Created, *s)));
    }

    #[test]
    fn test_warning_always_allowed() {
        assert!(JobStatus::ALL.iter().all(|s| can_transition(JobStatus::Warning, *s)));
    }

    #[test]
    fn test_final_statuses() {
        let finals: Vec<_> = JobStatus::ALL.iter().copied().filter(|s| s.is_final()).collect();
        assert_eq!(
            finals,
            vec![JobStatus::Mined, JobStatus::NeverMined, JobStatus::Stored, JobStatus::Failed]
        );
    }

    #[test]
    fn test_derive_skips_warning() {
        use JobStatus::*;
        let history = logs(&[Created, Started, Warning, Pending]);
        assert_eq!(derive_status(&history), Pending);
        assert_eq!(derive_status(&logs(&[Created, Started, Pending, Warning])), Pending);
    }

    #[test]
    fn test_derive_ignores_failed_resend() {
        use JobStatus::*;
        let history = logs(&[Created, Started, Pending, Resending, Failed]);
        assert_eq!(derive_status(&history), Pending);

        // A FAILED that does not directly follow a RESENDING counts
        let history = logs(&[Created, Started, Pending, Resending, Warning, Failed]);
        assert_eq!(derive_status(&history), Failed);
    }

    #[test]
    fn test_derive_is_idempotent() {
        use JobStatus::*;
        let history = logs(&[Created, Started, Recovering, Pending, Mined]);
        assert_eq!(derive_status(&history), derive_status(&history));
        assert_eq!(derive_status(&history), Mined);
        assert_eq!(derive_status(&[]), Created);
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert_eq!("never_mined".parse::<JobStatus>().unwrap(), JobStatus::NeverMined);
        assert!("BOGUS".parse::<JobStatus>().is_err());
        assert_eq!(serde_json::to_string(&JobStatus::NeverMined).unwrap(), "\"NEVER_MINED\"");
    }
}

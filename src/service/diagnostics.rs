//! One-shot capture of the first constraint violation seen by the process.

use crate::error::ConstraintViolation;
use crate::store::PetStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

pub struct ConstraintDiagnostics {
    captured: AtomicBool,
    settle: Duration,
    cooldown: Duration,
}

impl Default for ConstraintDiagnostics {
    fn default() -> Self {
        Self::with_pauses(Duration::from_millis(400), Duration::from_millis(500))
    }
}

impl ConstraintDiagnostics {
    pub fn with_pauses(settle: Duration, cooldown: Duration) -> Self {
        ConstraintDiagnostics {
            captured: AtomicBool::new(false),
            settle,
            cooldown,
        }
    }

    /// True for exactly one caller over the lifetime of this value.
    pub fn try_claim(&self) -> bool {
        self.captured
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_captured(&self) -> bool {
        self.captured.load(Ordering::Acquire)
    }

    /// Log everything the backend reported, then the tag id range between two pauses.
    /// Runs only for the caller that wins `try_claim`; everyone else gets `None` at once.
    pub async fn observe(
        &self,
        store: &dyn PetStore,
        submitted_id: Option<i64>,
        reported_id: i64,
        violation: &ConstraintViolation,
    ) -> Option<Capture> {
        if !self.try_claim() {
            return None;
        }
        warn!(was = ?submitted_id, is = reported_id, "pet id after failed create");
        warn!(
            kind = violation.kind,
            code = ?violation.code,
            message = %violation.message,
            detail = ?violation.detail,
            hint = ?violation.hint,
            schema = ?violation.schema,
            table = ?violation.table,
            column = ?violation.column,
            data_type = ?violation.data_type,
            constraint = ?violation.constraint,
            "where" = ?violation.where_,
            statement = ?violation.statement,
            "constraint violation while creating pet"
        );
        tokio::time::sleep(self.settle).await;
        let tag_ids = match store.tag_id_range().await {
            Ok((min, max)) => {
                warn!(min = ?min, max = ?max, "tags have range");
                Some((min, max))
            }
            Err(e) => {
                warn!(error = %e, "tag id range unavailable");
                None
            }
        };
        tokio::time::sleep(self.cooldown).await;
        Some(Capture {
            submitted_id,
            reported_id,
            tag_ids,
        })
    }
}

/// What the one capture recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Id in the create request, if the client sent one.
    pub submitted_id: Option<i64>,
    /// Id the caller is answered with.
    pub reported_id: i64,
    /// Lowest and highest stored tag id; `None` when the range query failed.
    pub tag_ids: Option<(Option<i64>, Option<i64>)>,
}

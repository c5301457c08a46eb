//! Non-destructive merge of an optimistic local write with an asynchronous
//! authoritative refetch.
//!
//! The collaborator sometimes answers a single-shipment refetch with an
//! empty or stale sub-collection immediately after a write (a
//! read-after-write race on its join/cache layer). The rules here make sure
//! such a response never erases items or documents the user just saved:
//! scalars always come from the fetched record, sub-collections only when
//! the fetched array is non-empty.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Shipment;

/// Which sub-collection a discrepancy was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubCollection {
    Items,
    Documents,
}

impl std::fmt::Display for SubCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Items => write!(f, "items"),
            Self::Documents => write!(f, "documents"),
        }
    }
}

/// Diagnostics record for a refetch that disagreed with local state.
/// Never fatal; retained so support can correlate user reports with the
/// backend race.
#[derive(Debug, Clone, Serialize)]
pub struct Discrepancy {
    pub shipment_id: i64,
    pub collection: SubCollection,
    pub local_count: usize,
    pub fetched_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl Discrepancy {
    fn new(
        shipment_id: i64,
        collection: SubCollection,
        local_count: usize,
        fetched_count: usize,
    ) -> Self {
        Self {
            shipment_id,
            collection,
            local_count,
            fetched_count,
            timestamp: Utc::now(),
        }
    }
}

/// Result of a merge: the shipment to show, plus any discrepancies that
/// were resolved in the local buffer's favor.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub shipment: Shipment,
    pub discrepancies: Vec<Discrepancy>,
}

/// Merge a fetched record over the local buffer.
///
/// Every scalar field takes the fetched value (scalars are not subject to
/// the race). Items and documents take the fetched array only when it is
/// non-empty; otherwise the local sub-collection survives, and the event is
/// recorded when local data was actually at stake.
pub fn merge(local: &Shipment, fetched: Shipment) -> MergeOutcome {
    let mut merged = fetched;
    let mut discrepancies = Vec::new();

    if merged.items.is_empty() && !local.items.is_empty() {
        discrepancies.push(Discrepancy::new(
            local.id,
            SubCollection::Items,
            local.items.len(),
            0,
        ));
        merged.items = local.items.clone();
    }

    if merged.documents.is_empty() && !local.documents.is_empty() {
        discrepancies.push(Discrepancy::new(
            local.id,
            SubCollection::Documents,
            local.documents.len(),
            0,
        ));
        merged.documents = local.documents.clone();
    }

    MergeOutcome {
        shipment: merged,
        discrepancies,
    }
}

/// Stricter merge used right after a save: the submitted item set is the
/// source of truth. If the refetched count differs from the submitted
/// count at all, the submitted set is preferred and the discrepancy is
/// recorded rather than letting the backend overwrite it. Documents follow
/// the ordinary non-empty rule.
pub fn merge_after_save(submitted: &Shipment, fetched: Shipment) -> MergeOutcome {
    let mut outcome = merge(submitted, fetched);

    if outcome.shipment.items.len() != submitted.items.len() {
        outcome.discrepancies.push(Discrepancy::new(
            submitted.id,
            SubCollection::Items,
            submitted.items.len(),
            outcome.shipment.items.len(),
        ));
        outcome.shipment.items = submitted.items.clone();
    }

    outcome
}

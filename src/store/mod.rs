//! In-memory shipment collection shared by every flow.
//!
//! Multiple independent flows (status edit, driver reassignment, item edit,
//! document mutation, background refresh) mutate the same list. Each flow
//! builds a [`ShipmentPatch`] touching only the fields it owns and hands it
//! to [`ShipmentStore::apply_patch`], the single entry point that enforces
//! the non-destructive sub-collection rule uniformly instead of every call
//! site hand-rolling its own merge.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::ServiceError;
use crate::models::{Document, DriverAssignment, Item, Shipment, ShipmentStatus};
use crate::services::reconciliation::{self, Discrepancy, MergeOutcome, SubCollection};

const DIAGNOSTICS_CAPACITY: usize = 256;

/// How a patch treats a sub-collection.
#[derive(Debug, Clone)]
pub enum CollectionPatch<T> {
    /// The local flow is authoritative: replace outright (optimistic
    /// splice of submitted items, optimistic document removal).
    Replace(Vec<T>),
    /// The data came from a refetch: apply only when non-empty, otherwise
    /// keep what is already there and record the discrepancy.
    Reconcile(Vec<T>),
}

/// A partial update touching only the fields a flow owns. Unset fields are
/// preserved as-is.
#[derive(Debug, Clone, Default)]
pub struct ShipmentPatch {
    pub status: Option<ShipmentStatus>,
    pub driver: Option<Option<DriverAssignment>>,
    pub shipping_cost: Option<Decimal>,
    pub comments: Option<Option<String>>,
    pub invoice_ref: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Option<CollectionPatch<Item>>,
    pub documents: Option<CollectionPatch<Document>>,
}

impl ShipmentPatch {
    pub fn status(status: ShipmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn driver(assignment: Option<DriverAssignment>) -> Self {
        Self {
            driver: Some(assignment),
            ..Self::default()
        }
    }

    pub fn replace_items(items: Vec<Item>) -> Self {
        Self {
            items: Some(CollectionPatch::Replace(items)),
            ..Self::default()
        }
    }

    pub fn replace_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(CollectionPatch::Replace(documents)),
            ..Self::default()
        }
    }
}

/// Shared, in-memory shipment set plus a bounded diagnostics ring of
/// reconciliation discrepancies.
#[derive(Default)]
pub struct ShipmentStore {
    shipments: DashMap<i64, Shipment>,
    diagnostics: Mutex<VecDeque<Discrepancy>>,
}

impl ShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<Shipment> {
        self.shipments.get(&id).map(|entry| entry.clone())
    }

    pub fn contains(&self, id: i64) -> bool {
        self.shipments.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    /// Remove a shipment (explicit delete, or NotFound from the
    /// collaborator).
    pub fn remove(&self, id: i64) -> Option<Shipment> {
        self.shipments.remove(&id).map(|(_, shipment)| shipment)
    }

    /// Current contents, unordered. The filter/sort pipeline derives any
    /// viewer-facing ordering from this.
    pub fn snapshot(&self) -> Vec<Shipment> {
        self.shipments
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Insert or overwrite wholesale. Used for records the local session
    /// has no buffer for yet.
    pub fn insert(&self, shipment: Shipment) {
        self.shipments.insert(shipment.id, shipment);
    }

    /// Apply a field-scoped patch. Errors with `NotFound` when the
    /// shipment is not in the store.
    pub fn apply_patch(&self, id: i64, patch: ShipmentPatch) -> Result<Shipment, ServiceError> {
        let mut entry = self
            .shipments
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("shipment {id} is not loaded")))?;
        let shipment = entry.value_mut();

        if let Some(status) = patch.status {
            shipment.status = status;
        }
        if let Some(driver) = patch.driver {
            shipment.driver = driver;
        }
        if let Some(cost) = patch.shipping_cost {
            shipment.shipping_cost = cost;
        }
        if let Some(comments) = patch.comments {
            shipment.comments = comments;
        }
        if let Some(invoice_ref) = patch.invoice_ref {
            shipment.invoice_ref = Some(invoice_ref);
        }
        if let Some(delivered_at) = patch.delivered_at {
            shipment.delivered_at = Some(delivered_at);
        }
        if let Some(updated_at) = patch.updated_at {
            shipment.updated_at = updated_at;
        }

        if let Some(items) = patch.items {
            match items {
                CollectionPatch::Replace(items) => shipment.items = items,
                CollectionPatch::Reconcile(items) => {
                    if !items.is_empty() {
                        shipment.items = items;
                    } else if !shipment.items.is_empty() {
                        self.record(Discrepancy {
                            shipment_id: id,
                            collection: SubCollection::Items,
                            local_count: shipment.items.len(),
                            fetched_count: 0,
                            timestamp: Utc::now(),
                        });
                    }
                }
            }
        }

        if let Some(documents) = patch.documents {
            match documents {
                CollectionPatch::Replace(documents) => shipment.documents = documents,
                CollectionPatch::Reconcile(documents) => {
                    if !documents.is_empty() {
                        shipment.documents = documents;
                    } else if !shipment.documents.is_empty() {
                        self.record(Discrepancy {
                            shipment_id: id,
                            collection: SubCollection::Documents,
                            local_count: shipment.documents.len(),
                            fetched_count: 0,
                            timestamp: Utc::now(),
                        });
                    }
                }
            }
        }

        Ok(shipment.clone())
    }

    /// Merge a freshly fetched record over whatever is stored, per the
    /// reconciliation rules, and persist the outcome.
    pub fn sync_fetched(&self, fetched: Shipment) -> Shipment {
        let outcome = match self.get(fetched.id) {
            Some(local) => reconciliation::merge(&local, fetched),
            None => MergeOutcome {
                shipment: fetched,
                discrepancies: Vec::new(),
            },
        };
        self.absorb(outcome)
    }

    /// Post-save variant: the submitted record's item set is preferred
    /// whenever the refetched count disagrees.
    pub fn sync_after_save(&self, submitted: &Shipment, fetched: Shipment) -> Shipment {
        let outcome = reconciliation::merge_after_save(submitted, fetched);
        self.absorb(outcome)
    }

    /// Merge every record of a list refresh. List responses are never
    /// authoritative for sub-collections, so each goes through
    /// [`Self::sync_fetched`]. Entries absent from the list are kept; only
    /// an explicit NotFound evicts.
    pub fn sync_list(&self, fetched: Vec<Shipment>) {
        for record in fetched {
            self.sync_fetched(record);
        }
    }

    /// Discrepancies observed so far, oldest first.
    pub fn diagnostics(&self) -> Vec<Discrepancy> {
        self.diagnostics
            .lock()
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn absorb(&self, outcome: MergeOutcome) -> Shipment {
        for discrepancy in outcome.discrepancies {
            self.record(discrepancy);
        }
        self.shipments
            .insert(outcome.shipment.id, outcome.shipment.clone());
        outcome.shipment
    }

    fn record(&self, discrepancy: Discrepancy) {
        if let Ok(mut ring) = self.diagnostics.lock() {
            if ring.len() == DIAGNOSTICS_CAPACITY {
                ring.pop_front();
            }
            ring.push_back(discrepancy);
        }
    }
}

//! Orchestrator for the shipment lifecycle flows.
//!
//! Every operation takes an explicit [`Actor`], runs the permission guard
//! pre-flight, and pushes its mutation through the shared store so the
//! optimistic local state is visible before any refetch resolves. The
//! collaborator remains the authority for scalar fields; sub-collections
//! are protected by the reconciliation rules.

use slog::{info, warn, Logger};
use std::sync::Arc;
use tracing::instrument;

use crate::auth;
use crate::client::CollaboratorApi;
use crate::dto::{DocumentUpload, RawItem, RawLocation, ShipmentListFilter, UpdateShipmentRequest};
use crate::errors::ServiceError;
use crate::models::{Actor, Document, DocumentId, DriverAssignment, Role, Shipment, ShipmentStatus};
use crate::queries::{self, ShipmentListQuery};
use crate::services::accounting::{invoice_lines, AccountingSync, CustomerProfile, InvoiceRef};
use crate::services::drivers::{suggest_assignment, AssignmentOption};
use crate::services::reconciliation::Discrepancy;
use crate::services::shipment_status::{plan_transition, TERMINAL_LOCK_MESSAGE};
use crate::services::totals::prepare_for_save;
use crate::store::{CollectionPatch, ShipmentPatch, ShipmentStore};

/// Service for managing shipments against the collaborator API.
#[derive(Clone)]
pub struct ShipmentService {
    api: Arc<dyn CollaboratorApi>,
    store: Arc<ShipmentStore>,
    logger: Logger,
}

impl ShipmentService {
    pub fn new(api: Arc<dyn CollaboratorApi>, store: Arc<ShipmentStore>, logger: Logger) -> Self {
        Self { api, store, logger }
    }

    pub fn store(&self) -> &Arc<ShipmentStore> {
        &self.store
    }

    /// Reconciliation discrepancies observed so far, for diagnostics.
    pub fn diagnostics(&self) -> Vec<Discrepancy> {
        self.store.diagnostics()
    }

    /// Fetch the shipment list and merge it into the store. List responses
    /// are never authoritative for sub-collections.
    #[instrument(skip(self))]
    pub async fn load_shipments(
        &self,
        filter: &ShipmentListFilter,
    ) -> Result<Vec<Shipment>, ServiceError> {
        let records = self.api.list_shipments(filter).await?;
        let shipments: Vec<Shipment> = records.into_iter().map(|r| r.into_shipment()).collect();
        self.store.sync_list(shipments.clone());
        Ok(shipments)
    }

    /// Derive the list a viewer sees from the current store contents.
    pub fn visible(&self, query: &ShipmentListQuery) -> Vec<Shipment> {
        queries::visible_shipments(&self.store.snapshot(), query)
    }

    /// Single-record refetch when a shipment is opened; list responses may
    /// have omitted its items and documents.
    #[instrument(skip(self))]
    pub async fn open_shipment(&self, id: i64) -> Result<Shipment, ServiceError> {
        match self.api.get_shipment(id).await {
            Ok(record) => Ok(self.store.sync_fetched(record.into_shipment())),
            Err(ServiceError::NotFound(msg)) => {
                self.store.remove(id);
                Err(ServiceError::NotFound(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Validate, derive the shipping cost, submit, and reconcile.
    ///
    /// The submitted items are spliced into the store as soon as the update
    /// succeeds; the subsequent refetch can only confirm them, never erase
    /// them.
    #[instrument(skip(self, buffer))]
    pub async fn save_shipment(
        &self,
        actor: Actor,
        buffer: Shipment,
    ) -> Result<Shipment, ServiceError> {
        self.guard_edit(&buffer, actor)?;
        let prepared = prepare_for_save(buffer)?;

        let current_status = self
            .store
            .get(prepared.id)
            .map(|s| s.status)
            .unwrap_or(prepared.status);
        let admin_override = actor.is_admin() && current_status.is_terminal();

        self.submit(prepared, admin_override).await
    }

    /// Apply a status change through the shared update path; there is no
    /// separate transition endpoint.
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        actor: Actor,
        id: i64,
        target: ShipmentStatus,
    ) -> Result<Shipment, ServiceError> {
        let current = self.loaded(id)?;
        if actor.role == Role::Driver && !current.is_assigned_to(actor.id) {
            return Err(ServiceError::permission_denied(
                "Only the assigned driver may update this shipment",
            ));
        }

        let plan = plan_transition(current.status, target, actor.role)?;

        let mut buffer = current;
        buffer.status = plan.target;
        if plan.target == ShipmentStatus::Delivered && buffer.delivered_at.is_none() {
            buffer.delivered_at = Some(chrono::Utc::now());
        }
        // Moving away from Delivered leaves delivered_at and POD documents
        // in place: delivery history is append-only.

        self.submit(buffer, plan.admin_override).await
    }

    /// Reassign the driver. Assignment is a manual admin action; the
    /// suggester only orders the choices.
    #[instrument(skip(self))]
    pub async fn assign_driver(
        &self,
        actor: Actor,
        id: i64,
        assignment: DriverAssignment,
    ) -> Result<Shipment, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::permission_denied(
                "Only admins may reassign drivers",
            ));
        }
        let current = self.loaded(id)?;
        let admin_override = current.status.is_terminal();

        let mut buffer = current;
        buffer.driver = Some(assignment);
        self.submit(buffer, admin_override).await
    }

    /// Upload one document. The item list is cached before the call so the
    /// follow-up list refresh cannot null it out as a side effect, and the
    /// new document is appended from whatever subset of fields the
    /// collaborator returned.
    #[instrument(skip(self, upload))]
    pub async fn upload_document(
        &self,
        actor: Actor,
        shipment_id: i64,
        upload: DocumentUpload,
    ) -> Result<Shipment, ServiceError> {
        let current = self.loaded(shipment_id)?;
        self.guard_edit(&current, actor)?;

        let cached_items = current.items.clone();
        let previous_documents = current.documents.clone();
        let file_name = upload.file_name.clone();

        let raw = self.api.upload_document(shipment_id, upload).await?;
        let document = raw.normalize(shipment_id, &file_name);
        info!(self.logger, "document uploaded";
            "shipment_id" => shipment_id, "name" => %document.name);

        let mut documents = previous_documents;
        documents.push(document);

        match self.api.list_shipments(&ShipmentListFilter::default()).await {
            Ok(records) => {
                let (target, others): (Vec<_>, Vec<_>) =
                    records.into_iter().partition(|r| r.id == shipment_id);
                self.store
                    .sync_list(others.into_iter().map(|r| r.into_shipment()).collect());
                if let Some(record) = target.into_iter().next() {
                    let mut merged = record.into_shipment();
                    merged.items = cached_items;
                    merged.documents = documents;
                    self.store.insert(merged);
                } else {
                    self.patch_collections(shipment_id, cached_items, documents)?;
                }
            }
            Err(err) => {
                warn!(self.logger, "list refresh after upload failed";
                    "shipment_id" => shipment_id, "error" => %err);
                self.patch_collections(shipment_id, cached_items, documents)?;
            }
        }

        self.loaded(shipment_id)
    }

    /// Remove a document: optimistically from the local set first, then at
    /// the collaborator, then refetch with the non-destructive merge.
    #[instrument(skip(self))]
    pub async fn delete_document(
        &self,
        actor: Actor,
        shipment_id: i64,
        document_id: DocumentId,
    ) -> Result<Shipment, ServiceError> {
        let current = self.loaded(shipment_id)?;
        self.guard_edit(&current, actor)?;

        let remaining: Vec<Document> = current
            .documents
            .into_iter()
            .filter(|doc| doc.id != document_id)
            .collect();
        self.store
            .apply_patch(shipment_id, ShipmentPatch::replace_documents(remaining))?;

        if let Some(server_id) = document_id.server_id() {
            match self.api.delete_document(server_id).await {
                Ok(()) => {}
                Err(ServiceError::NotFound(_)) => {
                    // Already gone at the collaborator; the local removal
                    // stands.
                    info!(self.logger, "document already deleted remotely";
                        "document_id" => server_id);
                }
                Err(err) => return Err(err),
            }
        }

        match self.api.get_shipment(shipment_id).await {
            Ok(record) => {
                let mut fetched = record.into_shipment();
                // A stale refetch can still list the document that was just
                // removed; the optimistic set stays authoritative here, so
                // only scalars and items are taken from the response.
                if let Some(local) = self.store.get(shipment_id) {
                    fetched.documents = local.documents;
                }
                self.store.sync_fetched(fetched);
            }
            Err(err) => {
                warn!(self.logger, "refetch after document delete failed";
                    "shipment_id" => shipment_id, "error" => %err);
            }
        }

        self.loaded(shipment_id)
    }

    /// Admin-only destroy; items and documents die with the shipment.
    #[instrument(skip(self))]
    pub async fn delete_shipment(&self, actor: Actor, id: i64) -> Result<(), ServiceError> {
        if !auth::can_delete(actor.role) {
            return Err(ServiceError::permission_denied(
                "Only admins may delete shipments",
            ));
        }
        match self.api.delete_shipment(id).await {
            Ok(()) => {
                self.store.remove(id);
                Ok(())
            }
            Err(ServiceError::NotFound(msg)) => {
                self.store.remove(id);
                Err(ServiceError::NotFound(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Push a delivered shipment to the accounting collaborator and keep
    /// only the returned invoice identifier.
    #[instrument(skip(self, accounting, customer))]
    pub async fn sync_invoice(
        &self,
        actor: Actor,
        id: i64,
        accounting: &dyn AccountingSync,
        customer: CustomerProfile,
    ) -> Result<InvoiceRef, ServiceError> {
        let current = self.loaded(id)?;
        if !auth::can_show_invoice(&current, actor.role) {
            return Err(ServiceError::permission_denied(
                "Invoicing is available to admins on delivered shipments",
            ));
        }

        let lines = invoice_lines(&current);
        let reference = accounting.create_invoice(&customer, &lines).await?;

        let mut buffer = self.store.apply_patch(
            id,
            ShipmentPatch {
                invoice_ref: Some(reference.clone()),
                ..ShipmentPatch::default()
            },
        )?;

        // Best-effort persist; the identifier is already visible locally
        // and the next save will carry it again.
        buffer.invoice_ref = Some(reference.clone());
        if let Err(err) = self.submit(buffer, current.status.is_terminal()).await {
            warn!(self.logger, "persisting invoice reference failed";
                "shipment_id" => id, "error" => %err);
        }

        Ok(reference)
    }

    /// Fetch the driver list from the collaborator.
    #[instrument(skip(self))]
    pub async fn load_drivers(&self) -> Result<Vec<crate::models::DriverProfile>, ServiceError> {
        self.api.list_drivers().await
    }

    /// Driver choices for manual assignment, least-loaded first.
    pub async fn assignment_options(&self) -> Result<Vec<AssignmentOption>, ServiceError> {
        let drivers = self.api.list_drivers().await?;
        Ok(suggest_assignment(&drivers, &self.store.snapshot()))
    }

    fn loaded(&self, id: i64) -> Result<Shipment, ServiceError> {
        self.store
            .get(id)
            .ok_or_else(|| ServiceError::not_found(format!("shipment {id} is not loaded")))
    }

    /// Pre-flight edit guard. Advisory: the collaborator may still reject,
    /// and its 403 is mapped back to the same error kind.
    fn guard_edit(&self, shipment: &Shipment, actor: Actor) -> Result<(), ServiceError> {
        if !auth::can_edit(shipment, actor.role) {
            return Err(ServiceError::permission_denied(TERMINAL_LOCK_MESSAGE));
        }
        if !auth::can_driver_edit(shipment, actor) {
            return Err(ServiceError::permission_denied(
                "Only the assigned driver may edit this shipment",
            ));
        }
        Ok(())
    }

    fn patch_collections(
        &self,
        shipment_id: i64,
        items: Vec<crate::models::Item>,
        documents: Vec<Document>,
    ) -> Result<(), ServiceError> {
        self.store.apply_patch(
            shipment_id,
            ShipmentPatch {
                items: Some(CollectionPatch::Replace(items)),
                documents: Some(CollectionPatch::Replace(documents)),
                ..ShipmentPatch::default()
            },
        )?;
        Ok(())
    }

    /// Shared write path: PUT the full record, splice the submitted state
    /// into the store, then refetch and refresh best-effort. The optimistic
    /// splice is visible before either follow-up resolves, and the merge
    /// can never regress it.
    async fn submit(
        &self,
        prepared: Shipment,
        admin_override: bool,
    ) -> Result<Shipment, ServiceError> {
        let id = prepared.id;
        let request = build_update_request(&prepared, admin_override)?;

        let record = self.api.update_shipment(id, &request).await?;
        let optimistic = self.store.sync_after_save(&prepared, record.into_shipment());
        info!(self.logger, "shipment updated";
            "shipment_id" => id,
            "status" => %optimistic.status,
            "admin_override" => admin_override);

        match self.api.get_shipment(id).await {
            Ok(refetched) => {
                self.store.sync_after_save(&prepared, refetched.into_shipment());
            }
            Err(err) => {
                warn!(self.logger, "post-save refetch failed; keeping optimistic state";
                    "shipment_id" => id, "error" => %err);
            }
        }

        if let Err(err) = self.api.list_shipments(&ShipmentListFilter::default()).await.map(
            |records| {
                self.store
                    .sync_list(records.into_iter().map(|r| r.into_shipment()).collect())
            },
        ) {
            warn!(self.logger, "post-save list refresh failed";
                "shipment_id" => id, "error" => %err);
        }

        Ok(self.store.get(id).unwrap_or(optimistic))
    }
}

/// Build the PUT body from a prepared shipment. Origin and destination are
/// mandatory before any persist.
fn build_update_request(
    shipment: &Shipment,
    admin_override: bool,
) -> Result<UpdateShipmentRequest, ServiceError> {
    let origin = shipment
        .origin
        .as_ref()
        .map(RawLocation::from_model)
        .ok_or_else(|| ServiceError::validation("Origin address is required"))?;
    let destination = shipment
        .destination
        .as_ref()
        .map(RawLocation::from_model)
        .ok_or_else(|| ServiceError::validation("Destination address is required"))?;

    Ok(UpdateShipmentRequest {
        reference: shipment.reference.clone(),
        customer_name: shipment.customer_name.clone(),
        client_id: shipment.client_id,
        sub_client_id: shipment.sub_client_id,
        sub_client_name: shipment.sub_client_name.clone(),
        origin,
        destination,
        driver: shipment.driver,
        status: shipment.status,
        shipping_cost: shipment.shipping_cost,
        items: shipment.items.iter().map(RawItem::from_model).collect(),
        comments: shipment.comments.clone(),
        invoice_ref: shipment.invoice_ref.clone(),
        delivered_at: shipment.delivered_at,
        admin_override: admin_override.then_some(true),
    })
}

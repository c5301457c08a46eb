//! Shared harness: a scriptable in-memory collaborator plus shipment
//! builders used across the scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use freightline_core::client::CollaboratorApi;
use freightline_core::dto::{
    DocumentUpload, RawDocument, RawItem, RawLocation, ShipmentListFilter, ShipmentRecord,
    UpdateShipmentRequest,
};
use freightline_core::errors::ServiceError;
use freightline_core::logging::noop_logger;
use freightline_core::models::{DriverProfile, Item, Location, Shipment, ShipmentStatus};
use freightline_core::services::shipments::ShipmentService;
use freightline_core::store::ShipmentStore;

pub fn sample_shipment(id: i64) -> Shipment {
    Shipment {
        id,
        reference: Some(format!("REF-{id}")),
        customer_name: "Acme Freight".into(),
        client_id: None,
        sub_client_id: None,
        sub_client_name: None,
        origin: Some(Location::new("1 Origin Way", 40.71, -74.00)),
        destination: Some(Location::new("9 Harbor St", 42.36, -71.05)),
        driver: None,
        status: ShipmentStatus::Pending,
        shipping_cost: Decimal::ZERO,
        items: vec![],
        documents: vec![],
        comments: None,
        invoice_ref: None,
        delivered_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn item(description: &str) -> Item {
    Item::new(description, 2, 12.5, dec!(15.00))
}

/// Build a wire record mirroring a shipment, including its sub-collections.
pub fn record_from(shipment: &Shipment) -> ShipmentRecord {
    ShipmentRecord {
        id: shipment.id,
        reference: shipment.reference.clone(),
        customer_name: Some(shipment.customer_name.clone()),
        client_id: shipment.client_id,
        sub_client_id: shipment.sub_client_id,
        sub_client_name: shipment.sub_client_name.clone(),
        origin: shipment.origin.as_ref().map(RawLocation::from_model),
        destination: shipment.destination.as_ref().map(RawLocation::from_model),
        driver: shipment.driver,
        status: Some(shipment.status),
        shipping_cost: Some(shipment.shipping_cost),
        items: Some(shipment.items.iter().map(RawItem::from_model).collect()),
        documents: Some(
            shipment
                .documents
                .iter()
                .map(|doc| RawDocument {
                    id: doc.id.server_id(),
                    name: Some(doc.name.clone()),
                    content_ref: Some(doc.content_ref.clone()),
                })
                .collect(),
        ),
        comments: shipment.comments.clone(),
        invoice_ref: shipment.invoice_ref.clone(),
        delivered_at: shipment.delivered_at,
        created_at: Some(shipment.created_at),
        updated_at: Some(shipment.updated_at),
    }
}

/// A record as the listing endpoint returns it: sub-collections omitted.
pub fn summary_record_from(shipment: &Shipment) -> ShipmentRecord {
    let mut record = record_from(shipment);
    record.items = None;
    record.documents = None;
    record
}

/// A record hit by the read-after-write race: correct scalars, empty
/// sub-collections.
pub fn raced_record_from(shipment: &Shipment) -> ShipmentRecord {
    let mut record = record_from(shipment);
    record.items = Some(vec![]);
    record.documents = Some(vec![]);
    record
}

type Scripted<T> = Mutex<VecDeque<Result<T, ServiceError>>>;

/// Scriptable collaborator: responses are queued per endpoint and recorded
/// requests can be asserted on afterwards.
#[derive(Default)]
pub struct ScriptedCollaborator {
    list_responses: Scripted<Vec<ShipmentRecord>>,
    get_responses: Scripted<ShipmentRecord>,
    update_responses: Scripted<ShipmentRecord>,
    upload_responses: Scripted<RawDocument>,
    delete_document_responses: Scripted<()>,
    delete_shipment_responses: Scripted<()>,
    drivers: Mutex<Vec<DriverProfile>>,
    pub submitted_updates: Mutex<Vec<(i64, UpdateShipmentRequest)>>,
    pub deleted_documents: Mutex<Vec<i64>>,
}

impl ScriptedCollaborator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_list(&self, response: Result<Vec<ShipmentRecord>, ServiceError>) {
        self.list_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_get(&self, response: Result<ShipmentRecord, ServiceError>) {
        self.get_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_update(&self, response: Result<ShipmentRecord, ServiceError>) {
        self.update_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_upload(&self, response: Result<RawDocument, ServiceError>) {
        self.upload_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_delete_document(&self, response: Result<(), ServiceError>) {
        self.delete_document_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    pub fn queue_delete_shipment(&self, response: Result<(), ServiceError>) {
        self.delete_shipment_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    pub fn set_drivers(&self, drivers: Vec<DriverProfile>) {
        *self.drivers.lock().unwrap() = drivers;
    }

    pub fn submitted_update_count(&self) -> usize {
        self.submitted_updates.lock().unwrap().len()
    }

    fn pop<T>(queue: &Scripted<T>, fallback: impl FnOnce() -> Result<T, ServiceError>) -> Result<T, ServiceError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(fallback)
    }
}

#[async_trait]
impl CollaboratorApi for ScriptedCollaborator {
    async fn list_shipments(
        &self,
        _filter: &ShipmentListFilter,
    ) -> Result<Vec<ShipmentRecord>, ServiceError> {
        Self::pop(&self.list_responses, || Ok(vec![]))
    }

    async fn get_shipment(&self, id: i64) -> Result<ShipmentRecord, ServiceError> {
        Self::pop(&self.get_responses, || {
            Err(ServiceError::Transport(format!(
                "no scripted get response for shipment {id}"
            )))
        })
    }

    async fn update_shipment(
        &self,
        id: i64,
        request: &UpdateShipmentRequest,
    ) -> Result<ShipmentRecord, ServiceError> {
        self.submitted_updates
            .lock()
            .unwrap()
            .push((id, request.clone()));
        Self::pop(&self.update_responses, || {
            Err(ServiceError::Transport(format!(
                "no scripted update response for shipment {id}"
            )))
        })
    }

    async fn upload_document(
        &self,
        shipment_id: i64,
        _upload: DocumentUpload,
    ) -> Result<RawDocument, ServiceError> {
        Self::pop(&self.upload_responses, || {
            Err(ServiceError::Transport(format!(
                "no scripted upload response for shipment {shipment_id}"
            )))
        })
    }

    async fn delete_document(&self, document_id: i64) -> Result<(), ServiceError> {
        self.deleted_documents.lock().unwrap().push(document_id);
        Self::pop(&self.delete_document_responses, || Ok(()))
    }

    async fn delete_shipment(&self, _id: i64) -> Result<(), ServiceError> {
        Self::pop(&self.delete_shipment_responses, || Ok(()))
    }

    async fn list_drivers(&self) -> Result<Vec<DriverProfile>, ServiceError> {
        Ok(self.drivers.lock().unwrap().clone())
    }
}

pub struct TestHarness {
    pub api: Arc<ScriptedCollaborator>,
    pub store: Arc<ShipmentStore>,
    pub service: ShipmentService,
}

impl TestHarness {
    pub fn new() -> Self {
        let api = ScriptedCollaborator::new();
        let store = Arc::new(ShipmentStore::new());
        let service = ShipmentService::new(api.clone(), store.clone(), noop_logger());
        Self {
            api,
            store,
            service,
        }
    }
}

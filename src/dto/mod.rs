//! Wire-level records for the collaborator persistence API.
//!
//! The collaborator's response shapes are loose: sub-collections may be
//! missing or empty even when they exist, and document descriptors omit
//! fields unpredictably. Everything here is an `Option`-heavy partial
//! record plus an explicit normalizer that produces the canonical model
//! types used by the rest of the core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::shipment::driver_wire;
use crate::models::{
    Document, DocumentId, DriverAssignment, Item, ItemId, Location, Shipment, ShipmentStatus,
};

/// Raw location triple; meaningful only when all three fields are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl RawLocation {
    pub fn normalize(self) -> Option<Location> {
        match (self.address, self.latitude, self.longitude) {
            (Some(address), Some(latitude), Some(longitude)) if !address.trim().is_empty() => {
                Some(Location {
                    address,
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }

    pub fn from_model(location: &Location) -> Self {
        Self {
            address: Some(location.address.clone()),
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
        }
    }
}

/// Raw line item as the collaborator returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub weight_lbs: Option<f64>,
    #[serde(default)]
    pub value: Option<Decimal>,
}

impl RawItem {
    pub fn normalize(self) -> Item {
        Item {
            id: self.id.map(ItemId::Server).unwrap_or_else(ItemId::temp),
            description: self.description.unwrap_or_default(),
            quantity: self.quantity.unwrap_or(0),
            weight_lbs: self.weight_lbs.unwrap_or(0.0),
            value: self.value.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn from_model(item: &Item) -> Self {
        Self {
            id: item.id.server_id(),
            description: Some(item.description.clone()),
            quantity: Some(item.quantity),
            weight_lbs: Some(item.weight_lbs),
            value: Some(item.value),
        }
    }
}

/// Raw document descriptor. The collaborator has been observed to omit any
/// subset of these fields in its upload response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "url")]
    pub content_ref: Option<String>,
}

impl RawDocument {
    /// Fill defaults: a missing id becomes a locally-generated temporary
    /// id, a missing name falls back to the original filename.
    pub fn normalize(self, shipment_id: i64, fallback_name: &str) -> Document {
        Document {
            id: self.id.map(DocumentId::Server).unwrap_or_else(DocumentId::temp),
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            content_ref: self.content_ref.unwrap_or_default(),
            shipment_id,
        }
    }
}

/// Raw shipment record from `GET /shipments` or `GET /shipment/{id}`.
///
/// List responses may omit `items`/`documents` entirely; callers must not
/// treat those fields as authoritative for sub-collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub id: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub sub_client_id: Option<i64>,
    #[serde(default)]
    pub sub_client_name: Option<String>,
    #[serde(default)]
    pub origin: Option<RawLocation>,
    #[serde(default)]
    pub destination: Option<RawLocation>,
    #[serde(default, with = "driver_wire")]
    pub driver: Option<DriverAssignment>,
    #[serde(default)]
    pub status: Option<ShipmentStatus>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub items: Option<Vec<RawItem>>,
    #[serde(default)]
    pub documents: Option<Vec<RawDocument>>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub invoice_ref: Option<String>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShipmentRecord {
    /// Normalize into the canonical model. Absent sub-collections become
    /// empty vectors; the merge rule downstream treats empty and missing
    /// identically (both non-authoritative).
    pub fn into_shipment(self) -> Shipment {
        let id = self.id;
        let now = Utc::now();
        Shipment {
            id,
            reference: self.reference,
            customer_name: self.customer_name.unwrap_or_default(),
            client_id: self.client_id,
            sub_client_id: self.sub_client_id,
            sub_client_name: self.sub_client_name,
            origin: self.origin.and_then(RawLocation::normalize),
            destination: self.destination.and_then(RawLocation::normalize),
            driver: self.driver,
            status: self.status.unwrap_or(ShipmentStatus::Pending),
            shipping_cost: self.shipping_cost.unwrap_or(Decimal::ZERO),
            items: self
                .items
                .unwrap_or_default()
                .into_iter()
                .map(RawItem::normalize)
                .collect(),
            documents: self
                .documents
                .unwrap_or_default()
                .into_iter()
                .map(|raw| raw.normalize(id, "document"))
                .collect(),
            comments: self.comments,
            invoice_ref: self.invoice_ref,
            delivered_at: self.delivered_at,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

/// Body of `PUT /shipment/{id}`: the full record with items inline, plus
/// the admin override flag when a terminal-state lock is being bypassed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShipmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub sub_client_id: Option<i64>,
    #[serde(default)]
    pub sub_client_name: Option<String>,
    pub origin: RawLocation,
    pub destination: RawLocation,
    #[serde(default, with = "driver_wire")]
    pub driver: Option<DriverAssignment>,
    pub status: ShipmentStatus,
    pub shipping_cost: Decimal,
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_override: Option<bool>,
}

/// Query parameters for the shipment listing endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShipmentListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<i64>,
}

/// Single-file payload for `POST /shipment/{id}/document`.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

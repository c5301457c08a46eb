use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumString;
use validator::Validate;

use crate::models::document::Document;
use crate::models::shipment_item::Item;

/// Shipment status enumeration
///
/// `Delivered` and `Cancelled` are terminal under normal rules; only an
/// admin override may move a shipment out of them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Fixed sort priority used by the driver-facing list ordering.
    pub fn priority(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InTransit => 1,
            Self::Delivered => 2,
            Self::Cancelled => 3,
        }
    }

    /// Human-readable label for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// A geocoded location: the address string and its coordinate pair are set
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.into(),
            latitude,
            longitude,
        }
    }
}

/// Driver assignment state. The explicit `Unassigned` sentinel (wire value
/// `0`) is distinct from an absent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverAssignment {
    Unassigned,
    Driver(i64),
}

impl DriverAssignment {
    pub fn from_wire(id: i64) -> Self {
        if id == 0 {
            Self::Unassigned
        } else {
            Self::Driver(id)
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            Self::Unassigned => 0,
            Self::Driver(id) => id,
        }
    }

    pub fn driver_id(self) -> Option<i64> {
        match self {
            Self::Unassigned => None,
            Self::Driver(id) => Some(id),
        }
    }
}

impl fmt::Display for DriverAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "unassigned"),
            Self::Driver(id) => write!(f, "driver {id}"),
        }
    }
}

/// Serde glue mapping `Option<DriverAssignment>` onto the nullable numeric
/// wire field (null, 0, or a positive driver id).
pub mod driver_wire {
    use super::DriverAssignment;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DriverAssignment>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(assignment) => serializer.serialize_i64(assignment.to_wire()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DriverAssignment>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.map(DriverAssignment::from_wire))
    }
}

/// Shipment entity model
///
/// The server assigns the numeric id; the reference code is author-supplied,
/// unique per tenant and never regenerated. `shipping_cost` is derived from
/// the items whenever any item exists (see the totals service) and is only
/// independently meaningful for legacy zero-item shipments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Shipment {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,

    #[serde(default)]
    pub client_id: Option<i64>,

    #[serde(default)]
    pub sub_client_id: Option<i64>,

    #[serde(default)]
    pub sub_client_name: Option<String>,

    #[serde(default)]
    pub origin: Option<Location>,

    #[serde(default)]
    pub destination: Option<Location>,

    #[serde(default, with = "driver_wire")]
    pub driver: Option<DriverAssignment>,

    pub status: ShipmentStatus,

    pub shipping_cost: Decimal,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default)]
    pub documents: Vec<Document>,

    #[serde(default)]
    pub comments: Option<String>,

    /// External invoice identifier from the accounting-sync collaborator.
    #[serde(default)]
    pub invoice_ref: Option<String>,

    /// Append-only delivery history; never cleared when status moves away
    /// from `Delivered`.
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    pub fn assigned_driver_id(&self) -> Option<i64> {
        self.driver.and_then(DriverAssignment::driver_id)
    }

    pub fn is_assigned_to(&self, driver_id: i64) -> bool {
        self.assigned_driver_id() == Some(driver_id)
    }

    /// Non-placeholder line items.
    pub fn real_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| !item.is_placeholder())
    }
}

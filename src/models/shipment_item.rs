use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a line item. Items created client-side carry a temporary
/// uuid until the shipment is first persisted, after which the server id
/// replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Server(i64),
    Temp(Uuid),
}

impl ItemId {
    pub fn temp() -> Self {
        Self::Temp(Uuid::new_v4())
    }

    pub fn server_id(self) -> Option<i64> {
        match self {
            Self::Server(id) => Some(id),
            Self::Temp(_) => None,
        }
    }
}

/// A line entry of cargo within a shipment.
///
/// Weight is in pounds; `value` is the unit-price equivalent, so the line
/// contribution to the shipping cost is `value * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub description: String,
    pub quantity: u32,
    pub weight_lbs: f64,
    pub value: Decimal,
}

impl Item {
    pub fn new(description: impl Into<String>, quantity: u32, weight_lbs: f64, value: Decimal) -> Self {
        Self {
            id: ItemId::temp(),
            description: description.into(),
            quantity,
            weight_lbs,
            value,
        }
    }

    /// A fully-blank row kept only while the user is editing. Valid
    /// transiently; filtered out before any persist.
    pub fn placeholder() -> Self {
        Self {
            id: ItemId::temp(),
            description: String::new(),
            quantity: 0,
            weight_lbs: 0.0,
            value: Decimal::ZERO,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.description.trim().is_empty()
            && self.quantity == 0
            && self.weight_lbs == 0.0
            && self.value.is_zero()
    }

    /// Contribution of this line to the derived shipping cost.
    pub fn line_total(&self) -> Decimal {
        self.value * Decimal::from(self.quantity)
    }
}

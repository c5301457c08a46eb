//! Accounting-sync collaborator boundary.
//!
//! The core hands the accounting system a customer profile and the invoice
//! lines derived from a shipment's items, and stores the returned external
//! invoice identifier on the shipment. Nothing else of the sync flow
//! (OAuth, retries, rendering) is in scope.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::models::Shipment;

/// Customer details the accounting collaborator consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// One invoice line: description, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// External invoice identifier; the only thing the core keeps.
pub type InvoiceRef = String;

#[async_trait]
pub trait AccountingSync: Send + Sync {
    async fn create_invoice(
        &self,
        customer: &CustomerProfile,
        lines: &[InvoiceLine],
    ) -> Result<InvoiceRef, ServiceError>;
}

/// Derive invoice lines from a shipment's non-placeholder items.
pub fn invoice_lines(shipment: &Shipment) -> Vec<InvoiceLine> {
    shipment
        .real_items()
        .map(|item| InvoiceLine {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.value,
        })
        .collect()
}

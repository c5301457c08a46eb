//! Derived-total calculator and pre-save normalization.
//!
//! Shipping cost is a one-way derivation from the line items: once any item
//! exists, the cost field is overwritten with the item total and is never
//! trusted from independent user input. A zero-item shipment keeps whatever
//! cost was last set (legacy manual-cost shipments).

use rust_decimal::Decimal;

use crate::errors::ServiceError;
use crate::models::{Item, Shipment};

/// Sum of `value * quantity` over the given items. Placeholder rows
/// contribute zero, so calling this on a raw editing buffer is safe.
pub fn shipping_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a Item>,
{
    items.into_iter().map(Item::line_total).sum()
}

/// Validate and normalize an editing buffer for submission.
///
/// Mandatory-field validation happens here, before any network call:
/// origin and destination must be set, and the customer name non-empty.
/// Placeholder items are dropped, and when any real item remains the
/// shipping cost is overwritten with the derived total.
pub fn prepare_for_save(mut shipment: Shipment) -> Result<Shipment, ServiceError> {
    if shipment.customer_name.trim().is_empty() {
        return Err(ServiceError::validation("Customer name is required"));
    }
    if shipment.origin.is_none() {
        return Err(ServiceError::validation("Origin address is required"));
    }
    if shipment.destination.is_none() {
        return Err(ServiceError::validation("Destination address is required"));
    }

    shipment.items.retain(|item| !item.is_placeholder());
    if !shipment.items.is_empty() {
        shipment.shipping_cost = shipping_total(&shipment.items);
    }

    Ok(shipment)
}

pub mod accounting;
pub mod drivers;
pub mod reconciliation;
pub mod shipment_status;
pub mod shipments;
pub mod totals;

pub mod document;
pub mod shipment;
pub mod shipment_item;
pub mod user;

pub use document::{Document, DocumentId};
pub use shipment::{DriverAssignment, Location, Shipment, ShipmentStatus};
pub use shipment_item::{Item, ItemId};
pub use user::{Actor, DriverProfile, Role};

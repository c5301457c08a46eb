pub mod shipment_list;

pub use shipment_list::{visible_shipments, ShipmentListQuery, StatusFilter};

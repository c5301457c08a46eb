//! Driver load-balance suggester.
//!
//! Ranks drivers by their current pending-shipment count to aid manual
//! assignment. A display/ordering aid only: nothing prevents two admins
//! from picking the same least-loaded driver at once, and no locking is
//! taken.

use serde::Serialize;

use crate::models::{DriverAssignment, DriverProfile, Shipment, ShipmentStatus};

/// One selectable entry in the assignment dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOption {
    pub assignment: DriverAssignmentChoice,
    pub pending_count: usize,
}

/// The synthetic "unassigned" entry, or a real driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DriverAssignmentChoice {
    Unassigned,
    Driver { id: i64, name: String },
}

impl AssignmentOption {
    pub fn to_assignment(&self) -> DriverAssignment {
        match &self.assignment {
            DriverAssignmentChoice::Unassigned => DriverAssignment::Unassigned,
            DriverAssignmentChoice::Driver { id, .. } => DriverAssignment::Driver(*id),
        }
    }
}

/// Build the suggestion list: drivers ascending by pending-shipment count
/// (stable, so ties keep the declared driver order), with the synthetic
/// unassigned entry first at count zero.
pub fn suggest_assignment(drivers: &[DriverProfile], shipments: &[Shipment]) -> Vec<AssignmentOption> {
    let mut ranked: Vec<AssignmentOption> = drivers
        .iter()
        .map(|driver| AssignmentOption {
            pending_count: shipments
                .iter()
                .filter(|s| s.status == ShipmentStatus::Pending && s.is_assigned_to(driver.id))
                .count(),
            assignment: DriverAssignmentChoice::Driver {
                id: driver.id,
                name: driver.name.clone(),
            },
        })
        .collect();

    ranked.sort_by_key(|option| option.pending_count);

    let mut options = Vec::with_capacity(ranked.len() + 1);
    options.push(AssignmentOption {
        assignment: DriverAssignmentChoice::Unassigned,
        pending_count: 0,
    });
    options.extend(ranked);
    options
}

//! Read-side filter/sort pipeline for the shipment list.
//!
//! Pure: the visible list is re-derivable entirely from
//! `(shipments, query)` with no hidden state.

use crate::models::{Actor, Role, Shipment, ShipmentStatus};

/// Status filter: everything, or an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ShipmentStatus),
}

impl StatusFilter {
    fn matches(self, status: ShipmentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == wanted,
        }
    }
}

/// Inputs of the pipeline: free-text query, status filter, and the viewer
/// whose role and id scope the result.
#[derive(Debug, Clone)]
pub struct ShipmentListQuery {
    pub search: String,
    pub status: StatusFilter,
    pub viewer: Actor,
}

impl ShipmentListQuery {
    pub fn all_for(viewer: Actor) -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            viewer,
        }
    }

    fn text_matches(&self, shipment: &Shipment) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystacks = [
            Some(shipment.customer_name.as_str()),
            shipment.destination.as_ref().map(|loc| loc.address.as_str()),
            shipment.reference.as_deref(),
        ];
        haystacks
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn is_visible(&self, shipment: &Shipment) -> bool {
        match self.viewer.role {
            // A driver only ever sees their own assignments, regardless of
            // any search or status filter.
            Role::Driver => shipment.is_assigned_to(self.viewer.id),
            Role::Admin | Role::Accountant | Role::ClientViewer => true,
        }
    }
}

/// Derive the list a viewer sees: role scoping, then text and status
/// filters, then role-dependent ordering. Drivers get work-queue order
/// (status priority, then newest first); everyone else sees newest first.
pub fn visible_shipments(shipments: &[Shipment], query: &ShipmentListQuery) -> Vec<Shipment> {
    let mut visible: Vec<Shipment> = shipments
        .iter()
        .filter(|s| query.is_visible(s))
        .filter(|s| query.status.matches(s.status))
        .filter(|s| query.text_matches(s))
        .cloned()
        .collect();

    match query.viewer.role {
        Role::Driver => {
            visible.sort_by(|a, b| {
                a.status
                    .priority()
                    .cmp(&b.status.priority())
                    .then(b.id.cmp(&a.id))
            });
        }
        Role::Admin | Role::Accountant | Role::ClientViewer => {
            visible.sort_by(|a, b| b.id.cmp(&a.id));
        }
    }

    visible
}

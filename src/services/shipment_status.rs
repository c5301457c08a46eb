//! Status transition engine.
//!
//! `pending -> in_transit -> delivered`, with `cancelled` reachable from
//! `pending` or `in_transit`. Terminal statuses lock out everyone except an
//! admin, whose transition is flagged as an explicit override to the
//! collaborator. There is no dedicated transition endpoint: a transition is
//! submitted as a full-record update with only the status changed.

use crate::errors::ServiceError;
use crate::models::{Role, ShipmentStatus};

/// Outcome of planning a transition: what to submit and whether the
/// collaborator's terminal-state lock is being bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub target: ShipmentStatus,
    pub admin_override: bool,
}

/// User-facing message for the terminal lock; shown before any network
/// call is made.
pub const TERMINAL_LOCK_MESSAGE: &str = "A delivered or cancelled shipment cannot be modified";

/// Whether the graph permits `current -> target` under normal (non-admin)
/// rules. A no-op transition to the current status is always permitted.
fn graph_allows(current: ShipmentStatus, target: ShipmentStatus) -> bool {
    use ShipmentStatus::*;
    if current == target {
        return true;
    }
    matches!(
        (current, target),
        (Pending, InTransit) | (InTransit, Delivered) | (Pending, Cancelled) | (InTransit, Cancelled)
    )
}

/// Decide whether the requested transition may be submitted.
///
/// Non-admins are rejected outright while the current status is terminal,
/// and must otherwise follow the graph. Admins are never blocked by the
/// current status; moving out of a terminal status produces a plan with
/// `admin_override` set, and the graph is deliberately not re-validated
/// for them (the collaborator stays the final authority).
pub fn plan_transition(
    current: ShipmentStatus,
    target: ShipmentStatus,
    role: Role,
) -> Result<TransitionPlan, ServiceError> {
    match role {
        Role::Admin => Ok(TransitionPlan {
            target,
            admin_override: current.is_terminal(),
        }),
        Role::Driver | Role::Accountant | Role::ClientViewer => {
            if current.is_terminal() {
                return Err(ServiceError::permission_denied(TERMINAL_LOCK_MESSAGE));
            }
            if !graph_allows(current, target) {
                return Err(ServiceError::validation(format!(
                    "Cannot move a {} shipment to {}",
                    current.label(),
                    target.label()
                )));
            }
            Ok(TransitionPlan {
                target,
                admin_override: false,
            })
        }
    }
}

/// Targets the given role may select from the current status; a UI aid
/// derived from the same rules as [`plan_transition`].
pub fn allowed_targets(current: ShipmentStatus, role: Role) -> Vec<ShipmentStatus> {
    use ShipmentStatus::*;
    [Pending, InTransit, Delivered, Cancelled]
        .into_iter()
        .filter(|target| *target != current && plan_transition(current, *target, role).is_ok())
        .collect()
}

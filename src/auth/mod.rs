/*!
 * # Permission Guard
 *
 * Pure decision functions for the (shipment, role, actor) tuple. The guard
 * holds no state, is safe to call with a stale shipment snapshot, and is
 * advisory only: the collaborator API remains the actual authority and may
 * reject an unauthorized mutation on its own.
 */

use crate::models::{Actor, Role, Shipment};

/// Whether this role may edit the shipment at all. Admin is never locked
/// out; every other role is blocked once the shipment reaches a terminal
/// status.
pub fn can_edit(shipment: &Shipment, role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Driver | Role::Accountant | Role::ClientViewer => !shipment.status.is_terminal(),
    }
}

/// Driver-specific refinement of [`can_edit`]: a driver may only edit a
/// shipment that is actually assigned to them. Other roles delegate to
/// [`can_edit`] unchanged.
pub fn can_driver_edit(shipment: &Shipment, actor: Actor) -> bool {
    match actor.role {
        Role::Driver => can_edit(shipment, actor.role) && shipment.is_assigned_to(actor.id),
        Role::Admin | Role::Accountant | Role::ClientViewer => can_edit(shipment, actor.role),
    }
}

/// Item values and shipping cost are visible to admins only; drivers see
/// quantity and weight but never money.
pub fn can_show_financials(role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Driver | Role::Accountant | Role::ClientViewer => false,
    }
}

/// The invoice action appears only for admins, and only once the shipment
/// is delivered.
pub fn can_show_invoice(shipment: &Shipment, role: Role) -> bool {
    match role {
        Role::Admin => shipment.status == crate::models::ShipmentStatus::Delivered,
        Role::Driver | Role::Accountant | Role::ClientViewer => false,
    }
}

pub fn can_delete(role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Driver | Role::Accountant | Role::ClientViewer => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverAssignment, ShipmentStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rstest::rstest;

    fn shipment(status: ShipmentStatus, driver: Option<DriverAssignment>) -> Shipment {
        Shipment {
            id: 1,
            reference: None,
            customer_name: "Acme Freight".into(),
            client_id: None,
            sub_client_id: None,
            sub_client_name: None,
            origin: None,
            destination: None,
            driver,
            status,
            shipping_cost: Decimal::ZERO,
            items: vec![],
            documents: vec![],
            comments: None,
            invoice_ref: None,
            delivered_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case::pending_is_editable(ShipmentStatus::Pending, true)]
    #[case::in_transit_is_editable(ShipmentStatus::InTransit, true)]
    #[case::delivered_is_locked(ShipmentStatus::Delivered, false)]
    #[case::cancelled_is_locked(ShipmentStatus::Cancelled, false)]
    fn terminal_lock_for_drivers(#[case] status: ShipmentStatus, #[case] expected: bool) {
        let s = shipment(status, Some(DriverAssignment::Driver(7)));
        assert_eq!(can_edit(&s, Role::Driver), expected);
    }

    #[rstest]
    #[case(ShipmentStatus::Pending)]
    #[case(ShipmentStatus::InTransit)]
    #[case(ShipmentStatus::Delivered)]
    #[case(ShipmentStatus::Cancelled)]
    fn admin_is_never_locked(#[case] status: ShipmentStatus) {
        let s = shipment(status, None);
        assert!(can_edit(&s, Role::Admin));
    }

    #[test]
    fn driver_edit_requires_assignment() {
        let s = shipment(ShipmentStatus::Pending, Some(DriverAssignment::Driver(7)));
        assert!(can_driver_edit(&s, Actor::new(7, Role::Driver)));
        assert!(!can_driver_edit(&s, Actor::new(9, Role::Driver)));

        let unassigned = shipment(ShipmentStatus::Pending, Some(DriverAssignment::Unassigned));
        assert!(!can_driver_edit(&unassigned, Actor::new(7, Role::Driver)));
    }

    #[test]
    fn non_driver_roles_delegate_to_can_edit() {
        let s = shipment(ShipmentStatus::InTransit, None);
        assert!(can_driver_edit(&s, Actor::new(1, Role::Admin)));
        assert!(can_driver_edit(&s, Actor::new(2, Role::Accountant)));

        let locked = shipment(ShipmentStatus::Cancelled, None);
        assert!(!can_driver_edit(&locked, Actor::new(2, Role::Accountant)));
    }

    #[test]
    fn financials_are_admin_only() {
        assert!(can_show_financials(Role::Admin));
        assert!(!can_show_financials(Role::Driver));
        assert!(!can_show_financials(Role::Accountant));
        assert!(!can_show_financials(Role::ClientViewer));
    }

    #[test]
    fn invoice_needs_admin_and_delivered() {
        let delivered = shipment(ShipmentStatus::Delivered, None);
        let pending = shipment(ShipmentStatus::Pending, None);
        assert!(can_show_invoice(&delivered, Role::Admin));
        assert!(!can_show_invoice(&pending, Role::Admin));
        assert!(!can_show_invoice(&delivered, Role::Accountant));
    }

    #[test]
    fn delete_is_admin_only() {
        assert!(can_delete(Role::Admin));
        assert!(!can_delete(Role::Driver));
        assert!(!can_delete(Role::ClientViewer));
    }
}

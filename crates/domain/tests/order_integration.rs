//! Integration tests for the Order aggregate through the public domain API.

use chrono::{TimeZone, Utc};
use common::{OrderId, Version};
use domain::order::validate_create;
use domain::{
    CreateOrder, NewOrder, Order, OrderError, OrderRecord, OrderState, OrderStatus, Service,
    ServiceInput, ServiceStatus, next_state,
};

fn cmd(services: Vec<ServiceInput>) -> CreateOrder {
    CreateOrder::new("North Lab", "John Roe", "Acme Health", services)
}

fn stored_order() -> Order {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let new_order = NewOrder::from_command(cmd(vec![
        ServiceInput::new("Hemogram", 45.0),
        ServiceInput::new("Glucose", 12.5).with_status(ServiceStatus::Done),
    ]));
    Order::from_new(OrderId::new(), new_order, now)
}

mod creation {
    use super::*;

    #[test]
    fn new_orders_start_created_and_active() {
        let order = stored_order();

        assert_eq!(order.state(), OrderState::Created);
        assert_eq!(order.status(), OrderStatus::Active);
        assert_eq!(order.version(), Version::first());
        assert_eq!(order.created_at(), order.updated_at());
        assert_eq!(order.services()[0].status, ServiceStatus::Pending);
        assert_eq!(order.services()[1].status, ServiceStatus::Done);
        assert_eq!(order.total_value(), 57.5);
    }

    #[test]
    fn party_checks_run_before_service_checks() {
        let mut bad = cmd(vec![]);
        bad.lab = "   ".into();

        assert_eq!(
            validate_create(&bad),
            Err(OrderError::MissingField { field: "lab" })
        );
    }

    #[test]
    fn blank_party_is_rejected() {
        let mut bad = cmd(vec![ServiceInput::new("Hemogram", 45.0)]);
        bad.customer = String::new();

        let err = validate_create(&bad).unwrap_err();
        assert_eq!(err, OrderError::MissingField { field: "customer" });
        assert!(err.is_invalid_order());
    }

    #[test]
    fn mixed_sign_values_are_judged_by_their_sum() {
        let ok = cmd(vec![
            ServiceInput::new("Discount", -20.0),
            ServiceInput::new("Panel", 30.0),
        ]);
        let bad = cmd(vec![
            ServiceInput::new("Discount", -30.0),
            ServiceInput::new("Panel", 30.0),
        ]);

        assert!(validate_create(&ok).is_ok());
        assert!(matches!(
            validate_create(&bad),
            Err(OrderError::NonPositiveTotal { .. })
        ));
    }
}

mod workflow {
    use super::*;

    #[test]
    fn every_state_has_at_most_one_successor() {
        let reachable: Vec<_> = OrderState::ALL
            .iter()
            .filter_map(|state| next_state(*state).ok())
            .collect();

        assert_eq!(reachable, [OrderState::Analysis, OrderState::Completed]);
    }

    #[test]
    fn failed_advance_leaves_order_untouched() {
        let mut order = stored_order();
        order.advance().unwrap();
        order.advance().unwrap();
        let before = order.clone();

        let err = order.advance().unwrap_err();

        assert_eq!(
            err,
            OrderError::IllegalTransition {
                current_state: OrderState::Completed
            }
        );
        assert_eq!(order, before);
    }

    #[test]
    fn services_can_be_added_in_any_state() {
        let mut order = stored_order();
        order.advance().unwrap();
        order.advance().unwrap();

        order.add_service(Service::new("Late", -100.0, ServiceStatus::Pending));

        assert!(order.is_terminal());
        assert_eq!(order.service_count(), 3);
        assert!(order.total_value() < 0.0);
    }
}

mod persistence_shape {
    use super::*;

    #[test]
    fn record_conversion_preserves_every_field() {
        let mut order = stored_order();
        order.advance().unwrap();
        order.set_status(OrderStatus::Deleted);

        let record = OrderRecord::from(order.clone());
        assert_eq!(record.state, OrderState::Analysis);
        assert_eq!(record.status, OrderStatus::Deleted);
        assert_eq!(Order::from(record), order);
    }

    #[test]
    fn mark_saved_bumps_version_and_timestamp() {
        let mut order = stored_order();
        let later = order.updated_at() + chrono::Duration::minutes(5);

        order.mark_saved(later);

        assert_eq!(order.version(), Version::new(2));
        assert_eq!(order.updated_at(), later);
        assert!(order.created_at() < order.updated_at());
    }

    #[test]
    fn states_serialize_in_upper_case() {
        let json = serde_json::to_value(OrderRecord::from(stored_order())).unwrap();

        assert_eq!(json["state"], "CREATED");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["services"][1]["status"], "DONE");
    }
}

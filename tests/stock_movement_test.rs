//! Stock movement recorder: derived quantity, date resolution and the global total.

mod common;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use common::TestApp;
use rust_decimal_macros::dec;
use stockflow_api::{
    entities::{MovementType, OrderStatus},
    errors::{EntityKind, ServiceError},
    services::orders::{CreateOrder, NewOrderLine},
};
use uuid::Uuid;

/// Creates a pending order with lines of the given quantities, each on its own product.
async fn order_with_lines(app: &TestApp, quantities: &[i32]) -> Uuid {
    let supplier = app.seed_supplier("Acme").await;
    let mut lines = Vec::new();
    for (i, &quantity) in quantities.iter().enumerate() {
        let product = app
            .seed_product(&format!("Part {i}-{}", Uuid::new_v4()), 100, dec!(1))
            .await;
        lines.push(NewOrderLine {
            product_id: product.id,
            quantity,
        });
    }

    app.state
        .services
        .orders
        .create_order(CreateOrder {
            supplier_id: supplier.id,
            status: Some(OrderStatus::Pending),
            created_on: None,
            lines,
        })
        .await
        .unwrap()
        .order
        .id
}

#[tokio::test]
async fn quantity_is_the_sum_of_order_lines() {
    let app = TestApp::new().await;
    let order_id = order_with_lines(&app, &[10, 5]).await;

    let movement = app
        .state
        .services
        .stock_movements
        .record_movement(order_id, MovementType::In, None)
        .await
        .unwrap();

    assert_eq!(movement.quantity, 15);
    assert_eq!(movement.order_id, order_id);
    assert_eq!(movement.movement_type, MovementType::In);
}

#[tokio::test]
async fn explicit_date_is_kept_verbatim() {
    let app = TestApp::new().await;
    let order_id = order_with_lines(&app, &[3]).await;

    let movement = app
        .state
        .services
        .stock_movements
        .record_movement(order_id, MovementType::In, Some("2023-01-31".to_string()))
        .await
        .unwrap();

    assert_eq!(
        movement.movement_date,
        NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()
    );
}

#[tokio::test]
async fn missing_date_defaults_to_today() {
    let app = TestApp::new().await;
    let order_id = order_with_lines(&app, &[3]).await;

    let before = Utc::now().date_naive();
    let movement = app
        .state
        .services
        .stock_movements
        .record_movement(order_id, MovementType::Out, None)
        .await
        .unwrap();
    let after = Utc::now().date_naive();

    assert!(movement.movement_date >= before && movement.movement_date <= after);
}

#[tokio::test]
async fn unparseable_date_is_rejected_and_nothing_is_recorded() {
    let app = TestApp::new().await;
    let order_id = order_with_lines(&app, &[3]).await;

    let result = app
        .state
        .services
        .stock_movements
        .record_movement(order_id, MovementType::In, Some("next tuesday".to_string()))
        .await;

    assert_matches!(result, Err(ServiceError::InvalidInput(_)));
    assert_eq!(app.movement_count().await, 0);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .stock_movements
        .record_movement(Uuid::new_v4(), MovementType::In, None)
        .await;

    assert_matches!(
        result,
        Err(ServiceError::NotFound { entity: EntityKind::Order, .. })
    );
}

#[tokio::test]
async fn total_sums_every_movement_regardless_of_type() {
    let app = TestApp::new().await;
    let movements = &app.state.services.stock_movements;

    assert_eq!(movements.total_movement_quantity().await.unwrap(), 0);

    let first = order_with_lines(&app, &[10]).await;
    let second = order_with_lines(&app, &[5]).await;
    movements
        .record_movement(first, MovementType::In, None)
        .await
        .unwrap();
    movements
        .record_movement(second, MovementType::Out, None)
        .await
        .unwrap();

    assert_eq!(movements.total_movement_quantity().await.unwrap(), 15);

    let (page, total) = movements.list_movements(1, 10).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(page.len(), 2);

    let fetched = movements.get_movement(page[0].id).await.unwrap();
    assert_eq!(fetched, page[0]);
}

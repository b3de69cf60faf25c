//! Invoice generation against PostgreSQL.

#![allow(clippy::uninlined_format_args)]

mod common;

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use pdj_core::invoice::{
    InvoiceError, InvoiceService, InvoiceStatus, InvoiceStore, NewInvoice, invoice_number,
};
use pdj_core::order::OrderStatus;
use pdj_db::repositories::{InvoiceRepository, OrderRepository};
use pdj_db::entities::businesses;
use pdj_shared::types::{BusinessId, PageRequest, UserId};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use rust_decimal_macros::dec;
use tokio::sync::Barrier;
use uuid::Uuid;

/// Inserts a business whose ID ends in `suffix`.
async fn business_with_suffix(db: &DatabaseConnection, suffix: u32) -> BusinessId {
    let random = Uuid::new_v4().as_u128() & !0xFFFF_FFFF;
    let id = Uuid::from_u128(random | u128::from(suffix));
    businesses::ActiveModel {
        id: Set(id),
        name: Set("Filial".to_string()),
        tax_id: Set(None),
        billing_email: Set("filial@example.com".to_string()),
        billing_address: Set(None),
        manager_user_id: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .unwrap();
    BusinessId::from_uuid(id)
}

#[tokio::test]
async fn test_generate_bills_qualifying_orders_once() {
    let Some(db) = common::connect().await else {
        return;
    };
    let day = NaiveDate::from_ymd_opt(2099, 2, 5).unwrap();
    if let Err(e) = common::reset_day(&db, day).await {
        eprintln!("Skipping test - setup failed: {}", e);
        return;
    }

    let business = common::create_business(&db).await;
    let orders = OrderRepository::new(db.clone(), chrono_tz::UTC);
    let now = common::noon(day);

    for price in [dec!(40), dec!(60)] {
        orders
            .create_order(common::new_order(UserId::new(), Some(business.id), price), now)
            .await
            .unwrap();
    }
    let cancelled = orders
        .create_order(
            common::new_order(UserId::new(), Some(business.id), dec!(500)),
            now,
        )
        .await
        .unwrap();
    orders
        .update_status(cancelled.id, OrderStatus::Cancelled, now)
        .await
        .unwrap();
    orders
        .create_order(common::new_order(UserId::new(), None, dec!(700)), now)
        .await
        .unwrap();

    let service = InvoiceService::new(InvoiceRepository::new(db.clone()), chrono_tz::UTC, 30);
    let issued = Utc.with_ymd_and_hms(2099, 3, 1, 9, 0, 0).unwrap();

    let invoice = service.generate(business.id, 2099, 2, issued).await.unwrap();

    assert_eq!(invoice.order_count, 2);
    assert_eq!(invoice.subtotal, dec!(100));
    assert_eq!(invoice.tax_amount, dec!(10));
    assert_eq!(invoice.total_amount, dec!(110));
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.period_end, NaiveDate::from_ymd_opt(2099, 2, 28).unwrap());
    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2099, 3, 30).unwrap());

    let err = service
        .generate(business.id, 2099, 2, issued)
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::AlreadyInvoiced { .. }));

    let page = service
        .store()
        .list_for_business(business.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].id, invoice.id);
}

#[tokio::test]
async fn test_concurrent_generation_creates_one_invoice() {
    let Some(db) = common::connect().await else {
        return;
    };
    let day = NaiveDate::from_ymd_opt(2099, 3, 5).unwrap();
    if let Err(e) = common::reset_day(&db, day).await {
        eprintln!("Skipping test - setup failed: {}", e);
        return;
    }

    let business = common::create_business(&db).await;
    OrderRepository::new(db.clone(), chrono_tz::UTC)
        .create_order(
            common::new_order(UserId::new(), Some(business.id), dec!(80)),
            common::noon(day),
        )
        .await
        .unwrap();

    let service = Arc::new(InvoiceService::new(
        InvoiceRepository::new(db.clone()),
        chrono_tz::UTC,
        30,
    ));
    let barrier = Arc::new(Barrier::new(5));
    let issued = Utc.with_ymd_and_hms(2099, 4, 1, 9, 0, 0).unwrap();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let business_id = business.id;
            tokio::spawn(async move {
                barrier.wait().await;
                service.generate(business_id, 2099, 3, issued).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(InvoiceError::AlreadyInvoiced { .. })
        ));
    }
}

#[tokio::test]
async fn test_lifecycle_and_overdue_sweep() {
    let Some(db) = common::connect().await else {
        return;
    };
    let day = NaiveDate::from_ymd_opt(2099, 5, 5).unwrap();
    if let Err(e) = common::reset_day(&db, day).await {
        eprintln!("Skipping test - setup failed: {}", e);
        return;
    }

    let business = common::create_business(&db).await;
    OrderRepository::new(db.clone(), chrono_tz::UTC)
        .create_order(
            common::new_order(UserId::new(), Some(business.id), dec!(55)),
            common::noon(day),
        )
        .await
        .unwrap();

    let service = InvoiceService::new(InvoiceRepository::new(db.clone()), chrono_tz::UTC, 30);
    let issued = Utc.with_ymd_and_hms(2099, 6, 1, 9, 0, 0).unwrap();
    let invoice = service.generate(business.id, 2099, 5, issued).await.unwrap();

    service
        .transition(invoice.id, InvoiceStatus::Sent, issued)
        .await
        .unwrap();

    let after_due = Utc.with_ymd_and_hms(2099, 7, 2, 9, 0, 0).unwrap();
    let swept = service.mark_overdue(after_due).await.unwrap();
    assert!(swept >= 1);

    let stored = service.store().get(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Overdue);

    let paid = service
        .transition(invoice.id, InvoiceStatus::Paid, after_due)
        .await
        .unwrap();
    assert_eq!(paid.paid_at, Some(after_due));
}

#[tokio::test]
async fn test_businesses_sharing_number_suffix_are_both_invoiced() {
    let Some(db) = common::connect().await else {
        return;
    };
    let day = NaiveDate::from_ymd_opt(2099, 10, 5).unwrap();
    if let Err(e) = common::reset_day(&db, day).await {
        eprintln!("Skipping test - setup failed: {}", e);
        return;
    }

    let suffix = rand_suffix();
    let first = business_with_suffix(&db, suffix).await;
    let second = business_with_suffix(&db, suffix).await;
    assert_eq!(
        invoice_number(first, 2099, 10),
        invoice_number(second, 2099, 10)
    );

    let orders = OrderRepository::new(db.clone(), chrono_tz::UTC);
    let now = common::noon(day);
    let mut billed = Vec::new();
    for business_id in [first, second] {
        let order = orders
            .create_order(common::new_order(UserId::new(), Some(business_id), dec!(50)), now)
            .await
            .unwrap();
        billed.push(order);
    }

    let service = InvoiceService::new(InvoiceRepository::new(db.clone()), chrono_tz::UTC, 30);
    let issued = Utc.with_ymd_and_hms(2099, 11, 1, 9, 0, 0).unwrap();
    let a = service.generate(first, 2099, 10, issued).await.unwrap();
    let b = service.generate(second, 2099, 10, issued).await.unwrap();

    assert_eq!(a.invoice_number, b.invoice_number);
    assert_ne!(a.id, b.id);

    // Rebilling an order under another period is not a duplicate period.
    let rebill = NewInvoice {
        business_id: second,
        invoice_number: invoice_number(second, 2099, 11),
        period_start: NaiveDate::from_ymd_opt(2099, 11, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2099, 11, 30).unwrap(),
        subtotal: dec!(50),
        tax_amount: dec!(5),
        total_amount: dec!(55),
        order_count: 1,
        due_date: NaiveDate::from_ymd_opt(2099, 12, 30).unwrap(),
        order_ids: vec![billed[1].id],
    };
    let err = service.store().insert(rebill, issued).await.unwrap_err();
    assert_eq!(err, InvoiceError::OrdersAlreadyBilled);
}

fn rand_suffix() -> u32 {
    let bytes = Uuid::new_v4().into_bytes();
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

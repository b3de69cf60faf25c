//! Property-based and service tests for invoice module.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pdj_shared::types::{BusinessId, InvoiceId, OrderId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::InvoiceError;
use super::generator::InvoiceGenerator;
use super::service::{InvoiceService, InvoiceStore};
use super::types::{Invoice, InvoiceStatus, NewInvoice};
use crate::numbering::OrderNumber;
use crate::order::{NewOrder, NewOrderItem, Order, OrderStatus};
use crate::period::{DateInterval, PeriodResolver};

fn billed_order(
    business_id: BusinessId,
    subtotal: Decimal,
    tax: Decimal,
    created_at: DateTime<Utc>,
) -> Order {
    let input = NewOrder {
        user_id: UserId::new(),
        business_id: Some(business_id),
        employee_id: None,
        is_business_billed: true,
        subtotal,
        delivery_fee: Decimal::ZERO,
        discount: Decimal::ZERO,
        tax_amount: tax,
        total: subtotal + tax,
        delivery_date: created_at.date_naive(),
        delivery_time: None,
        delivery_postal_code: "01310-100".to_string(),
        items: vec![NewOrderItem {
            dish_name: "Executivo".to_string(),
            category: "mains".to_string(),
            unit_price: subtotal,
            quantity: 1,
        }],
    };
    let number = OrderNumber::new(created_at.date_naive(), 1).unwrap();
    input.into_order(OrderId::new(), number, created_at)
}

fn march() -> DateInterval {
    PeriodResolver::new(chrono_tz::UTC)
        .month_interval(2026, 3)
        .unwrap()
}

fn mid_march() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

#[test]
fn test_invoice_scenario_two_orders() {
    let business_id = BusinessId::new();
    let orders = vec![
        billed_order(business_id, dec!(40), dec!(8), mid_march()),
        billed_order(business_id, dec!(60), dec!(12), mid_march()),
    ];

    let invoice =
        InvoiceGenerator::compute(business_id, 2026, 3, &march(), &orders, 30).unwrap();

    assert_eq!(invoice.subtotal, dec!(100));
    assert_eq!(invoice.tax_amount, dec!(20));
    assert_eq!(invoice.total_amount, dec!(120));
    assert_eq!(invoice.order_count, 2);
    assert_eq!(invoice.period_start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    assert_eq!(invoice.period_end, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 4, 30).unwrap());
}

#[test]
fn test_non_qualifying_orders_are_skipped() {
    let business_id = BusinessId::new();
    let mut cancelled = billed_order(business_id, dec!(500), dec!(0), mid_march());
    cancelled.status = OrderStatus::Cancelled;
    let mut personal = billed_order(business_id, dec!(500), dec!(0), mid_march());
    personal.is_business_billed = false;
    let other_business = billed_order(BusinessId::new(), dec!(500), dec!(0), mid_march());
    let april = billed_order(
        business_id,
        dec!(500),
        dec!(0),
        Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
    );
    let counted = billed_order(business_id, dec!(25), dec!(5), mid_march());

    let invoice = InvoiceGenerator::compute(
        business_id,
        2026,
        3,
        &march(),
        &[cancelled, personal, other_business, april, counted.clone()],
        30,
    )
    .unwrap();

    assert_eq!(invoice.order_count, 1);
    assert_eq!(invoice.total_amount, dec!(30));
    assert_eq!(invoice.order_ids, vec![counted.id]);
}

#[test]
fn test_empty_month_is_not_invoiced() {
    let business_id = BusinessId::new();
    let err = InvoiceGenerator::compute(business_id, 2026, 3, &march(), &[], 30).unwrap_err();
    assert!(matches!(err, InvoiceError::NothingToInvoice { .. }));
}

proptest! {
    /// Property 1: invoice total equals subtotal plus tax.
    #[test]
    fn test_invoice_total_is_subtotal_plus_tax(
        amounts in prop::collection::vec((1i64..1_000_000, 0i64..200_000), 1..30),
    ) {
        let business_id = BusinessId::new();
        let orders: Vec<Order> = amounts
            .iter()
            .map(|&(subtotal, tax)| {
                billed_order(business_id, Decimal::new(subtotal, 2), Decimal::new(tax, 2), mid_march())
            })
            .collect();

        let invoice = InvoiceGenerator::compute(business_id, 2026, 3, &march(), &orders, 30).unwrap();

        prop_assert_eq!(invoice.total_amount, invoice.subtotal + invoice.tax_amount);
        prop_assert_eq!(invoice.order_count, orders.len() as u64);
        let totals: Decimal = orders.iter().map(|o| o.total).sum();
        prop_assert_eq!(invoice.total_amount, totals);
    }
}

#[test]
fn test_status_transitions() {
    use InvoiceStatus::{Cancelled, Draft, Overdue, Paid, Sent};

    assert!(Draft.can_transition_to(Sent));
    assert!(Draft.can_transition_to(Cancelled));
    assert!(Sent.can_transition_to(Paid));
    assert!(Sent.can_transition_to(Overdue));
    assert!(Overdue.can_transition_to(Paid));
    assert!(!Draft.can_transition_to(Paid));
    assert!(!Paid.can_transition_to(Cancelled));
    assert!(!Overdue.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Draft));
}

#[derive(Default)]
struct MemoryStore {
    orders: Vec<Order>,
    invoices: Mutex<Vec<Invoice>>,
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn find_for_period(
        &self,
        business_id: BusinessId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<Invoice>, InvoiceError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| {
                i.business_id == business_id
                    && i.period_start == period_start
                    && i.period_end == period_end
            })
            .cloned())
    }

    async fn billable_orders(
        &self,
        business_id: BusinessId,
        interval: DateInterval,
    ) -> Result<Vec<Order>, InvoiceError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.business_id == Some(business_id) && interval.contains(o.created_at))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        invoice: NewInvoice,
        created_at: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let invoice = invoice.into_invoice(InvoiceId::new(), created_at);
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(invoice)
    }

    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<(), InvoiceError> {
        let mut invoices = self.invoices.lock().unwrap();
        let stored = invoices
            .iter_mut()
            .find(|i| i.id == invoice.id && i.status == expected)
            .ok_or(InvoiceError::ConcurrentUpdate(invoice.id))?;
        stored.status = invoice.status;
        stored.paid_at = invoice.paid_at;
        Ok(())
    }

    async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, InvoiceError> {
        let mut updated = 0;
        for invoice in self.invoices.lock().unwrap().iter_mut() {
            if invoice.is_past_due(today) {
                invoice.status = InvoiceStatus::Overdue;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

fn service_with(orders: Vec<Order>) -> InvoiceService<MemoryStore> {
    InvoiceService::new(
        MemoryStore {
            orders,
            ..MemoryStore::default()
        },
        chrono_tz::UTC,
        30,
    )
}

#[tokio::test]
async fn test_generate_persists_draft_and_rejects_duplicate() {
    let business_id = BusinessId::new();
    let service = service_with(vec![
        billed_order(business_id, dec!(40), dec!(8), mid_march()),
        billed_order(business_id, dec!(60), dec!(12), mid_march()),
    ]);
    let now = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();

    let invoice = service.generate(business_id, 2026, 3, now).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.total_amount, dec!(120));

    let err = service.generate(business_id, 2026, 3, now).await.unwrap_err();
    assert_eq!(
        err,
        InvoiceError::AlreadyInvoiced {
            business_id,
            period_start: invoice.period_start,
            period_end: invoice.period_end,
        }
    );
    assert_eq!(service.store().invoices.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lifecycle_paid_sets_paid_at() {
    let business_id = BusinessId::new();
    let service = service_with(vec![billed_order(business_id, dec!(40), dec!(8), mid_march())]);
    let now = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
    let invoice = service.generate(business_id, 2026, 3, now).await.unwrap();

    service
        .transition(invoice.id, InvoiceStatus::Sent, now)
        .await
        .unwrap();
    let paid = service
        .transition(invoice.id, InvoiceStatus::Paid, now)
        .await
        .unwrap();

    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.paid_at, Some(now));

    let err = service
        .transition(invoice.id, InvoiceStatus::Cancelled, now)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        InvoiceError::InvalidTransition {
            from: InvoiceStatus::Paid,
            to: InvoiceStatus::Cancelled
        }
    );
}

#[tokio::test]
async fn test_overdue_only_after_due_date() {
    let business_id = BusinessId::new();
    let service = service_with(vec![billed_order(business_id, dec!(40), dec!(8), mid_march())]);
    let issued = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
    let invoice = service.generate(business_id, 2026, 3, issued).await.unwrap();
    service
        .transition(invoice.id, InvoiceStatus::Sent, issued)
        .await
        .unwrap();

    let on_due_date = Utc.with_ymd_and_hms(2026, 4, 30, 12, 0, 0).unwrap();
    assert_eq!(service.mark_overdue(on_due_date).await.unwrap(), 0);
    let err = service
        .transition(invoice.id, InvoiceStatus::Overdue, on_due_date)
        .await
        .unwrap_err();
    assert_eq!(err, InvoiceError::NotYetDue(invoice.due_date));

    let day_after = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    assert_eq!(service.mark_overdue(day_after).await.unwrap(), 1);
    let stored = service.store().get(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Overdue);
}

#[tokio::test]
async fn test_transition_unknown_invoice() {
    let service = service_with(Vec::new());
    let id = InvoiceId::new();
    let err = service
        .transition(id, InvoiceStatus::Sent, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, InvoiceError::NotFound(id));
}

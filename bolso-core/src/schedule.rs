//! Installment schedule generation.
//!
//! Payments are numbered 1..N and due on the same day-of-month as the anchor,
//! stepping one calendar month at a time (day clamped on short months, year
//! rollover handled by `chrono::Months`). Every entry carries the single
//! rounded per-installment amount; total paid may drift from the stated total
//! by a few cents and is deliberately not reconciled.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "paid")]
    Paid,
}

/// One payment of an installment purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPayment {
    /// 1..=total_installments, dense.
    pub number: u32,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

/// Materialize the full payment sequence from an anchor date (the first
/// payment's due date).
pub fn build_schedule(
    total_installments: u32,
    installment_amount: f64,
    anchor: NaiveDate,
) -> Vec<InstallmentPayment> {
    (1..=total_installments)
        .map(|number| InstallmentPayment {
            number,
            amount: installment_amount,
            due_date: anchor
                .checked_add_months(Months::new(number - 1))
                .unwrap_or(NaiveDate::MAX),
            status: PaymentStatus::Pending,
        })
        .collect()
}

/// Default anchor for a new installment purchase: day 5 of the following
/// month.
pub fn first_due_date(today: NaiveDate) -> NaiveDate {
    let next_month = today.checked_add_months(Months::new(1)).unwrap_or(today);
    next_month.with_day(5).unwrap_or(next_month)
}

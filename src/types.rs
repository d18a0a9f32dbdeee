use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for an extension record
pub type ExtensionId = Uuid;

/// repayment structure of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    /// one bullet repayment on the due date
    Single,
    /// structured installments
    MultiEmi,
}

/// installment cadence for multi-EMI plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmiFrequency {
    Monthly,
}

/// how a catalog fee is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeApplication {
    /// withheld from the amount paid out
    DeductFromDisbursal,
    /// added to the total repayable
    AddToTotal,
}

/// a named fee from the plan catalog, as a percentage of principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRule {
    pub name: String,
    pub percent: Decimal,
    pub application: FeeApplication,
}

impl FeeRule {
    pub fn new(name: impl Into<String>, percent: Decimal, application: FeeApplication) -> Self {
        Self {
            name: name.into(),
            percent,
            application,
        }
    }
}

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// application created, terms computed, not yet paid out
    Applied,
    /// funds paid out, terms frozen
    Disbursed,
    /// fully repaid
    Settled,
    /// written off as loss
    WrittenOff,
}

/// per-installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

/// extension record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionStatus {
    PendingPayment,
    Approved,
    Rejected,
}

/// how the interest day count was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaysSource {
    /// caller supplied the span
    Custom,
    /// anchored to the borrower's salary date
    SalaryDate,
    /// plan's fixed repayment period
    Fixed,
}

/// completed payment transaction recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub transaction_id: Uuid,
    pub loan_id: LoanId,
    pub amount: Money,
    pub reference_number: String,
    pub transaction_date: NaiveDate,
    pub purpose: PaymentPurpose,
}

/// what a payment settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPurpose {
    Installment,
    ExtensionCharges,
    FullSettlement,
}

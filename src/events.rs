use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ExtensionId, LoanId, LoanStatus};

/// all events a loan account can emit
///
/// the seam between the calculation layer and downstream policy:
/// notification, cooling-period placement and manager assignment consume
/// these rather than being inlined into the calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanApplied {
        loan_id: LoanId,
        principal: Money,
        total_repayable: Money,
    },
    LoanDisbursed {
        loan_id: LoanId,
        disbursal_amount: Money,
        disbursed_on: NaiveDate,
        due_dates: Vec<NaiveDate>,
    },
    LoanSettled {
        loan_id: LoanId,
        settled_on: NaiveDate,
        total_interest_paid: Money,
    },
    LoanWrittenOff {
        loan_id: LoanId,
        written_off_on: NaiveDate,
        outstanding: Money,
    },

    // repayment events
    InstallmentSettled {
        loan_id: LoanId,
        instalment_no: u32,
        amount: Money,
        settled_on: NaiveDate,
    },

    // extension events
    ExtensionRequested {
        loan_id: LoanId,
        extension_id: ExtensionId,
        extension_number: u8,
        total_due: Money,
    },
    ExtensionApproved {
        loan_id: LoanId,
        extension_id: ExtensionId,
        extension_number: u8,
        new_due_dates: Vec<NaiveDate>,
        approved_on: NaiveDate,
    },
    ExtensionRejected {
        loan_id: LoanId,
        extension_id: ExtensionId,
        rejected_on: NaiveDate,
    },

    // credit limit events
    CreditLimitAdvanced {
        loan_id: LoanId,
        old_limit: Money,
        new_limit: Money,
        percentage_tier: Decimal,
    },
    CoolingPeriodEntered {
        loan_id: LoanId,
        premium_limit: Money,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::calculation::{self, LoanCalculation};
use crate::calendar::{add_days, days_between_inclusive};
use crate::config::EngineConfig;
use crate::credit_limit::{self, LimitProgression};
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::extension::{self, ExtensionRecord};
use crate::fees::FeeBreakdown;
use crate::plan::{BorrowerProfile, LoanPlan};
use crate::schedule::{self, EmiInstallment};
use crate::types::{
    ExtensionId, InstallmentStatus, LoanId, LoanStatus, PaymentPurpose, PaymentTransaction,
};

/// loan account aggregate
///
/// owns its plan snapshot and schedule outright (embedded copies, not
/// references) so historical calculations stay reproducible after the
/// catalog plan changes. every state change flows through a validate-
/// then-mutate method and lands an event on the store.
pub struct LoanAccount {
    pub loan_id: LoanId,
    pub borrower: BorrowerProfile,
    pub plan_snapshot: LoanPlan,
    pub principal: Money,
    pub status: LoanStatus,
    pub applied_on: NaiveDate,
    pub disbursed_at: Option<NaiveDate>,

    // frozen at disbursal
    pub disbursal_amount: Money,
    pub interest: Money,
    pub total_repayable: Money,
    pub fees: FeeBreakdown,

    // repayment tracking
    pub processed_due_dates: Vec<NaiveDate>,
    pub emi_schedule: Vec<EmiInstallment>,
    pub transactions: Vec<PaymentTransaction>,

    // extension tracking
    pub extensions: Vec<ExtensionRecord>,
    pub extension_count: u8,
    pub interest_paid: Money,
    /// start of the current interest accrual window, inclusive
    pub interest_accrued_from: Option<NaiveDate>,

    pub events: EventStore,
}

impl LoanAccount {
    /// create an application from a plan snapshot
    pub fn apply(
        plan: &LoanPlan,
        borrower: BorrowerProfile,
        principal: Money,
        applied_on: NaiveDate,
        config: &EngineConfig,
    ) -> Result<Self> {
        let calc = calculation::calculate(principal, plan, &borrower, applied_on, None, config)?;

        let loan_id = Uuid::new_v4();
        let mut account = Self {
            loan_id,
            borrower,
            plan_snapshot: plan.clone(),
            principal,
            status: LoanStatus::Applied,
            applied_on,
            disbursed_at: None,
            disbursal_amount: calc.disbursal_amount,
            interest: calc.interest,
            total_repayable: calc.total_repayable,
            fees: calc.fees.clone(),
            processed_due_dates: calc.due_dates.clone(),
            emi_schedule: calc.emi_schedule.clone(),
            transactions: Vec::new(),
            extensions: Vec::new(),
            extension_count: 0,
            interest_paid: Money::ZERO,
            interest_accrued_from: None,
            events: EventStore::new(),
        };

        account.events.emit(Event::LoanApplied {
            loan_id,
            principal,
            total_repayable: calc.total_repayable,
        });

        Ok(account)
    }

    /// pay out the loan, freezing its terms as of the disbursal date
    pub fn disburse(&mut self, disbursed_on: NaiveDate, config: &EngineConfig) -> Result<()> {
        if self.status != LoanStatus::Applied {
            return Err(EngineError::InvalidState {
                current: format!("{:?}", self.status),
                expected: "Applied".to_string(),
            });
        }

        // due dates and interest re-derive from the actual payout date
        let calc = calculation::calculate(
            self.principal,
            &self.plan_snapshot,
            &self.borrower,
            disbursed_on,
            None,
            config,
        )?;

        self.apply_calculation(&calc);
        self.disbursed_at = Some(disbursed_on);
        self.interest_accrued_from = Some(disbursed_on);
        self.set_status(LoanStatus::Disbursed);

        self.events.emit(Event::LoanDisbursed {
            loan_id: self.loan_id,
            disbursal_amount: self.disbursal_amount,
            disbursed_on,
            due_dates: self.processed_due_dates.clone(),
        });

        Ok(())
    }

    fn apply_calculation(&mut self, calc: &LoanCalculation) {
        self.disbursal_amount = calc.disbursal_amount;
        self.interest = calc.interest;
        self.total_repayable = calc.total_repayable;
        self.fees = calc.fees.clone();
        self.processed_due_dates = calc.due_dates.clone();
        self.emi_schedule = calc.emi_schedule.clone();
    }

    fn set_status(&mut self, new_status: LoanStatus) {
        let old_status = self.status;
        self.status = new_status;
        self.events.emit(Event::StatusChanged {
            loan_id: self.loan_id,
            old_status,
            new_status,
        });
    }

    pub fn is_disbursed(&self) -> bool {
        self.disbursed_at.is_some()
    }

    /// due date anchoring the extension window
    pub fn first_due_date(&self) -> Option<NaiveDate> {
        if self.plan_snapshot.is_multi_emi() {
            self.emi_schedule.first().map(|i| i.due_date)
        } else {
            self.processed_due_dates.first().copied()
        }
    }

    pub fn has_pending_extension(&self) -> bool {
        self.extensions.iter().any(|e| e.is_pending())
    }

    /// principal not yet covered by settled installments
    pub fn outstanding_principal(&self) -> Money {
        match self.status {
            LoanStatus::Settled => Money::ZERO,
            _ if self.plan_snapshot.is_multi_emi() => self
                .emi_schedule
                .iter()
                .filter(|i| i.status == InstallmentStatus::Pending)
                .map(|i| i.principal_component)
                .fold(Money::ZERO, |acc, x| acc + x),
            _ => self.principal,
        }
    }

    fn pending_installments(&self) -> Vec<EmiInstallment> {
        self.emi_schedule
            .iter()
            .filter(|i| i.status == InstallmentStatus::Pending)
            .cloned()
            .collect()
    }

    /// raise an extension request, collecting charges up front
    pub fn request_extension(
        &mut self,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> Result<&ExtensionRecord> {
        let first_due = self.first_due_date().ok_or(EngineError::NotDisbursed)?;

        extension::check_eligibility(
            self.is_disbursed(),
            self.extension_count,
            self.has_pending_extension(),
            first_due,
            today,
            config,
        )?;

        // only the first installment's due date is extendable
        if self.plan_snapshot.is_multi_emi()
            && self.emi_schedule.first().map(|i| i.status) == Some(InstallmentStatus::Paid)
        {
            return Err(EngineError::NotEligible {
                reason: "first installment is already settled".to_string(),
            });
        }

        let original_due_dates: Vec<NaiveDate> = if self.plan_snapshot.is_multi_emi() {
            self.pending_installments().iter().map(|i| i.due_date).collect()
        } else {
            vec![first_due]
        };

        let salary_day = if self.plan_snapshot.calculate_by_salary_date {
            self.borrower.anchoring_day()
        } else {
            None
        };

        let (new_due_dates, extension_period_days) =
            extension::compute_new_due_dates(&original_due_dates, salary_day, config);

        let accrued_from = self.interest_accrued_from.ok_or(EngineError::NotDisbursed)?;
        let charges = extension::compute_charges(
            self.principal,
            self.plan_snapshot.interest_rate_per_day,
            accrued_from,
            today,
            config,
        );

        let record = extension::build_record(
            self.extension_count + 1,
            today,
            charges,
            original_due_dates,
            new_due_dates,
            extension_period_days,
        );

        self.events.emit(Event::ExtensionRequested {
            loan_id: self.loan_id,
            extension_id: record.extension_id,
            extension_number: record.extension_number,
            total_due: record.charges.total_due,
        });

        let index = self.extensions.len();
        self.extensions.push(record);
        Ok(&self.extensions[index])
    }

    /// approve a pending extension
    ///
    /// all-or-nothing: everything fallible runs before the first
    /// mutation, so a failure leaves the record pending and the schedule
    /// untouched for retry.
    pub fn approve_extension(
        &mut self,
        extension_id: ExtensionId,
        reference_number: &str,
        approved_on: NaiveDate,
        config: &EngineConfig,
    ) -> Result<()> {
        if self.extension_count >= config.max_extensions {
            return Err(EngineError::MaxExtensionsReached {
                count: self.extension_count,
            });
        }

        let index = self.find_extension(extension_id)?;
        self.extensions[index].ensure_pending()?;

        let record = self.extensions[index].clone();
        let rate = self.plan_snapshot.interest_rate_per_day;

        // recompute the remaining schedule before touching any state
        let rescheduled = if self.plan_snapshot.is_multi_emi() {
            let remaining = self.pending_installments();
            Some(schedule::reschedule(
                &remaining,
                &record.new_due_dates,
                rate,
                approved_on,
            )?)
        } else {
            None
        };
        let new_single_due = record.new_due_dates.first().copied().ok_or_else(|| {
            EngineError::InvalidState {
                current: "extension with no new due dates".to_string(),
                expected: "at least one new due date".to_string(),
            }
        })?;

        // point of no return: infallible mutations only from here
        self.transactions.push(PaymentTransaction {
            transaction_id: Uuid::new_v4(),
            loan_id: self.loan_id,
            amount: record.charges.total_due,
            reference_number: reference_number.to_string(),
            transaction_date: approved_on,
            purpose: PaymentPurpose::ExtensionCharges,
        });

        self.extensions[index].status = crate::types::ExtensionStatus::Approved;
        self.extension_count += 1;

        match rescheduled {
            Some(new_installments) => {
                self.emi_schedule
                    .retain(|i| i.status == InstallmentStatus::Paid);
                self.emi_schedule.extend(new_installments);
                self.processed_due_dates =
                    self.emi_schedule.iter().map(|i| i.due_date).collect();
                self.interest = schedule::total_interest(&self.emi_schedule);
            }
            None => {
                let days = days_between_inclusive(add_days(approved_on, 1), new_single_due);
                self.interest = self.principal.interest_for_days(rate, days);
                self.processed_due_dates = vec![new_single_due];
            }
        }
        self.total_repayable =
            self.principal + self.interest + self.fees.total_repayable_addition();

        self.interest_paid += record.charges.interest_till_date;
        self.interest_accrued_from = Some(add_days(approved_on, 1));

        self.events.emit(Event::ExtensionApproved {
            loan_id: self.loan_id,
            extension_id,
            extension_number: record.extension_number,
            new_due_dates: record.new_due_dates.clone(),
            approved_on,
        });

        Ok(())
    }

    /// reject a pending extension
    pub fn reject_extension(
        &mut self,
        extension_id: ExtensionId,
        rejected_on: NaiveDate,
    ) -> Result<()> {
        let index = self.find_extension(extension_id)?;
        self.extensions[index].ensure_pending()?;

        self.extensions[index].status = crate::types::ExtensionStatus::Rejected;
        self.events.emit(Event::ExtensionRejected {
            loan_id: self.loan_id,
            extension_id,
            rejected_on,
        });

        Ok(())
    }

    fn find_extension(&self, extension_id: ExtensionId) -> Result<usize> {
        self.extensions
            .iter()
            .position(|e| e.extension_id == extension_id)
            .ok_or_else(|| EngineError::InvalidState {
                current: "no such extension".to_string(),
                expected: "PendingPayment".to_string(),
            })
    }

    /// settle one installment of a multi-EMI loan
    pub fn settle_installment(
        &mut self,
        instalment_no: u32,
        reference_number: &str,
        settled_on: NaiveDate,
    ) -> Result<()> {
        if self.status != LoanStatus::Disbursed {
            return Err(EngineError::InvalidState {
                current: format!("{:?}", self.status),
                expected: "Disbursed".to_string(),
            });
        }

        let installment = self
            .emi_schedule
            .iter_mut()
            .find(|i| i.instalment_no == instalment_no)
            .ok_or(EngineError::InstallmentNotFound { instalment_no })?;

        if installment.status != InstallmentStatus::Pending {
            return Err(EngineError::InvalidState {
                current: format!("{:?}", installment.status),
                expected: "Pending".to_string(),
            });
        }

        installment.status = InstallmentStatus::Paid;
        let amount = installment.instalment_amount;
        let interest_settled = installment.interest_component;

        self.transactions.push(PaymentTransaction {
            transaction_id: Uuid::new_v4(),
            loan_id: self.loan_id,
            amount,
            reference_number: reference_number.to_string(),
            transaction_date: settled_on,
            purpose: PaymentPurpose::Installment,
        });
        self.interest_paid += interest_settled;

        self.events.emit(Event::InstallmentSettled {
            loan_id: self.loan_id,
            instalment_no,
            amount,
            settled_on,
        });

        if self
            .emi_schedule
            .iter()
            .all(|i| i.status == InstallmentStatus::Paid)
        {
            self.set_status(LoanStatus::Settled);
            self.events.emit(Event::LoanSettled {
                loan_id: self.loan_id,
                settled_on,
                total_interest_paid: self.interest_paid,
            });
        }

        Ok(())
    }

    /// settle the whole loan in one payment
    pub fn settle(&mut self, reference_number: &str, settled_on: NaiveDate) -> Result<()> {
        if self.status != LoanStatus::Disbursed {
            return Err(EngineError::InvalidState {
                current: format!("{:?}", self.status),
                expected: "Disbursed".to_string(),
            });
        }

        // only what is still pending falls due on settlement
        let (amount, interest_settled) = if self.plan_snapshot.is_multi_emi() {
            let pending = self.pending_installments();
            (
                schedule::total_payable(&pending),
                schedule::total_interest(&pending),
            )
        } else {
            (self.total_repayable, self.interest)
        };

        self.transactions.push(PaymentTransaction {
            transaction_id: Uuid::new_v4(),
            loan_id: self.loan_id,
            amount,
            reference_number: reference_number.to_string(),
            transaction_date: settled_on,
            purpose: PaymentPurpose::FullSettlement,
        });
        self.interest_paid += interest_settled;

        for installment in &mut self.emi_schedule {
            installment.status = InstallmentStatus::Paid;
        }

        self.set_status(LoanStatus::Settled);
        self.events.emit(Event::LoanSettled {
            loan_id: self.loan_id,
            settled_on,
            total_interest_paid: self.interest_paid,
        });

        Ok(())
    }

    /// write the loan off as a loss
    pub fn write_off(&mut self, written_off_on: NaiveDate) -> Result<()> {
        if self.status != LoanStatus::Disbursed {
            return Err(EngineError::InvalidState {
                current: format!("{:?}", self.status),
                expected: "Disbursed".to_string(),
            });
        }

        let outstanding = self.outstanding_principal();
        self.set_status(LoanStatus::WrittenOff);
        self.events.emit(Event::LoanWrittenOff {
            loan_id: self.loan_id,
            written_off_on,
            outstanding,
        });

        Ok(())
    }

    /// run the credit-limit ladder for this borrower and surface the
    /// policy events; the progression itself stays a pure function
    pub fn advance_credit_limit(
        &mut self,
        disbursed_loan_count: u32,
        current_limit: Money,
        config: &EngineConfig,
    ) -> LimitProgression {
        let step = credit_limit::next_limit(
            self.borrower.monthly_income,
            disbursed_loan_count,
            current_limit,
            config,
        );

        self.events.emit(Event::CreditLimitAdvanced {
            loan_id: self.loan_id,
            old_limit: current_limit,
            new_limit: step.next_limit,
            percentage_tier: step.percentage_tier,
        });

        if step.is_premium {
            self.events.emit(Event::CoolingPeriodEntered {
                loan_id: self.loan_id,
                premium_limit: step.next_limit,
            });
        }

        step
    }
}

/// per-loan mutual-exclusion boundary
///
/// extension approval must not race with itself: the "already pending"
/// and "extension_count" checks and the subsequent writes have to be
/// atomic as a unit. cloning shares the same underlying account.
#[derive(Clone)]
pub struct SharedLoanAccount {
    inner: Arc<Mutex<LoanAccount>>,
}

impl SharedLoanAccount {
    pub fn new(account: LoanAccount) -> Self {
        Self {
            inner: Arc::new(Mutex::new(account)),
        }
    }

    /// run a closure under the loan's lock
    pub fn with<R>(&self, f: impl FnOnce(&mut LoanAccount) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn request_extension(
        &self,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> Result<ExtensionRecord> {
        self.with(|account| account.request_extension(today, config).map(|r| r.clone()))
    }

    pub fn approve_extension(
        &self,
        extension_id: ExtensionId,
        reference_number: &str,
        approved_on: NaiveDate,
        config: &EngineConfig,
    ) -> Result<()> {
        self.with(|account| {
            account.approve_extension(extension_id, reference_number, approved_on, config)
        })
    }
}

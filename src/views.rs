/// serialization support for the storage boundary
use serde::{Deserialize, Serialize};

use crate::account::LoanAccount;
use crate::calendar::date_key;
use crate::decimal::Money;
use crate::extension::ExtensionRecord;
use crate::schedule::EmiInstallment;
use crate::types::{ExtensionStatus, InstallmentStatus, LoanId, LoanStatus};

/// serializable view of a loan account
///
/// what the persistence and API layers consume: money as 2-dp decimals,
/// dates as `YYYY-MM-DD` keys, no timezone anywhere.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub status: LoanStatus,
    pub applied_on: String,
    pub disbursed_at: Option<String>,
    pub financial: FinancialView,
    pub due_dates: Vec<String>,
    pub schedule: Vec<InstallmentView>,
    pub extensions: Vec<ExtensionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub principal: Money,
    pub disbursal_amount: Money,
    pub interest: Money,
    pub total_repayable: Money,
    pub total_disbursal_deduction: Money,
    pub total_repayable_addition: Money,
    pub interest_paid: Money,
    pub outstanding_principal: Money,
    pub extension_count: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentView {
    pub instalment_no: u32,
    pub due_date: String,
    pub outstanding_principal_before: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub fee_component: Money,
    pub instalment_amount: Money,
    pub status: InstallmentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtensionView {
    pub extension_number: u8,
    pub requested_on: String,
    pub extension_fee: Money,
    pub gst_amount: Money,
    pub interest_till_date: Money,
    pub total_due: Money,
    pub new_due_dates: Vec<String>,
    pub extension_period_days: i64,
    pub status: ExtensionStatus,
}

impl LoanView {
    pub fn from_account(account: &LoanAccount) -> Self {
        LoanView {
            id: account.loan_id,
            status: account.status,
            applied_on: date_key(account.applied_on),
            disbursed_at: account.disbursed_at.map(date_key),
            financial: FinancialView {
                principal: account.principal,
                disbursal_amount: account.disbursal_amount,
                interest: account.interest,
                total_repayable: account.total_repayable,
                total_disbursal_deduction: account.fees.total_disbursal_deduction(),
                total_repayable_addition: account.fees.total_repayable_addition(),
                interest_paid: account.interest_paid,
                outstanding_principal: account.outstanding_principal(),
                extension_count: account.extension_count,
            },
            due_dates: account.processed_due_dates.iter().copied().map(date_key).collect(),
            schedule: account.emi_schedule.iter().map(InstallmentView::from).collect(),
            extensions: account.extensions.iter().map(ExtensionView::from).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&EmiInstallment> for InstallmentView {
    fn from(installment: &EmiInstallment) -> Self {
        InstallmentView {
            instalment_no: installment.instalment_no,
            due_date: date_key(installment.due_date),
            outstanding_principal_before: installment.outstanding_principal_before,
            principal_component: installment.principal_component,
            interest_component: installment.interest_component,
            fee_component: installment.fee_component,
            instalment_amount: installment.instalment_amount,
            status: installment.status,
        }
    }
}

impl From<&ExtensionRecord> for ExtensionView {
    fn from(record: &ExtensionRecord) -> Self {
        ExtensionView {
            extension_number: record.extension_number,
            requested_on: date_key(record.requested_on),
            extension_fee: record.charges.extension_fee,
            gst_amount: record.charges.gst_amount,
            interest_till_date: record.charges.interest_till_date,
            total_due: record.charges.total_due,
            new_due_dates: record.new_due_dates.iter().copied().map(date_key).collect(),
            extension_period_days: record.extension_period_days,
            status: record.status,
        }
    }
}

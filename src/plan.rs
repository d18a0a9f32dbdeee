use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{EmiFrequency, FeeRule, PlanType};

/// loan plan snapshot
///
/// copied into the loan at application time and never mutated afterwards,
/// so every recalculation re-derives numbers from the same canonical
/// rules even if the catalog plan changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPlan {
    pub plan_type: PlanType,
    pub emi_count: u32,
    pub emi_frequency: EmiFrequency,
    pub interest_rate_per_day: Rate,
    /// fixed repayment period, and the minimum gap for salary anchoring
    pub repayment_days: u32,
    pub calculate_by_salary_date: bool,
    pub fees: Vec<FeeRule>,
}

impl LoanPlan {
    /// single bullet-repayment plan
    pub fn single_payment(
        interest_rate_per_day: Rate,
        repayment_days: u32,
        calculate_by_salary_date: bool,
        fees: Vec<FeeRule>,
    ) -> Self {
        Self {
            plan_type: PlanType::Single,
            emi_count: 1,
            emi_frequency: EmiFrequency::Monthly,
            interest_rate_per_day,
            repayment_days,
            calculate_by_salary_date,
            fees,
        }
    }

    /// monthly installment plan
    pub fn monthly_emi(
        emi_count: u32,
        interest_rate_per_day: Rate,
        repayment_days: u32,
        calculate_by_salary_date: bool,
        fees: Vec<FeeRule>,
    ) -> Self {
        Self {
            plan_type: PlanType::MultiEmi,
            emi_count,
            emi_frequency: EmiFrequency::Monthly,
            interest_rate_per_day,
            repayment_days,
            calculate_by_salary_date,
            fees,
        }
    }

    pub fn is_multi_emi(&self) -> bool {
        self.plan_type == PlanType::MultiEmi
    }

    pub fn validate(&self) -> Result<()> {
        if self.emi_count == 0 {
            return Err(EngineError::InvalidPlan {
                message: "emi_count must be at least 1".to_string(),
            });
        }

        if self.plan_type == PlanType::Single && self.emi_count != 1 {
            return Err(EngineError::InvalidPlan {
                message: format!(
                    "single-payment plan cannot have {} installments",
                    self.emi_count
                ),
            });
        }

        if self.interest_rate_per_day.as_decimal().is_sign_negative() {
            return Err(EngineError::InvalidPlan {
                message: "interest rate cannot be negative".to_string(),
            });
        }

        for fee in &self.fees {
            if fee.percent.is_sign_negative() {
                return Err(EngineError::InvalidPlan {
                    message: format!("fee {} has a negative percentage", fee.name),
                });
            }
        }

        Ok(())
    }
}

/// borrower snapshot the engine consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerProfile {
    /// stated day of month the salary lands, 1-31
    pub salary_date: Option<u8>,
    pub monthly_income: Money,
}

impl BorrowerProfile {
    pub fn new(salary_date: Option<u8>, monthly_income: Money) -> Self {
        Self {
            salary_date,
            monthly_income,
        }
    }

    /// salary day usable for anchoring, if stated and in range
    pub fn anchoring_day(&self) -> Option<u32> {
        self.salary_date
            .filter(|d| (1..=31).contains(d))
            .map(u32::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeeApplication;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plan_validation() {
        let mut plan = LoanPlan::single_payment(
            Rate::from_decimal(dec!(0.001)),
            15,
            false,
            vec![FeeRule::new("processing", dec!(5), FeeApplication::DeductFromDisbursal)],
        );
        assert!(plan.validate().is_ok());

        plan.emi_count = 0;
        assert!(plan.validate().is_err());

        plan.emi_count = 3;
        // single plan with 3 installments is inconsistent
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_negative_fee_rejected() {
        let plan = LoanPlan::single_payment(
            Rate::from_decimal(dec!(0.001)),
            15,
            false,
            vec![FeeRule::new("bad", dec!(-1), FeeApplication::AddToTotal)],
        );
        assert!(matches!(plan.validate(), Err(EngineError::InvalidPlan { .. })));
    }

    #[test]
    fn test_anchoring_day() {
        let borrower = BorrowerProfile::new(Some(28), Money::from_major(40_000));
        assert_eq!(borrower.anchoring_day(), Some(28));

        let no_salary_date = BorrowerProfile::new(None, Money::from_major(40_000));
        assert_eq!(no_salary_date.anchoring_day(), None);

        let out_of_range = BorrowerProfile::new(Some(0), Money::from_major(40_000));
        assert_eq!(out_of_range.anchoring_day(), None);
    }
}

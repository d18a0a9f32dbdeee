use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{FeeApplication, FeeRule};

/// a single decomposed fee with its GST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLine {
    pub name: String,
    pub amount: Money,
    pub gst: Money,
}

impl FeeLine {
    pub fn total(&self) -> Money {
        self.amount + self.gst
    }
}

/// fees sharing one application method, with running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeeGroup {
    pub lines: Vec<FeeLine>,
    pub fee_total: Money,
    pub gst_total: Money,
}

impl FeeGroup {
    fn push(&mut self, line: FeeLine) {
        self.fee_total += line.amount;
        self.gst_total += line.gst;
        self.lines.push(line);
    }

    pub fn total(&self) -> Money {
        self.fee_total + self.gst_total
    }
}

/// decomposed fee schedule for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeeBreakdown {
    pub disbursal_deductions: FeeGroup,
    pub repayable_additions: FeeGroup,
}

impl FeeBreakdown {
    /// amount withheld from the payout
    pub fn total_disbursal_deduction(&self) -> Money {
        self.disbursal_deductions.total()
    }

    /// amount added on top of principal and interest
    pub fn total_repayable_addition(&self) -> Money {
        self.repayable_additions.total()
    }

    /// add-on fee share carried by each installment
    pub fn per_installment_addition(&self, emi_count: u32) -> Money {
        if emi_count == 0 {
            return Money::ZERO;
        }
        self.repayable_additions.total() / Decimal::from(emi_count)
    }
}

/// decompose a plan's fee rules against a principal
///
/// each fee is a percentage of principal with GST on top. add-to-total
/// fees are defined per installment in the catalog, so on multi-EMI plans
/// their amount and GST scale by the installment count; deduct-from-
/// disbursal fees are charged once, upfront, and never scale.
pub fn decompose(
    principal: Money,
    fees: &[FeeRule],
    emi_count: u32,
    is_multi_emi: bool,
    gst_rate: Rate,
) -> FeeBreakdown {
    let mut breakdown = FeeBreakdown::default();

    for rule in fees {
        let mut amount = principal.percentage(rule.percent);
        let mut gst = Money::from_decimal(amount.as_decimal() * gst_rate.as_decimal());

        match rule.application {
            FeeApplication::DeductFromDisbursal => {
                breakdown.disbursal_deductions.push(FeeLine {
                    name: rule.name.clone(),
                    amount,
                    gst,
                });
            }
            FeeApplication::AddToTotal => {
                if is_multi_emi {
                    amount = amount * Decimal::from(emi_count);
                    gst = gst * Decimal::from(emi_count);
                }
                breakdown.repayable_additions.push(FeeLine {
                    name: rule.name.clone(),
                    amount,
                    gst,
                });
            }
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn gst() -> Rate {
        Rate::from_percentage(18)
    }

    #[test]
    fn test_deduct_fee_decomposition() {
        let breakdown = decompose(
            Money::from_major(10_000),
            &[FeeRule::new("processing", dec!(5), FeeApplication::DeductFromDisbursal)],
            1,
            false,
            gst(),
        );

        let line = &breakdown.disbursal_deductions.lines[0];
        assert_eq!(line.amount, Money::from_major(500));
        assert_eq!(line.gst, Money::from_major(90));
        assert_eq!(breakdown.total_disbursal_deduction(), Money::from_major(590));
        assert_eq!(breakdown.total_repayable_addition(), Money::ZERO);
    }

    #[test]
    fn test_add_to_total_scales_by_installments() {
        let breakdown = decompose(
            Money::from_major(10_000),
            &[FeeRule::new("service", dec!(2), FeeApplication::AddToTotal)],
            3,
            true,
            gst(),
        );

        // 200 fee + 36 gst per installment, charged in total
        let line = &breakdown.repayable_additions.lines[0];
        assert_eq!(line.amount, Money::from_major(600));
        assert_eq!(line.gst, Money::from_major(108));
        assert_eq!(breakdown.total_repayable_addition(), Money::from_major(708));
        assert_eq!(breakdown.per_installment_addition(3), Money::from_major(236));
    }

    #[test]
    fn test_deduct_fee_never_scales() {
        let breakdown = decompose(
            Money::from_major(10_000),
            &[FeeRule::new("processing", dec!(5), FeeApplication::DeductFromDisbursal)],
            3,
            true,
            gst(),
        );

        assert_eq!(breakdown.total_disbursal_deduction(), Money::from_major(590));
    }

    #[test]
    fn test_mixed_fee_plan() {
        let fees = vec![
            FeeRule::new("processing", dec!(5), FeeApplication::DeductFromDisbursal),
            FeeRule::new("documentation", dec!(1.5), FeeApplication::DeductFromDisbursal),
            FeeRule::new("service", dec!(2), FeeApplication::AddToTotal),
        ];

        let breakdown = decompose(Money::from_major(20_000), &fees, 1, false, gst());

        // 1000 + 180 and 300 + 54 deducted, 400 + 72 added
        assert_eq!(breakdown.disbursal_deductions.lines.len(), 2);
        assert_eq!(breakdown.disbursal_deductions.fee_total, Money::from_major(1_300));
        assert_eq!(breakdown.disbursal_deductions.gst_total, Money::from_major(234));
        assert_eq!(breakdown.total_disbursal_deduction(), Money::from_major(1_534));
        assert_eq!(breakdown.total_repayable_addition(), Money::from_major(472));
    }

    #[test]
    fn test_gst_rounds_per_fee() {
        // 0.35% of 9999 = 35.00 (rounded), gst = 6.30
        let breakdown = decompose(
            Money::from_major(9_999),
            &[FeeRule::new("platform", dec!(0.35), FeeApplication::AddToTotal)],
            1,
            false,
            gst(),
        );

        let line = &breakdown.repayable_additions.lines[0];
        assert_eq!(line.amount, Money::from_str_exact("35.00").unwrap());
        assert_eq!(line.gst, Money::from_str_exact("6.30").unwrap());
    }
}

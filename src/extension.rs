use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{add_days, days_between_inclusive, next_day_of_month};
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{ExtensionId, ExtensionStatus};

/// charges collected before an extension is approved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtensionCharges {
    /// 21% of principal
    pub extension_fee: Money,
    /// GST on the extension fee
    pub gst_amount: Money,
    /// interest accrued since disbursal or the last extension, inclusive
    pub interest_till_date: Money,
    pub total_due: Money,
}

/// one extension request against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub extension_id: ExtensionId,
    /// 1-based approval ordinal this record would take
    pub extension_number: u8,
    pub requested_on: NaiveDate,
    pub charges: ExtensionCharges,
    pub original_due_dates: Vec<NaiveDate>,
    pub new_due_dates: Vec<NaiveDate>,
    pub extension_period_days: i64,
    pub status: ExtensionStatus,
}

impl ExtensionRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ExtensionStatus::PendingPayment
    }

    /// guard for the approval/rejection transitions
    pub fn ensure_pending(&self) -> Result<()> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                current: format!("{:?}", self.status),
                expected: "PendingPayment".to_string(),
            })
        }
    }
}

/// check whether a loan may request an extension today
///
/// the window runs from `extension_window_before_days` before the first
/// due date to `extension_window_after_days` after it, both ends
/// inclusive. for multi-EMI loans only the first installment's due date
/// anchors the window; the caller passes that date.
pub fn check_eligibility(
    disbursed: bool,
    extension_count: u8,
    has_pending: bool,
    first_due_date: NaiveDate,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<()> {
    if !disbursed {
        return Err(EngineError::NotEligible {
            reason: "loan is not disbursed".to_string(),
        });
    }

    if extension_count >= config.max_extensions {
        return Err(EngineError::MaxExtensionsReached {
            count: extension_count,
        });
    }

    if has_pending {
        return Err(EngineError::AlreadyPending);
    }

    let window_opens = add_days(first_due_date, -config.extension_window_before_days);
    let window_closes = add_days(first_due_date, config.extension_window_after_days);
    if today < window_opens || today > window_closes {
        return Err(EngineError::NotEligible {
            reason: format!(
                "today {} is outside the extension window {} to {}",
                today, window_opens, window_closes
            ),
        });
    }

    Ok(())
}

/// shifted due dates for every remaining installment
///
/// salary-anchored loans move each date to the salary day one month
/// ahead of its original month; others move a fixed number of days. the
/// relative spacing of a multi-EMI schedule is preserved either way.
pub fn compute_new_due_dates(
    remaining_due_dates: &[NaiveDate],
    salary_day: Option<u32>,
    config: &EngineConfig,
) -> (Vec<NaiveDate>, i64) {
    match salary_day {
        Some(day) => {
            let shifted: Vec<NaiveDate> = remaining_due_dates
                .iter()
                .map(|due| next_day_of_month(*due, day, 1))
                .collect();

            // for multi-EMI the period is the gap between the first and
            // second new dates; for a single date it is the shift itself
            let period = if shifted.len() >= 2 {
                (shifted[1] - shifted[0]).num_days()
            } else {
                shifted
                    .first()
                    .zip(remaining_due_dates.first())
                    .map(|(new, old)| (*new - *old).num_days())
                    .unwrap_or(0)
            };
            (shifted, period)
        }
        None => {
            let shifted = remaining_due_dates
                .iter()
                .map(|due| add_days(*due, config.fixed_extension_days))
                .collect();
            (shifted, config.fixed_extension_days)
        }
    }
}

/// extension fee, GST and accrued interest as of the request date
pub fn compute_charges(
    principal: Money,
    rate_per_day: Rate,
    interest_accrued_from: NaiveDate,
    extension_date: NaiveDate,
    config: &EngineConfig,
) -> ExtensionCharges {
    let extension_fee = principal.percentage(config.extension_fee_percent);
    let gst_amount = Money::from_decimal(extension_fee.as_decimal() * config.gst_rate.as_decimal());
    let accrued_days = days_between_inclusive(interest_accrued_from, extension_date);
    let interest_till_date = principal.interest_for_days(rate_per_day, accrued_days);

    ExtensionCharges {
        extension_fee,
        gst_amount,
        interest_till_date,
        total_due: extension_fee + gst_amount + interest_till_date,
    }
}

/// assemble a pending extension record
pub fn build_record(
    extension_number: u8,
    requested_on: NaiveDate,
    charges: ExtensionCharges,
    original_due_dates: Vec<NaiveDate>,
    new_due_dates: Vec<NaiveDate>,
    extension_period_days: i64,
) -> ExtensionRecord {
    ExtensionRecord {
        extension_id: Uuid::new_v4(),
        extension_number,
        requested_on,
        charges,
        original_due_dates,
        new_due_dates,
        extension_period_days,
        status: ExtensionStatus::PendingPayment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig::standard()
    }

    #[test]
    fn test_window_edges() {
        let due = d(2024, 3, 20);
        let check = |today| check_eligibility(true, 0, false, due, today, &config());

        assert!(check(d(2024, 3, 15)).is_ok()); // due - 5
        assert!(check(d(2024, 3, 14)).is_err()); // due - 6
        assert!(check(d(2024, 4, 4)).is_ok()); // due + 15
        assert!(check(d(2024, 4, 5)).is_err()); // due + 16
        assert!(check(due).is_ok());
    }

    #[test]
    fn test_eligibility_guards() {
        let due = d(2024, 3, 20);
        let today = d(2024, 3, 18);

        assert!(matches!(
            check_eligibility(false, 0, false, due, today, &config()),
            Err(EngineError::NotEligible { .. })
        ));
        assert!(matches!(
            check_eligibility(true, 4, false, due, today, &config()),
            Err(EngineError::MaxExtensionsReached { count: 4 })
        ));
        assert!(matches!(
            check_eligibility(true, 2, true, due, today, &config()),
            Err(EngineError::AlreadyPending)
        ));
        assert!(check_eligibility(true, 3, false, due, today, &config()).is_ok());
    }

    #[test]
    fn test_charges() {
        let charges = compute_charges(
            Money::from_major(20_000),
            Rate::from_decimal(dec!(0.001)),
            d(2024, 3, 1),
            d(2024, 3, 20),
            &config(),
        );

        assert_eq!(charges.extension_fee, Money::from_major(4_200));
        assert_eq!(charges.gst_amount, Money::from_major(756));
        // mar 1 - mar 20 inclusive: 20 days
        assert_eq!(charges.interest_till_date, Money::from_major(400));
        assert_eq!(charges.total_due, Money::from_major(5_356));
    }

    #[test]
    fn test_fixed_shift() {
        let (shifted, period) =
            compute_new_due_dates(&[d(2024, 3, 20), d(2024, 4, 20)], None, &config());

        assert_eq!(shifted, vec![d(2024, 4, 4), d(2024, 5, 5)]);
        assert_eq!(period, 15);
    }

    #[test]
    fn test_salary_shift_single() {
        let (shifted, period) = compute_new_due_dates(&[d(2024, 3, 1)], Some(1), &config());

        assert_eq!(shifted, vec![d(2024, 4, 1)]);
        assert_eq!(period, 31);
    }

    #[test]
    fn test_salary_shift_multi_period_from_new_gap() {
        // originals clamped at feb 29; shifted schedule re-targets day 31
        let (shifted, period) = compute_new_due_dates(
            &[d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)],
            Some(31),
            &config(),
        );

        assert_eq!(shifted, vec![d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]);
        assert_eq!(period, 31);
    }

    #[test]
    fn test_record_transitions() {
        let charges = compute_charges(
            Money::from_major(10_000),
            Rate::from_decimal(dec!(0.001)),
            d(2024, 3, 1),
            d(2024, 3, 18),
            &config(),
        );
        let mut record = build_record(
            1,
            d(2024, 3, 18),
            charges,
            vec![d(2024, 3, 20)],
            vec![d(2024, 4, 4)],
            15,
        );

        assert!(record.ensure_pending().is_ok());

        record.status = ExtensionStatus::Approved;
        assert!(matches!(
            record.ensure_pending(),
            Err(EngineError::InvalidState { .. })
        ));
    }
}

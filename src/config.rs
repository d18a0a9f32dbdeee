use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// engine configuration
///
/// every rate and threshold the calculations depend on, injected at call
/// time. nothing in the engine reads environment or global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// GST applied on top of every fee
    pub gst_rate: Rate,
    /// extension fee as a percentage of principal
    pub extension_fee_percent: Decimal,
    /// lifetime cap on approved extensions per loan
    pub max_extensions: u8,
    /// extension window opens this many days before the first due date
    pub extension_window_before_days: i64,
    /// extension window closes this many days after the first due date
    pub extension_window_after_days: i64,
    /// due-date shift for plans not anchored to a salary date
    pub fixed_extension_days: i64,
    /// credit-limit progression ladder
    pub credit_limit: CreditLimitConfig,
}

/// credit-limit ladder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLimitConfig {
    /// percentage of salary per disbursed-loan count, terminal tier last
    pub tier_percentages: Vec<Decimal>,
    /// cap applied to every non-terminal tier
    pub standard_cap: Money,
    /// fixed limit granted at the terminal tier
    pub premium_limit: Money,
    /// installment count offered with the premium limit
    pub premium_emi_count: u32,
}

impl EngineConfig {
    /// the production rate card
    pub fn standard() -> Self {
        Self {
            gst_rate: Rate::from_percentage(18),
            extension_fee_percent: dec!(21),
            max_extensions: 4,
            extension_window_before_days: 5,
            extension_window_after_days: 15,
            fixed_extension_days: 15,
            credit_limit: CreditLimitConfig {
                tier_percentages: vec![
                    dec!(8),
                    dec!(11),
                    dec!(15.2),
                    dec!(20.9),
                    dec!(28),
                    dec!(32.1),
                ],
                standard_cap: Money::from_major(45_600),
                premium_limit: Money::from_major(150_000),
                premium_emi_count: 24,
            },
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rate_card() {
        let config = EngineConfig::standard();

        assert_eq!(config.gst_rate, Rate::from_percentage(18));
        assert_eq!(config.extension_fee_percent, dec!(21));
        assert_eq!(config.max_extensions, 4);
        assert_eq!(config.extension_window_before_days, 5);
        assert_eq!(config.extension_window_after_days, 15);
        assert_eq!(config.credit_limit.tier_percentages.len(), 6);
        assert_eq!(config.credit_limit.standard_cap, Money::from_major(45_600));
        assert_eq!(config.credit_limit.premium_limit, Money::from_major(150_000));
    }
}

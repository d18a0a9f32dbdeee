use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;

/// outcome of one credit-limit review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitProgression {
    pub next_limit: Money,
    /// percentage of salary used for this step
    pub percentage_tier: Decimal,
    /// terminal tier reached; downstream policy places the user in a
    /// cooling period
    pub is_premium: bool,
}

/// map (salary, disbursed-loan count, current limit) to the next tier limit
///
/// the ladder indexes by loans disbursed so far, saturating at the
/// terminal tier. the candidate is the tier percentage of salary floored
/// to the nearest 100; the limit never regresses below its current value
/// and stays under the standard cap until the terminal tier (or a
/// candidate already past the cap) promotes the user to the fixed
/// premium limit.
pub fn next_limit(
    salary: Money,
    disbursed_loan_count: u32,
    current_limit: Money,
    config: &EngineConfig,
) -> LimitProgression {
    let ladder = &config.credit_limit;
    let index = (disbursed_loan_count as usize).min(ladder.tier_percentages.len() - 1);
    let tier = ladder.tier_percentages[index];
    let terminal = index == ladder.tier_percentages.len() - 1;

    let candidate = salary.percentage(tier).floor100();

    if terminal || candidate > ladder.standard_cap {
        return LimitProgression {
            next_limit: ladder.premium_limit,
            percentage_tier: tier,
            is_premium: true,
        };
    }

    LimitProgression {
        next_limit: current_limit.max(candidate).min(ladder.standard_cap),
        percentage_tier: tier,
        is_premium: false,
    }
}

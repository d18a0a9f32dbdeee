pub mod account;
pub mod calculation;
pub mod calendar;
pub mod config;
pub mod credit_limit;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod extension;
pub mod fees;
pub mod plan;
pub mod schedule;
pub mod types;
pub mod views;

// re-export key types
pub use account::{LoanAccount, SharedLoanAccount};
pub use calculation::{calculate, LoanCalculation};
pub use config::{CreditLimitConfig, EngineConfig};
pub use credit_limit::{next_limit, LimitProgression};
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use extension::{ExtensionCharges, ExtensionRecord};
pub use fees::{FeeBreakdown, FeeGroup, FeeLine};
pub use plan::{BorrowerProfile, LoanPlan};
pub use schedule::EmiInstallment;
pub use types::{
    DaysSource, EmiFrequency, ExtensionId, ExtensionStatus, FeeApplication, FeeRule,
    InstallmentStatus, LoanId, LoanStatus, PaymentPurpose, PaymentTransaction, PlanType,
};
pub use views::{ExtensionView, FinancialView, InstallmentView, LoanView};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid principal: {amount}")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid duration: {days} days")]
    InvalidDuration {
        days: i64,
    },

    #[error("invalid date format: {value}")]
    InvalidDateFormat {
        value: String,
    },

    #[error("not eligible for extension: {reason}")]
    NotEligible {
        reason: String,
    },

    #[error("an extension is already pending payment")]
    AlreadyPending,

    #[error("maximum extensions reached: {count}")]
    MaxExtensionsReached {
        count: u8,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: String,
        expected: String,
    },

    #[error("loan not disbursed")]
    NotDisbursed,

    #[error("invalid plan: {message}")]
    InvalidPlan {
        message: String,
    },

    #[error("installment not found: {instalment_no}")]
    InstallmentNotFound {
        instalment_no: u32,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

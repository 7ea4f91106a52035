//! Trip Settlement Engine
//!
//! Computes who owes whom on a shared trip from the full history of
//! expenses and advances.
//!
//! # Architecture
//!
//! The engine is a pure recomputation over plain data:
//!
//! 1. **Mapping**: Raw trip documents become typed records (`records`)
//! 2. **Settlement**: Per-member expense shares and advance positions (`engine`)
//! 3. **Netting**: Minimal greedy transfer plan over the balances (`netting`)
//! 4. **Report**: View-model with totals, debtors and creditors (`report`)
//!
//! Nothing is cached or mutated between calls, so the same input always
//! produces the same output and concurrent callers need no coordination.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use trip_settlement::{compute_settlements, Expense, Member};
//!
//! let members = vec![
//!     Member::new("a", Some("Ana")),
//!     Member::new("b", Some("Ben")),
//!     Member::new("c", Some("Cy")),
//! ];
//! let expenses = vec![Expense::equal("dinner", Decimal::new(300, 0), "a")];
//!
//! let settlements = compute_settlements(&expenses, &[], &members);
//! assert_eq!(settlements[0].balance, Decimal::new(200, 0));
//! assert_eq!(settlements[1].balance, Decimal::new(-100, 0));
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod netting;
pub mod records;
pub mod report;
pub mod types;

// Re-exports
pub use config::Config;
pub use engine::{
    compute_settlements, creditors, debtors, total_advance, total_expense, SettlementEngine,
};
pub use error::{Error, Result};
pub use netting::{apply_transfers, TransferPlan, TransferPlanner};
pub use records::{PaymentStatus, TripSnapshot};
pub use report::SettlementReport;
pub use types::*;

//! Minimal transfer plan
//!
//! Greedy debt simplification over computed settlements.
//!
//! # Algorithm
//!
//! 1. Split unsettled members into debtors and creditors
//! 2. Pair the largest remaining debt with the largest remaining credit
//! 3. Transfer `min(debt, credit)` and reduce both sides
//! 4. Drop any side that falls inside the settled band, repeat
//!
//! Every round retires at least one member, so `n` unsettled members need
//! at most `n - 1` transfers.
//!
//! # Example
//!
//! ```text
//! Balances:
//!   A: +100 (creditor)
//!   B:  +50 (creditor)
//!   C: -120 (debtor)
//!   D:  -30 (debtor)
//!
//! Transfers:
//!   C pays A: 100
//!   D pays B:  30
//!   C pays B:  20
//! ```

use crate::types::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transfers that zero all balances, with statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Transfers in execution order
    pub transfers: Vec<Transfer>,

    /// Plan statistics
    pub stats: PlanStats,
}

/// Remaining open amount for one side of the matching
#[derive(Debug, Clone)]
struct OpenPosition {
    member_id: MemberId,
    remaining: Decimal,
}

/// Transfer planner
#[derive(Debug, Clone, Default)]
pub struct TransferPlanner;

impl TransferPlanner {
    /// Create new transfer planner
    pub fn new() -> Self {
        Self
    }

    /// Compute a minimal transfer plan for the given settlements
    pub fn plan(&self, settlements: &[Settlement]) -> TransferPlan {
        let mut debtors: Vec<OpenPosition> = settlements
            .iter()
            .filter(|s| s.is_debtor())
            .map(|s| OpenPosition {
                member_id: s.member_id.clone(),
                remaining: s.balance.abs(),
            })
            .collect();

        let mut creditors: Vec<OpenPosition> = settlements
            .iter()
            .filter(|s| s.is_creditor())
            .map(|s| OpenPosition {
                member_id: s.member_id.clone(),
                remaining: s.balance,
            })
            .collect();

        let mut stats = PlanStats {
            unsettled_count: debtors.len() + creditors.len(),
            debtor_count: debtors.len(),
            creditor_count: creditors.len(),
            ..PlanStats::default()
        };

        let mut transfers = Vec::new();

        // Greedy matching: largest debtor pays largest creditor
        while let (Some(d), Some(c)) = (largest(&debtors), largest(&creditors)) {
            let amount = debtors[d].remaining.min(creditors[c].remaining);

            transfers.push(Transfer {
                from: debtors[d].member_id.clone(),
                to: creditors[c].member_id.clone(),
                amount,
            });

            debtors[d].remaining -= amount;
            creditors[c].remaining -= amount;

            if debtors[d].remaining <= SETTLED_EPSILON {
                debtors.remove(d);
            }
            if creditors[c].remaining <= SETTLED_EPSILON {
                creditors.remove(c);
            }
        }

        stats.transfer_count = transfers.len();
        stats.total_transferred = saturating_sum(transfers.iter().map(|t| t.amount));
        stats.residual = saturating_sum(
            debtors
                .iter()
                .chain(creditors.iter())
                .map(|p| p.remaining),
        );

        if stats.residual > SETTLED_EPSILON {
            tracing::debug!(
                residual = %stats.residual,
                "Balances do not sum to zero, plan leaves a residual"
            );
        }

        TransferPlan { transfers, stats }
    }
}

/// Index of the largest open position; ties resolve to the earliest entry
fn largest(positions: &[OpenPosition]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, position) in positions.iter().enumerate() {
        match best {
            Some(b) if positions[b].remaining >= position.remaining => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Apply transfers to settlements and return the resulting balances.
///
/// A transfer raises the payer's balance and lowers the receiver's,
/// clamping at the `Decimal` range.
pub fn apply_transfers(settlements: &[Settlement], transfers: &[Transfer]) -> Vec<Settlement> {
    let mut result = settlements.to_vec();
    let index: HashMap<MemberId, usize> = result
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.member_id.clone(), idx))
        .collect();

    for transfer in transfers {
        if let Some(&idx) = index.get(&transfer.from) {
            result[idx].balance = result[idx].balance.saturating_add(transfer.amount);
        }
        if let Some(&idx) = index.get(&transfer.to) {
            result[idx].balance = result[idx].balance.saturating_sub(transfer.amount);
        }
    }

    result
}

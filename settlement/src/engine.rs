//! Settlement engine
//!
//! Recomputes every member's position from the full expense and advance
//! history on each call.
//!
//! # Algorithm
//!
//! 1. Open a zeroed settlement per roster member
//! 2. For each expense, credit the payer with the full amount and debit
//!    each eligible member with their equal or weighted share
//! 3. For each advance, credit `paid_by` and debit `paid_to`
//! 4. `balance = total_advances - total_expenses`
//!
//! # Example
//!
//! ```text
//! Members A, B, C; A pays 300 split equally
//!   A: expenses 100, advances 300, balance +200
//!   B: expenses 100, advances   0, balance -100
//!   C: expenses 100, advances   0, balance -100
//!
//! B advances 100 to A
//!   A: balance +100
//!   B: balance    0
//!   C: balance -100
//! ```

use crate::{netting::TransferPlanner, records::TripSnapshot, report::SettlementReport, types::*};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Settlement engine
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    /// Transfer planner
    planner: TransferPlanner,

    /// Compute the minimal transfer plan alongside settlements
    include_transfer_plan: bool,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(include_transfer_plan: bool) -> Self {
        Self {
            planner: TransferPlanner::new(),
            include_transfer_plan,
        }
    }

    /// Compute per-member settlements
    pub fn compute_settlements(
        &self,
        expenses: &[Expense],
        advances: &[Advance],
        members: &[Member],
    ) -> Vec<Settlement> {
        compute_settlements(expenses, advances, members)
    }

    /// Build the full settlement view for a trip snapshot
    pub fn settle(&self, trip: &TripSnapshot) -> SettlementReport {
        let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

        let plan = if self.include_transfer_plan {
            Some(self.planner.plan(&settlements))
        } else {
            None
        };

        let report = SettlementReport::new(
            settlements,
            total_expense(&trip.expenses),
            total_advance(&trip.advances),
            plan,
            &trip.paid,
        );

        tracing::info!(
            members = trip.members.len(),
            expenses = trip.expenses.len(),
            advances = trip.advances.len(),
            debtors = report.debtors.len(),
            creditors = report.creditors.len(),
            transfers = report.transfers.len(),
            "Settlement computed"
        );

        report
    }
}

/// Running totals for every roster member
struct Accumulator {
    settlements: Vec<Settlement>,
    index: HashMap<MemberId, usize>,
}

/// Which running total a posting moves
#[derive(Debug, Clone, Copy)]
enum Column {
    Advances,
    Expenses,
}

/// Signed change to one member's running total
#[derive(Debug)]
struct Posting<'a> {
    member_id: &'a MemberId,
    column: Column,
    delta: Decimal,
}

impl<'a> Posting<'a> {
    fn credit(member_id: &'a MemberId, amount: Decimal) -> Self {
        Self {
            member_id,
            column: Column::Advances,
            delta: amount,
        }
    }

    fn debit(member_id: &'a MemberId, amount: Decimal) -> Self {
        Self {
            member_id,
            column: Column::Advances,
            delta: -amount,
        }
    }

    fn charge(member_id: &'a MemberId, share: Decimal) -> Self {
        Self {
            member_id,
            column: Column::Expenses,
            delta: share,
        }
    }
}

impl Accumulator {
    fn open(members: &[Member]) -> Self {
        let mut settlements = Vec::with_capacity(members.len());
        let mut index = HashMap::with_capacity(members.len());

        for member in members {
            // Duplicate roster entries collapse onto the first one
            if index.contains_key(&member.id) {
                tracing::debug!(member_id = %member.id, "Duplicate roster entry ignored");
                continue;
            }
            index.insert(member.id.clone(), settlements.len());
            settlements.push(Settlement::new(member));
        }

        Self { settlements, index }
    }

    /// Apply all postings or none of them.
    ///
    /// Returns `false` without touching any total when one would overflow.
    /// Postings for unknown members are dropped.
    fn post(&mut self, postings: &[Posting<'_>]) -> bool {
        let mut staged: HashMap<usize, (Decimal, Decimal)> = HashMap::new();

        for posting in postings {
            let idx = match self.index.get(posting.member_id) {
                Some(&idx) => idx,
                None => {
                    tracing::debug!(member_id = %posting.member_id, "Dangling posting dropped");
                    continue;
                }
            };

            let settlement = &self.settlements[idx];
            let totals = staged
                .entry(idx)
                .or_insert((settlement.total_advances, settlement.total_expenses));
            let total = match posting.column {
                Column::Advances => &mut totals.0,
                Column::Expenses => &mut totals.1,
            };

            match total.checked_add(posting.delta) {
                Some(updated) => *total = updated,
                None => return false,
            }
        }

        for (idx, (advances, expenses)) in staged {
            self.settlements[idx].total_advances = advances;
            self.settlements[idx].total_expenses = expenses;
        }
        true
    }

    /// Roster members eligible to share an expense
    fn eligible(&self, expense: &Expense) -> Vec<MemberId> {
        match expense.snapshot() {
            Some(snapshot) => {
                let snapshot: HashSet<&MemberId> = snapshot.iter().collect();
                self.settlements
                    .iter()
                    .filter(|s| snapshot.contains(&s.member_id))
                    .map(|s| s.member_id.clone())
                    .collect()
            }
            None => self.settlements.iter().map(|s| s.member_id.clone()).collect(),
        }
    }

    fn apply_expense(&mut self, expense: &Expense) {
        let eligible = self.eligible(expense);

        let postings = match expense.split_method {
            SplitMethod::Equal => {
                if eligible.is_empty() {
                    tracing::debug!(
                        expense_id = %expense.id,
                        "No eligible members, expense skipped"
                    );
                    return;
                }

                let per_person = expense.amount / Decimal::from(eligible.len());
                let mut postings = vec![Posting::credit(&expense.paid_by, expense.amount)];
                postings.extend(eligible.iter().map(|id| Posting::charge(id, per_person)));
                postings
            }
            SplitMethod::Weight => {
                let eligible: HashSet<&MemberId> = eligible.iter().collect();
                let weights: Vec<&WeightEntry> = expense
                    .weight_map
                    .iter()
                    .filter(|entry| eligible.contains(&entry.member_id))
                    .collect();

                let total_weight = weights
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, entry| acc.checked_add(entry.weight));
                let total_weight = match total_weight {
                    Some(total) if total.is_zero() => {
                        tracing::debug!(
                            expense_id = %expense.id,
                            "Zero total weight, expense skipped"
                        );
                        return;
                    }
                    Some(total) => total,
                    None => {
                        tracing::warn!(
                            expense_id = %expense.id,
                            "Total weight overflowed, expense skipped"
                        );
                        return;
                    }
                };

                let mut postings = vec![Posting::credit(&expense.paid_by, expense.amount)];
                for entry in weights {
                    match weighted_share(expense.amount, entry.weight, total_weight) {
                        Some(share) => postings.push(Posting::charge(&entry.member_id, share)),
                        None => {
                            tracing::warn!(
                                expense_id = %expense.id,
                                "Weighted share overflowed, expense skipped"
                            );
                            return;
                        }
                    }
                }
                postings
            }
            SplitMethod::Unsupported => {
                tracing::debug!(
                    expense_id = %expense.id,
                    "Unsupported split method, expense skipped"
                );
                return;
            }
        };

        if !self.post(&postings) {
            tracing::warn!(expense_id = %expense.id, "Running total overflowed, expense skipped");
        }
    }

    fn apply_advance(&mut self, advance: &Advance) {
        let postings = [
            Posting::credit(&advance.paid_by, advance.amount),
            Posting::debit(&advance.paid_to, advance.amount),
        ];

        if !self.post(&postings) {
            tracing::warn!(advance_id = %advance.id, "Running total overflowed, advance skipped");
        }
    }

    fn finalize(mut self) -> Vec<Settlement> {
        for settlement in &mut self.settlements {
            let balance = settlement
                .total_advances
                .checked_sub(settlement.total_expenses);
            settlement.balance = match balance {
                Some(balance) => balance,
                None => {
                    tracing::warn!(
                        member_id = %settlement.member_id,
                        "Balance overflowed and was clamped"
                    );
                    settlement.total_advances.saturating_sub(settlement.total_expenses)
                }
            };
        }
        self.settlements
    }
}

/// `amount * weight / total_weight`, exact when the product fits and
/// `amount * (weight / total_weight)` otherwise.
fn weighted_share(amount: Decimal, weight: Decimal, total_weight: Decimal) -> Option<Decimal> {
    match amount.checked_mul(weight) {
        Some(product) => product.checked_div(total_weight),
        None => weight
            .checked_div(total_weight)
            .and_then(|ratio| amount.checked_mul(ratio)),
    }
}

/// Compute per-member settlements from the full trip history.
///
/// Output order follows the roster. Never fails: degenerate expenses and
/// references to unknown members contribute nothing.
pub fn compute_settlements(
    expenses: &[Expense],
    advances: &[Advance],
    members: &[Member],
) -> Vec<Settlement> {
    let mut acc = Accumulator::open(members);
    if acc.settlements.is_empty() {
        return Vec::new();
    }

    for expense in expenses {
        acc.apply_expense(expense);
    }

    for advance in advances {
        acc.apply_advance(advance);
    }

    acc.finalize()
}

/// Sum of all expense amounts, clamped instead of overflowing
pub fn total_expense(expenses: &[Expense]) -> Decimal {
    saturating_sum(expenses.iter().map(|e| e.amount))
}

/// Sum of all advance amounts, clamped instead of overflowing
pub fn total_advance(advances: &[Advance]) -> Decimal {
    saturating_sum(advances.iter().map(|a| a.amount))
}

/// Settlements owing money beyond the tolerance band
pub fn debtors(settlements: &[Settlement]) -> Vec<Settlement> {
    settlements.iter().filter(|s| s.is_debtor()).cloned().collect()
}

/// Settlements owed money beyond the tolerance band
pub fn creditors(settlements: &[Settlement]) -> Vec<Settlement> {
    settlements.iter().filter(|s| s.is_creditor()).cloned().collect()
}

//! Settlement view-model handed to presentation

use crate::{
    engine::{creditors, debtors},
    netting::TransferPlan,
    records::PaymentStatus,
    types::*,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Computed settlement view for one trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// One settlement per member, in roster order
    pub settlements: Vec<Settlement>,

    /// Sum of all expense amounts
    pub total_expense: Decimal,

    /// Sum of all advance amounts
    pub total_advance: Decimal,

    /// Members owing money
    pub debtors: Vec<Settlement>,

    /// Members owed money
    pub creditors: Vec<Settlement>,

    /// Minimal transfer plan (empty when not requested)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<Transfer>,

    /// Transfer plan statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlanStats>,

    /// Caller-owned payment confirmations, passed through
    #[serde(default)]
    pub paid: PaymentStatus,

    /// Debtors not yet confirmed as paid
    pub outstanding: Vec<MemberId>,
}

impl SettlementReport {
    /// Assemble a report from computed settlements
    pub fn new(
        settlements: Vec<Settlement>,
        total_expense: Decimal,
        total_advance: Decimal,
        plan: Option<TransferPlan>,
        paid: &PaymentStatus,
    ) -> Self {
        let debtors = debtors(&settlements);
        let creditors = creditors(&settlements);

        let outstanding = debtors
            .iter()
            .filter(|s| !paid.get(&s.member_id).copied().unwrap_or(false))
            .map(|s| s.member_id.clone())
            .collect();

        let (transfers, stats) = match plan {
            Some(plan) => (plan.transfers, Some(plan.stats)),
            None => (Vec::new(), None),
        };

        Self {
            settlements,
            total_expense,
            total_advance,
            debtors,
            creditors,
            transfers,
            stats,
            paid: paid.clone(),
            outstanding,
        }
    }

    /// Copy with every amount rounded half away from zero to `dp` places.
    ///
    /// For display only; classification already happened on exact values.
    pub fn rounded(&self, dp: u32) -> Self {
        let strategy = RoundingStrategy::MidpointAwayFromZero;
        let round = |value: Decimal| value.round_dp_with_strategy(dp, strategy);
        let round_settlement = |s: &Settlement| Settlement {
            total_expenses: round(s.total_expenses),
            total_advances: round(s.total_advances),
            balance: round(s.balance),
            ..s.clone()
        };

        Self {
            settlements: self.settlements.iter().map(round_settlement).collect(),
            total_expense: round(self.total_expense),
            total_advance: round(self.total_advance),
            debtors: self.debtors.iter().map(round_settlement).collect(),
            creditors: self.creditors.iter().map(round_settlement).collect(),
            transfers: self
                .transfers
                .iter()
                .map(|t| Transfer {
                    amount: round(t.amount),
                    ..t.clone()
                })
                .collect(),
            stats: self.stats.as_ref().map(|stats| PlanStats {
                total_transferred: round(stats.total_transferred),
                residual: round(stats.residual),
                ..stats.clone()
            }),
            paid: self.paid.clone(),
            outstanding: self.outstanding.clone(),
        }
    }

    /// Net balance across all members (zero for a consistent trip)
    pub fn net_balance(&self) -> Decimal {
        saturating_sum(self.settlements.iter().map(|s| s.balance))
    }
}

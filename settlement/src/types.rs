//! Core types for trip settlement

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance band for treating a balance as settled (0.01 currency units).
///
/// Used for both the settled classification and the debtor/creditor split.
pub const SETTLED_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Name shown for members without a display name
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

/// Sum amounts, clamping at `Decimal::MAX`/`Decimal::MIN` instead of overflowing
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total = Decimal::ZERO;
    let mut saturated = false;
    for value in values {
        match total.checked_add(value) {
            Some(sum) => total = sum,
            None => {
                saturated = true;
                total = total.saturating_add(value);
            }
        }
    }
    if saturated {
        tracing::warn!(total = %total, "Sum overflowed and was clamped");
    }
    total
}

/// Trip member identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Trip participant, real or ghost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member ID
    pub id: MemberId,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

impl Member {
    /// Create new member
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: MemberId::new(id),
            name: name.map(str::to_string),
        }
    }

    /// Display name, falling back to "Unknown"
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_MEMBER_NAME)
    }
}

/// How an expense is divided among its eligible members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Equal share per eligible member
    #[default]
    Equal,
    /// Proportional to the weight map
    Weight,
    /// Unrecognised method; the expense contributes nothing
    #[serde(other)]
    Unsupported,
}

/// Single entry of a weighted split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    /// Member carrying this weight
    pub member_id: MemberId,

    /// Relative weight
    pub weight: Decimal,
}

impl WeightEntry {
    /// Create new weight entry
    pub fn new(member_id: impl Into<String>, weight: Decimal) -> Self {
        Self {
            member_id: MemberId::new(member_id),
            weight,
        }
    }
}

/// Outlay paid by one member and shared by a subset of members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID
    pub id: String,

    /// Amount in trip currency units
    pub amount: Decimal,

    /// Member who paid and is owed the amount back
    pub paid_by: MemberId,

    /// Split method
    #[serde(default)]
    pub split_method: SplitMethod,

    /// Weights, only meaningful for `SplitMethod::Weight`
    #[serde(default)]
    pub weight_map: Vec<WeightEntry>,

    /// Members eligible at creation time.
    /// `None` or empty means every current member shares the expense.
    #[serde(default)]
    pub member_ids_at_creation: Option<Vec<MemberId>>,
}

impl Expense {
    /// Equal split among all current members
    pub fn equal(id: impl Into<String>, amount: Decimal, paid_by: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount,
            paid_by: MemberId::new(paid_by),
            split_method: SplitMethod::Equal,
            weight_map: Vec::new(),
            member_ids_at_creation: None,
        }
    }

    /// Weighted split
    pub fn weighted(
        id: impl Into<String>,
        amount: Decimal,
        paid_by: impl Into<String>,
        weight_map: Vec<WeightEntry>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            paid_by: MemberId::new(paid_by),
            split_method: SplitMethod::Weight,
            weight_map,
            member_ids_at_creation: None,
        }
    }

    /// Restrict eligibility to a creation-time snapshot
    pub fn with_snapshot<I, S>(mut self, member_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_ids_at_creation = Some(member_ids.into_iter().map(MemberId::new).collect());
        self
    }

    /// Snapshot of eligible member IDs, if one was recorded
    pub fn snapshot(&self) -> Option<&[MemberId]> {
        self.member_ids_at_creation
            .as_deref()
            .filter(|ids| !ids.is_empty())
    }
}

/// Direct reimbursement between two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advance {
    /// Advance ID
    pub id: String,

    /// Amount transferred
    pub amount: Decimal,

    /// Member who fronted the money
    pub paid_by: MemberId,

    /// Member who received it and owes it back
    pub paid_to: MemberId,
}

impl Advance {
    /// Create new advance
    pub fn new(
        id: impl Into<String>,
        amount: Decimal,
        paid_by: impl Into<String>,
        paid_to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            paid_by: MemberId::new(paid_by),
            paid_to: MemberId::new(paid_to),
        }
    }
}

/// Computed per-member position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Member ID
    pub member_id: MemberId,

    /// Member display name
    pub member_name: String,

    /// Allocated share of all eligible expenses
    pub total_expenses: Decimal,

    /// Net advance position (to receive minus to pay back)
    pub total_advances: Decimal,

    /// `total_advances - total_expenses`
    /// (positive = net creditor, negative = net debtor)
    pub balance: Decimal,
}

impl Settlement {
    /// Zeroed settlement for a member
    pub fn new(member: &Member) -> Self {
        Self {
            member_id: member.id.clone(),
            member_name: member.display_name().to_string(),
            total_expenses: Decimal::ZERO,
            total_advances: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// Balance within the tolerance band
    pub fn is_settled(&self) -> bool {
        self.balance.abs() <= SETTLED_EPSILON
    }

    /// Owes money beyond the tolerance band
    pub fn is_debtor(&self) -> bool {
        self.balance < -SETTLED_EPSILON
    }

    /// Should receive money beyond the tolerance band
    pub fn is_creditor(&self) -> bool {
        self.balance > SETTLED_EPSILON
    }
}

/// Point-to-point payment in a transfer plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor (pays)
    pub from: MemberId,

    /// Creditor (receives)
    pub to: MemberId,

    /// Amount to pay
    pub amount: Decimal,
}

/// Transfer plan statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    /// Members outside the settled band
    pub unsettled_count: usize,

    /// Number of debtors
    pub debtor_count: usize,

    /// Number of creditors
    pub creditor_count: usize,

    /// Number of transfers in the plan
    pub transfer_count: usize,

    /// Sum of all transfer amounts
    pub total_transferred: Decimal,

    /// Amount left unmatched after the plan
    /// (non-zero only when balances did not sum to zero)
    pub residual: Decimal,
}

//! Mapping from raw trip documents to typed records
//!
//! Persisted trip documents are loosely shaped: collections may be missing
//! or null, amounts may be numbers or numeric strings, and optional fields
//! come and go between app versions. Everything here is lenient. Shape
//! problems degrade to empty collections or zero amounts and never fail;
//! only malformed JSON text is an error.

use crate::{types::*, Error, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Caller-owned record of confirmed real-world payments
pub type PaymentStatus = BTreeMap<MemberId, bool>;

/// Everything the engine needs for one trip, read at a consistent point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSnapshot {
    /// Trip roster
    pub members: Vec<Member>,

    /// Expense history
    pub expenses: Vec<Expense>,

    /// Advance history
    pub advances: Vec<Advance>,

    /// Manual payment confirmations keyed by member
    pub paid: PaymentStatus,
}

impl TripSnapshot {
    /// Map a raw trip document
    pub fn from_value(value: &Value) -> Self {
        Self {
            members: members_from_value(field(value, "members")),
            expenses: expenses_from_value(field(value, "expenses")),
            advances: advances_from_value(field(value, "advances")),
            paid: paid_from_value(field(value, "paid")),
        }
    }

    /// Parse and map a raw trip document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("Failed to parse trip document: {}", e)))?;
        Ok(Self::from_value(&value))
    }
}

/// Map a raw member collection
pub fn members_from_value(value: &Value) -> Vec<Member> {
    objects(value, "members")
        .filter_map(|doc| {
            let id = match doc.get("id").and_then(Value::as_str) {
                Some(id) => id,
                None => {
                    tracing::warn!("Member record without id skipped");
                    return None;
                }
            };

            Some(Member {
                id: MemberId::new(id),
                name: doc.get("name").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}

/// Map a raw expense collection
pub fn expenses_from_value(value: &Value) -> Vec<Expense> {
    objects(value, "expenses")
        .map(|doc| Expense {
            id: string_field(doc, "id"),
            amount: decimal_field(doc, "amount"),
            paid_by: MemberId::new(string_field(doc, "paidBy")),
            split_method: split_method(doc.get("splitMethod")),
            weight_map: weight_map(doc.get("weightMap")),
            member_ids_at_creation: member_ids(doc.get("memberIdsAtCreation")),
        })
        .collect()
}

/// Map a raw advance collection
pub fn advances_from_value(value: &Value) -> Vec<Advance> {
    objects(value, "advances")
        .map(|doc| Advance {
            id: string_field(doc, "id"),
            amount: decimal_field(doc, "amount"),
            paid_by: MemberId::new(string_field(doc, "paidBy")),
            paid_to: MemberId::new(string_field(doc, "paidTo")),
        })
        .collect()
}

/// Map a raw `memberId -> paid` object; non-boolean flags are ignored
pub fn paid_from_value(value: &Value) -> PaymentStatus {
    value
        .as_object()
        .map(|flags| {
            flags
                .iter()
                .filter_map(|(id, flag)| {
                    flag.as_bool()
                        .map(|paid| (MemberId::new(id.as_str()), paid))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Object entries of an array value; anything else yields nothing
fn objects<'a>(
    value: &'a Value,
    collection: &'static str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    let entries: &[Value] = match value {
        Value::Array(entries) => entries,
        Value::Null => &[],
        other => {
            tracing::debug!(
                collection,
                kind = kind(other),
                "Collection is not an array, treated as empty"
            );
            &[]
        }
    };

    entries.iter().filter_map(move |entry| {
        let doc = entry.as_object();
        if doc.is_none() {
            tracing::debug!(collection, "Non-object record skipped");
        }
        doc
    })
}

fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&Value::Null)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_field(doc: &Map<String, Value>, name: &str) -> String {
    doc.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn decimal_field(doc: &Map<String, Value>, name: &str) -> Decimal {
    let record_id = || string_field(doc, "id");

    match doc.get(name) {
        None | Some(Value::Null) => {
            tracing::debug!(
                record_id = %record_id(),
                field = name,
                "Missing amount, treated as zero"
            );
            Decimal::ZERO
        }
        Some(value) => decimal(value).unwrap_or_else(|| {
            tracing::warn!(
                record_id = %record_id(),
                field = name,
                value = %value,
                "Amount is not a representable decimal, treated as zero"
            );
            Decimal::ZERO
        }),
    }
}

/// Numeric JSON value or numeric string as a decimal
fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

fn split_method(value: Option<&Value>) -> SplitMethod {
    match value {
        None | Some(Value::Null) => SplitMethod::Equal,
        Some(Value::String(method)) => match method.as_str() {
            "equal" => SplitMethod::Equal,
            "weight" => SplitMethod::Weight,
            _ => SplitMethod::Unsupported,
        },
        Some(_) => SplitMethod::Unsupported,
    }
}

fn weight_map(value: Option<&Value>) -> Vec<WeightEntry> {
    let entries = match value {
        Some(Value::Array(entries)) => entries,
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| {
            let member_id = entry.get("memberId")?.as_str()?;
            let weight = match entry.get("weight") {
                None | Some(Value::Null) => Decimal::ZERO,
                Some(value) => decimal(value).unwrap_or_else(|| {
                    tracing::warn!(
                        member_id,
                        value = %value,
                        "Weight is not a representable decimal, treated as zero"
                    );
                    Decimal::ZERO
                }),
            };
            Some(WeightEntry {
                member_id: MemberId::new(member_id),
                weight,
            })
        })
        .collect()
}

fn member_ids(value: Option<&Value>) -> Option<Vec<MemberId>> {
    match value {
        Some(Value::Array(ids)) => Some(
            ids.iter()
                .filter_map(Value::as_str)
                .map(MemberId::new)
                .collect(),
        ),
        _ => None,
    }
}

//! End-to-end settlement scenarios
//!
//! Raw trip documents go through the mapping layer, the engine, the
//! transfer planner and the report, the same path the CLI takes.

use rust_decimal::Decimal;
use serde_json::json;
use trip_settlement::{
    apply_transfers, compute_settlements, creditors, debtors, Member, MemberId, SettlementEngine,
    Settlement, TripSnapshot, SETTLED_EPSILON,
};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn find<'a>(settlements: &'a [Settlement], id: &str) -> &'a Settlement {
    settlements
        .iter()
        .find(|s| s.member_id.as_str() == id)
        .expect("member present")
}

fn trip_document() -> serde_json::Value {
    json!({
        "members": [
            {"id": "A", "name": "Ana"},
            {"id": "B", "name": "Ben"},
            {"id": "C"}
        ],
        "expenses": [
            {"id": "e1", "amount": 300, "paidBy": "A", "splitMethod": "equal"}
        ],
        "advances": [
            {"id": "a1", "amount": 100, "paidBy": "B", "paidTo": "A"}
        ],
        "paid": {"C": false}
    })
}

#[test]
fn test_three_member_trip_with_advance() {
    let trip = TripSnapshot::from_value(&trip_document());
    let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

    let a = find(&settlements, "A");
    assert_eq!(a.total_expenses, dec(100));
    assert_eq!(a.total_advances, dec(200));
    assert_eq!(a.balance, dec(100));

    assert_eq!(find(&settlements, "B").balance, Decimal::ZERO);

    let c = find(&settlements, "C");
    assert_eq!(c.member_name, "Unknown");
    assert_eq!(c.balance, dec(-100));

    let sum: Decimal = settlements.iter().map(|s| s.balance).sum();
    assert_eq!(sum, Decimal::ZERO);
}

#[test]
fn test_report_for_trip_document() {
    let trip = TripSnapshot::from_value(&trip_document());
    let report = SettlementEngine::new(true).settle(&trip);

    assert_eq!(report.total_expense, dec(300));
    assert_eq!(report.total_advance, dec(100));
    assert_eq!(report.debtors.len(), 1);
    assert_eq!(report.creditors.len(), 1);
    assert_eq!(report.outstanding, vec![MemberId::new("C")]);

    assert_eq!(report.transfers.len(), 1);
    assert_eq!(report.transfers[0].from.as_str(), "C");
    assert_eq!(report.transfers[0].to.as_str(), "A");
    assert_eq!(report.transfers[0].amount, dec(100));

    let after = apply_transfers(&report.settlements, &report.transfers);
    assert!(after.iter().all(|s| s.is_settled()));
}

#[test]
fn test_legacy_expense_splits_among_all_members() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}, {"id": "B"}, {"id": "C"}, {"id": "D"}],
        "expenses": [
            {"id": "old", "amount": 80, "paidBy": "A"},
            {"id": "empty", "amount": 40, "paidBy": "A", "memberIdsAtCreation": []}
        ]
    }));

    let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

    for id in ["B", "C", "D"] {
        assert_eq!(find(&settlements, id).total_expenses, dec(30));
    }
    assert_eq!(find(&settlements, "A").balance, dec(90));
}

#[test]
fn test_member_added_after_expense_is_not_billed() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}, {"id": "B"}, {"id": "late"}],
        "expenses": [
            {"id": "e1", "amount": 50, "paidBy": "B", "memberIdsAtCreation": ["A", "B"]}
        ]
    }));

    let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

    assert_eq!(find(&settlements, "late").balance, Decimal::ZERO);
    assert_eq!(find(&settlements, "A").balance, dec(-25));
    assert_eq!(find(&settlements, "B").balance, dec(25));
}

#[test]
fn test_weighted_expense_document() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}, {"id": "B"}, {"id": "ghost", "name": "Guest"}],
        "expenses": [{
            "id": "hotel",
            "amount": "400",
            "paidBy": "A",
            "splitMethod": "weight",
            "weightMap": [
                {"memberId": "A", "weight": 2},
                {"memberId": "B", "weight": 1},
                {"memberId": "ghost", "weight": 1}
            ]
        }]
    }));

    let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

    assert_eq!(find(&settlements, "A").total_expenses, dec(200));
    assert_eq!(find(&settlements, "A").total_advances, dec(400));
    assert_eq!(find(&settlements, "B").balance, dec(-100));
    assert_eq!(find(&settlements, "ghost").balance, dec(-100));
}

#[test]
fn test_weighted_all_zero_contributes_nothing() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}, {"id": "B"}],
        "expenses": [{
            "id": "e1",
            "amount": 60,
            "paidBy": "A",
            "splitMethod": "weight",
            "weightMap": [{"memberId": "A", "weight": 0}, {"memberId": "B", "weight": 0}]
        }]
    }));

    let settlements = compute_settlements(&trip.expenses, &trip.advances, &trip.members);

    for settlement in &settlements {
        assert_eq!(settlement.total_expenses, Decimal::ZERO);
        assert_eq!(settlement.total_advances, Decimal::ZERO);
        assert_eq!(settlement.balance, Decimal::ZERO);
    }
}

#[test]
fn test_epsilon_boundary() {
    let members = vec![Member::new("A", None), Member::new("B", None)];
    let mut settlements = compute_settlements(&[], &[], &members);

    settlements[0].balance = Decimal::new(9, 3);
    settlements[1].balance = Decimal::new(-9, 3);
    assert!(debtors(&settlements).is_empty());
    assert!(creditors(&settlements).is_empty());

    settlements[0].balance = Decimal::new(11, 3);
    settlements[1].balance = Decimal::new(-11, 3);
    assert_eq!(creditors(&settlements).len(), 1);
    assert_eq!(debtors(&settlements).len(), 1);

    settlements[0].balance = Decimal::new(5, 3);
    assert!(settlements[0].is_settled());
}

#[test]
fn test_malformed_document_degrades_to_zero() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}],
        "expenses": {"unexpected": "shape"},
        "advances": null
    }));

    let report = SettlementEngine::default().settle(&trip);

    assert_eq!(report.settlements.len(), 1);
    assert_eq!(report.total_expense, Decimal::ZERO);
    assert_eq!(report.total_advance, Decimal::ZERO);
    assert!(report.debtors.is_empty());
}

#[test]
fn test_empty_trip() {
    let trip = TripSnapshot::from_json_str("{}").unwrap();
    let report = SettlementEngine::new(true).settle(&trip);

    assert!(report.settlements.is_empty());
    assert!(report.transfers.is_empty());
    assert_eq!(report.stats.unwrap_or_default().transfer_count, 0);
}

#[test]
fn test_uneven_split_stays_conserved() {
    let trip = TripSnapshot::from_value(&json!({
        "members": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
        "expenses": [
            {"id": "e1", "amount": 10, "paidBy": "A"},
            {"id": "e2", "amount": 0.07, "paidBy": "B"},
            {"id": "e3", "amount": 19.99, "paidBy": "C", "memberIdsAtCreation": ["A", "C"]}
        ]
    }));

    let report = SettlementEngine::new(true).settle(&trip);

    assert!(report.net_balance().abs() <= SETTLED_EPSILON);
    assert!(report.transfers.len() <= 2);

    let after = apply_transfers(&report.settlements, &report.transfers);
    assert!(after.iter().all(|s| s.is_settled()));
}

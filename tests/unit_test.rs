use pokernight_backend::auth;
use pokernight_backend::ledger::{compute_settlement, compute_transfers, Expense, ParticipantTotals};
use pokernight_backend::mailer::{self, LogMailer, Mailer};
use pokernight_backend::models::*;
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn participant(buy_in: &str, cash_out: &str) -> ParticipantTotals {
    ParticipantTotals {
        user_id: Uuid::new_v4(),
        total_buy_in: dec(buy_in),
        total_cash_out: dec(cash_out),
    }
}

/// Unit tests for settlement math
#[test]
fn test_balanced_game_nets_to_zero() {
    let players = vec![
        participant("20", "55"),
        participant("40", "0"),
        participant("20", "25"),
    ];
    let expenses = vec![Expense {
        description: "Pizza".to_string(),
        amount: dec("31.00"),
        paid_by: Some(players[1].user_id),
    }];

    let summary = compute_settlement(&players, &expenses).unwrap();
    assert!(summary.is_balanced());

    let shares: Decimal = summary.lines.iter().map(|l| l.cost_share).sum();
    assert_eq!(shares, dec("31.00"));
    assert_eq!(summary.lines[0].cost_share, dec("10.34"));
    assert_eq!(summary.lines[2].cost_share, dec("10.33"));

    let nets: Decimal = summary.lines.iter().map(|l| l.net_amount).sum();
    assert_eq!(nets, Decimal::ZERO);

    assert!(summary.transfers.len() <= players.len() - 1);
    let moved: Decimal = summary.transfers.iter().map(|t| t.amount).sum();
    let owed: Decimal = summary
        .lines
        .iter()
        .filter(|l| l.net_amount > Decimal::ZERO)
        .map(|l| l.net_amount)
        .sum();
    assert_eq!(moved, owed);
}

#[test]
fn test_discrepancy_reported_not_rejected() {
    let players = vec![participant("20", "30"), participant("20", "5")];
    let summary = compute_settlement(&players, &[]).unwrap();
    assert_eq!(summary.discrepancy, dec("-5"));
    assert!(!summary.is_balanced());
}

#[test]
fn test_transfers_between_many_players() {
    let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let nets = vec![
        (ids[0], dec("30")),
        (ids[1], dec("-10")),
        (ids[2], dec("-25")),
        (ids[3], dec("5")),
    ];
    let transfers = compute_transfers(&nets);
    assert!(transfers.len() <= 3);
    for t in &transfers {
        assert!(t.amount > Decimal::ZERO);
        assert_ne!(t.from_user_id, t.to_user_id);
    }
    let total: Decimal = transfers.iter().map(|t| t.amount).sum();
    assert_eq!(total, dec("35"));
}

/// Unit tests for credentials
#[test]
fn test_password_rules() {
    assert_err!(auth::validate_password("1234567"));
    assert_ok!(auth::validate_password("12345678"));

    let hash = auth::hash_password("12345678").unwrap();
    assert!(assert_ok!(auth::verify_password("12345678", &hash)));
}

#[test]
fn test_token_hash_is_stable() {
    let token = auth::generate_token();
    assert_eq!(auth::hash_token(&token), auth::hash_token(&token));
    assert_ne!(auth::hash_token(&token), auth::hash_token(&auth::generate_token()));
}

/// Unit tests for Models
#[test]
fn test_status_conversions() {
    assert_eq!(SessionStatus::Ongoing.as_str(), "ONGOING");
    assert_eq!(SessionStatus::from_str("completed").unwrap(), SessionStatus::Completed);
    assert_eq!(PlayerStatus::CashedOut.as_str(), "CASHED_OUT");
    assert_eq!(TransactionType::from_str("REBUY"), Some(TransactionType::Rebuy));
    assert_eq!(UserRole::from_str("Admin").unwrap(), UserRole::Admin);
    assert!(UserRole::from_str("owner").is_err());
}

#[test]
fn test_user_serialization_hides_password_hash() {
    let now = chrono::Utc::now().naive_utc();
    let user = User {
        id: Uuid::new_v4(),
        name: "Kim".to_string(),
        email: "kim@example.com".to_string(),
        password_hash: "$argon2id$secret".to_string(),
        role: "user".to_string(),
        created_at: now,
        updated_at: now,
    };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["email"], "kim@example.com");
}

#[test]
fn test_money_serializes_as_string() {
    let totals = SettlementTotals {
        sessions_settled: 1,
        total_buy_in: dec("20.00"),
        total_cash_out: dec("35.50"),
        net_amount: dec("15.50"),
    };
    let json = serde_json::to_value(&totals).unwrap();
    assert_eq!(json["net_amount"], "15.50");
}

/// Unit tests for Mailer
#[test]
fn test_log_mailer_never_fails() {
    let message = mailer::welcome_email("lee@example.com", "Lee", "http://poker.test");
    tokio_test::block_on(async {
        assert_ok!(LogMailer.send(&message).await);
    });
}

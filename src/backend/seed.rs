//! Demo dataset for the fixture backend
//!
//! Demo logins (password `demo1234`):
//! - investor@demo.wealthdesk.in (Investor)
//! - partner@demo.wealthdesk.in (Wealth Partner)
//! - maker@demo.wealthdesk.in (Admin Maker)
//! - checker@demo.wealthdesk.in (Admin Checker)

use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::fixture::{password_digest, FixtureAccount};
use super::records::to_row;
use super::{Row, Table};
use crate::auth::Role;
use crate::models::{
    Bond, Holding, InvestmentRequest, InvestmentStatus, KycRequest, KycStatus, Notification,
    Profile, Referral, ReferralStatus, UserRecord,
};

pub const DEMO_PASSWORD: &str = "demo1234";

const INVESTOR_ID: &str = "00000000-0000-4000-8000-000000000001";
const PARTNER_ID: &str = "00000000-0000-4000-8000-000000000002";
const MAKER_ID: &str = "00000000-0000-4000-8000-000000000003";
const CHECKER_ID: &str = "00000000-0000-4000-8000-000000000004";

const DEMO_USERS: &[(&str, &str, &str, Role)] = &[
    (INVESTOR_ID, "investor@demo.wealthdesk.in", "Asha Investor", Role::Investor),
    (PARTNER_ID, "partner@demo.wealthdesk.in", "Ravi Partner", Role::WealthPartner),
    (MAKER_ID, "maker@demo.wealthdesk.in", "Meera Maker", Role::AdminMaker),
    (CHECKER_ID, "checker@demo.wealthdesk.in", "Kiran Checker", Role::AdminChecker),
];

/// Emails of the demo logins
pub fn demo_logins() -> Vec<&'static str> {
    DEMO_USERS.iter().map(|(_, email, _, _)| *email).collect()
}

fn push<T: Serialize>(tables: &mut HashMap<Table, Vec<Row>>, table: Table, record: &T) {
    if let Ok(row) = to_row(record) {
        tables.entry(table).or_default().push(row);
    }
}

/// Tables and accounts for the demo dataset
pub(crate) fn demo_dataset() -> (HashMap<Table, Vec<Row>>, Vec<FixtureAccount>) {
    let now = Utc::now();
    let today = now.date_naive();
    let mut tables = HashMap::new();
    let mut accounts = Vec::new();

    for (id, email, name, role) in DEMO_USERS {
        accounts.push(FixtureAccount {
            id: id.to_string(),
            email: email.to_string(),
            password_digest: password_digest(email, DEMO_PASSWORD),
        });
        push(
            &mut tables,
            Table::Profiles,
            &Profile {
                id: id.to_string(),
                email: Some(email.to_string()),
                full_name: Some(name.to_string()),
                role: *role,
                created_at: now - Duration::days(90),
            },
        );
        push(
            &mut tables,
            Table::Users,
            &UserRecord {
                id: id.to_string(),
                email: email.to_string(),
                full_name: Some(name.to_string()),
                phone: None,
                created_at: now - Duration::days(90),
            },
        );
    }

    let bonds = [
        ("bond-nhai-2029", "NHAI Tax-Free 2029", "NHAI", 7.35, 1_460, 10_000.0, "AAA"),
        ("bond-rec-2027", "REC Capital Gains 2027", "REC Ltd", 5.25, 730, 20_000.0, "AAA"),
        ("bond-sbi-at1", "SBI AT1 Perpetual", "State Bank of India", 8.10, 3_650, 100_000.0, "AA+"),
    ];
    for (id, name, issuer, coupon_rate, days, min_investment, rating) in bonds {
        push(
            &mut tables,
            Table::Bonds,
            &Bond {
                id: id.to_string(),
                name: name.to_string(),
                issuer: issuer.to_string(),
                coupon_rate,
                maturity_date: today + Duration::days(days),
                min_investment,
                rating: Some(rating.to_string()),
            },
        );
    }

    let icds = [
        ("icd-1001", 500_000.0, 9.5, 12, InvestmentStatus::Active, 60),
        ("icd-1002", 250_000.0, 9.0, 6, InvestmentStatus::Pending, 3),
        ("icd-0901", 300_000.0, 8.75, 6, InvestmentStatus::Matured, 240),
    ];
    for (id, amount, rate, tenure_months, status, age_days) in icds {
        push(
            &mut tables,
            Table::Icds,
            &InvestmentRequest {
                id: id.to_string(),
                investor_id: INVESTOR_ID.to_string(),
                investor_email: Some("investor@demo.wealthdesk.in".to_string()),
                amount,
                rate,
                tenure_months,
                status,
                bond_id: None,
                created_at: now - Duration::days(age_days),
            },
        );
    }

    push(
        &mut tables,
        Table::BondRequests,
        &InvestmentRequest {
            id: "bondreq-2001".to_string(),
            investor_id: INVESTOR_ID.to_string(),
            investor_email: Some("investor@demo.wealthdesk.in".to_string()),
            amount: 50_000.0,
            rate: 7.35,
            tenure_months: 48,
            status: InvestmentStatus::Pending,
            bond_id: Some("bond-nhai-2029".to_string()),
            created_at: now - Duration::days(1),
        },
    );

    push(
        &mut tables,
        Table::Investments,
        &Holding {
            id: "holding-1".to_string(),
            investor_id: INVESTOR_ID.to_string(),
            product: "ICD icd-1001".to_string(),
            amount: 500_000.0,
            current_value: 507_800.0,
            started_on: today - Duration::days(60),
        },
    );

    let referrals = [
        ("ref-1", "neha@example.com", "Neha Shah", ReferralStatus::Approved, Some(1_000_000.0), Some(10_000.0), 30),
        ("ref-2", "vikram@example.com", "Vikram Rao", ReferralStatus::Pending, Some(500_000.0), None, 2),
        ("ref-3", "leela@example.com", "Leela Iyer", ReferralStatus::Rejected, None, None, 45),
    ];
    for (id, investor_email, name, status, investment, commission, age_days) in referrals {
        push(
            &mut tables,
            Table::Referrals,
            &Referral {
                id: id.to_string(),
                partner_email: "partner@demo.wealthdesk.in".to_string(),
                investor_email: investor_email.to_string(),
                investor_name: Some(name.to_string()),
                investor_phone: None,
                status,
                investment,
                commission,
                created_at: now - Duration::days(age_days),
            },
        );
    }

    push(
        &mut tables,
        Table::KycRequests,
        &KycRequest {
            id: "kyc-1".to_string(),
            user_id: INVESTOR_ID.to_string(),
            status: KycStatus::Submitted,
            document_path: Some(format!("kyc-documents/kyc/{}/pan.pdf", INVESTOR_ID)),
            document_type: Some("PAN".to_string()),
            remarks: None,
            created_at: now - Duration::days(5),
            updated_at: None,
        },
    );

    push(
        &mut tables,
        Table::Notifications,
        &Notification {
            id: "note-1".to_string(),
            user_id: INVESTOR_ID.to_string(),
            message: "Your ICD icd-1001 is now active".to_string(),
            read: false,
            created_at: now - Duration::days(59),
        },
    );

    (tables, accounts)
}

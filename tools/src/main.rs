//! payflow-runner: headless demo driver for the money movement engine.
//!
//! Seeds a few accounts and a bill, then walks every movement flow through
//! the OTP-gated session: transfer, deposit, withdrawal, bill payment.
//!
//! Usage:
//!   payflow-runner --db ledger.db --config engine.json
//!   payflow-runner            (shared in-memory database, default config)

use anyhow::Result;
use payflow_core::{
    clock::SystemClock,
    config::EngineConfig,
    model::{Account, Bill, BillStatus, MovementKind, MovementRequest},
    session::{PaymentSession, SessionState},
    store::LedgerStore,
};
use std::env;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(p) => EngineConfig::load(p)?,
        None => EngineConfig::default(),
    };

    println!("payflow-runner");
    println!("  db:     {db}");
    println!("  otp:    {} digits, {}s window", config.otp.code_length, config.otp.ttl_seconds);
    println!();

    // For :memory: use a SQLite shared-memory URI so the bill directory can
    // run on a second connection to the same database.
    let db_effective: String = if db == ":memory:" {
        format!("file:payflow_{}?mode=memory&cache=shared", unix_secs())
    } else {
        db.to_string()
    };
    let mut store = LedgerStore::open(&db_effective)?;
    store.migrate()?;
    let mut bills = store.reopen()?;

    seed(&store)?;

    let clock = Arc::new(SystemClock);
    let mut session = PaymentSession::new(config, clock);

    run_movement(
        &mut session,
        &mut store,
        None,
        "transfer 300,000 alice-checking -> bob-checking",
        MovementRequest {
            kind: MovementKind::Transfer {
                sender: "alice-checking".to_string(),
                receiver: "bob-checking".to_string(),
            },
            amount: 300_000.0,
            memo: "Transfer to Bob".to_string(),
        },
    )?;

    run_movement(
        &mut session,
        &mut store,
        None,
        "deposit 150,000 into bob-checking",
        MovementRequest {
            kind: MovementKind::Deposit {
                account: "bob-checking".to_string(),
            },
            amount: 150_000.0,
            memo: "Deposit".to_string(),
        },
    )?;

    run_movement(
        &mut session,
        &mut store,
        None,
        "withdraw 100,000 from alice-checking",
        MovementRequest {
            kind: MovementKind::Withdrawal {
                account: "alice-checking".to_string(),
            },
            amount: 100_000.0,
            memo: "Withdrawal".to_string(),
        },
    )?;

    let bill = bills
        .lookup_bill("EVN-2024-0001")?
        .ok_or_else(|| anyhow::anyhow!("seeded bill not found"))?;
    run_movement(
        &mut session,
        &mut store,
        Some(&mut bills),
        "pay electricity bill from alice-checking",
        MovementRequest {
            kind: MovementKind::BillPayment {
                account: "alice-checking".to_string(),
                provider: bill.provider.clone(),
                customer_code: bill.customer_code.clone(),
                bill_id: Some(bill.bill_id.clone()),
            },
            amount: bill.amount,
            memo: "Bill payment".to_string(),
        },
    )?;

    print_summary(&store, &bills)?;
    Ok(())
}

fn seed(store: &LedgerStore) -> Result<()> {
    store.upsert_account(&Account::checking("alice-checking", "alice", 1_000_000.0))?;
    store.upsert_account(&Account::checking("bob-checking", "bob", 500_000.0))?;
    store.insert_bill(&Bill {
        bill_id: "bill-evn-0001".to_string(),
        bill_code: "EVN-2024-0001".to_string(),
        bill_type: "ELECTRICITY".to_string(),
        customer_name: "Alice".to_string(),
        customer_code: "PE010203".to_string(),
        provider: "EVN".to_string(),
        amount: 250_000.0,
        status: BillStatus::Unpaid,
        due_date_ms: chrono::Utc::now().timestamp_millis() + 14 * 86_400_000,
        paid_at_ms: None,
        description: "Electricity, current period".to_string(),
    })?;
    Ok(())
}

/// Drive one movement through the full session lifecycle, auto-filling the
/// issued code the way the demo client does.
fn run_movement(
    session: &mut PaymentSession,
    store: &mut LedgerStore,
    bills: Option<&mut LedgerStore>,
    label: &str,
    request: MovementRequest,
) -> Result<()> {
    println!("=> {label}");
    session.reset();

    let debited = request.kind.debit_account().cloned();
    let known_balance = match &debited {
        Some(id) => Some(store.account_balance(id)?),
        None => None,
    };

    if let Err(e) = session.submit_draft(request, known_balance) {
        println!("   rejected at draft: {e}");
        return Ok(());
    }
    let code = session
        .issued_code()
        .ok_or_else(|| anyhow::anyhow!("no challenge issued"))?
        .to_string();
    println!("   OTP {code} ({}s window)", session.remaining_seconds());
    session.enter_code(&code)?;

    let outcome = session.confirm(
        store,
        bills.map(|b| b as &mut dyn payflow_core::bill::BillDirectory),
    )?;
    match outcome {
        SessionState::Succeeded => {
            if let Some(receipt) = session.receipt() {
                println!("   committed txn {}", receipt.transaction_id);
                log::debug!("receipt: {}", serde_json::to_string(receipt)?);
            }
        }
        SessionState::Failed => {
            if let Some(e) = session.error() {
                println!("   failed: {e}");
            }
        }
        SessionState::Expired => println!("   expired before confirmation"),
        other => println!("   unexpected outcome: {other:?}"),
    }
    println!();
    Ok(())
}

fn print_summary(store: &LedgerStore, bills: &LedgerStore) -> Result<()> {
    println!("=== LEDGER SUMMARY ===");
    for owner in ["alice", "bob"] {
        for account in store.accounts_for_owner(owner)? {
            println!(
                "  {:<16} {:>12.0} {}",
                account.account_id, account.balance, account.currency
            );
        }
    }
    println!("  entries: {}", store.transaction_count()?);
    if let Some(bill) = bills.lookup_bill("EVN-2024-0001")? {
        println!(
            "  bill {}: {} ({})",
            bill.bill_code,
            bill.status.as_str(),
            bill.provider
        );
    }

    println!();
    println!("=== RECENT MOVEMENTS (alice-checking) ===");
    for entry in store.transactions_for_participant("alice-checking")? {
        println!(
            "  {} | {:<17} | {:>10.0} | {} -> {}",
            entry.transaction_id,
            entry.kind.as_str(),
            entry.amount,
            entry.sender_account_id,
            entry.receiver_account_id
        );
    }
    Ok(())
}

fn unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

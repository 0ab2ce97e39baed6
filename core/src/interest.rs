//! Interest helpers for saving and mortgage accounts.
//!
//! Display-side calculators only; the movement engines never touch these.

use crate::model::Account;

/// Monthly profit of a saving account: balance * annual rate / 12.
/// Zero when the account carries no rate.
pub fn saving_monthly_profit(account: &Account) -> f64 {
    match account.interest_rate {
        Some(rate) => account.balance * rate / 12.0,
        None => 0.0,
    }
}

/// Fixed monthly payment of a mortgage from principal, annual rate, and
/// term. Zero when any input is missing or degenerate.
pub fn mortgage_monthly_payment(account: &Account) -> f64 {
    let (principal, annual_rate, months) = match (
        account.principal_amount,
        account.interest_rate,
        account.term_months,
    ) {
        (Some(p), Some(r), Some(m)) => (p, r, m),
        _ => return 0.0,
    };
    let monthly_rate = annual_rate / 12.0;
    if monthly_rate == 0.0 || months == 0 {
        return 0.0;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * (monthly_rate * growth) / (growth - 1.0)
}

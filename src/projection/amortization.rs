//! Fixed-rate mortgage amortization

use serde::{Deserialize, Serialize};

/// Monthly rate for an annual rate quoted in percent (6.5 = 6.5%)
pub fn monthly_loan_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Fixed monthly payment for a fully amortizing loan
///
/// Standard annuity formula P * r(1+r)^n / ((1+r)^n - 1). Zero principal pays
/// nothing, a zero rate pays straight-line, and the term is floored at one month.
/// Terms long enough for (1+r)^n to overflow pay interest only.
pub fn compute_monthly_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }

    let term_months = term_years.saturating_mul(12).max(1);

    if annual_rate_percent == 0.0 {
        return principal / term_months as f64;
    }

    let r = monthly_loan_rate(annual_rate_percent);
    let growth = (1.0 + r).powi(i32::try_from(term_months).unwrap_or(i32::MAX));
    if !growth.is_finite() {
        return principal * r;
    }
    principal * r * growth / (growth - 1.0)
}

/// Advance a loan balance by one month
///
/// Returns (new_balance, interest_this_month). Past the term or once paid off,
/// no interest accrues and the balance stays at its floor of zero.
pub fn advance_loan_month(
    loan_balance: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    month_index: u32,
    term_months: u32,
) -> (f64, f64) {
    if loan_balance <= 0.0 || month_index >= term_months {
        return (loan_balance.max(0.0), 0.0);
    }

    let interest = loan_balance * monthly_rate;
    let principal_paid = (monthly_payment - interest).max(0.0);
    let new_balance = (loan_balance - principal_paid).max(0.0);

    (new_balance, interest)
}

/// One month of the amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month number (1-indexed)
    pub month: u32,
    /// Cash paid this month (the last payment may be smaller than nominal)
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Balance after this month's payment
    pub balance: f64,
}

/// Terms of a fixed-rate mortgage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub monthly_rate: f64,
    pub monthly_payment: f64,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        let principal = principal.max(0.0);
        Self {
            principal,
            monthly_rate: monthly_loan_rate(annual_rate_percent),
            monthly_payment: compute_monthly_payment(principal, annual_rate_percent, term_years),
            term_months: term_years.saturating_mul(12).max(1),
        }
    }

    /// Advance `loan_balance` through month `month_index` (0-indexed)
    pub fn advance_month(&self, loan_balance: f64, month_index: u32) -> (f64, f64) {
        advance_loan_month(
            loan_balance,
            self.monthly_rate,
            self.monthly_payment,
            month_index,
            self.term_months,
        )
    }

    /// Outstanding balance after `months` payments
    pub fn balance_after(&self, months: u32) -> f64 {
        (0..months.min(self.term_months)).fold(self.principal, |balance, month| {
            self.advance_month(balance, month).0
        })
    }

    /// Month-by-month schedule until payoff or the end of the term
    pub fn schedule(&self) -> Vec<AmortizationRow> {
        let mut rows = Vec::with_capacity(self.term_months as usize);
        let mut balance = self.principal;

        for month in 0..self.term_months {
            if balance <= 0.0 {
                break;
            }
            let (new_balance, interest) = self.advance_month(balance, month);
            let principal = balance - new_balance;
            rows.push(AmortizationRow {
                month: month + 1,
                payment: principal + interest,
                interest,
                principal,
                balance: new_balance,
            });
            balance = new_balance;
        }

        rows
    }
}

use super::types::{LoanType, floor_zero};

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearSimulation {
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub ending_balance: f64,
}

impl YearSimulation {
    fn idle(balance: f64) -> Self {
        Self {
            interest_paid: 0.0,
            principal_paid: 0.0,
            ending_balance: floor_zero(balance),
        }
    }
}

pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / MONTHS_PER_YEAR as f64
}

/// Level annuity payment. A zero rate degrades to straight-line repayment;
/// a zero-length term is out of contract and yields no payment.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    if !principal.is_finite() || principal <= 0.0 {
        return 0.0;
    }
    let months = term_years * MONTHS_PER_YEAR;
    if months == 0 {
        return 0.0;
    }

    let n = months as f64;
    let r = monthly_rate(annual_rate_pct);
    if r.abs() < 1e-12 {
        return principal / n;
    }

    let denom = 1.0 - (1.0 + r).powf(-n);
    if !denom.is_finite() || denom.abs() < 1e-12 {
        return 0.0;
    }
    let payment = principal * r / denom;
    if payment.is_finite() { payment } else { 0.0 }
}

pub fn interest_only_payment(principal: f64, annual_rate_pct: f64) -> f64 {
    floor_zero(principal) * monthly_rate(annual_rate_pct).max(0.0)
}

pub fn simulate_year(
    balance: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    loan_type: LoanType,
) -> YearSimulation {
    let mut balance = floor_zero(balance);
    let mut interest_paid = 0.0;
    let mut principal_paid = 0.0;

    for _ in 0..MONTHS_PER_YEAR {
        let interest = balance * monthly_rate;
        let principal_step = match loan_type {
            LoanType::PrincipalAndInterest => (monthly_payment - interest).max(0.0).min(balance),
            LoanType::InterestOnly => 0.0,
        };
        interest_paid += interest;
        principal_paid += principal_step;
        balance = floor_zero(balance - principal_step);
    }

    YearSimulation {
        interest_paid,
        principal_paid,
        ending_balance: balance,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanState {
    pub balance: f64,
    pub monthly_rate: f64,
    pub monthly_payment: f64,
    pub loan_type: LoanType,
}

impl LoanState {
    pub fn new(principal: f64, annual_rate_pct: f64, term_years: u32, loan_type: LoanType) -> Self {
        let monthly_payment = match loan_type {
            LoanType::PrincipalAndInterest => monthly_payment(principal, annual_rate_pct, term_years),
            LoanType::InterestOnly => interest_only_payment(principal, annual_rate_pct),
        };
        Self {
            balance: floor_zero(principal),
            monthly_rate: monthly_rate(annual_rate_pct),
            monthly_payment,
            loan_type,
        }
    }

    /// Same loan with a different starting balance but the original
    /// contractual repayment.
    pub fn with_balance(self, balance: f64) -> Self {
        Self {
            balance: floor_zero(balance),
            ..self
        }
    }

    /// Runs twelve monthly steps with `extra_monthly` on top of the scheduled
    /// payment and commits the ending balance.
    pub fn advance_year(&mut self, extra_monthly: f64) -> YearSimulation {
        if self.balance <= 0.0 {
            return YearSimulation::idle(0.0);
        }
        let year = simulate_year(
            self.balance,
            self.monthly_rate,
            self.monthly_payment + floor_zero(extra_monthly),
            self.loan_type,
        );
        self.balance = year.ending_balance;
        year
    }

    pub fn hold_year(&self) -> YearSimulation {
        YearSimulation::idle(self.balance)
    }
}

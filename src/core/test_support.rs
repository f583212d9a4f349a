use super::types::{Inputs, LoanType};
use crate::config::{default_lmi_tiers, default_tax_brackets};

/// 800k purchase with 20% down, $600/week rent and $8k of running costs.
pub(crate) fn sample_inputs() -> Inputs {
    Inputs {
        self_salary: 120_000.0,
        spouse_salary: 0.0,
        self_ownership_share: 1.0,
        purchase_price: 800_000.0,
        deposit: 160_000.0,
        weekly_rent: 600.0,
        interest_rate_pct: 6.0,
        loan_term_years: 30,
        loan_type: LoanType::PrincipalAndInterest,
        council_rates: 3_500.0,
        water_rates: 1_500.0,
        insurance: 3_000.0,
        management_fee_rate: 0.0,
        maintenance_rate: 0.0,
        depreciation: 5_000.0,
        purchase_agent_rate: 0.0,
        selling_agent_rate: 0.02,
        marketing_cost: 3_000.0,
        medicare_levy_rate: 0.02,
        tax_brackets: default_tax_brackets(),
        lmi_tiers: default_lmi_tiers(),
        appreciation_rate: 0.0,
        horizon_years: 1,
        invest_delay_years: 0,
        ppor_value: 750_000.0,
        ppor_balance: 350_000.0,
        ppor_rate_pct: 6.0,
        ppor_term_years: 25,
        ppor_appreciation_rate: 0.0,
        extra_monthly_payment: 0.0,
    }
}

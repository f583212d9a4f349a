use serde::{Deserialize, Serialize};

/// Clamps a monetary amount at zero. Every balance, equity and net-worth
/// site goes through this so negative values never reach a sum. Overflow
/// saturates at `f64::MAX`; NaN reads as zero.
pub fn floor_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, f64::MAX)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanType {
    #[serde(alias = "pi", alias = "principalAndInterest", alias = "principal_and_interest")]
    PrincipalAndInterest,
    #[serde(alias = "io", alias = "interestOnly", alias = "interest_only")]
    InterestOnly,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket in dollars.
    pub threshold: f64,
    /// Rate as a fraction, applied up to the next bracket's threshold.
    pub rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmiTier {
    pub min_lvr_pct: f64,
    pub max_lvr_pct: f64,
    /// Premium as a percent of the loan amount.
    pub rate_pct: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTaxProfile {
    pub annual_salary: f64,
    pub ownership_share: f64,
    pub marginal_rate: f64,
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub self_salary: f64,
    pub spouse_salary: f64,
    /// Fraction of the property owned by "self"; spouse owns the rest.
    pub self_ownership_share: f64,

    pub purchase_price: f64,
    pub deposit: f64,
    pub weekly_rent: f64,
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub loan_type: LoanType,

    pub council_rates: f64,
    pub water_rates: f64,
    pub insurance: f64,
    pub management_fee_rate: f64,
    pub maintenance_rate: f64,
    pub depreciation: f64,

    pub purchase_agent_rate: f64,
    pub selling_agent_rate: f64,
    pub marketing_cost: f64,

    pub medicare_levy_rate: f64,
    pub tax_brackets: Vec<TaxBracket>,
    pub lmi_tiers: Vec<LmiTier>,

    pub appreciation_rate: f64,
    pub horizon_years: u32,
    pub invest_delay_years: u32,

    pub ppor_value: f64,
    pub ppor_balance: f64,
    pub ppor_rate_pct: f64,
    pub ppor_term_years: u32,
    pub ppor_appreciation_rate: f64,
    pub extra_monthly_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTaxOutcome {
    pub annual_salary: f64,
    pub ownership_share: f64,
    pub marginal_rate: f64,
    pub rental_share: f64,
    pub tax_savings: f64,
    pub tax_on_salary: f64,
    pub tax_with_property: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub council_rates: f64,
    pub water_rates: f64,
    pub insurance: f64,
    pub management_fee: f64,
    pub maintenance: f64,
}

impl ExpenseBreakdown {
    pub fn total(&self) -> f64 {
        self.council_rates
            + self.water_rates
            + self.insurance
            + self.management_fee
            + self.maintenance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResult {
    pub annual_rent: f64,
    pub expenses: ExpenseBreakdown,
    pub total_expenses: f64,
    pub interest: f64,
    pub principal: f64,
    pub rental_yield_pct: Option<f64>,
    pub base_loan_amount: f64,
    pub base_lvr_pct: Option<f64>,
    pub lmi_cost: f64,
    pub loan_amount: f64,
    pub lvr_pct: Option<f64>,
    pub monthly_loan_payment: f64,
    pub pre_depreciation_result: f64,
    pub taxable_result: f64,
    pub annual_tax_savings: f64,
    pub out_of_pocket_before_tax: f64,
    pub out_of_pocket_after_tax: f64,
    pub monthly_out_of_pocket: f64,
    pub self_tax: PersonTaxOutcome,
    pub spouse_tax: PersonTaxOutcome,
    pub blended_marginal_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjectionRecord {
    pub year: u32,
    pub loan_balance: f64,
    pub property_value: f64,
    pub selling_costs: f64,
    pub equity: f64,
    pub rent: f64,
    pub expenses: f64,
    pub depreciation: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub taxable_result: f64,
    pub tax_savings: f64,
    pub after_tax_cashflow: f64,
    pub cumulative_after_tax_cashflow: f64,
    pub baseline_extra_payment: f64,
    pub invest_ppor_balance: f64,
    pub invest_ppor_value: f64,
    pub no_invest_ppor_balance: f64,
    pub no_invest_ppor_value: f64,
    pub invest_net_worth: f64,
    pub no_invest_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: Vec<YearlyProjectionRecord>,
    pub final_invest_net_worth: f64,
    pub final_no_invest_net_worth: f64,
    pub net_worth_difference: f64,
    pub crossover_year: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub snapshot: SnapshotResult,
    pub projection: ProjectionResult,
}

use super::lmi::estimate_lmi_cost;
use super::loan::{LoanState, simulate_year};
use super::tax::annual_tax;
use super::types::{
    ExpenseBreakdown, Inputs, LoanType, PersonTaxOutcome, PersonTaxProfile, SnapshotResult,
    TaxBracket, floor_zero,
};

pub const WEEKS_PER_YEAR: f64 = 52.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Household {
    pub owner: PersonTaxProfile,
    pub spouse: PersonTaxProfile,
}

impl Household {
    pub fn from_inputs(inputs: &Inputs) -> Self {
        let self_share = inputs.self_ownership_share.clamp(0.0, 1.0);
        Self {
            owner: PersonTaxProfile::new(inputs.self_salary, self_share, &inputs.tax_brackets),
            spouse: PersonTaxProfile::new(
                inputs.spouse_salary,
                1.0 - self_share,
                &inputs.tax_brackets,
            ),
        }
    }

    pub fn tax_savings(&self, taxable_result: f64, medicare_levy_rate: f64) -> f64 {
        self.owner.tax_savings(taxable_result, medicare_levy_rate)
            + self.spouse.tax_savings(taxable_result, medicare_levy_rate)
    }

    pub fn blended_marginal_rate(&self, medicare_levy_rate: f64) -> f64 {
        self.owner.effective_rate(medicare_levy_rate)
            + self.spouse.effective_rate(medicare_levy_rate)
    }
}

/// Rent and itemised running costs for a full year of letting.
pub fn annual_expenses(inputs: &Inputs, annual_rent: f64) -> ExpenseBreakdown {
    ExpenseBreakdown {
        council_rates: inputs.council_rates,
        water_rates: inputs.water_rates,
        insurance: inputs.insurance,
        management_fee: annual_rent * inputs.management_fee_rate,
        maintenance: annual_rent * inputs.maintenance_rate,
    }
}

fn ratio_pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 && numerator.is_finite() {
        Some(numerator / denominator * 100.0)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanSizing {
    pub base_loan: f64,
    pub base_lvr_pct: Option<f64>,
    pub lmi_cost: f64,
    pub loan_amount: f64,
}

/// LMI is priced once on the base LVR and capitalised; it is not re-priced
/// against the inflated loan.
pub fn size_loan(inputs: &Inputs) -> LoanSizing {
    let base_loan = floor_zero(inputs.purchase_price - inputs.deposit);
    let base_lvr_pct = ratio_pct(base_loan, inputs.purchase_price);
    let lmi_cost = base_lvr_pct
        .map(|lvr| estimate_lmi_cost(lvr, base_loan, &inputs.lmi_tiers))
        .unwrap_or(0.0);
    LoanSizing {
        base_loan,
        base_lvr_pct,
        lmi_cost,
        loan_amount: base_loan + lmi_cost,
    }
}

pub fn investment_loan(inputs: &Inputs, sizing: &LoanSizing) -> LoanState {
    LoanState::new(
        sizing.loan_amount,
        inputs.interest_rate_pct,
        inputs.loan_term_years,
        inputs.loan_type,
    )
}

fn person_outcome(
    person: &PersonTaxProfile,
    taxable_result: f64,
    medicare_levy_rate: f64,
    brackets: &[TaxBracket],
) -> PersonTaxOutcome {
    let rental_share = taxable_result * person.ownership_share;
    PersonTaxOutcome {
        annual_salary: person.annual_salary,
        ownership_share: person.ownership_share,
        marginal_rate: person.marginal_rate,
        rental_share,
        tax_savings: person.tax_savings(taxable_result, medicare_levy_rate),
        tax_on_salary: annual_tax(person.annual_salary, brackets),
        tax_with_property: annual_tax(person.annual_salary + rental_share, brackets),
    }
}

pub fn calculate_snapshot(inputs: &Inputs) -> SnapshotResult {
    let sizing = size_loan(inputs);
    let loan_amount = sizing.loan_amount;
    let loan = investment_loan(inputs, &sizing);

    let (interest, principal) = match inputs.loan_type {
        LoanType::PrincipalAndInterest => {
            let year = simulate_year(
                loan.balance,
                loan.monthly_rate,
                loan.monthly_payment,
                loan.loan_type,
            );
            (year.interest_paid, year.principal_paid)
        }
        LoanType::InterestOnly => (loan_amount * inputs.interest_rate_pct / 100.0, 0.0),
    };

    let annual_rent = inputs.weekly_rent * WEEKS_PER_YEAR;
    let expenses = annual_expenses(inputs, annual_rent);
    let total_expenses = expenses.total();

    let pre_depreciation_result = annual_rent - total_expenses - interest;
    let taxable_result = pre_depreciation_result - inputs.depreciation;

    let household = Household::from_inputs(inputs);
    let levy = inputs.medicare_levy_rate;
    let self_tax = person_outcome(&household.owner, taxable_result, levy, &inputs.tax_brackets);
    let spouse_tax = person_outcome(&household.spouse, taxable_result, levy, &inputs.tax_brackets);
    let annual_tax_savings = self_tax.tax_savings + spouse_tax.tax_savings;

    let out_of_pocket_before_tax = total_expenses + interest + principal - annual_rent;
    let out_of_pocket_after_tax = out_of_pocket_before_tax - annual_tax_savings;

    SnapshotResult {
        annual_rent,
        expenses,
        total_expenses,
        interest,
        principal,
        rental_yield_pct: ratio_pct(annual_rent, inputs.purchase_price),
        base_loan_amount: sizing.base_loan,
        base_lvr_pct: sizing.base_lvr_pct,
        lmi_cost: sizing.lmi_cost,
        loan_amount,
        lvr_pct: ratio_pct(loan_amount, inputs.purchase_price),
        monthly_loan_payment: loan.monthly_payment,
        pre_depreciation_result,
        taxable_result,
        annual_tax_savings,
        out_of_pocket_before_tax,
        out_of_pocket_after_tax,
        monthly_out_of_pocket: out_of_pocket_after_tax / 12.0,
        self_tax,
        spouse_tax,
        blended_marginal_rate: household.blended_marginal_rate(levy),
    }
}

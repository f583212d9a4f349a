use super::loan::{LoanState, YearSimulation};
use super::snapshot::{Household, calculate_snapshot};
use super::types::{
    CalculationResult, Inputs, LoanType, ProjectionResult, SnapshotResult,
    YearlyProjectionRecord, floor_zero,
};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Longest projection the engine will run; longer horizons are truncated.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Annual letting figures carried into every active projection year.
#[derive(Debug, Clone, Copy)]
struct LettingFlows {
    rent: f64,
    expenses: f64,
    depreciation: f64,
}

impl LettingFlows {
    fn from_snapshot(inputs: &Inputs, snapshot: &SnapshotResult) -> Self {
        Self {
            rent: snapshot.annual_rent,
            expenses: snapshot.total_expenses,
            depreciation: inputs.depreciation,
        }
    }

    fn dormant() -> Self {
        Self {
            rent: 0.0,
            expenses: 0.0,
            depreciation: 0.0,
        }
    }
}

#[derive(Debug)]
struct InvestPath {
    loan: LoanState,
    property_value: f64,
    ppor: LoanState,
    cumulative_cashflow: f64,
}

#[derive(Debug)]
struct BaselinePath {
    ppor: LoanState,
}

#[derive(Debug, Clone, Copy)]
struct InvestYearOutcome {
    loan: YearSimulation,
    flows: LettingFlows,
    taxable_result: f64,
    tax_savings: f64,
    after_tax_cashflow: f64,
    out_of_pocket_before_tax: f64,
}

#[derive(Debug, Clone, Copy)]
struct YearContext {
    year: u32,
    active: bool,
    is_final: bool,
}

/// Full recompute: single-year snapshot plus both projection paths.
pub fn calculate(inputs: &Inputs) -> CalculationResult {
    let snapshot = calculate_snapshot(inputs);
    let projection = run_projection(inputs, &snapshot);
    CalculationResult {
        snapshot,
        projection,
    }
}

pub fn run_projection(inputs: &Inputs, snapshot: &SnapshotResult) -> ProjectionResult {
    let horizon = inputs.horizon_years.clamp(1, MAX_HORIZON_YEARS);
    let household = Household::from_inputs(inputs);
    let letting = LettingFlows::from_snapshot(inputs, snapshot);

    let ppor_loan = LoanState::new(
        inputs.ppor_balance,
        inputs.ppor_rate_pct,
        inputs.ppor_term_years,
        LoanType::PrincipalAndInterest,
    );
    let mut invest = InvestPath {
        loan: LoanState::new(
            snapshot.loan_amount,
            inputs.interest_rate_pct,
            inputs.loan_term_years,
            inputs.loan_type,
        ),
        property_value: floor_zero(inputs.purchase_price),
        ppor: ppor_loan,
        cumulative_cashflow: 0.0,
    };
    let mut baseline = BaselinePath {
        ppor: ppor_loan.with_balance(inputs.ppor_balance - inputs.deposit),
    };
    let mut ppor_value = floor_zero(inputs.ppor_value);

    let mut years = Vec::with_capacity(horizon as usize + 1);
    years.push(opening_record(inputs, &invest, &baseline, ppor_value));

    for year in 1..=horizon {
        let ctx = YearContext {
            year,
            active: year > inputs.invest_delay_years,
            is_final: year == horizon,
        };
        let record = step_year(
            inputs,
            ctx,
            &letting,
            &household,
            &mut invest,
            &mut baseline,
            &mut ppor_value,
        );
        years.push(record);
    }

    summarize(years)
}

/// One projection year. The invest path's figures are settled first because
/// the baseline's extra repayment for the same year is derived from them.
fn step_year(
    inputs: &Inputs,
    ctx: YearContext,
    letting: &LettingFlows,
    household: &Household,
    invest: &mut InvestPath,
    baseline: &mut BaselinePath,
    ppor_value: &mut f64,
) -> YearlyProjectionRecord {
    let outcome = advance_investment(invest, ctx, letting, household, inputs.medicare_levy_rate);

    let baseline_extra_monthly = if ctx.active {
        floor_zero(outcome.out_of_pocket_before_tax / MONTHS_PER_YEAR)
    } else {
        0.0
    };

    invest.ppor.advance_year(inputs.extra_monthly_payment);
    baseline
        .ppor
        .advance_year(inputs.extra_monthly_payment + baseline_extra_monthly);

    invest.property_value = floor_zero(invest.property_value * (1.0 + inputs.appreciation_rate));
    *ppor_value = floor_zero(*ppor_value * (1.0 + inputs.ppor_appreciation_rate));

    let selling_costs = if ctx.is_final {
        invest.property_value * inputs.selling_agent_rate + inputs.marketing_cost
    } else {
        0.0
    };
    let equity = floor_zero(invest.property_value - selling_costs - invest.loan.balance);
    let invest_ppor_equity = floor_zero(*ppor_value - invest.ppor.balance);
    let invest_net_worth =
        floor_zero(equity + invest_ppor_equity + floor_zero(invest.cumulative_cashflow));
    let no_invest_net_worth = floor_zero(*ppor_value - baseline.ppor.balance);

    YearlyProjectionRecord {
        year: ctx.year,
        loan_balance: invest.loan.balance,
        property_value: invest.property_value,
        selling_costs,
        equity,
        rent: outcome.flows.rent,
        expenses: outcome.flows.expenses,
        depreciation: outcome.flows.depreciation,
        interest_paid: outcome.loan.interest_paid,
        principal_paid: outcome.loan.principal_paid,
        taxable_result: outcome.taxable_result,
        tax_savings: outcome.tax_savings,
        after_tax_cashflow: outcome.after_tax_cashflow,
        cumulative_after_tax_cashflow: invest.cumulative_cashflow,
        baseline_extra_payment: baseline_extra_monthly * MONTHS_PER_YEAR,
        invest_ppor_balance: invest.ppor.balance,
        invest_ppor_value: *ppor_value,
        no_invest_ppor_balance: baseline.ppor.balance,
        no_invest_ppor_value: *ppor_value,
        invest_net_worth,
        no_invest_net_worth,
    }
}

fn advance_investment(
    invest: &mut InvestPath,
    ctx: YearContext,
    letting: &LettingFlows,
    household: &Household,
    medicare_levy_rate: f64,
) -> InvestYearOutcome {
    let (loan, flows) = if ctx.active {
        (invest.loan.advance_year(0.0), *letting)
    } else {
        (invest.loan.hold_year(), LettingFlows::dormant())
    };

    let taxable_result = flows.rent - flows.expenses - loan.interest_paid - flows.depreciation;
    let tax_savings = household.tax_savings(taxable_result, medicare_levy_rate);
    let after_tax_cashflow =
        flows.rent - flows.expenses - loan.interest_paid - loan.principal_paid + tax_savings;
    invest.cumulative_cashflow += after_tax_cashflow;

    InvestYearOutcome {
        loan,
        flows,
        taxable_result,
        tax_savings,
        after_tax_cashflow,
        out_of_pocket_before_tax: flows.expenses + loan.interest_paid + loan.principal_paid
            - flows.rent,
    }
}

fn opening_record(
    inputs: &Inputs,
    invest: &InvestPath,
    baseline: &BaselinePath,
    ppor_value: f64,
) -> YearlyProjectionRecord {
    let purchase_costs = invest.property_value * inputs.purchase_agent_rate;
    let equity = floor_zero(invest.property_value - invest.loan.balance - purchase_costs);
    let invest_net_worth = floor_zero(equity + floor_zero(ppor_value - invest.ppor.balance));
    let no_invest_net_worth = floor_zero(ppor_value - baseline.ppor.balance);

    YearlyProjectionRecord {
        year: 0,
        loan_balance: invest.loan.balance,
        property_value: invest.property_value,
        selling_costs: 0.0,
        equity,
        rent: 0.0,
        expenses: 0.0,
        depreciation: 0.0,
        interest_paid: 0.0,
        principal_paid: 0.0,
        taxable_result: 0.0,
        tax_savings: 0.0,
        after_tax_cashflow: 0.0,
        cumulative_after_tax_cashflow: 0.0,
        baseline_extra_payment: 0.0,
        invest_ppor_balance: invest.ppor.balance,
        invest_ppor_value: ppor_value,
        no_invest_ppor_balance: baseline.ppor.balance,
        no_invest_ppor_value: ppor_value,
        invest_net_worth,
        no_invest_net_worth,
    }
}

fn summarize(years: Vec<YearlyProjectionRecord>) -> ProjectionResult {
    let (final_invest_net_worth, final_no_invest_net_worth) = years
        .last()
        .map(|last| (last.invest_net_worth, last.no_invest_net_worth))
        .unwrap_or((0.0, 0.0));
    let crossover_year = years
        .iter()
        .skip(1)
        .find(|record| record.invest_net_worth >= record.no_invest_net_worth)
        .map(|record| record.year);

    ProjectionResult {
        final_invest_net_worth,
        final_no_invest_net_worth,
        net_worth_difference: final_invest_net_worth - final_no_invest_net_worth,
        crossover_year,
        years,
    }
}

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::{ConfigError, RateTables, TaxBracketRow, load_rate_tables};
use crate::core::{CalculationResult, Inputs, LmiTier, LoanType, MAX_HORIZON_YEARS, calculate};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum CliLoanType {
    PrincipalAndInterest,
    InterestOnly,
}

impl From<CliLoanType> for LoanType {
    fn from(value: CliLoanType) -> Self {
        match value {
            CliLoanType::PrincipalAndInterest => LoanType::PrincipalAndInterest,
            CliLoanType::InterestOnly => LoanType::InterestOnly,
        }
    }
}

/// Numeric form field. Numbers pass through; strings are parsed, and
/// anything empty, non-numeric or non-finite reads as zero.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct LenientF64(f64);

impl LenientF64 {
    fn from_text(raw: &str) -> Self {
        match raw.trim().replace(',', "").parse::<f64>() {
            Ok(parsed) => Self::from_number(parsed),
            Err(_) => {
                if !raw.trim().is_empty() {
                    debug!(raw, "non-numeric input treated as zero");
                }
                Self(0.0)
            }
        }
    }

    fn from_number(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            debug!(value, "non-finite numeric input treated as zero");
            Self(0.0)
        }
    }

    fn years(self) -> u32 {
        if self.0 > 0.0 {
            self.0.round().min(MAX_HORIZON_YEARS as f64) as u32
        } else {
            0
        }
    }
}

impl<'de> Deserialize<'de> for LenientF64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LenientVisitor;

        impl de::Visitor<'_> for LenientVisitor {
            type Value = LenientF64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric string")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(LenientF64::from_number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientF64(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LenientF64(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(LenientF64::from_text(v))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(LenientF64(0.0))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LenientF64(0.0))
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiLoanType {
    #[serde(
        alias = "pi",
        alias = "p&i",
        alias = "principalAndInterest",
        alias = "principal_and_interest"
    )]
    PrincipalAndInterest,
    #[serde(alias = "io", alias = "interestOnly", alias = "interest_only")]
    InterestOnly,
}

impl From<ApiLoanType> for CliLoanType {
    fn from(value: ApiLoanType) -> Self {
        match value {
            ApiLoanType::PrincipalAndInterest => CliLoanType::PrincipalAndInterest,
            ApiLoanType::InterestOnly => CliLoanType::InterestOnly,
        }
    }
}

/// Edited table rows arrive with the same leniency as scalar fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxBracketPayloadRow {
    threshold: LenientF64,
    rate_pct: LenientF64,
}

impl From<TaxBracketPayloadRow> for TaxBracketRow {
    fn from(row: TaxBracketPayloadRow) -> Self {
        TaxBracketRow {
            threshold: row.threshold.0,
            rate_pct: row.rate_pct.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LmiTierPayloadRow {
    min_lvr_pct: LenientF64,
    max_lvr_pct: LenientF64,
    rate_pct: LenientF64,
}

impl From<LmiTierPayloadRow> for LmiTier {
    fn from(row: LmiTierPayloadRow) -> Self {
        LmiTier {
            min_lvr_pct: row.min_lvr_pct.0,
            max_lvr_pct: row.max_lvr_pct.0,
            rate_pct: row.rate_pct.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    self_salary: Option<LenientF64>,
    spouse_salary: Option<LenientF64>,
    ownership_pct: Option<LenientF64>,

    price: Option<LenientF64>,
    deposit: Option<LenientF64>,
    weekly_rent: Option<LenientF64>,
    interest_rate: Option<LenientF64>,
    loan_term: Option<LenientF64>,
    loan_type: Option<ApiLoanType>,

    council_rates: Option<LenientF64>,
    water_rates: Option<LenientF64>,
    insurance: Option<LenientF64>,
    management_fee_pct: Option<LenientF64>,
    maintenance_pct: Option<LenientF64>,
    depreciation: Option<LenientF64>,

    purchase_agent_pct: Option<LenientF64>,
    selling_agent_pct: Option<LenientF64>,
    marketing_cost: Option<LenientF64>,

    medicare_levy_pct: Option<LenientF64>,
    tax_brackets: Option<Vec<TaxBracketPayloadRow>>,
    lmi_tiers: Option<Vec<LmiTierPayloadRow>>,

    appreciation_pct: Option<LenientF64>,
    horizon_years: Option<LenientF64>,
    invest_delay_years: Option<LenientF64>,

    ppor_value: Option<LenientF64>,
    ppor_balance: Option<LenientF64>,
    ppor_rate: Option<LenientF64>,
    ppor_term: Option<LenientF64>,
    ppor_appreciation_pct: Option<LenientF64>,
    extra_monthly_payment: Option<LenientF64>,
}

#[derive(Parser, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[command(
    name = "gearing",
    about = "Negative gearing calculator: invest in property vs pay down the home loan"
)]
pub struct Cli {
    #[arg(long, default_value_t = 120_000.0, help = "Your annual salary")]
    self_salary: f64,
    #[arg(long, default_value_t = 0.0, help = "Spouse annual salary")]
    spouse_salary: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Your ownership share of the property in percent; spouse owns the rest"
    )]
    self_ownership_pct: f64,

    #[arg(long, default_value_t = 800_000.0)]
    purchase_price: f64,
    #[arg(long, default_value_t = 160_000.0)]
    deposit: f64,
    #[arg(long, default_value_t = 600.0)]
    weekly_rent: f64,
    #[arg(long, default_value_t = 6.0, help = "Investment loan rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    loan_term_years: u32,
    #[arg(long, value_enum, default_value_t = CliLoanType::PrincipalAndInterest)]
    loan_type: CliLoanType,

    #[arg(long, default_value_t = 2_000.0, help = "Annual council rates")]
    council_rates: f64,
    #[arg(long, default_value_t = 1_000.0, help = "Annual water rates")]
    water_rates: f64,
    #[arg(long, default_value_t = 1_500.0, help = "Annual landlord insurance")]
    insurance: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Property management fee in percent of annual rent"
    )]
    management_fee_pct: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Maintenance allowance in percent of annual rent"
    )]
    maintenance_pct: f64,
    #[arg(long, default_value_t = 5_000.0, help = "Annual depreciation claim")]
    depreciation: f64,

    #[arg(
        long,
        default_value_t = 0.0,
        help = "Buyer's agent fee in percent of purchase price"
    )]
    purchase_agent_pct: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Selling agent commission in percent of sale price"
    )]
    selling_agent_pct: f64,
    #[arg(long, default_value_t = 3_000.0, help = "Marketing cost on sale")]
    marketing_cost: f64,

    #[arg(long, default_value_t = 2.0, help = "Medicare levy in percent")]
    medicare_levy_pct: f64,

    #[arg(
        long,
        default_value_t = 5.0,
        help = "Annual capital growth of the investment property in percent"
    )]
    appreciation_pct: f64,
    #[arg(long, default_value_t = 10, help = "Projection horizon in years")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 0,
        help = "Years before the investment purchase takes effect"
    )]
    invest_delay_years: u32,

    #[arg(long, default_value_t = 900_000.0, help = "Current home value")]
    ppor_value: f64,
    #[arg(long, default_value_t = 400_000.0, help = "Current home loan balance")]
    ppor_balance: f64,
    #[arg(long, default_value_t = 6.0, help = "Home loan rate in percent")]
    ppor_rate: f64,
    #[arg(long, default_value_t = 25, help = "Remaining home loan term in years")]
    ppor_term_years: u32,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Annual capital growth of the home in percent"
    )]
    ppor_appreciation_pct: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Constant extra monthly repayment on the home loan"
    )]
    extra_monthly_payment: f64,

    #[arg(long, help = "JSON file with taxBrackets and lmiTiers tables")]
    #[serde(skip)]
    config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode result: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    inputs: Cli,
    tables: RateTables,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn finite_or_zero(name: &str, value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        debug!(field = name, "non-finite input treated as zero");
        0.0
    }
}

fn money(name: &str, value: f64) -> f64 {
    finite_or_zero(name, value).max(0.0)
}

fn pct_to_rate(name: &str, pct: f64, min: f64, max: f64) -> f64 {
    finite_or_zero(name, pct).clamp(min, max) / 100.0
}

/// Converts percent fields to fractions and clamps everything into a range
/// the engine can always evaluate. Never fails.
fn build_inputs(cli: Cli, tables: &RateTables) -> Inputs {
    Inputs {
        self_salary: money("self_salary", cli.self_salary),
        spouse_salary: money("spouse_salary", cli.spouse_salary),
        self_ownership_share: pct_to_rate("self_ownership_pct", cli.self_ownership_pct, 0.0, 100.0),
        purchase_price: money("purchase_price", cli.purchase_price),
        deposit: money("deposit", cli.deposit),
        weekly_rent: money("weekly_rent", cli.weekly_rent),
        interest_rate_pct: finite_or_zero("interest_rate", cli.interest_rate).max(0.0),
        loan_term_years: cli.loan_term_years,
        loan_type: cli.loan_type.into(),
        council_rates: money("council_rates", cli.council_rates),
        water_rates: money("water_rates", cli.water_rates),
        insurance: money("insurance", cli.insurance),
        management_fee_rate: pct_to_rate("management_fee_pct", cli.management_fee_pct, 0.0, 100.0),
        maintenance_rate: pct_to_rate("maintenance_pct", cli.maintenance_pct, 0.0, 100.0),
        depreciation: money("depreciation", cli.depreciation),
        purchase_agent_rate: pct_to_rate("purchase_agent_pct", cli.purchase_agent_pct, 0.0, 100.0),
        selling_agent_rate: pct_to_rate("selling_agent_pct", cli.selling_agent_pct, 0.0, 100.0),
        marketing_cost: money("marketing_cost", cli.marketing_cost),
        medicare_levy_rate: pct_to_rate("medicare_levy_pct", cli.medicare_levy_pct, 0.0, 100.0),
        tax_brackets: tables.brackets(),
        lmi_tiers: tables.tiers(),
        appreciation_rate: pct_to_rate("appreciation_pct", cli.appreciation_pct, -100.0, 1_000.0),
        horizon_years: cli.horizon_years.clamp(1, MAX_HORIZON_YEARS),
        invest_delay_years: cli.invest_delay_years.min(MAX_HORIZON_YEARS),
        ppor_value: money("ppor_value", cli.ppor_value),
        ppor_balance: money("ppor_balance", cli.ppor_balance),
        ppor_rate_pct: finite_or_zero("ppor_rate", cli.ppor_rate).max(0.0),
        ppor_term_years: cli.ppor_term_years,
        ppor_appreciation_rate: pct_to_rate(
            "ppor_appreciation_pct",
            cli.ppor_appreciation_pct,
            -100.0,
            1_000.0,
        ),
        extra_monthly_payment: money("extra_monthly_payment", cli.extra_monthly_payment),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "gearing HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/defaults");

    axum::serve(listener, app).await
}

/// `gearing project [flags]`: one recompute printed as JSON.
pub fn run_cli<I, T>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let tables = match &cli.config {
        Some(path) => load_rate_tables(path)?,
        None => RateTables::default(),
    };
    let inputs = build_inputs(cli, &tables);
    let result = calculate(&inputs);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(
        StatusCode::OK,
        DefaultsResponse {
            inputs: default_cli_for_api(),
            tables: RateTables::default(),
        },
    )
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let inputs = inputs_from_payload(payload);
    debug!(
        price = inputs.purchase_price,
        horizon = inputs.horizon_years,
        delay = inputs.invest_delay_years,
        "recomputing projection"
    );
    let result: CalculationResult = calculate(&inputs);
    json_response(StatusCode::OK, result)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<Inputs, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(inputs_from_payload(payload))
}

fn inputs_from_payload(payload: CalculatePayload) -> Inputs {
    let mut cli = default_cli_for_api();
    let mut tables = RateTables::default();

    if let Some(v) = payload.self_salary {
        cli.self_salary = v.0;
    }
    if let Some(v) = payload.spouse_salary {
        cli.spouse_salary = v.0;
    }
    if let Some(v) = payload.ownership_pct {
        cli.self_ownership_pct = v.0;
    }

    if let Some(v) = payload.price {
        cli.purchase_price = v.0;
    }
    if let Some(v) = payload.deposit {
        cli.deposit = v.0;
    }
    if let Some(v) = payload.weekly_rent {
        cli.weekly_rent = v.0;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v.0;
    }
    if let Some(v) = payload.loan_term {
        cli.loan_term_years = v.years();
    }
    if let Some(v) = payload.loan_type {
        cli.loan_type = v.into();
    }

    if let Some(v) = payload.council_rates {
        cli.council_rates = v.0;
    }
    if let Some(v) = payload.water_rates {
        cli.water_rates = v.0;
    }
    if let Some(v) = payload.insurance {
        cli.insurance = v.0;
    }
    if let Some(v) = payload.management_fee_pct {
        cli.management_fee_pct = v.0;
    }
    if let Some(v) = payload.maintenance_pct {
        cli.maintenance_pct = v.0;
    }
    if let Some(v) = payload.depreciation {
        cli.depreciation = v.0;
    }

    if let Some(v) = payload.purchase_agent_pct {
        cli.purchase_agent_pct = v.0;
    }
    if let Some(v) = payload.selling_agent_pct {
        cli.selling_agent_pct = v.0;
    }
    if let Some(v) = payload.marketing_cost {
        cli.marketing_cost = v.0;
    }

    if let Some(v) = payload.medicare_levy_pct {
        cli.medicare_levy_pct = v.0;
    }
    if let Some(rows) = payload.tax_brackets {
        tables.tax_brackets = rows.into_iter().map(TaxBracketRow::from).collect();
    }
    if let Some(tiers) = payload.lmi_tiers {
        tables.lmi_tiers = tiers.into_iter().map(LmiTier::from).collect();
    }

    if let Some(v) = payload.appreciation_pct {
        cli.appreciation_pct = v.0;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v.years();
    }
    if let Some(v) = payload.invest_delay_years {
        cli.invest_delay_years = v.years();
    }

    if let Some(v) = payload.ppor_value {
        cli.ppor_value = v.0;
    }
    if let Some(v) = payload.ppor_balance {
        cli.ppor_balance = v.0;
    }
    if let Some(v) = payload.ppor_rate {
        cli.ppor_rate = v.0;
    }
    if let Some(v) = payload.ppor_term {
        cli.ppor_term_years = v.years();
    }
    if let Some(v) = payload.ppor_appreciation_pct {
        cli.ppor_appreciation_pct = v.0;
    }
    if let Some(v) = payload.extra_monthly_payment {
        cli.extra_monthly_payment = v.0;
    }

    build_inputs(cli, &tables)
}

fn default_cli_for_api() -> Cli {
    Cli {
        self_salary: 120_000.0,
        spouse_salary: 0.0,
        self_ownership_pct: 100.0,
        purchase_price: 800_000.0,
        deposit: 160_000.0,
        weekly_rent: 600.0,
        interest_rate: 6.0,
        loan_term_years: 30,
        loan_type: CliLoanType::PrincipalAndInterest,
        council_rates: 2_000.0,
        water_rates: 1_000.0,
        insurance: 1_500.0,
        management_fee_pct: 7.0,
        maintenance_pct: 5.0,
        depreciation: 5_000.0,
        purchase_agent_pct: 0.0,
        selling_agent_pct: 2.0,
        marketing_cost: 3_000.0,
        medicare_levy_pct: 2.0,
        appreciation_pct: 5.0,
        horizon_years: 10,
        invest_delay_years: 0,
        ppor_value: 900_000.0,
        ppor_balance: 400_000.0,
        ppor_rate: 6.0,
        ppor_term_years: 25,
        ppor_appreciation_pct: 4.0,
        extra_monthly_payment: 0.0,
        config: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn clap_defaults_match_api_defaults() {
        let parsed = Cli::try_parse_from(["gearing"]).expect("defaults parse");
        let defaults = sample_cli();
        assert_eq!(
            serde_json::to_value(&parsed).expect("serialize"),
            serde_json::to_value(&defaults).expect("serialize")
        );
    }

    #[test]
    fn build_inputs_converts_percent_fields() {
        let inputs = build_inputs(sample_cli(), &RateTables::default());
        assert_approx(inputs.self_ownership_share, 1.0);
        assert_approx(inputs.management_fee_rate, 0.07);
        assert_approx(inputs.selling_agent_rate, 0.02);
        assert_approx(inputs.medicare_levy_rate, 0.02);
        assert_approx(inputs.appreciation_rate, 0.05);
        assert_approx(inputs.interest_rate_pct, 6.0);
        assert_eq!(inputs.tax_brackets.len(), 5);
        assert_eq!(inputs.lmi_tiers.len(), 3);
    }

    #[test]
    fn build_inputs_tolerates_out_of_range_values() {
        let mut cli = sample_cli();
        cli.self_ownership_pct = 140.0;
        cli.deposit = -10.0;
        cli.weekly_rent = f64::NAN;
        cli.appreciation_pct = -250.0;
        cli.horizon_years = 0;

        let inputs = build_inputs(cli, &RateTables::default());
        assert_approx(inputs.self_ownership_share, 1.0);
        assert_approx(inputs.deposit, 0.0);
        assert_approx(inputs.weekly_rent, 0.0);
        assert_approx(inputs.appreciation_rate, -1.0);
        assert_eq!(inputs.horizon_years, 1);
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "selfSalary": 150000,
          "spouseSalary": 60000,
          "ownershipPct": 40,
          "price": 650000,
          "deposit": 65000,
          "weeklyRent": 520,
          "interestRate": 6.2,
          "loanTerm": 25,
          "loanType": "interest-only",
          "managementFeePct": 8,
          "medicareLevyPct": 2,
          "appreciationPct": 4,
          "horizonYears": 15,
          "investDelayYears": 2,
          "pporBalance": 300000,
          "extraMonthlyPayment": 500
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.self_salary, 150_000.0);
        assert_approx(inputs.spouse_salary, 60_000.0);
        assert_approx(inputs.self_ownership_share, 0.4);
        assert_approx(inputs.purchase_price, 650_000.0);
        assert_approx(inputs.deposit, 65_000.0);
        assert_approx(inputs.weekly_rent, 520.0);
        assert_approx(inputs.interest_rate_pct, 6.2);
        assert_eq!(inputs.loan_term_years, 25);
        assert_eq!(inputs.loan_type, LoanType::InterestOnly);
        assert_approx(inputs.management_fee_rate, 0.08);
        assert_approx(inputs.appreciation_rate, 0.04);
        assert_eq!(inputs.horizon_years, 15);
        assert_eq!(inputs.invest_delay_years, 2);
        assert_approx(inputs.ppor_balance, 300_000.0);
        assert_approx(inputs.extra_monthly_payment, 500.0);
    }

    #[test]
    fn malformed_numbers_are_treated_as_zero() {
        let json = r#"{
          "price": "",
          "weeklyRent": "abc",
          "deposit": "120,000",
          "insurance": null,
          "horizonYears": "7"
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");
        assert_approx(inputs.purchase_price, 0.0);
        assert_approx(inputs.weekly_rent, 0.0);
        assert_approx(inputs.deposit, 120_000.0);
        assert_approx(inputs.insurance, 1_500.0);
        assert_eq!(inputs.horizon_years, 7);

        let result = calculate(&inputs);
        assert!(result.snapshot.rental_yield_pct.is_none());
        assert_eq!(result.projection.years.len(), 8);
    }

    #[test]
    fn query_string_payload_is_lenient() {
        let uri: Uri = "http://localhost/api/calculate?price=500000&weeklyRent=oops&loanType=io"
            .parse()
            .expect("valid uri");
        let Query(payload) =
            Query::<CalculatePayload>::try_from_uri(&uri).expect("query should parse");
        let inputs = inputs_from_payload(payload);
        assert_approx(inputs.purchase_price, 500_000.0);
        assert_approx(inputs.weekly_rent, 0.0);
        assert_eq!(inputs.loan_type, LoanType::InterestOnly);
    }

    #[test]
    fn payload_tables_replace_defaults() {
        let json = r#"{
          "taxBrackets": [
            { "threshold": 50000, "ratePct": 30 },
            { "threshold": 0, "ratePct": 0 }
          ],
          "lmiTiers": [ { "minLvrPct": 80, "maxLvrPct": 100, "ratePct": 3 } ]
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");
        assert_eq!(inputs.tax_brackets.len(), 2);
        assert_approx(inputs.tax_brackets[0].threshold, 0.0);
        assert_approx(inputs.tax_brackets[1].rate, 0.30);
        assert_eq!(inputs.lmi_tiers.len(), 1);
    }

    #[test]
    fn table_cells_are_lenient() {
        let json = r#"{
          "taxBrackets": [
            { "threshold": "", "ratePct": 19 },
            { "threshold": "45,000", "ratePct": "abc" }
          ],
          "lmiTiers": [ { "minLvrPct": "80", "maxLvrPct": "", "ratePct": "abc" } ]
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");
        assert_eq!(inputs.tax_brackets.len(), 2);
        assert_approx(inputs.tax_brackets[0].threshold, 0.0);
        assert_approx(inputs.tax_brackets[0].rate, 0.19);
        assert_approx(inputs.tax_brackets[1].threshold, 45_000.0);
        assert_approx(inputs.tax_brackets[1].rate, 0.0);
        assert_eq!(inputs.lmi_tiers.len(), 1);
        assert_approx(inputs.lmi_tiers[0].min_lvr_pct, 80.0);
        assert_approx(inputs.lmi_tiers[0].max_lvr_pct, 0.0);
        assert_approx(inputs.lmi_tiers[0].rate_pct, 0.0);
    }

    #[test]
    fn year_fields_are_capped() {
        let inputs = inputs_from_json(r#"{"horizonYears": 1e12, "investDelayYears": "5000"}"#)
            .expect("json should parse");
        assert_eq!(inputs.horizon_years, MAX_HORIZON_YEARS);
        assert_eq!(inputs.invest_delay_years, MAX_HORIZON_YEARS);

        let mut cli = sample_cli();
        cli.horizon_years = u32::MAX;
        cli.invest_delay_years = u32::MAX;
        let inputs = build_inputs(cli, &RateTables::default());
        assert_eq!(inputs.horizon_years, MAX_HORIZON_YEARS);
        assert_eq!(inputs.invest_delay_years, MAX_HORIZON_YEARS);
        assert_eq!(
            calculate(&inputs).projection.years.len(),
            MAX_HORIZON_YEARS as usize + 1
        );
    }

    #[test]
    fn calculation_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(sample_cli(), &RateTables::default());
        let result = calculate(&inputs);
        let json = serde_json::to_string(&result).expect("response should serialize");
        assert!(json.contains("\"snapshot\""));
        assert!(json.contains("\"projection\""));
        assert!(json.contains("\"annualTaxSavings\""));
        assert!(json.contains("\"lvrPct\""));
        assert!(json.contains("\"investNetWorth\""));
        assert!(json.contains("\"noInvestNetWorth\""));
        assert!(json.contains("\"netWorthDifference\""));
    }

    #[test]
    fn defaults_response_lists_tables_and_inputs() {
        let response = DefaultsResponse {
            inputs: default_cli_for_api(),
            tables: RateTables::default(),
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains("\"taxBrackets\""));
        assert!(json.contains("\"lmiTiers\""));
        assert!(json.contains("\"purchasePrice\":800000.0"));
        assert!(!json.contains("\"config\""));
    }

    #[test]
    fn run_cli_rejects_unknown_flags() {
        let err = run_cli(["gearing", "--no-such-flag"]).expect_err("must reject flag");
        assert!(matches!(err, CliError::Args(_)));
    }

    #[test]
    fn run_cli_reports_missing_table_file() {
        let err = run_cli(["gearing", "--config", "/definitely/not/here.json"])
            .expect_err("must fail on missing file");
        assert!(matches!(err, CliError::Config(_)));
    }
}

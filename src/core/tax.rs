use super::types::{PersonTaxProfile, TaxBracket};

/// Progressive tax on `taxable_income` integrated across an ascending
/// bracket schedule. Levies are not included; callers add them.
pub fn annual_tax(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    if taxable_income.is_nan() || taxable_income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    brackets
        .iter()
        .enumerate()
        .map(|(idx, bracket)| {
            let upper = brackets
                .get(idx + 1)
                .map(|next| next.threshold)
                .unwrap_or(f64::INFINITY);
            let taxed_slice = (taxable_income.min(upper) - bracket.threshold).max(0.0);
            taxed_slice * bracket.rate
        })
        .sum()
}

pub fn marginal_rate(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    for (idx, bracket) in brackets.iter().enumerate() {
        match brackets.get(idx + 1) {
            None => return bracket.rate,
            Some(next) if taxable_income < next.threshold => return bracket.rate,
            Some(_) => {}
        }
    }
    0.0
}

impl PersonTaxProfile {
    pub fn new(annual_salary: f64, ownership_share: f64, brackets: &[TaxBracket]) -> Self {
        Self {
            annual_salary,
            ownership_share,
            marginal_rate: marginal_rate(annual_salary, brackets),
        }
    }

    /// Negative-gearing refund on this person's share of a rental result.
    /// Only losses produce savings; a taxable gain contributes nothing.
    pub fn tax_savings(&self, taxable_result: f64, medicare_levy_rate: f64) -> f64 {
        let share = taxable_result * self.ownership_share;
        -share.min(0.0) * (self.marginal_rate + medicare_levy_rate)
    }

    pub fn effective_rate(&self, medicare_levy_rate: f64) -> f64 {
        self.ownership_share * (self.marginal_rate + medicare_levy_rate)
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{LmiTier, TaxBracket};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rate tables from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rate tables in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tax bracket as entered by a user: lower threshold and a percent rate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracketRow {
    pub threshold: f64,
    pub rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateTables {
    pub tax_brackets: Vec<TaxBracketRow>,
    pub lmi_tiers: Vec<LmiTier>,
}

impl Default for RateTables {
    fn default() -> Self {
        Self {
            tax_brackets: default_tax_bracket_rows(),
            lmi_tiers: default_lmi_tiers(),
        }
    }
}

impl RateTables {
    pub fn brackets(&self) -> Vec<TaxBracket> {
        tax_brackets_from_rows(&self.tax_brackets)
    }

    pub fn tiers(&self) -> Vec<LmiTier> {
        sanitize_lmi_tiers(&self.lmi_tiers)
    }
}

/// Resident schedule: 0 / 19 / 32.5 / 37 / 45 percent.
pub fn default_tax_bracket_rows() -> Vec<TaxBracketRow> {
    [
        (0.0, 0.0),
        (18_200.0, 19.0),
        (45_000.0, 32.5),
        (120_000.0, 37.0),
        (180_000.0, 45.0),
    ]
    .into_iter()
    .map(|(threshold, rate_pct)| TaxBracketRow {
        threshold,
        rate_pct,
    })
    .collect()
}

pub fn default_tax_brackets() -> Vec<TaxBracket> {
    tax_brackets_from_rows(&default_tax_bracket_rows())
}

pub fn default_lmi_tiers() -> Vec<LmiTier> {
    [(80.0, 85.0, 0.9), (85.0, 90.0, 1.6), (90.0, 95.0, 2.8)]
        .into_iter()
        .map(|(min_lvr_pct, max_lvr_pct, rate_pct)| LmiTier {
            min_lvr_pct,
            max_lvr_pct,
            rate_pct,
        })
        .collect()
}

/// Drops non-finite rows and orders the rest by threshold. Rates become
/// fractions. Duplicate thresholds keep their entered order.
pub fn tax_brackets_from_rows(rows: &[TaxBracketRow]) -> Vec<TaxBracket> {
    let mut brackets: Vec<TaxBracket> = rows
        .iter()
        .filter(|row| row.threshold.is_finite() && row.rate_pct.is_finite())
        .map(|row| TaxBracket {
            threshold: row.threshold,
            rate: row.rate_pct / 100.0,
        })
        .collect();
    if brackets.len() != rows.len() {
        debug!(
            dropped = rows.len() - brackets.len(),
            "ignored non-finite tax bracket rows"
        );
    }
    brackets.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
    brackets
}

/// Tier order is preserved: lookup is first-match-wins with a last-tier
/// fallback, so reordering would change results for overlapping tables.
pub fn sanitize_lmi_tiers(tiers: &[LmiTier]) -> Vec<LmiTier> {
    tiers
        .iter()
        .filter(|tier| {
            tier.min_lvr_pct.is_finite() && tier.max_lvr_pct.is_finite() && tier.rate_pct.is_finite()
        })
        .copied()
        .collect()
}

pub fn load_rate_tables(path: &Path) -> Result<RateTables, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tables = parse_rate_tables(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        brackets = tables.tax_brackets.len(),
        tiers = tables.lmi_tiers.len(),
        "loaded rate tables"
    );
    Ok(tables)
}

pub fn parse_rate_tables(raw: &str) -> Result<RateTables, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_brackets_are_ascending_fractions() {
        let brackets = default_tax_brackets();
        assert_eq!(brackets.len(), 5);
        assert_eq!(brackets[0].threshold, 0.0);
        assert!((brackets[3].rate - 0.37).abs() < 1e-12);
        assert!(brackets.windows(2).all(|w| w[0].threshold < w[1].threshold));
    }

    #[test]
    fn default_tiers_are_contiguous() {
        let tiers = default_lmi_tiers();
        assert_eq!(tiers[0].min_lvr_pct, 80.0);
        assert!(tiers.windows(2).all(|w| w[0].max_lvr_pct == w[1].min_lvr_pct));
    }

    #[test]
    fn rows_are_sorted_and_converted() {
        let rows = vec![
            TaxBracketRow {
                threshold: 50_000.0,
                rate_pct: 30.0,
            },
            TaxBracketRow {
                threshold: 0.0,
                rate_pct: 0.0,
            },
            TaxBracketRow {
                threshold: f64::NAN,
                rate_pct: 10.0,
            },
        ];
        let brackets = tax_brackets_from_rows(&rows);
        assert_eq!(brackets.len(), 2);
        assert_eq!(brackets[0].threshold, 0.0);
        assert!((brackets[1].rate - 0.30).abs() < 1e-12);
    }

    #[test]
    fn parse_rate_tables_fills_missing_tables_with_defaults() {
        let tables = parse_rate_tables(
            r#"{ "lmiTiers": [ { "minLvrPct": 80, "maxLvrPct": 100, "ratePct": 2.0 } ] }"#,
        )
        .expect("valid tables");
        assert_eq!(tables.tax_brackets, default_tax_bracket_rows());
        assert_eq!(tables.lmi_tiers.len(), 1);
        assert_eq!(tables.tiers()[0].rate_pct, 2.0);
    }

    #[test]
    fn load_rate_tables_reports_missing_file() {
        let err = load_rate_tables(Path::new("/definitely/not/here.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn parse_rate_tables_rejects_malformed_json() {
        assert!(parse_rate_tables("{ not json").is_err());
    }
}

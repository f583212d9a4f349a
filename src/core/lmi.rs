use super::types::LmiTier;

/// LVR at or below this percentage never attracts mortgage insurance,
/// whatever the tier table says.
pub const LMI_FREE_LVR_PCT: f64 = 80.0;

/// First tier with `min < lvr <= max`; otherwise the last tier.
pub fn select_tier(lvr_pct: f64, tiers: &[LmiTier]) -> Option<&LmiTier> {
    tiers
        .iter()
        .find(|tier| lvr_pct > tier.min_lvr_pct && lvr_pct <= tier.max_lvr_pct)
        .or_else(|| tiers.last())
}

pub fn estimate_lmi_cost(lvr_pct: f64, loan_amount: f64, tiers: &[LmiTier]) -> f64 {
    if !lvr_pct.is_finite() || lvr_pct <= LMI_FREE_LVR_PCT || loan_amount <= 0.0 {
        return 0.0;
    }
    select_tier(lvr_pct, tiers)
        .map(|tier| loan_amount * tier.rate_pct / 100.0)
        .unwrap_or(0.0)
}

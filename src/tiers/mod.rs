//! Credit card tiers and their regulatory credit-line amounts
//!
//! Card CATs are computed on a standardized credit line per tier, expressed
//! in inflation-indexed units (UDIs) and converted to currency with the
//! table's `udi_value`. The table is injected by the caller so updated
//! regulatory values need no code change.

pub mod loader;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{CatError, Result};
use crate::schedule::{RevolvingParams, DEFAULT_MIN_PAYMENT_FRACTION};

/// Default UDI to currency conversion value
pub const DEFAULT_UDI_VALUE: f64 = 7.5;

/// A card tier and its credit line in UDIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTier {
    pub name: String,
    pub udis: f64,
}

impl CardTier {
    pub fn new(name: impl Into<String>, udis: f64) -> Self {
        Self {
            name: name.into(),
            udis,
        }
    }
}

#[derive(Deserialize)]
struct RawTierTable {
    udi_value: f64,
    tiers: Vec<CardTier>,
}

impl TryFrom<RawTierTable> for TierTable {
    type Error = CatError;

    fn try_from(raw: RawTierTable) -> Result<Self> {
        TierTable::new(raw.udi_value, raw.tiers)
    }
}

/// Mapping from tier name to credit line.
///
/// Lookups are case-insensitive. Unknown tiers resolve to the lowest tier
/// (smallest line) instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTierTable")]
pub struct TierTable {
    udi_value: f64,
    tiers: Vec<CardTier>,
}

impl TierTable {
    /// Build a table, rejecting empty tables and non-positive amounts
    pub fn new(udi_value: f64, tiers: Vec<CardTier>) -> Result<Self> {
        if !(udi_value.is_finite() && udi_value > 0.0) {
            return Err(CatError::TierTable(format!(
                "udi_value must be positive, got {}",
                udi_value
            )));
        }
        if tiers.is_empty() {
            return Err(CatError::TierTable("table has no tiers".into()));
        }
        if let Some(tier) = tiers.iter().find(|t| !(t.udis.is_finite() && t.udis > 0.0)) {
            return Err(CatError::TierTable(format!(
                "tier '{}' has non-positive amount {}",
                tier.name, tier.udis
            )));
        }

        Ok(Self { udi_value, tiers })
    }

    pub fn udi_value(&self) -> f64 {
        self.udi_value
    }

    pub fn tiers(&self) -> &[CardTier] {
        &self.tiers
    }

    /// Same tiers converted at a different UDI value
    pub fn with_udi_value(self, udi_value: f64) -> Result<Self> {
        Self::new(udi_value, self.tiers)
    }

    /// Exact (case-insensitive) lookup
    pub fn get(&self, name: &str) -> Option<&CardTier> {
        let name = name.trim();
        self.tiers.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Tier with the smallest credit line
    pub fn lowest(&self) -> &CardTier {
        // Non-empty by construction
        self.tiers
            .iter()
            .min_by(|a, b| a.udis.total_cmp(&b.udis))
            .unwrap_or(&self.tiers[0])
    }

    /// Lookup that falls back to the lowest tier for unknown names
    pub fn resolve(&self, name: &str) -> &CardTier {
        match self.get(name) {
            Some(tier) => tier,
            None => {
                let fallback = self.lowest();
                warn!(
                    "Unknown card tier '{}', using lowest tier '{}'",
                    name, fallback.name
                );
                fallback
            }
        }
    }

    /// Credit line in currency for a tier name
    pub fn line_amount(&self, name: &str) -> f64 {
        self.resolve(name).udis * self.udi_value
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            udi_value: DEFAULT_UDI_VALUE,
            tiers: vec![
                CardTier::new("classic", 3_000.0),
                CardTier::new("gold", 7_000.0),
                CardTier::new("platinum", 13_000.0),
            ],
        }
    }
}

fn default_tier() -> String {
    "classic".to_string()
}

fn default_card_rate() -> f64 {
    0.36
}

fn default_min_payment_fraction() -> f64 {
    DEFAULT_MIN_PAYMENT_FRACTION
}

/// Parameters of a credit card CAT, resolved through a [`TierTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardParams {
    #[serde(default = "default_tier")]
    pub tier: String,

    /// Annual nominal rate as a decimal
    #[serde(default = "default_card_rate")]
    pub annual_rate: f64,

    #[serde(default)]
    pub annual_fee: f64,

    #[serde(default = "default_min_payment_fraction")]
    pub min_payment_fraction: f64,
}

impl Default for CardParams {
    fn default() -> Self {
        Self {
            tier: default_tier(),
            annual_rate: default_card_rate(),
            annual_fee: 0.0,
            min_payment_fraction: DEFAULT_MIN_PAYMENT_FRACTION,
        }
    }
}

impl CardParams {
    /// Revolving line for this card's tier
    pub fn to_revolving(&self, table: &TierTable) -> RevolvingParams {
        RevolvingParams {
            annual_fee: self.annual_fee,
            min_payment_fraction: self.min_payment_fraction,
            ..RevolvingParams::new(table.line_amount(&self.tier), self.annual_rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_amounts() {
        let table = TierTable::default();
        assert_eq!(table.line_amount("classic"), 22_500.0);
        assert_eq!(table.line_amount("gold"), 52_500.0);
        assert_eq!(table.line_amount("platinum"), 97_500.0);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = TierTable::default();
        assert_eq!(table.resolve("GOLD").name, "gold");
        assert_eq!(table.resolve(" Platinum ").name, "platinum");
    }

    #[test]
    fn test_unknown_tier_falls_back_to_lowest() {
        let table = TierTable::default();
        assert!(table.get("black").is_none());
        assert_eq!(table.resolve("black").name, "classic");
        assert_eq!(table.line_amount(""), 22_500.0);
    }

    #[test]
    fn test_lowest_is_smallest_amount_not_first_row() {
        let table = TierTable::new(
            8.0,
            vec![CardTier::new("premium", 9_000.0), CardTier::new("basic", 2_000.0)],
        )
        .unwrap();
        assert_eq!(table.lowest().name, "basic");
        assert_eq!(table.line_amount("unknown"), 16_000.0);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(matches!(TierTable::new(7.5, Vec::new()), Err(CatError::TierTable(_))));
        assert!(TierTable::new(0.0, vec![CardTier::new("a", 1.0)]).is_err());
        assert!(TierTable::new(7.5, vec![CardTier::new("a", -1.0)]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"udi_value": 8.1, "tiers": [{"name": "classic", "udis": 3000}]}"#;
        let table: TierTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.line_amount("classic"), 3000.0 * 8.1);

        let empty = r#"{"udi_value": 8.1, "tiers": []}"#;
        assert!(serde_json::from_str::<TierTable>(empty).is_err());
    }

    #[test]
    fn test_card_params_to_revolving() {
        let card = CardParams {
            tier: "gold".into(),
            annual_fee: 1200.0,
            min_payment_fraction: 0.08,
            ..CardParams::default()
        };
        let revolving = card.to_revolving(&TierTable::default());
        assert_eq!(revolving.line_amount, 52_500.0);
        assert_eq!(revolving.annual_rate, 0.36);
        assert_eq!(revolving.annual_fee, 1200.0);
        assert_eq!(revolving.min_payment_fraction, 0.08);
        assert_eq!(revolving.other_monthly_charges, 0.0);
    }
}

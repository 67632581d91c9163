//! Core data model: aligned price pairs and spread positions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PairsError, Result};

/// Two time-aligned close series sharing one trading calendar.
///
/// `target` is the dependent leg (priceY), `reference` the regressor (priceX).
/// The constructor enforces the alignment invariant so downstream code can
/// index all three vectors with the same `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    target_symbol: String,
    reference_symbol: String,
    dates: Vec<NaiveDate>,
    target: Vec<f64>,
    reference: Vec<f64>,
}

impl PricePair {
    pub fn new(
        target_symbol: impl Into<String>,
        reference_symbol: impl Into<String>,
        dates: Vec<NaiveDate>,
        target: Vec<f64>,
        reference: Vec<f64>,
    ) -> Result<Self> {
        let target_symbol = target_symbol.into();
        let reference_symbol = reference_symbol.into();

        if dates.is_empty() || target.is_empty() || reference.is_empty() {
            return Err(PairsError::DataUnavailable {
                symbol: format!("{}/{}", target_symbol, reference_symbol),
            });
        }

        if target.len() != dates.len() {
            return Err(PairsError::MisalignedSeries {
                left: "dates",
                left_len: dates.len(),
                right: "target",
                right_len: target.len(),
            });
        }

        if reference.len() != dates.len() {
            return Err(PairsError::MisalignedSeries {
                left: "dates",
                left_len: dates.len(),
                right: "reference",
                right_len: reference.len(),
            });
        }

        for window in dates.windows(2) {
            if window[1] <= window[0] {
                return Err(PairsError::UnorderedDates {
                    previous: window[0],
                    current: window[1],
                });
            }
        }

        for (i, date) in dates.iter().enumerate() {
            if !is_valid_price(target[i]) {
                return Err(PairsError::InvalidPrice {
                    leg: "target",
                    date: *date,
                    value: target[i],
                });
            }
            if !is_valid_price(reference[i]) {
                return Err(PairsError::InvalidPrice {
                    leg: "reference",
                    date: *date,
                    value: reference[i],
                });
            }
        }

        Ok(Self {
            target_symbol,
            reference_symbol,
            dates,
            target,
            reference,
        })
    }

    pub fn target_symbol(&self) -> &str {
        &self.target_symbol
    }

    pub fn reference_symbol(&self) -> &str {
        &self.reference_symbol
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    /// Number of trading days
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed pair; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterate `(date, target, reference)` in chronological order
    pub fn observations(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.dates
            .iter()
            .zip(self.target.iter())
            .zip(self.reference.iter())
            .map(|((date, y), x)| (*date, *y, *x))
    }
}

/// Prices must be finite and strictly positive
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Position in the spread (long target / short reference, or the reverse)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Position {
    Short,
    #[default]
    Flat,
    Long,
}

impl Position {
    pub fn as_i8(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }

    /// Units traded to move from `previous` to `self` (0, 1 or 2)
    pub fn units_traded_from(self, previous: Position) -> u8 {
        (self.as_i8() - previous.as_i8()).unsigned_abs()
    }
}

impl From<Position> for i8 {
    fn from(position: Position) -> Self {
        position.as_i8()
    }
}

impl TryFrom<i8> for Position {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            -1 => Ok(Position::Short),
            0 => Ok(Position::Flat),
            1 => Ok(Position::Long),
            other => Err(format!("position must be -1, 0 or 1, got {}", other)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_price_pair_valid() {
        let pair = PricePair::new(
            "PEP",
            "KO",
            vec![day(2), day(3), day(4)],
            vec![170.0, 171.5, 169.8],
            vec![58.0, 58.4, 57.9],
        )
        .unwrap();

        assert_eq!(pair.len(), 3);
        assert_eq!(pair.target_symbol(), "PEP");
        let obs: Vec<_> = pair.observations().collect();
        assert_eq!(obs[1], (day(3), 171.5, 58.4));
    }

    #[test]
    fn test_price_pair_empty_is_data_unavailable() {
        let result = PricePair::new("PEP", "KO", vec![], vec![], vec![]);
        assert!(matches!(result, Err(PairsError::DataUnavailable { .. })));
    }

    #[test]
    fn test_price_pair_length_mismatch() {
        let result = PricePair::new(
            "PEP",
            "KO",
            vec![day(2), day(3)],
            vec![170.0, 171.0],
            vec![58.0],
        );
        assert!(matches!(
            result,
            Err(PairsError::MisalignedSeries { right: "reference", .. })
        ));
    }

    #[test]
    fn test_price_pair_rejects_unordered_dates() {
        let result = PricePair::new(
            "PEP",
            "KO",
            vec![day(3), day(3)],
            vec![170.0, 171.0],
            vec![58.0, 58.1],
        );
        assert!(matches!(result, Err(PairsError::UnorderedDates { .. })));
    }

    #[test]
    fn test_price_pair_rejects_non_positive_price() {
        let result = PricePair::new(
            "PEP",
            "KO",
            vec![day(2), day(3)],
            vec![170.0, f64::NAN],
            vec![58.0, 58.1],
        );
        assert!(matches!(result, Err(PairsError::InvalidPrice { leg: "target", .. })));

        let result = PricePair::new("PEP", "KO", vec![day(2)], vec![170.0], vec![0.0]);
        assert!(matches!(result, Err(PairsError::InvalidPrice { leg: "reference", .. })));
    }

    #[test]
    fn test_position_units_traded() {
        assert_eq!(Position::Long.units_traded_from(Position::Flat), 1);
        assert_eq!(Position::Long.units_traded_from(Position::Short), 2);
        assert_eq!(Position::Flat.units_traded_from(Position::Flat), 0);
        assert_eq!(Position::Short.as_f64(), -1.0);
    }

    #[test]
    fn test_position_serializes_as_integer() {
        let json = serde_json::to_string(&vec![Position::Short, Position::Flat, Position::Long]).unwrap();
        assert_eq!(json, "[-1,0,1]");

        let back: Vec<Position> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Position::Short, Position::Flat, Position::Long]);
        assert!(serde_json::from_str::<Position>("3").is_err());
    }
}

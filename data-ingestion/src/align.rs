use common::{is_valid_price, PairsError, PricePair};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::connectors::PriceSource;
use crate::error::IngestionError;
use crate::history::{DateRange, PriceHistory};

/// Inner-join two histories on date.
///
/// Rows where either price is missing, non-finite or non-positive are dropped.
pub fn align(target: &PriceHistory, reference: &PriceHistory) -> Result<PricePair, PairsError> {
    for history in [target, reference] {
        if history.is_empty() {
            return Err(PairsError::DataUnavailable {
                symbol: history.symbol.clone(),
            });
        }
    }

    let reference_prices: BTreeMap<_, _> = reference.observations.iter().copied().collect();

    let mut dates = Vec::new();
    let mut target_prices = Vec::new();
    let mut matched_reference = Vec::new();

    for (date, target_price) in &target.observations {
        let Some(reference_price) = reference_prices.get(date) else {
            continue;
        };
        if is_valid_price(*target_price) && is_valid_price(*reference_price) {
            dates.push(*date);
            target_prices.push(*target_price);
            matched_reference.push(*reference_price);
        }
    }

    if dates.is_empty() {
        return Err(PairsError::DataUnavailable {
            symbol: format!("{}/{}", target.symbol, reference.symbol),
        });
    }

    debug!(
        target_symbol = %target.symbol,
        reference_symbol = %reference.symbol,
        kept = dates.len(),
        dropped_target = target.len().saturating_sub(dates.len()),
        dropped_reference = reference.len().saturating_sub(dates.len()),
        "Aligned price histories"
    );

    PricePair::new(
        target.symbol.clone(),
        reference.symbol.clone(),
        dates,
        target_prices,
        matched_reference,
    )
}

/// Fetch both legs concurrently and align them
pub async fn fetch_pair<S>(
    source: &S,
    target: &str,
    reference: &str,
    range: DateRange,
) -> Result<PricePair, IngestionError>
where
    S: PriceSource + ?Sized,
{
    let (target_history, reference_history) =
        tokio::try_join!(source.fetch(target, range), source.fetch(reference, range))?;

    let pair = align(&target_history, &reference_history)?;

    info!(
        target_symbol = pair.target_symbol(),
        reference_symbol = pair.reference_symbol(),
        days = pair.len(),
        start = %range.start,
        end = %range.end,
        "Fetched price pair"
    );

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::InMemoryPriceSource;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 8, d).unwrap()
    }

    #[test]
    fn test_inner_join_on_dates() {
        let target = PriceHistory::new("PEP", vec![(day(1), 170.0), (day(2), 171.0), (day(4), 172.0)]);
        let reference = PriceHistory::new("KO", vec![(day(2), 61.0), (day(3), 61.5), (day(4), 62.0)]);

        let pair = align(&target, &reference).unwrap();
        assert_eq!(pair.dates(), &[day(2), day(4)]);
        assert_eq!(pair.target(), &[171.0, 172.0]);
        assert_eq!(pair.reference(), &[61.0, 62.0]);
    }

    #[test]
    fn test_drops_invalid_prices() {
        let target = PriceHistory::new(
            "PEP",
            vec![(day(1), f64::NAN), (day(2), 171.0), (day(3), 0.0), (day(4), 172.0)],
        );
        let reference = PriceHistory::new(
            "KO",
            vec![(day(1), 61.0), (day(2), 61.2), (day(3), 61.5), (day(4), -1.0)],
        );

        let pair = align(&target, &reference).unwrap();
        assert_eq!(pair.dates(), &[day(2)]);
    }

    #[test]
    fn test_empty_leg_names_symbol() {
        let target = PriceHistory::new("PEP", vec![(day(1), 170.0)]);
        let reference = PriceHistory::empty("KO");

        match align(&target, &reference) {
            Err(PairsError::DataUnavailable { symbol }) => assert_eq!(symbol, "KO"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_dates_name_both_symbols() {
        let target = PriceHistory::new("PEP", vec![(day(1), 170.0)]);
        let reference = PriceHistory::new("KO", vec![(day(2), 61.0)]);

        match align(&target, &reference) {
            Err(PairsError::DataUnavailable { symbol }) => assert_eq!(symbol, "PEP/KO"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unnormalized_history_is_rejected_without_panicking() {
        // Built directly, so the repeated date is never deduplicated
        let target = PriceHistory {
            symbol: "PEP".to_string(),
            observations: vec![(day(1), 170.0), (day(1), 170.5)],
        };
        let reference = PriceHistory::new("KO", vec![(day(1), 61.0)]);

        assert!(matches!(
            align(&target, &reference),
            Err(PairsError::UnorderedDates { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_pair_from_memory() {
        let source = InMemoryPriceSource::new()
            .with_history(PriceHistory::new("PEP", (1..=20).map(|d| (day(d), 150.0 + d as f64)).collect()))
            .with_history(PriceHistory::new("KO", (1..=20).map(|d| (day(d), 55.0 + 0.3 * d as f64)).collect()));

        let range = DateRange::new(day(5), day(15)).unwrap();
        let pair = fetch_pair(&source, "pep", "ko", range).await.unwrap();

        assert_eq!(pair.target_symbol(), "PEP");
        assert_eq!(pair.reference_symbol(), "KO");
        assert_eq!(pair.len(), 10);
        assert_eq!(pair.dates()[0], day(5));
    }

    #[tokio::test]
    async fn test_fetch_pair_unknown_symbol() {
        let source = InMemoryPriceSource::new()
            .with_history(PriceHistory::new("PEP", vec![(day(1), 150.0)]));
        let range = DateRange::new(day(1), day(30)).unwrap();

        let err = fetch_pair(&source, "PEP", "ZZZ", range).await.unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Pairs(PairsError::DataUnavailable { .. })
        ));
    }
}

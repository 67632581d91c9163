use std::collections::HashMap;

use super::PriceSource;
use crate::error::IngestionError;
use crate::history::{DateRange, PriceHistory};

/// In-memory price source (for testing and synthetic runs)
pub struct InMemoryPriceSource {
    histories: tokio::sync::RwLock<HashMap<String, PriceHistory>>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self {
            histories: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_history(mut self, history: PriceHistory) -> Self {
        self.histories
            .get_mut()
            .insert(history.symbol.clone(), history);
        self
    }

    pub async fn insert(&self, history: PriceHistory) {
        let mut histories = self.histories.write().await;
        histories.insert(history.symbol.clone(), history);
    }
}

impl Default for InMemoryPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceSource for InMemoryPriceSource {
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceHistory, IngestionError> {
        let histories = self.histories.read().await;
        Ok(histories
            .get(&symbol.to_uppercase())
            .map(|history| history.within(range))
            .unwrap_or_else(|| PriceHistory::empty(symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, d).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_is_case_insensitive_and_ranged() {
        let source = InMemoryPriceSource::new().with_history(PriceHistory::new(
            "ko",
            (1..=10).map(|d| (day(d), 50.0 + d as f64)).collect(),
        ));

        let range = DateRange::new(day(2), day(5)).unwrap();
        let history = source.fetch("Ko", range).await.unwrap();

        assert_eq!(history.symbol, "KO");
        assert_eq!(history.len(), 3);
        assert_eq!(history.observations[0], (day(2), 52.0));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let source = InMemoryPriceSource::default();
        source.insert(PriceHistory::new("PEP", vec![(day(1), 1.0)])).await;

        let range = DateRange::new(day(1), day(28)).unwrap();
        let history = source.fetch("XYZ", range).await.unwrap();
        assert!(history.is_empty());
        assert_eq!(history.symbol, "XYZ");
    }
}

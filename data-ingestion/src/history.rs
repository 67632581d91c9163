use chrono::NaiveDate;
use common::PairsError;
use serde::{Deserialize, Serialize};

/// Half-open date interval: `start` is included, `end` is not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PairsError> {
        if start >= end {
            return Err(PairsError::InvalidConfig(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Daily closes for one symbol, ascending by date with one entry per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub observations: Vec<(NaiveDate, f64)>,
}

impl PriceHistory {
    /// Sorts by date; a repeated date keeps its last value.
    pub fn new(symbol: impl Into<String>, mut observations: Vec<(NaiveDate, f64)>) -> Self {
        observations.sort_by_key(|(date, _)| *date);

        let mut deduped: Vec<(NaiveDate, f64)> = Vec::with_capacity(observations.len());
        for (date, price) in observations {
            match deduped.last_mut() {
                Some(last) if last.0 == date => last.1 = price,
                _ => deduped.push((date, price)),
            }
        }

        Self {
            symbol: symbol.into().to_uppercase(),
            observations: deduped,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Observations falling inside `range`
    pub fn within(&self, range: DateRange) -> Self {
        Self {
            symbol: self.symbol.clone(),
            observations: self
                .observations
                .iter()
                .filter(|(date, _)| range.contains(*date))
                .copied()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|(date, _)| *date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|(date, _)| *date)
    }
}

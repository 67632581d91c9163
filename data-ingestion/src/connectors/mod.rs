pub mod csv_file;
pub mod memory;

pub use csv_file::CsvPriceSource;
pub use memory::InMemoryPriceSource;

use crate::error::IngestionError;
use crate::history::{DateRange, PriceHistory};

/// Source of daily close prices.
///
/// An unknown symbol is not an error here: sources return an empty history
/// and alignment reports the missing data.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Closes for `symbol` with dates inside `range`
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceHistory, IngestionError>;
}

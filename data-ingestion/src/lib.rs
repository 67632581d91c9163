//! Daily close price retrieval and date alignment for a pair of instruments

pub mod align;
pub mod connectors;
pub mod error;
pub mod history;

pub use align::{align, fetch_pair};
pub use connectors::{CsvPriceSource, InMemoryPriceSource, PriceSource};
pub use error::IngestionError;
pub use history::{DateRange, PriceHistory};

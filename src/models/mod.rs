pub mod loaders;
pub mod outcome;
pub mod sku;
pub mod snapshot;

pub use loaders::{load_input_table, parse_input_table, parse_xlsx_table, TableFormat};
pub use outcome::{ClassificationMode, ClassificationOutcome};
pub use sku::{InputTable, ResultRecord, SkuRow};
pub use snapshot::{Marker, MarkerSet, PageSnapshot, ResultsContainer};

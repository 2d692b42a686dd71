pub mod classifier;
pub mod report_writer;
pub mod search_service;

pub use classifier::Classifier;
pub use report_writer::ReportWriter;
pub use search_service::{FetchResult, SearchService};

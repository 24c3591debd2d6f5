//! Lead capture signals derived from conversation history.

mod extractor;

pub use extractor::extract_lead_info;

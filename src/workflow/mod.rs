pub mod scan_flow;
pub mod scan_input;

pub use scan_flow::{RetryOutcome, ScanFlow, SubmitOutcome};
pub use scan_input::{extract_code, ScanInput};

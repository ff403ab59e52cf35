pub mod encoding;
pub mod file_splitter;
pub mod partition;
pub mod report;

pub use file_splitter::{FileSplitter, HalfPlan, HalfSummary, SplitOutcome, SplitPlan};
pub use partition::{half_path, split_point, Partition};
pub use report::{BatchReport, ItemReport, ItemStatus};

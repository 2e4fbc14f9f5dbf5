pub mod bucket;
pub mod period;
pub mod record;

pub use bucket::{Bucket, BucketKey, GroupBy, UNASSIGNED, UNCATEGORIZED};
pub use period::PeriodKey;
pub use record::CanonicalRecord;

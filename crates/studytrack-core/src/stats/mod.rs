//! Statistics over recorded study sessions.
//!
//! Totals per label and per productivity class for a day, ISO week, month
//! or year, plus the ordered daily timeline. Every function is a pure
//! computation over sessions the caller already fetched for the range.

mod aggregate;
mod timeframe;
mod timeline;

pub use aggregate::{aggregate_by_label, aggregate_by_productivity, AggregationBucket, BucketSummary};
pub use timeframe::{timeframe_bounds, Timeframe, TimeframeBounds};
pub use timeline::{daily_timeline, TimelineEntry};

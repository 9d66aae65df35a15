use chrono::{Local, NaiveDate};
use clap::Args;
use studytrack_core::stats::{timeframe_bounds, AggregationBucket, Timeframe};
use studytrack_core::{Config, SessionStore};

#[derive(Args)]
pub struct StatsArgs {
    /// day, week, month or year
    #[arg(long, default_value = "day")]
    timeframe: Timeframe,
    /// Any date inside the timeframe (YYYY-MM-DD, default today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Print human-readable durations instead of seconds
    #[arg(long)]
    human: bool,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_database(config)?;
    let anchor = super::today_or(args.date);
    let (start, end) = timeframe_bounds(args.timeframe, anchor)?.to_utc(&Local);

    let rows = db.sessions_between(&config.user.id, start, end)?;
    let sessions = super::readable_records(rows);
    let labels = db.label_productivity_map(&config.user.id)?;
    let bucket = AggregationBucket::compute(args.timeframe, anchor, &sessions, &labels);

    if args.human {
        println!("{}", serde_json::to_string_pretty(&bucket.summary())?);
    } else {
        println!("{}", serde_json::to_string_pretty(&bucket)?);
    }
    Ok(())
}

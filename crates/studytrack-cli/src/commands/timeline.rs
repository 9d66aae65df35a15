use chrono::{Local, NaiveDate};
use clap::Args;
use studytrack_core::stats::{daily_timeline, timeframe_bounds, Timeframe};
use studytrack_core::{Config, SessionStore};

#[derive(Args)]
pub struct TimelineArgs {
    /// Day to show (YYYY-MM-DD, default today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub fn run(args: TimelineArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_database(config)?;
    let day = super::today_or(args.date);
    let (start, end) = timeframe_bounds(Timeframe::Day, day)?.to_utc(&Local);

    let rows = db.sessions_between(&config.user.id, start, end)?;
    let entries = daily_timeline(&rows, &Local);
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

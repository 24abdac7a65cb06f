//! Next command
//!
//! Usage: checkvault next [--count N]

use checkvault_core::{Clock, CheckvaultConfig, SystemClock};
use clap::Args;

#[derive(Debug, Args)]
pub struct NextArgs {
    /// How many upcoming runs to show
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

pub fn execute(args: NextArgs, config: &CheckvaultConfig) -> anyhow::Result<()> {
    let schedule = config.schedule()?;
    let upcoming = schedule.upcoming(&SystemClock.now(), args.count);

    if upcoming.is_empty() {
        println!("'{}' never fires", schedule);
    }
    for at in upcoming {
        println!("{}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

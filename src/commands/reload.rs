use tokio::time::Duration;
use tracing::{info, warn};

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Code, Line, Reply};
use crate::store::ReloadOutcome;
use crate::Error;

/// Re-reads the entries and publishes them as the new record set, at most once per cooldown
/// period. A throttled reload tells the client how many seconds are left.
#[derive(Debug, PartialEq)]
pub struct Reload;

impl Executable for Reload {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        let line = match ctx.store.reload()? {
            ReloadOutcome::Reloaded { records } => {
                info!(records, "record set reloaded");
                Line::result(Code::Ok, "Database reloaded.")
            }
            ReloadOutcome::Throttled { remaining } => {
                let seconds = whole_seconds(remaining);
                warn!(seconds, "reload throttled");
                Line::result(
                    Code::Throttled,
                    format!("Please wait {seconds} seconds before reloading."),
                )
            }
        };

        Ok(Reply::line(line))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Reload {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

/// Rounds up, so a throttled client is never told to wait 0 seconds.
fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

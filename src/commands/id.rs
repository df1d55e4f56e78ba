use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Line, Reply};
use crate::Error;

/// Clients announce themselves with `id <something>` before their first query. Nothing is
/// recorded; the probe is simply acknowledged.
#[derive(Debug, PartialEq)]
pub struct Id;

impl Executable for Id {
    fn exec(self, _ctx: &Context) -> Result<Reply, Error> {
        Ok(Reply::line(Line::ok()))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Id {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

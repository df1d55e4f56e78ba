use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Line, Reply};
use crate::Error;

/// Reports whether the server is up. The answer is the configured status text, which carries its
/// own terminating line (`201:Database ready, read-only.` by default).
#[derive(Debug, PartialEq)]
pub struct Status;

impl Executable for Status {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        let lines = ctx.text.status.iter().cloned().map(Line::Raw).collect();
        Ok(Reply::new(lines))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Status {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Line, Reply};
use crate::Error;

/// Describes the site. Written back verbatim from the configured siteinfo text.
#[derive(Debug, PartialEq)]
pub struct Siteinfo;

impl Executable for Siteinfo {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        let lines = ctx.text.siteinfo.iter().cloned().map(Line::Raw).collect();
        Ok(Reply::new(lines))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Siteinfo {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

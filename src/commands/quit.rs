use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Code, Line, Reply};
use crate::Error;

/// `quit`, `stop` or `exit`: say goodbye and ask the connection to close. Commands after it in
/// the same batch are not run.
#[derive(Debug, PartialEq)]
pub struct Quit;

impl Executable for Quit {
    fn exec(self, _ctx: &Context) -> Result<Reply, Error> {
        Ok(Reply::closing(Line::result(Code::Ok, "Bye!")))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Quit {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

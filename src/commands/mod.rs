pub mod executable;
pub mod fields;
pub mod id;
pub mod query;
pub mod quit;
pub mod reload;
pub mod siteinfo;
pub mod status;

use strum_macros::IntoStaticStr;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::context::Context;
use crate::response::Reply;
use crate::Error;

use fields::Fields;
use id::Id;
use query::Query;
use quit::Quit;
use reload::Reload;
use siteinfo::Siteinfo;
use status::Status;

#[derive(Debug, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Fields(Fields),
    Query(Query),
    Reload(Reload),

    Id(Id),
    Quit(Quit),
    Siteinfo(Siteinfo),
    Status(Status),
}

impl Executable for Command {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        match self {
            Command::Fields(cmd) => cmd.exec(ctx),
            Command::Id(cmd) => cmd.exec(ctx),
            Command::Query(cmd) => cmd.exec(ctx),
            Command::Quit(cmd) => cmd.exec(ctx),
            Command::Reload(cmd) => cmd.exec(ctx),
            Command::Siteinfo(cmd) => cmd.exec(ctx),
            Command::Status(cmd) => cmd.exec(ctx),
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandParserError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let parser = &mut CommandParser { input: text };

        let command_name = parser.parse_command_name()?;

        match &command_name[..] {
            "fields" => Fields::try_from(parser).map(Command::Fields),
            "id" => Id::try_from(parser).map(Command::Id),
            "query" => Query::try_from(parser).map(Command::Query),
            "quit" | "stop" | "exit" => Quit::try_from(parser).map(Command::Quit),
            "reload" => Reload::try_from(parser).map(Command::Reload),
            "siteinfo" => Siteinfo::try_from(parser).map(Command::Siteinfo),
            "status" => Status::try_from(parser).map(Command::Status),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }),
        }
    }
}

/// Splits one command line into its verb and the argument text that follows it.
pub struct CommandParser<'a> {
    input: &'a str,
}

impl<'a> CommandParser<'a> {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let input = self.input.trim_start();
        if input.is_empty() {
            return Err(CommandParserError::EndOfStream);
        }

        let end = input.find(char::is_whitespace).unwrap_or(input.len());
        let (name, rest) = input.split_at(end);
        self.input = rest;

        Ok(name.to_lowercase())
    }

    /// Everything after the verb, unparsed.
    fn remaining(&mut self) -> &'a str {
        std::mem::take(&mut self.input)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("protocol error; unknown command {command}")]
    UnknownCommand { command: String },
    #[error("protocol error; the command line holds no command")]
    EndOfStream,
}

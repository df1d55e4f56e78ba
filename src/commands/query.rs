use tracing::debug;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::matcher;
use crate::query;
use crate::response::{Line, Reply};
use crate::Error;

/// Looks up entries, e.g. `query species="human" return name email`.
///
/// A query that fails to parse is answered with a single error line. Otherwise the matching
/// entries are followed by the outcome line (if any) and `200:Ok.`.
#[derive(Debug, PartialEq)]
pub struct Query {
    /// Everything after the verb; parsed on execution, against the snapshot it runs on.
    pub args: String,
}

impl Executable for Query {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        let snapshot = ctx.store.snapshot();

        let parsed = match query::parse(&self.args, snapshot.universe(), &ctx.schema) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(%err, "rejected query");
                return Ok(Reply::line(err.to_line()));
            }
        };

        let evaluation = matcher::evaluate(snapshot.records(), &parsed, &ctx.schema);
        let outcome = evaluation.outcome();
        debug!(matched = evaluation.matched, ?outcome, "query evaluated");

        let mut lines = evaluation.lines;
        lines.extend(outcome.line());
        lines.push(Line::ok());

        Ok(Reply::new(lines))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Query {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        let args = parser.remaining().to_string();
        Ok(Self { args })
    }
}

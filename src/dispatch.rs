use percent_encoding::percent_decode_str;
use tracing::{debug, error, info};

use crate::commands::executable::Executable;
use crate::commands::{Command, CommandParserError};
use crate::context::Context;
use crate::response::{Line, Reply};

/// Runs every command of a batch in order and collects their lines.
///
/// The batch stops early at a command that closes the connection. A command that fails is
/// answered with a single `400` line and the remaining commands still run.
pub fn handle_batch(raw: &str, ctx: &Context) -> Reply {
    let request = normalize(raw);
    let mut batch = Reply::default();

    for text in commands(&request) {
        let reply = handle_command(text, ctx);
        batch.lines.extend(reply.lines);

        if reply.close {
            batch.close = true;
            break;
        }
    }

    batch
}

/// Parses and runs a single command line.
pub fn handle_command(text: &str, ctx: &Context) -> Reply {
    let cmd = match Command::try_from(text) {
        Ok(cmd) => cmd,
        Err(CommandParserError::EndOfStream) => return Reply::default(),
        Err(err @ CommandParserError::UnknownCommand { .. }) => {
            debug!(%err, "rejected command");
            return Reply::line(Line::unknown_command());
        }
    };

    let name: &'static str = (&cmd).into();
    info!(command = name, text, "received command");

    match cmd.exec(ctx) {
        Ok(reply) => {
            debug!(lines = reply.lines.len(), close = reply.close, "command done");
            reply
        }
        Err(err) => {
            error!(command = name, %err, "command failed");
            Reply::line(Line::server_error())
        }
    }
}

/// Undoes the mangling some legacy clients apply to their input: percent-encoding and stray
/// path slashes.
pub fn normalize(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().replace('/', "")
}

/// Splits a request into its command lines. Lines end in CR LF; a bare LF is accepted too.
fn commands(request: &str) -> impl Iterator<Item = &str> {
    request
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

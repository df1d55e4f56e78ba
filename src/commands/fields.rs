use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::context::Context;
use crate::response::{Line, Reply};
use crate::Error;

/// Longest value a client should expect for any field.
const MAX_FIELD_LENGTH: usize = 64;

/// Lists every field present in the record set. Each field gets two lines under the same id:
/// its properties, then the label clients show for it.
///
/// ```text
/// -200:1:name:max 64 Indexed Lookup Always Default
/// -200:1:name:Name
/// 200:Ok.
/// ```
#[derive(Debug, PartialEq)]
pub struct Fields;

impl Executable for Fields {
    fn exec(self, ctx: &Context) -> Result<Reply, Error> {
        let snapshot = ctx.store.snapshot();
        let mut lines = Vec::new();

        for (index, field) in (1..).zip(snapshot.universe().iter()) {
            let properties = format!("max {MAX_FIELD_LENGTH} {}", ctx.schema.keywords(field));

            lines.push(Line::Field {
                index,
                field: field.to_string(),
                text: properties.trim_end().to_string(),
            });
            lines.push(Line::Field {
                index,
                field: field.to_string(),
                text: title_case(field),
            });
        }

        lines.push(Line::ok());
        Ok(Reply::new(lines))
    }
}

impl TryFrom<&mut CommandParser<'_>> for Fields {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser<'_>) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest, so
/// `e-mail` becomes `E-Mail` and `DISCORD` becomes `Discord`.
fn title_case(field: &str) -> String {
    let mut title = String::with_capacity(field.len());
    let mut in_word = false;

    for c in field.chars() {
        if c.is_alphabetic() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }

    title
}

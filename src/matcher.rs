use crate::query::{Criterion, ParsedQuery, ReturnFields};
use crate::record::{eq_fold, Record};
use crate::response::{Code, Line};
use crate::schema::FieldSchema;

/// How a query scan ended. Exactly one outcome is reported, no match taking priority over a
/// missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NoMatch,
    FieldNotPresent,
}

impl Outcome {
    /// The annotation line reported after the entry lines, if any.
    pub fn line(self) -> Option<Line> {
        match self {
            Outcome::Found => None,
            Outcome::NoMatch => Some(Line::result(Code::NoMatch, "No matches to your query.")),
            Outcome::FieldNotPresent => Some(Line::result(
                Code::FieldNotPresent,
                "Field not present in requested entries.",
            )),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub lines: Vec<Line>,
    pub matched: usize,
    pub missing_field: bool,
}

impl Evaluation {
    pub fn outcome(&self) -> Outcome {
        if self.matched == 0 {
            Outcome::NoMatch
        } else if self.missing_field {
            Outcome::FieldNotPresent
        } else {
            Outcome::Found
        }
    }
}

/// Scans `records` in order and projects every record that satisfies all criteria.
///
/// Matched records are numbered 1, 2, 3... in the order they are found; their position in the
/// record set plays no part. For an explicit return list, a field is only written if the record
/// has it and it is filterable, otherwise the missing field condition is raised.
pub fn evaluate(records: &[Record], query: &ParsedQuery, schema: &FieldSchema) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for record in records.iter().filter(|r| matches(r, &query.criteria)) {
        evaluation.matched += 1;
        let index = evaluation.matched;

        match &query.return_fields {
            ReturnFields::All => {
                evaluation
                    .lines
                    .extend(record.iter().map(|(field, value)| entry(index, field, value)));
            }
            ReturnFields::Fields(fields) => {
                for requested in fields {
                    match record.get(requested) {
                        Some((field, value)) if schema.is_filterable(field) => {
                            evaluation.lines.push(entry(index, field, value));
                        }
                        _ => evaluation.missing_field = true,
                    }
                }
            }
        }
    }

    evaluation
}

/// A record matches when it holds every criterion field with an equal value, ignoring case.
pub fn matches(record: &Record, criteria: &[Criterion]) -> bool {
    criteria.iter().all(|criterion| {
        record
            .get(&criterion.field)
            .is_some_and(|(_, value)| eq_fold(value, &criterion.value))
    })
}

fn entry(index: usize, field: &str, value: &str) -> Line {
    Line::Entry {
        index,
        field: field.to_string(),
        value: value.to_string(),
    }
}

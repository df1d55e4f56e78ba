//! Parser for the argument text of a `query` command.
//!
//! ```text
//! query <field>="<value>" [<field>="<value>" ...] [return <field> [<field> ...]]
//! ```
//!
//! Parsing runs in three phases: criteria, the `return` keyword, and the return fields. Each
//! phase either hands the remaining input to the next one or fails with a [`QueryError`] that
//! maps onto a protocol response code.

use itertools::Itertools;
use thiserror::Error as ThisError;

use crate::response::{Code, Line};
use crate::schema::FieldSchema;
use crate::store::Universe;

const RETURN: &str = "return";
const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnFields {
    /// Every field present on each matched record.
    All,
    /// The requested fields, with the always fields appended.
    Fields(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub criteria: Vec<Criterion>,
    pub return_fields: ReturnFields,
}

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Illegal value - no search criteria provided.")]
    NoCriteria,
    #[error("Field {0} not recognised.")]
    UnknownField(String),
    #[error("Illegal value - expected return clause.")]
    ExpectedReturn,
    #[error("Return field {0} not recognised.")]
    UnknownReturnField(String),
}

impl QueryError {
    pub fn code(&self) -> Code {
        match self {
            QueryError::NoCriteria | QueryError::ExpectedReturn => Code::IllegalValue,
            QueryError::UnknownField(_) | QueryError::UnknownReturnField(_) => Code::UnknownField,
        }
    }

    pub fn to_line(&self) -> Line {
        Line::result(self.code(), self.to_string())
    }
}

/// Parses `input`, the text following the `query` verb, validating every field reference
/// against `universe`.
pub fn parse(
    input: &str,
    universe: &Universe,
    schema: &FieldSchema,
) -> Result<ParsedQuery, QueryError> {
    let mut parser = Parser {
        rest: input,
        universe,
        schema,
    };

    let criteria = parser.criteria()?;
    let return_fields = if parser.return_keyword()? {
        parser.return_fields()?
    } else {
        ReturnFields::All
    };

    Ok(ParsedQuery {
        criteria,
        return_fields,
    })
}

struct Parser<'a> {
    rest: &'a str,
    universe: &'a Universe,
    schema: &'a FieldSchema,
}

impl<'a> Parser<'a> {
    /// Consumes `field="value"` tokens until the input stops matching that form. A later
    /// criterion on the same field replaces the earlier one.
    fn criteria(&mut self) -> Result<Vec<Criterion>, QueryError> {
        let mut criteria: Vec<Criterion> = Vec::new();

        loop {
            let input = self.rest.trim_start();
            let Some((field, value, rest)) = criterion(input) else {
                self.rest = input;
                break;
            };
            self.rest = rest;

            match criteria
                .iter_mut()
                .find(|c| c.field.eq_ignore_ascii_case(field))
            {
                Some(existing) => existing.value = value.to_string(),
                None => criteria.push(Criterion {
                    field: field.to_string(),
                    value: value.to_string(),
                }),
            }
        }

        if criteria.is_empty() {
            return Err(QueryError::NoCriteria);
        }

        if let Some(unknown) = criteria.iter().find(|c| !self.universe.contains(&c.field)) {
            return Err(QueryError::UnknownField(unknown.field.clone()));
        }

        Ok(criteria)
    }

    /// Returns whether a return clause follows. Anything other than the end of input or the
    /// `return` keyword is an error.
    fn return_keyword(&mut self) -> Result<bool, QueryError> {
        let input = self.rest.trim_start();
        if input.is_empty() {
            return Ok(false);
        }

        let keyword_len = input
            .find(char::is_whitespace)
            .unwrap_or(input.len());
        let (keyword, rest) = input.split_at(keyword_len);

        if !keyword.eq_ignore_ascii_case(RETURN) {
            return Err(QueryError::ExpectedReturn);
        }

        self.rest = rest;
        Ok(true)
    }

    fn return_fields(&mut self) -> Result<ReturnFields, QueryError> {
        let mut fields: Vec<String> = self
            .rest
            .split_whitespace()
            .unique_by(|field| field.to_ascii_lowercase())
            .map(str::to_string)
            .collect();
        self.rest = "";

        if fields.is_empty() {
            return Ok(ReturnFields::All);
        }

        for always in self.schema.always() {
            if !fields.iter().any(|f| f.eq_ignore_ascii_case(always)) {
                fields.push(always.to_string());
            }
        }

        if let Some(unknown) = fields
            .iter()
            .find(|f| !is_all(f) && !self.universe.contains(f))
        {
            return Err(QueryError::UnknownReturnField(unknown.clone()));
        }

        if fields.iter().any(|f| is_all(f)) {
            return Ok(ReturnFields::All);
        }

        Ok(ReturnFields::Fields(fields))
    }
}

/// Matches a single `field="value"` token at the start of `input`, returning the field, the
/// value and whatever follows the closing quote.
///
/// The field is everything before the first `="` of the leading non-whitespace run, so it may
/// itself contain `=` (and is then rejected as an unknown field).
fn criterion(input: &str) -> Option<(&str, &str, &str)> {
    let run_len = input.find(char::is_whitespace).unwrap_or(input.len());
    let (run, _) = input.split_at(run_len);
    let field_len = run.find("=\"")?;
    let (field, rest) = input.split_at(field_len);

    let rest = rest.strip_prefix("=\"")?;
    let (value, rest) = rest.split_once('"')?;

    Some((field, value, rest))
}

fn is_all(field: &str) -> bool {
    field.eq_ignore_ascii_case(ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn universe() -> Universe {
        let records: Vec<Record> = vec![
            [("name", "Smith Bob"), ("species", "human")]
                .into_iter()
                .collect(),
            [("name", "Smith John"), ("species", "elf"), ("email", "j@x.edu")]
                .into_iter()
                .collect(),
        ];
        Universe::from_records(&records)
    }

    fn schema() -> FieldSchema {
        FieldSchema::new(["name"], ["species"], ["name", "species", "email"])
    }

    fn run(input: &str) -> Result<ParsedQuery, QueryError> {
        parse(input, &universe(), &schema())
    }

    fn criterion(field: &str, value: &str) -> Criterion {
        Criterion {
            field: String::from(field),
            value: String::from(value),
        }
    }

    #[test]
    fn criteria_without_return_clause() {
        let query = run(r#"species="human""#).unwrap();

        assert_eq!(query.criteria, vec![criterion("species", "human")]);
        assert_eq!(query.return_fields, ReturnFields::All);
    }

    #[test]
    fn values_may_contain_spaces_or_be_empty() {
        let query = run(r#" name="Smith Bob"   email="" "#).unwrap();

        assert_eq!(
            query.criteria,
            vec![criterion("name", "Smith Bob"), criterion("email", "")]
        );
    }

    #[test]
    fn later_criterion_overwrites_earlier() {
        let query = run(r#"species="human" SPECIES="elf" name="x""#).unwrap();

        assert_eq!(
            query.criteria,
            vec![criterion("species", "elf"), criterion("name", "x")]
        );
    }

    #[test]
    fn return_clause_appends_always_fields() {
        let query = run(r#"species="human" return email species email"#).unwrap();

        assert_eq!(
            query.return_fields,
            ReturnFields::Fields(vec![
                String::from("email"),
                String::from("species"),
                String::from("name"),
            ])
        );
    }

    #[test]
    fn always_field_is_not_duplicated() {
        let query = run(r#"species="human" return Name"#).unwrap();

        assert_eq!(
            query.return_fields,
            ReturnFields::Fields(vec![String::from("Name")])
        );
    }

    #[test]
    fn empty_return_clause_returns_all() {
        let query = run(r#"species="human" return   "#).unwrap();
        assert_eq!(query.return_fields, ReturnFields::All);
    }

    #[test]
    fn return_all() {
        let query = run(r#"species="human" return all email"#).unwrap();
        assert_eq!(query.return_fields, ReturnFields::All);
    }

    #[test]
    fn no_criteria() {
        for input in ["", "   ", "return name", "species=human", r#"species="human"#] {
            let err = run(input).unwrap_err();
            assert_eq!(err, QueryError::NoCriteria, "input: {input:?}");
            assert_eq!(err.code(), Code::IllegalValue);
        }
    }

    #[test]
    fn unknown_criterion_field() {
        let err = run(r#"species="human" planet="earth""#).unwrap_err();

        assert_eq!(err, QueryError::UnknownField(String::from("planet")));
        assert_eq!(
            err.to_line().to_string(),
            "507:Field planet not recognised."
        );
    }

    #[test]
    fn missing_return_keyword() {
        let err = run(r#"species="human" name"#).unwrap_err();
        assert_eq!(err, QueryError::ExpectedReturn);
        assert_eq!(err.code(), Code::IllegalValue);

        let err = run(r#"species="human" returnname"#).unwrap_err();
        assert_eq!(err, QueryError::ExpectedReturn);
    }

    #[test]
    fn unknown_return_field() {
        let err = run(r#"species="human" return name planet"#).unwrap_err();

        assert_eq!(err, QueryError::UnknownReturnField(String::from("planet")));
        assert_eq!(
            err.to_line().to_string(),
            "507:Return field planet not recognised."
        );
    }

    #[test]
    fn field_runs_up_to_the_first_quote() {
        let err = run(r#"a=b="c""#).unwrap_err();
        assert_eq!(err, QueryError::UnknownField(String::from("a=b")));
        assert_eq!(err.code(), Code::UnknownField);

        let err = run(r#"name=="x""#).unwrap_err();
        assert_eq!(err, QueryError::UnknownField(String::from("name=")));

        let err = run(r#"="x""#).unwrap_err();
        assert_eq!(err, QueryError::UnknownField(String::new()));
    }

    #[test]
    fn unknown_criterion_is_reported_before_return_clause() {
        let err = run(r#"planet="earth" garbage"#).unwrap_err();
        assert_eq!(err, QueryError::UnknownField(String::from("planet")));
    }
}

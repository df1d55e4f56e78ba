use std::fmt;

/// Response codes surfaced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Code {
    Ok = 200,
    Ready = 201,
    ServerError = 400,
    NoMatch = 502,
    UnknownField = 507,
    FieldNotPresent = 508,
    IllegalValue = 512,
    UnknownCommand = 514,
    Throttled = 520,
}

impl Code {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// One outbound protocol line, without its CR LF terminator.
///
/// A leading `-` marks a continuation line: more lines for the same result follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `<code>:<text>`, the last line of a result.
    Result { code: Code, text: String },
    /// `-200:<index>: <field>: <value>`, one field of a matched record.
    Entry {
        index: usize,
        field: String,
        value: String,
    },
    /// `-200:<index>:<field>:<text>`, one line of a field description.
    Field {
        index: usize,
        field: String,
        text: String,
    },
    /// Preformatted text written back verbatim.
    Raw(String),
}

impl Line {
    pub fn result(code: Code, text: impl Into<String>) -> Line {
        Line::Result {
            code,
            text: text.into(),
        }
    }

    pub fn ok() -> Line {
        Line::result(Code::Ok, "Ok.")
    }

    pub fn server_error() -> Line {
        Line::result(Code::ServerError, "Server error occurred.")
    }

    pub fn unknown_command() -> Line {
        Line::result(Code::UnknownCommand, "Unknown command.")
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Result { code, text } => write!(f, "{code}:{text}"),
            Line::Entry {
                index,
                field,
                value,
            } => write!(f, "-{}:{index}: {field}: {value}", Code::Ok),
            Line::Field { index, field, text } => {
                write!(f, "-{}:{index}:{field}:{text}", Code::Ok)
            }
            Line::Raw(text) => f.write_str(text),
        }
    }
}

/// The lines produced by a single command, and whether the client asked to hang up.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<Line>,
    pub close: bool,
}

impl Reply {
    pub fn new(lines: Vec<Line>) -> Reply {
        Reply {
            lines,
            close: false,
        }
    }

    pub fn line(line: Line) -> Reply {
        Reply::new(vec![line])
    }

    pub fn closing(line: Line) -> Reply {
        Reply {
            lines: vec![line],
            close: true,
        }
    }

    /// The rendered lines, as they go on the wire minus the line terminators.
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(Line::to_string).collect()
    }
}

//! Protocol responses and the errors that short-circuit into them.
//!
//! Every CDDB reply starts with a three-digit status line. Replies that carry
//! a body list it line by line and close it with a line holding a single `.`.

/// Line terminator used on the wire.
pub const EOL: &str = "\r\n";

/// Body terminator line.
pub const TERMINATOR: &str = ".";

/// Leading status of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 200 - version information
    Version,
    /// 202 - query found nothing
    NoMatch,
    /// 210 - OK, body follows
    Ok,
    /// 211 - inexact matches, list follows
    InexactMatches,
    /// 400 - the store refused the request parameters
    InvalidRequest,
    /// 401 - entry, category or information not found
    NotFound,
    /// 500 - syntax error or unimplemented command
    Error,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Version => 200,
            Status::NoMatch => 202,
            Status::Ok => 210,
            Status::InexactMatches => 211,
            Status::InvalidRequest => 400,
            Status::NotFound => 401,
            Status::Error => 500,
        }
    }
}

/// A complete protocol reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    message: String,
    body: Option<Vec<String>>,
}

impl Response {
    /// A single status line with no body.
    pub fn status(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// A status line followed by `lines` and the terminator.
    pub fn with_body(status: Status, message: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: Some(lines),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    /// Body lines without status line or terminator.
    pub fn body(&self) -> Option<&[String]> {
        self.body.as_deref()
    }

    /// All lines as sent: status line, body, terminator.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} {}", self.status.code(), self.message)];
        if let Some(body) = &self.body {
            lines.extend(body.iter().cloned());
            lines.push(TERMINATOR.to_string());
        }
        lines
    }

    /// Wire form: lines joined by CRLF with a trailing CRLF.
    pub fn render(&self) -> String {
        let mut out = self.lines().join(EOL);
        out.push_str(EOL);
        out
    }
}

/// Request problems detected before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Command syntax error: incorrect number of arguments.")]
    MissingArguments,

    #[error("Command syntax error.")]
    Syntax,

    #[error("ID not hex.")]
    IdNotHex,

    #[error("Command syntax error, command unknown, command unimplemented.")]
    UnknownCommand(String),

    #[error("Specified CDDB entry not found.")]
    EntryNotFound,
}

impl ProtocolError {
    pub fn status(&self) -> Status {
        match self {
            ProtocolError::EntryNotFound => Status::NotFound,
            _ => Status::Error,
        }
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        Response::status(err.status(), err.to_string())
    }
}

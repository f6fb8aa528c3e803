//! Readers for the supported molecule description formats.
//!
//! Three input formats describe a single molecular species: z-matrix
//! ([`zmat`]), xyz ([`xyz`]) and MDL mol ([`mol`]). All of them resolve to
//! either an internal-coordinate description or a Cartesian one;
//! [`read_description`] dispatches on the file extension.

pub mod mol;
pub mod xyz;
pub mod zmat;

use nalgebra::Point3;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use zmat::ZmatDescription;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error at line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("unsupported molecule file extension: '{path}'")]
    UnsupportedExtension { path: PathBuf },
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("atom reference must be positive")]
    InvalidReference,
    #[error("undefined variable '{0}'")]
    UnknownVariable(String),
    #[error("record is too short")]
    ShortRecord,
    #[error("unexpected end of file")]
    UnexpectedEnd,
}

/// A molecule given directly in Cartesian coordinates.
///
/// `bonds` is `Some` when the file declares its own bond list and `None` when
/// connectivity is to be inferred from distances (xyz files, and mol files
/// with the `reconnect` flag).
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianDescription {
    pub name: String,
    pub atoms: Vec<(String, Point3<f64>)>,
    pub bonds: Option<Vec<(usize, usize)>>,
    pub forcefield: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Zmat(ZmatDescription),
    Cartesian(CartesianDescription),
}

impl Description {
    pub fn name(&self) -> &str {
        match self {
            Description::Zmat(z) => &z.name,
            Description::Cartesian(c) => &c.name,
        }
    }

    pub fn forcefield(&self) -> Option<&str> {
        match self {
            Description::Zmat(z) => z.forcefield.as_deref(),
            Description::Cartesian(c) => c.forcefield.as_deref(),
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>, IoError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IoError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads a molecule description, choosing the parser from the file extension
/// (`.zmat`, `.mol` or `.xyz`, case-insensitive).
pub fn read_description(path: &Path) -> Result<Description, IoError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("zmat") => Ok(Description::Zmat(zmat::read_from(open(path)?)?)),
        Some("mol") => Ok(Description::Cartesian(mol::read_from(open(path)?)?)),
        Some("xyz") => Ok(Description::Cartesian(xyz::read_from(open(path)?)?)),
        _ => Err(IoError::UnsupportedExtension {
            path: path.to_path_buf(),
        }),
    }
}

/// Buffered line cursor carrying 1-based line numbers for error reporting.
struct Lines {
    lines: std::vec::IntoIter<(usize, String)>,
    current: Option<(usize, String)>,
    total: usize,
}

impl Lines {
    fn load<R: std::io::BufRead>(reader: R) -> Result<Self, IoError> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| IoError::Io {
                path: PathBuf::from("<input>"),
                source,
            })?;
            lines.push((i + 1, line));
        }
        let total = lines.len();
        let mut cursor = Self {
            lines: lines.into_iter(),
            current: None,
            total,
        };
        cursor.advance();
        Ok(cursor)
    }

    fn advance(&mut self) {
        self.current = self.lines.next();
    }

    /// The current line, or `None` at end of input.
    fn current(&self) -> Option<(usize, &str)> {
        self.current.as_ref().map(|(n, s)| (*n, s.as_str()))
    }

    /// The current line, or an error at end of input.
    fn require(&self) -> Result<(usize, &str), IoError> {
        self.current().ok_or(IoError::Parse {
            line: self.total + 1,
            kind: ParseErrorKind::UnexpectedEnd,
        })
    }

    /// Skips blank lines and `#` comments.
    fn skip_blank_and_comments(&mut self) {
        while let Some((_, text)) = self.current() {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                self.advance();
            } else {
                break;
            }
        }
    }
}

fn parse_f64(token: &str, line: usize) -> Result<f64, IoError> {
    token.parse().map_err(|_| IoError::Parse {
        line,
        kind: ParseErrorKind::InvalidNumber(token.to_string()),
    })
}

fn parse_usize(token: &str, line: usize) -> Result<usize, IoError> {
    token.parse().map_err(|_| IoError::Parse {
        line,
        kind: ParseErrorKind::InvalidNumber(token.to_string()),
    })
}

/// Converts a 1-based atom reference from a file to a 0-based index.
fn to_index(reference: usize, line: usize) -> Result<usize, IoError> {
    reference.checked_sub(1).ok_or(IoError::Parse {
        line,
        kind: ParseErrorKind::InvalidReference,
    })
}

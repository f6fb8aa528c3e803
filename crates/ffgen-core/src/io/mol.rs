//! MDL mol (`.mol`) reader.
//!
//! The header's first line holds the molecule name, optionally followed by
//! the force-field file and a `rec` flag requesting distance-based
//! connectivity; when absent there, the force field may sit on the comment
//! line instead. The counts line and bond block use the format's fixed
//! 3-column integer fields.

use super::{CartesianDescription, IoError, Lines, ParseErrorKind, parse_f64, parse_usize, to_index};
use nalgebra::Point3;
use std::io::BufRead;

/// Parses a fixed-width 3-character integer field starting at `start`.
fn fixed_field(text: &str, start: usize, line: usize) -> Result<usize, IoError> {
    let field = text.get(start..start + 3).ok_or(IoError::Parse {
        line,
        kind: ParseErrorKind::ShortRecord,
    })?;
    parse_usize(field.trim(), line)
}

pub fn read_from<R: BufRead>(reader: R) -> Result<CartesianDescription, IoError> {
    let mut lines = Lines::load(reader)?;

    let (line, text) = lines.require()?;
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(&name) = tokens.first() else {
        return Err(IoError::Parse {
            line,
            kind: ParseErrorKind::MissingField("molecule name"),
        });
    };
    let name = name.to_string();
    let mut forcefield = tokens.get(1).map(|t| t.to_string());
    let mut reconnect = tokens.get(2).is_some_and(|t| t.starts_with("rec"));
    lines.advance();

    // Program/date line, ignored.
    lines.require()?;
    lines.advance();

    // Comment line may carry the force field when the title did not.
    let (_, comment) = lines.require()?;
    let comment = comment.trim();
    if !comment.is_empty() && !comment.starts_with('#') && forcefield.is_none() {
        let tokens: Vec<&str> = comment.split_whitespace().collect();
        forcefield = Some(tokens[0].to_string());
        reconnect = tokens.get(1).is_some_and(|t| t.starts_with("rec"));
    }
    lines.advance();

    let (line, text) = lines.require()?;
    let natom = fixed_field(text, 0, line)?;
    let nbond = fixed_field(text, 3, line)?;
    lines.advance();

    let mut atoms = Vec::with_capacity(natom);
    for _ in 0..natom {
        let (line, text) = lines.require()?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(IoError::Parse {
                line,
                kind: ParseErrorKind::ShortRecord,
            });
        }
        let position = Point3::new(
            parse_f64(tokens[0], line)?,
            parse_f64(tokens[1], line)?,
            parse_f64(tokens[2], line)?,
        );
        atoms.push((tokens[3].to_string(), position));
        lines.advance();
    }

    let mut declared = Vec::with_capacity(nbond);
    for _ in 0..nbond {
        let (line, text) = lines.require()?;
        let i = to_index(fixed_field(text, 0, line)?, line)?;
        let j = to_index(fixed_field(text, 3, line)?, line)?;
        declared.push((i, j));
        lines.advance();
    }

    Ok(CartesianDescription {
        name,
        atoms,
        bonds: if reconnect { None } else { Some(declared) },
        forcefield,
    })
}

//! Z-matrix (`.zmat`) reader.
//!
//! The file carries a molecule name, an ordered internal-coordinate table
//! (optionally with leading line numbers and symbolic variables), an optional
//! `Variables:` block, and a tail of keyword lines: `connect i j` for ring
//! closures, `improper i j k l`, `reconnect` to request distance-based
//! connectivity, and a bare token naming the force-field file.

use super::{IoError, Lines, ParseErrorKind, parse_f64, parse_usize, to_index};
use crate::geometry::zmatrix::ZmatEntry;
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq)]
pub struct ZmatDescription {
    pub name: String,
    /// Internal-coordinate records with 0-based references.
    pub entries: Vec<ZmatEntry>,
    /// Extra bonds closing rings, 0-based.
    pub connect: Vec<(usize, usize)>,
    /// Declared improper dihedrals, 0-based.
    pub impropers: Vec<[usize; 4]>,
    /// When set, connectivity is inferred from distances instead of taken
    /// from the coordinate references and `connect` records.
    pub reconnect: bool,
    pub forcefield: Option<String>,
}

/// A numeric field or a reference to a `Variables:` table entry.
enum Field {
    Value(f64),
    Var(String),
}

struct RawRef {
    reference: usize,
    field: Field,
}

struct RawAtom {
    name: String,
    bond: Option<RawRef>,
    angle: Option<RawRef>,
    dihedral: Option<RawRef>,
    line: usize,
}

fn parse_field(token: &str, line: usize) -> Result<Field, IoError> {
    if token.chars().next().is_some_and(|c| c.is_alphabetic()) {
        Ok(Field::Var(token.to_string()))
    } else {
        Ok(Field::Value(parse_f64(token, line)?))
    }
}

fn parse_ref(tokens: &[&str], at: usize, line: usize) -> Result<RawRef, IoError> {
    let reference = parse_usize(tokens[at], line)?;
    if reference == 0 {
        return Err(IoError::Parse {
            line,
            kind: ParseErrorKind::InvalidReference,
        });
    }
    Ok(RawRef {
        reference,
        field: parse_field(tokens[at + 1], line)?,
    })
}

fn resolve(
    raw: Option<RawRef>,
    variables: &HashMap<String, f64>,
    line: usize,
) -> Result<Option<(usize, f64)>, IoError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = match raw.field {
        Field::Value(v) => v,
        Field::Var(name) => *variables.get(&name).ok_or(IoError::Parse {
            line,
            kind: ParseErrorKind::UnknownVariable(name.clone()),
        })?,
    };
    Ok(Some((to_index(raw.reference, line)?, value)))
}

pub fn read_from<R: BufRead>(reader: R) -> Result<ZmatDescription, IoError> {
    let mut lines = Lines::load(reader)?;

    lines.skip_blank_and_comments();
    let (line, text) = lines.require()?;
    let name = text.trim().to_string();
    if name.is_empty() {
        return Err(IoError::Parse {
            line,
            kind: ParseErrorKind::MissingField("molecule name"),
        });
    }
    lines.advance();
    lines.skip_blank_and_comments();

    // Some generators prepend a line number to each record; detect the shift
    // from the first record, which otherwise holds the atom name alone.
    let shift = match lines.current() {
        Some((_, text)) if text.split_whitespace().count() > 1 => 1,
        _ => 0,
    };

    let mut raw_atoms: Vec<RawAtom> = Vec::new();
    let mut has_variables = false;
    while let Some((line, text)) = lines.current() {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("var") {
            break;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() <= shift {
            return Err(IoError::Parse {
                line,
                kind: ParseErrorKind::MissingField("atom name"),
            });
        }
        let mut atom = RawAtom {
            name: tokens[shift].to_string(),
            bond: None,
            angle: None,
            dihedral: None,
            line,
        };
        if tokens.len() - shift > 2 {
            atom.bond = Some(parse_ref(&tokens, shift + 1, line)?);
        }
        if tokens.len() - shift > 4 {
            atom.angle = Some(parse_ref(&tokens, shift + 3, line)?);
        }
        if tokens.len() - shift > 6 {
            atom.dihedral = Some(parse_ref(&tokens, shift + 5, line)?);
        }
        has_variables |= [&atom.bond, &atom.angle, &atom.dihedral]
            .iter()
            .any(|r| matches!(r, Some(RawRef { field: Field::Var(_), .. })));
        raw_atoms.push(atom);
        lines.advance();
    }

    // Variables block: `name = value` lines after the records.
    let mut variables: HashMap<String, f64> = HashMap::new();
    if has_variables {
        while let Some((_, text)) = lines.current() {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("var") {
                lines.advance();
            } else {
                break;
            }
        }
        while let Some((line, text)) = lines.current() {
            let Some((key, value)) = text.split_once('=') else {
                break;
            };
            let value = parse_f64(value.trim(), line)?;
            variables.insert(key.trim().to_string(), value);
            lines.advance();
        }
    }

    let mut entries = Vec::with_capacity(raw_atoms.len());
    for raw in raw_atoms {
        entries.push(ZmatEntry {
            name: raw.name,
            bond: resolve(raw.bond, &variables, raw.line)?,
            angle: resolve(raw.angle, &variables, raw.line)?,
            dihedral: resolve(raw.dihedral, &variables, raw.line)?,
        });
    }

    // Tail: connects, impropers, reconnect flag, force-field file name.
    let mut description = ZmatDescription {
        name,
        entries,
        connect: Vec::new(),
        impropers: Vec::new(),
        reconnect: false,
        forcefield: None,
    };
    loop {
        lines.skip_blank_and_comments();
        let Some((line, text)) = lines.current() else {
            break;
        };
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens[0] {
            "reconnect" => description.reconnect = true,
            "connect" => {
                if tokens.len() < 3 {
                    return Err(IoError::Parse {
                        line,
                        kind: ParseErrorKind::ShortRecord,
                    });
                }
                let i = to_index(parse_usize(tokens[1], line)?, line)?;
                let j = to_index(parse_usize(tokens[2], line)?, line)?;
                description.connect.push((i, j));
            }
            "improper" => {
                if tokens.len() < 5 {
                    return Err(IoError::Parse {
                        line,
                        kind: ParseErrorKind::ShortRecord,
                    });
                }
                let mut quad = [0usize; 4];
                for (slot, token) in quad.iter_mut().zip(&tokens[1..5]) {
                    *slot = to_index(parse_usize(token, line)?, line)?;
                }
                description.impropers.push(quad);
            }
            other => description.forcefield = Some(other.to_string()),
        }
        lines.advance();
    }

    Ok(description)
}

//! Xyz (`.xyz`) reader.
//!
//! Standard xyz layout: atom count, then a title line holding the molecule
//! name and optionally the force-field file as its last token, then one
//! `name x y z` record per atom. Xyz carries no connectivity, so bonds are
//! always left to distance-based inference.

use super::{CartesianDescription, IoError, Lines, ParseErrorKind, parse_f64, parse_usize};
use nalgebra::Point3;
use std::io::BufRead;

pub fn read_from<R: BufRead>(reader: R) -> Result<CartesianDescription, IoError> {
    let mut lines = Lines::load(reader)?;

    let (line, text) = lines.require()?;
    let natom = parse_usize(text.trim(), line)?;
    lines.advance();

    let (line, text) = lines.require()?;
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(&name) = tokens.first() else {
        return Err(IoError::Parse {
            line,
            kind: ParseErrorKind::MissingField("molecule name"),
        });
    };
    let name = name.to_string();
    let forcefield = (tokens.len() > 1).then(|| tokens[tokens.len() - 1].to_string());
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
            parse_f64(tokens[1], line)?,
            parse_f64(tokens[2], line)?,
            parse_f64(tokens[3], line)?,
        );
        atoms.push((tokens[0].to_string(), position));
        lines.advance();
    }

    Ok(CartesianDescription {
        name,
        atoms,
        bonds: None,
        forcefield,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_atoms_and_forcefield() {
        let text = "\
3
water spce.ff
O   0.000  0.000  0.000
H1  0.957  0.000  0.000
H2 -0.240  0.927  0.000
";
        let c = read_from(Cursor::new(text)).unwrap();
        assert_eq!(c.name, "water");
        assert_eq!(c.forcefield.as_deref(), Some("spce.ff"));
        assert_eq!(c.atoms.len(), 3);
        assert_eq!(c.atoms[1].0, "H1");
        assert_eq!(c.atoms[1].1, Point3::new(0.957, 0.0, 0.0));
        assert_eq!(c.bonds, None);
    }

    #[test]
    fn title_without_forcefield() {
        let text = "1\nargon\nAr 0.0 0.0 0.0\n";
        let c = read_from(Cursor::new(text)).unwrap();
        assert_eq!(c.name, "argon");
        assert_eq!(c.forcefield, None);
    }

    #[test]
    fn truncated_atom_block_is_an_error() {
        let text = "2\nwater\nO 0.0 0.0 0.0\n";
        assert!(matches!(
            read_from(Cursor::new(text)).unwrap_err(),
            IoError::Parse {
                kind: ParseErrorKind::UnexpectedEnd,
                ..
            }
        ));
    }

    #[test]
    fn short_atom_record_is_an_error() {
        let text = "1\nwater\nO 0.0 0.0\n";
        assert!(matches!(
            read_from(Cursor::new(text)).unwrap_err(),
            IoError::Parse {
                line: 3,
                kind: ParseErrorKind::ShortRecord,
            }
        ));
    }
}

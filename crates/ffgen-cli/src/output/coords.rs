use crate::error::{CliError, Result};
use nalgebra::Point3;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the packed coordinates produced by packmol (`simbox.xyz`), in file
/// order: every atom of every molecule copy, species after species.
pub fn read(path: &Path) -> Result<Vec<Point3<f64>>> {
    let file = std::fs::File::open(path).map_err(|e| {
        CliError::Argument(format!(
            "cannot open '{}' ({e}); run packmol on pack.inp first",
            path.display()
        ))
    })?;
    let mut lines = BufReader::new(file).lines();

    let mut next = |what: &str| -> Result<String> {
        lines
            .next()
            .transpose()?
            .ok_or_else(|| CliError::Argument(format!("'{}': missing {what}", path.display())))
    };

    let natom: usize = next("atom count")?
        .trim()
        .parse()
        .map_err(|_| CliError::Argument(format!("'{}': bad atom count", path.display())))?;
    next("title line")?;

    let mut coords = Vec::with_capacity(natom);
    for _ in 0..natom {
        let line = next("atom record")?;
        let tok: Vec<&str> = line.split_whitespace().collect();
        if tok.len() < 4 {
            return Err(CliError::Argument(format!(
                "'{}': short atom record",
                path.display()
            )));
        }
        let parse = |t: &str| -> Result<f64> {
            t.parse().map_err(|_| {
                CliError::Argument(format!("'{}': bad coordinate '{t}'", path.display()))
            })
        };
        coords.push(Point3::new(parse(tok[1])?, parse(tok[2])?, parse(tok[3])?));
    }
    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn reads_coordinates_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("simbox.xyz");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            "2\nbuilt with packmol\nO 0.0 1.0 2.0\nH 3.0 4.0 5.0\n"
        )
        .unwrap();

        let coords = read(&path).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0], Point3::new(0.0, 1.0, 2.0));
        assert_eq!(coords[1], Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn missing_file_explains_the_packing_step() {
        let err = read(Path::new("definitely-missing.xyz")).unwrap_err();
        assert!(err.to_string().contains("packmol"));
    }
}

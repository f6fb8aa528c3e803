use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Observed bond lengths may deviate this much (in Angstroms) from the
/// force-field equilibrium length and still be considered consistent.
pub const BOND_TOLERANCE: f64 = 0.25;
/// Observed angles may deviate this much (in degrees) from the force-field
/// equilibrium angle and still be considered consistent.
pub const ANGLE_TOLERANCE: f64 = 15.0;

#[derive(Debug, Error)]
pub enum ForceFieldError {
    #[error("cannot read force field '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("force field parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ForceFieldParseErrorKind,
    },
    #[error("unknown {category} potential '{kind}' for '{name}': no equilibrium value rule")]
    UnknownPotential {
        category: &'static str,
        kind: String,
        name: String,
    },
}

#[derive(Debug, Error)]
pub enum ForceFieldParseErrorKind {
    #[error("record appears before any section header")]
    RecordOutsideSection,
    #[error("{section} record needs at least {expected} fields (found {found})")]
    TooFewFields {
        section: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid number '{value}'")]
    InvalidNumber { value: String },
}

/// Reference record for one atom type.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// Atom name matched against molecule atom names.
    pub name: String,
    /// Force-field type label used to derive bonded-term names.
    pub type_label: String,
    pub mass: f64,
    pub charge: f64,
    pub kind: String,
    pub params: Vec<f64>,
}

/// Reference record for a bond type, with its derived equilibrium length.
#[derive(Debug, Clone, PartialEq)]
pub struct BondRecord {
    pub labels: [String; 2],
    pub kind: String,
    pub params: Vec<f64>,
    pub eq: f64,
}

impl BondRecord {
    /// Undirected label match.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.labels[0] == a && self.labels[1] == b)
            || (self.labels[0] == b && self.labels[1] == a)
    }

    /// Whether an observed length lies within tolerance of equilibrium.
    pub fn check(&self, r: f64) -> bool {
        (r - self.eq).abs() < BOND_TOLERANCE
    }
}

/// Reference record for an angle type, with its derived equilibrium angle.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleRecord {
    pub labels: [String; 3],
    pub kind: String,
    pub params: Vec<f64>,
    pub eq: f64,
}

impl AngleRecord {
    pub fn matches(&self, a: &str, b: &str, c: &str) -> bool {
        (self.labels[0] == a && self.labels[1] == b && self.labels[2] == c)
            || (self.labels[0] == c && self.labels[1] == b && self.labels[2] == a)
    }

    pub fn check(&self, theta: f64) -> bool {
        (theta - self.eq).abs() < ANGLE_TOLERANCE
    }
}

/// Reference record for a proper or improper dihedral type.
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionRecord {
    pub labels: [String; 4],
    pub kind: String,
    pub params: Vec<f64>,
}

impl TorsionRecord {
    pub fn matches(&self, labels: &[String; 4]) -> bool {
        let fwd = self.labels.iter().zip(labels.iter()).all(|(a, b)| a == b);
        let rev = self
            .labels
            .iter()
            .zip(labels.iter().rev())
            .all(|(a, b)| a == b);
        fwd || rev
    }
}

/// An immutable force-field parameter database, loaded once per file.
#[derive(Debug, Clone, Default)]
pub struct ForceField {
    pub source: PathBuf,
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<BondRecord>,
    pub angles: Vec<AngleRecord>,
    pub dihedrals: Vec<TorsionRecord>,
    pub impropers: Vec<TorsionRecord>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Atoms,
    Bonds,
    Angles,
    Dihedrals,
    Impropers,
}

fn parse_f64(line: usize, token: &str) -> Result<f64, ForceFieldError> {
    token.parse().map_err(|_| ForceFieldError::Parse {
        line,
        kind: ForceFieldParseErrorKind::InvalidNumber {
            value: token.to_string(),
        },
    })
}

fn parse_params(line: usize, tokens: &[&str]) -> Result<Vec<f64>, ForceFieldError> {
    tokens.iter().map(|t| parse_f64(line, t)).collect()
}

fn require_fields(
    line: usize,
    section: &'static str,
    tokens: &[&str],
    expected: usize,
) -> Result<(), ForceFieldError> {
    if tokens.len() < expected {
        return Err(ForceFieldError::Parse {
            line,
            kind: ForceFieldParseErrorKind::TooFewFields {
                section,
                expected,
                found: tokens.len(),
            },
        });
    }
    Ok(())
}

/// Derives the equilibrium value for a bond or angle record. Only the
/// harmonic and constrained kinds define one; anything else is a fatal
/// configuration error.
fn equilibrium_value(
    category: &'static str,
    name: &str,
    kind: &str,
    params: &[f64],
) -> Result<f64, ForceFieldError> {
    match kind {
        "harm" | "cons" => params.first().copied().ok_or_else(|| {
            ForceFieldError::UnknownPotential {
                category,
                kind: format!("{kind} (no parameters)"),
                name: name.to_string(),
            }
        }),
        _ => Err(ForceFieldError::UnknownPotential {
            category,
            kind: kind.to_string(),
            name: name.to_string(),
        }),
    }
}

impl ForceField {
    pub fn load(path: &Path) -> Result<Self, ForceFieldError> {
        let file = std::fs::File::open(path).map_err(|e| ForceFieldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut ff = Self::read_from(&mut io::BufReader::new(file))?;
        ff.source = path.to_path_buf();
        Ok(ff)
    }

    /// Parses the sectioned parameter text: `ATOMS`, `BONDS`, `ANGLES`,
    /// `DIHEDRALS`, `IMPROPER` headers, one whitespace-separated record per
    /// line, `#` comments and blank lines ignored.
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, ForceFieldError> {
        let mut ff = ForceField::default();
        let mut section: Option<Section> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| ForceFieldError::Io {
                path: "<input>".to_string(),
                source: e,
            })?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let lower = trimmed.to_ascii_lowercase();
            if lower.starts_with("atom") {
                section = Some(Section::Atoms);
                continue;
            } else if lower.starts_with("bond") {
                section = Some(Section::Bonds);
                continue;
            } else if lower.starts_with("angl") {
                section = Some(Section::Angles);
                continue;
            } else if lower.starts_with("dihe") {
                section = Some(Section::Dihedrals);
                continue;
            } else if lower.starts_with("impro") {
                section = Some(Section::Impropers);
                continue;
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            let section = section.ok_or(ForceFieldError::Parse {
                line: line_num,
                kind: ForceFieldParseErrorKind::RecordOutsideSection,
            })?;

            match section {
                Section::Atoms => {
                    require_fields(line_num, "atom", &tokens, 5)?;
                    ff.atoms.push(AtomRecord {
                        name: tokens[0].to_string(),
                        type_label: tokens[1].to_string(),
                        mass: parse_f64(line_num, tokens[2])?,
                        charge: parse_f64(line_num, tokens[3])?,
                        kind: tokens[4].to_string(),
                        params: parse_params(line_num, &tokens[5..])?,
                    });
                }
                Section::Bonds => {
                    require_fields(line_num, "bond", &tokens, 3)?;
                    let labels = [tokens[0].to_string(), tokens[1].to_string()];
                    let kind = tokens[2].to_string();
                    let params = parse_params(line_num, &tokens[3..])?;
                    let eq =
                        equilibrium_value("bond", &labels.join("-"), &kind, &params)?;
                    ff.bonds.push(BondRecord {
                        labels,
                        kind,
                        params,
                        eq,
                    });
                }
                Section::Angles => {
                    require_fields(line_num, "angle", &tokens, 4)?;
                    let labels = [
                        tokens[0].to_string(),
                        tokens[1].to_string(),
                        tokens[2].to_string(),
                    ];
                    let kind = tokens[3].to_string();
                    let params = parse_params(line_num, &tokens[4..])?;
                    let eq =
                        equilibrium_value("angle", &labels.join("-"), &kind, &params)?;
                    ff.angles.push(AngleRecord {
                        labels,
                        kind,
                        params,
                        eq,
                    });
                }
                Section::Dihedrals | Section::Impropers => {
                    require_fields(line_num, "dihedral", &tokens, 5)?;
                    let record = TorsionRecord {
                        labels: [
                            tokens[0].to_string(),
                            tokens[1].to_string(),
                            tokens[2].to_string(),
                            tokens[3].to_string(),
                        ],
                        kind: tokens[4].to_string(),
                        params: parse_params(line_num, &tokens[5..])?,
                    };
                    if section == Section::Dihedrals {
                        ff.dihedrals.push(record);
                    } else {
                        ff.impropers.push(record);
                    }
                }
            }
        }

        Ok(ff)
    }
}

/// Memoizes force-field loading per file name. Re-parsing would not be
/// incorrect, only wasteful; every molecule referencing the same file shares
/// one `Arc<ForceField>`.
#[derive(Debug, Default)]
pub struct ForceFieldCache {
    loaded: HashMap<PathBuf, Arc<ForceField>>,
}

impl ForceFieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Result<Arc<ForceField>, ForceFieldError> {
        if let Some(ff) = self.loaded.get(path) {
            return Ok(Arc::clone(ff));
        }
        let ff = Arc::new(ForceField::load(path)?);
        self.loaded.insert(path.to_path_buf(), Arc::clone(&ff));
        Ok(ff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# OPLS-ish fragment
ATOMS
CT  CT  12.011  -0.18  lj  3.50  0.276144
HC  HC   1.008   0.06  lj  2.50  0.125520

BONDS
CT CT  harm  1.529  2242.62
CT HC  cons  1.090  2845.12

ANGLES
CT CT CT  harm  112.7  488.27
HC CT HC  harm  107.8  276.14

DIHEDRALS
CT CT CT CT  opls  5.4392  -0.2092  0.8368  0.0

IMPROPER
CT CT CT HC  opls  0.0  0.0  0.0  0.0
";

    fn parse(text: &str) -> ForceField {
        ForceField::read_from(&mut Cursor::new(text)).unwrap()
    }

    #[test]
    fn parses_all_sections() {
        let ff = parse(SAMPLE);
        assert_eq!(ff.atoms.len(), 2);
        assert_eq!(ff.bonds.len(), 2);
        assert_eq!(ff.angles.len(), 2);
        assert_eq!(ff.dihedrals.len(), 1);
        assert_eq!(ff.impropers.len(), 1);

        let ct = &ff.atoms[0];
        assert_eq!(ct.name, "CT");
        assert_eq!(ct.type_label, "CT");
        assert_eq!(ct.mass, 12.011);
        assert_eq!(ct.charge, -0.18);
        assert_eq!(ct.kind, "lj");
        assert_eq!(ct.params, vec![3.50, 0.276144]);
    }

    #[test]
    fn equilibrium_values_derive_from_first_parameter() {
        let ff = parse(SAMPLE);
        assert_eq!(ff.bonds[0].eq, 1.529);
        assert_eq!(ff.bonds[1].eq, 1.090); // cons derives one too
        assert_eq!(ff.angles[0].eq, 112.7);
    }

    #[test]
    fn bond_record_matches_either_direction() {
        let ff = parse(SAMPLE);
        let hc = &ff.bonds[1];
        assert!(hc.matches("CT", "HC"));
        assert!(hc.matches("HC", "CT"));
        assert!(!hc.matches("CT", "CT"));
    }

    #[test]
    fn angle_record_matches_reversed_labels_only_about_center() {
        let ff = parse(SAMPLE);
        let hch = &ff.angles[1];
        assert!(hch.matches("HC", "CT", "HC"));
        assert!(!hch.matches("CT", "HC", "HC"));
    }

    #[test]
    fn torsion_record_matches_reversed_quadruple() {
        let ff = parse(SAMPLE);
        let imp = &ff.impropers[0];
        let fwd = std::array::from_fn(|i| ["CT", "CT", "CT", "HC"][i].to_string());
        let rev = std::array::from_fn(|i| ["HC", "CT", "CT", "CT"][i].to_string());
        assert!(imp.matches(&fwd));
        assert!(imp.matches(&rev));
    }

    #[test]
    fn tolerance_checks_use_fixed_windows() {
        let ff = parse(SAMPLE);
        let ct_ct = &ff.bonds[0];
        assert!(ct_ct.check(1.529));
        assert!(ct_ct.check(1.529 + 0.24));
        assert!(!ct_ct.check(1.80)); // deviation 0.271 > 0.25

        let angle = &ff.angles[0];
        assert!(angle.check(112.7 + 14.9));
        assert!(!angle.check(112.7 + 15.1));
    }

    #[test]
    fn unknown_bond_potential_is_fatal() {
        let result = ForceField::read_from(&mut Cursor::new(
            "BONDS\nCT CT  morse  1.5  100.0  2.0\n",
        ));
        assert!(matches!(
            result,
            Err(ForceFieldError::UnknownPotential { category: "bond", .. })
        ));
    }

    #[test]
    fn record_before_section_header_is_rejected() {
        let result = ForceField::read_from(&mut Cursor::new("CT CT 12.0 0.0 lj\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::Parse {
                line: 1,
                kind: ForceFieldParseErrorKind::RecordOutsideSection,
            })
        ));
    }

    #[test]
    fn malformed_number_reports_line_and_value() {
        let result =
            ForceField::read_from(&mut Cursor::new("ATOMS\nCT CT twelve 0.0 lj\n"));
        match result {
            Err(ForceFieldError::Parse { line, kind }) => {
                assert_eq!(line, 2);
                assert!(matches!(
                    kind,
                    ForceFieldParseErrorKind::InvalidNumber { value } if value == "twelve"
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn short_record_reports_expected_field_count() {
        let result = ForceField::read_from(&mut Cursor::new("BONDS\nCT CT\n"));
        assert!(matches!(
            result,
            Err(ForceFieldError::Parse {
                line: 2,
                kind: ForceFieldParseErrorKind::TooFewFields { section: "bond", .. },
            })
        ));
    }

    #[test]
    fn cache_shares_one_instance_per_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.ff");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut cache = ForceFieldCache::new();
        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.source, path);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ForceField::load(&dir.path().join("absent.ff"));
        assert!(matches!(result, Err(ForceFieldError::Io { .. })));
    }
}

use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Cross products and reference separations below this norm are treated as
/// degenerate rather than being allowed to propagate NaN positions.
const DEGENERACY_EPS: f64 = 1e-10;

/// One internal-coordinate record: an atom name plus up to three
/// (reference atom, value) pairs. References are zero-based indices into the
/// same record sequence and must point at already-placed atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct ZmatEntry {
    pub name: String,
    /// Bond-length reference and length in Angstroms.
    pub bond: Option<(usize, f64)>,
    /// Bond-angle reference and angle in degrees.
    pub angle: Option<(usize, f64)>,
    /// Dihedral reference and angle in degrees.
    pub dihedral: Option<(usize, f64)>,
}

impl ZmatEntry {
    pub fn first(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bond: None,
            angle: None,
            dihedral: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("atom {index}: internal-coordinate record is missing its {component} reference")]
    MissingReference {
        index: usize,
        component: &'static str,
    },
    #[error("atom {index}: reference atom {reference} is not placed yet")]
    ForwardReference { index: usize, reference: usize },
    #[error("atom {index}: degenerate reference frame (coincident or colinear reference atoms)")]
    DegenerateFrame { index: usize },
}

fn checked_ref(
    index: usize,
    reference: Option<(usize, f64)>,
    component: &'static str,
) -> Result<(usize, f64), GeometryError> {
    let (r, value) = reference.ok_or(GeometryError::MissingReference { index, component })?;
    if r >= index {
        return Err(GeometryError::ForwardReference {
            index,
            reference: r,
        });
    }
    Ok((r, value))
}

/// Reconstructs Cartesian coordinates for an ordered z-matrix.
///
/// Placement rules, by atom ordinal:
/// 1. the first atom sits at the origin;
/// 2. the second atom sits at its bond length from its reference along +x;
/// 3. the third atom stays in the xy plane, at the declared angle from its
///    second reference: the polar angle of the reference-to-reference vector
///    is computed first, and the declared angle subtracted from it;
/// 4. every later atom is located by spherical decomposition of its bond
///    length in the orthonormal frame anchored at its bond reference B,
///    built from the normal of the B-C-D reference plane and the in-plane
///    perpendicular to B-C.
///
/// Deterministic for given inputs. Degenerate frames (coincident references,
/// colinear B-C-D) fail with [`GeometryError::DegenerateFrame`] instead of
/// producing NaN coordinates; angle and dihedral values of exactly 0 or 180
/// degrees are accepted as long as the frame itself is well-formed.
pub fn build_coordinates(entries: &[ZmatEntry]) -> Result<Vec<Point3<f64>>, GeometryError> {
    let mut pos: Vec<Point3<f64>> = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let point = match i {
            0 => Point3::origin(),
            1 => {
                let (b, r) = checked_ref(i, entry.bond, "bond")?;
                pos[b] + Vector3::x() * r
            }
            2 => {
                let (b, r) = checked_ref(i, entry.bond, "bond")?;
                let (a, ang) = checked_ref(i, entry.angle, "angle")?;
                place_in_plane(i, &pos, b, r, a, ang)?
            }
            _ => {
                let (b, r) = checked_ref(i, entry.bond, "bond")?;
                let (a, ang) = checked_ref(i, entry.angle, "angle")?;
                let (d, dih) = checked_ref(i, entry.dihedral, "dihedral")?;
                place_in_frame(i, &pos, b, r, a, ang, d, dih)?
            }
        };
        pos.push(point);
    }

    Ok(pos)
}

/// Third-atom rule: the new atom is at distance `r` from reference `b`,
/// forming angle `ang` with reference `a`, constrained to the xy plane.
fn place_in_plane(
    index: usize,
    pos: &[Point3<f64>],
    b: usize,
    r: f64,
    a: usize,
    ang: f64,
) -> Result<Point3<f64>, GeometryError> {
    let del = pos[a] - pos[b];
    let planar = (del.x * del.x + del.y * del.y).sqrt();
    if planar < DEGENERACY_EPS {
        return Err(GeometryError::DegenerateFrame { index });
    }
    let mut theta = (del.x / planar).clamp(-1.0, 1.0).acos();
    if del.y < 0.0 {
        theta = 2.0 * std::f64::consts::PI - theta;
    }
    let placement = theta - ang.to_radians();
    Ok(pos[b] + Vector3::new(r * placement.cos(), r * placement.sin(), 0.0))
}

/// General rule: spherical decomposition of `r` in the frame anchored at
/// bond reference B, with angle reference C and dihedral reference D.
fn place_in_frame(
    index: usize,
    pos: &[Point3<f64>],
    b: usize,
    r: f64,
    a: usize,
    ang: f64,
    d: usize,
    dih: f64,
) -> Result<Point3<f64>, GeometryError> {
    let (vb, vc, vd) = (pos[b], pos[a], pos[d]);
    let bc = vc - vb;
    let cd = vd - vc;

    let bc_len = bc.norm();
    if bc_len < DEGENERACY_EPS {
        return Err(GeometryError::DegenerateFrame { index });
    }

    let ang = ang.to_radians();
    let dih = dih.to_radians();

    // Components of the new position: along B->C, in the BCD plane
    // perpendicular to B-C, and out of the BCD plane.
    let along = r * ang.cos();
    let in_plane = r * ang.sin() * dih.cos();
    let out_of_plane = r * ang.sin() * dih.sin();

    let normal = cd.cross(&bc);
    if normal.norm() < DEGENERACY_EPS {
        return Err(GeometryError::DegenerateFrame { index });
    }
    let n = normal.normalize();
    let m = bc.cross(&n).normalize();

    // Foot of the projection of the new atom onto the B->C direction.
    let foot = vc - bc * ((bc_len - along) / bc_len);
    Ok(foot + m * in_plane + n * out_of_plane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::measure::{angle_deg, distance};

    const TOLERANCE: f64 = 1e-6;

    fn entry(
        name: &str,
        bond: Option<(usize, f64)>,
        angle: Option<(usize, f64)>,
        dihedral: Option<(usize, f64)>,
    ) -> ZmatEntry {
        ZmatEntry {
            name: name.to_string(),
            bond,
            angle,
            dihedral,
        }
    }

    /// Signed dihedral of the path i-j-k-l, in degrees.
    fn dihedral_deg(
        i: &Point3<f64>,
        j: &Point3<f64>,
        k: &Point3<f64>,
        l: &Point3<f64>,
    ) -> f64 {
        let b1 = j - i;
        let b2 = k - j;
        let b3 = l - k;
        let n1 = b1.cross(&b2);
        let n2 = b2.cross(&b3);
        let m = n1.cross(&b2.normalize());
        m.dot(&n2).atan2(n1.dot(&n2)).to_degrees()
    }

    #[test]
    fn one_and_two_atom_molecules_terminate_early() {
        let pos = build_coordinates(&[ZmatEntry::first("Ar")]).unwrap();
        assert_eq!(pos, vec![Point3::origin()]);

        let pos = build_coordinates(&[
            ZmatEntry::first("N"),
            entry("N1", Some((0, 1.1)), None, None),
        ])
        .unwrap();
        assert_eq!(pos[1], Point3::new(1.1, 0.0, 0.0));
    }

    #[test]
    fn three_atom_placement_round_trips_bond_and_angle() {
        let r = 1.5;
        let theta = 109.5;
        let pos = build_coordinates(&[
            ZmatEntry::first("C1"),
            entry("C2", Some((0, 1.2)), None, None),
            entry("C3", Some((0, r)), Some((1, theta)), None),
        ])
        .unwrap();

        assert!((distance(&pos[0], &pos[2], None) - r).abs() < TOLERANCE);
        let measured = angle_deg(&pos[2], &pos[0], &pos[1], None);
        assert!((measured - theta).abs() < TOLERANCE);
        assert_eq!(pos[2].z, 0.0);
    }

    #[test]
    fn fourth_atom_honors_bond_angle_and_dihedral() {
        let (r, theta, phi) = (1.54, 111.0, 60.0);
        let pos = build_coordinates(&[
            ZmatEntry::first("C1"),
            entry("C2", Some((0, 1.54)), None, None),
            entry("C3", Some((1, 1.54)), Some((0, 111.0)), None),
            entry("C4", Some((2, r)), Some((1, theta)), Some((0, phi))),
        ])
        .unwrap();

        assert!((distance(&pos[2], &pos[3], None) - r).abs() < TOLERANCE);
        let measured_angle = angle_deg(&pos[3], &pos[2], &pos[1], None);
        assert!((measured_angle - theta).abs() < TOLERANCE);
        let measured_dih = dihedral_deg(&pos[3], &pos[2], &pos[1], &pos[0]);
        assert!(
            (measured_dih.abs() - phi).abs() < TOLERANCE,
            "dihedral magnitude {measured_dih} != {phi}"
        );
    }

    #[test]
    fn trans_dihedral_stays_in_plane() {
        let pos = build_coordinates(&[
            ZmatEntry::first("C1"),
            entry("C2", Some((0, 1.5)), None, None),
            entry("C3", Some((1, 1.5)), Some((0, 120.0)), None),
            entry("C4", Some((2, 1.5)), Some((1, 120.0)), Some((0, 180.0))),
        ])
        .unwrap();
        assert!(pos[3].z.abs() < TOLERANCE);
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let entries = vec![
            ZmatEntry::first("O"),
            entry("H1", Some((0, 0.957)), None, None),
            entry("H2", Some((0, 0.957)), Some((1, 104.5)), None),
        ];
        assert_eq!(
            build_coordinates(&entries).unwrap(),
            build_coordinates(&entries).unwrap()
        );
    }

    #[test]
    fn missing_and_forward_references_are_rejected() {
        let err = build_coordinates(&[
            ZmatEntry::first("C"),
            entry("C2", None, None, None),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GeometryError::MissingReference {
                index: 1,
                component: "bond"
            }
        );

        let err = build_coordinates(&[
            ZmatEntry::first("C"),
            entry("C2", Some((1, 1.5)), None, None),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GeometryError::ForwardReference {
                index: 1,
                reference: 1
            }
        );
    }

    #[test]
    fn colinear_reference_chain_is_a_degenerate_frame() {
        // B, C, D all on the x axis: the BCD plane is undefined.
        let err = build_coordinates(&[
            ZmatEntry::first("C1"),
            entry("C2", Some((0, 1.5)), None, None),
            entry("C3", Some((1, 1.5)), Some((0, 180.0)), None),
            entry("C4", Some((2, 1.5)), Some((1, 109.5)), Some((0, 60.0))),
        ])
        .unwrap_err();
        assert_eq!(err, GeometryError::DegenerateFrame { index: 3 });
    }

    #[test]
    fn coincident_in_plane_references_are_degenerate() {
        let err = build_coordinates(&[
            ZmatEntry::first("C1"),
            entry("C2", Some((0, 0.0)), None, None),
            entry("C3", Some((0, 1.5)), Some((1, 109.5)), None),
        ])
        .unwrap_err();
        assert_eq!(err, GeometryError::DegenerateFrame { index: 2 });
    }
}

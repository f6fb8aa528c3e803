use crate::models::cell::Cell;
use nalgebra::{Point3, Vector3};

/// Wraps a displacement into the nearest image for each periodic axis of the
/// cell (minimum-image convention).
fn minimum_image(mut d: Vector3<f64>, cell: &Cell) -> Vector3<f64> {
    if cell.pbc.x {
        d.x -= (d.x / cell.a).round() * cell.a;
    }
    if cell.pbc.y {
        d.y -= (d.y / cell.b).round() * cell.b;
    }
    if cell.pbc.z {
        d.z -= (d.z / cell.c).round() * cell.c;
    }
    d
}

fn displacement(from: &Point3<f64>, to: &Point3<f64>, cell: Option<&Cell>) -> Vector3<f64> {
    let d = to - from;
    match cell {
        Some(cell) => minimum_image(d, cell),
        None => d,
    }
}

/// Distance between two atoms, corrected per periodic axis when a cell is
/// supplied.
pub fn distance(a: &Point3<f64>, b: &Point3<f64>, cell: Option<&Cell>) -> f64 {
    displacement(a, b, cell).norm()
}

/// Angle i-j-k in degrees, centered on `j`. Each of the two bond vectors is
/// wrapped independently when a cell is supplied.
pub fn angle_deg(
    i: &Point3<f64>,
    j: &Point3<f64>,
    k: &Point3<f64>,
    cell: Option<&Cell>,
) -> f64 {
    let ji = displacement(j, i, cell);
    let jk = displacement(j, k, cell);
    let cosine = ji.dot(&jk) / (ji.norm() * jk.norm());
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

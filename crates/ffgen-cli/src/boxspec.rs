use crate::error::{CliError, Result};
use ffgen::models::cell::{Cell, Pbc};

const AVOGADRO: f64 = 6.022e23;

/// Gap left around the packed molecules for cubic boxes, so packmol keeps
/// them away from the faces.
const CUBIC_GAP: f64 = 2.0;

/// Builds the simulation cell from the command-line box specification.
///
/// A single `--box` value gives a cube centered on the origin with a face
/// gap; three comma-separated values give an anchored orthorhombic box with
/// no gap. Without `--box`, the edge of a centered cube is derived from the
/// density in mol/L and the total number of molecules.
pub fn build_cell(
    box_spec: Option<&str>,
    rho: Option<f64>,
    total_molecules: usize,
    pbc: Pbc,
) -> Result<Cell> {
    let cell = if let Some(spec) = box_spec {
        let edges: Vec<&str> = spec.split(',').collect();
        match edges.as_slice() {
            [edge] => Cell::cubic(parse_edge(edge)?, pbc, CUBIC_GAP, true),
            [a, b, c] => Cell::new(
                parse_edge(a)?,
                parse_edge(b)?,
                parse_edge(c)?,
                pbc,
                0.0,
                false,
            ),
            _ => {
                return Err(CliError::Argument(format!(
                    "wrong box length '{spec}', give one edge or a,b,c"
                )));
            }
        }
    } else if let Some(rho) = rho.filter(|r| *r > 0.0) {
        let edge = (total_molecules as f64 / (rho * AVOGADRO * 1.0e-27)).cbrt();
        Cell::cubic(edge, pbc, CUBIC_GAP, true)
    } else {
        return Err(CliError::Argument(
            "supply density or box length".to_string(),
        ));
    };
    cell.map_err(CliError::Model)
}

fn parse_edge(token: &str) -> Result<f64> {
    token
        .trim()
        .parse()
        .map_err(|_| CliError::Argument(format!("invalid box length '{token}'")))
}

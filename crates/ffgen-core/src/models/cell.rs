use super::ModelError;
use std::fmt;
use std::str::FromStr;

/// Which axes of the simulation cell wrap periodically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pbc {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Pbc {
    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }
}

impl FromStr for Pbc {
    type Err = ModelError;

    /// Parses an axis set such as "x", "xy", or "xyz" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pbc = Pbc::default();
        for c in s.chars() {
            match c.to_ascii_lowercase() {
                'x' => pbc.x = true,
                'y' => pbc.y = true,
                'z' => pbc.z = true,
                _ => return Err(ModelError::InvalidPbc(s.to_string())),
            }
        }
        Ok(pbc)
    }
}

impl fmt::Display for Pbc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x {
            write!(f, "x")?;
        }
        if self.y {
            write!(f, "y")?;
        }
        if self.z {
            write!(f, "z")?;
        }
        Ok(())
    }
}

/// An orthorhombic simulation cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Edge lengths in Angstroms.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub pbc: Pbc,
    /// Uniform gap left between molecules and the cell faces when packing.
    /// Forced to zero for periodic cells, where a gap would create a vacuum
    /// slab at the boundary.
    pub gap: f64,
    /// Whether the cell is centered on the origin rather than anchored at it.
    pub center: bool,
}

impl Cell {
    pub fn new(a: f64, b: f64, c: f64, pbc: Pbc, gap: f64, center: bool) -> Result<Self, ModelError> {
        if a <= 0.0 || b <= 0.0 || c <= 0.0 {
            return Err(ModelError::InvalidCell { a, b, c });
        }
        let gap = if pbc.any() { 0.0 } else { gap };
        Ok(Self {
            a,
            b,
            c,
            pbc,
            gap,
            center,
        })
    }

    pub fn cubic(edge: f64, pbc: Pbc, gap: f64, center: bool) -> Result<Self, ModelError> {
        Self::new(edge, edge, edge, pbc, gap, center)
    }

    pub fn volume(&self) -> f64 {
        self.a * self.b * self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbc_parses_axis_combinations() {
        assert_eq!("".parse::<Pbc>().unwrap(), Pbc::default());
        let xy: Pbc = "xy".parse().unwrap();
        assert!(xy.x && xy.y && !xy.z);
        let all: Pbc = "XYZ".parse().unwrap();
        assert!(all.x && all.y && all.z);
        assert!(all.any());
        assert!(!Pbc::default().any());
    }

    #[test]
    fn pbc_rejects_unknown_axes() {
        assert!(matches!(
            "xw".parse::<Pbc>(),
            Err(ModelError::InvalidPbc(_))
        ));
    }

    #[test]
    fn pbc_displays_active_axes() {
        let xz: Pbc = "xz".parse().unwrap();
        assert_eq!(xz.to_string(), "xz");
        assert_eq!(Pbc::default().to_string(), "");
    }

    #[test]
    fn cell_computes_volume() {
        let cell = Cell::new(10.0, 20.0, 30.0, Pbc::default(), 0.0, false).unwrap();
        assert_eq!(cell.volume(), 6000.0);
    }

    #[test]
    fn cell_rejects_non_positive_edges() {
        assert!(matches!(
            Cell::cubic(0.0, Pbc::default(), 0.0, false),
            Err(ModelError::InvalidCell { .. })
        ));
        assert!(matches!(
            Cell::new(10.0, -1.0, 10.0, Pbc::default(), 0.0, false),
            Err(ModelError::InvalidCell { .. })
        ));
    }

    #[test]
    fn periodic_cell_zeroes_the_gap() {
        let pbc: Pbc = "xyz".parse().unwrap();
        let cell = Cell::cubic(25.0, pbc, 2.0, true).unwrap();
        assert_eq!(cell.gap, 0.0);

        let open = Cell::cubic(25.0, Pbc::default(), 2.0, true).unwrap();
        assert_eq!(open.gap, 2.0);
    }
}

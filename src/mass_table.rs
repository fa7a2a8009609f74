// Isotope mass and symbol lookup
//
// Nuclear masses are derived from atomic masses by removing the electron
// masses (binding energies of the electrons are neglected).

use crate::error::{Result, SimError};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Atomic mass unit in MeV
pub const U_TO_MEV: f64 = 931.4940954;
/// Electron mass in atomic mass units
pub const ELECTRON_MASS_U: f64 = 0.000548579909;

/// Element symbols indexed by proton number (index 0 is the neutron).
pub const ELEMENT_SYMBOLS: [&str; 31] = [
    "n", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
];

/// (Z, A, atomic mass in u) for the isotopes compiled into the default table.
const BUILTIN_ATOMIC_MASSES: &[(u32, u32, f64)] = &[
    (0, 1, 1.00866491588),
    (1, 1, 1.00782503207),
    (1, 2, 2.0141017778),
    (1, 3, 3.0160492777),
    (2, 3, 3.0160293191),
    (2, 4, 4.00260325415),
    (2, 5, 5.012057),
    (2, 6, 6.0188891),
    (3, 5, 5.012538),
    (3, 6, 6.015122795),
    (3, 7, 7.01600455),
    (3, 8, 8.02248736),
    (4, 7, 7.01692983),
    (4, 8, 8.00530510),
    (4, 9, 9.0121822),
    (4, 10, 10.0135338),
    (5, 8, 8.0246072),
    (5, 9, 9.0133288),
    (5, 10, 10.0129370),
    (5, 11, 11.0093054),
    (6, 10, 10.0168532),
    (6, 11, 11.0114336),
    (6, 12, 12.0),
    (6, 13, 13.0033548378),
    (6, 14, 14.003241989),
    (7, 13, 13.00573861),
    (7, 14, 14.0030740048),
    (7, 15, 15.0001088982),
    (8, 15, 15.0030656),
    (8, 16, 15.99491461956),
    (8, 17, 16.99913170),
    (8, 18, 17.9991610),
    (9, 17, 17.00209524),
    (9, 18, 18.0009380),
    (9, 19, 18.99840322),
    (10, 19, 19.0018803),
    (10, 20, 19.9924401754),
    (10, 21, 20.99384668),
    (10, 22, 21.991385114),
    (11, 23, 22.9897692809),
    (12, 24, 23.985041700),
    (13, 27, 26.98153863),
    (14, 28, 27.9769265325),
    (18, 40, 39.9623831225),
];

/// Global default table built from the compiled-in isotope list.
pub static MASS_TABLE: Lazy<MassTable> = Lazy::new(MassTable::builtin);

#[derive(Debug, Clone, PartialEq)]
pub struct IsotopeData {
    pub z: u32,
    pub a: u32,
    /// Nuclear ground-state mass in MeV
    pub mass: f64,
    pub symbol: String,
}

/// Lookup table (Z, A) -> ground-state nuclear mass and display symbol.
#[derive(Debug, Clone, Default)]
pub struct MassTable {
    data: HashMap<(u32, u32), IsotopeData>,
}

impl MassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table containing the compiled-in light isotopes.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for &(z, a, atomic_mass) in BUILTIN_ATOMIC_MASSES {
            let symbol = format!("{}{}", a, ELEMENT_SYMBOLS[z as usize]);
            table.insert_atomic_mass(z, a, atomic_mass, symbol);
        }
        table
    }

    /// The process-wide default table.
    pub fn global() -> &'static MassTable {
        &MASS_TABLE
    }

    /// Insert an isotope given its atomic mass in u.
    pub fn insert_atomic_mass(&mut self, z: u32, a: u32, atomic_mass: f64, symbol: String) {
        let mass = (atomic_mass - z as f64 * ELECTRON_MASS_U) * U_TO_MEV;
        self.data.insert((z, a), IsotopeData { z, a, mass, symbol });
    }

    /// Parse an AME-style mass file.
    ///
    /// The first two lines are a header. Every following record is
    /// `<id> <Z> <A> <element> <mass integer part> <mass micro-u part>`.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line_number <= 2 || line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return Err(SimError::MassTable {
                    line: line_number,
                    message: format!("expected 6 fields, found {}", fields.len()),
                });
            }
            let parse_err = |what: &str| SimError::MassTable {
                line: line_number,
                message: format!("could not parse {}", what),
            };
            let z: u32 = fields[1].parse().map_err(|_| parse_err("Z"))?;
            let a: u32 = fields[2].parse().map_err(|_| parse_err("A"))?;
            let big: f64 = fields[4].parse().map_err(|_| parse_err("mass"))?;
            let small: f64 = fields[5].parse().map_err(|_| parse_err("mass fraction"))?;
            let symbol = format!("{}{}", a, fields[3]);
            table.insert_atomic_mass(z, a, big + small * 1e-6, symbol);
        }
        Ok(table)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn find(&self, z: u32, a: u32) -> Option<&IsotopeData> {
        self.data.get(&(z, a))
    }

    /// Nuclear ground-state mass in MeV
    pub fn find_mass(&self, z: u32, a: u32) -> Option<f64> {
        self.find(z, a).map(|d| d.mass)
    }

    pub fn find_symbol(&self, z: u32, a: u32) -> Option<&str> {
        self.find(z, a).map(|d| d.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Run configuration, read from a JSON file
use crate::detectors::{ArraySettings, SmearMode};
use crate::eloss::{Target, TargetElement};
use crate::error::{Result, SimError};
use crate::system::{RxnType, SystemParameters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_threads() -> usize {
    1
}

/// Complete description of a simulation run.
///
/// The reaction chain, the fill gas of the chamber and the detector options
/// are grouped in their own sections. Everything except the chain and the
/// target has a default, so a minimal file only needs `samples`, `target`
/// and `system`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of events to generate
    pub samples: usize,
    /// Number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Base seed; worker `i` uses `seed + i`. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON-lines event file. Nothing is written when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// AME-style mass file replacing the built-in isotope table
    #[serde(default)]
    pub mass_file: Option<PathBuf>,
    pub target: TargetConfig,
    pub system: SystemParameters,
    #[serde(default)]
    pub array: ArrayConfig,
}

/// Fill gas of the chamber, which is also the reaction target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub elements: Vec<TargetElement>,
    /// g/cm^3
    pub density: f64,
}

impl TargetConfig {
    pub fn build(&self) -> Result<Target> {
        Target::new(self.elements.clone(), self.density)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrayConfig {
    #[serde(default)]
    pub dead_channel_map: Option<PathBuf>,
    #[serde(default)]
    pub smearing: SmearMode,
    #[serde(flatten)]
    pub settings: ArraySettings,
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values no run can use. Chain topology is checked later when
    /// the reaction system is built.
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(SimError::Config("samples must be positive".to_string()));
        }
        if self.threads == 0 {
            return Err(SimError::Config("threads must be positive".to_string()));
        }
        if self.target.elements.is_empty() {
            return Err(SimError::Config("target has no elements".to_string()));
        }
        if !(self.target.density > 0.0) {
            return Err(SimError::Config(format!(
                "target density must be positive, got {}",
                self.target.density
            )));
        }

        let system = &self.system;
        let has_reaction = system
            .steps
            .iter()
            .any(|step| step.rxn_type == RxnType::Reaction);
        if has_reaction {
            if !(system.initial_beam_energy > 0.0) {
                return Err(SimError::Config(
                    "initial_beam_energy must be positive for a reaction".to_string(),
                ));
            }
            if !system.sample_beam
                && !(0.0..=system.initial_beam_energy).contains(&system.rxn_beam_energy)
            {
                return Err(SimError::Config(format!(
                    "rxn_beam_energy {} outside [0, {}]",
                    system.rxn_beam_energy, system.initial_beam_energy
                )));
            }
        }

        let settings = &self.array.settings;
        if settings.energy_floor < 0.0 || settings.detection_threshold < 0.0 {
            return Err(SimError::Config("array energies must not be negative".to_string()));
        }
        if !(settings.silicon_thickness > 0.0) {
            return Err(SimError::Config("silicon_thickness must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "samples": 1000,
        "target": {
            "elements": [{"z": 2, "a": 4, "stoichiometry": 1}],
            "density": 0.00016
        },
        "system": {
            "initial_beam_energy": 12.0,
            "rxn_beam_energy": 10.0,
            "steps": [{"rxn_type": "Reaction", "z": [6, 1, 1], "a": [12, 2, 1]}]
        }
    }"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.samples, 1000);
        assert_eq!(config.threads, 1);
        assert_eq!(config.seed, None);
        assert!(config.output.is_none());
        assert_eq!(config.array.smearing, SmearMode::Smeared);
        assert_eq!(config.array.settings, ArraySettings::default());
        assert!(config.array.dead_channel_map.is_none());
        assert!(config.target.build().is_ok());
    }

    #[test]
    fn test_array_section() {
        let text = MINIMAL.replacen(
            "\"samples\": 1000,",
            "\"samples\": 10, \"array\": {\"smearing\": \"fixed\", \"detection_threshold\": 1.5, \"dead_channel_map\": \"dead.txt\"},",
            1,
        );
        let config = Config::from_json_str(&text).unwrap();
        assert_eq!(config.array.smearing, SmearMode::Fixed);
        assert_eq!(config.array.settings.detection_threshold, 1.5);
        assert_eq!(config.array.settings.energy_floor, 0.6);
        assert_eq!(config.array.dead_channel_map, Some(PathBuf::from("dead.txt")));
    }

    #[test]
    fn test_invalid_values() {
        let zero = MINIMAL.replacen("\"samples\": 1000", "\"samples\": 0", 1);
        assert!(matches!(Config::from_json_str(&zero), Err(SimError::Config(_))));

        let above = MINIMAL.replacen("\"rxn_beam_energy\": 10.0", "\"rxn_beam_energy\": 13.0", 1);
        assert!(matches!(Config::from_json_str(&above), Err(SimError::Config(_))));

        let density = MINIMAL.replacen("0.00016", "-1.0", 1);
        assert!(matches!(Config::from_json_str(&density), Err(SimError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Config::from_json_str("{"), Err(SimError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/anasim.json"),
            Err(SimError::Io(_))
        ));
    }
}

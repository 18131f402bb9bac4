// floortrack_sim/src/config.rs

//! Scenario files: everything one simulated walk needs.
//!
//! A scenario is resolved in three layers, later ones winning:
//! built-in defaults, the scenario TOML, then `FLOORTRACK_` environment
//! variables (`FLOORTRACK_ENGINE__ALPHA=0.6`, `FLOORTRACK_SIMULATION__SEED=7`).

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use floortrack_core::prelude::{EngineConfig, MapId, RouteTag};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub simulation: Simulation,
    pub engine: EngineConfig,
    pub map: MapConfig,
    pub sensors: SensorNoise,
    /// The scripted walk, performed leg by leg.
    #[serde(rename = "leg")]
    pub legs: Vec<WalkLeg>,
}

// =========================================================================
// == Sections ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    pub name: String,
    /// Seed for the noise generator. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Accelerometer/magnetometer rate in Hz.
    pub sample_rate_hz: f32,
    /// GPS fix rate in Hz, only used in GPS mode.
    pub gps_rate_hz: f32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            seed: None,
            sample_rate_hz: 50.0,
            gps_rate_hz: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub id: String,
    /// Pixel the user taps to start the route.
    pub anchor: [f32; 2],
    /// Latitude/longitude of the anchor, in degrees.
    pub anchor_geo: Option<[f64; 2]>,
    /// Quality code stamped on every appended point.
    pub route_tag: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            id: "floor-1".to_string(),
            anchor: [0.0, 0.0],
            anchor_geo: None,
            route_tag: RouteTag::Untagged.code(),
        }
    }
}

impl MapConfig {
    pub fn map_id(&self) -> MapId {
        MapId::new(self.id.clone())
    }

    pub fn anchor_geo(&self) -> Option<(f64, f64)> {
        self.anchor_geo.map(|[lat, lon]| (lat, lon))
    }
}

/// The simulated handset: its gravity and field readings and their noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorNoise {
    /// Vertical accelerometer reading when lying flat, in m/s^2.
    pub gravity: f32,
    /// Horizontal strength of the Earth's field, in uT.
    pub field_horizontal: f32,
    /// Vertical strength of the Earth's field, in uT (negative points down
    /// through the screen on the northern hemisphere).
    pub field_vertical: f32,
    pub accel_noise_stddev: [f32; 3],
    pub mag_noise_stddev: [f32; 3],
    /// Horizontal GPS error, in metres.
    pub gps_noise_stddev_m: f64,
}

impl Default for SensorNoise {
    fn default() -> Self {
        Self {
            gravity: 9.9,
            field_horizontal: 22.0,
            field_vertical: -40.0,
            accel_noise_stddev: [0.05, 0.05, 0.02],
            mag_noise_stddev: [0.3, 0.3, 0.3],
            gps_noise_stddev_m: 0.0,
        }
    }
}

/// One straight segment of the walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkLeg {
    /// Compass heading in degrees, 0 = magnetic north, 90 = east.
    pub heading_degrees: f32,
    pub duration_seconds: f32,
    /// Horizontal acceleration the walker's gait produces.
    pub stride_accel: f32,
    /// Ground speed used for the GPS track, in m/s.
    pub speed_mps: f64,
    /// Pitch of the handset. Anything far from 0 fails the flatness gate.
    pub tilt_degrees: f32,
}

impl Default for WalkLeg {
    fn default() -> Self {
        Self {
            heading_degrees: 0.0,
            duration_seconds: 5.0,
            stride_accel: 2.0,
            speed_mps: 1.2,
            tilt_degrees: 0.0,
        }
    }
}

impl WalkLeg {
    pub fn is_walking(&self) -> bool {
        self.stride_accel > 0.0
    }
}

impl ScenarioConfig {
    /// A short square walk that exercises all four cardinal sectors.
    pub fn demo() -> Self {
        let leg = |heading_degrees| WalkLeg {
            heading_degrees,
            ..Default::default()
        };
        Self {
            simulation: Simulation {
                name: "square".to_string(),
                seed: Some(42),
                ..Default::default()
            },
            map: MapConfig {
                anchor: [400.0, 300.0],
                ..Default::default()
            },
            legs: vec![leg(0.0), leg(90.0), leg(180.0), leg(-90.0)],
            ..Default::default()
        }
    }

    pub fn total_duration(&self) -> f32 {
        self.legs.iter().map(|leg| leg.duration_seconds.max(0.0)).sum()
    }

    /// Checks everything the generator and the engine would otherwise
    /// trip over mid-run.
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .context("invalid [engine] section")?;
        ensure!(
            self.simulation.sample_rate_hz.is_finite() && self.simulation.sample_rate_hz > 0.0,
            "simulation.sample_rate_hz must be positive, got {}",
            self.simulation.sample_rate_hz
        );
        ensure!(
            self.simulation.gps_rate_hz.is_finite() && self.simulation.gps_rate_hz > 0.0,
            "simulation.gps_rate_hz must be positive, got {}",
            self.simulation.gps_rate_hz
        );
        ensure!(!self.map.id.is_empty(), "map.id must not be empty");
        for (i, leg) in self.legs.iter().enumerate() {
            ensure!(
                leg.duration_seconds.is_finite() && leg.duration_seconds >= 0.0,
                "leg {i}: duration_seconds must be non-negative"
            );
        }
        if self.legs.is_empty() {
            warn!(scenario = %self.simulation.name, "scenario has no legs");
        }
        Ok(())
    }
}

// =========================================================================
// == Loading ==
// =========================================================================

/// Resolves one scenario file against the defaults and the environment.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    ensure!(path.is_file(), "scenario file not found: {}", path.display());
    info!("Loading scenario from: {}", path.display());

    let scenario: ScenarioConfig = Figment::from(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLOORTRACK_").split("__"))
        .extract()
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;
    scenario.validate()?;

    debug!(
        name = %scenario.simulation.name,
        legs = scenario.legs.len(),
        duration = scenario.total_duration(),
        "scenario resolved"
    );
    Ok(scenario)
}

/// A single file, or every `*.toml` below a directory in path order.
pub fn discover_scenarios(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    ensure!(path.is_dir(), "no scenario file or directory at {}", path.display());

    let mut found: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
        })
        .map(|e| e.into_path())
        .collect();
    found.sort();

    if found.is_empty() {
        warn!("No scenarios found under {:?}", path);
    }
    Ok(found)
}

/// Writes the demo scenario as TOML so users have something to edit.
pub fn write_demo_scenario(path: &Path) -> Result<()> {
    let text = toml::to_string_pretty(&ScenarioConfig::demo())
        .context("failed to render demo scenario")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote demo scenario to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floortrack_core::prelude::{PositioningMode, StrategyKind};

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        std::fs::write(
            &path,
            r#"
[simulation]
name = "corridor"
seed = 3

[engine]
strategy = "continuous"

[map]
id = "level-2"
anchor = [10.0, 20.0]

[[leg]]
heading_degrees = 90.0
duration_seconds = 2.0
"#,
        )
        .unwrap();

        let scenario = load_scenario(&path).unwrap();
        assert_eq!(scenario.simulation.name, "corridor");
        assert_eq!(scenario.simulation.seed, Some(3));
        assert_eq!(scenario.simulation.sample_rate_hz, 50.0);
        assert_eq!(scenario.engine.strategy, StrategyKind::Continuous);
        assert_eq!(scenario.engine.mode, PositioningMode::Inertial);
        assert_eq!(scenario.engine.delta_move, 1.5);
        assert_eq!(scenario.map.map_id(), MapId::from("level-2"));
        assert_eq!(scenario.legs.len(), 1);
        assert_eq!(scenario.legs[0].stride_accel, 2.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        std::fs::write(&path, "[engine]\nalpah = 0.5\n").unwrap();
        assert!(load_scenario(&path).is_err());
    }

    #[test]
    fn invalid_engine_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[engine]\nalpha = 1.5\n").unwrap();
        let err = load_scenario(&path).unwrap_err();
        assert!(format!("{err:#}").contains("alpha"));
    }

    #[test]
    fn demo_scenario_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/demo.toml");
        write_demo_scenario(&path).unwrap();
        assert_eq!(load_scenario(&path).unwrap(), ScenarioConfig::demo());
    }

    #[test]
    fn directories_are_walked_for_toml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/two.toml"), "").unwrap();
        std::fs::write(dir.path().join("a.toml"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = discover_scenarios(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.toml"), dir.path().join("b/two.toml")]
        );
    }
}

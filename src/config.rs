//! Presentation parameters for a particle field.
//!
//! Every constant the engine uses lives in [`FieldConfig`]. Two profiles are
//! provided:
//!
//! - [`FieldConfig::fluid`] (the default): variable particle radius, speed
//!   scaled by radius, mass-weighted pointer repulsion.
//! - [`FieldConfig::simple`]: fixed radius, uniform mass, unscaled speed.
//!
//! Both profiles break links that pass near the pointer.
//!
//! # Example
//!
//! ```
//! use pfe::FieldConfig;
//!
//! let config = FieldConfig::fluid()
//!     .with_link_distance(120.0)
//!     .with_density(30_000.0)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Configurations can also be read from JSON; missing fields keep their
//! defaults:
//!
//! ```
//! use pfe::FieldConfig;
//!
//! let config = FieldConfig::from_json_str(r#"{ "link_distance": 90.0 }"#).unwrap();
//! assert_eq!(config.link_distance, 90.0);
//! assert_eq!(config.density, 24_000.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::surface::Color;

/// How a particle's radius scales the pointer repulsion it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassModel {
    /// Every particle is displaced by the same amount.
    Uniform,
    /// Displacement scales with `min_radius / radius`, so larger particles
    /// move less.
    #[default]
    InverseRadius,
}

/// Configuration for one particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Maximum separation at which two particles are linked.
    pub link_distance: f32,
    /// Link opacity at zero separation.
    pub link_opacity: f32,
    /// Link stroke width in logical units.
    pub link_width: f32,
    /// Base per-frame speed of a freshly spawned particle.
    pub base_speed: f32,
    /// Uniform jitter added to each velocity component at spawn.
    pub speed_jitter: f32,
    /// Scale spawn speed by `mean_radius / radius`.
    pub speed_by_radius: bool,
    /// Density divisor: logical area per particle.
    pub density: f32,
    /// Lower bound for the population, if any.
    pub min_particles: Option<usize>,
    /// Upper bound for the population, if any.
    pub max_particles: Option<usize>,
    /// Particle radius range (min, max). Equal bounds give a fixed radius.
    pub radius_range: (f32, f32),
    /// Particle fill opacity range (min, max).
    pub alpha_range: (f32, f32),
    /// Pointer repulsion radius.
    pub pointer_radius: f32,
    /// Links passing within this distance of the pointer are not drawn.
    pub break_radius: Option<f32>,
    /// Enable pointer repulsion.
    pub repel: bool,
    /// Displacement applied at zero distance from the pointer.
    pub repel_strength: f32,
    /// How radius weights the repulsion.
    pub mass: MassModel,
    /// Particle and link colour. Alpha is supplied per draw call.
    pub color: Color,
    /// Clear colour used by hosts that own the whole window.
    pub background: Color,
    /// Cap on the device pixel ratio used for the backing store.
    pub max_pixel_ratio: f32,
    /// RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::fluid()
    }
}

impl FieldConfig {
    /// Variable-radius profile with mass-weighted repulsion.
    pub fn fluid() -> Self {
        Self {
            link_distance: 140.0,
            link_opacity: 0.5,
            link_width: 1.0,
            base_speed: 0.4,
            speed_jitter: 0.1,
            speed_by_radius: true,
            density: 24_000.0,
            min_particles: Some(56),
            max_particles: Some(180),
            radius_range: (1.2, 3.4),
            alpha_range: (0.38, 0.9),
            pointer_radius: 110.0,
            break_radius: Some(52.0),
            repel: true,
            repel_strength: 1.8,
            mass: MassModel::InverseRadius,
            color: Color::WHITE,
            background: Color::rgb(0.043, 0.059, 0.102),
            max_pixel_ratio: 2.0,
            seed: None,
        }
    }

    /// Fixed-radius profile: every particle has radius 2 and receives the
    /// same repulsion.
    pub fn simple() -> Self {
        Self {
            radius_range: (2.0, 2.0),
            speed_by_radius: false,
            mass: MassModel::Uniform,
            ..Self::fluid()
        }
    }

    /// Look up a profile by name (`"fluid"` or `"simple"`).
    pub fn profile(name: &str) -> Option<Self> {
        match name {
            "fluid" => Some(Self::fluid()),
            "simple" => Some(Self::simple()),
            _ => None,
        }
    }

    pub fn with_link_distance(mut self, distance: f32) -> Self {
        self.link_distance = distance;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set the population clamp. `None` leaves that side unbounded.
    pub fn with_population_bounds(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_particles = min;
        self.max_particles = max;
        self
    }

    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.radius_range = (min, max);
        self
    }

    pub fn with_base_speed(mut self, speed: f32) -> Self {
        self.base_speed = speed;
        self
    }

    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius;
        self
    }

    pub fn with_break_radius(mut self, radius: Option<f32>) -> Self {
        self.break_radius = radius;
        self
    }

    pub fn with_repel(mut self, repel: bool) -> Self {
        self.repel = repel;
        self
    }

    pub fn with_mass(mut self, mass: MassModel) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Target population for a container of the given logical area.
    ///
    /// `round(area / density)`, clamped to the configured bounds.
    pub fn target_population(&self, area: f32) -> usize {
        let raw = if self.density > 0.0 && area > 0.0 {
            (area / self.density).round() as usize
        } else {
            0
        };
        let raw = match self.max_particles {
            Some(max) => raw.min(max),
            None => raw,
        };
        match self.min_particles {
            Some(min) => raw.max(min),
            None => raw,
        }
    }

    /// Mean of the radius range.
    pub fn mean_radius(&self) -> f32 {
        (self.radius_range.0 + self.radius_range.1) * 0.5
    }

    /// Reject parameter combinations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        positive("density", self.density)?;
        positive("link_distance", self.link_distance)?;
        positive("pointer_radius", self.pointer_radius)?;
        positive("radius_range.0", self.radius_range.0)?;

        if self.radius_range.1 < self.radius_range.0 {
            return Err(ConfigError::Invalid(format!(
                "radius_range is inverted: {:?}",
                self.radius_range
            )));
        }
        let (a0, a1) = self.alpha_range;
        if !(0.0..=1.0).contains(&a0) || !(0.0..=1.0).contains(&a1) || a1 < a0 {
            return Err(ConfigError::Invalid(format!(
                "alpha_range must be an ordered pair within 0..=1, got {:?}",
                self.alpha_range
            )));
        }
        if let Some(radius) = self.break_radius {
            if !(radius >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "break_radius must not be negative, got {radius}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_particles, self.max_particles) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "min_particles ({min}) exceeds max_particles ({max})"
                )));
            }
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_pixel_ratio must be at least 1, got {}",
                self.max_pixel_ratio
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

//! Gravity and atmosphere sources.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Exponential atmosphere around a celestial source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Altitude above the surface where the atmosphere ends.
    pub limit_altitude: f64,
    /// Air density at zero altitude.
    pub surface_density: f64,
    /// Altitude over which density falls by a factor of e.
    pub scale_height: f64,
}

impl Atmosphere {
    /// Air density at `altitude`, or `None` outside `[0, limit_altitude]`.
    pub fn density_at(&self, altitude: f64) -> Option<f64> {
        if !(0.0..=self.limit_altitude).contains(&altitude) {
            return None;
        }
        if self.scale_height <= 0.0 {
            return Some(0.0);
        }
        Some(self.surface_density * (-altitude.max(0.0) / self.scale_height).exp())
    }
}

/// A static source of gravity and, optionally, atmosphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialSource {
    pub id: String,
    pub mass: f64,
    pub position: DVec2,
    /// Gravity is ignored beyond this distance.
    pub gravity_radius: f64,
    /// Physical radius, used for altitude.
    pub radius: Option<f64>,
    pub atmosphere: Option<Atmosphere>,
}

impl CelestialSource {
    pub fn new(id: impl Into<String>, mass: f64, position: DVec2, gravity_radius: f64) -> Self {
        Self {
            id: id.into(),
            mass,
            position,
            gravity_radius,
            radius: None,
            atmosphere: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_atmosphere(mut self, atmosphere: Atmosphere) -> Self {
        self.atmosphere = Some(atmosphere);
        self
    }

    pub fn has_atmosphere(&self) -> bool {
        self.atmosphere.is_some()
    }

    /// Height of `point` above the physical surface.
    pub fn altitude_of(&self, point: DVec2) -> f64 {
        (point - self.position).length() - self.radius.unwrap_or(0.0)
    }
}

/// Air at a body's location, resolved against the active atmosphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirSample {
    pub altitude: f64,
    pub density: f64,
}

/// The source list for one simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CelestialRegistry {
    sources: Vec<CelestialSource>,
}

impl CelestialRegistry {
    pub fn new(sources: Vec<CelestialSource>) -> Self {
        Self { sources }
    }

    /// Replace the whole list.
    pub fn replace(&mut self, sources: Vec<CelestialSource>) {
        self.sources = sources;
    }

    pub fn sources(&self) -> &[CelestialSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The source whose atmosphere drives drag and heating. Only the first
    /// atmosphere-bearing source is considered.
    pub fn atmosphere_source(&self) -> Option<(&CelestialSource, &Atmosphere)> {
        self.sources
            .iter()
            .find_map(|s| s.atmosphere.as_ref().map(|a| (s, a)))
    }

    /// Air density at `point`, if it lies inside the active atmosphere.
    pub fn sample_air(&self, point: DVec2) -> Option<AirSample> {
        let (source, atmosphere) = self.atmosphere_source()?;
        let altitude = source.altitude_of(point);
        atmosphere
            .density_at(altitude)
            .map(|density| AirSample { altitude, density })
    }
}

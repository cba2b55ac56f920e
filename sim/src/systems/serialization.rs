//! Serialization utilities for engine state.
//!
//! serde_json is built with `float_roundtrip`, so every `f64` decodes to the
//! exact value that was encoded.

use crate::world::EngineState;

/// Serialize a state to JSON bytes.
pub fn state_to_json(state: &EngineState) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(state)
}

/// Serialize a state to a JSON string.
pub fn state_to_json_string(state: &EngineState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Serialize a state to indented JSON, for golden files and debugging.
pub fn state_to_json_pretty(state: &EngineState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(state)
}

/// Deserialize a state from JSON bytes.
pub fn state_from_json(data: &[u8]) -> Result<EngineState, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a state from a JSON string.
pub fn state_from_json_string(data: &str) -> Result<EngineState, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::{Atmosphere, CelestialSource};
    use crate::components::*;
    use crate::render::RenderDescriptor;
    use crate::world::{BodyState, STATE_FORMAT_VERSION};
    use glam::DVec2;

    fn sample_state() -> EngineState {
        let position = DVec2::new(0.1 + 0.2, -1.0 / 3.0);
        let mut kinematics = Kinematics::at(position, std::f64::consts::PI / 7.0);
        kinematics.velocity = DVec2::new(1e-17, 123456.789012345);
        kinematics.last_delta_ms = 16.67;

        EngineState {
            format_version: STATE_FORMAT_VERSION,
            tick: 42,
            fixed_timestep_ms: 16.67,
            accumulator_ms: 10.0 / 3.0,
            gravitational_constant: 0.001,
            next_body_id: 4,
            celestial_sources: vec![CelestialSource::new("earth", 5.0e6, DVec2::ZERO, 1.0e5)
                .with_radius(600.0)
                .with_atmosphere(Atmosphere {
                    limit_altitude: 140.0,
                    surface_density: 1.225,
                    scale_height: 8.5,
                })],
            bodies: vec![BodyState {
                id: 3,
                label: "probe".to_string(),
                creation: Some(CreationDescriptor::Polygon {
                    vertices: vec![
                        DVec2::new(0.0, 0.0),
                        DVec2::new(2.0, 0.0),
                        DVec2::new(1.0, 1.5),
                    ],
                }),
                kinematics,
                force: AppliedForce {
                    force: DVec2::new(0.5, -0.25),
                    torque: 1.0 / 7.0,
                },
                mass: MassProperties::new(1.5, 0.7, 0.001, 1500.0),
                material: Material::default(),
                flags: BodyFlags::default(),
                collision_filter: CollisionFilter::default(),
                render: RenderDescriptor::default(),
                aero: AeroProfile::new(Some(0.8), None),
            }],
        }
    }

    #[test]
    fn test_state_roundtrip_is_exact() {
        let state = sample_state();

        let json = state_to_json_string(&state).unwrap();
        assert_eq!(state_from_json_string(&json).unwrap(), state);

        let bytes = state_to_json(&state).unwrap();
        assert_eq!(state_from_json(&bytes).unwrap(), state);

        let pretty = state_to_json_pretty(&state).unwrap();
        assert_eq!(state_from_json_string(&pretty).unwrap(), state);
    }

    #[test]
    fn test_unknown_shape_tag_still_parses() {
        let mut value = serde_json::to_value(sample_state()).unwrap();
        value["bodies"][0]["creation"] = serde_json::json!({ "type": "Torus", "radius": 4.0 });

        let state = state_from_json_string(&value.to_string()).unwrap();
        assert_eq!(state.bodies[0].creation, Some(CreationDescriptor::Unknown));
    }
}

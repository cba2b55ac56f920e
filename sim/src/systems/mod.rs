//! ECS systems for the physics core.
//!
//! ## Sub-step Order
//!
//! Every sub-step runs two schedules back to back:
//!
//! **Forces** (owned by the engine, chained):
//! - `gravity_system` - pulls bodies toward celestial sources
//! - `atmosphere_system` - drag and heat flux
//!
//! **Integration** (owned by the backend):
//! - `integration_system` - advances bodies and clears forces
//!
//! Forces never observe a half-integrated world.

pub mod atmosphere;
pub mod forces;
pub mod gravity;
pub mod integration;
pub mod serialization;

pub use atmosphere::*;
pub use forces::*;
pub use gravity::*;
pub use integration::*;
pub use serialization::*;

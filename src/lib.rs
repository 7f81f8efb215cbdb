//! # sylva
//!
//! Procedural plant growth from stochastic L-System grammars.
//!
//! A [`Plant`] rewrites its grammar string once per generation, keeps one
//! [`Branch`] record per bracket in sync with the string, and grows each new
//! branch into a 3D polyline with a stochastic space-colonisation step biased
//! by phototropism and gravitropism. Old enough branches get leaves scattered
//! on their bark. The output (node polylines, [`BranchSegment`]s and leaves) is
//! engine-agnostic and can be fed to any renderer, physics engine or spatial
//! index.
//!
//! ```
//! use rand::{SeedableRng, rngs::StdRng};
//! use std::sync::Arc;
//! use sylva::{Environment, Plant, PlantBlueprint};
//!
//! let blueprint = Arc::new(PlantBlueprint::generic_tree());
//! let mut plant = Plant::new(blueprint, glam::Vec3::ZERO);
//! let mut rng = StdRng::seed_from_u64(7);
//! while !plant.is_mature() {
//!     plant.update(&Environment::default(), &mut rng);
//! }
//! assert_eq!(plant.branches().len(), sylva::count_branches(plant.symbols()));
//! ```

pub mod blueprint;
pub mod branch;
pub mod decay;
pub mod error;
pub mod garden;
pub mod grammar;
pub mod growth;
pub mod leaves;
pub mod plant;
pub mod segment;
pub mod turtle;

pub use blueprint::*;
pub use branch::*;
pub use decay::*;
pub use error::*;
pub use garden::*;
pub use grammar::*;
pub use growth::*;
pub use leaves::*;
pub use plant::*;
pub use segment::*;
pub use turtle::*;

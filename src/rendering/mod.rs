/// Rendering for the tabletop scene
///
/// This module holds the lit material and its shader binding.

pub mod material;

pub use material::*;

//! Vertex data handed to the streaming backend.
//!
//! This module provides:
//!
//! - [`VertexAttribs`] - Set of vertex channels a draw reads
//! - [`Mesh`] - Transient view over caller-owned vertex data
//! - [`VertexLayout`] - Attribute mask resolved to hardware slots
//! - [`VertexFormat`] - Interleaved byte layout of a vertex buffer
//! - Element list helpers for quads, triangle fans and re-indexing

mod attribs;
mod data;
pub mod elements;
mod layout;

pub use attribs::{
    AttribSlot, VertexAttribs, LIGHTMAP_COORD_SLOTS, LIGHTMAP_LAYER_GROUPS, MAX_LIGHTMAPS,
};
pub use data::{InstancePoint, Mesh};
pub use layout::{AliasedSlots, AttribPointer, AttribType, VertexFormat, VertexLayout};
pub(crate) use layout::quad_sprite_points;

//! Caller-owned mesh views and per-instance transforms.
//!
//! A [`Mesh`] borrows vertex channels from the caller for the duration of a
//! single batch or upload call; the backend never retains it. Vertex count is
//! the number of positions and every other channel is only used when it holds
//! at least that many entries.

use bytemuck::{Pod, Zeroable};

use super::attribs::{LIGHTMAP_LAYER_GROUPS, MAX_LIGHTMAPS};

/// Per-instance transform: rotation quaternion plus origin and uniform scale.
///
/// Uploaded verbatim into a stream's instance region or pushed as uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct InstancePoint {
    /// Rotation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    /// Origin in xyz, scale in w.
    pub origin_scale: [f32; 4],
}

static_assertions::assert_eq_size!(InstancePoint, [u8; 32]);

impl InstancePoint {
    /// Size of one instance in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create an instance from a quaternion, origin and scale.
    pub fn new(rotation: [f32; 4], origin: [f32; 3], scale: f32) -> Self {
        Self {
            rotation,
            origin_scale: [origin[0], origin[1], origin[2], scale],
        }
    }

    /// Identity rotation at `origin` with unit scale.
    pub fn at(origin: [f32; 3]) -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], origin, 1.0)
    }
}

/// Transient view over caller-owned vertex data.
///
/// # Example
///
/// ```ignore
/// let mesh = Mesh::new(&positions)
///     .with_texcoords(&texcoords)
///     .with_color(0, &colors)
///     .with_elems(&indices);
/// backend.batch_mesh(&mesh);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Mesh<'a> {
    pub positions: &'a [[f32; 4]],
    pub normals: Option<&'a [[f32; 4]]>,
    pub svectors: Option<&'a [[f32; 4]]>,
    pub texcoords: Option<&'a [[f32; 2]]>,
    pub lm_texcoords: [Option<&'a [[f32; 2]]>; MAX_LIGHTMAPS],
    pub lm_layers: [Option<&'a [[u8; 4]]>; LIGHTMAP_LAYER_GROUPS],
    pub colors: [Option<&'a [[u8; 4]]>; MAX_LIGHTMAPS],
    pub sprite_points: Option<&'a [[f32; 4]]>,
    pub bone_indices: Option<&'a [[u8; 4]]>,
    pub bone_weights: Option<&'a [[u8; 4]]>,
    pub elems: Option<&'a [u16]>,
}

impl<'a> Mesh<'a> {
    /// Create a mesh view with positions only.
    pub fn new(positions: &'a [[f32; 4]]) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: &'a [[f32; 4]]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_svectors(mut self, svectors: &'a [[f32; 4]]) -> Self {
        self.svectors = Some(svectors);
        self
    }

    pub fn with_texcoords(mut self, texcoords: &'a [[f32; 2]]) -> Self {
        self.texcoords = Some(texcoords);
        self
    }

    /// Set the texture coordinates of lightmap `index`.
    pub fn with_lightmap(mut self, index: usize, coords: &'a [[f32; 2]]) -> Self {
        if let Some(slot) = self.lm_texcoords.get_mut(index) {
            *slot = Some(coords);
        }
        self
    }

    /// Set the lightmap array layers of group `index` (lightmaps `4*index..4*index+4`).
    pub fn with_lightmap_layers(mut self, index: usize, layers: &'a [[u8; 4]]) -> Self {
        if let Some(slot) = self.lm_layers.get_mut(index) {
            *slot = Some(layers);
        }
        self
    }

    /// Set color channel `index`.
    pub fn with_color(mut self, index: usize, colors: &'a [[u8; 4]]) -> Self {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = Some(colors);
        }
        self
    }

    pub fn with_sprite_points(mut self, points: &'a [[f32; 4]]) -> Self {
        self.sprite_points = Some(points);
        self
    }

    /// Set bone indices and weights for skinned meshes.
    pub fn with_bones(mut self, indices: &'a [[u8; 4]], weights: &'a [[u8; 4]]) -> Self {
        self.bone_indices = Some(indices);
        self.bone_weights = Some(weights);
        self
    }

    pub fn with_elems(mut self, elems: &'a [u16]) -> Self {
        self.elems = Some(elems);
        self
    }

    /// Number of vertices.
    pub fn num_verts(&self) -> usize {
        self.positions.len()
    }

    /// Number of explicit elements (0 when the mesh has no index list).
    pub fn num_elems(&self) -> usize {
        self.elems.map_or(0, <[u16]>::len)
    }

    /// Channel `data` if it covers every vertex.
    fn channel<T>(&self, data: Option<&'a [T]>) -> Option<&'a [T]> {
        let nv = self.num_verts();
        data.filter(|d| d.len() >= nv).map(|d| &d[..nv])
    }

    pub fn normals(&self) -> Option<&'a [[f32; 4]]> {
        self.channel(self.normals)
    }

    pub fn svectors(&self) -> Option<&'a [[f32; 4]]> {
        self.channel(self.svectors)
    }

    pub fn texcoords(&self) -> Option<&'a [[f32; 2]]> {
        self.channel(self.texcoords)
    }

    pub fn lightmap(&self, index: usize) -> Option<&'a [[f32; 2]]> {
        self.channel(self.lm_texcoords.get(index).copied().flatten())
    }

    pub fn lightmap_layers(&self, index: usize) -> Option<&'a [[u8; 4]]> {
        self.channel(self.lm_layers.get(index).copied().flatten())
    }

    pub fn color(&self, index: usize) -> Option<&'a [[u8; 4]]> {
        self.channel(self.colors.get(index).copied().flatten())
    }

    pub fn sprite_points(&self) -> Option<&'a [[f32; 4]]> {
        self.channel(self.sprite_points)
    }

    pub fn bone_indices(&self) -> Option<&'a [[u8; 4]]> {
        self.channel(self.bone_indices)
    }

    pub fn bone_weights(&self) -> Option<&'a [[u8; 4]]> {
        self.channel(self.bone_weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let positions = [[0.0; 4]; 6];
        let elems = [0u16, 1, 2, 3, 4, 5];
        let mesh = Mesh::new(&positions).with_elems(&elems);
        assert_eq!(mesh.num_verts(), 6);
        assert_eq!(mesh.num_elems(), 6);
        assert_eq!(Mesh::new(&positions).num_elems(), 0);
    }

    #[test]
    fn test_short_channel_is_absent() {
        let positions = [[0.0; 4]; 4];
        let short = [[0.0; 2]; 3];
        let long = [[1.0; 2]; 8];
        assert!(Mesh::new(&positions).with_texcoords(&short).texcoords().is_none());

        let mesh = Mesh::new(&positions).with_texcoords(&long);
        assert_eq!(mesh.texcoords().map(<[_]>::len), Some(4));
    }

    #[test]
    fn test_out_of_range_channels_are_ignored() {
        let positions = [[0.0; 4]; 4];
        let colors = [[255u8; 4]; 4];
        let mesh = Mesh::new(&positions).with_color(MAX_LIGHTMAPS, &colors);
        assert!(mesh.colors.iter().all(Option::is_none));
    }

    #[test]
    fn test_instance_point_layout() {
        let instance = InstancePoint::new([0.0, 0.0, 0.0, 1.0], [1.0, 2.0, 3.0], 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), InstancePoint::SIZE);
        assert_eq!(instance.origin_scale, [1.0, 2.0, 3.0, 2.0]);
    }
}

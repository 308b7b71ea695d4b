//! Vertex layouts and interleaved vertex formats.
//!
//! Two related descriptions live here:
//!
//! - [`VertexLayout`] is an attribute mask resolved to the hardware slots a
//!   draw enables. Skinning and lightmapping share two slots, so the layout
//!   carries them as a closed [`AliasedSlots`] choice.
//! - [`VertexFormat`] is the byte layout of a vertex buffer: stride, channel
//!   offsets, half-float channels and the position of the per-instance
//!   region. It also interleaves a [`Mesh`] into that layout.
//!
//! # Example
//!
//! ```ignore
//! let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::TEXCOORDS)
//!     .with_instance_region(8192);
//! let mut bytes = Vec::new();
//! format.write_vertices(&mesh, VertexAttribs::POSITION | VertexAttribs::TEXCOORDS, &mut bytes);
//! ```

use half::f16;

use super::attribs::{
    AttribSlot, VertexAttribs, LIGHTMAP_COORD_SLOTS, LIGHTMAP_LAYER_GROUPS, MAX_LIGHTMAPS,
};
use super::data::{InstancePoint, Mesh};

// ============================================================================
// Vertex Layout
// ============================================================================

/// Contents of the hardware slots shared by lightmaps and skinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasedSlots {
    /// Lightmap coordinate slots and lightmap layer selectors.
    Lightmaps {
        coords: [bool; LIGHTMAP_COORD_SLOTS],
        layers: [bool; LIGHTMAP_LAYER_GROUPS],
    },
    /// Bone indices and weights; the lightmap layer slot stays disabled.
    Bones,
}

/// Attribute mask resolved to the set of enabled hardware slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub normal: bool,
    pub svector: bool,
    pub color0: bool,
    pub texcoords: bool,
    pub sprite_point: bool,
    pub aliased: AliasedSlots,
    pub instances: bool,
}

impl VertexLayout {
    /// Resolve an attribute mask.
    ///
    /// Grouped channels (sprite point, bones, instances) only count when every
    /// bit of their group is present. Lightmap coordinate slot `i` follows the
    /// even lightmap bit `LMCOORDS(2i)`.
    pub fn resolve(attribs: VertexAttribs) -> Self {
        let aliased = if attribs.has_all(VertexAttribs::BONES) {
            AliasedSlots::Bones
        } else {
            let mut coords = [false; LIGHTMAP_COORD_SLOTS];
            for (i, enabled) in coords.iter_mut().enumerate() {
                *enabled = attribs.contains(VertexAttribs::lightmap_coords(i * 2));
            }
            let mut layers = [false; LIGHTMAP_LAYER_GROUPS];
            for (i, enabled) in layers.iter_mut().enumerate() {
                *enabled = attribs.contains(VertexAttribs::lightmap_layers(i));
            }
            AliasedSlots::Lightmaps { coords, layers }
        };

        Self {
            normal: attribs.contains(VertexAttribs::NORMAL),
            svector: attribs.contains(VertexAttribs::SVECTOR),
            color0: attribs.contains(VertexAttribs::COLOR0),
            texcoords: attribs.contains(VertexAttribs::TEXCOORDS),
            sprite_point: attribs.has_all(VertexAttribs::AUTOSPRITE),
            aliased,
            instances: attribs.has_all(VertexAttribs::INSTANCES),
        }
    }

    /// Returns true if `slot` is enabled by this layout.
    pub fn uses_slot(&self, slot: AttribSlot) -> bool {
        match slot {
            AttribSlot::Position => true,
            AttribSlot::Normal => self.normal,
            AttribSlot::SVector => self.svector,
            AttribSlot::Color0 => self.color0,
            AttribSlot::TexCoords => self.texcoords,
            AttribSlot::SpritePoint => self.sprite_point,
            AttribSlot::LmCoords01 | AttribSlot::LmCoords23 => match self.aliased {
                AliasedSlots::Bones => true,
                AliasedSlots::Lightmaps { coords, .. } => {
                    coords[(slot.index() - AttribSlot::LmCoords01.index()) as usize]
                }
            },
            AttribSlot::LmLayers0123 => match self.aliased {
                AliasedSlots::Bones => false,
                AliasedSlots::Lightmaps { layers, .. } => layers[0],
            },
            AttribSlot::InstanceQuat | AttribSlot::InstanceXyzs => self.instances,
        }
    }

    /// Bitmask of enabled slots (bit `i` for slot index `i`).
    pub fn slot_mask(&self) -> u32 {
        AttribSlot::ALL
            .iter()
            .filter(|slot| self.uses_slot(**slot))
            .fold(0, |mask, slot| mask | slot.bit())
    }
}

// ============================================================================
// Attribute Pointers
// ============================================================================

/// Component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttribType {
    Float,
    HalfFloat,
    UnsignedByte,
}

/// Where and how a hardware slot reads from the bound array buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribPointer {
    pub components: u8,
    pub ty: AttribType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

// ============================================================================
// Vertex Format
// ============================================================================

const POSITION_SIZE: usize = 16;
const SPRITE_POINT_SIZE: usize = 16;
const BYTE4_SIZE: usize = 4;

/// Interleaved byte layout of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    attribs: VertexAttribs,
    half_float: VertexAttribs,
    stride: usize,
    normals: Option<usize>,
    svectors: Option<usize>,
    colors: Option<usize>,
    texcoords: Option<usize>,
    sprite_points: Option<usize>,
    /// Offset and component count (2 or 4) per lightmap coordinate slot.
    lightmaps: [Option<(usize, u8)>; LIGHTMAP_COORD_SLOTS],
    lm_layers: [Option<usize>; LIGHTMAP_LAYER_GROUPS],
    bones: Option<usize>,
    instances: Option<usize>,
}

impl VertexFormat {
    /// Compute the layout for the channels in `attribs`.
    ///
    /// Channels in `half_float` that can be stored as half floats (texcoords,
    /// normals, s-vectors) use two bytes per component. Bone indices and
    /// weights share storage with the lightmap coordinates.
    pub fn new(attribs: VertexAttribs, half_float: VertexAttribs) -> Self {
        let attribs = attribs | VertexAttribs::POSITION;
        let half_float = half_float & attribs & VertexAttribs::HALF_FLOAT_CAPABLE;
        let float_size = |bit: VertexAttribs| if half_float.contains(bit) { 2 } else { 4 };

        let mut offset = POSITION_SIZE;
        let mut place = |present: bool, size: usize| {
            present.then(|| {
                let at = offset;
                offset += size;
                at
            })
        };

        let normals = place(
            attribs.contains(VertexAttribs::NORMAL),
            4 * float_size(VertexAttribs::NORMAL),
        );
        let svectors = place(
            attribs.contains(VertexAttribs::SVECTOR),
            4 * float_size(VertexAttribs::SVECTOR),
        );
        let colors = place(attribs.contains(VertexAttribs::COLOR0), BYTE4_SIZE);
        let texcoords = place(
            attribs.contains(VertexAttribs::TEXCOORDS),
            2 * float_size(VertexAttribs::TEXCOORDS),
        );
        let sprite_points = place(
            attribs.contains(VertexAttribs::SPRITEPOINT),
            SPRITE_POINT_SIZE,
        );

        let mut lightmaps = [None; LIGHTMAP_COORD_SLOTS];
        for (i, slot) in lightmaps.iter_mut().enumerate() {
            if !attribs.contains(VertexAttribs::lightmap_coords(i * 2)) {
                break;
            }
            let components: u8 = if attribs.contains(VertexAttribs::lightmap_coords(i * 2 + 1)) {
                4
            } else {
                2
            };
            *slot = place(true, components as usize * 4).map(|at| (at, components));
        }

        // Bones reuse the lightmap region, which is never smaller than indices plus weights.
        let bones = if attribs.has_all(VertexAttribs::BONES) {
            lightmaps[0]
                .map(|(at, _)| at)
                .or_else(|| place(true, 2 * BYTE4_SIZE))
        } else {
            None
        };

        let mut lm_layers = [None; LIGHTMAP_LAYER_GROUPS];
        for (i, slot) in lm_layers.iter_mut().enumerate() {
            *slot = place(
                attribs.contains(VertexAttribs::lightmap_layers(i)),
                BYTE4_SIZE,
            );
        }

        Self {
            attribs,
            half_float,
            stride: offset,
            normals,
            svectors,
            colors,
            texcoords,
            sprite_points,
            lightmaps,
            lm_layers,
            bones,
            instances: None,
        }
    }

    /// Place an instance region after `vertex_capacity` vertices.
    pub fn with_instance_region(mut self, vertex_capacity: usize) -> Self {
        self.instances = Some(self.stride * vertex_capacity);
        self
    }

    /// Channels stored by this format.
    pub fn attribs(&self) -> VertexAttribs {
        self.attribs
    }

    /// Channels stored as half floats.
    pub fn half_float(&self) -> VertexAttribs {
        self.half_float
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset of the per-instance region, if the buffer has one.
    pub fn instances_offset(&self) -> Option<usize> {
        self.instances
    }

    /// Total buffer size for the given capacities.
    pub fn buffer_size(&self, vertex_capacity: usize, instance_capacity: usize) -> usize {
        let vertices = self.stride * vertex_capacity;
        match self.instances {
            Some(_) => vertices + instance_capacity * InstancePoint::SIZE,
            None => vertices,
        }
    }

    fn float_type(&self, bit: VertexAttribs) -> AttribType {
        if self.half_float.contains(bit) {
            AttribType::HalfFloat
        } else {
            AttribType::Float
        }
    }

    fn pointer(&self, components: u8, ty: AttribType, normalized: bool, offset: usize) -> AttribPointer {
        AttribPointer {
            components,
            ty,
            normalized,
            stride: self.stride as u32,
            offset: offset as u32,
        }
    }

    /// Attribute pointer for `slot` under `layout`, or `None` when this
    /// format does not store the channel the slot reads.
    pub fn attrib_pointer(&self, slot: AttribSlot, layout: &VertexLayout) -> Option<AttribPointer> {
        match slot {
            AttribSlot::Position => Some(self.pointer(4, AttribType::Float, false, 0)),
            AttribSlot::Normal => self
                .normals
                .map(|at| self.pointer(4, self.float_type(VertexAttribs::NORMAL), false, at)),
            AttribSlot::SVector => self
                .svectors
                .map(|at| self.pointer(4, self.float_type(VertexAttribs::SVECTOR), false, at)),
            AttribSlot::Color0 => self
                .colors
                .map(|at| self.pointer(4, AttribType::UnsignedByte, true, at)),
            AttribSlot::TexCoords => self
                .texcoords
                .map(|at| self.pointer(2, self.float_type(VertexAttribs::TEXCOORDS), false, at)),
            AttribSlot::SpritePoint => self
                .sprite_points
                .map(|at| self.pointer(4, AttribType::Float, false, at)),
            AttribSlot::LmCoords01 | AttribSlot::LmCoords23 => {
                let second = slot == AttribSlot::LmCoords23;
                match layout.aliased {
                    AliasedSlots::Bones => self.bones.map(|at| {
                        if second {
                            self.pointer(4, AttribType::UnsignedByte, true, at + BYTE4_SIZE)
                        } else {
                            self.pointer(4, AttribType::UnsignedByte, false, at)
                        }
                    }),
                    AliasedSlots::Lightmaps { .. } => self.lightmaps[usize::from(second)]
                        .map(|(at, components)| self.pointer(components, AttribType::Float, false, at)),
                }
            }
            AttribSlot::LmLayers0123 => self.lm_layers[0]
                .map(|at| self.pointer(4, AttribType::UnsignedByte, false, at)),
            AttribSlot::InstanceQuat | AttribSlot::InstanceXyzs => {
                let field = if slot == AttribSlot::InstanceXyzs { 16 } else { 0 };
                self.instances.map(|at| AttribPointer {
                    components: 4,
                    ty: AttribType::Float,
                    normalized: false,
                    stride: InstancePoint::SIZE as u32,
                    offset: (at + field) as u32,
                })
            }
        }
    }

    /// Interleave `mesh` into `out` (cleared first), writing the channels in
    /// `attribs` that this format stores and the mesh supplies.
    ///
    /// Bytes of channels that are not written are zero. Lightmap coordinates
    /// are written for consecutive lightmaps starting at 0 while both the mesh
    /// and the mask provide them. Sprite points missing from an autosprite
    /// mesh are computed per quad.
    pub fn write_vertices(&self, mesh: &Mesh<'_>, attribs: VertexAttribs, out: &mut Vec<u8>) {
        let nv = mesh.num_verts();
        let stride = self.stride;
        let attribs = attribs & self.attribs;
        out.clear();
        out.resize(nv * stride, 0);

        for (vertex, position) in out.chunks_exact_mut(stride).zip(mesh.positions) {
            write_f32(vertex, 0, position);
        }

        if let (Some(at), Some(normals), true) = (
            self.normals,
            mesh.normals(),
            attribs.contains(VertexAttribs::NORMAL),
        ) {
            let half = self.half_float.contains(VertexAttribs::NORMAL);
            for (vertex, normal) in out.chunks_exact_mut(stride).zip(normals) {
                write_float(vertex, at, normal, half);
            }
        }

        if let (Some(at), Some(svectors), true) = (
            self.svectors,
            mesh.svectors(),
            attribs.contains(VertexAttribs::SVECTOR),
        ) {
            let half = self.half_float.contains(VertexAttribs::SVECTOR);
            for (vertex, svector) in out.chunks_exact_mut(stride).zip(svectors) {
                write_float(vertex, at, svector, half);
            }
        }

        if let (Some(at), Some(colors), true) = (
            self.colors,
            mesh.color(0),
            attribs.contains(VertexAttribs::COLOR0),
        ) {
            for (vertex, color) in out.chunks_exact_mut(stride).zip(colors) {
                vertex[at..at + BYTE4_SIZE].copy_from_slice(color);
            }
        }

        if let (Some(at), Some(texcoords), true) = (
            self.texcoords,
            mesh.texcoords(),
            attribs.contains(VertexAttribs::TEXCOORDS),
        ) {
            let half = self.half_float.contains(VertexAttribs::TEXCOORDS);
            for (vertex, st) in out.chunks_exact_mut(stride).zip(texcoords) {
                write_float(vertex, at, st, half);
            }
        }

        if let (Some(at), true) = (
            self.sprite_points,
            attribs.has_all(VertexAttribs::AUTOSPRITE),
        ) {
            let computed;
            let points = match mesh.sprite_points() {
                Some(points) => points,
                None => {
                    computed = quad_sprite_points(mesh.positions);
                    &computed[..]
                }
            };
            for (vertex, point) in out.chunks_exact_mut(stride).zip(points) {
                write_f32(vertex, at, point);
            }
        }

        if attribs.has_all(VertexAttribs::BONES) {
            if let (Some(at), Some(indices), Some(weights)) =
                (self.bones, mesh.bone_indices(), mesh.bone_weights())
            {
                for ((vertex, index), weight) in
                    out.chunks_exact_mut(stride).zip(indices).zip(weights)
                {
                    vertex[at..at + BYTE4_SIZE].copy_from_slice(index);
                    vertex[at + BYTE4_SIZE..at + 2 * BYTE4_SIZE].copy_from_slice(weight);
                }
            }
        } else {
            self.write_lightmaps(mesh, attribs, out);
        }
    }

    fn write_lightmaps(&self, mesh: &Mesh<'_>, attribs: VertexAttribs, out: &mut [u8]) {
        let stride = self.stride;
        for lightmap in 0..MAX_LIGHTMAPS {
            let Some((at, components)) = self.lightmaps[lightmap / 2] else {
                break;
            };
            if lightmap % 2 == 1 && components < 4 {
                break;
            }
            let Some(coords) = mesh.lightmap(lightmap) else {
                break;
            };
            if !attribs.contains(VertexAttribs::lightmap_coords(lightmap)) {
                break;
            }
            let at = at + (lightmap % 2) * 8;
            for (vertex, st) in out.chunks_exact_mut(stride).zip(coords) {
                write_f32(vertex, at, st);
            }

            if lightmap % 4 == 0 {
                let group = lightmap / 4;
                if let (Some(layer_at), Some(layers), true) = (
                    self.lm_layers[group],
                    mesh.lightmap_layers(group),
                    attribs.contains(VertexAttribs::lightmap_layers(group)),
                ) {
                    for (vertex, layer) in out.chunks_exact_mut(stride).zip(layers) {
                        vertex[layer_at..layer_at + BYTE4_SIZE].copy_from_slice(layer);
                    }
                }
            }
        }
    }
}

fn write_f32<const N: usize>(vertex: &mut [u8], at: usize, value: &[f32; N]) {
    vertex[at..at + N * 4].copy_from_slice(bytemuck::cast_slice(value));
}

fn write_float<const N: usize>(vertex: &mut [u8], at: usize, value: &[f32; N], half: bool) {
    if half {
        let packed = value.map(f16::from_f32);
        vertex[at..at + N * 2].copy_from_slice(bytemuck::cast_slice(&packed));
    } else {
        write_f32(vertex, at, value);
    }
}

/// Sprite centre and radius for every vertex of a quad list.
///
/// Each quad gets its centroid with w set to the distance from the centroid to
/// the quad's first corner. Vertices past the last full quad are their own
/// centre with zero radius.
pub(crate) fn quad_sprite_points(positions: &[[f32; 4]]) -> Vec<[f32; 4]> {
    let mut points = Vec::with_capacity(positions.len());
    let mut quads = positions.chunks_exact(4);
    for quad in quads.by_ref() {
        let mut centre = [0.0f32; 3];
        for corner in quad {
            for axis in 0..3 {
                centre[axis] += corner[axis] * 0.25;
            }
        }
        let radius = (0..3)
            .map(|axis| (quad[0][axis] - centre[axis]).powi(2))
            .sum::<f32>()
            .sqrt();
        points.extend(std::iter::repeat([centre[0], centre[1], centre[2], radius]).take(4));
    }
    for rest in quads.remainder() {
        points.push([rest[0], rest[1], rest[2], 0.0]);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> [[f32; 4]; 4] {
        [
            [0.0, 0.0, 0.0, 1.0],
            [2.0, 0.0, 0.0, 1.0],
            [2.0, 2.0, 0.0, 1.0],
            [0.0, 2.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_bones_and_lightmaps_never_coexist() {
        let layout = VertexLayout::resolve(
            VertexAttribs::POSITION
                | VertexAttribs::BONES
                | VertexAttribs::LMCOORDS0
                | VertexAttribs::LMLAYERS0123,
        );
        assert_eq!(layout.aliased, AliasedSlots::Bones);
        assert!(layout.uses_slot(AttribSlot::BONES_INDICES));
        assert!(layout.uses_slot(AttribSlot::BONES_WEIGHTS));
        assert!(!layout.uses_slot(AttribSlot::LmLayers0123));
    }

    #[test]
    fn test_partial_groups_are_ignored() {
        let layout = VertexLayout::resolve(
            VertexAttribs::POSITION | VertexAttribs::BONES_INDICES | VertexAttribs::INSTANCE_QUAT,
        );
        assert!(matches!(layout.aliased, AliasedSlots::Lightmaps { .. }));
        assert!(!layout.instances);
        assert_eq!(layout.slot_mask(), AttribSlot::Position.bit());
    }

    #[test]
    fn test_lightmap_slots_follow_even_bits() {
        let layout = VertexLayout::resolve(
            VertexAttribs::POSITION | VertexAttribs::LMCOORDS0 | VertexAttribs::LMCOORDS2,
        );
        assert!(layout.uses_slot(AttribSlot::LmCoords01));
        assert!(layout.uses_slot(AttribSlot::LmCoords23));

        let layout = VertexLayout::resolve(VertexAttribs::POSITION | VertexAttribs::LMCOORDS1);
        assert!(!layout.uses_slot(AttribSlot::LmCoords01));
    }

    #[test]
    fn test_compact_format_stride() {
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty());
        assert_eq!(format.stride(), 16 + 4 + 8);

        let half = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::HALF_FLOAT_CAPABLE);
        assert_eq!(half.stride(), 16 + 4 + 4);
        assert_eq!(half.half_float(), VertexAttribs::TEXCOORDS);
    }

    #[test]
    fn test_lightmap_components() {
        let format = VertexFormat::new(
            VertexAttribs::POSITION
                | VertexAttribs::LMCOORDS0
                | VertexAttribs::LMCOORDS1
                | VertexAttribs::LMCOORDS2,
            VertexAttribs::empty(),
        );
        let layout = VertexLayout::resolve(format.attribs());
        let first = format.attrib_pointer(AttribSlot::LmCoords01, &layout);
        let second = format.attrib_pointer(AttribSlot::LmCoords23, &layout);
        assert_eq!(first.map(|p| p.components), Some(4));
        assert_eq!(second.map(|p| p.components), Some(2));
        assert_eq!(format.stride(), 16 + 16 + 8);
    }

    #[test]
    fn test_bones_alias_lightmap_region() {
        let format = VertexFormat::new(VertexAttribs::STREAM, VertexAttribs::empty());
        let lightmaps = VertexLayout::resolve(VertexAttribs::POSITION | VertexAttribs::LMCOORDS0);
        let bones = VertexLayout::resolve(VertexAttribs::POSITION | VertexAttribs::BONES);

        let lm = format.attrib_pointer(AttribSlot::LmCoords01, &lightmaps);
        let indices = format.attrib_pointer(AttribSlot::BONES_INDICES, &bones);
        let weights = format.attrib_pointer(AttribSlot::BONES_WEIGHTS, &bones);
        assert_eq!(lm.map(|p| p.offset), indices.map(|p| p.offset));
        assert_eq!(weights.map(|p| p.offset), indices.map(|p| p.offset + 4));
        assert_eq!(weights.map(|p| p.normalized), Some(true));
    }

    #[test]
    fn test_instance_region() {
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty())
            .with_instance_region(100);
        assert_eq!(format.instances_offset(), Some(format.stride() * 100));
        assert_eq!(
            format.buffer_size(100, 10),
            format.stride() * 100 + 10 * InstancePoint::SIZE
        );

        let layout = VertexLayout::resolve(VertexAttribs::POSITION | VertexAttribs::INSTANCES);
        let xyzs = format.attrib_pointer(AttribSlot::InstanceXyzs, &layout);
        assert_eq!(xyzs.map(|p| p.stride), Some(32));
        assert_eq!(
            xyzs.map(|p| p.offset as usize),
            Some(format.stride() * 100 + 16)
        );
    }

    #[test]
    fn test_write_vertices_skips_unrequested_channels() {
        let positions = quad();
        let texcoords = [[0.5f32, 0.25]; 4];
        let colors = [[1u8, 2, 3, 4]; 4];
        let mesh = Mesh::new(&positions)
            .with_texcoords(&texcoords)
            .with_color(0, &colors);
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty());

        let mut bytes = Vec::new();
        format.write_vertices(&mesh, VertexAttribs::POSITION | VertexAttribs::COLOR0, &mut bytes);
        assert_eq!(bytes.len(), 4 * format.stride());

        let vertex = &bytes[format.stride()..2 * format.stride()];
        assert_eq!(&vertex[0..4], bytemuck::bytes_of(&2.0f32));
        assert_eq!(&vertex[16..20], &[1, 2, 3, 4]);
        assert!(vertex[20..28].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_half_texcoords() {
        let positions = quad();
        let texcoords = [[0.5f32, 1.0]; 4];
        let mesh = Mesh::new(&positions).with_texcoords(&texcoords);
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::TEXCOORDS);

        let mut bytes = Vec::new();
        format.write_vertices(&mesh, VertexAttribs::POSITION | VertexAttribs::TEXCOORDS, &mut bytes);
        let st: [f16; 2] = [f16::from_f32(0.5), f16::from_f32(1.0)];
        assert_eq!(&bytes[20..24], bytemuck::cast_slice::<f16, u8>(&st));
    }

    #[test]
    fn test_sprite_points_computed_per_quad() {
        let points = quad_sprite_points(&quad());
        assert_eq!(points.len(), 4);
        let expected_radius = 2.0f32.sqrt();
        for point in points {
            assert_eq!(&point[..3], &[1.0, 1.0, 0.0]);
            assert!((point[3] - expected_radius).abs() < 1e-6);
        }
    }
}

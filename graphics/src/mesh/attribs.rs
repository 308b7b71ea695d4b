//! Vertex attribute masks and hardware attribute slots.

use bitflags::bitflags;

/// Maximum number of lightmap layers a vertex can reference.
pub const MAX_LIGHTMAPS: usize = 4;

/// Number of lightmap layer selector groups (four lightmaps per `[u8; 4]`).
pub const LIGHTMAP_LAYER_GROUPS: usize = MAX_LIGHTMAPS.div_ceil(4);

/// Number of hardware lightmap coordinate slots (two lightmaps per slot).
pub const LIGHTMAP_COORD_SLOTS: usize = MAX_LIGHTMAPS.div_ceil(2);

bitflags! {
    /// Set of vertex channels a draw reads.
    ///
    /// Handed over by the material layer once per draw; a set of channels a
    /// buffer stores uses the same type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexAttribs: u32 {
        /// Vertex position, mandatory for every draw.
        const POSITION = 1 << 0;
        const NORMAL = 1 << 1;
        /// Tangent ("s-vector") with handedness in w.
        const SVECTOR = 1 << 2;
        const COLOR0 = 1 << 3;
        const TEXCOORDS = 1 << 4;
        /// Sprite centre and radius for camera-facing sprites.
        const SPRITEPOINT = 1 << 5;
        /// Axis-aligned sprites; the s-vector channel carries the sprite axis.
        const AUTOSPRITE2 = 1 << 6;
        const BONES_INDICES = 1 << 7;
        const BONES_WEIGHTS = 1 << 8;
        const LMCOORDS0 = 1 << 9;
        const LMCOORDS1 = 1 << 10;
        const LMCOORDS2 = 1 << 11;
        const LMCOORDS3 = 1 << 12;
        const LMLAYERS0123 = 1 << 13;
        const INSTANCE_QUAT = 1 << 14;
        const INSTANCE_XYZS = 1 << 15;

        /// Channels required for camera-facing sprites.
        const AUTOSPRITE = Self::SPRITEPOINT.bits();
        /// Channels required for skeletal skinning.
        const BONES = Self::BONES_INDICES.bits() | Self::BONES_WEIGHTS.bits();
        /// Per-instance transform channels.
        const INSTANCES = Self::INSTANCE_QUAT.bits() | Self::INSTANCE_XYZS.bits();
        /// Channels stored by the compact streams.
        const COMPACT = Self::POSITION.bits() | Self::COLOR0.bits() | Self::TEXCOORDS.bits();
        /// Every per-vertex channel a generic stream stores.
        const STREAM = Self::POSITION.bits()
            | Self::NORMAL.bits()
            | Self::SVECTOR.bits()
            | Self::COLOR0.bits()
            | Self::TEXCOORDS.bits()
            | Self::SPRITEPOINT.bits()
            | Self::AUTOSPRITE2.bits()
            | Self::BONES.bits()
            | Self::LMCOORDS0.bits()
            | Self::LMCOORDS1.bits()
            | Self::LMCOORDS2.bits()
            | Self::LMCOORDS3.bits()
            | Self::LMLAYERS0123.bits();
        /// Channels that may be stored as half floats.
        const HALF_FLOAT_CAPABLE = Self::TEXCOORDS.bits() | Self::NORMAL.bits() | Self::SVECTOR.bits();
    }
}

impl VertexAttribs {
    /// Lightmap coordinate bit for lightmap `index`.
    pub fn lightmap_coords(index: usize) -> Self {
        debug_assert!(index < MAX_LIGHTMAPS);
        Self::from_bits_retain(Self::LMCOORDS0.bits() << index)
    }

    /// Lightmap layer selector bit for group `index`.
    pub fn lightmap_layers(index: usize) -> Self {
        debug_assert!(index < LIGHTMAP_LAYER_GROUPS);
        Self::from_bits_retain(Self::LMLAYERS0123.bits() << index)
    }

    /// Returns true when only channels of the compact streams are used.
    pub fn is_compact(self) -> bool {
        Self::COMPACT.contains(self)
    }

    /// Returns true when every bit of `group` is set.
    pub fn has_all(self, group: Self) -> bool {
        self.contains(group)
    }
}

/// Hardware vertex attribute slot.
///
/// The skinning channels share slots with the lightmap coordinates; a draw
/// uses one or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum AttribSlot {
    Position = 0,
    Normal = 1,
    SVector = 2,
    Color0 = 3,
    TexCoords = 4,
    SpritePoint = 5,
    /// Lightmap coordinates 0 and 1, or bone indices.
    LmCoords01 = 6,
    /// Lightmap coordinates 2 and 3, or bone weights.
    LmCoords23 = 7,
    LmLayers0123 = 8,
    InstanceQuat = 9,
    InstanceXyzs = 10,
}

impl AttribSlot {
    /// Bone indices alias the first lightmap coordinate slot.
    pub const BONES_INDICES: Self = Self::LmCoords01;
    /// Bone weights alias the second lightmap coordinate slot.
    pub const BONES_WEIGHTS: Self = Self::LmCoords23;

    /// Number of hardware slots.
    pub const COUNT: usize = 11;

    /// All slots in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Position,
        Self::Normal,
        Self::SVector,
        Self::Color0,
        Self::TexCoords,
        Self::SpritePoint,
        Self::LmCoords01,
        Self::LmCoords23,
        Self::LmLayers0123,
        Self::InstanceQuat,
        Self::InstanceXyzs,
    ];

    /// Hardware slot index.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Bit of this slot in an enabled-slot bitmask.
    pub fn bit(self) -> u32 {
        1 << self.index()
    }

    /// Lightmap coordinate slot `index` (0 or 1).
    pub fn lightmap_coords(index: usize) -> Self {
        if index == 0 {
            Self::LmCoords01
        } else {
            Self::LmCoords23
        }
    }
}

//! CPU staging meshes that merge small meshes before a stream upload.

use crate::mesh::{
    elements, quad_sprite_points, Mesh, VertexAttribs, LIGHTMAP_LAYER_GROUPS, MAX_LIGHTMAPS,
};

use super::stream::{StreamId, StreamKind};

/// Staging mesh of one stream.
///
/// Every channel is kept as long as `positions`: channels an appended mesh
/// does not supply (or the attribute mask does not request) are zero-filled,
/// so uploading the staging writes the same bytes as uploading each mesh
/// directly.
#[derive(Debug, Clone)]
pub struct BatchStaging {
    kind: StreamKind,
    vertex_capacity: usize,
    element_capacity: usize,
    pub positions: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 4]>,
    pub svectors: Vec<[f32; 4]>,
    pub texcoords: Vec<[f32; 2]>,
    pub lm_texcoords: [Vec<[f32; 2]>; MAX_LIGHTMAPS],
    pub lm_layers: [Vec<[u8; 4]>; LIGHTMAP_LAYER_GROUPS],
    pub colors: Vec<[u8; 4]>,
    pub sprite_points: Vec<[f32; 4]>,
    pub bone_indices: Vec<[u8; 4]>,
    pub bone_weights: Vec<[u8; 4]>,
    /// Elements relative to the first staged vertex; unused on quad streams.
    pub elems: Vec<u16>,
}

impl BatchStaging {
    /// Create a staging mesh with storage for the full capacity.
    pub fn new(kind: StreamKind, vertex_capacity: usize, element_capacity: usize) -> Self {
        Self {
            kind,
            vertex_capacity,
            element_capacity,
            positions: Vec::with_capacity(vertex_capacity),
            normals: Vec::with_capacity(vertex_capacity),
            svectors: Vec::with_capacity(vertex_capacity),
            texcoords: Vec::with_capacity(vertex_capacity),
            lm_texcoords: std::array::from_fn(|_| Vec::with_capacity(vertex_capacity)),
            lm_layers: std::array::from_fn(|_| Vec::with_capacity(vertex_capacity)),
            colors: Vec::with_capacity(vertex_capacity),
            sprite_points: Vec::new(),
            bone_indices: Vec::new(),
            bone_weights: Vec::new(),
            elems: match kind {
                StreamKind::Generic => Vec::with_capacity(element_capacity),
                StreamKind::Quad => Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    pub fn element_capacity(&self) -> usize {
        self.element_capacity
    }

    /// Staged vertex count.
    pub fn num_verts(&self) -> usize {
        self.positions.len()
    }

    /// Staged element count; implied by the vertex count on quad streams.
    pub fn num_elems(&self) -> usize {
        match self.kind {
            StreamKind::Generic => self.elems.len(),
            StreamKind::Quad => elements::quad_element_count(self.positions.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns true if `num_verts` more vertices and `num_elems` more elements
    /// fit.
    pub fn fits(&self, num_verts: usize, num_elems: usize) -> bool {
        self.num_verts() + num_verts <= self.vertex_capacity
            && self.num_elems() + num_elems <= self.element_capacity
    }

    /// Reset the counters; storage is kept.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.svectors.clear();
        self.texcoords.clear();
        self.lm_texcoords.iter_mut().for_each(Vec::clear);
        self.lm_layers.iter_mut().for_each(Vec::clear);
        self.colors.clear();
        self.sprite_points.clear();
        self.bone_indices.clear();
        self.bone_weights.clear();
        self.elems.clear();
    }

    /// Append `mesh`, copying the channels `attribs` requests.
    ///
    /// `num_elems` is the mesh element count as derived by the caller; meshes
    /// without explicit elements on generic streams get a triangle fan
    /// anchored at the first appended vertex. Autosprite meshes without sprite
    /// points get theirs computed from their own quads, the same way a direct
    /// upload of the mesh would. Bones replace lightmaps.
    pub fn append(&mut self, mesh: &Mesh<'_>, attribs: VertexAttribs, num_elems: usize) {
        let first_vert = self.num_verts();
        let nv = mesh.num_verts();
        debug_assert!(self.fits(nv, num_elems));

        if self.kind == StreamKind::Generic {
            match mesh.elems.filter(|elems| !elems.is_empty()) {
                Some(elems) => elements::copy_offset_elements(
                    elems.get(..num_elems).unwrap_or(elems),
                    first_vert,
                    &mut self.elems,
                ),
                None => elements::build_trifan_elements(first_vert, num_elems, &mut self.elems),
            }
        }

        self.positions.extend_from_slice(mesh.positions);

        if attribs.contains(VertexAttribs::NORMAL) {
            copy_channel(&mut self.normals, mesh.normals(), first_vert);
        }
        if attribs & (VertexAttribs::SVECTOR | VertexAttribs::AUTOSPRITE2) == VertexAttribs::SVECTOR {
            copy_channel(&mut self.svectors, mesh.svectors(), first_vert);
        }
        if attribs.contains(VertexAttribs::TEXCOORDS) {
            copy_channel(&mut self.texcoords, mesh.texcoords(), first_vert);
        }

        if attribs.has_all(VertexAttribs::AUTOSPRITE) {
            match mesh.sprite_points() {
                Some(points) => copy_channel(&mut self.sprite_points, Some(points), first_vert),
                None => copy_channel(
                    &mut self.sprite_points,
                    Some(quad_sprite_points(mesh.positions).as_slice()),
                    first_vert,
                ),
            }
        }

        if attribs.has_all(VertexAttribs::BONES) {
            if let (Some(indices), Some(weights)) = (mesh.bone_indices(), mesh.bone_weights()) {
                copy_channel(&mut self.bone_indices, Some(indices), first_vert);
                copy_channel(&mut self.bone_weights, Some(weights), first_vert);
            }
        } else if let (Some(coords), true) = (
            mesh.lightmap(0),
            attribs.contains(VertexAttribs::lightmap_coords(0)),
        ) {
            copy_channel(&mut self.lm_texcoords[0], Some(coords), first_vert);
            if attribs.contains(VertexAttribs::lightmap_layers(0)) {
                copy_channel(&mut self.lm_layers[0], mesh.lightmap_layers(0), first_vert);
            }

            for lightmap in 1..MAX_LIGHTMAPS {
                let Some(coords) = mesh.lightmap(lightmap) else {
                    break;
                };
                if !attribs.contains(VertexAttribs::lightmap_coords(lightmap)) {
                    break;
                }
                copy_channel(&mut self.lm_texcoords[lightmap], Some(coords), first_vert);
            }
        }

        if attribs.contains(VertexAttribs::COLOR0) {
            copy_channel(&mut self.colors, mesh.color(0), first_vert);
        }

        self.pad_channels();
    }

    fn pad_channels(&mut self) {
        let nv = self.positions.len();
        self.normals.resize(nv, [0.0; 4]);
        self.svectors.resize(nv, [0.0; 4]);
        self.texcoords.resize(nv, [0.0; 2]);
        for coords in &mut self.lm_texcoords {
            coords.resize(nv, [0.0; 2]);
        }
        for layers in &mut self.lm_layers {
            layers.resize(nv, [0; 4]);
        }
        self.colors.resize(nv, [0; 4]);
        self.sprite_points.resize(nv, [0.0; 4]);
        self.bone_indices.resize(nv, [0; 4]);
        self.bone_weights.resize(nv, [0; 4]);
    }

    /// View the first `num_verts` vertices and `num_elems` elements.
    ///
    /// Channels shorter than `num_verts` are absent from the view.
    pub fn as_mesh(&self, num_verts: usize, num_elems: usize) -> Mesh<'_> {
        let num_verts = num_verts.min(self.positions.len());
        let mut mesh = Mesh::new(&self.positions[..num_verts]);
        mesh.normals = self.normals.get(..num_verts);
        mesh.svectors = self.svectors.get(..num_verts);
        mesh.texcoords = self.texcoords.get(..num_verts);
        for (dst, src) in mesh.lm_texcoords.iter_mut().zip(&self.lm_texcoords) {
            *dst = src.get(..num_verts);
        }
        for (dst, src) in mesh.lm_layers.iter_mut().zip(&self.lm_layers) {
            *dst = src.get(..num_verts);
        }
        mesh.colors[0] = self.colors.get(..num_verts);
        mesh.sprite_points = self.sprite_points.get(..num_verts);
        mesh.bone_indices = self.bone_indices.get(..num_verts);
        mesh.bone_weights = self.bone_weights.get(..num_verts);
        if self.kind == StreamKind::Generic {
            mesh.elems = self.elems.get(..num_elems.min(self.elems.len()));
        }
        mesh
    }

    /// View everything staged so far.
    pub fn staged_mesh(&self) -> Mesh<'_> {
        self.as_mesh(self.num_verts(), self.num_elems())
    }
}

fn copy_channel<T: Copy + Default>(dst: &mut Vec<T>, src: Option<&[T]>, first_vert: usize) {
    if let Some(src) = src {
        dst.resize(first_vert, T::default());
        dst.extend_from_slice(src);
    }
}

/// Staging meshes for all four streams.
#[derive(Debug, Clone)]
pub struct BatchArena {
    batches: [BatchStaging; StreamId::COUNT],
}

impl BatchArena {
    pub fn new(vertex_capacity: usize, element_capacity: usize) -> Self {
        Self {
            batches: StreamId::ALL
                .map(|id| BatchStaging::new(id.kind(), vertex_capacity, element_capacity)),
        }
    }

    pub fn get(&self, id: StreamId) -> &BatchStaging {
        &self.batches[id.index()]
    }

    pub fn get_mut(&mut self, id: StreamId) -> &mut BatchStaging {
        &mut self.batches[id.index()]
    }

    /// Reset every batch.
    pub fn clear(&mut self) {
        self.batches.iter_mut().for_each(BatchStaging::clear);
    }
}

//! Vertex attribute enable tracking.

use crate::backend::GlBackend;
use crate::mesh::{AttribSlot, VertexAttribs, VertexFormat, VertexLayout};

/// Tracks which hardware attribute slots are enabled and which attribute mask
/// the current pointers were set up for.
#[derive(Debug, Clone, Default)]
pub struct AttribTracker {
    enabled: u32,
    last: Option<(VertexAttribs, VertexAttribs)>,
}

impl AttribTracker {
    /// Create a tracker that assumes every slot is disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bitmask of enabled slots.
    pub fn enabled_slots(&self) -> u32 {
        self.enabled
    }

    /// Returns true if `slot` is enabled.
    pub fn is_enabled(&self, slot: AttribSlot) -> bool {
        self.enabled & slot.bit() != 0
    }

    /// Attribute mask and half-float mask the pointers were last set up for.
    pub fn last_attribs(&self) -> Option<(VertexAttribs, VertexAttribs)> {
        self.last
    }

    /// Forget the last mask so the next call re-issues pointers.
    ///
    /// Pointers are relative to the bound array buffer, so this must follow
    /// every array buffer change.
    pub fn forget_pointers(&mut self) {
        self.last = None;
    }

    /// Enable exactly the slots `attribs` resolves to and point them into a
    /// buffer laid out as `format`.
    ///
    /// Nothing is issued when both masks equal those of the previous call.
    /// Slots the layout wants but the format does not store stay disabled.
    pub fn enable_attribs<B: GlBackend>(
        &mut self,
        gl: &mut B,
        attribs: VertexAttribs,
        format: &VertexFormat,
    ) {
        debug_assert!(
            attribs.contains(VertexAttribs::POSITION),
            "draws require vertex positions"
        );

        let key = (attribs, format.half_float());
        if self.last == Some(key) {
            return;
        }
        self.last = Some(key);

        let layout = VertexLayout::resolve(attribs);
        for slot in AttribSlot::ALL {
            let pointer = if layout.uses_slot(slot) {
                format.attrib_pointer(slot, &layout)
            } else {
                None
            };

            match pointer {
                Some(pointer) => {
                    self.set_enabled(gl, slot, true);
                    gl.vertex_attrib_pointer(slot, &pointer);
                    if matches!(slot, AttribSlot::InstanceQuat | AttribSlot::InstanceXyzs) {
                        gl.vertex_attrib_divisor(slot, 1);
                    }
                }
                None => self.set_enabled(gl, slot, false),
            }
        }
    }

    fn set_enabled<B: GlBackend>(&mut self, gl: &mut B, slot: AttribSlot, enable: bool) {
        if self.is_enabled(slot) == enable {
            return;
        }
        if enable {
            self.enabled |= slot.bit();
        } else {
            self.enabled &= !slot.bit();
        }
        gl.set_vertex_attrib_enabled(slot, enable);
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GlCall};

    fn full_format() -> VertexFormat {
        VertexFormat::new(VertexAttribs::STREAM, VertexAttribs::empty()).with_instance_region(16)
    }

    fn toggles(gl: &DummyBackend) -> Vec<GlCall> {
        gl.calls()
            .iter()
            .filter(|c| c.is_attrib_toggle())
            .cloned()
            .collect()
    }

    #[test]
    fn test_second_call_is_silent() {
        let mut gl = DummyBackend::new();
        let mut tracker = AttribTracker::new();
        let format = full_format();
        let attribs = VertexAttribs::POSITION | VertexAttribs::TEXCOORDS;

        tracker.enable_attribs(&mut gl, attribs, &format);
        assert!(!gl.calls().is_empty());
        gl.clear_calls();

        tracker.enable_attribs(&mut gl, attribs, &format);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn test_minimal_toggles_between_masks() {
        let mut gl = DummyBackend::new();
        let mut tracker = AttribTracker::new();
        let format = full_format();

        tracker.enable_attribs(
            &mut gl,
            VertexAttribs::POSITION | VertexAttribs::NORMAL | VertexAttribs::TEXCOORDS,
            &format,
        );
        gl.clear_calls();

        tracker.enable_attribs(
            &mut gl,
            VertexAttribs::POSITION | VertexAttribs::COLOR0 | VertexAttribs::TEXCOORDS,
            &format,
        );
        assert_eq!(
            toggles(&gl),
            vec![
                GlCall::EnableAttrib(AttribSlot::Normal, false),
                GlCall::EnableAttrib(AttribSlot::Color0, true),
            ]
        );
        assert_eq!(
            tracker.enabled_slots(),
            AttribSlot::Position.bit() | AttribSlot::Color0.bit() | AttribSlot::TexCoords.bit()
        );
    }

    #[test]
    fn test_bones_disable_lightmap_layers() {
        let mut gl = DummyBackend::new();
        let mut tracker = AttribTracker::new();
        let format = full_format();

        tracker.enable_attribs(
            &mut gl,
            VertexAttribs::POSITION | VertexAttribs::LMCOORDS0 | VertexAttribs::LMLAYERS0123,
            &format,
        );
        assert!(tracker.is_enabled(AttribSlot::LmLayers0123));

        tracker.enable_attribs(
            &mut gl,
            VertexAttribs::POSITION | VertexAttribs::BONES | VertexAttribs::LMLAYERS0123,
            &format,
        );
        assert!(tracker.is_enabled(AttribSlot::BONES_INDICES));
        assert!(tracker.is_enabled(AttribSlot::BONES_WEIGHTS));
        assert!(!tracker.is_enabled(AttribSlot::LmLayers0123));
    }

    #[test]
    fn test_instances_get_divisor() {
        let mut gl = DummyBackend::new();
        let mut tracker = AttribTracker::new();

        tracker.enable_attribs(
            &mut gl,
            VertexAttribs::POSITION | VertexAttribs::INSTANCES,
            &full_format(),
        );
        let divisors: Vec<_> = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::AttribDivisor(_, 1)))
            .collect();
        assert_eq!(divisors.len(), 2);
    }

    #[test]
    fn test_forget_reissues_pointers_only() {
        let mut gl = DummyBackend::new();
        let mut tracker = AttribTracker::new();
        let format = full_format();
        let attribs = VertexAttribs::POSITION | VertexAttribs::COLOR0;

        tracker.enable_attribs(&mut gl, attribs, &format);
        tracker.forget_pointers();
        gl.clear_calls();

        tracker.enable_attribs(&mut gl, attribs, &format);
        assert!(toggles(&gl).is_empty());
        assert_eq!(
            gl.calls()
                .iter()
                .filter(|c| matches!(c, GlCall::AttribPointer(..)))
                .count(),
            2
        );
    }
}

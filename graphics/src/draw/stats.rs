//! Per-frame draw statistics.

use std::fmt;

/// Counters reset at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameStats {
    /// Vertices submitted, counting every instance.
    pub verts: u32,
    /// Triangles submitted, counting every instance.
    pub tris: u32,
    /// Draw calls issued.
    pub draws: u32,
    /// Texture binds that reached the context.
    pub binds: u32,
    /// Program binds reported by the material layer.
    pub programs: u32,
}

impl FrameStats {
    /// Reset every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count one draw call.
    pub fn add_draw(&mut self) {
        self.draws = self.draws.saturating_add(1);
    }

    /// Count submitted vertices and triangles.
    ///
    /// Counters saturate at `u32::MAX` instead of wrapping.
    pub fn add_geometry(&mut self, verts: usize, tris: usize) {
        self.verts = self.verts.saturating_add(clamp_count(verts));
        self.tris = self.tris.saturating_add(clamp_count(tris));
    }

    pub fn add_bind(&mut self) {
        self.binds = self.binds.saturating_add(1);
    }

    pub fn add_program(&mut self) {
        self.programs = self.programs.saturating_add(1);
    }
}

fn clamp_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4} verts {:4} tris\n{:4} draws {:4} binds {:4} progs",
            self.verts, self.tris, self.draws, self.binds, self.programs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_message() {
        let stats = FrameStats {
            verts: 20,
            tris: 10,
            draws: 1,
            binds: 3,
            programs: 12345,
        };
        assert_eq!(
            stats.to_string(),
            "  20 verts   10 tris\n   1 draws    3 binds 12345 progs"
        );
    }

    #[test]
    fn test_reset() {
        let mut stats = FrameStats {
            draws: 4,
            ..Default::default()
        };
        stats.reset();
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = FrameStats {
            verts: u32::MAX - 10,
            draws: u32::MAX,
            binds: u32::MAX,
            ..Default::default()
        };
        stats.add_geometry(100, 30);
        stats.add_draw();
        stats.add_bind();
        stats.add_program();
        assert_eq!(stats.verts, u32::MAX);
        assert_eq!(stats.tris, 30);
        assert_eq!(stats.draws, u32::MAX);
        assert_eq!(stats.binds, u32::MAX);
        assert_eq!(stats.programs, 1);

        stats.add_geometry(usize::MAX, usize::MAX);
        assert_eq!(stats.tris, u32::MAX);
    }
}

//! Element (index) list helpers.
//!
//! Elements are 16-bit and absolute: an element already includes the offset
//! of its vertex inside the stream buffer.

/// Element count for `num_verts` vertices drawn as quads.
///
/// Trailing vertices that do not form a full quad are dropped.
pub fn quad_element_count(num_verts: usize) -> usize {
    num_verts / 4 * 6
}

/// Element count for `num_verts` vertices drawn as a triangle fan.
pub fn trifan_element_count(num_verts: usize) -> usize {
    (num_verts.max(2) - 2) * 3
}

/// Append quad elements (`4k, 4k+1, 4k+2, 4k, 4k+2, 4k+3`) for `num_verts`
/// vertices starting at `first_vert`.
pub fn build_quad_elements(first_vert: usize, num_verts: usize, out: &mut Vec<u16>) {
    out.reserve(quad_element_count(num_verts));
    for quad in 0..num_verts / 4 {
        let base = (first_vert + quad * 4) as u16;
        out.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Append `num_elems` triangle fan elements anchored at `first_vert`.
pub fn build_trifan_elements(first_vert: usize, num_elems: usize, out: &mut Vec<u16>) {
    out.reserve(num_elems);
    let anchor = first_vert as u16;
    for tri in 0..num_elems / 3 {
        let next = (first_vert + tri + 1) as u16;
        out.extend_from_slice(&[anchor, next, next + 1]);
    }
}

/// Append `src` with `offset` added to every element.
pub fn copy_offset_elements(src: &[u16], offset: usize, out: &mut Vec<u16>) {
    let offset = offset as u16;
    out.extend(src.iter().map(|&e| e.wrapping_add(offset)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_counts_truncate() {
        assert_eq!(quad_element_count(4), 6);
        assert_eq!(quad_element_count(7), 6);
        assert_eq!(quad_element_count(3), 0);
        assert_eq!(quad_element_count(20), 30);
    }

    #[test]
    fn test_trifan_counts() {
        assert_eq!(trifan_element_count(0), 0);
        assert_eq!(trifan_element_count(2), 0);
        assert_eq!(trifan_element_count(3), 3);
        assert_eq!(trifan_element_count(5), 9);
    }

    #[test]
    fn test_quad_pattern() {
        let mut out = Vec::new();
        build_quad_elements(8, 8, &mut out);
        assert_eq!(out, vec![8, 9, 10, 8, 10, 11, 12, 13, 14, 12, 14, 15]);
    }

    #[test]
    fn test_trifan_anchor() {
        let mut out = Vec::new();
        build_trifan_elements(10, trifan_element_count(5), &mut out);
        assert_eq!(out, vec![10, 11, 12, 10, 12, 13, 10, 13, 14]);
    }

    #[test]
    fn test_copy_offset() {
        let mut out = vec![0];
        copy_offset_elements(&[0, 1, 2], 100, &mut out);
        assert_eq!(out, vec![0, 100, 101, 102]);
    }
}

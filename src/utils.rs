use crate::{
    tables::{CORNER_INDEX_A_FROM_EDGE, CORNER_INDEX_B_FROM_EDGE, TRI_TABLE},
    types::Value,
};

/// Computes the marching cubes configuration for a cube.
///
/// Each of the 8 corners maps to one bit. A bit is set when the corner's value
/// is **strictly below** the iso-level (i.e. "inside" the surface):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
#[inline]
pub fn get_state(corner_values: &[Value; 8], iso_level: Value) -> usize {
    let mut state: usize = 0;
    for (i, &v) in corner_values.iter().enumerate() {
        if v < iso_level {
            state |= 1 << i;
        }
    }
    state
}

/// Iterates the edge triplets `TRI_TABLE[state]` lists, in table order.
///
/// ```text
/// TRI_TABLE[state] = [e0, e1, e2,  e3, e4, e5,  -1, ...]
///                     \___tri0__/   \___tri1__/
/// ```
#[inline]
pub fn triangle_edges(state: usize) -> impl Iterator<Item = [usize; 3]> {
    TRI_TABLE[state]
        .chunks_exact(3)
        .take_while(|tri| tri[0] != -1)
        .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
}

/// The two cube corners joined by `edge`.
#[inline]
pub fn edge_corners(edge: usize) -> (usize, usize) {
    (CORNER_INDEX_A_FROM_EDGE[edge], CORNER_INDEX_B_FROM_EDGE[edge])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_sets_bits_for_corners_below_iso() {
        let values = [-1., 1., 1., 1., 1., 1., 1., -0.5];
        assert_eq!(get_state(&values, 0.), 0b1000_0001);
    }

    #[test]
    fn value_on_iso_level_is_outside() {
        assert_eq!(get_state(&[0.; 8], 0.), 0);
        assert_eq!(get_state(&[-0.1; 8], 0.), 255);
    }

    #[test]
    fn uniform_configurations_have_no_triangles() {
        assert_eq!(triangle_edges(0).count(), 0);
        assert_eq!(triangle_edges(255).count(), 0);
    }

    #[test]
    fn single_corner_cuts_one_triangle() {
        let tris: Vec<_> = triangle_edges(1).collect();
        assert_eq!(tris, vec![[0, 8, 3]]);
        for edge in tris[0] {
            let (a, b) = edge_corners(edge);
            assert!(a == 0 || b == 0, "edge {edge} does not touch corner 0");
        }
    }

    #[test]
    fn fullest_configurations_have_five_triangles() {
        assert_eq!((0..256).map(|s| triangle_edges(s).count()).max(), Some(5));
    }
}

//! C ABI for hosts that call the generator through a foreign function interface.
//!
//! [`marching_terrain_generate`] returns a heap-allocated [`RawOutputBlock`]:
//!
//! ```text
//! word0  vertex float count (3 × vertex count)
//! word1  index count
//! word2  address of the vertex float array
//! word3  address of the index array
//! ```
//!
//! On `wasm32` every field is one 32-bit word, matching hosts that read the
//! block as four consecutive integers. On 64-bit targets the two addresses are
//! pointer-sized. The block and both arrays belong to the caller, who must hand
//! them back to [`marching_terrain_free`] exactly once.

use std::ptr;

use tracing::warn;

use crate::{pack::OutputBlock, terrain::generate_terrain};

#[repr(C)]
#[derive(Debug)]
pub struct RawOutputBlock {
    pub vertex_float_count: u32,
    pub index_count: u32,
    pub vertices: *mut f32,
    pub indices: *mut u32,
}

#[cfg(target_pointer_width = "32")]
const _: () = assert!(std::mem::size_of::<RawOutputBlock>() == 16);

impl From<OutputBlock> for RawOutputBlock {
    fn from(block: OutputBlock) -> Self {
        // `into_boxed_slice` drops spare capacity so the arrays can be rebuilt
        // from their lengths alone.
        let vertices = Box::into_raw(block.vertices.into_boxed_slice());
        let indices = Box::into_raw(block.indices.into_boxed_slice());
        Self {
            vertex_float_count: block.vertex_float_count,
            index_count: block.index_count,
            vertices: vertices.cast(),
            indices: indices.cast(),
        }
    }
}

/// Generates terrain with the default tuning.
///
/// Returns null if the parameters are rejected or the buffers cannot be allocated.
#[unsafe(no_mangle)]
pub extern "C" fn marching_terrain_generate(
    size: f32,
    level_count: i32,
    max_segment: i32,
) -> *mut RawOutputBlock {
    match generate_terrain(size, level_count, max_segment) {
        Ok(block) => Box::into_raw(Box::new(RawOutputBlock::from(block))),
        Err(err) => {
            warn!(%err, size, level_count, max_segment, "terrain generation failed");
            ptr::null_mut()
        }
    }
}

/// Releases a block returned by [`marching_terrain_generate`]. Null is ignored.
///
/// # Safety
/// `block` must be null or a pointer obtained from [`marching_terrain_generate`]
/// that has not been freed yet, with its fields left untouched.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn marching_terrain_free(block: *mut RawOutputBlock) {
    if block.is_null() {
        return;
    }
    // SAFETY: the caller guarantees `block` came from `Box::into_raw` in
    // `marching_terrain_generate` and is freed once; the array pointers and
    // lengths are the boxed slices created in `RawOutputBlock::from`.
    unsafe {
        let block = Box::from_raw(block);
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            block.vertices,
            block.vertex_float_count as usize,
        )));
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            block.indices,
            block.index_count as usize,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_round_trips_through_the_abi() {
        let expected = generate_terrain(64., 1, 4).unwrap();
        let raw = marching_terrain_generate(64., 1, 4);
        assert!(!raw.is_null());

        // SAFETY: `raw` is a live block from `marching_terrain_generate`.
        unsafe {
            let block = &*raw;
            assert_eq!(block.vertex_float_count, expected.vertex_float_count);
            assert_eq!(block.index_count, expected.index_count);
            let vertices =
                std::slice::from_raw_parts(block.vertices, block.vertex_float_count as usize);
            let indices = std::slice::from_raw_parts(block.indices, block.index_count as usize);
            assert_eq!(vertices, expected.vertices.as_slice());
            assert_eq!(indices, expected.indices.as_slice());
            marching_terrain_free(raw);
        }
    }

    #[test]
    fn invalid_parameters_return_null() {
        assert!(marching_terrain_generate(64., -1, 4).is_null());
        assert!(marching_terrain_generate(64., 0, 0).is_null());
        // SAFETY: null is accepted and ignored.
        unsafe { marching_terrain_free(ptr::null_mut()) };
    }
}

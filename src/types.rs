use nalgebra::{Point3, Vector3, Vector4};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components. Mesh vertices and chunk origins.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A lattice sample: world position in `xyz`, density in `w`.
pub type Sample = Vector4<Value>;

/// Builds a [`Sample`] from a world position and its density.
#[inline]
pub fn sample_at(position: Point, density: Value) -> Sample {
    Sample::new(position.x, position.y, position.z, density)
}

/// World position of a [`Sample`].
#[inline]
pub fn sample_position(sample: &Sample) -> Point {
    Point::new(sample.x, sample.y, sample.z)
}

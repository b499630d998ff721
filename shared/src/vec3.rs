/// 3D vector utilities for the table simulation.
/// The table bed is the x/z plane; y is height above the floor.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Dot product
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Cross product
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3 {
        x: a.y * b.z - a.z * b.y,
        y: a.z * b.x - a.x * b.z,
        z: a.x * b.y - a.y * b.x,
    }
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Euclidean distance between two points
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    length(sub(a, b))
}

/// Distance between two points projected onto the table plane (x, z).
pub fn planar_distance(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Normalize to unit length, or `None` when the vector is too short to have a direction.
pub fn try_normalize(v: Vec3) -> Option<Vec3> {
    let len = length(v);
    if len < 1e-10 || !len.is_finite() {
        return None;
    }
    Some(Vec3::new(v.x / len, v.y / len, v.z / len))
}

/// Scale vector by scalar
pub fn scale(v: Vec3, s: f64) -> Vec3 {
    Vec3::new(v.x * s, v.y * s, v.z * s)
}

/// Add two vectors
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

/// Drop the vertical component.
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Closest point to `point` on the infinite line through `origin` along `direction`.
/// Returns `None` for a zero-length direction.
pub fn project_point_onto_line(point: Vec3, origin: Vec3, direction: Vec3) -> Option<Vec3> {
    let dd = dot(direction, direction);
    if dd < 1e-20 {
        return None;
    }
    let t = dot(sub(point, origin), direction) / dd;
    Some(add(origin, scale(direction, t)))
}

/// Rotate vector around axis by angle (Rodrigues' rotation formula).
/// `axis` must be a unit vector.
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let one_minus_cos = 1.0 - cos_a;

    let cross_av = cross(axis, v);
    let dot_av = dot(axis, v);

    Vec3 {
        x: v.x * cos_a + cross_av.x * sin_a + axis.x * dot_av * one_minus_cos,
        y: v.y * cos_a + cross_av.y * sin_a + axis.y * dot_av * one_minus_cos,
        z: v.z * cos_a + cross_av.z * sin_a + axis.z * dot_av * one_minus_cos,
    }
}

pub fn is_finite(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

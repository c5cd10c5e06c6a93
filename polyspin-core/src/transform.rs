/// Mesh orientation and model transformation matrices
use nalgebra::{Matrix3, Matrix4, Unit, UnitQuaternion, Vector3};

/// Accumulated rotation of the mesh.
///
/// Pitch is an increment of the x component of the XYZ Euler decomposition
/// (the mesh's own Euler triple), while yaw and roll are pre-multiplied
/// world-axis rotations. The two are not interchangeable once pitch is
/// nonzero, so callers must apply them in pitch, yaw, roll order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    quaternion: UnitQuaternion<f32>,
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
        }
    }

    pub fn from_quaternion(quaternion: UnitQuaternion<f32>) -> Self {
        Self { quaternion }
    }

    /// Orientation whose XYZ Euler angles are `(x, y, z)`
    pub fn from_euler_xyz(x: f32, y: f32, z: f32) -> Self {
        let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x);
        let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y);
        let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z);
        Self {
            quaternion: qx * qy * qz,
        }
    }

    pub fn quaternion(&self) -> &UnitQuaternion<f32> {
        &self.quaternion
    }

    /// XYZ Euler decomposition: `R = Rx(x) * Ry(y) * Rz(z)`
    pub fn euler_xyz(&self) -> (f32, f32, f32) {
        let m: Matrix3<f32> = self.quaternion.to_rotation_matrix().into_inner();
        let m13 = m[(0, 2)].clamp(-1.0, 1.0);
        let y = m13.asin();
        if m13.abs() < 0.999_999_9 {
            let x = (-m[(1, 2)]).atan2(m[(2, 2)]);
            let z = (-m[(0, 1)]).atan2(m[(0, 0)]);
            (x, y, z)
        } else {
            // Gimbal lock: fold everything into x
            let x = m[(2, 1)].atan2(m[(1, 1)]);
            (x, y, 0.0)
        }
    }

    /// Add `angle` to the Euler x component, keeping y and z
    pub fn pitch(&mut self, angle: f32) {
        let (x, y, z) = self.euler_xyz();
        *self = Self::from_euler_xyz(x + angle, y, z);
    }

    /// Rotate about world +Y
    pub fn yaw(&mut self, angle: f32) {
        self.rotate_on_world_axis(Vector3::y_axis(), angle);
    }

    /// Rotate about world -Z
    pub fn roll(&mut self, angle: f32) {
        self.rotate_on_world_axis(Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0)), angle);
    }

    pub fn rotate_on_world_axis(&mut self, axis: Unit<Vector3<f32>>, angle: f32) {
        let delta = UnitQuaternion::from_axis_angle(&axis, angle);
        self.quaternion = delta * self.quaternion;
        // Repeated products drift off the unit sphere
        self.quaternion.renormalize();
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        self.quaternion.to_homogeneous()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Model matrix: translate, then rotate, then uniformly scale
    pub fn model_matrix(position_y: f32, orientation: &Orientation, scale: f32) -> Matrix4<f32> {
        Self::translation_matrix(0.0, position_y, 0.0)
            * orientation.rotation_matrix()
            * Self::scale_matrix(scale, scale, scale)
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

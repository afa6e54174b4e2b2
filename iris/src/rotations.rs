//! Camera-to-robot rotation matrices for the vision cameras.
//!
//! Robot frame (right-handed): X forward, Y left, Z up.
//! Camera frame (OpenCV): Z along the optical axis, X right (columns), Y down (rows).
//!
//! A mount rotation is `Rx(roll) · Ry(pitch) · Rz(yaw) · camera_to_robot()`. Matrices are published
//! flattened row-major as double arrays.

use crate::iris_error_cause;
use crate::utils::OrError;
use serde::{Serialize, Serializer};

pub type Matrix3 = [[f64; 3]; 3];
pub type Vector3 = [f64; 3];

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Right-handed rotation about X.
pub fn rotation_x(angle_degrees: f64) -> Matrix3 {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Right-handed rotation about Y.
pub fn rotation_y(angle_degrees: f64) -> Matrix3 {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

/// Right-handed rotation about Z.
pub fn rotation_z(angle_degrees: f64) -> Matrix3 {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

pub fn matmul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

pub fn matvec(m: &Matrix3, v: &Vector3) -> Vector3 {
    let mut out = [0.0; 3];
    for (i, cell) in out.iter_mut().enumerate() {
        *cell = (0..3).map(|k| m[i][k] * v[k]).sum();
    }
    out
}

/// `Rx(roll) · Ry(pitch) · Rz(yaw)`.
pub fn compose_rotations_xyz(roll_deg: f64, pitch_deg: f64, yaw_deg: f64) -> Matrix3 {
    let rx = rotation_x(roll_deg);
    let ry = rotation_y(pitch_deg);
    let rz = rotation_z(yaw_deg);
    matmul(&matmul(&rx, &ry), &rz)
}

/// Maps camera axes onto robot axes: optical axis → +X, image right → -Y (robot right), image down → -Z.
pub fn camera_to_robot() -> Matrix3 {
    compose_rotations_xyz(-90.0, 90.0, 0.0)
}

/// Row-major.
pub fn flatten(m: &Matrix3) -> Vec<f64> {
    m.iter().flatten().copied().collect()
}

/// Rounds every entry to `decimals` places. Negative zero is normalized to zero.
pub fn round_matrix(m: &Matrix3, decimals: i32) -> Matrix3 {
    let scale = 10f64.powi(decimals);
    m.map(|row| row.map(|x| ((x * scale).round() / scale) + 0.0))
}

pub fn approx_eq(a: &Matrix3, b: &Matrix3, tolerance: f64) -> bool {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Physical mounting of one camera, as roll/pitch/yaw in degrees applied in robot frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMount {
    pub name: &'static str,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl CameraMount {
    /// Front cameras: pitched 25°.
    pub const LEFT_FRONT: CameraMount = CameraMount { name: "left_front", roll: 0.0, pitch: 25.0, yaw: 0.0 };
    pub const RIGHT_FRONT: CameraMount = CameraMount { name: "right_front", roll: 0.0, pitch: 25.0, yaw: 0.0 };
    /// Back cameras: yawed ±45°.
    pub const LEFT_BACK: CameraMount = CameraMount { name: "left_back", roll: 0.0, pitch: 0.0, yaw: 45.0 };
    pub const RIGHT_BACK: CameraMount = CameraMount { name: "right_back", roll: 0.0, pitch: 0.0, yaw: -45.0 };

    pub const ALL: [CameraMount; 4] = [
        Self::LEFT_FRONT,
        Self::RIGHT_FRONT,
        Self::LEFT_BACK,
        Self::RIGHT_BACK,
    ];

    /// Camera-to-robot rotation for this mount.
    pub fn rotation(&self) -> Matrix3 {
        matmul(&compose_rotations_xyz(self.roll, self.pitch, self.yaw), &camera_to_robot())
    }
}

/// Name → rotation pairs serialized as one JSON object, keys in slice order.
struct MountRotations(Vec<(&'static str, Matrix3)>);

impl Serialize for MountRotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, rotation)| (name, rotation)))
    }
}

/// Pretty JSON object `{ name: 3x3 matrix }` of every mount in `CameraMount::ALL` order,
/// entries rounded to 6 decimals.
pub fn mount_rotations_json() -> OrError<String> {
    let rotations = MountRotations(
        CameraMount::ALL
            .iter()
            .map(|mount| (mount.name, round_matrix(&mount.rotation(), 6)))
            .collect(),
    );
    serde_json::to_string_pretty(&rotations).map_err(|e| {
        iris_error_cause!("rotations", "mount_rotations_json", "failed to serialize rotations", e)
    })
}

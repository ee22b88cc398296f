//! Rigid transforms reported by tracked entities

use std::fmt;

/// Placement of a tracked entity relative to the world frame.
///
/// `rotation` is a unit quaternion stored as `[x, y, z, w]`. The fields are
/// public; [`Pose::new`] is the constructor that enforces the unit norm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    /// Build a pose, scaling `rotation` to unit length.
    ///
    /// A zero or non-finite quaternion carries no orientation and becomes
    /// the identity rotation.
    pub fn new(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        let norm = rotation.iter().map(|c| c * c).sum::<f32>().sqrt();
        let rotation = if norm.is_finite() && norm > f32::EPSILON {
            rotation.map(|c| c / norm)
        } else {
            Self::IDENTITY_ROTATION
        };
        Self { translation, rotation }
    }

    pub fn identity() -> Self {
        Self::from_translation([0.0; 3])
    }

    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self { translation, rotation: Self::IDENTITY_ROTATION }
    }

    /// Build a pose from a row-major 3x3 rotation matrix.
    ///
    /// Uses the trace / largest-diagonal branch so the result stays accurate
    /// for rotations close to 180 degrees.
    pub fn from_rotation_matrix(translation: [f32; 3], m: [[f32; 3]; 3]) -> Self {
        let trace = m[0][0] + m[1][1] + m[2][2];
        let mut q = [0.0f32; 4];

        if trace > 0.0 {
            let t = (trace + 1.0).sqrt();
            q[3] = 0.5 * t;
            let t = 0.5 / t;
            q[0] = (m[2][1] - m[1][2]) * t;
            q[1] = (m[0][2] - m[2][0]) * t;
            q[2] = (m[1][0] - m[0][1]) * t;
        } else {
            let mut i = 0;
            if m[1][1] > m[0][0] {
                i = 1;
            }
            if m[2][2] > m[i][i] {
                i = 2;
            }
            let j = (i + 1) % 3;
            let k = (j + 1) % 3;

            let t = (m[i][i] - m[j][j] - m[k][k] + 1.0).sqrt();
            q[i] = 0.5 * t;
            let t = 0.5 / t;
            q[3] = (m[k][j] - m[j][k]) * t;
            q[j] = (m[j][i] + m[i][j]) * t;
            q[k] = (m[k][i] + m[i][k]) * t;
        }

        Self { translation, rotation: q }
    }

    /// Euclidean norm of the rotation quaternion.
    pub fn rotation_norm(&self) -> f32 {
        self.rotation.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    /// The two-line wire record sent to the client:
    ///
    /// ```text
    /// T <tx> <ty> <tz>
    /// R <qx> <qy> <qz> <qw>
    /// ```
    pub fn to_record(&self) -> String {
        self.to_string()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [tx, ty, tz] = self.translation;
        let [qx, qy, qz, qw] = self.rotation;
        write!(f, "T {tx} {ty} {tz}\nR {qx} {qy} {qz} {qw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IDENTITY: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    #[test]
    fn unit_translation_record() {
        let pose = Pose::from_translation([1.0, 0.0, 0.0]);
        assert_eq!(pose.to_record(), "T 1 0 0\nR 0 0 0 1");
    }

    #[test]
    fn fractional_values_are_printed_exactly() {
        let pose = Pose { translation: [0.5, -2.25, 10.0], rotation: [0.0, 0.0, 0.70710677, 0.70710677] };
        assert_eq!(pose.to_record(), "T 0.5 -2.25 10\nR 0 0 0.70710677 0.70710677");
    }

    #[test]
    fn identity_matrix_gives_identity_quaternion() {
        let pose = Pose::from_rotation_matrix([1.0, 0.0, 0.0], IDENTITY);
        assert_eq!(pose.rotation, Pose::IDENTITY_ROTATION);
        assert_eq!(pose.to_record(), "T 1 0 0\nR 0 0 0 1");
    }

    #[test]
    fn half_turn_about_z() {
        let m = [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];
        let pose = Pose::from_rotation_matrix([0.0; 3], m);

        assert!(pose.rotation[2].abs() > 0.999);
        assert!(pose.rotation[3].abs() < 1e-6);
    }

    #[test]
    fn new_scales_rotation_to_unit_length() {
        let pose = Pose::new([0.0; 3], [0.0, 0.0, 0.0, 2.0]);
        assert_eq!(pose.rotation, Pose::IDENTITY_ROTATION);

        let pose = Pose::new([0.0; 3], [0.0, 3.0, 0.0, 4.0]);
        assert_eq!(pose.rotation, [0.0, 0.6, 0.0, 0.8]);
    }

    #[test]
    fn degenerate_rotation_becomes_identity() {
        assert_eq!(Pose::new([1.0, 2.0, 3.0], [0.0; 4]).rotation, Pose::IDENTITY_ROTATION);
        assert_eq!(Pose::new([0.0; 3], [f32::NAN, 0.0, 0.0, 1.0]).rotation, Pose::IDENTITY_ROTATION);
        assert_eq!(Pose::new([0.0; 3], [f32::INFINITY, 0.0, 0.0, 1.0]).rotation, Pose::IDENTITY_ROTATION);
    }

    proptest! {
        #[test]
        fn new_always_yields_unit_quaternion(q in prop::array::uniform4(-1.0e3f32..1.0e3f32)) {
            let pose = Pose::new([0.0; 3], q);
            prop_assert!((pose.rotation_norm() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn matrix_conversion_yields_unit_quaternion(angle in -3.1f32..3.1f32, axis in 0usize..3) {
            let (s, c) = angle.sin_cos();
            let m = match axis {
                0 => [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
                1 => [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
                _ => [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
            };
            let pose = Pose::from_rotation_matrix([0.0; 3], m);
            prop_assert!((pose.rotation_norm() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn record_is_two_lines_of_space_separated_numbers(
            t in prop::array::uniform3(-1.0e3f32..1.0e3f32),
            q in prop::array::uniform4(-1.0f32..1.0f32),
        ) {
            let record = Pose { translation: t, rotation: q }.to_record();
            let lines: Vec<&str> = record.lines().collect();
            prop_assert_eq!(lines.len(), 2);

            let t_fields: Vec<&str> = lines[0].split(' ').collect();
            let r_fields: Vec<&str> = lines[1].split(' ').collect();
            prop_assert_eq!(t_fields[0], "T");
            prop_assert_eq!(r_fields[0], "R");
            prop_assert_eq!(t_fields.len(), 4);
            prop_assert_eq!(r_fields.len(), 5);

            for (field, expected) in t_fields[1..].iter().zip(t.iter()) {
                prop_assert_eq!(field.parse::<f32>().unwrap(), *expected);
            }
            for (field, expected) in r_fields[1..].iter().zip(q.iter()) {
                prop_assert_eq!(field.parse::<f32>().unwrap(), *expected);
            }
        }
    }
}

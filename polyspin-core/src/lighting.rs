/// Ambient plus directional light, evaluated once per face
use nalgebra::Vector3;

use crate::shape::Rgb;

#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Direction from the origin towards the light
    pub direction: Vector3<f32>,
}

impl Lighting {
    /// Lambert intensity for a world-space face normal
    pub fn intensity(&self, normal: &Vector3<f32>) -> f32 {
        let diffuse = normal.normalize().dot(&self.direction).max(0.0);
        self.ambient + self.directional * diffuse
    }

    /// Shade a material color for a world-space face normal
    pub fn shade(&self, color: Rgb, normal: &Vector3<f32>) -> Rgb {
        let intensity = self.intensity(normal);
        let channel = |c: u8| (c as f32 * intensity).round().min(255.0) as u8;
        Rgb::new(channel(color.r), channel(color.g), channel(color.b))
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.5,
            directional: 0.8,
            direction: Vector3::new(10.0, 10.0, 10.0).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_faces_away_get_ambient_only() {
        let lighting = Lighting::default();
        let away = -lighting.direction;
        assert_relative_eq!(lighting.intensity(&away), 0.5);
        assert_eq!(lighting.shade(Rgb::new(200, 100, 0), &away), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_facing_light_saturates() {
        let lighting = Lighting::default();
        let toward = lighting.direction * 3.0;
        assert_relative_eq!(lighting.intensity(&toward), 1.3, epsilon = 1e-6);
        assert_eq!(lighting.shade(Rgb::new(255, 100, 0), &toward), Rgb::new(255, 130, 0));
    }
}

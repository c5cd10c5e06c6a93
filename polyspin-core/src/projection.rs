/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Triangle;

/// A front-facing triangle in screen space
#[derive(Debug, Clone, Copy)]
pub struct ProjectedTriangle {
    /// `(x, y, depth)` per vertex
    pub screen: [(f32, f32, f32); 3],
    /// Unnormalized world-space face normal
    pub normal: Vector3<f32>,
}

impl ProjectedTriangle {
    /// Mean vertex depth, for painter's ordering
    pub fn depth(&self) -> f32 {
        (self.screen[0].2 + self.screen[1].2 + self.screen[2].2) / 3.0
    }
}

/// Perspective camera looking down -Z at the origin
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 100.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: aspect_ratio(width, height),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Follow a viewport resize
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns `(x, y, depth)` with depth in normalized device units, or
    /// `None` when the point falls outside the near/far planes.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.view_projection() * model_matrix;
        project_ndc(&mvp, point, width, height)
    }

    /// Transform a model-space triangle to world space, drop it if it faces
    /// away from the camera, and project it. `view_projection` is passed in
    /// so callers compute it once per frame.
    pub fn project_triangle(
        &self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        view_projection: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<ProjectedTriangle> {
        let world = triangle
            .vertices
            .map(|vertex| model_matrix.transform_point(&vertex.position));
        let normal = (world[1] - world[0]).cross(&(world[2] - world[0]));

        // Back-face culling
        if normal.dot(&(self.position - world[0])) <= 0.0 {
            return None;
        }

        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (coords, point) in screen.iter_mut().zip(&world) {
            *coords = project_ndc(view_projection, point, width, height)?;
        }
        Some(ProjectedTriangle { screen, normal })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project through a precomputed model-view-projection matrix
pub fn project_ndc(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero w values
    if clip.w.abs() < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    if !(-1.0..=1.0).contains(&depth) {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 100.0));
    }

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut camera = Camera::new(800, 600);
        camera.set_viewport(400, 800);
        assert_relative_eq!(camera.aspect, 0.5);
        // Degenerate sizes never divide by zero
        camera.set_viewport(0, 0);
        assert_relative_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(800, 600);
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(y, 300.0, epsilon = 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_up_is_screen_up_and_nearer_is_shallower() {
        let camera = Camera::new(800, 600);
        let model = Matrix4::identity();
        let (_, y_up, _) = camera
            .project_to_screen(&Point3::new(0.0, 10.0, 0.0), &model, 800, 600)
            .unwrap();
        assert!(y_up < 300.0);

        let (_, _, far) = camera
            .project_to_screen(&Point3::new(0.0, 0.0, -10.0), &model, 800, 600)
            .unwrap();
        let (_, _, near) = camera
            .project_to_screen(&Point3::new(0.0, 0.0, 10.0), &model, 800, 600)
            .unwrap();
        assert!(near < far);
    }

    #[test]
    fn test_project_triangle_culls_back_faces() {
        use crate::geometry::Vertex;

        let camera = Camera::new(800, 600);
        let vp = camera.view_projection();
        let model = Matrix4::identity();
        // Counter-clockwise seen from +Z, i.e. facing the camera
        let front = Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(10.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 10.0, 0.0, 0.0, 0.0, 1.0),
        );
        let projected = camera
            .project_triangle(&front, &model, &vp, 800, 600)
            .unwrap();
        assert!(projected.normal.z > 0.0);
        assert!(projected.screen[1].0 > projected.screen[0].0);
        assert!(projected.screen[2].1 < projected.screen[0].1);

        let back = Triangle::new(front.vertices[0], front.vertices[2], front.vertices[1]);
        assert!(camera.project_triangle(&back, &model, &vp, 800, 600).is_none());
    }

    #[test]
    fn test_behind_camera_is_clipped() {
        let camera = Camera::new(800, 600);
        let behind = Point3::new(0.0, 0.0, 200.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }
}

/// Canvas 2D engine: painter's algorithm over flat-shaded triangles
use nalgebra::Matrix4;
use polyspin_core::{
    Camera, Frame, GraphicsEngine, Lighting, Mesh, MeshDefinition, ProjectedTriangle, Rgb,
    Viewport,
};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::WebError;

const BACKGROUND: &str = "#000000";

pub struct CanvasEngine {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    lighting: Lighting,
}

impl CanvasEngine {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, WebError> {
        let context = canvas
            .get_context("2d")?
            .ok_or(WebError::Context)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| WebError::Context)?;
        context.set_line_join("round");
        Ok(Self {
            canvas,
            context,
            lighting: Lighting::default(),
        })
    }

    fn fill_triangle(&self, triangle: &ProjectedTriangle, color: Rgb) {
        let css = self.lighting.shade(color, &triangle.normal).to_css();
        let [a, b, c] = triangle.screen;

        self.context.begin_path();
        self.context.move_to(a.0 as f64, a.1 as f64);
        self.context.line_to(b.0 as f64, b.1 as f64);
        self.context.line_to(c.0 as f64, c.1 as f64);
        self.context.close_path();
        self.context.set_fill_style_str(&css);
        self.context.fill();
        // Same-color outline hides anti-aliasing seams between triangles
        self.context.set_stroke_style_str(&css);
        self.context.stroke();
    }
}

impl GraphicsEngine for CanvasEngine {
    type Geometry = Mesh;
    type Material = Rgb;

    fn create_geometry(&mut self, definition: &MeshDefinition) -> Mesh {
        definition.to_mesh()
    }

    fn create_material(&mut self, color: Rgb) -> Rgb {
        color
    }

    fn set_material_color(&mut self, material: &mut Rgb, color: Rgb) {
        *material = color;
    }

    fn dispose_geometry(&mut self, geometry: Mesh) {
        tracing::trace!(triangles = geometry.triangles.len(), "geometry disposed");
    }

    fn dispose_material(&mut self, _material: Rgb) {}

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
    }

    fn render(&mut self, frame: Frame<'_, Mesh, Rgb>) {
        let Viewport { width, height } = frame.viewport;
        self.context.set_fill_style_str(BACKGROUND);
        self.context.fill_rect(0.0, 0.0, width as f64, height as f64);

        for triangle in paint_order(frame.geometry, &frame.model, frame.camera, width, height) {
            self.fill_triangle(&triangle, *frame.material);
        }
    }
}

/// Visible triangles sorted back to front
pub fn paint_order(
    mesh: &Mesh,
    model_matrix: &Matrix4<f32>,
    camera: &Camera,
    width: u32,
    height: u32,
) -> Vec<ProjectedTriangle> {
    let view_projection = camera.view_projection();
    let mut visible: Vec<ProjectedTriangle> = mesh
        .triangles
        .iter()
        .filter_map(|triangle| {
            camera.project_triangle(triangle, model_matrix, &view_projection, width, height)
        })
        .collect();
    visible.sort_by(|a, b| b.depth().total_cmp(&a.depth()));
    visible
}

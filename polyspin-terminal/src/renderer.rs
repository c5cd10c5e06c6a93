/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use polyspin_core::{
    Camera, Frame, GraphicsEngine, Lighting, Mesh, MeshDefinition, Rgb, Triangle, Viewport,
};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Pixel footprint of one terminal cell
pub const CELL_WIDTH: u32 = 8;
pub const CELL_HEIGHT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Rgb,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: Rgb::new(0, 0, 0),
};

/// ASCII renderer that converts the polyhedron to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cell_buffer: Vec<Cell>,
    lighting: Lighting,
    live_geometries: usize,
    live_materials: usize,
}

impl AsciiRenderer {
    /// `width` and `height` are in cells
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cell_buffer: vec![BLANK; size],
            lighting: Lighting::default(),
            live_geometries: 0,
            live_materials: 0,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Geometries and materials created but not yet disposed
    pub fn live_resources(&self) -> (usize, usize) {
        (self.live_geometries, self.live_materials)
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.cell_buffer[y * self.width + x].character
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cell_buffer.fill(BLANK);
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, color: Rgb, model_matrix: &Matrix4<f32>, camera: &Camera) {
        let view_projection = camera.view_projection();
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, color, model_matrix, &view_projection, camera);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        color: Rgb,
        model_matrix: &Matrix4<f32>,
        view_projection: &Matrix4<f32>,
        camera: &Camera,
    ) {
        // Culled or clipped triangles come back as None
        let Some(projected) = camera.project_triangle(
            triangle,
            model_matrix,
            view_projection,
            self.width as u32,
            self.height as u32,
        ) else {
            return;
        };

        let intensity = self.lighting.intensity(&projected.normal);
        let ramp_position = (intensity / 1.3).clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32;
        let character = LUMINOSITY_RAMP[ramp_position.round() as usize];
        let cell = Cell {
            character,
            color: self.lighting.shade(color, &projected.normal),
        };

        self.rasterize_triangle(&projected.screen, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.cell_buffer[idx] = cell;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<Rgb> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_buffer[y * self.width + x];
                if cell.character != ' ' && current != Some(cell.color) {
                    let Rgb { r, g, b } = cell.color;
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl GraphicsEngine for AsciiRenderer {
    type Geometry = Mesh;
    type Material = Rgb;

    fn create_geometry(&mut self, definition: &MeshDefinition) -> Mesh {
        self.live_geometries += 1;
        definition.to_mesh()
    }

    fn create_material(&mut self, color: Rgb) -> Rgb {
        self.live_materials += 1;
        color
    }

    fn set_material_color(&mut self, material: &mut Rgb, color: Rgb) {
        *material = color;
    }

    fn dispose_geometry(&mut self, geometry: Mesh) {
        self.live_geometries -= 1;
        tracing::trace!(triangles = geometry.triangles.len(), "geometry disposed");
    }

    fn dispose_material(&mut self, _material: Rgb) {
        self.live_materials -= 1;
    }

    fn resize(&mut self, viewport: Viewport) {
        let width = (viewport.width / CELL_WIDTH) as usize;
        let height = (viewport.height / CELL_HEIGHT) as usize;
        if (width, height) != (self.width, self.height) {
            *self = Self {
                live_geometries: self.live_geometries,
                live_materials: self.live_materials,
                ..Self::new(width, height)
            };
        }
    }

    fn render(&mut self, frame: Frame<'_, Mesh, Rgb>) {
        self.clear();
        self.render_mesh(frame.geometry, *frame.material, &frame.model, frame.camera);
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

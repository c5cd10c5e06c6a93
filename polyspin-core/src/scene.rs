/// The owning context: shape state, interaction state machine, live mesh,
/// camera and viewport layout, driven by a frontend and drawn through a
/// [`GraphicsEngine`].
use nalgebra::Matrix4;

use crate::config::Config;
use crate::geometry::{build_geometry, FaceCount, MeshDefinition};
use crate::interaction::{AnimationMode, Interaction, InteractionState, PointerEvent};
use crate::projection::Camera;
use crate::shape::{Axis, Channel, Rgb, ShapeConfig};
use crate::transform::{Orientation, Transform};

/// Viewports at most this wide (px) count as narrow
pub const NARROW_VIEWPORT_WIDTH: u32 = 600;

/// Upward mesh shift on narrow viewports while the panel is expanded
pub const NARROW_PANEL_OFFSET: f32 = 15.0;

/// Rendering collaborator. Resources are created and released explicitly;
/// the scene guarantees every created geometry and material is disposed
/// exactly once.
pub trait GraphicsEngine {
    type Geometry;
    type Material;

    fn create_geometry(&mut self, definition: &MeshDefinition) -> Self::Geometry;
    fn create_material(&mut self, color: Rgb) -> Self::Material;
    fn set_material_color(&mut self, material: &mut Self::Material, color: Rgb);
    fn dispose_geometry(&mut self, geometry: Self::Geometry);
    fn dispose_material(&mut self, material: Self::Material);
    fn resize(&mut self, viewport: Viewport);
    fn render(&mut self, frame: Frame<'_, Self::Geometry, Self::Material>);
}

/// Everything needed to draw one frame
pub struct Frame<'a, G, M> {
    pub geometry: &'a G,
    pub material: &'a M,
    pub model: Matrix4<f32>,
    pub camera: &'a Camera,
    pub viewport: Viewport,
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_narrow(&self) -> bool {
        self.width <= NARROW_VIEWPORT_WIDTH
    }
}

struct LiveMesh<G, M> {
    geometry: G,
    material: M,
}

pub struct Scene<E: GraphicsEngine> {
    engine: E,
    shape: ShapeConfig,
    interaction: Interaction,
    orientation: Orientation,
    mesh: Option<LiveMesh<E::Geometry, E::Material>>,
    camera: Camera,
    viewport: Viewport,
    panel_expanded: bool,
    position_y: f32,
}

impl<E: GraphicsEngine> Scene<E> {
    pub fn new(mut engine: E, config: &Config, viewport: Viewport) -> Self {
        engine.resize(viewport);
        let mut scene = Self {
            engine,
            shape: config.shape,
            interaction: Interaction::new(config.initial_mode()),
            orientation: Orientation::identity(),
            mesh: None,
            camera: Camera::new(viewport.width, viewport.height),
            viewport,
            panel_expanded: config.panel.expanded,
            position_y: 0.0,
        };
        scene.rebuild_mesh();
        scene.update_layout();
        scene
    }

    pub fn shape(&self) -> &ShapeConfig {
        &self.shape
    }

    pub fn mode(&self) -> AnimationMode {
        self.interaction.mode()
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn position_y(&self) -> f32 {
        self.position_y
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn panel_expanded(&self) -> bool {
        self.panel_expanded
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::model_matrix(self.position_y, &self.orientation, self.shape.mesh_scale())
    }

    /// Switch polyhedron; rebuilds geometry only when the shape changes
    pub fn set_face_count(&mut self, face_count: FaceCount) {
        if self.shape.set_face_count(face_count) {
            self.rebuild_mesh();
            self.update_layout();
        }
    }

    /// Returns whether the size was accepted
    pub fn set_size(&mut self, size: f32) -> bool {
        let accepted = self.shape.set_size(size);
        if accepted {
            tracing::debug!(size, scale = self.shape.mesh_scale(), "size changed");
        }
        accepted
    }

    pub fn set_color_channel(&mut self, channel: Channel, value: u8) {
        self.shape.set_color_channel(channel, value);
        self.apply_color();
    }

    /// Returns whether the rate was accepted
    pub fn set_velocity(&mut self, axis: Axis, value: f32) -> bool {
        self.shape.set_velocity(axis, value)
    }

    /// Play/pause; returns the new mode, or `None` when a drag dropped it
    pub fn toggle(&mut self) -> Option<AnimationMode> {
        self.interaction.toggle()
    }

    /// Feed viewport input; returns the new mode when it changed
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<AnimationMode> {
        let before = self.interaction.mode();
        self.interaction.handle_pointer(event, &mut self.orientation);
        let after = self.interaction.mode();
        (before != after).then_some(after)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        tracing::debug!(width = viewport.width, height = viewport.height, "resize");
        self.viewport = viewport;
        self.camera.set_viewport(viewport.width, viewport.height);
        self.engine.resize(viewport);
        self.update_layout();
    }

    /// Collapse or expand the control panel; returns the new state
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_expanded = !self.panel_expanded;
        self.update_layout();
        self.panel_expanded
    }

    /// Advance automatic rotation by one tick and draw
    pub fn frame(&mut self) {
        self.interaction.tick(&self.shape.velocity, &mut self.orientation);
        self.render();
    }

    pub fn render(&mut self) {
        let model = self.model_matrix();
        if let Some(mesh) = &self.mesh {
            self.engine.render(Frame {
                geometry: &mesh.geometry,
                material: &mesh.material,
                model,
                camera: &self.camera,
                viewport: self.viewport,
            });
        }
    }

    /// Replace the live mesh for the current face count. Orientation lives
    /// on the scene, so it survives the swap; scale and color are read from
    /// the shape when drawing and creating the material.
    fn rebuild_mesh(&mut self) {
        self.release_mesh();
        let definition = build_geometry(self.shape.face_count);
        tracing::info!(
            shape = self.shape.face_count.name(),
            vertices = definition.vertex_count(),
            faces = definition.face_count(),
            "building polyhedron"
        );
        let geometry = self.engine.create_geometry(&definition);
        let material = self.engine.create_material(self.shape.color);
        self.mesh = Some(LiveMesh { geometry, material });
    }

    fn release_mesh(&mut self) {
        if let Some(LiveMesh { geometry, material }) = self.mesh.take() {
            self.engine.dispose_geometry(geometry);
            self.engine.dispose_material(material);
        }
    }

    fn apply_color(&mut self) {
        if let Some(mesh) = &mut self.mesh {
            self.engine
                .set_material_color(&mut mesh.material, self.shape.color);
        }
    }

    fn update_layout(&mut self) {
        self.position_y = if self.viewport.is_narrow() && self.panel_expanded {
            NARROW_PANEL_OFFSET
        } else {
            0.0
        };
    }
}

impl<E: GraphicsEngine> Drop for Scene<E> {
    fn drop(&mut self) {
        self.release_mesh();
    }
}

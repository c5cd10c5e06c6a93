/// Play/pause and drag-rotation state machine.
///
/// Automatic spin runs only while the mode is `Playing` and no drag session
/// exists. A drag forces the mode to `Paused` for its duration and decides
/// the mode on release: mouse drags restore the previous mode, touch drags
/// restore it too, and a touch that never moved past the tap threshold
/// flips it.
use nalgebra::{Point2, Vector2};

use crate::shape::AngularVelocity;
use crate::transform::Orientation;

/// Radians of rotation per pixel of pointer travel
pub const DRAG_SENSITIVITY: f32 = 0.005;

/// Touch travel (pixels, per axis, per move) beyond which a touch is a drag
pub const TAP_THRESHOLD: f32 = 2.0;

/// Radians per frame per unit of angular velocity
pub const SPIN_SCALE: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    #[default]
    Playing,
    Paused,
}

impl AnimationMode {
    pub fn toggled(self) -> Self {
        match self {
            AnimationMode::Playing => AnimationMode::Paused,
            AnimationMode::Paused => AnimationMode::Playing,
        }
    }

    pub fn is_playing(self) -> bool {
        self == AnimationMode::Playing
    }

    pub fn from_playing(playing: bool) -> Self {
        if playing {
            AnimationMode::Playing
        } else {
            AnimationMode::Paused
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationMode::Playing => "playing",
            AnimationMode::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

impl MouseButton {
    /// DOM `MouseEvent.button` numbering
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Primary,
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            _ => MouseButton::Other,
        }
    }
}

/// Raw viewport input, before any gating
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    MouseDown {
        button: MouseButton,
        position: Point2<f32>,
    },
    MouseMove {
        position: Point2<f32>,
    },
    MouseUp {
        button: MouseButton,
    },
    /// `touch_count` is the number of touches currently on the surface;
    /// `position` is the first of them
    TouchStart {
        touch_count: usize,
        position: Point2<f32>,
    },
    TouchMove {
        touch_count: usize,
        position: Point2<f32>,
    },
    /// `remaining` is the number of touches still on the surface
    TouchEnd {
        remaining: usize,
    },
}

/// Observable state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Auto,
    Paused,
    Dragging,
}

/// One pointer or touch driving manual rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub source: InputSource,
    pub last_position: Point2<f32>,
    pub was_playing_before_drag: bool,
    pub has_moved_beyond_threshold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    mode: AnimationMode,
    drag: Option<DragSession>,
}

impl Interaction {
    pub fn new(mode: AnimationMode) -> Self {
        Self { mode, drag: None }
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn state(&self) -> InteractionState {
        match (self.drag, self.mode) {
            (Some(_), _) => InteractionState::Dragging,
            (None, AnimationMode::Playing) => InteractionState::Auto,
            (None, AnimationMode::Paused) => InteractionState::Paused,
        }
    }

    /// Flip play/pause. Dropped while dragging, returning `None`.
    pub fn toggle(&mut self) -> Option<AnimationMode> {
        if self.drag.is_some() {
            tracing::trace!("toggle dropped during drag");
            return None;
        }
        let next = self.mode.toggled();
        tracing::info!("toggled from {} to {}", self.mode.as_str(), next.as_str());
        self.mode = next;
        Some(next)
    }

    /// Begin a drag session; ignored if one is already active
    pub fn drag_start(&mut self, source: InputSource, position: Point2<f32>) -> bool {
        if self.drag.is_some() {
            tracing::trace!(?source, "drag start ignored, session already active");
            return false;
        }
        let was_playing = self.mode.is_playing();
        self.drag = Some(DragSession {
            source,
            last_position: position,
            was_playing_before_drag: was_playing,
            has_moved_beyond_threshold: false,
        });
        self.mode = AnimationMode::Paused;
        tracing::debug!(?source, was_playing, "drag started");
        true
    }

    /// Rotate by the pointer travel since the last position: pitch from the
    /// vertical delta first, then yaw from the horizontal delta.
    pub fn drag_move(
        &mut self,
        source: InputSource,
        position: Point2<f32>,
        orientation: &mut Orientation,
    ) -> bool {
        let Some(session) = self.drag.as_mut().filter(|s| s.source == source) else {
            return false;
        };
        let delta: Vector2<f32> = position - session.last_position;

        if source == InputSource::Touch
            && (delta.x.abs() > TAP_THRESHOLD || delta.y.abs() > TAP_THRESHOLD)
        {
            session.has_moved_beyond_threshold = true;
        }

        orientation.pitch(delta.y * DRAG_SENSITIVITY);
        orientation.yaw(delta.x * DRAG_SENSITIVITY);

        session.last_position = position;
        true
    }

    /// Close the session opened by `source`, settling the animation mode
    pub fn drag_end(&mut self, source: InputSource) -> Option<AnimationMode> {
        let session = match self.drag {
            Some(session) if session.source == source => session,
            _ => {
                tracing::trace!(?source, "drag end without matching session");
                return None;
            }
        };
        self.drag = None;

        let was_playing = session.was_playing_before_drag;
        self.mode = match source {
            InputSource::Touch if !session.has_moved_beyond_threshold => {
                // A tap toggles relative to the mode before the touch
                AnimationMode::from_playing(!was_playing)
            }
            _ => AnimationMode::from_playing(was_playing),
        };
        tracing::debug!(
            ?source,
            tap = source == InputSource::Touch && !session.has_moved_beyond_threshold,
            mode = self.mode.as_str(),
            "drag ended"
        );
        Some(self.mode)
    }

    /// Gate raw viewport input onto the drag transitions
    pub fn handle_pointer(&mut self, event: PointerEvent, orientation: &mut Orientation) {
        match event {
            PointerEvent::MouseDown {
                button: MouseButton::Primary,
                position,
            } => {
                self.drag_start(InputSource::Mouse, position);
            }
            PointerEvent::MouseMove { position } => {
                self.drag_move(InputSource::Mouse, position, orientation);
            }
            PointerEvent::MouseUp {
                button: MouseButton::Primary,
            } => {
                self.drag_end(InputSource::Mouse);
            }
            PointerEvent::TouchStart {
                touch_count: 1,
                position,
            } => {
                self.drag_start(InputSource::Touch, position);
            }
            PointerEvent::TouchMove {
                touch_count: 1,
                position,
            } => {
                self.drag_move(InputSource::Touch, position, orientation);
            }
            PointerEvent::TouchEnd { remaining: 0 } => {
                self.drag_end(InputSource::Touch);
            }
            other => tracing::trace!(?other, "pointer event ignored"),
        }
    }

    /// Automatic spin for one frame: pitch from `y`, yaw about world Y
    /// from `x`, roll about world -Z from `z`. No-op unless in `Auto`.
    pub fn tick(&self, velocity: &AngularVelocity, orientation: &mut Orientation) -> bool {
        if self.state() != InteractionState::Auto {
            return false;
        }
        orientation.pitch(velocity.y * SPIN_SCALE);
        orientation.yaw(velocity.x * SPIN_SCALE);
        orientation.roll(velocity.z * SPIN_SCALE);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn point(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn assert_same_rotation(actual: &Orientation, expected: &UnitQuaternion<f32>) {
        assert_relative_eq!(actual.quaternion().angle_to(expected), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_toggle_is_involution() {
        for start in [AnimationMode::Playing, AnimationMode::Paused] {
            let mut interaction = Interaction::new(start);
            assert_eq!(interaction.toggle(), Some(start.toggled()));
            assert_eq!(interaction.toggle(), Some(start));
            assert_eq!(interaction.mode(), start);
        }
    }

    #[test]
    fn test_toggle_dropped_while_dragging() {
        let mut interaction = Interaction::new(AnimationMode::Playing);
        interaction.drag_start(InputSource::Mouse, point(0.0, 0.0));
        assert_eq!(interaction.toggle(), None);
        assert_eq!(interaction.toggle(), None);
        assert_eq!(interaction.state(), InteractionState::Dragging);
        assert_eq!(interaction.mode(), AnimationMode::Paused);

        // Not queued: release restores the pre-drag mode only
        assert_eq!(interaction.drag_end(InputSource::Mouse), Some(AnimationMode::Playing));
    }

    #[test]
    fn test_drag_start_forces_pause() {
        let mut interaction = Interaction::new(AnimationMode::Playing);
        assert!(interaction.drag_start(InputSource::Touch, point(5.0, 6.0)));
        let session = interaction.drag_session().unwrap();
        assert!(session.was_playing_before_drag);
        assert!(!session.has_moved_beyond_threshold);
        assert_eq!(session.last_position, point(5.0, 6.0));
        assert_eq!(interaction.mode(), AnimationMode::Paused);

        // Only one session at a time
        assert!(!interaction.drag_start(InputSource::Mouse, point(0.0, 0.0)));
        assert_eq!(interaction.drag_session().unwrap().source, InputSource::Touch);
    }

    #[test]
    fn test_mouse_click_restores_mode() {
        for start in [AnimationMode::Playing, AnimationMode::Paused] {
            let mut interaction = Interaction::new(start);
            interaction.drag_start(InputSource::Mouse, point(10.0, 10.0));
            assert_eq!(interaction.drag_end(InputSource::Mouse), Some(start));
            assert!(!interaction.is_dragging());
        }
    }

    #[test]
    fn test_touch_tap_flips_mode() {
        for start in [AnimationMode::Playing, AnimationMode::Paused] {
            let mut interaction = Interaction::new(start);
            let mut orientation = Orientation::identity();
            interaction.drag_start(InputSource::Touch, point(50.0, 50.0));
            // Small jitter stays a tap
            interaction.drag_move(InputSource::Touch, point(52.0, 48.0), &mut orientation);
            assert_eq!(interaction.drag_end(InputSource::Touch), Some(start.toggled()));
        }
    }

    #[test]
    fn test_touch_drag_restores_mode() {
        for start in [AnimationMode::Playing, AnimationMode::Paused] {
            let mut interaction = Interaction::new(start);
            let mut orientation = Orientation::identity();
            interaction.drag_start(InputSource::Touch, point(50.0, 50.0));
            interaction.drag_move(InputSource::Touch, point(53.0, 50.0), &mut orientation);
            assert!(interaction.drag_session().unwrap().has_moved_beyond_threshold);
            // Coming back does not undo the drag
            interaction.drag_move(InputSource::Touch, point(50.0, 50.0), &mut orientation);
            assert_eq!(interaction.drag_end(InputSource::Touch), Some(start));
        }
    }

    #[test]
    fn test_threshold_is_per_move() {
        let mut interaction = Interaction::new(AnimationMode::Paused);
        let mut orientation = Orientation::identity();
        interaction.drag_start(InputSource::Touch, point(0.0, 0.0));
        // Many small steps add up to a long path but never exceed 2px each
        for i in 1..=10 {
            let p = point(2.0 * i as f32, 0.0);
            interaction.drag_move(InputSource::Touch, p, &mut orientation);
        }
        assert!(!interaction.drag_session().unwrap().has_moved_beyond_threshold);
        assert_eq!(interaction.drag_end(InputSource::Touch), Some(AnimationMode::Playing));
    }

    #[test]
    fn test_mouse_drag_scenario() {
        let mut interaction = Interaction::new(AnimationMode::Playing);
        let mut orientation = Orientation::identity();

        interaction.drag_start(InputSource::Mouse, point(100.0, 100.0));
        interaction.drag_move(InputSource::Mouse, point(110.0, 105.0), &mut orientation);
        assert_eq!(interaction.drag_end(InputSource::Mouse), Some(AnimationMode::Playing));

        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.05)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.025);
        assert_same_rotation(&orientation, &expected);
        let (pitch, yaw, _) = orientation.euler_xyz();
        assert_relative_eq!(pitch, 0.025, epsilon = 1e-4);
        assert_relative_eq!(yaw, 0.05, epsilon = 1e-4);
    }

    #[test]
    fn test_moves_without_session_are_ignored() {
        let mut interaction = Interaction::new(AnimationMode::Playing);
        let mut orientation = Orientation::identity();
        assert!(!interaction.drag_move(InputSource::Mouse, point(40.0, 40.0), &mut orientation));
        assert_eq!(orientation, Orientation::identity());

        // Mouse travel cannot steer a touch session
        interaction.drag_start(InputSource::Touch, point(0.0, 0.0));
        assert!(!interaction.drag_move(InputSource::Mouse, point(40.0, 40.0), &mut orientation));
        assert_eq!(orientation, Orientation::identity());
    }

    #[test]
    fn test_malformed_sequences_are_ignored() {
        let mut interaction = Interaction::new(AnimationMode::Paused);
        let mut orientation = Orientation::identity();

        interaction.handle_pointer(PointerEvent::TouchEnd { remaining: 0 }, &mut orientation);
        interaction.handle_pointer(
            PointerEvent::MouseUp {
                button: MouseButton::Primary,
            },
            &mut orientation,
        );
        assert_eq!(interaction.state(), InteractionState::Paused);

        // Secondary button neither starts nor ends a drag
        interaction.handle_pointer(
            PointerEvent::MouseDown {
                button: MouseButton::Secondary,
                position: point(1.0, 1.0),
            },
            &mut orientation,
        );
        assert!(!interaction.is_dragging());

        interaction.handle_pointer(
            PointerEvent::MouseDown {
                button: MouseButton::Primary,
                position: point(1.0, 1.0),
            },
            &mut orientation,
        );
        interaction.handle_pointer(
            PointerEvent::MouseUp {
                button: MouseButton::Secondary,
            },
            &mut orientation,
        );
        assert!(interaction.is_dragging());

        // A touch end cannot close a mouse session
        interaction.handle_pointer(PointerEvent::TouchEnd { remaining: 0 }, &mut orientation);
        assert!(interaction.is_dragging());
    }

    #[test]
    fn test_multi_touch_ignored() {
        let mut interaction = Interaction::new(AnimationMode::Playing);
        let mut orientation = Orientation::identity();

        interaction.handle_pointer(
            PointerEvent::TouchStart {
                touch_count: 2,
                position: point(0.0, 0.0),
            },
            &mut orientation,
        );
        assert!(!interaction.is_dragging());

        interaction.handle_pointer(
            PointerEvent::TouchStart {
                touch_count: 1,
                position: point(0.0, 0.0),
            },
            &mut orientation,
        );
        interaction.handle_pointer(
            PointerEvent::TouchMove {
                touch_count: 2,
                position: point(30.0, 30.0),
            },
            &mut orientation,
        );
        assert_eq!(orientation, Orientation::identity());

        // Lifting one of two fingers keeps the session open
        interaction.handle_pointer(PointerEvent::TouchEnd { remaining: 1 }, &mut orientation);
        assert!(interaction.is_dragging());
        interaction.handle_pointer(PointerEvent::TouchEnd { remaining: 0 }, &mut orientation);
        // Untouched session is a tap
        assert_eq!(interaction.mode(), AnimationMode::Paused);
    }

    #[test]
    fn test_tick_only_in_auto() {
        let velocity = AngularVelocity::new(20.0, 20.0, 20.0);
        let mut orientation = Orientation::identity();

        let mut interaction = Interaction::new(AnimationMode::Paused);
        assert!(!interaction.tick(&velocity, &mut orientation));
        assert_eq!(orientation, Orientation::identity());

        interaction.toggle();
        assert!(interaction.tick(&velocity, &mut orientation));
        let after_one = orientation;
        assert_ne!(after_one, Orientation::identity());

        interaction.drag_start(InputSource::Mouse, point(0.0, 0.0));
        assert!(!interaction.tick(&velocity, &mut orientation));
        assert_eq!(orientation, after_one);
    }

    #[test]
    fn test_auto_spin_composition() {
        let velocity = AngularVelocity::new(20.0, 20.0, 20.0);
        let interaction = Interaction::new(AnimationMode::Playing);
        let mut orientation = Orientation::identity();

        let step = 20.0 * SPIN_SCALE;
        let y_axis = Vector3::y_axis();
        let neg_z = nalgebra::Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0));
        let mut expected = Orientation::identity();
        for _ in 0..50 {
            interaction.tick(&velocity, &mut orientation);
            expected.pitch(step);
            expected.rotate_on_world_axis(y_axis, step);
            expected.rotate_on_world_axis(neg_z, step);
        }
        assert_same_rotation(&orientation, expected.quaternion());
    }

    #[test]
    fn test_single_axis_spin_accumulates() {
        let interaction = Interaction::new(AnimationMode::Playing);
        let n = 100;

        let mut yaw_only = Orientation::identity();
        for _ in 0..n {
            interaction.tick(&AngularVelocity::new(20.0, 0.0, 0.0), &mut yaw_only);
        }
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), n as f32 * 0.02);
        assert_same_rotation(&yaw_only, &expected);

        let mut pitch_only = Orientation::identity();
        for _ in 0..n {
            interaction.tick(&AngularVelocity::new(0.0, 20.0, 0.0), &mut pitch_only);
        }
        let (pitch, _, _) = pitch_only.euler_xyz();
        assert_relative_eq!(pitch, n as f32 * 0.02, epsilon = 1e-4);

        let mut roll_only = Orientation::identity();
        for _ in 0..n {
            interaction.tick(&AngularVelocity::new(0.0, 0.0, 20.0), &mut roll_only);
        }
        let (_, _, z) = roll_only.euler_xyz();
        // Roll about -Z shows up as a negative Euler z
        assert_relative_eq!(z, -(n as f32) * 0.02, epsilon = 1e-4);
    }
}

/// Terminal frontend: drives a polyspin scene from keyboard, mouse and
/// resize events and draws it with the ASCII rasterizer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton as TermMouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use nalgebra::Point2;
use polyspin_core::{
    AnimationMode, Axis, Channel, Config, FaceCount, MouseButton, PointerEvent, Scene, Viewport,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod cli;
pub mod renderer;

pub use cli::Cli;
pub use renderer::{AsciiRenderer, CELL_HEIGHT, CELL_WIDTH};

const VELOCITY_STEP: f32 = 5.0;
const SIZE_STEP: f32 = 1.0;
const COLOR_STEP: u8 = 15;

/// What a key press asks the scene to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    TogglePlay,
    Shape(FaceCount),
    Velocity(Axis, f32),
    Size(f32),
    Color(Channel, i16),
    TogglePanel,
}

/// Key bindings; `None` for unbound keys and key releases
pub fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char(' ') => Action::TogglePlay,
        KeyCode::Char(digit @ '1'..='6') => {
            let index = digit as usize - '1' as usize;
            Action::Shape(FaceCount::ALL[index])
        }
        KeyCode::Char('x') => Action::Velocity(Axis::X, -VELOCITY_STEP),
        KeyCode::Char('X') => Action::Velocity(Axis::X, VELOCITY_STEP),
        KeyCode::Char('y') => Action::Velocity(Axis::Y, -VELOCITY_STEP),
        KeyCode::Char('Y') => Action::Velocity(Axis::Y, VELOCITY_STEP),
        KeyCode::Char('z') => Action::Velocity(Axis::Z, -VELOCITY_STEP),
        KeyCode::Char('Z') => Action::Velocity(Axis::Z, VELOCITY_STEP),
        KeyCode::Char('-') => Action::Size(-SIZE_STEP),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Size(SIZE_STEP),
        KeyCode::Char('r') => Action::Color(Channel::Red, -(COLOR_STEP as i16)),
        KeyCode::Char('R') => Action::Color(Channel::Red, COLOR_STEP as i16),
        KeyCode::Char('g') => Action::Color(Channel::Green, -(COLOR_STEP as i16)),
        KeyCode::Char('G') => Action::Color(Channel::Green, COLOR_STEP as i16),
        KeyCode::Char('b') => Action::Color(Channel::Blue, -(COLOR_STEP as i16)),
        KeyCode::Char('B') => Action::Color(Channel::Blue, COLOR_STEP as i16),
        KeyCode::Char('c') => Action::TogglePanel,
        _ => return None,
    };
    Some(action)
}

/// Mouse input in cell coordinates to a pixel-space pointer event
pub fn pointer_event(mouse: MouseEvent) -> Option<PointerEvent> {
    let position = Point2::new(
        (mouse.column as u32 * CELL_WIDTH) as f32,
        (mouse.row as u32 * CELL_HEIGHT) as f32,
    );
    let button = |button: TermMouseButton| match button {
        TermMouseButton::Left => MouseButton::Primary,
        TermMouseButton::Right => MouseButton::Secondary,
        TermMouseButton::Middle => MouseButton::Middle,
    };
    match mouse.kind {
        MouseEventKind::Down(b) => Some(PointerEvent::MouseDown {
            button: button(b),
            position,
        }),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => {
            Some(PointerEvent::MouseMove { position })
        }
        MouseEventKind::Up(b) => Some(PointerEvent::MouseUp { button: button(b) }),
        _ => None,
    }
}

pub fn viewport_for_cells(columns: u16, rows: u16) -> Viewport {
    Viewport::new(columns as u32 * CELL_WIDTH, rows as u32 * CELL_HEIGHT)
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Scene<AsciiRenderer>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &Config) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_viewport(config, viewport_for_cells(width, height)))
    }

    pub fn with_viewport(config: &Config, viewport: Viewport) -> Self {
        Self {
            scene: Scene::new(AsciiRenderer::new(0, 0), config, viewport),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene<AsciiRenderer> {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 60); // 60 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            self.scene.frame();
            self.draw()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if let Some(action) = key_action(key) {
                    self.apply(action);
                }
            }
            Event::Mouse(mouse) => {
                if let Some(pointer) = pointer_event(mouse) {
                    self.scene.handle_pointer(pointer);
                }
            }
            Event::Resize(width, height) => {
                self.scene.resize(viewport_for_cells(width, height));
            }
            _ => {}
        }
    }

    pub fn apply(&mut self, action: Action) {
        let shape = *self.scene.shape();
        match action {
            Action::Quit => self.running = false,
            Action::TogglePlay => {
                self.scene.toggle();
            }
            Action::Shape(face_count) => self.scene.set_face_count(face_count),
            Action::Velocity(axis, step) => {
                self.scene.set_velocity(axis, shape.velocity.get(axis) + step);
            }
            Action::Size(step) => {
                self.scene.set_size((shape.size + step).max(1.0));
            }
            Action::Color(channel, step) => {
                let value = (shape.color.channel(channel) as i16 + step).clamp(0, 255) as u8;
                self.scene.set_color_channel(channel, value);
            }
            Action::TogglePanel => {
                self.scene.toggle_panel();
            }
        }
    }

    /// Readout lines mirroring every control's current value
    pub fn panel_lines(&self) -> Vec<String> {
        if !self.scene.panel_expanded() {
            return vec!["[c] + Controls".to_string()];
        }
        let shape = self.scene.shape();
        let play_label = match self.scene.mode() {
            AnimationMode::Playing => "Pause",
            AnimationMode::Paused => "Play",
        };
        vec![
            "[c] – Controls".to_string(),
            format!("[Space] {play_label}"),
            format!(
                "[1-6] Faces: {} ({})",
                shape.face_count.faces(),
                shape.face_count.name()
            ),
            format!("[x/X] velX: {}", shape.velocity.x),
            format!("[y/Y] velY: {}", shape.velocity.y),
            format!("[z/Z] velZ: {}", shape.velocity.z),
            format!("[-/+] size: {}", shape.size),
            format!("[r/R] red: {}", shape.color.r),
            format!("[g/G] green: {}", shape.color.g),
            format!("[b/B] blue: {}", shape.color.b),
            "[q] Quit".to_string(),
        ]
    }

    fn draw(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.scene.engine().draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Polyspin | {} | FPS: {:.1}",
                self.scene.mode().as_str(),
                self.fps
            )),
            ResetColor
        )?;
        for (row, line) in self.panel_lines().iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, row as u16 + 1),
                SetForegroundColor(Color::Grey),
                Print(line),
                ResetColor
            )?;
        }

        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn app() -> TerminalApp {
        TerminalApp::with_viewport(&Config::default(), viewport_for_cells(120, 40))
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(press(KeyCode::Char(' '))), Some(Action::TogglePlay));
        assert_eq!(
            key_action(press(KeyCode::Char('5'))),
            Some(Action::Shape(FaceCount::Dodecahedron))
        );
        assert_eq!(key_action(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(key_action(press(KeyCode::Char('7'))), None);

        let release = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(key_action(release), None);
    }

    #[test]
    fn test_space_toggles_twice() {
        let mut app = app();
        app.handle_event(Event::Key(press(KeyCode::Char(' '))));
        assert_eq!(app.scene().mode(), AnimationMode::Paused);
        app.handle_event(Event::Key(press(KeyCode::Char(' '))));
        assert_eq!(app.scene().mode(), AnimationMode::Playing);
    }

    #[test]
    fn test_value_keys_adjust_and_clamp() {
        let mut app = app();
        app.apply(Action::Velocity(Axis::Z, -25.0));
        assert_eq!(app.scene().shape().velocity.z, -5.0);

        for _ in 0..50 {
            app.apply(Action::Size(-SIZE_STEP));
        }
        assert_eq!(app.scene().shape().size, 1.0);

        for _ in 0..20 {
            app.apply(Action::Color(Channel::Blue, COLOR_STEP as i16));
            app.apply(Action::Color(Channel::Red, -(COLOR_STEP as i16)));
        }
        assert_eq!(app.scene().shape().color.b, 255);
        assert_eq!(app.scene().shape().color.r, 0);
    }

    #[test]
    fn test_mouse_drag_rotates_and_resumes() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(TermMouseButton::Left), 10, 10));
        assert!(app.scene().interaction().is_dragging());
        app.handle_event(mouse(MouseEventKind::Drag(TermMouseButton::Left), 12, 10));
        app.handle_event(mouse(MouseEventKind::Up(TermMouseButton::Left), 12, 10));

        assert_eq!(app.scene().mode(), AnimationMode::Playing);
        let (_, yaw, _) = app.scene().orientation().euler_xyz();
        // Two cells of 8px each
        assert!((yaw - 16.0 * 0.005).abs() < 1e-4);
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(TermMouseButton::Right), 10, 10));
        assert!(!app.scene().interaction().is_dragging());
    }

    #[test]
    fn test_resize_and_panel_layout() {
        let mut app = app();
        app.handle_event(Event::Resize(50, 40));
        assert_eq!(app.scene().viewport(), Viewport::new(400, 640));
        assert_eq!(app.scene().position_y(), 15.0);

        app.handle_event(Event::Key(press(KeyCode::Char('c'))));
        assert_eq!(app.scene().position_y(), 0.0);
        assert_eq!(app.panel_lines(), vec!["[c] + Controls".to_string()]);
    }

    #[test]
    fn test_panel_mirrors_values() {
        let mut app = app();
        app.apply(Action::Shape(FaceCount::Bipyramid));
        app.apply(Action::TogglePlay);
        let lines = app.panel_lines();
        assert!(lines.contains(&"[Space] Play".to_string()));
        assert!(lines.contains(&"[1-6] Faces: 10 (pentagonal bipyramid)".to_string()));
        assert!(lines.contains(&"[x/X] velX: 20".to_string()));
        assert!(lines.contains(&"[b/B] blue: 255".to_string()));
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.handle_event(Event::Key(press(KeyCode::Char('q'))));
        assert!(!app.is_running());
    }
}

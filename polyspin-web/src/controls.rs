/// Control panel element ids and the value handling behind them
use polyspin_core::{AnimationMode, Axis, Channel, FaceCount, GraphicsEngine, Scene, ShapeConfig};

pub const CANVAS_ID: &str = "viewport";
pub const PLAY_PAUSE_ID: &str = "playPauseBtn";
pub const SIDES_RADIO_NAME: &str = "sides";
pub const SIDES_SELECT_ID: &str = "sidesSelect";
pub const CONTROL_HEADER_ID: &str = "controlHeader";
pub const EXPAND_BUTTON_ID: &str = "expandCollapseBtn";
pub const CONTROLS_CONTENT_ID: &str = "controlsContent";

/// Label of the play/pause button in `mode`
pub fn play_pause_label(mode: AnimationMode) -> &'static str {
    if mode.is_playing() {
        "Pause"
    } else {
        "Play"
    }
}

/// Text of the collapse button while the panel is (not) expanded
pub fn expand_button_text(expanded: bool) -> &'static str {
    if expanded {
        "–"
    } else {
        "+"
    }
}

/// Face count from a radio or select value. Anything unparsable shows a cube.
pub fn parse_sides(raw: &str) -> FaceCount {
    raw.trim()
        .parse::<u32>()
        .map(FaceCount::from)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    VelX,
    VelY,
    VelZ,
    Size,
    Red,
    Green,
    Blue,
}

impl Slider {
    pub const ALL: [Slider; 7] = [
        Slider::VelX,
        Slider::VelY,
        Slider::VelZ,
        Slider::Size,
        Slider::Red,
        Slider::Green,
        Slider::Blue,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Slider::VelX => "velX",
            Slider::VelY => "velY",
            Slider::VelZ => "velZ",
            Slider::Size => "size",
            Slider::Red => "red",
            Slider::Green => "green",
            Slider::Blue => "blue",
        }
    }

    /// Id of the element mirroring this slider's value
    pub fn readout_id(self) -> String {
        format!("{}Val", self.id())
    }

    fn channel(self) -> Option<Channel> {
        match self {
            Slider::Red => Some(Channel::Red),
            Slider::Green => Some(Channel::Green),
            Slider::Blue => Some(Channel::Blue),
            _ => None,
        }
    }

    fn axis(self) -> Option<Axis> {
        match self {
            Slider::VelX => Some(Axis::X),
            Slider::VelY => Some(Axis::Y),
            Slider::VelZ => Some(Axis::Z),
            _ => None,
        }
    }

    /// Parse an input's value. Color channels are integers in 0-255, so
    /// fractions are truncated and out-of-range values clamped.
    pub fn parse(self, raw: &str) -> Option<f32> {
        let value = raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())?;
        Some(match self.channel() {
            Some(_) => value.trunc().clamp(0.0, 255.0),
            None => value,
        })
    }

    /// Readout text for a parsed value
    pub fn readout(self, value: f32) -> String {
        match self.channel() {
            Some(_) => (value as u8).to_string(),
            None => value.to_string(),
        }
    }

    /// The value this slider controls, as currently set
    pub fn current(self, shape: &ShapeConfig) -> f32 {
        if let Some(axis) = self.axis() {
            shape.velocity.get(axis)
        } else if let Some(channel) = self.channel() {
            shape.color.channel(channel) as f32
        } else {
            shape.size
        }
    }

    /// Write a value into startup shape parameters
    pub fn seed(self, shape: &mut ShapeConfig, value: f32) {
        if let Some(axis) = self.axis() {
            shape.set_velocity(axis, value);
        } else if let Some(channel) = self.channel() {
            shape.set_color_channel(channel, value as u8);
        } else {
            shape.set_size(value);
        }
    }

    /// Apply a value to the live scene; returns whether it was accepted
    pub fn apply<E: GraphicsEngine>(self, scene: &mut Scene<E>, value: f32) -> bool {
        if let Some(axis) = self.axis() {
            scene.set_velocity(axis, value)
        } else if let Some(channel) = self.channel() {
            scene.set_color_channel(channel, value as u8);
            true
        } else {
            scene.set_size(value)
        }
    }
}

/// Command-line options layered over the optional config file
use clap::Parser;
use polyspin_core::{AngularVelocity, Axis, Config, ConfigError, FaceCount, Rgb};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "polyspin-terminal", version, about = "A rotating polyhedron in your terminal")]
pub struct Cli {
    /// TOML file with startup settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of faces: 4, 6, 8, 10, 12 or 20 (anything else shows a cube)
    #[arg(short, long)]
    pub faces: Option<u32>,

    /// Polyhedron size
    #[arg(short, long)]
    pub size: Option<f32>,

    /// Color as r,g,b
    #[arg(long, value_parser = parse_rgb)]
    pub color: Option<Rgb>,

    /// Angular velocity as x,y,z
    #[arg(long, value_parser = parse_velocity, allow_hyphen_values = true)]
    pub vel: Option<AngularVelocity>,

    /// Start with the animation paused
    #[arg(long)]
    pub paused: bool,

    /// Start with the control panel collapsed
    #[arg(long)]
    pub collapsed: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(faces) = self.faces {
            config.shape.face_count = FaceCount::from(faces);
        }
        if let Some(size) = self.size {
            config.shape.set_size(size);
        }
        if let Some(color) = self.color {
            config.shape.color = color;
        }
        if let Some(velocity) = self.vel {
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                config.shape.set_velocity(axis, velocity.get(axis));
            }
        }
        if self.paused {
            config.animation.start_paused = true;
        }
        if self.collapsed {
            config.panel.expanded = false;
        }
        Ok(config)
    }
}

fn parse_triple<T: std::str::FromStr>(value: &str, what: &str) -> Result<[T; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(format!("expected three comma-separated {what}, got {value:?}"));
    };
    let parse = |s: &str| s.parse::<T>().map_err(|_| format!("invalid {what} {s:?}"));
    Ok([parse(*a)?, parse(*b)?, parse(*c)?])
}

fn parse_rgb(value: &str) -> Result<Rgb, String> {
    parse_triple::<u8>(value, "channels (0-255)").map(Rgb::from)
}

fn parse_velocity(value: &str) -> Result<AngularVelocity, String> {
    let [x, y, z] = parse_triple::<f32>(value, "rates")?;
    Ok(AngularVelocity::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyspin_core::AnimationMode;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["polyspin-terminal"]).unwrap();
        assert_eq!(cli.resolve_config().unwrap(), Config::default());
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::try_parse_from([
            "polyspin-terminal",
            "--faces",
            "12",
            "--size",
            "18",
            "--color",
            "255, 0, 64",
            "--vel",
            "-10,0,5.5",
            "--paused",
            "--collapsed",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.shape.face_count, FaceCount::Dodecahedron);
        assert_eq!(config.shape.size, 18.0);
        assert_eq!(config.shape.color, Rgb::new(255, 0, 64));
        assert_eq!(config.shape.velocity, AngularVelocity::new(-10.0, 0.0, 5.5));
        assert_eq!(config.initial_mode(), AnimationMode::Paused);
        assert!(!config.panel.expanded);
    }

    #[test]
    fn test_unsupported_faces_fall_back() {
        let cli = Cli::try_parse_from(["polyspin-terminal", "-f", "7"]).unwrap();
        assert_eq!(cli.resolve_config().unwrap().shape.face_count, FaceCount::Cube);
    }

    #[test]
    fn test_invalid_triples_rejected() {
        assert!(Cli::try_parse_from(["polyspin-terminal", "--color", "256,0,0"]).is_err());
        assert!(Cli::try_parse_from(["polyspin-terminal", "--color", "1,2"]).is_err());
        assert!(Cli::try_parse_from(["polyspin-terminal", "--vel", "a,b,c"]).is_err());
    }

    #[test]
    fn test_non_finite_and_non_positive_flags_ignored() {
        let cli = Cli::try_parse_from([
            "polyspin-terminal",
            "--vel",
            "nan,inf,-4",
            "--size=-2",
        ])
        .unwrap();
        let shape = cli.resolve_config().unwrap().shape;
        assert_eq!(shape.velocity, AngularVelocity::new(20.0, 20.0, -4.0));
        assert_eq!(shape.size, 30.0);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli =
            Cli::try_parse_from(["polyspin-terminal", "--config", "/nonexistent/polyspin.toml"])
                .unwrap();
        assert!(matches!(cli.resolve_config(), Err(ConfigError::Io(_))));
    }
}

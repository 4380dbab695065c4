use std::path::PathBuf;
use std::str::FromStr;

use crossterm::style::Color;
use thiserror::Error;

use crate::canvas;
use crate::grid::Topology;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

/// Loop iterations per second
pub const FRAME_RATE: u32 = 30;

/// Side length of a cell, in pixels
pub const CELL_SIZE: usize = 2;

/// Share of live cells when seeding randomly
pub const DENSITY: f32 = 0.25;

pub const COLOR_FG: Color = Color::White;
pub const COLOR_BG: Color = Color::Black;

pub const LOG_FILE: &str = "pixlife.log";

pub const USAGE: &str = "\
Usage: pixlife [OPTIONS] [PATTERN.rle]

Options:
  --rule <RULE>       Birth/survival rule, e.g. B3/S23
  --fps <N>           Frame rate cap, 0 for uncapped
  --cell-size <N>     Side length of a cell in pixels
  --size <WxH>        Display resolution in pixels, defaults to the terminal size
  --wrap              Wrap around the edges of the grid
  --paused            Start paused
  --density <F>       Share of live cells when seeding randomly
  --seed <N>          Seed for random seeding
  --log <FILE>        Log file
  -h, --help          Print this help

Controls:
  space  pause        n  single step     r  randomize      c  clear
  left click  toggle  right click  kill  q, esc  quit      ctrl+c  interrupt
";

/// Display size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    /// The resolution of a terminal of `cols` by `rows` characters
    pub fn of_terminal(cols: u16, rows: u16) -> Self {
        let (width, height) = canvas::pixel_at(cols, rows);

        Self { width, height }
    }
}

impl FromStr for Resolution {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.split_once(['x', 'X']).ok_or(())?;
        let width = w.trim().parse().map_err(|_| ())?;
        let height = h.trim().parse().map_err(|_| ())?;

        Ok(Self { width, height })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Help requested")]
    HelpRequested,

    #[error("Missing value for {flag}")]
    MissingValue { flag: String },

    #[error("Invalid value \"{value}\" for {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Unknown option {0}")]
    UnknownOption(String),

    #[error("Unexpected argument \"{0}\", only one pattern can be loaded")]
    ExtraArgument(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Fixed display size. The terminal size when `None`.
    pub resolution: Option<Resolution>,
    pub frame_rate: u32,
    pub cell_size: usize,

    /// Overrides the rule of a loaded pattern
    pub rule: Option<RuleSet>,
    pub topology: Topology,
    pub paused: bool,
    pub density: f32,
    pub seed: Option<u64>,
    pub foreground: Color,
    pub background: Color,
    pub log_file: PathBuf,

    /// RLE file to seed the grid with instead of random cells
    pub pattern: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: None,
            frame_rate: FRAME_RATE,
            cell_size: CELL_SIZE,
            rule: None,
            topology: Topology::Bounded,
            paused: false,
            density: DENSITY,
            seed: None,
            foreground: COLOR_FG,
            background: COLOR_BG,
            log_file: PathBuf::from(LOG_FILE),
            pattern: None,
        }
    }
}

impl Config {
    /// Build a config from command line arguments, excluding the program name
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next().ok_or_else(|| ConfigError::MissingValue {
                    flag: flag.to_string(),
                })
            };

            match arg.as_str() {
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                "--wrap" => config.topology = Topology::Torus,
                "--paused" => config.paused = true,
                "--rule" => config.rule = Some(value(&arg)?.parse()?),
                "--fps" => config.frame_rate = parse_value(&arg, value(&arg)?)?,
                "--cell-size" => {
                    config.cell_size = parse_value(&arg, value(&arg)?)?;
                    if config.cell_size == 0 {
                        return Err(invalid(&arg, "0"));
                    }
                }
                "--size" => config.resolution = Some(parse_value(&arg, value(&arg)?)?),
                "--density" => {
                    let v = value(&arg)?;
                    config.density = parse_value(&arg, v.clone())?;
                    if !(0.0..=1.0).contains(&config.density) {
                        return Err(invalid(&arg, &v));
                    }
                }
                "--seed" => config.seed = Some(parse_value(&arg, value(&arg)?)?),
                "--log" => config.log_file = PathBuf::from(value(&arg)?),
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ConfigError::UnknownOption(arg));
                }
                _ if config.pattern.is_none() => config.pattern = Some(PathBuf::from(arg)),
                _ => return Err(ConfigError::ExtraArgument(arg)),
            }
        }

        Ok(config)
    }

    /// Display size for a terminal of `cols` by `rows`
    pub fn resolution_for(&self, cols: u16, rows: u16) -> Resolution {
        self.resolution
            .unwrap_or_else(|| Resolution::of_terminal(cols, rows))
    }

    /// Grid dimensions in cells for a display of `resolution`
    pub fn grid_size(&self, resolution: Resolution) -> (usize, usize) {
        (
            resolution.width / self.cell_size,
            resolution.height / self.cell_size,
        )
    }
}

fn invalid(flag: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(flag: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(flag, &value))
}

#[cfg(test)]
mod tests {
    use crate::rule_set::B3S23;

    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.frame_rate, FRAME_RATE);
        assert_eq!(config.resolution_for(10, 5), Resolution { width: 20, height: 20 });
        assert_eq!(config.grid_size(Resolution { width: 20, height: 20 }), (10, 10));
    }

    #[test]
    fn flags() {
        let config = parse(&[
            "--rule", "B36/S23", "--fps", "60", "--cell-size", "4", "--size", "320x200", "--wrap",
            "--paused", "--density", "0.5", "--seed", "42", "--log", "/tmp/life.log", "glider.rle",
        ])
        .unwrap();

        assert_eq!(config.rule, Some(RuleSet::new(0b100_1000, 0b1100)));
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.cell_size, 4);
        assert_eq!(config.resolution, Some(Resolution { width: 320, height: 200 }));
        assert_eq!(config.grid_size(config.resolution_for(1, 1)), (80, 50));
        assert_eq!(config.topology, Topology::Torus);
        assert!(config.paused);
        assert_eq!(config.density, 0.5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_file, PathBuf::from("/tmp/life.log"));
        assert_eq!(config.pattern, Some(PathBuf::from("glider.rle")));
    }

    #[test]
    fn errors() {
        assert_eq!(parse(&["--help"]), Err(ConfigError::HelpRequested));
        assert_eq!(
            parse(&["--fps"]),
            Err(ConfigError::MissingValue { flag: "--fps".into() })
        );
        assert_eq!(
            parse(&["--fps", "fast"]),
            Err(ConfigError::InvalidValue {
                flag: "--fps".into(),
                value: "fast".into()
            })
        );
        assert_eq!(
            parse(&["--density", "2"]),
            Err(ConfigError::InvalidValue {
                flag: "--density".into(),
                value: "2".into()
            })
        );
        assert!(matches!(parse(&["--rule", "B9"]), Err(ConfigError::InvalidRule(_))));
        assert_eq!(parse(&["--bogus"]), Err(ConfigError::UnknownOption("--bogus".into())));
        assert_eq!(
            parse(&["a.rle", "b.rle"]),
            Err(ConfigError::ExtraArgument("b.rle".into()))
        );
        assert_eq!(parse(&["--rule", "b3s23"]).map(|c| c.rule), Ok(Some(B3S23)));
    }
}

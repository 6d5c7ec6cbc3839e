//! Tunable constants for each module and the showcase host

use clap::{Parser, ValueEnum};

use crate::palette::{Rgba, NEON};

/// Free-floating background particles
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    pub count: usize,
    /// Pairs closer than this are joined by a line
    pub connection_distance: f32,
    /// Upper bound of each velocity component
    pub max_speed: f32,
    pub palette: Vec<Rgba>,
    /// Halo radius drawn around every particle
    pub glow: f32,
    /// Opacity of a line between two coincident particles
    pub max_line_opacity: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 80,
            connection_distance: 100.0,
            max_speed: 1.0,
            palette: NEON.to_vec(),
            glow: 10.0,
            max_line_opacity: 0.3,
        }
    }
}

/// Two-outcome box
#[derive(Debug, Clone)]
pub struct BoxConfig {
    /// Seconds between opening the lid and revealing the outcome
    pub reveal_delay: f32,
    /// Period of the superposition indicator pulse
    pub pulse_period: f32,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            reveal_delay: 0.3,
            pulse_period: 1.0,
        }
    }
}

/// Linked pair with opposite spins
#[derive(Debug, Clone)]
pub struct PairConfig {
    pub particle_radius: f32,
    pub pick_radius: f32,
    /// Fraction of the remaining gap closed per frame
    pub ease: f32,
    /// Added to the distance counter on every separation
    pub separation_step: f32,
    /// Distance kept from the edge once separated
    pub edge_margin: f32,
    /// Flash intensity lost per frame
    pub flash_decay: f32,
    /// Virtual particles travelling along the link
    pub messengers: usize,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            particle_radius: 25.0,
            pick_radius: 30.0,
            ease: 0.05,
            separation_step: 1000.0,
            edge_margin: 40.0,
            flash_decay: 0.1,
            messengers: 5,
        }
    }
}

/// Two-slit emitter
#[derive(Debug, Clone)]
pub struct EmissionConfig {
    pub capacity: usize,
    /// Seconds between regular spawns
    pub spawn_interval: f32,
    pub initial_burst: usize,
    /// Seconds between burst spawns
    pub burst_stagger: f32,
    pub spawn_x: f32,
    /// Full height of the vertical spawn window around the centre line
    pub spawn_spread: f32,
    pub horizontal_speed: f32,
    /// Upper bound of the unobserved vertical drift
    pub max_drift: f32,
    /// Vertical speed toward an assigned lane
    pub lane_speed: f32,
    /// Barrier plane as a fraction of the surface width
    pub barrier_fraction: f32,
    /// Lane centres as fractions of the surface height
    pub lanes: [f32; 2],
    pub histogram_bins: usize,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            spawn_interval: 0.2,
            initial_burst: 20,
            burst_stagger: 0.1,
            spawn_x: 20.0,
            spawn_spread: 60.0,
            horizontal_speed: 3.0,
            max_drift: 1.0,
            lane_speed: 1.5,
            barrier_fraction: 0.4,
            lanes: [0.35, 0.65],
            histogram_bins: 40,
        }
    }
}

/// Precision sliders and wave plot
#[derive(Debug, Clone)]
pub struct WaveConfig {
    pub position_precision: u8,
    pub momentum_precision: u8,
    /// Score boundaries between the low/medium and medium/high bands
    pub band_thresholds: [f32; 2],
    pub amplitude: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            position_precision: 50,
            momentum_precision: 50,
            band_thresholds: [30.0, 70.0],
            amplitude: 40.0,
        }
    }
}

/// The five panels a page can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ModuleKind {
    Particles,
    #[value(name = "box")]
    OutcomeBox,
    Entanglement,
    #[value(name = "slit")]
    DoubleSlit,
    Uncertainty,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Particles,
        ModuleKind::OutcomeBox,
        ModuleKind::Entanglement,
        ModuleKind::DoubleSlit,
        ModuleKind::Uncertainty,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ModuleKind::Particles => "particles",
            ModuleKind::OutcomeBox => "box",
            ModuleKind::Entanglement => "entanglement",
            ModuleKind::DoubleSlit => "slit",
            ModuleKind::Uncertainty => "uncertainty",
        }
    }
}

/// Window size given as `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

fn parse_window_size(value: &str) -> Result<WindowSize, String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err(format!("window size must be non-zero, got '{}'", value));
    }
    Ok(WindowSize { width, height })
}

/// Command-line options
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "quantum_showcase")]
#[command(about = "Interactive quantum concept animations", long_about = None)]
pub struct Args {
    /// Run only these modules (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub only: Vec<ModuleKind>,

    /// Leave these modules out (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub without: Vec<ModuleKind>,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Window size in physical pixels, e.g. 1280x720
    #[arg(long, value_parser = parse_window_size)]
    pub size: Option<WindowSize>,
}

/// Host window and module selection
#[derive(Debug, Clone)]
pub struct ShowcaseConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub modules: Vec<ModuleKind>,
    /// Fixed RNG seed; entropy-seeded when `None`
    pub seed: Option<u64>,
    pub particles: ParticleConfig,
    pub outcome_box: BoxConfig,
    pub pair: PairConfig,
    pub emission: EmissionConfig,
    pub wave: WaveConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            title: "Quantum Physics - Interactive Concepts".to_string(),
            width: 1440,
            height: 900,
            modules: ModuleKind::ALL.to_vec(),
            seed: None,
            particles: ParticleConfig::default(),
            outcome_box: BoxConfig::default(),
            pair: PairConfig::default(),
            emission: EmissionConfig::default(),
            wave: WaveConfig::default(),
        }
    }
}

impl From<Args> for ShowcaseConfig {
    fn from(args: Args) -> Self {
        let mut config = Self::default();
        if !args.only.is_empty() {
            config.modules = args.only;
        }
        config.modules.retain(|kind| !args.without.contains(kind));
        config.seed = args.seed;
        if let Some(size) = args.size {
            config.width = size.width;
            config.height = size.height;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<ShowcaseConfig, clap::Error> {
        let argv = std::iter::once("quantum_showcase").chain(args.iter().copied());
        Args::try_parse_from(argv).map(ShowcaseConfig::from)
    }

    #[test]
    fn test_defaults_enable_everything() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.modules, ModuleKind::ALL.to_vec());
        assert_eq!(config.particles.count, 80);
        assert_eq!(config.emission.capacity, 50);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_only_and_seed() {
        let config = parse(&["--only", "slit,box", "--seed", "7"]).unwrap();
        assert_eq!(config.modules, vec![ModuleKind::DoubleSlit, ModuleKind::OutcomeBox]);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_without_and_size() {
        let config = parse(&["--without", "particles", "--size", "800x600"]).unwrap();
        assert!(!config.modules.contains(&ModuleKind::Particles));
        assert!(config.modules.contains(&ModuleKind::Uncertainty));
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn test_module_names_match_keys() {
        for kind in ModuleKind::ALL {
            let config = parse(&["--only", kind.key()]).unwrap();
            assert_eq!(config.modules, vec![kind]);
        }
    }

    #[test]
    fn test_bad_arguments_are_reported() {
        assert_eq!(parse(&["--only", "cats"]).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(parse(&["--size", "big"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["--size", "0x600"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["--seed", "seven"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["--fast"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_window_size_parser() {
        assert_eq!(
            parse_window_size("1280x720"),
            Ok(WindowSize { width: 1280, height: 720 })
        );
        assert!(parse_window_size("1280").is_err());
        assert!(parse_window_size("x720").is_err());
    }
}

//! Position/momentum trade-off visualizer
//!
//! Two precision sliders drive a single wave packet: position precision sets
//! the envelope width, momentum precision sets the oscillation frequency.
//! Everything here is a pure function of the two inputs, recomputed the moment
//! either one changes.

use glam::Vec2;

use crate::animation::Animation;
use crate::config::WaveConfig;
use crate::palette::{with_alpha, Rgba, CYAN, GREEN, MAGENTA, ORANGE, RED, WHITE};
use crate::scheduler::Frame;
use crate::surface::{LinearGradient, Rect, RenderSurface, Stroke, TextStyle};

/// Spread implied by a precision in [0, 100]; always at least 1
pub fn spread(precision: u8) -> f32 {
    101.0 - precision.min(100) as f32
}

/// Combined uncertainty score in [0, 100]
pub fn uncertainty_score(position_precision: u8, momentum_precision: u8) -> f32 {
    let product = spread(position_precision) * spread(momentum_precision);
    (product.sqrt() * 2.0).clamp(0.0, 100.0)
}

/// Display band of an uncertainty score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UncertaintyBand {
    Low,
    Medium,
    High,
}

impl UncertaintyBand {
    /// Bands partition the score line at the two thresholds
    pub fn classify(score: f32, thresholds: [f32; 2]) -> Self {
        if score < thresholds[0] {
            UncertaintyBand::Low
        } else if score < thresholds[1] {
            UncertaintyBand::Medium
        } else {
            UncertaintyBand::High
        }
    }

    /// Start and end colour of the indicator bar
    pub fn colors(&self) -> (Rgba, Rgba) {
        match self {
            UncertaintyBand::Low => (GREEN, CYAN),
            UncertaintyBand::Medium => (CYAN, ORANGE),
            UncertaintyBand::High => (ORANGE, RED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyState {
    pub position_precision: u8,
    pub momentum_precision: u8,
    pub score: f32,
}

impl UncertaintyState {
    pub fn new(position_precision: u8, momentum_precision: u8) -> Self {
        let position_precision = position_precision.min(100);
        let momentum_precision = momentum_precision.min(100);
        Self {
            position_precision,
            momentum_precision,
            score: uncertainty_score(position_precision, momentum_precision),
        }
    }

    pub fn position_spread(&self) -> f32 {
        spread(self.position_precision)
    }

    pub fn momentum_spread(&self) -> f32 {
        spread(self.momentum_precision)
    }
}

pub struct UncertaintyWaveVisualizer {
    config: WaveConfig,
    size: Vec2,
    state: UncertaintyState,
}

impl UncertaintyWaveVisualizer {
    pub fn new(config: WaveConfig, size: Vec2) -> Self {
        let state = UncertaintyState::new(config.position_precision, config.momentum_precision);
        Self { config, size, state }
    }

    pub fn state(&self) -> UncertaintyState {
        self.state
    }

    pub fn set_position_precision(&mut self, value: u8) {
        self.state = UncertaintyState::new(value, self.state.momentum_precision);
    }

    pub fn set_momentum_precision(&mut self, value: u8) {
        self.state = UncertaintyState::new(self.state.position_precision, value);
    }

    pub fn band(&self) -> UncertaintyBand {
        UncertaintyBand::classify(self.state.score, self.config.band_thresholds)
    }

    pub fn position_echo(&self) -> String {
        format!("{}%", self.state.position_precision)
    }

    pub fn momentum_echo(&self) -> String {
        format!("{}%", self.state.momentum_precision)
    }

    pub fn score_echo(&self) -> String {
        format!("{}%", self.state.score.round() as i32)
    }

    /// Half-width scale of the packet envelope in pixels
    pub fn envelope_width(&self) -> f32 {
        self.state.position_spread() * 2.0
    }

    /// One wave sample per pixel column
    pub fn wave_points(&self) -> Vec<Vec2> {
        let center = self.size * 0.5;
        let width = self.envelope_width() + 20.0;
        let frequency = 0.2 * (1.0 + self.state.momentum_spread() * 0.5);
        let columns = self.size.x.max(0.0) as usize;

        (0..columns)
            .map(|x| {
                let x = x as f32;
                let d = (x - center.x) / width;
                let envelope = (-d * d).exp();
                let y = (x * frequency).sin() * envelope * self.config.amplitude;
                Vec2::new(x, center.y + y)
            })
            .collect()
    }
}

impl Animation for UncertaintyWaveVisualizer {
    fn name(&self) -> &'static str {
        "uncertainty wave"
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    fn update(&mut self, _frame: &Frame) {}

    fn draw(&self, surface: &mut dyn RenderSurface, _frame: &Frame) {
        let (w, h) = (self.size.x, self.size.y);
        let cx = w / 2.0;

        let gradient = LinearGradient::new(Vec2::ZERO, Vec2::new(w, 0.0))
            .stop(0.0, with_alpha(CYAN, 0.0))
            .stop(0.5, with_alpha(CYAN, 0.8))
            .stop(1.0, with_alpha(CYAN, 0.0));
        surface.stroke_path(&self.wave_points(), Stroke::new(gradient, 3.0));

        let position_width = self.envelope_width();
        surface.fill_rect(
            Rect::new(cx - position_width / 2.0, 10.0, position_width, 15.0),
            with_alpha(MAGENTA, 0.2).into(),
        );
        surface.text(
            Vec2::new(cx, 8.0),
            "Δx (Position)",
            TextStyle::new(12.0, MAGENTA).centered(),
        );

        let momentum_width = 60.0 + self.state.momentum_spread() * 0.5 * 10.0;
        surface.fill_rect(
            Rect::new(cx - 30.0, h - 25.0, momentum_width, 15.0),
            with_alpha(GREEN, 0.2).into(),
        );
        surface.text(
            Vec2::new(cx, h - 5.0),
            "Δp (Momentum)",
            TextStyle::new(12.0, GREEN).centered(),
        );

        surface.line(
            Vec2::new(cx, 30.0),
            Vec2::new(cx, h - 30.0),
            Stroke::new(with_alpha(WHITE, 0.2), 1.0).dashed(5.0, 5.0),
        );
    }
}

//! Two-outcome box
//!
//! The box starts in superposition. Opening it picks one of two outcomes at
//! random, plays a short reveal, and then stays collapsed until reset.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::animation::Animation;
use crate::config::BoxConfig;
use crate::palette::{with_alpha, Rgba, BARRIER, CYAN, GREEN, PANEL, RED, TEXT_DIM, WHITE};
use crate::scheduler::{Countdown, Frame};
use crate::surface::{Rect, RenderSurface, Stroke, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Alive,
    Dead,
}

impl Outcome {
    pub fn color(&self) -> Rgba {
        match self {
            Outcome::Alive => GREEN,
            Outcome::Dead => RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxState {
    Superposed,
    /// Lid is open, outcome already fixed, reveal still playing
    Collapsing { outcome: Outcome, reveal: Countdown },
    Collapsed(Outcome),
}

pub struct OutcomeBox {
    config: BoxConfig,
    state: BoxState,
    is_open: bool,
    size: Vec2,
    rng: StdRng,
}

impl OutcomeBox {
    pub fn new(config: BoxConfig, size: Vec2, rng: StdRng) -> Self {
        Self {
            config,
            state: BoxState::Superposed,
            is_open: false,
            size,
            rng,
        }
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The outcome chosen at collapse, also while the reveal is playing
    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            BoxState::Superposed => None,
            BoxState::Collapsing { outcome, .. } | BoxState::Collapsed(outcome) => Some(outcome),
        }
    }

    /// The outcome once it has been revealed to the viewer
    pub fn revealed(&self) -> Option<Outcome> {
        match self.state {
            BoxState::Collapsed(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Open the box. Only the first call after a reset has any effect.
    pub fn open(&mut self) -> Outcome {
        if let Some(outcome) = self.outcome() {
            return outcome;
        }

        self.is_open = true;
        let outcome = if self.rng.gen_bool(0.5) {
            Outcome::Alive
        } else {
            Outcome::Dead
        };
        self.state = BoxState::Collapsing {
            outcome,
            reveal: Countdown::new(self.config.reveal_delay),
        };
        log::debug!("Box opened: {:?}", outcome);
        outcome
    }

    /// Close the lid and return to superposition
    pub fn reset(&mut self) {
        self.is_open = false;
        self.state = BoxState::Superposed;
    }

    /// Advance the reveal transient
    pub fn tick(&mut self, dt: f32) {
        if let BoxState::Collapsing { outcome, mut reveal } = self.state {
            self.state = if reveal.tick(dt) {
                BoxState::Collapsed(outcome)
            } else {
                BoxState::Collapsing { outcome, reveal }
            };
        }
    }

    pub fn label(&self) -> &'static str {
        match self.revealed() {
            None => "Superposition",
            Some(Outcome::Alive) => "ALIVE!",
            Some(Outcome::Dead) => "Dead",
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.revealed() {
            None => "State: Superposition",
            Some(Outcome::Alive) => "State: ALIVE (Collapsed)",
            Some(Outcome::Dead) => "State: DEAD (Collapsed)",
        }
    }

    /// Indicator colour; pulses while the outcome is still hidden
    pub fn indicator_color(&self, elapsed: f32) -> Rgba {
        match self.revealed() {
            Some(outcome) => outcome.color(),
            None => {
                let phase = elapsed / self.config.pulse_period * std::f32::consts::TAU;
                with_alpha(CYAN, 0.65 + 0.35 * phase.sin())
            }
        }
    }

    fn glyph(&self) -> &'static str {
        match self.revealed() {
            None => "🐱",
            Some(Outcome::Alive) => "😺",
            Some(Outcome::Dead) => "🙀",
        }
    }
}

impl Animation for OutcomeBox {
    fn name(&self) -> &'static str {
        "outcome box"
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    fn update(&mut self, frame: &Frame) {
        self.tick(frame.dt);
    }

    fn draw(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        let size = surface.size();
        let center = size * 0.5;
        let box_size = Vec2::new(size.x * 0.4, size.y * 0.4).min(Vec2::splat(220.0));
        let body = Rect::new(
            center.x - box_size.x * 0.5,
            center.y - box_size.y * 0.35,
            box_size.x,
            box_size.y,
        );

        surface.fill_rect(body, PANEL.into());
        let outline = [
            body.min,
            Vec2::new(body.max().x, body.min.y),
            body.max(),
            Vec2::new(body.min.x, body.max().y),
            body.min,
        ];
        surface.stroke_path(&outline, Stroke::new(BARRIER, 3.0));

        // Lid: flat on the box when closed, tilted back once opened
        let lid_height = 14.0;
        let lid = if self.is_open {
            let hinge = Vec2::new(body.max().x, body.min.y);
            let back = hinge + Vec2::new(-box_size.x * 0.3, -box_size.y * 0.7);
            [
                hinge,
                back,
                back + Vec2::new(-lid_height, lid_height * 0.4),
                hinge + Vec2::new(-lid_height, 0.0),
            ]
        } else {
            [
                Vec2::new(body.min.x - 6.0, body.min.y - lid_height),
                Vec2::new(body.max().x + 6.0, body.min.y - lid_height),
                Vec2::new(body.max().x + 6.0, body.min.y),
                Vec2::new(body.min.x - 6.0, body.min.y),
            ]
        };
        surface.fill_polygon(&lid, BARRIER);

        if self.is_open {
            let glyph_size = box_size.y * 0.4;
            surface.text(
                center + Vec2::new(0.0, glyph_size * 0.5),
                self.glyph(),
                TextStyle::new(glyph_size, WHITE).centered(),
            );
        } else {
            surface.text(
                center + Vec2::new(0.0, 10.0),
                "?",
                TextStyle::new(box_size.y * 0.3, TEXT_DIM).centered().bold(),
            );
        }

        let label_color = match self.revealed() {
            Some(outcome) => outcome.color(),
            None => CYAN,
        };
        surface.text(
            Vec2::new(center.x, body.max().y + 28.0),
            self.label(),
            TextStyle::new(20.0, label_color).centered().bold(),
        );

        let indicator = Vec2::new(center.x - 80.0, body.max().y + 52.0);
        surface.fill_circle(indicator, 6.0, self.indicator_color(frame.elapsed), 6.0);
        surface.text(
            indicator + Vec2::new(14.0, 5.0),
            self.status_text(),
            TextStyle::new(14.0, label_color),
        );
    }

    fn on_click(&mut self, _point: Vec2) -> bool {
        if self.is_open {
            return false;
        }
        self.open();
        true
    }
}

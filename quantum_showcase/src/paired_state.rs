//! Entangled pair visualizer
//!
//! Two particles share an anti-correlated spin. Clicking either one flips it
//! and the partner takes the opposite value in the same call, so no observer
//! ever sees both spins equal.

use std::f32::consts::PI;

use glam::Vec2;

use crate::animation::Animation;
use crate::config::PairConfig;
use crate::palette::{with_alpha, Rgba, CYAN, MAGENTA, PURPLE, TEXT_DIM, WHITE};
use crate::scheduler::Frame;
use crate::surface::{LinearGradient, RenderSurface, Stroke, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    pub fn flipped(self) -> Self {
        match self {
            Spin::Up => Spin::Down,
            Spin::Down => Spin::Up,
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Spin::Up => 1,
            Spin::Down => -1,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Spin::Up => "↑",
            Spin::Down => "↓",
        }
    }
}

impl std::ops::Neg for Spin {
    type Output = Spin;

    fn neg(self) -> Spin {
        self.flipped()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntangledParticle {
    pub position: Vec2,
    pub target_x: f32,
    pub spin: Spin,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    A,
    B,
}

pub struct PairedStateVisualizer {
    config: PairConfig,
    size: Vec2,
    a: EntangledParticle,
    b: EntangledParticle,
    distance: f32,
    flash: f32,
}

impl PairedStateVisualizer {
    pub fn new(config: PairConfig, size: Vec2) -> Self {
        let mid = size.y / 2.0;
        Self {
            config,
            size,
            a: EntangledParticle {
                position: Vec2::new(size.x * 0.25, mid),
                target_x: size.x * 0.25,
                spin: Spin::Up,
                color: CYAN,
            },
            b: EntangledParticle {
                position: Vec2::new(size.x * 0.75, mid),
                target_x: size.x * 0.75,
                spin: Spin::Down,
                color: MAGENTA,
            },
            distance: 0.0,
            flash: 0.0,
        }
    }

    pub fn particle(&self, which: Which) -> &EntangledParticle {
        match which {
            Which::A => &self.a,
            Which::B => &self.b,
        }
    }

    /// Accumulated separation distance
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn flash_intensity(&self) -> f32 {
        self.flash
    }

    /// Flip the particle under `point`, if any, and anti-align its partner.
    ///
    /// The partner is set to the negation of the picked particle's new spin
    /// rather than being flipped independently.
    pub fn toggle_near(&mut self, point: Vec2) -> Option<Which> {
        let pick = self.config.pick_radius;
        let picked = if point.distance(self.a.position) < pick {
            self.a.spin = -self.a.spin;
            self.b.spin = -self.a.spin;
            Which::A
        } else if point.distance(self.b.position) < pick {
            self.b.spin = -self.b.spin;
            self.a.spin = -self.b.spin;
            Which::B
        } else {
            return None;
        };

        self.flash = 1.0;
        log::debug!(
            "Toggled {:?}: A={} B={}",
            picked,
            self.a.spin.arrow(),
            self.b.spin.arrow()
        );
        Some(picked)
    }

    /// Increase the separation counter and send both particles to the edges
    pub fn separate(&mut self) {
        self.distance += self.config.separation_step;
        self.a.target_x = self.config.edge_margin;
        self.b.target_x = self.size.x - self.config.edge_margin;
        log::debug!("Separated pair, distance now {}", self.distance);
    }

    /// Ease both particles toward their targets and decay the flash
    pub fn step(&mut self) {
        let ease = self.config.ease;
        for particle in [&mut self.a, &mut self.b] {
            particle.position.x += (particle.target_x - particle.position.x) * ease;
        }
        self.flash = (self.flash - self.config.flash_decay).max(0.0);
    }

    fn draw_link(&self, surface: &mut dyn RenderSurface, time: f32) {
        let gradient = LinearGradient::new(
            Vec2::new(self.a.position.x, 0.0),
            Vec2::new(self.b.position.x, 0.0),
        )
        .stop(0.0, self.a.color)
        .stop(0.5, PURPLE)
        .stop(1.0, self.b.color);
        surface.line(
            self.a.position,
            self.b.position,
            Stroke::new(gradient, 2.0).dashed(5.0, 5.0),
        );

        let count = self.config.messengers.max(1);
        for i in 0..self.config.messengers {
            let t = (time + i as f32 / count as f32).rem_euclid(1.0);
            let x = self.a.position.x + (self.b.position.x - self.a.position.x) * t;
            let y = self.a.position.y + (t * PI * 4.0 + time * 5.0).sin() * 10.0;
            surface.fill_circle(Vec2::new(x, y), 3.0, PURPLE, 0.0);
        }

        if self.flash > 0.0 {
            surface.line(
                self.a.position,
                self.b.position,
                Stroke::new(with_alpha(WHITE, self.flash), 5.0),
            );
        }
    }

    fn draw_particle(&self, surface: &mut dyn RenderSurface, particle: &EntangledParticle, label: &str) {
        let radius = self.config.particle_radius;
        let center = particle.position;

        surface.fill_circle(center, radius, with_alpha(particle.color, 0.25), 20.0);
        surface.fill_circle(center, radius - 1.5, [0.04, 0.04, 0.06, 0.9], 0.0);
        surface.stroke_circle(center, radius, particle.color, 3.0);

        let arrow = 15.0;
        let tip = if particle.spin == Spin::Up { -arrow } else { arrow };
        surface.fill_polygon(
            &[
                center + Vec2::new(0.0, tip),
                center + Vec2::new(-arrow / 2.0, -tip / 2.0),
                center + Vec2::new(arrow / 2.0, -tip / 2.0),
            ],
            particle.color,
        );

        surface.text(
            center + Vec2::new(0.0, radius + 20.0),
            label,
            TextStyle::new(14.0, particle.color).centered().bold(),
        );
        surface.text(
            center + Vec2::new(0.0, radius + 35.0),
            &format!("Spin: {}", particle.spin.arrow()),
            TextStyle::new(12.0, TEXT_DIM).centered(),
        );
    }
}

impl Animation for PairedStateVisualizer {
    fn name(&self) -> &'static str {
        "entangled pair"
    }

    /// Scale horizontal positions and targets with the width, re-centre vertically
    fn resize(&mut self, size: Vec2) {
        let scale = if self.size.x > 0.0 { size.x / self.size.x } else { 1.0 };
        self.size = size;
        for particle in [&mut self.a, &mut self.b] {
            particle.position.x = (particle.position.x * scale).min(size.x).max(0.0);
            particle.target_x = (particle.target_x * scale).min(size.x).max(0.0);
            particle.position.y = size.y / 2.0;
        }
    }

    fn update(&mut self, _frame: &Frame) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        self.draw_link(surface, frame.elapsed);
        self.draw_particle(surface, &self.a, "A");
        self.draw_particle(surface, &self.b, "B");
    }

    fn on_click(&mut self, point: Vec2) -> bool {
        self.toggle_near(point).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pair() -> PairedStateVisualizer {
        PairedStateVisualizer::new(PairConfig::default(), Vec2::new(400.0, 200.0))
    }

    fn anti_aligned(p: &PairedStateVisualizer) -> bool {
        p.particle(Which::A).spin.value() == -p.particle(Which::B).spin.value()
    }

    #[test]
    fn test_initial_layout() {
        let p = pair();
        assert_eq!(p.particle(Which::A).position, Vec2::new(100.0, 100.0));
        assert_eq!(p.particle(Which::B).position, Vec2::new(300.0, 100.0));
        assert_eq!(p.particle(Which::A).spin, Spin::Up);
        assert!(anti_aligned(&p));
    }

    #[test]
    fn test_toggle_picks_nearest_within_radius() {
        let mut p = pair();
        assert_eq!(p.toggle_near(Vec2::new(110.0, 110.0)), Some(Which::A));
        assert_eq!(p.particle(Which::A).spin, Spin::Down);
        assert_eq!(p.particle(Which::B).spin, Spin::Up);

        assert_eq!(p.toggle_near(Vec2::new(300.0, 125.0)), Some(Which::B));
        assert_eq!(p.particle(Which::B).spin, Spin::Down);
        assert_eq!(p.particle(Which::A).spin, Spin::Up);
    }

    #[test]
    fn test_toggle_outside_radius_is_noop() {
        let mut p = pair();
        assert_eq!(p.toggle_near(Vec2::new(200.0, 100.0)), None);
        assert_eq!(p.toggle_near(Vec2::new(130.0, 100.0)), None);
        assert_eq!(p.particle(Which::A).spin, Spin::Up);
        assert_eq!(p.flash_intensity(), 0.0);
    }

    #[test]
    fn test_repeated_clicks_keep_anti_correlation() {
        let mut p = pair();
        for _ in 0..7 {
            p.toggle_near(Vec2::new(100.0, 100.0));
            assert!(anti_aligned(&p));
        }
        assert_eq!(p.particle(Which::A).spin, Spin::Down);
    }

    #[test]
    fn test_random_click_sequence_never_breaks_invariant() {
        let mut p = pair();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let point = Vec2::new(rng.gen_range(0.0..400.0), rng.gen_range(60.0..140.0));
            p.toggle_near(point);
            assert!(anti_aligned(&p));
            p.step();
        }
    }

    #[test]
    fn test_resize_keeps_pair_on_surface() {
        let mut p = pair();
        p.separate();
        for _ in 0..300 {
            p.step();
        }

        p.resize(Vec2::new(200.0, 120.0));
        for _ in 0..300 {
            p.step();
        }
        let (a, b) = (p.particle(Which::A), p.particle(Which::B));
        assert!(a.position.x >= 0.0 && b.position.x <= 200.0, "A at {}, B at {}", a.position.x, b.position.x);
        assert!(a.position.x < b.position.x);
        assert!((b.target_x - 180.0).abs() < 1e-3);
        assert_eq!(a.position.y, 60.0);

        let mut wide = pair();
        wide.resize(Vec2::new(800.0, 200.0));
        assert_eq!(wide.particle(Which::A).position.x, 200.0);
        assert_eq!(wide.particle(Which::B).target_x, 600.0);
    }

    #[test]
    fn test_separate_eases_toward_edges() {
        let mut p = pair();
        p.separate();
        assert_eq!(p.distance(), 1000.0);

        p.step();
        let a = p.particle(Which::A).position.x;
        assert!((a - (100.0 + (40.0 - 100.0) * 0.05)).abs() < 1e-4);

        for _ in 0..200 {
            p.step();
        }
        let a = p.particle(Which::A).position.x;
        let b = p.particle(Which::B).position.x;
        assert!((a - 40.0).abs() < 0.01 && a > 40.0);
        assert!((b - 360.0).abs() < 0.01 && b < 360.0);

        p.separate();
        assert_eq!(p.distance(), 2000.0);
    }

    #[test]
    fn test_flash_decays_to_zero() {
        let mut p = pair();
        p.toggle_near(Vec2::new(100.0, 100.0));
        assert_eq!(p.flash_intensity(), 1.0);
        for _ in 0..10 {
            p.step();
        }
        assert!(p.flash_intensity() < 1e-4);
        p.step();
        assert_eq!(p.flash_intensity(), 0.0);
    }

    #[test]
    fn test_resize_recentres_vertically() {
        let mut p = pair();
        p.resize(Vec2::new(400.0, 500.0));
        assert_eq!(p.particle(Which::A).position.y, 250.0);
        assert_eq!(p.particle(Which::B).position.y, 250.0);
        assert_eq!(p.particle(Which::A).position.x, 100.0);
    }
}

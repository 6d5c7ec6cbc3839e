//! Drifting particle background
//!
//! A fixed number of particles float in straight lines, reflect off the
//! surface walls, and are linked by faint lines whenever two of them come
//! within the connection distance of each other.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::animation::Animation;
use crate::config::ParticleConfig;
use crate::palette::{with_alpha, Rgba, CYAN};
use crate::scheduler::Frame;
use crate::surface::{RenderSurface, Stroke};

/// A single free particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Rgba,
    pub alpha: f32,
}

impl Particle {
    /// Re-roll every attribute inside a surface of the given size
    pub fn reset(&mut self, rng: &mut StdRng, bounds: Vec2, config: &ParticleConfig) {
        let speed = config.max_speed;
        self.position = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
        self.velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * speed * 2.0,
            (rng.gen::<f32>() - 0.5) * speed * 2.0,
        );
        self.radius = rng.gen_range(1.0..4.0);
        self.color = if config.palette.is_empty() {
            CYAN
        } else {
            config.palette[rng.gen_range(0..config.palette.len())]
        };
        self.alpha = rng.gen_range(0.3..0.8);
    }

    /// Move one frame and reflect off any wall the particle has crossed.
    ///
    /// A component flips only while the particle is beyond the wall and still
    /// moving outward, so a particle already heading back is never re-flipped.
    pub fn step(&mut self, bounds: Vec2) {
        self.position += self.velocity;

        if (self.position.x < 0.0 && self.velocity.x < 0.0)
            || (self.position.x > bounds.x && self.velocity.x > 0.0)
        {
            self.velocity.x = -self.velocity.x;
        }
        if (self.position.y < 0.0 && self.velocity.y < 0.0)
            || (self.position.y > bounds.y && self.velocity.y > 0.0)
        {
            self.velocity.y = -self.velocity.y;
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 1.0,
            color: CYAN,
            alpha: 1.0,
        }
    }
}

/// A line joining two nearby particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

pub struct ParticleField {
    config: ParticleConfig,
    bounds: Vec2,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, size: Vec2, rng: StdRng) -> Self {
        let mut field = Self {
            config,
            bounds: size,
            particles: Vec::new(),
            rng,
        };
        field.init(size);
        field
    }

    /// Discard all particles and allocate `count` fresh ones inside `size`
    pub fn init(&mut self, size: Vec2) {
        self.bounds = size;
        self.particles.clear();
        self.particles.resize(self.config.count, Particle::default());
        for particle in &mut self.particles {
            particle.reset(&mut self.rng, size, &self.config);
        }
    }

    pub fn step(&mut self) {
        let bounds = self.bounds;
        for particle in &mut self.particles {
            particle.step(bounds);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Opacity of a link at distance `d`, or `None` at or beyond the threshold
    pub fn connection_opacity(&self, d: f32) -> Option<f32> {
        let threshold = self.config.connection_distance;
        if d < threshold {
            Some((1.0 - d / threshold) * self.config.max_line_opacity)
        } else {
            None
        }
    }

    /// Every unordered pair closer than the connection distance.
    ///
    /// This is a full O(n²) pass over all pairs, which is fine for the
    /// particle counts a background field uses (80 particles is 3160 pairs).
    pub fn connections(&self) -> Vec<Connection> {
        let mut links = Vec::new();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let distance = self.particles[i].position.distance(self.particles[j].position);
                if let Some(opacity) = self.connection_opacity(distance) {
                    links.push(Connection {
                        a: i,
                        b: j,
                        distance,
                        opacity,
                    });
                }
            }
        }
        links
    }
}

impl Animation for ParticleField {
    fn name(&self) -> &'static str {
        "particle field"
    }

    fn resize(&mut self, size: Vec2) {
        self.init(size);
    }

    fn update(&mut self, _frame: &Frame) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn RenderSurface, _frame: &Frame) {
        for particle in &self.particles {
            surface.fill_circle(
                particle.position,
                particle.radius,
                with_alpha(particle.color, particle.alpha),
                self.config.glow,
            );
        }

        for link in self.connections() {
            surface.line(
                self.particles[link.a].position,
                self.particles[link.b].position,
                Stroke::new(with_alpha(CYAN, link.opacity), 1.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, DrawList};
    use rand::SeedableRng;

    fn field(seed: u64) -> ParticleField {
        ParticleField::new(
            ParticleConfig::default(),
            Vec2::new(400.0, 300.0),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_init_places_all_particles_inside() {
        let field = field(1);
        assert_eq!(field.particles().len(), 80);
        for p in field.particles() {
            assert!((0.0..=400.0).contains(&p.position.x));
            assert!((0.0..=300.0).contains(&p.position.y));
            assert!(p.velocity.x.abs() <= 1.0 && p.velocity.y.abs() <= 1.0);
            assert!((1.0..4.0).contains(&p.radius));
            assert!((0.3..0.8).contains(&p.alpha));
        }
    }

    #[test]
    fn test_reflection_flips_exact_axis() {
        let bounds = Vec2::new(100.0, 100.0);
        let mut p = Particle {
            position: Vec2::new(99.5, 0.5),
            velocity: Vec2::new(1.0, -1.0),
            ..Particle::default()
        };
        p.step(bounds);

        assert_eq!(p.velocity, Vec2::new(-1.0, 1.0));

        p.step(bounds);
        assert!(p.position.x <= 100.0 && p.position.y >= 0.0);
        assert_eq!(p.velocity, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_single_axis_reflection() {
        let mut p = Particle {
            position: Vec2::new(0.2, 50.0),
            velocity: Vec2::new(-0.5, 0.3),
            ..Particle::default()
        };
        p.step(Vec2::new(100.0, 100.0));
        assert_eq!(p.velocity, Vec2::new(0.5, 0.3));
    }

    #[test]
    fn test_particles_stay_bounded_over_many_steps() {
        let mut field = field(2);
        let max_speed = 1.0;
        for _ in 0..5000 {
            field.step();
        }
        for p in field.particles() {
            assert!(p.position.x >= -max_speed && p.position.x <= 400.0 + max_speed);
            assert!(p.position.y >= -max_speed && p.position.y <= 300.0 + max_speed);
        }
    }

    #[test]
    fn test_connection_opacity_falls_with_distance() {
        let field = field(3);
        let near = field.connection_opacity(10.0).unwrap();
        let mid = field.connection_opacity(50.0).unwrap();
        let far = field.connection_opacity(99.0).unwrap();

        assert!(near > mid && mid > far && far > 0.0);
        assert!(field.connection_opacity(0.0).unwrap() <= 0.3 + 1e-6);
        assert!(field.connection_opacity(100.0).is_none());
        assert!(field.connection_opacity(150.0).is_none());
    }

    #[test]
    fn test_lines_drawn_iff_pair_is_close() {
        let field = field(4);
        let mut list = DrawList::new(field.bounds());
        field.draw(&mut list, &Frame::single(0.016));

        let discs = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count();
        let lines = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
            .count();

        let n = field.particles().len();
        let mut expected = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if field.particles()[i].position.distance(field.particles()[j].position) < 100.0 {
                    expected += 1;
                }
            }
        }

        assert_eq!(discs, 80);
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut field = field(5);
        let before = field.particles().to_vec();
        field.resize(Vec2::new(50.0, 40.0));

        assert_eq!(field.particles().len(), 80);
        assert_ne!(field.particles(), before.as_slice());
        for p in field.particles() {
            assert!(p.position.x <= 50.0 && p.position.y <= 40.0);
        }
    }
}

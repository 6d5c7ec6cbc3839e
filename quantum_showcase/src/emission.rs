//! Double-slit emission pattern
//!
//! Electrons are emitted from the left edge toward a barrier with two slits.
//! Unobserved, each carries a small random vertical drift and the screen
//! shows a smooth interference gradient. Observed, each electron is assigned
//! one slit as it crosses the barrier and steers onto that lane, so the screen
//! shows two bands. Electrons leaving the right edge are recycled in place.

use std::collections::VecDeque;
use std::f32::consts::PI;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::animation::Animation;
use crate::config::EmissionConfig;
use crate::palette::{with_alpha, BACKGROUND, BARRIER, CYAN, MAGENTA};
use crate::scheduler::{Frame, Interval};
use crate::surface::{LinearGradient, Rect, RenderSurface, Stroke, TextStyle};

/// Landings kept for inspection
const LANDING_HISTORY: usize = 256;

/// Width of the detection screen on the right edge
const SCREEN_WIDTH: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Electron {
    pub position: Vec2,
    pub velocity: Vec2,
    pub detected: bool,
    /// Lane assigned at the barrier while observing
    pub lane: Option<Lane>,
    pub lane_y: f32,
}

impl Default for Electron {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            detected: false,
            lane: None,
            lane_y: 0.0,
        }
    }
}

impl Electron {
    /// Put the electron back at the emitter
    pub fn reset(&mut self, rng: &mut StdRng, size: Vec2, observing: bool, config: &EmissionConfig) {
        self.position = Vec2::new(
            config.spawn_x,
            size.y / 2.0 + (rng.gen::<f32>() - 0.5) * config.spawn_spread,
        );
        let drift = if observing {
            0.0
        } else {
            (rng.gen::<f32>() - 0.5) * 2.0 * config.max_drift
        };
        self.velocity = Vec2::new(config.horizontal_speed, drift);
        self.detected = false;
        self.lane = None;
        self.lane_y = 0.0;
    }
}

/// Fixed-bin count of where electrons hit the screen
#[derive(Debug, Clone)]
pub struct LandingHistogram {
    bins: Vec<u32>,
    height: f32,
}

impl LandingHistogram {
    pub fn new(bins: usize, height: f32) -> Self {
        Self {
            bins: vec![0; bins.max(1)],
            height,
        }
    }

    pub fn record(&mut self, y: f32) {
        if y < 0.0 || y >= self.height || self.height <= 0.0 {
            return;
        }
        let index = ((y / self.height) * self.bins.len() as f32) as usize;
        if let Some(bin) = self.bins.get_mut(index) {
            *bin += 1;
        }
    }

    pub fn clear(&mut self) {
        self.bins.iter_mut().for_each(|bin| *bin = 0);
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    pub fn total(&self) -> u32 {
        self.bins.iter().sum()
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.clear();
    }
}

pub struct EmissionPatternSimulator {
    config: EmissionConfig,
    size: Vec2,
    observing: bool,
    /// Fixed-capacity storage; only the first `live` entries are in flight
    pool: Vec<Electron>,
    live: usize,
    passed: u64,
    spawn_timer: Interval,
    burst_timer: Interval,
    burst_remaining: usize,
    histogram: LandingHistogram,
    landings: VecDeque<f32>,
    rng: StdRng,
}

impl EmissionPatternSimulator {
    pub fn new(config: EmissionConfig, size: Vec2, rng: StdRng) -> Self {
        let mut sim = Self {
            pool: vec![Electron::default(); config.capacity],
            live: 0,
            passed: 0,
            spawn_timer: Interval::new(config.spawn_interval),
            burst_timer: Interval::new(config.burst_stagger),
            burst_remaining: config.initial_burst,
            histogram: LandingHistogram::new(config.histogram_bins, size.y),
            landings: VecDeque::with_capacity(LANDING_HISTORY),
            observing: false,
            size,
            config,
            rng,
        };

        // The first burst electron leaves immediately
        if sim.burst_remaining > 0 {
            sim.burst_remaining -= 1;
            sim.spawn();
        }
        sim
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Switch regimes; every live electron restarts from the emitter
    pub fn set_observing(&mut self, observing: bool) {
        self.observing = observing;
        self.restart_live();
        self.histogram.clear();
        log::debug!("Observation {}", if observing { "on" } else { "off" });
    }

    /// Send every live electron back to the emitter and forget past landings
    fn restart_live(&mut self) {
        let (size, observing, config) = (self.size, self.observing, &self.config);
        for electron in &mut self.pool[..self.live] {
            electron.reset(&mut self.rng, size, observing, config);
        }
        self.landings.clear();
    }

    pub fn electrons(&self) -> &[Electron] {
        &self.pool[..self.live]
    }

    pub fn capacity(&self) -> usize {
        self.pool.len()
    }

    /// Electrons that have reached the screen so far
    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn histogram(&self) -> &LandingHistogram {
        &self.histogram
    }

    /// Most recent screen hits, oldest first
    pub fn landings(&self) -> impl Iterator<Item = f32> + '_ {
        self.landings.iter().copied()
    }

    pub fn barrier_x(&self) -> f32 {
        self.size.x * self.config.barrier_fraction
    }

    pub fn lane_y(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Upper => self.size.y * self.config.lanes[0],
            Lane::Lower => self.size.y * self.config.lanes[1],
        }
    }

    /// Bring one more pooled electron into flight. False when full.
    pub fn spawn(&mut self) -> bool {
        if self.live >= self.pool.len() {
            return false;
        }
        let (size, observing) = (self.size, self.observing);
        self.pool[self.live].reset(&mut self.rng, size, observing, &self.config);
        self.live += 1;
        true
    }

    /// Run spawn cadences for `dt` seconds
    pub fn advance_timers(&mut self, dt: f32) {
        let burst = (self.burst_timer.tick(dt) as usize).min(self.burst_remaining);
        for _ in 0..burst {
            self.burst_remaining -= 1;
            self.spawn();
        }
        for _ in 0..self.spawn_timer.tick(dt) {
            self.spawn();
        }
    }

    /// Move every live electron by one frame
    pub fn step(&mut self) {
        let barrier_x = self.barrier_x();
        let lanes = [self.lane_y(Lane::Upper), self.lane_y(Lane::Lower)];
        let lane_speed = self.config.lane_speed;

        for i in 0..self.live {
            let electron = &mut self.pool[i];
            electron.position += electron.velocity;

            if electron.detected {
                let y = electron.position.y;
                let target = electron.lane_y;
                if (electron.velocity.y > 0.0 && y >= target)
                    || (electron.velocity.y < 0.0 && y <= target)
                {
                    electron.position.y = target;
                    electron.velocity.y = 0.0;
                }
            }

            if self.observing && !electron.detected && electron.position.x > barrier_x {
                let lane = if self.rng.gen_bool(0.5) { Lane::Upper } else { Lane::Lower };
                let target = match lane {
                    Lane::Upper => lanes[0],
                    Lane::Lower => lanes[1],
                };
                electron.detected = true;
                electron.lane = Some(lane);
                electron.lane_y = target;
                electron.velocity.y = (target - electron.position.y).signum() * lane_speed;
                if electron.position.y == target {
                    electron.velocity.y = 0.0;
                }
            }

            if electron.position.x > self.size.x {
                let landing = electron.position.y;
                electron.reset(&mut self.rng, self.size, self.observing, &self.config);

                self.passed += 1;
                self.histogram.record(landing);
                if self.landings.len() == LANDING_HISTORY {
                    self.landings.pop_front();
                }
                self.landings.push_back(landing);
            }
        }
    }

    fn draw_apparatus(&self, surface: &mut dyn RenderSurface) {
        let (w, h) = (self.size.x, self.size.y);
        let bx = self.barrier_x();

        // Barrier in three pieces leaves the two slits open
        for (top, bottom) in [(0.0, 0.40), (0.48, 0.52), (0.60, 1.0)] {
            surface.fill_rect(Rect::new(bx, h * top, 10.0, h * (bottom - top)), BARRIER.into());
        }

        surface.fill_rect(
            Rect::new(w - SCREEN_WIDTH, 0.0, SCREEN_WIDTH, h),
            with_alpha(CYAN, 0.1).into(),
        );

        if self.observing {
            let detector = with_alpha(MAGENTA, 0.3);
            surface.fill_rect(Rect::new(bx - 10.0, h * 0.38, 30.0, 20.0), detector.into());
            surface.fill_rect(Rect::new(bx - 10.0, h * 0.50, 30.0, 20.0), detector.into());
            surface.text(
                Vec2::new(bx - 15.0, h * 0.35),
                "DETECTOR",
                TextStyle::new(10.0, MAGENTA),
            );
        }
    }

    /// Wave mode and particle mode never mix; the flag picks exactly one
    fn draw_pattern(&self, surface: &mut dyn RenderSurface) {
        let (w, h) = (self.size.x, self.size.y);
        let screen_x = w - SCREEN_WIDTH;
        let pattern_width = 15.0;

        if self.observing {
            let band = with_alpha(MAGENTA, 0.5);
            surface.fill_rect(Rect::new(screen_x, h * 0.30, pattern_width, h * 0.15), band.into());
            surface.fill_rect(Rect::new(screen_x, h * 0.55, pattern_width, h * 0.15), band.into());
        } else {
            let mut gradient = LinearGradient::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, h));
            for i in 0..=10 {
                let t = i as f32 / 10.0;
                let intensity = (t * PI * 4.0).sin() * 0.5 + 0.5;
                gradient = gradient.stop(t, with_alpha(CYAN, intensity * 0.5));
            }
            surface.fill_rect(Rect::new(screen_x, 0.0, pattern_width, h), gradient.into());
        }

        // Accumulated hits as ticks just left of the screen
        let peak = self.histogram.bins().iter().copied().max().unwrap_or(0);
        if peak > 0 {
            let bins = self.histogram.bins();
            let bin_height = h / bins.len() as f32;
            let color = if self.observing { MAGENTA } else { CYAN };
            for (i, &count) in bins.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let length = 12.0 * count as f32 / peak as f32;
                surface.fill_rect(
                    Rect::new(screen_x - 2.0 - length, i as f32 * bin_height, length, bin_height - 1.0),
                    with_alpha(color, 0.6).into(),
                );
            }
        }
    }
}

impl Animation for EmissionPatternSimulator {
    fn name(&self) -> &'static str {
        "double slit"
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.histogram.set_height(size.y);
        self.restart_live();
    }

    fn update(&mut self, frame: &Frame) {
        self.advance_timers(frame.dt);
        self.step();
    }

    fn draw(&self, surface: &mut dyn RenderSurface, _frame: &Frame) {
        surface.fill_rect(Rect::from_size(self.size), BACKGROUND.into());
        self.draw_apparatus(surface);
        self.draw_pattern(surface);

        let color = if self.observing { MAGENTA } else { CYAN };
        for electron in self.electrons() {
            let tail = electron.position - electron.velocity * 4.0;
            surface.line(tail, electron.position, Stroke::new(with_alpha(color, 0.35), 2.0));
            surface.fill_circle(electron.position, 3.0, color, 4.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, DrawList, Paint};
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn sim(seed: u64) -> EmissionPatternSimulator {
        EmissionPatternSimulator::new(
            EmissionConfig::default(),
            Vec2::new(600.0, 400.0),
            StdRng::seed_from_u64(seed),
        )
    }

    fn run(sim: &mut EmissionPatternSimulator, frames: usize) {
        for _ in 0..frames {
            sim.update(&Frame::single(DT));
        }
    }

    #[test]
    fn test_burst_starts_immediately() {
        let sim = sim(1);
        assert_eq!(sim.electrons().len(), 1);
        assert_eq!(sim.electrons()[0].position.x, 20.0);
        assert_eq!(sim.capacity(), 50);
    }

    #[test]
    fn test_pool_fills_to_capacity_and_stays() {
        let mut sim = sim(2);
        run(&mut sim, 60);
        let after_one_second = sim.electrons().len();
        assert!(after_one_second > 10 && after_one_second < 30);

        run(&mut sim, 60 * 20);
        assert_eq!(sim.electrons().len(), 50);
        assert!(sim.passed() > 0);

        let passed = sim.passed();
        run(&mut sim, 600);
        assert_eq!(sim.electrons().len(), 50);
        assert!(sim.passed() > passed);
    }

    #[test]
    fn test_unobserved_electrons_keep_drift() {
        let mut sim = sim(3);
        run(&mut sim, 30);
        for electron in sim.electrons() {
            assert!(!electron.detected);
            assert!(electron.velocity.y.abs() <= 1.0);
            assert_eq!(electron.velocity.x, 3.0);
        }
    }

    #[test]
    fn test_observed_landings_form_two_lanes() {
        let mut sim = sim(4);
        sim.set_observing(true);
        run(&mut sim, 60 * 30);

        let upper = sim.lane_y(Lane::Upper);
        let lower = sim.lane_y(Lane::Lower);
        let landings: Vec<f32> = sim.landings().collect();
        assert!(landings.len() > 100);
        for y in &landings {
            assert!((y - upper).abs() < 1e-3 || (y - lower).abs() < 1e-3, "landing at {}", y);
        }

        let upper_hits = landings.iter().filter(|y| (**y - upper).abs() < 1e-3).count();
        assert!(upper_hits > landings.len() / 4 && upper_hits < landings.len() * 3 / 4);
    }

    #[test]
    fn test_unobserved_landings_spread_continuously() {
        let mut sim = sim(5);
        run(&mut sim, 60 * 30);

        let landings: Vec<f32> = sim.landings().collect();
        assert!(landings.len() > 100);

        let min = landings.iter().copied().fold(f32::MAX, f32::min);
        let max = landings.iter().copied().fold(f32::MIN, f32::max);
        assert!(max - min > 150.0);

        let upper = sim.lane_y(Lane::Upper);
        let lower = sim.lane_y(Lane::Lower);
        let on_lanes = landings
            .iter()
            .filter(|y| (**y - upper).abs() < 1.0 || (**y - lower).abs() < 1.0)
            .count();
        assert!(on_lanes < landings.len() / 4);
    }

    #[test]
    fn test_toggle_resets_without_changing_membership() {
        let mut sim = sim(6);
        run(&mut sim, 200);
        let live = sim.electrons().len();

        sim.set_observing(true);
        assert_eq!(sim.electrons().len(), live);
        for electron in sim.electrons() {
            assert_eq!(electron.position.x, 20.0);
            assert_eq!(electron.velocity.y, 0.0);
            assert!(!electron.detected);
        }
        assert_eq!(sim.histogram().total(), 0);
    }

    #[test]
    fn test_resize_retargets_lanes_for_live_electrons() {
        let mut sim = sim(9);
        sim.set_observing(true);
        run(&mut sim, 60 * 30);
        assert!(sim.electrons().iter().any(|e| e.detected));

        sim.resize(Vec2::new(500.0, 300.0));
        assert!(sim.electrons().iter().all(|e| !e.detected && e.position.x == 20.0));
        run(&mut sim, 600);

        let lanes = [300.0 * 0.35, 300.0 * 0.65];
        assert_eq!(sim.lane_y(Lane::Upper), lanes[0]);
        let landings: Vec<f32> = sim.landings().collect();
        assert!(!landings.is_empty());
        for y in &landings {
            assert!(lanes.iter().any(|lane| (y - lane).abs() < 1e-3), "stale landing at {}", y);
        }
    }

    #[test]
    fn test_detection_happens_once_past_barrier() {
        let mut sim = sim(7);
        sim.set_observing(true);
        run(&mut sim, 75);

        let first = sim.electrons()[0];
        assert!(first.position.x > sim.barrier_x());
        assert!(first.detected);
        assert!(first.lane.is_some());
    }

    #[test]
    fn test_pattern_styles_are_exclusive() {
        let mut sim = sim(8);
        let frame = Frame::single(DT);

        let gradient_fills = |list: &DrawList| {
            list.commands()
                .iter()
                .filter(|c| matches!(c, DrawCommand::FillRect { paint: Paint::Gradient(_), .. }))
                .count()
        };
        let band_fills = |list: &DrawList| {
            list.commands()
                .iter()
                .filter(|c| matches!(c, DrawCommand::FillRect { paint: Paint::Solid(color), .. } if *color == with_alpha(MAGENTA, 0.5)))
                .count()
        };

        let mut wave = DrawList::new(Vec2::new(600.0, 400.0));
        sim.draw(&mut wave, &frame);
        assert_eq!(gradient_fills(&wave), 1);
        assert_eq!(band_fills(&wave), 0);

        sim.set_observing(true);
        let mut particle = DrawList::new(Vec2::new(600.0, 400.0));
        sim.draw(&mut particle, &frame);
        assert_eq!(gradient_fills(&particle), 0);
        assert_eq!(band_fills(&particle), 2);
        assert!(particle.texts().any(|(_, text, _)| text == "DETECTOR"));
    }

    #[test]
    fn test_histogram_ignores_offscreen() {
        let mut histogram = LandingHistogram::new(10, 100.0);
        histogram.record(-1.0);
        histogram.record(100.0);
        histogram.record(5.0);
        histogram.record(95.0);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.bins()[0], 1);
        assert_eq!(histogram.bins()[9], 1);
    }
}

//! The page: every module that has a surface, laid out in one window
//!
//! A module whose surface is missing is simply never created. The others run
//! independently, each in its own [`Slot`].

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{Animation, Slot};
use crate::config::{ModuleKind, ShowcaseConfig};
use crate::emission::EmissionPatternSimulator;
use crate::outcome_box::OutcomeBox;
use crate::paired_state::PairedStateVisualizer;
use crate::particle_field::ParticleField;
use crate::surface::{DrawList, Rect};
use crate::uncertainty::UncertaintyWaveVisualizer;

/// Share of the canvas height given to the particle hero row
const HERO_FRACTION: f32 = 0.4;
/// Gap between panels in pixels
const GUTTER: f32 = 8.0;

/// Canvas left of a right-hand sidebar, in window pixels
pub fn canvas_area(window: Vec2, sidebar_width: f32) -> Rect {
    let width = (window.x - sidebar_width.max(0.0)).max(1.0);
    Rect::new(0.0, 0.0, width, window.y.max(1.0))
}

/// Which surfaces exist, and where they sit in the window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMap {
    pub particles: Option<Rect>,
    pub outcome_box: Option<Rect>,
    pub entanglement: Option<Rect>,
    pub double_slit: Option<Rect>,
    pub uncertainty: Option<Rect>,
}

impl SurfaceMap {
    /// Hero row on top, two-by-two grid below, enabled modules only
    pub fn layout(area: Rect, enabled: &[ModuleKind]) -> Self {
        let hero_height = area.size.y * HERO_FRACTION;
        let grid_top = area.min.y + hero_height + GUTTER;
        let cell = Vec2::new(
            ((area.size.x - GUTTER) / 2.0).max(1.0),
            ((area.size.y - hero_height - GUTTER * 2.0) / 2.0).max(1.0),
        );
        let grid = |col: f32, row: f32| {
            Rect::new(
                area.min.x + col * (cell.x + GUTTER),
                grid_top + row * (cell.y + GUTTER),
                cell.x,
                cell.y,
            )
        };

        let mut map = SurfaceMap::default();
        for kind in enabled {
            match kind {
                ModuleKind::Particles => {
                    map.particles = Some(Rect::new(area.min.x, area.min.y, area.size.x, hero_height.max(1.0)))
                }
                ModuleKind::OutcomeBox => map.outcome_box = Some(grid(0.0, 0.0)),
                ModuleKind::Entanglement => map.entanglement = Some(grid(1.0, 0.0)),
                ModuleKind::DoubleSlit => map.double_slit = Some(grid(0.0, 1.0)),
                ModuleKind::Uncertainty => map.uncertainty = Some(grid(1.0, 1.0)),
            }
        }
        map
    }

    pub fn get(&self, kind: ModuleKind) -> Option<Rect> {
        match kind {
            ModuleKind::Particles => self.particles,
            ModuleKind::OutcomeBox => self.outcome_box,
            ModuleKind::Entanglement => self.entanglement,
            ModuleKind::DoubleSlit => self.double_slit,
            ModuleKind::Uncertainty => self.uncertainty,
        }
    }
}

/// Object-safe view of a [`Slot`] for iterating over mixed modules
pub trait Panel {
    fn name(&self) -> &'static str;
    fn frame(&mut self, dt: f32);
    fn click(&mut self, window_point: Vec2) -> bool;
    fn set_viewport(&mut self, viewport: Rect);
    fn viewport(&self) -> Rect;
    fn draw_list(&self) -> &DrawList;
    fn is_running(&self) -> bool;
    fn is_faulted(&self) -> bool;
    fn pause(&mut self);
    fn resume(&mut self);
}

impl<A: Animation> Panel for Slot<A> {
    fn name(&self) -> &'static str {
        self.animation.name()
    }

    fn frame(&mut self, dt: f32) {
        Slot::frame(self, dt);
    }

    fn click(&mut self, window_point: Vec2) -> bool {
        Slot::click(self, window_point)
    }

    fn set_viewport(&mut self, viewport: Rect) {
        Slot::set_viewport(self, viewport);
    }

    fn viewport(&self) -> Rect {
        Slot::viewport(self)
    }

    fn draw_list(&self) -> &DrawList {
        Slot::draw_list(self)
    }

    fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    fn is_faulted(&self) -> bool {
        Slot::is_faulted(self)
    }

    fn pause(&mut self) {
        self.scheduler.stop();
    }

    fn resume(&mut self) {
        if !Slot::is_faulted(self) {
            self.scheduler.start();
        }
    }
}

pub struct Showcase {
    pub particles: Option<Slot<ParticleField>>,
    pub outcome_box: Option<Slot<OutcomeBox>>,
    pub pair: Option<Slot<PairedStateVisualizer>>,
    pub emission: Option<Slot<EmissionPatternSimulator>>,
    pub wave: Option<Slot<UncertaintyWaveVisualizer>>,
    paused: bool,
}

impl Showcase {
    /// Initialise every module whose surface is present in `surfaces`
    pub fn new(config: &ShowcaseConfig, surfaces: &SurfaceMap) -> Self {
        let rng = |salt: u64| match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(salt)),
            None => StdRng::from_entropy(),
        };

        let showcase = Self {
            particles: surfaces.particles.map(|rect| {
                Slot::new(ParticleField::new(config.particles.clone(), rect.size, rng(1)), rect)
            }),
            outcome_box: surfaces.outcome_box.map(|rect| {
                Slot::new(OutcomeBox::new(config.outcome_box.clone(), rect.size, rng(2)), rect)
            }),
            pair: surfaces
                .entanglement
                .map(|rect| Slot::new(PairedStateVisualizer::new(config.pair.clone(), rect.size), rect)),
            emission: surfaces.double_slit.map(|rect| {
                Slot::new(
                    EmissionPatternSimulator::new(config.emission.clone(), rect.size, rng(3)),
                    rect,
                )
            }),
            wave: surfaces
                .uncertainty
                .map(|rect| Slot::new(UncertaintyWaveVisualizer::new(config.wave.clone(), rect.size), rect)),
            paused: false,
        };

        for kind in ModuleKind::ALL {
            if surfaces.get(kind).is_none() {
                log::debug!("No surface for {}, skipping", kind.key());
            }
        }
        showcase
    }

    pub fn panels(&self) -> Vec<&dyn Panel> {
        let mut panels: Vec<&dyn Panel> = Vec::new();
        if let Some(slot) = &self.particles {
            panels.push(slot);
        }
        if let Some(slot) = &self.outcome_box {
            panels.push(slot);
        }
        if let Some(slot) = &self.pair {
            panels.push(slot);
        }
        if let Some(slot) = &self.emission {
            panels.push(slot);
        }
        if let Some(slot) = &self.wave {
            panels.push(slot);
        }
        panels
    }

    pub fn panels_mut(&mut self) -> Vec<&mut dyn Panel> {
        let mut panels: Vec<&mut dyn Panel> = Vec::new();
        if let Some(slot) = &mut self.particles {
            panels.push(slot);
        }
        if let Some(slot) = &mut self.outcome_box {
            panels.push(slot);
        }
        if let Some(slot) = &mut self.pair {
            panels.push(slot);
        }
        if let Some(slot) = &mut self.emission {
            panels.push(slot);
        }
        if let Some(slot) = &mut self.wave {
            panels.push(slot);
        }
        panels
    }

    /// One display refresh for every running module
    pub fn frame(&mut self, dt: f32) {
        for panel in self.panels_mut() {
            panel.frame(dt);
        }
    }

    /// Apply new surface geometry before the next frame runs
    pub fn layout(&mut self, surfaces: &SurfaceMap) {
        if let (Some(slot), Some(rect)) = (&mut self.particles, surfaces.particles) {
            slot.set_viewport(rect);
        }
        if let (Some(slot), Some(rect)) = (&mut self.outcome_box, surfaces.outcome_box) {
            slot.set_viewport(rect);
        }
        if let (Some(slot), Some(rect)) = (&mut self.pair, surfaces.entanglement) {
            slot.set_viewport(rect);
        }
        if let (Some(slot), Some(rect)) = (&mut self.emission, surfaces.double_slit) {
            slot.set_viewport(rect);
        }
        if let (Some(slot), Some(rect)) = (&mut self.wave, surfaces.uncertainty) {
            slot.set_viewport(rect);
        }
    }

    /// Route a window-space click to the panel under it
    pub fn click(&mut self, window_point: Vec2) -> bool {
        self.panels_mut()
            .into_iter()
            .rev()
            .any(|panel| panel.click(window_point))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause_all(&mut self) {
        self.paused = true;
        for panel in self.panels_mut() {
            panel.pause();
        }
    }

    /// Restart every scheduler except those stopped by a contained panic
    pub fn resume_all(&mut self) {
        self.paused = false;
        for panel in self.panels_mut() {
            panel.resume();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume_all();
        } else {
            self.pause_all();
        }
        log::debug!("Showcase {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn toggle_observing(&mut self) {
        if let Some(slot) = &mut self.emission {
            slot.with_animation(|emission| emission.set_observing(!emission.is_observing()));
        }
    }

    pub fn separate_pair(&mut self) {
        if let Some(slot) = &mut self.pair {
            slot.with_animation(|pair| pair.separate());
        }
    }

    pub fn reset_box(&mut self) {
        if let Some(slot) = &mut self.outcome_box {
            slot.with_animation(|outcome_box| outcome_box.reset());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RenderSurface;

    fn config() -> ShowcaseConfig {
        ShowcaseConfig {
            seed: Some(42),
            ..ShowcaseConfig::default()
        }
    }

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_layout_places_hero_and_grid() {
        let map = SurfaceMap::layout(area(), &ModuleKind::ALL);
        let hero = map.particles.unwrap();
        assert_eq!(hero.size, Vec2::new(1000.0, 320.0));

        let cells = [map.outcome_box, map.entanglement, map.double_slit, map.uncertainty];
        for (i, a) in cells.iter().enumerate() {
            let a = a.unwrap();
            assert!(a.min.y >= hero.max().y);
            assert!(a.max().x <= 1000.0 + 1e-3 && a.max().y <= 800.0 + 1e-3);
            for b in cells.iter().skip(i + 1) {
                let b = b.unwrap();
                let overlap_x = a.min.x < b.max().x && b.min.x < a.max().x;
                let overlap_y = a.min.y < b.max().y && b.min.y < a.max().y;
                assert!(!(overlap_x && overlap_y));
            }
        }
    }

    #[test]
    fn test_missing_surfaces_are_skipped() {
        let map = SurfaceMap::layout(area(), &[ModuleKind::DoubleSlit, ModuleKind::Uncertainty]);
        let mut showcase = Showcase::new(&config(), &map);

        assert!(showcase.particles.is_none());
        assert!(showcase.outcome_box.is_none());
        assert!(showcase.pair.is_none());
        assert_eq!(showcase.panels().len(), 2);

        showcase.frame(1.0 / 60.0);
        showcase.toggle_observing();
        showcase.separate_pair();
        showcase.reset_box();
        assert!(showcase.emission.as_ref().unwrap().animation.is_observing());
    }

    #[test]
    fn test_every_panel_draws_each_frame() {
        let map = SurfaceMap::layout(area(), &ModuleKind::ALL);
        let mut showcase = Showcase::new(&config(), &map);
        showcase.frame(1.0 / 60.0);

        for panel in showcase.panels() {
            assert!(!panel.draw_list().is_empty(), "{} drew nothing", panel.name());
        }
    }

    #[test]
    fn test_click_reaches_box_in_local_space() {
        let map = SurfaceMap::layout(area(), &ModuleKind::ALL);
        let mut showcase = Showcase::new(&config(), &map);

        let cell = map.outcome_box.unwrap();
        assert!(showcase.click(cell.min + cell.size * 0.5));
        assert!(showcase.outcome_box.as_ref().unwrap().animation.is_open());
    }

    #[test]
    fn test_click_toggles_pair_particle() {
        let map = SurfaceMap::layout(area(), &ModuleKind::ALL);
        let mut showcase = Showcase::new(&config(), &map);

        let cell = map.entanglement.unwrap();
        let a = cell.min + Vec2::new(cell.size.x * 0.25, cell.size.y * 0.5);
        assert!(showcase.click(a));

        let pair = &showcase.pair.as_ref().unwrap().animation;
        assert_eq!(pair.flash_intensity(), 1.0);
    }

    #[test]
    fn test_relayout_resizes_modules() {
        let mut showcase = Showcase::new(&config(), &SurfaceMap::layout(area(), &ModuleKind::ALL));
        let smaller = SurfaceMap::layout(Rect::new(0.0, 0.0, 500.0, 400.0), &ModuleKind::ALL);
        showcase.layout(&smaller);

        let field = &showcase.particles.as_ref().unwrap().animation;
        assert_eq!(field.bounds(), smaller.particles.unwrap().size);
        assert!(field
            .particles()
            .iter()
            .all(|p| p.position.x <= 500.0 && p.position.y <= 160.0));
    }

    #[test]
    fn test_canvas_area_excludes_sidebar() {
        assert_eq!(
            canvas_area(Vec2::new(1440.0, 900.0), 300.0),
            Rect::new(0.0, 0.0, 1140.0, 900.0)
        );
        // A sidebar wider than the window still leaves a drawable canvas
        assert_eq!(canvas_area(Vec2::new(200.0, 0.0), 350.0).size, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_window_resize_applies_before_next_frame() {
        let mut showcase = Showcase::new(
            &config(),
            &SurfaceMap::layout(canvas_area(Vec2::new(1440.0, 900.0), 300.0), &ModuleKind::ALL),
        );
        showcase.frame(1.0 / 60.0);

        let resized = SurfaceMap::layout(canvas_area(Vec2::new(900.0, 600.0), 300.0), &ModuleKind::ALL);
        showcase.layout(&resized);
        showcase.frame(1.0 / 60.0);

        for panel in showcase.panels() {
            assert!(panel.viewport().max().x <= 600.0 + 1e-3, "{}", panel.name());
            assert_eq!(panel.draw_list().size(), panel.viewport().size);
        }
        let field = &showcase.particles.as_ref().unwrap().animation;
        assert!(field.particles().iter().all(|p| p.position.x <= 600.0 + 1.5));
    }

    #[test]
    fn test_faulted_module_ignores_keys() {
        let map = SurfaceMap::layout(area(), &ModuleKind::ALL);
        let mut showcase = Showcase::new(&config(), &map);

        let slot = showcase.emission.as_mut().unwrap();
        let result: Option<()> = slot.with_animation(|_| panic!("broken handler"));
        assert!(result.is_none());
        assert!(slot.is_faulted());

        showcase.toggle_observing();
        assert!(!showcase.emission.as_ref().unwrap().animation.is_observing());

        // Other modules keep responding
        showcase.reset_box();
        showcase.frame(1.0 / 60.0);
        assert!(!showcase.outcome_box.as_ref().unwrap().is_faulted());
    }

    #[test]
    fn test_pause_freezes_all() {
        let mut showcase = Showcase::new(&config(), &SurfaceMap::layout(area(), &ModuleKind::ALL));
        showcase.toggle_pause();
        assert!(showcase.is_paused());
        assert!(showcase.panels().iter().all(|p| !p.is_running()));

        showcase.toggle_pause();
        assert!(showcase.panels().iter().all(|p| p.is_running()));
    }
}

//! Shared update/draw contract and the slot that drives it
//!
//! Each module implements [`Animation`]. A [`Slot`] binds one animation to its
//! own [`FrameScheduler`], viewport and [`DrawList`], and contains panics so a
//! misbehaving module stops alone instead of taking the whole page down.

use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;

use crate::scheduler::{Frame, FrameScheduler};
use crate::surface::{DrawList, Rect, RenderSurface};

/// Per-frame update and draw for one visual module
pub trait Animation {
    fn name(&self) -> &'static str;

    /// Surface dimensions changed; must be fully applied before returning
    fn resize(&mut self, size: Vec2);

    fn update(&mut self, frame: &Frame);

    fn draw(&self, surface: &mut dyn RenderSurface, frame: &Frame);

    /// Pointer click in surface-local coordinates. Returns true if handled.
    fn on_click(&mut self, _point: Vec2) -> bool {
        false
    }
}

/// An animation mounted on a region of the window
pub struct Slot<A: Animation> {
    pub animation: A,
    pub scheduler: FrameScheduler,
    viewport: Rect,
    draw_list: DrawList,
    faulted: bool,
}

impl<A: Animation> Slot<A> {
    pub fn new(animation: A, viewport: Rect) -> Self {
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        log::info!("Initialized {} at {:?}", animation.name(), viewport.size);

        Self {
            animation,
            scheduler,
            draw_list: DrawList::new(viewport.size),
            viewport,
            faulted: false,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Move or resize the slot; the animation sees the new size immediately
    pub fn set_viewport(&mut self, viewport: Rect) {
        let resized = viewport.size != self.viewport.size;
        self.viewport = viewport;
        if resized {
            log::debug!("Resizing {} to {:?}", self.animation.name(), viewport.size);
            self.draw_list.resize(viewport.size);
            self.guarded(|animation| animation.resize(viewport.size));
        }
    }

    /// Run update then draw for one refresh, if the scheduler is running
    pub fn frame(&mut self, dt: f32) {
        let Self {
            animation,
            scheduler,
            draw_list,
            faulted,
            ..
        } = self;

        let mut panicked = false;
        scheduler.run_frame(dt, |frame| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                animation.update(frame);
                draw_list.clear();
                animation.draw(draw_list, frame);
            }));
            if result.is_err() {
                panicked = true;
            }
        });

        if panicked {
            log::error!("{} panicked during a frame and was stopped", animation.name());
            *faulted = true;
            draw_list.clear();
            scheduler.stop();
        }
    }

    /// Forward a window-space click if it lands inside this slot
    pub fn click(&mut self, window_point: Vec2) -> bool {
        if self.faulted || !self.viewport.contains(window_point) {
            return false;
        }
        let local = window_point - self.viewport.min;
        self.guarded(|animation| animation.on_click(local))
            .unwrap_or(false)
    }

    /// Apply a UI action to the animation; refused once the slot has faulted
    pub fn with_animation<R>(&mut self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        self.guarded(f)
    }

    fn guarded<R>(&mut self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        if self.faulted {
            return None;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut self.animation))) {
            Ok(value) => Some(value),
            Err(_) => {
                log::error!("{} panicked handling input and was stopped", self.animation.name());
                self.faulted = true;
                self.draw_list.clear();
                self.scheduler.stop();
                None
            }
        }
    }
}

//! egui side panel with each module's relation, controls and readouts,
//! plus the painter pass that draws canvas text on top of the GPU shapes

use egui::{Align2, Color32, Context, FontFamily, FontId, RichText};
use glam::Vec2;

use crate::palette::{mix, Rgba, CYAN, GREEN, MAGENTA, ORANGE};
use crate::paired_state::Which;
use crate::showcase::Showcase;
use crate::surface::{Rect, TextAlign, TextStyle};

/// Relation shown under a module heading
pub struct Relation {
    pub formula: &'static str,
    pub description: &'static str,
}

pub const PARTICLE_RELATION: Relation = Relation {
    formula: "|rᵢ − rⱼ| < 100 ⇒ link",
    description: "Nearby particles are joined, fading with distance",
};

pub const BOX_RELATION: Relation = Relation {
    formula: "|ψ⟩ = (|alive⟩ + |dead⟩)/√2",
    description: "Opening the box collapses the superposition",
};

pub const PAIR_RELATION: Relation = Relation {
    formula: "|Ψ⁻⟩ = (|↑↓⟩ − |↓↑⟩)/√2",
    description: "Measuring one spin fixes the other at any distance",
};

pub const SLIT_RELATION: Relation = Relation {
    formula: "I(y) = |ψ₁ + ψ₂|²",
    description: "Which-path detection destroys the interference fringes",
};

pub const WAVE_RELATION: Relation = Relation {
    formula: "Δx · Δp ≥ ℏ/2",
    description: "Sharpen one and the other must spread",
};

fn color32(color: Rgba) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(channel(color[0]), channel(color[1]), channel(color[2]), channel(color[3]))
}

/// Show the side panel and return the remaining canvas area in points
pub fn draw_control_panel(ctx: &Context, showcase: &mut Showcase) -> egui::Rect {
    egui::SidePanel::right("controls_panel")
        .min_width(280.0)
        .max_width(350.0)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(RichText::new("Quantum Concepts").color(Color32::from_rgb(100, 200, 255)));
                });
                ui.add_space(10.0);

                particle_section(ui, showcase);
                box_section(ui, showcase);
                pair_section(ui, showcase);
                slit_section(ui, showcase);
                wave_section(ui, showcase);

                ui.add_space(10.0);
                ui.separator();
                ui.label(RichText::new("Keys").strong().color(Color32::from_rgb(255, 200, 100)));
                for (key, action) in [
                    ("Space", "Pause / resume"),
                    ("O", "Toggle observing"),
                    ("S", "Separate pair"),
                    ("R", "Reset box"),
                    ("Esc", "Quit"),
                ] {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(key)
                                .color(Color32::from_rgb(150, 255, 150))
                                .font(FontId::new(14.0, FontFamily::Monospace)),
                        );
                        ui.label(RichText::new(action).color(Color32::LIGHT_GRAY));
                    });
                }
                if showcase.is_paused() {
                    ui.add_space(5.0);
                    ui.label(RichText::new("Paused").strong().color(color32(ORANGE)));
                }
            });
        });

    ctx.available_rect()
}

fn section_header(ui: &mut egui::Ui, title: &str, relation: &Relation) {
    ui.separator();
    ui.add_space(5.0);
    ui.label(RichText::new(title).strong().color(Color32::from_rgb(255, 200, 100)));
    ui.group(|ui| {
        ui.label(
            RichText::new(relation.formula)
                .font(FontId::new(16.0, FontFamily::Monospace))
                .color(Color32::from_rgb(200, 220, 255)),
        );
        ui.label(RichText::new(relation.description).small().color(Color32::GRAY));
    });
}

fn particle_section(ui: &mut egui::Ui, showcase: &mut Showcase) {
    let Some(slot) = &showcase.particles else {
        return;
    };
    section_header(ui, "Particle Field", &PARTICLE_RELATION);
    let field = &slot.animation;
    ui.label(format!("Particles: {}", field.particles().len()));
    ui.label(format!("Links: {}", field.connections().len()));
}

fn box_section(ui: &mut egui::Ui, showcase: &mut Showcase) {
    let Some(slot) = &mut showcase.outcome_box else {
        return;
    };
    section_header(ui, "Schrödinger's Box", &BOX_RELATION);
    let elapsed = slot.scheduler.elapsed();
    let outcome_box = &slot.animation;
    let (mut open, mut reset) = (false, false);

    ui.label(RichText::new(outcome_box.status_text()).color(color32(outcome_box.indicator_color(elapsed))));
    ui.add_enabled_ui(!slot.is_faulted(), |ui| {
        ui.horizontal(|ui| {
            open = ui
                .add_enabled(!outcome_box.is_open(), egui::Button::new("Open Box"))
                .clicked();
            reset = ui.button("Reset").clicked();
        });
    });

    if open {
        slot.with_animation(|b| b.open());
    }
    if reset {
        slot.with_animation(|b| b.reset());
    }
}

fn pair_section(ui: &mut egui::Ui, showcase: &mut Showcase) {
    let Some(slot) = &mut showcase.pair else {
        return;
    };
    section_header(ui, "Entanglement", &PAIR_RELATION);
    let pair = &slot.animation;
    let mut measure = None;
    let mut separate = false;

    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("A: {}", pair.particle(Which::A).spin.arrow())).color(color32(CYAN)));
        ui.label(RichText::new(format!("B: {}", pair.particle(Which::B).spin.arrow())).color(color32(MAGENTA)));
    });
    ui.label(format!("Distance: {} km", pair.distance().round() as i64));
    ui.add_enabled_ui(!slot.is_faulted(), |ui| {
        ui.horizontal(|ui| {
            if ui.button("Measure A").clicked() {
                measure = Some(Which::A);
            }
            if ui.button("Measure B").clicked() {
                measure = Some(Which::B);
            }
            separate = ui.button("Separate").clicked();
        });
    });

    if let Some(which) = measure {
        slot.with_animation(|pair| {
            let at = pair.particle(which).position;
            pair.toggle_near(at);
        });
    }
    if separate {
        slot.with_animation(|pair| pair.separate());
    }
}

fn slit_section(ui: &mut egui::Ui, showcase: &mut Showcase) {
    let Some(slot) = &mut showcase.emission else {
        return;
    };
    section_header(ui, "Double Slit", &SLIT_RELATION);

    let mut observing = slot.animation.is_observing();
    let toggled = ui
        .add_enabled(!slot.is_faulted(), egui::Checkbox::new(&mut observing, "Observe which slit"))
        .changed();
    ui.label(format!("Electrons passed: {}", slot.animation.passed()));
    ui.label(format!("Landings recorded: {}", slot.animation.histogram().total()));

    if toggled {
        slot.with_animation(|emission| emission.set_observing(observing));
    }
}

fn wave_section(ui: &mut egui::Ui, showcase: &mut Showcase) {
    let Some(slot) = &mut showcase.wave else {
        return;
    };
    section_header(ui, "Uncertainty", &WAVE_RELATION);
    let enabled = !slot.is_faulted();

    let mut position = slot.animation.state().position_precision;
    if ui
        .add_enabled(enabled, egui::Slider::new(&mut position, 0..=100).text("Position precision"))
        .changed()
    {
        slot.with_animation(|wave| wave.set_position_precision(position));
    }
    let mut momentum = slot.animation.state().momentum_precision;
    if ui
        .add_enabled(enabled, egui::Slider::new(&mut momentum, 0..=100).text("Momentum precision"))
        .changed()
    {
        slot.with_animation(|wave| wave.set_momentum_precision(momentum));
    }

    let wave = &slot.animation;
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("Δx {}", wave.position_echo())).color(color32(MAGENTA)));
        ui.label(RichText::new(format!("Δp {}", wave.momentum_echo())).color(color32(GREEN)));
    });

    let (from, to) = wave.band().colors();
    let score = wave.state().score;
    ui.add(
        egui::ProgressBar::new(score / 100.0)
            .fill(color32(mix(from, to, score / 100.0)))
            .text(format!("Uncertainty {}", wave.score_echo())),
    );
}

/// Draw offsets in points; bold text is overstruck one physical pixel to the right
fn text_passes(style: &TextStyle, pixels_per_point: f32) -> Vec<egui::Vec2> {
    let mut passes = vec![egui::Vec2::ZERO];
    if style.bold {
        passes.push(egui::vec2(1.0 / pixels_per_point, 0.0));
    }
    passes
}

/// Paint every panel's recorded text over the canvas, clipped to its panel
pub fn paint_canvas_text(ctx: &Context, showcase: &Showcase, pixels_per_point: f32) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("canvas_text")));
    let to_points = |p: Vec2| egui::pos2(p.x / pixels_per_point, p.y / pixels_per_point);

    for panel in showcase.panels() {
        let Rect { min, size } = panel.viewport();
        let clip = egui::Rect::from_min_max(to_points(min), to_points(min + size));
        let painter = painter.with_clip_rect(clip);

        for (position, text, style) in panel.draw_list().texts() {
            let anchor = match style.align {
                TextAlign::Left => Align2::LEFT_BOTTOM,
                TextAlign::Center => Align2::CENTER_BOTTOM,
            };
            let font = FontId::new(style.size / pixels_per_point, FontFamily::Proportional);
            for offset in text_passes(style, pixels_per_point) {
                painter.text(
                    to_points(min + position) + offset,
                    anchor,
                    text,
                    font.clone(),
                    color32(style.color),
                );
            }
        }
    }
}

//! Neon colour palette shared by every panel

/// Linear RGBA colour, components in [0, 1]
pub type Rgba = [f32; 4];

/// Build an opaque colour from a `0xRRGGBB` literal
pub const fn hex(rgb: u32) -> Rgba {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Same colour with a replaced alpha
pub const fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha]
}

/// Component-wise interpolation between two colours
pub fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let s = 1.0 - t;
    [
        a[0] * s + b[0] * t,
        a[1] * s + b[1] * t,
        a[2] * s + b[2] * t,
        a[3] * s + b[3] * t,
    ]
}

pub const CYAN: Rgba = hex(0x00f5ff);
pub const MAGENTA: Rgba = hex(0xff00ff);
pub const GREEN: Rgba = hex(0x39ff14);
pub const PURPLE: Rgba = hex(0xb347ff);
pub const RED: Rgba = hex(0xff4444);
pub const ORANGE: Rgba = hex(0xffaa00);
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
pub const TEXT_DIM: Rgba = hex(0xb0b0c0);
pub const BACKGROUND: Rgba = hex(0x0a0a0f);
pub const PANEL: Rgba = hex(0x12121c);
pub const BARRIER: Rgba = hex(0x2a2a4e);

/// Colours a free particle may be drawn with
pub const NEON: [Rgba; 4] = [CYAN, MAGENTA, GREEN, PURPLE];

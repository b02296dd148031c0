//! Colour ramps used to render simulation grids into data textures.

use std::fmt;
use std::str::FromStr;

type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Turbo,
    Inferno,
    Viridis,
    Coolwarm,
    Twilight,
    Plasma,
}

impl Colormap {
    pub const ALL: [Colormap; 6] = [
        Colormap::Turbo,
        Colormap::Inferno,
        Colormap::Viridis,
        Colormap::Coolwarm,
        Colormap::Twilight,
        Colormap::Plasma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Turbo => "turbo",
            Colormap::Inferno => "inferno",
            Colormap::Viridis => "viridis",
            Colormap::Coolwarm => "coolwarm",
            Colormap::Twilight => "twilight",
            Colormap::Plasma => "plasma",
        }
    }

    fn stops(self) -> &'static [Rgb] {
        match self {
            Colormap::Turbo => &[
                (48, 18, 59),
                (70, 107, 227),
                (40, 187, 236),
                (50, 241, 153),
                (164, 252, 60),
                (237, 208, 58),
                (251, 128, 34),
                (209, 49, 6),
                (122, 4, 3),
            ],
            Colormap::Inferno => &[
                (0, 0, 4),
                (31, 12, 72),
                (85, 15, 109),
                (136, 34, 106),
                (186, 54, 85),
                (227, 89, 51),
                (249, 140, 10),
                (249, 201, 50),
                (252, 255, 164),
            ],
            Colormap::Viridis => &[
                (68, 1, 84),
                (71, 44, 122),
                (59, 81, 139),
                (44, 113, 142),
                (33, 144, 141),
                (39, 173, 129),
                (92, 200, 99),
                (170, 220, 50),
                (253, 231, 37),
            ],
            Colormap::Coolwarm => &[
                (59, 76, 192),
                (98, 130, 234),
                (141, 176, 254),
                (184, 208, 249),
                (221, 221, 221),
                (245, 196, 173),
                (244, 154, 123),
                (222, 96, 77),
                (180, 4, 38),
            ],
            Colormap::Twilight => &[
                (226, 217, 226),
                (166, 187, 204),
                (99, 137, 194),
                (94, 67, 165),
                (47, 20, 54),
                (115, 37, 87),
                (176, 74, 73),
                (207, 148, 125),
                (226, 217, 226),
            ],
            Colormap::Plasma => &[
                (13, 8, 135),
                (84, 2, 163),
                (139, 10, 165),
                (185, 50, 137),
                (219, 92, 104),
                (244, 136, 73),
                (254, 188, 43),
                (240, 249, 33),
            ],
        }
    }

    /// RGBA at `t` in [0, 1]; `t` is clamped. Non-finite input is fully
    /// transparent.
    pub fn rgba(self, t: f64) -> [u8; 4] {
        if !t.is_finite() {
            return [0, 0, 0, 0];
        }
        let c = self.stops();
        let x = t.clamp(0.0, 1.0) * (c.len() - 1) as f64;
        let i = (x.floor() as usize).min(c.len() - 2);
        let f = x - i as f64;
        let lerp = |a: u8, b: u8| (a as f64 + f * (b as f64 - a as f64)).round() as u8;
        let ((r0, g0, b0), (r1, g1, b1)) = (c[i], c[i + 1]);
        [lerp(r0, r1), lerp(g0, g1), lerp(b0, b1), 255]
    }

    /// Horizontal strip of `width` pixels running through the whole ramp.
    pub fn strip(self, width: u32) -> Vec<u8> {
        let last = width.saturating_sub(1).max(1) as f64;
        (0..width)
            .flat_map(|x| self.rgba(x as f64 / last))
            .collect()
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colormap::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown colormap '{}'", s))
    }
}

//! Choropleth color ramp and legends
//!
//! Country fills are `count / max_count` pushed through a fixed 5-stop
//! green ramp, dark to light. The legends shown next to the map are derived
//! from the same ramp and the same `max_count`.

use serde::Serialize;

/// Ramp domain stops
pub const RAMP_DOMAIN: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Ramp colors, one per domain stop
pub const RAMP_COLORS: [&str; 5] = ["#152715ff", "#184D28", "#2F8F45", "#4CCF6A", "#A3F5C1"];

/// Bubble radius range for the size legend
pub const BUBBLE_RADIUS_RANGE: [f64; 2] = [2.0, 18.0];

/// Piecewise-linear color scale over [`RAMP_DOMAIN`]
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<(f64, Rgb)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb {
    r: f64,
    g: f64,
    b: f64,
}

impl Rgb {
    /// Parse `#rrggbb` or `#rrggbbaa` (alpha ignored)
    fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok().map(f64::from);
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    fn to_hex(self) -> String {
        let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        let stops = RAMP_DOMAIN
            .iter()
            .zip(RAMP_COLORS.iter())
            .filter_map(|(&t, hex)| Rgb::parse(hex).map(|rgb| (t, rgb)))
            .collect();
        Self { stops }
    }
}

impl ColorRamp {
    /// Color for a normalized value; inputs outside [0, 1] are clamped
    pub fn color(&self, t: f64) -> String {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let local = if span > 0.0 { (t - t0) / span } else { 0.0 };
                return c0.lerp(c1, local).to_hex();
            }
        }

        self.stops
            .last()
            .map(|(_, c)| c.to_hex())
            .unwrap_or_else(|| "#000000".to_string())
    }

    /// Fill for a country count relative to the current maximum
    pub fn fill(&self, count: usize, max_count: usize) -> String {
        self.color(count as f64 / max_count.max(1) as f64)
    }
}

/// One row of the color legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub label: String,
    pub color: String,
}

/// Color legend rows for the current maximum count
///
/// Thresholds are the ramp stops scaled by `max_count`; labels round up.
pub fn color_legend(max_count: usize) -> Vec<LegendRow> {
    let max = max_count as f64;
    let thresholds: Vec<f64> = RAMP_DOMAIN.iter().map(|t| t * max).collect();

    thresholds
        .iter()
        .enumerate()
        .map(|(i, threshold)| {
            let label = if i == 0 {
                format!("0–{}", thresholds[1].ceil())
            } else {
                let upper = thresholds.get(i + 1).copied().unwrap_or(max);
                format!("{}–{}", threshold.ceil(), upper.ceil())
            };
            LegendRow {
                label,
                color: RAMP_COLORS[i].to_string(),
            }
        })
        .collect()
}

/// One bubble of the size legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendBubble {
    pub value: usize,
    pub radius: f64,
    pub color: String,
}

/// Square-root radius scale over `[1, max_count]`
pub fn bubble_radius(value: usize, max_count: usize) -> f64 {
    let [r0, r1] = BUBBLE_RADIUS_RANGE;
    let d0 = 1.0_f64;
    let d1 = (max_count as f64).sqrt();
    let span = d1 - d0;
    if span.abs() < f64::EPSILON {
        // Degenerate domain maps to the middle of the range
        return (r0 + r1) / 2.0;
    }
    r0 + ((value as f64).sqrt() - d0) / span * (r1 - r0)
}

/// Size legend: roughly 10%, 50% and 100% of the current maximum
pub fn bubble_legend(max_count: usize, ramp: &ColorRamp) -> Vec<LegendBubble> {
    let max = max_count as f64;
    let values = [
        ((max * 0.1).round() as usize).max(1),
        ((max * 0.5).round() as usize).max(2),
        max_count,
    ];

    values
        .iter()
        .map(|&value| LegendBubble {
            value,
            radius: bubble_radius(value, max_count),
            color: ramp.fill(value, max_count),
        })
        .collect()
}

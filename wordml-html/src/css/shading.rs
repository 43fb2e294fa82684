//! Shading patterns flattened to a single background color.

use super::color::convert_color;
use super::StyleMap;
use crate::source::Node;
use std::collections::HashMap;

enum Pattern {
    Foreground,
    Fill,
    Percent(f64),
}

fn pattern(val: &str) -> Option<Pattern> {
    let pct = match val {
        "auto" | "solid" => return Some(Pattern::Foreground),
        "clear" | "nil" => return Some(Pattern::Fill),
        "pct10" => 0.1,
        "pct12" => 0.125,
        "pct15" => 0.15,
        "pct20" => 0.2,
        "pct25" | "thinDiagStripe" | "thinHorzStripe" | "thinReverseDiagStripe"
        | "thinVertStripe" => 0.25,
        "pct30" | "thinHorzCross" => 0.3,
        "pct35" => 0.35,
        "pct37" => 0.375,
        "pct40" => 0.4,
        "pct45" => 0.45,
        "pct50" | "horzCross" | "horzStripe" | "reverseDiagStripe" | "thinDiagCross" => 0.5,
        "pct55" => 0.55,
        "pct60" => 0.6,
        "pct62" => 0.625,
        "pct65" => 0.65,
        "pct70" => 0.7,
        "pct75" | "diagCross" | "diagStripe" => 0.75,
        "pct80" => 0.8,
        "pct85" => 0.85,
        "pct87" => 0.875,
        "pct90" => 0.9,
        "pct95" => 0.95,
        _ => return None,
    };
    Some(Pattern::Percent(pct))
}

fn channels(hex: &str) -> Option<[i64; 3]> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = [0; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = i64::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

/// Blends pattern colors, memoizing per (foreground, fill, percentage).
#[derive(Debug, Default)]
pub struct ShadingResolver {
    cache: HashMap<String, String>,
}

impl ShadingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved color (before CSS conversion) for a `shd` element.
    pub fn resolve(&mut self, shd: Node<'_>) -> Option<String> {
        let val = shd.w_attr("val")?;
        let color = shd.w_attr("color");
        let fill = shd.w_attr("fill");
        match pattern(val)? {
            Pattern::Foreground => color.map(str::to_string),
            Pattern::Fill => fill.map(str::to_string),
            Pattern::Percent(pct) => {
                let color = match color {
                    None | Some("auto") => "000000",
                    Some(c) => c,
                };
                let fill = match fill {
                    None | Some("auto") => "ffffff",
                    Some(f) => f,
                };
                let key = format!("{color}|{fill}|{pct}");
                if let Some(hit) = self.cache.get(&key) {
                    return Some(hit.clone());
                }
                let blended = blend(color, fill, pct)?;
                self.cache.insert(key, blended.clone());
                Some(blended)
            }
        }
    }

    /// Add `background` for the shading, if it resolves to a color.
    pub fn add_background(&mut self, style: &mut StyleMap, shd: Option<Node<'_>>) {
        let Some(shd) = shd else {
            return;
        };
        if let Some(resolved) = self.resolve(shd) {
            let css = convert_color(&resolved);
            if !css.is_empty() {
                style.add_if_missing("background", css);
            }
        }
    }
}

/// `fill - (fill - color) * pct` per channel, truncated.
fn blend(color: &str, fill: &str, pct: f64) -> Option<String> {
    let c = channels(color)?;
    let f = channels(fill)?;
    let mix = |i: usize| (f[i] as f64 - (f[i] - c[i]) as f64 * pct) as i64;
    Some(format!("{:02x}{:02x}{:02x}", mix(0), mix(1), mix(2)))
}

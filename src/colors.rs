//! Plasma colormap sampling for isochrone bands.

/// Matplotlib's plasma colormap at t = 0.0, 0.1, ... 1.0.
const PLASMA: [(u8, u8, u8); 11] = [
    (0x0d, 0x08, 0x87),
    (0x41, 0x04, 0x9d),
    (0x6a, 0x00, 0xa8),
    (0x8f, 0x0d, 0xa4),
    (0xb1, 0x2a, 0x90),
    (0xcc, 0x47, 0x78),
    (0xe1, 0x64, 0x62),
    (0xf2, 0x84, 0x4b),
    (0xfc, 0xa6, 0x36),
    (0xfc, 0xce, 0x25),
    (0xf0, 0xf9, 0x21),
];

/// Color of the unreached street network.
pub const EDGE_COLOR: &str = "#999999";

/// Plasma color at `t` in `[0, 1]`, as `#rrggbb`.
pub fn plasma(t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - lower as f64;

    let (r0, g0, b0) = PLASMA[lower];
    let (r1, g1, b1) = PLASMA[lower + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    format!("#{:02x}{:02x}{:02x}", lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// `n` colors evenly spaced over the colormap from `start` to its end.
pub fn get_colors(n: usize, start: f64) -> Vec<String> {
    match n {
        0 => Vec::new(),
        1 => vec![plasma(start)],
        _ => {
            let step = (1.0 - start) / (n - 1) as f64;
            (0..n).map(|i| plasma(start + step * i as f64)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plasma_endpoints() {
        assert_eq!(plasma(0.0), "#0d0887");
        assert_eq!(plasma(1.0), "#f0f921");
        assert_eq!(plasma(0.5), "#cc4778");
        assert_eq!(plasma(-2.0), "#0d0887");
        assert_eq!(plasma(7.0), "#f0f921");
    }

    #[test]
    fn test_get_colors() {
        assert!(get_colors(0, 0.0).is_empty());
        assert_eq!(get_colors(1, 0.0), vec!["#0d0887"]);
        assert_eq!(get_colors(3, 0.0), vec!["#0d0887", "#cc4778", "#f0f921"]);
        let colors = get_colors(6, 0.0);
        assert_eq!(colors.len(), 6);
        assert_eq!(colors.last().map(String::as_str), Some("#f0f921"));
    }
}

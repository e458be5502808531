/// Fixed-width buckets over mean polarity, left-closed.
const EDGES: [f64; 6] = [-1.1, -0.5, -0.1, 0.1, 0.5, 1.1];

pub const BIN_LABELS: [&str; 5] = [
    "Very Neg (< -0.5)",
    "Neg (-0.5 to -0.1)",
    "Neu (-0.1 to 0.1)",
    "Pos (0.1 to 0.5)",
    "Very Pos (> 0.5)",
];

pub const UNKNOWN_BIN: &str = "Unknown";

pub fn sentiment_bin(mean_polarity: f64) -> &'static str {
    EDGES
        .windows(2)
        .position(|w| mean_polarity >= w[0] && mean_polarity < w[1])
        .map(|i| BIN_LABELS[i])
        .unwrap_or(UNKNOWN_BIN)
}

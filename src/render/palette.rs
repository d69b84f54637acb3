/// Fill colours for cluster series, cycled when k exceeds the palette.
pub const CLUSTER_COLORS: [&str; 5] = [
    "rgba(255, 99, 132, 0.5)",
    "rgba(54, 162, 235, 0.5)",
    "rgba(255, 206, 86, 0.5)",
    "rgba(75, 192, 192, 0.5)",
    "rgba(153, 102, 255, 0.5)",
];

pub const CENTROID_BORDER: &str = "rgba(0, 0, 0, 1)";

pub fn cluster_color(index: usize) -> &'static str {
    CLUSTER_COLORS[index % CLUSTER_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(cluster_color(0), cluster_color(5));
        assert_eq!(cluster_color(7), CLUSTER_COLORS[2]);
    }
}

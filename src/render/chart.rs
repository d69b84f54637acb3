use super::palette::{CENTROID_BORDER, cluster_color};
use crate::controller::PageState;
use crate::domain::Point;
use tracing::debug;

pub const CHART_TITLE: &str = "KMeans Clustering";
pub const CENTROID_LABEL: &str = "Centroids";
pub const MANUAL_LABEL: &str = "Manual selection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Circle,
    Triangle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Centroids,
    Cluster(usize),
    ManualSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub color: &'static str,
    pub width: u32,
}

/// A plotted point; `color` overrides the series colour when set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub position: Point,
    pub color: Option<&'static str>,
}

impl PlotPoint {
    fn plain(position: Point) -> Self {
        Self {
            position,
            color: None,
        }
    }

    fn colored(position: Point, color: &'static str) -> Self {
        Self {
            position,
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    pub color: &'static str,
    pub border: Option<Border>,
    pub radius: f64,
    pub style: MarkerStyle,
    pub points: Vec<PlotPoint>,
}

impl Series {
    fn cluster(index: usize) -> Self {
        Self {
            label: format!("Cluster {index}"),
            kind: SeriesKind::Cluster(index),
            color: cluster_color(index),
            border: None,
            radius: 5.0,
            style: MarkerStyle::Circle,
            points: Vec::new(),
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(|p| p.position)
    }
}

/// Axis-aligned extent of everything on the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    fn around(point: Point) -> Self {
        Self {
            min_x: point.x,
            max_x: point.x,
            min_y: point.y,
            max_y: point.y,
        }
    }

    fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    /// Grow each side by `fraction` of the span; degenerate spans grow by 1.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = |min: f64, max: f64| {
            let span = max - min;
            if span > 0.0 { span * fraction } else { 1.0 }
        };
        let px = pad(self.min_x, self.max_x);
        let py = pad(self.min_y, self.max_y);
        Self {
            min_x: self.min_x - px,
            max_x: self.max_x + px,
            min_y: self.min_y - py,
            max_y: self.max_y + py,
        }
    }
}

/// Scatter chart description, independent of any drawing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartModel {
    /// Build the chart for the current page.
    ///
    /// Series order: centroids, one series per cluster, then manual picks
    /// when there are any. Points are bucketed by assignment when the
    /// assignments line up with the dataset, otherwise all go to cluster 0.
    pub fn from_state(state: &PageState) -> Self {
        let cluster_count = state.k().max(1);

        let centroids = Series {
            label: CENTROID_LABEL.to_string(),
            kind: SeriesKind::Centroids,
            color: cluster_color(0),
            border: Some(Border {
                color: CENTROID_BORDER,
                width: 2,
            }),
            radius: 10.0,
            style: MarkerStyle::Triangle,
            points: state
                .centroids()
                .iter()
                .enumerate()
                .map(|(i, c)| PlotPoint::colored(*c, cluster_color(i)))
                .collect(),
        };

        let mut clusters: Vec<Series> = (0..cluster_count).map(Series::cluster).collect();
        let dataset = state.dataset();

        match state.assignments().filter(|a| a.matches_len(dataset.len())) {
            Some(assignments) => {
                let mut dropped = 0usize;
                for (point, cluster) in dataset.iter().zip(assignments.as_slice()) {
                    match clusters.get_mut(*cluster) {
                        Some(series) => series.points.push(PlotPoint::plain(*point)),
                        None => dropped += 1,
                    }
                }
                if dropped > 0 {
                    debug!(dropped, cluster_count, "points assigned past last cluster series");
                }
            }
            None => {
                clusters[0]
                    .points
                    .extend(dataset.iter().copied().map(PlotPoint::plain));
            }
        }

        let mut series = Vec::with_capacity(cluster_count + 2);
        series.push(centroids);
        series.extend(clusters);

        if !state.manual_selection().is_empty() {
            series.push(Series {
                label: MANUAL_LABEL.to_string(),
                kind: SeriesKind::ManualSelection,
                color: cluster_color(0),
                border: Some(Border {
                    color: CENTROID_BORDER,
                    width: 1,
                }),
                radius: 8.0,
                style: MarkerStyle::Cross,
                points: state
                    .manual_selection()
                    .iter()
                    .enumerate()
                    .map(|(i, p)| PlotPoint::colored(*p, cluster_color(i)))
                    .collect(),
            });
        }

        Self {
            title: CHART_TITLE.to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            series,
        }
    }

    pub fn centroids(&self) -> Option<&Series> {
        self.series
            .iter()
            .find(|s| s.kind == SeriesKind::Centroids)
    }

    pub fn cluster(&self, index: usize) -> Option<&Series> {
        self.series
            .iter()
            .find(|s| s.kind == SeriesKind::Cluster(index))
    }

    pub fn manual_selection(&self) -> Option<&Series> {
        self.series
            .iter()
            .find(|s| s.kind == SeriesKind::ManualSelection)
    }

    pub fn cluster_series(&self) -> impl Iterator<Item = &Series> + '_ {
        self.series
            .iter()
            .filter(|s| matches!(s.kind, SeriesKind::Cluster(_)))
    }

    /// The data point nearest to `target` within `tolerance`, searching
    /// cluster series only (centroid and selection markers are not
    /// clickable).
    pub fn hit_test(&self, target: Point, tolerance: f64) -> Option<Point> {
        let limit = tolerance * tolerance;
        self.cluster_series()
            .flat_map(Series::positions)
            .map(|p| (p, p.distance_squared(&target)))
            .filter(|(_, d)| *d <= limit)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.series.iter().flat_map(Series::positions);
        let first = positions.next()?;
        let mut bounds = Bounds::around(first);
        for p in positions {
            bounds.include(p);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Assignments, InitMethod};

    fn state_with(k: usize, dataset: Vec<Point>, assignments: Option<Vec<usize>>) -> PageState {
        let mut state = PageState::new(k, InitMethod::Manual);
        state.dataset = dataset;
        state.assignments = assignments.map(Assignments::new);
        state
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(4.0, 4.0),
            Point::new(5.0, 4.0),
        ]
    }

    #[test]
    fn test_points_bucketed_by_assignment() {
        let chart = ChartModel::from_state(&state_with(2, square(), Some(vec![0, 0, 1, 1])));
        assert_eq!(chart.cluster(0).unwrap().points.len(), 2);
        assert_eq!(chart.cluster(1).unwrap().points.len(), 2);
        assert_eq!(chart.series[0].label, CENTROID_LABEL);
        assert_eq!(chart.series[1].label, "Cluster 0");
    }

    #[test]
    fn test_mismatched_assignments_fall_back_to_default_bucket() {
        let chart = ChartModel::from_state(&state_with(2, square(), Some(vec![1, 1])));
        assert_eq!(chart.cluster(0).unwrap().points.len(), 4);
        assert!(chart.cluster(1).unwrap().points.is_empty());

        let chart = ChartModel::from_state(&state_with(2, square(), None));
        assert_eq!(chart.cluster(0).unwrap().points.len(), 4);
    }

    #[test]
    fn test_assignment_past_last_series_is_dropped() {
        let chart = ChartModel::from_state(&state_with(2, square(), Some(vec![0, 1, 2, 1])));
        let plotted: usize = chart.cluster_series().map(|s| s.points.len()).sum();
        assert_eq!(plotted, 3);
    }

    #[test]
    fn test_centroids_colored_by_index() {
        let mut state = state_with(2, square(), None);
        state.centroids = vec![Point::new(0.0, 0.5), Point::new(4.5, 4.0)];
        let chart = ChartModel::from_state(&state);
        let centroids = chart.centroids().unwrap();
        assert_eq!(centroids.style, MarkerStyle::Triangle);
        assert_eq!(centroids.points[1].color, Some(cluster_color(1)));
        assert_eq!(centroids.border.unwrap().width, 2);
    }

    #[test]
    fn test_manual_series_only_when_selected() {
        let mut state = state_with(2, square(), None);
        assert!(ChartModel::from_state(&state).manual_selection().is_none());

        state.manual_selection = vec![Point::new(4.0, 4.0)];
        let chart = ChartModel::from_state(&state);
        assert_eq!(chart.manual_selection().unwrap().points.len(), 1);
    }

    #[test]
    fn test_hit_test_finds_nearest_data_point() {
        let mut state = state_with(2, square(), None);
        state.centroids = vec![Point::new(0.0, 0.4), Point::new(4.5, 4.0)];
        let chart = ChartModel::from_state(&state);

        assert_eq!(
            chart.hit_test(Point::new(0.1, 0.3), 0.5),
            Some(Point::new(0.0, 0.0))
        );
        assert_eq!(chart.hit_test(Point::new(2.0, 2.0), 0.5), None);
    }

    #[test]
    fn test_bounds_cover_all_series() {
        let mut state = state_with(1, square(), None);
        state.centroids = vec![Point::new(-3.0, 9.0)];
        let bounds = ChartModel::from_state(&state).bounds().unwrap();
        assert_eq!(bounds.min_x, -3.0);
        assert_eq!(bounds.max_y, 9.0);
        assert_eq!(bounds.max_x, 5.0);

        let empty = PageState::new(3, InitMethod::Random);
        assert!(ChartModel::from_state(&empty).bounds().is_none());
    }
}

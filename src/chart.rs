//! v^2 against h, plotted as a gizmo line strip in a panel on the right.

use bevy::math::Isometry2d;
use bevy::prelude::*;

use crate::config::{CHART_LINE, CHART_PANEL_MARGIN, STROKE, SimConfig};
use crate::scene::SceneLayout;

/// Chart y values are shown in cm^2/s^2.
pub const V2_DISPLAY_SCALE: f32 = 10_000.0;

/// Recorded `(h [m], v^2 [cm^2/s^2])` samples.
#[derive(Resource, Default, Clone, Debug, PartialEq)]
pub struct Chart {
    points: Vec<Vec2>,
    /// Running ticks seen since the last reset; drives the stride.
    ticks: u32,
}

impl Chart {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Count one running tick and append a sample every `stride` ticks.
    /// Returns whether a sample was appended.
    pub fn record(&mut self, h_m: f32, v_squared: f32, stride: u32) -> bool {
        self.ticks += 1;
        if self.ticks % stride.max(1) != 0 {
            return false;
        }
        self.points.push(Vec2::new(h_m, v_squared * V2_DISPLAY_SCALE));
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Forget the stride phase (the samples stay).
    pub fn reset_counter(&mut self) {
        self.ticks = 0;
    }

    /// Largest x and y seen so far, never below a small positive floor so
    /// the plot can always be normalized.
    pub fn extent(&self) -> Vec2 {
        self.points
            .iter()
            .fold(Vec2::splat(f32::EPSILON), |acc, p| acc.max(*p))
    }
}

/// Screen rectangle of the plot area (origin top-left, +Y down).
pub fn panel_rect(layout: &SceneLayout) -> Rect {
    Rect::new(
        layout.scene_width + CHART_PANEL_MARGIN,
        CHART_PANEL_MARGIN,
        layout.window.x - CHART_PANEL_MARGIN,
        layout.window.y - CHART_PANEL_MARGIN,
    )
}

/// Map a sample into the panel, screen coordinates.
pub fn plot_point(p: Vec2, extent: Vec2, panel: Rect) -> Vec2 {
    let n = p / extent;
    Vec2::new(
        panel.min.x + n.x * panel.width(),
        panel.max.y - n.y * panel.height(),
    )
}

pub fn draw_chart(
    mut gizmos: Gizmos,
    chart: Res<Chart>,
    cfg: Res<SimConfig>,
    layout: Res<SceneLayout>,
) {
    if !cfg.chart_enabled || !layout.is_ready() {
        return;
    }
    let panel = panel_rect(&layout);
    if panel.width() <= 0.0 || panel.height() <= 0.0 {
        return;
    }

    let origin = layout.to_world(Vec2::new(panel.min.x, panel.max.y));
    let x_end = layout.to_world(Vec2::new(panel.max.x, panel.max.y));
    let y_end = layout.to_world(Vec2::new(panel.min.x, panel.min.y));
    gizmos.line_2d(origin, x_end, STROKE);
    gizmos.line_2d(origin, y_end, STROKE);

    let extent = chart.extent();
    let points = chart
        .points()
        .iter()
        .map(|p| layout.to_world(plot_point(*p, extent, panel)));
    gizmos.linestrip_2d(points, CHART_LINE);

    if let Some(last) = chart.points().last() {
        let at = layout.to_world(plot_point(*last, extent, panel));
        gizmos.circle_2d(Isometry2d::from_translation(at), 3.0, CHART_LINE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_two_keeps_every_other_tick() {
        let mut chart = Chart::default();
        let appended: Vec<bool> = (0..6).map(|i| chart.record(i as f32, 1.0, 2)).collect();
        assert_eq!(appended, [false, true, false, true, false, true]);
        assert_eq!(chart.points().len(), 3);
    }

    #[test]
    fn samples_are_scaled_to_cm() {
        let mut chart = Chart::default();
        chart.record(0.05, 0.0004, 1);
        let p = chart.points()[0];
        assert_eq!(p.x, 0.05);
        assert!((p.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn clear_drops_samples_but_keeps_stride_phase() {
        let mut chart = Chart::default();
        chart.record(0.0, 0.0, 2);
        chart.clear();
        assert!(chart.points().is_empty());
        assert!(chart.record(0.1, 0.1, 2));

        chart.reset_counter();
        assert!(!chart.record(0.2, 0.2, 2));
    }

    #[test]
    fn extent_tracks_maxima() {
        let mut chart = Chart::default();
        assert!(chart.extent().x > 0.0);
        chart.record(0.2, 0.0001, 1);
        chart.record(0.1, 0.0003, 1);
        let e = chart.extent();
        assert_eq!(e.x, 0.2);
        assert!((e.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn plot_corners() {
        let panel = Rect::new(100.0, 10.0, 300.0, 210.0);
        let extent = Vec2::new(2.0, 4.0);
        assert_eq!(plot_point(Vec2::ZERO, extent, panel), Vec2::new(100.0, 210.0));
        assert_eq!(plot_point(extent, extent, panel), Vec2::new(300.0, 10.0));
    }
}

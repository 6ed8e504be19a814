//! Pulley, strings and the two weights.
//!
//! Layout is computed in screen pixels (origin top-left, +Y down) so the
//! floor check reads naturally, then mapped into Bevy's centered, +Y-up
//! world space for drawing.

use bevy::math::Isometry2d;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use tracing::debug;

use crate::config::*;
use crate::physics::PhysicsState;
use crate::physics::state::FallBounds;

/// Resource: where the scene lives inside the window.
#[derive(Resource, Default, Copy, Clone, Debug, PartialEq)]
pub struct SceneLayout {
    /// Full window size.
    pub window: Vec2,
    /// Width reserved for the pulley (the chart takes the rest).
    pub scene_width: f32,
}

impl SceneLayout {
    pub fn new(window: Vec2, chart_enabled: bool) -> Self {
        let scene_width = if chart_enabled {
            window.x * (1.0 - CHART_PANEL_WIDTH_FRAC)
        } else {
            window.x
        };
        Self {
            window,
            scene_width,
        }
    }

    /// False until the primary window has reported a size.
    pub fn is_ready(&self) -> bool {
        self.window.y > 0.0
    }

    pub fn pulley_center(&self) -> Vec2 {
        Vec2::new(self.scene_width / 2.0, self.window.y / 4.0)
    }

    /// Top-left and size of each rectangle at a given drop offset.
    pub fn shapes(&self, offset_px: f32) -> SceneShapes {
        let c = self.pulley_center();
        let rest_y = c.y + STRING_REST_LENGTH;
        let left_x = c.x - PULLEY_RADIUS;
        let right_x = c.x + PULLEY_RADIUS;
        SceneShapes {
            rising: ScreenRect::centered_x(left_x, rest_y - offset_px, WEIGHT_SIZE),
            rider: ScreenRect::centered_x(right_x, rest_y + offset_px, RIDER_SIZE),
            falling: ScreenRect::centered_x(
                right_x,
                rest_y + RIDER_SIZE.y + offset_px,
                WEIGHT_SIZE,
            ),
        }
    }

    /// Screen pixels to Bevy world coordinates.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.window.x / 2.0, self.window.y / 2.0 - screen.y)
    }
}

impl FallBounds for SceneLayout {
    fn lower_bound(&self, offset_px: f32) -> f32 {
        self.shapes(offset_px).falling.bottom()
    }

    fn visible_height(&self) -> f32 {
        self.window.y
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenRect {
    pub top_left: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    fn centered_x(center_x: f32, top: f32, size: Vec2) -> Self {
        Self {
            top_left: Vec2::new(center_x - size.x / 2.0, top),
            size,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top_left.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.top_left + self.size / 2.0
    }

    /// Where the string attaches.
    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.top_left.x + self.size.x / 2.0, self.top_left.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneShapes {
    /// Counterweight on the left, rises by the offset.
    pub rising: ScreenRect,
    /// Plate riding on top of the falling weight.
    pub rider: ScreenRect,
    pub falling: ScreenRect,
}

/// Which filled rectangle an entity stands for.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq)]
pub enum WeightPart {
    Rising,
    Rider,
    Falling,
}

/// Keep `SceneLayout` up to date (resizes / DPI changes).
pub fn update_scene_layout(
    windows: Query<&Window, With<PrimaryWindow>>,
    cfg: Res<SimConfig>,
    mut layout: ResMut<SceneLayout>,
) {
    if let Ok(w) = windows.single() {
        let next = SceneLayout::new(w.size(), cfg.chart_enabled);
        if *layout != next {
            debug!(size = ?next.window, "scene layout changed");
            *layout = next;
        }
    }
}

/// Spawn the 2D camera and the filled weight rectangles.
pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2d);

    let weight_mesh = meshes.add(Rectangle::from_size(WEIGHT_SIZE));
    let rider_mesh = meshes.add(Rectangle::from_size(RIDER_SIZE));
    let weight_mat = materials.add(WEIGHT_FILL);
    let rider_mat = materials.add(RIDER_FILL);

    for (part, mesh, mat) in [
        (WeightPart::Rising, &weight_mesh, &weight_mat),
        (WeightPart::Rider, &rider_mesh, &rider_mat),
        (WeightPart::Falling, &weight_mesh, &weight_mat),
    ] {
        commands.spawn((
            Mesh2d(mesh.clone()),
            MeshMaterial2d(mat.clone()),
            Transform::default(),
            part,
        ));
    }
}

/// Write the current drop offset into the weight transforms.
pub fn sync_weights(
    state: Res<PhysicsState>,
    cfg: Res<SimConfig>,
    layout: Res<SceneLayout>,
    mut q_parts: Query<(&WeightPart, &mut Transform)>,
) {
    let shapes = layout.shapes(state.displacement_pixels(&cfg));
    for (part, mut tf) in &mut q_parts {
        let rect = match part {
            WeightPart::Rising => shapes.rising,
            WeightPart::Rider => shapes.rider,
            WeightPart::Falling => shapes.falling,
        };
        let world = layout.to_world(rect.center());
        tf.translation.x = world.x;
        tf.translation.y = world.y;
    }
}

/// Outlines, strings and the pulley wheel.
pub fn draw_scene(
    mut gizmos: Gizmos,
    state: Res<PhysicsState>,
    cfg: Res<SimConfig>,
    layout: Res<SceneLayout>,
) {
    if !layout.is_ready() {
        return;
    }
    let c = layout.pulley_center();
    let shapes = layout.shapes(state.displacement_pixels(&cfg));

    let center = layout.to_world(c);
    gizmos.circle_2d(Isometry2d::from_translation(center), PULLEY_RADIUS, STROKE);
    gizmos.line_2d(center, layout.to_world(c + Vec2::Y * PULLEY_RADIUS), STROKE);

    for (anchor_x, rect) in [
        (c.x - PULLEY_RADIUS, shapes.rising),
        (c.x + PULLEY_RADIUS, shapes.rider),
    ] {
        gizmos.line_2d(
            layout.to_world(Vec2::new(anchor_x, c.y)),
            layout.to_world(rect.top_center()),
            STROKE,
        );
    }

    for rect in [shapes.rising, shapes.rider, shapes.falling] {
        gizmos.rect_2d(
            Isometry2d::from_translation(layout.to_world(rect.center())),
            rect.size,
            STROKE,
        );
    }
}

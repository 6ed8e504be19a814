use bevy::prelude::*;
use tracing::debug;

use crate::chart::Chart;
use crate::config::SimConfig;
use crate::physics::state::{PhysicsState, Tick};
use crate::scene::SceneLayout;

/// Counts fixed physics ticks that actually advanced the state, for debug
/// logging once per render frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SubstepCounter(pub u32);

/// Reset substep counter each render frame (Update schedule runs once per frame).
pub fn reset_substep_counter(mut counter: ResMut<SubstepCounter>) {
    counter.0 = 0;
}

/// Native-only quit: press Esc or Q to exit the app.
/// (No-op on wasm32.)
pub fn exit_on_esc_or_q_if_native(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: MessageWriter<AppExit>,
) {
    if cfg!(not(target_arch = "wasm32")) && keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyQ])
    {
        exit.write(AppExit::Success);
    }
}

/// Fixed-timestep advance of the simulation, then feed the chart.
pub fn advance_simulation(
    time: Res<Time>, // fixed clock in FixedUpdate
    cfg: Res<SimConfig>,
    layout: Res<SceneLayout>,
    mut state: ResMut<PhysicsState>,
    mut chart: ResMut<Chart>,
    mut substeps: ResMut<SubstepCounter>,
) {
    // No window size yet: the floor would sit at y = 0.
    if !state.is_running() || !layout.is_ready() {
        return;
    }

    let dt = cfg.tick_delta(time.delta_secs());
    match state.tick(dt, &cfg, &*layout) {
        Tick::Advanced => {
            substeps.0 += 1;
            if cfg.chart_enabled {
                let h = state.displacement_meters(&cfg);
                chart.record(h, state.velocity_squared(), cfg.chart_stride);
            }
        }
        Tick::Terminated { .. } | Tick::Skipped => {}
    }
}

pub fn log_substeps(counter: Res<SubstepCounter>, state: Res<PhysicsState>) {
    if counter.0 > 0 {
        debug!(
            substeps = counter.0,
            t = state.elapsed(),
            v = state.velocity(),
            s = state.displacement(),
            "frame"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Variant;
    use crate::input::handle_sim_buttons;
    use crate::physics::state::Phase;

    fn app(cfg: SimConfig, window: Vec2) -> App {
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 120.0));

        let mut app = App::new();
        app.insert_resource(SceneLayout::new(window, cfg.chart_enabled))
            .insert_resource(cfg)
            .insert_resource(time)
            .init_resource::<PhysicsState>()
            .init_resource::<Chart>()
            .init_resource::<SubstepCounter>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, (handle_sim_buttons, advance_simulation).chain());
        app
    }

    /// Floor far below the weights.
    fn tall() -> Vec2 {
        Vec2::new(800.0, 100_000.0)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
        app.update();
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release(key);
        keys.clear();
    }

    fn points(app: &App) -> usize {
        app.world().resource::<Chart>().points().len()
    }

    fn phase(app: &App) -> Phase {
        app.world().resource::<PhysicsState>().phase()
    }

    #[test]
    fn chart_preset_samples_every_other_tick() {
        let mut app = app(SimConfig::preset(Variant::Chart), tall());
        press(&mut app, KeyCode::Space);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(phase(&app), Phase::Running);
        assert_eq!(points(&app), 3);
    }

    #[test]
    fn start_clears_and_reset_keeps_the_series() {
        let mut app = app(SimConfig::preset(Variant::Chart), tall());
        press(&mut app, KeyCode::Space);
        app.update();
        app.update();
        // three ticks, one sample, stride counter odd
        assert_eq!(points(&app), 1);

        press(&mut app, KeyCode::KeyR);
        assert_eq!(phase(&app), Phase::Idle);
        assert_eq!(points(&app), 1);

        // The restart clears, and the restarted counter skips the first tick.
        press(&mut app, KeyCode::Space);
        assert_eq!(points(&app), 0);
        app.update();
        assert_eq!(points(&app), 1);
    }

    #[test]
    fn stopping_freezes_the_series() {
        let mut app = app(SimConfig::preset(Variant::Chart), tall());
        press(&mut app, KeyCode::Space);
        app.update();
        press(&mut app, KeyCode::Space);
        assert_eq!(phase(&app), Phase::Idle);
        let n = points(&app);
        for _ in 0..4 {
            app.update();
        }
        assert_eq!(points(&app), n);
    }

    #[test]
    fn presets_without_a_chart_record_nothing() {
        for variant in [Variant::Pixels, Variant::Meters] {
            let mut app = app(SimConfig::preset(variant), tall());
            press(&mut app, KeyCode::Space);
            for _ in 0..10 {
                app.update();
            }
            assert!(app.world().resource::<PhysicsState>().elapsed() > 0.0);
            assert_eq!(points(&app), 0, "{variant:?}");
        }
    }

    #[test]
    fn resumed_run_keeps_its_plot_and_keeps_falling() {
        let cfg = SimConfig {
            resume_after_terminal: true,
            ..SimConfig::preset(Variant::Chart)
        };
        let mut app = app(cfg, Vec2::new(1280.0, 720.0));
        press(&mut app, KeyCode::Space);
        for _ in 0..10_000 {
            if phase(&app) == Phase::Terminated {
                break;
            }
            app.update();
        }
        assert_eq!(phase(&app), Phase::Terminated);
        let n = points(&app);
        assert!(n > 0);
        let stopped_at = app.world().resource::<PhysicsState>().displacement();

        press(&mut app, KeyCode::Space);
        for _ in 0..4 {
            app.update();
        }
        assert_eq!(phase(&app), Phase::Running);
        assert!(points(&app) > n);
        assert!(app.world().resource::<PhysicsState>().displacement() > stopped_at);
    }
}

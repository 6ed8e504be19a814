use bevy::prelude::*;

pub mod law;
pub mod state;
pub use state::PhysicsState;
pub mod systems;

use crate::chart::{Chart, draw_chart};
use crate::config::SimConfig;
use crate::hud::{spawn_readouts, update_readouts};
use crate::input::{MassInputs, handle_mass_fields, handle_sim_buttons};
use crate::scene::{SceneLayout, draw_scene, spawn_scene, sync_weights, update_scene_layout};
use systems::{
    SubstepCounter, advance_simulation, exit_on_esc_or_q_if_native, log_substeps,
    reset_substep_counter,
};

/// Plug this into your App with `.add_plugins(PhysicsPlugin)`.
///
/// Inserts a `SimConfig` from the environment unless one is already present.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SimConfig>() {
            app.insert_resource(SimConfig::from_env());
        }
        let state = PhysicsState::default();
        let inputs = {
            let cfg = app.world().resource::<SimConfig>();
            MassInputs::from_state(&state, cfg)
        };

        app.insert_resource(state)
            .insert_resource(inputs)
            .init_resource::<Chart>()
            .init_resource::<SceneLayout>()
            .init_resource::<SubstepCounter>()
            .add_systems(
                Startup,
                (spawn_scene, spawn_readouts, update_scene_layout),
            )
            // Buttons and mass fields run between frames, never inside a tick
            .add_systems(
                Update,
                (
                    update_scene_layout,
                    handle_sim_buttons,
                    handle_mass_fields,
                    exit_on_esc_or_q_if_native,
                ),
            )
            .add_systems(FixedUpdate, advance_simulation)
            .add_systems(
                Update,
                (
                    log_substeps,
                    reset_substep_counter,
                    sync_weights,
                    draw_scene,
                    draw_chart,
                    update_readouts,
                )
                    .chain()
                    .after(handle_mass_fields)
                    .after(handle_sim_buttons),
            );
    }
}

use bevy::prelude::*;

use atwood_sim::config::{BACKGROUND, PHYSICS_HZ};
use atwood_sim::physics::PhysicsPlugin;

fn main() {
    App::new()
        // White canvas behind the pulley
        .insert_resource(ClearColor(BACKGROUND))
        // Configure the fixed timestep clock (used in FixedUpdate)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
        // Bevy's core engine features; on the web, render into #canvas
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Atwood machine".into(),
                canvas: Some("#canvas".into()),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }))
        // Simulation, scene, chart and readouts
        .add_plugins(PhysicsPlugin)
        .run();
}

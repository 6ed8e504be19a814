//! Text readouts in the top-left corner.

use bevy::prelude::*;

use crate::config::{GravityEstimator, STROKE, SimConfig, TimeBase};
use crate::input::{MassField, MassInputs};
use crate::physics::PhysicsState;

/// Which value a text node shows.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Readout {
    Mass(MassField),
    Displacement,
    Time,
    Velocity,
    Gravity,
    Keys,
}

const ROWS: [Readout; 7] = [
    Readout::Mass(MassField::Mass1),
    Readout::Mass(MassField::Mass2),
    Readout::Displacement,
    Readout::Time,
    Readout::Velocity,
    Readout::Gravity,
    Readout::Keys,
];

const ROW_HEIGHT: f32 = 22.0;
const FONT_SIZE: f32 = 16.0;

pub fn spawn_readouts(mut commands: Commands) {
    for (i, readout) in ROWS.into_iter().enumerate() {
        commands.spawn((
            Text::new(""),
            TextFont {
                font_size: FONT_SIZE,
                ..default()
            },
            TextColor(STROKE),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0 + i as f32 * ROW_HEIGHT),
                left: Val::Px(12.0),
                ..default()
            },
            readout,
        ));
    }
}

fn time_unit(cfg: &SimConfig) -> &'static str {
    match cfg.time_base {
        TimeBase::Seconds => "s",
        TimeBase::FrameScale => "frames",
    }
}

fn velocity_unit(cfg: &SimConfig) -> &'static str {
    match cfg.time_base {
        TimeBase::Seconds => "m/s",
        TimeBase::FrameScale => "px/frame",
    }
}

fn gravity_formula(cfg: &SimConfig) -> &'static str {
    match cfg.estimator {
        GravityEstimator::Energy => "(2*M1 + M2) * u^2 / (2 * h * M2)",
        GravityEstimator::Timed => "(2*M1 + M2) * H^2 / (2 * h * M2 * t^2)",
    }
}

/// The text a readout shows for the current state.
pub fn format_readout(
    readout: Readout,
    state: &PhysicsState,
    cfg: &SimConfig,
    inputs: &MassInputs,
) -> String {
    let d = &cfg.decimals;
    match readout {
        Readout::Mass(field) => {
            let (mass, raw) = match field {
                MassField::Mass1 => (state.mass1(), &inputs.raw1),
                MassField::Mass2 => (state.mass2(), &inputs.raw2),
            };
            let cursor = if inputs.focus == Some(field) { "_" } else { "" };
            format!("{field} = {mass} g   [{raw}{cursor}]")
        }
        Readout::Displacement => {
            format!("s = {:.*} m", d.displacement, state.displacement_meters(cfg))
        }
        Readout::Time => format!("t = {:.*} {}", d.time, state.elapsed(), time_unit(cfg)),
        Readout::Velocity => {
            format!("u = {:.*} {}", d.velocity, state.velocity(), velocity_unit(cfg))
        }
        Readout::Gravity => match state.measured_gravity() {
            Some(g) => format!("g = {} = {:.*} m/s^2", gravity_formula(cfg), d.gravity, g),
            None => String::new(),
        },
        Readout::Keys => concat!(
            "[Space] start/stop  [R] reset  [Tab] select mass  ",
            "[0-9 .] type  [Backspace] delete  [Up/Down] nudge  [Enter] apply"
        )
        .into(),
    }
}

pub fn update_readouts(
    state: Res<PhysicsState>,
    cfg: Res<SimConfig>,
    inputs: Res<MassInputs>,
    mut q_text: Query<(&Readout, &mut Text)>,
) {
    if !state.is_changed() && !inputs.is_changed() && !cfg.is_changed() {
        return;
    }
    for (readout, mut text) in &mut q_text {
        let next = format_readout(*readout, &state, &cfg, &inputs);
        if text.0 != next {
            text.0 = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Decimals, Variant};
    use crate::physics::state::{FallBounds, Tick};

    struct Wall;

    impl FallBounds for Wall {
        fn lower_bound(&self, offset_px: f32) -> f32 {
            offset_px
        }
        fn visible_height(&self) -> f32 {
            50.0
        }
    }

    fn setup(variant: Variant) -> (PhysicsState, SimConfig, MassInputs) {
        let cfg = SimConfig::preset(variant);
        let state = PhysicsState::default();
        let inputs = MassInputs::from_state(&state, &cfg);
        (state, cfg, inputs)
    }

    #[test]
    fn readouts_use_configured_decimals() {
        let (state, mut cfg, inputs) = setup(Variant::Meters);
        cfg.decimals = Decimals {
            displacement: 3,
            time: 1,
            velocity: 5,
            gravity: 2,
        };
        assert_eq!(
            format_readout(Readout::Displacement, &state, &cfg, &inputs),
            "s = 0.000 m"
        );
        assert_eq!(
            format_readout(Readout::Time, &state, &cfg, &inputs),
            "t = 0.0 s"
        );
        assert_eq!(
            format_readout(Readout::Velocity, &state, &cfg, &inputs),
            "u = 0.00000 m/s"
        );
    }

    #[test]
    fn gravity_readout_appears_only_after_termination() {
        let (mut state, cfg, inputs) = setup(Variant::Meters);
        assert!(format_readout(Readout::Gravity, &state, &cfg, &inputs).is_empty());

        state.toggle(&cfg);
        let mut terminated = false;
        for _ in 0..100_000 {
            if let Tick::Terminated { .. } = state.tick(1.0 / 120.0, &cfg, &Wall) {
                terminated = true;
                break;
            }
        }
        assert!(terminated);
        let text = format_readout(Readout::Gravity, &state, &cfg, &inputs);
        assert!(text.starts_with("g = "), "{text}");
        assert!(text.ends_with("m/s^2"), "{text}");
    }

    #[test]
    fn key_help_lists_every_field_key() {
        let (state, cfg, inputs) = setup(Variant::Chart);
        let help = format_readout(Readout::Keys, &state, &cfg, &inputs);
        for key in ["[Space]", "[R]", "[Tab]", "[Backspace]", "[Up/Down]", "[Enter]"] {
            assert!(help.contains(key), "missing {key}: {help}");
        }
    }

    #[test]
    fn focused_mass_field_shows_cursor() {
        let (state, cfg, mut inputs) = setup(Variant::Chart);
        inputs.cycle_focus();
        assert_eq!(
            format_readout(Readout::Mass(MassField::Mass1), &state, &cfg, &inputs),
            "M1 = 0.1 g   [10_]"
        );
        assert_eq!(
            format_readout(Readout::Mass(MassField::Mass2), &state, &cfg, &inputs),
            "M2 = 0.001 g   [10]"
        );
    }
}

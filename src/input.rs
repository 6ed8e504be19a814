//! Keyboard front panel: the two mass fields and the start/reset buttons.
//!
//! `Tab` cycles focus between the mass fields, digits and `.` edit the
//! focused field, `Enter` commits it, `Up`/`Down` nudge and commit.
//! `Space` toggles start/stop and `R` resets.

use std::fmt;

use bevy::prelude::*;
use tracing::{info, warn};

use crate::chart::Chart;
use crate::config::{RAW_INPUT_STEP, SimConfig};
use crate::physics::PhysicsState;
use crate::physics::state::Phase;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassField {
    /// Counterweight on each side.
    Mass1,
    /// Rider on the falling side.
    Mass2,
}

impl fmt::Display for MassField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mass1 => f.write_str("M1"),
            Self::Mass2 => f.write_str("M2"),
        }
    }
}

/// Why a mass field could not be committed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MassInputError {
    #[error("{field} is empty")]
    Empty { field: MassField },

    #[error("{field}: `{raw}` is not a number")]
    NotANumber { field: MassField, raw: String },

    #[error("{field} must be finite")]
    NotFinite { field: MassField },

    #[error("{field} must be {bound}, got {value}")]
    OutOfRange {
        field: MassField,
        value: f32,
        bound: &'static str,
    },
}

/// Parse raw field text and divide by the variant's scale.
///
/// `M1` must be positive (the acceleration law is undefined at zero), `M2`
/// may be zero.
pub fn parse_mass(field: MassField, raw: &str, scale: f32) -> Result<f32, MassInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MassInputError::Empty { field });
    }
    let value: f32 = raw.parse().map_err(|_| MassInputError::NotANumber {
        field,
        raw: raw.to_owned(),
    })?;
    let mass = value / scale;
    if !mass.is_finite() {
        return Err(MassInputError::NotFinite { field });
    }
    match field {
        MassField::Mass1 if mass <= 0.0 => Err(MassInputError::OutOfRange {
            field,
            value: mass,
            bound: "positive",
        }),
        MassField::Mass2 if mass < 0.0 => Err(MassInputError::OutOfRange {
            field,
            value: mass,
            bound: "non-negative",
        }),
        _ => Ok(mass),
    }
}

/// Parse `raw` and, if valid, store it in `state` (which recomputes the
/// acceleration). On error the previous mass stays.
pub fn apply_mass(
    field: MassField,
    raw: &str,
    cfg: &SimConfig,
    state: &mut PhysicsState,
) -> Result<f32, MassInputError> {
    let mass = match field {
        MassField::Mass1 => parse_mass(field, raw, cfg.mass_scale1)?,
        MassField::Mass2 => parse_mass(field, raw, cfg.mass_scale2)?,
    };
    match field {
        MassField::Mass1 => state.set_mass1(mass),
        MassField::Mass2 => state.set_mass2(mass),
    }
    Ok(mass)
}

/// Text of the two mass fields and which one has focus.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct MassInputs {
    pub raw1: String,
    pub raw2: String,
    pub focus: Option<MassField>,
}

impl MassInputs {
    /// Fields pre-filled with the raw values that reproduce `state`'s masses.
    pub fn from_state(state: &PhysicsState, cfg: &SimConfig) -> Self {
        Self {
            raw1: format_raw(state.mass1() * cfg.mass_scale1),
            raw2: format_raw(state.mass2() * cfg.mass_scale2),
            focus: None,
        }
    }

    pub fn raw(&self, field: MassField) -> &str {
        match field {
            MassField::Mass1 => &self.raw1,
            MassField::Mass2 => &self.raw2,
        }
    }

    pub fn raw_mut(&mut self, field: MassField) -> &mut String {
        match field {
            MassField::Mass1 => &mut self.raw1,
            MassField::Mass2 => &mut self.raw2,
        }
    }

    /// None -> M1 -> M2 -> None
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            None => Some(MassField::Mass1),
            Some(MassField::Mass1) => Some(MassField::Mass2),
            Some(MassField::Mass2) => None,
        };
    }

    /// Add `delta` to a field's raw value. Unparseable text is left alone.
    pub fn nudge(&mut self, field: MassField, delta: f32) -> bool {
        let Ok(v) = self.raw(field).trim().parse::<f32>() else {
            return false;
        };
        *self.raw_mut(field) = format_raw((v + delta).max(0.0));
        true
    }
}

/// Up to four decimals, trailing zeros dropped.
pub fn format_raw(v: f32) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_owned()
    } else {
        s.to_owned()
    }
}

fn key_char(key: KeyCode) -> Option<char> {
    Some(match key {
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        KeyCode::Period | KeyCode::NumpadDecimal => '.',
        _ => return None,
    })
}

/// Start/stop and reset buttons.
pub fn handle_sim_buttons(
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<SimConfig>,
    mut state: ResMut<PhysicsState>,
    mut chart: ResMut<Chart>,
) {
    if keys.just_pressed(KeyCode::Space) {
        // Resuming a terminated run continues its plot.
        let was_idle = state.phase() == Phase::Idle;
        let phase = state.toggle(&cfg);
        if was_idle && phase == Phase::Running && cfg.clear_chart_on_start {
            chart.clear();
        }
    }
    if keys.just_pressed(KeyCode::KeyR) {
        state.reset();
        chart.reset_counter();
    }
}

/// Edit and commit the mass fields.
pub fn handle_mass_fields(
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<SimConfig>,
    mut inputs: ResMut<MassInputs>,
    mut state: ResMut<PhysicsState>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        inputs.cycle_focus();
    }
    let Some(field) = inputs.focus else {
        return;
    };

    for key in keys.get_just_pressed() {
        if let Some(c) = key_char(*key) {
            inputs.raw_mut(field).push(c);
        }
    }
    if keys.just_pressed(KeyCode::Backspace) {
        inputs.raw_mut(field).pop();
    }

    let mut commit = keys.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]);
    if keys.just_pressed(KeyCode::ArrowUp) {
        commit |= inputs.nudge(field, RAW_INPUT_STEP);
    }
    if keys.just_pressed(KeyCode::ArrowDown) {
        commit |= inputs.nudge(field, -RAW_INPUT_STEP);
    }
    if !commit {
        return;
    }

    match apply_mass(field, inputs.raw(field), &cfg, &mut state) {
        Ok(mass) => info!(%field, mass, a = state.acceleration(), "mass updated"),
        Err(err) => warn!(%err, "mass input rejected"),
    }
}

use bevy::prelude::*;
use tracing::{debug, info, warn};

use super::law::{acceleration, gravity_from_energy, gravity_from_timing, to_meters, to_pixels};
use crate::config::{
    DisplacementUnit, GravityEstimator, IntegrationMode, MASS1_DEFAULT, MASS2_DEFAULT, SimConfig,
    TimeBase,
};

/// Geometry query the terminal check runs against.
///
/// Coordinates are screen pixels with the origin at the top of the visible
/// area and +Y pointing down.
pub trait FallBounds {
    /// Lowest edge of the falling shape when it has dropped `offset_px`.
    fn lower_bound(&self, offset_px: f32) -> f32;
    fn visible_height(&self) -> f32;

    fn reached_floor(&self, offset_px: f32) -> bool {
        self.lower_bound(offset_px) > self.visible_height()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    /// Stopped by the floor; the gravity estimate is available.
    Terminated,
}

/// What a call to [`PhysicsState::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// Not running, nothing changed.
    Skipped,
    Advanced,
    /// The floor was reached before this tick. `gravity` is `None` when the
    /// run was too short to invert (zero height or time).
    Terminated { gravity: Option<f32> },
}

/// The whole simulation: masses, cached acceleration and the kinematics of
/// the falling rider. Mass fields are private so the cached acceleration
/// can never go stale.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct PhysicsState {
    mass1: f32,
    mass2: f32,
    acceleration: f32,
    velocity: f32,
    /// In the configured `DisplacementUnit`.
    displacement: f32,
    elapsed: f32,
    phase: Phase,
    measured_gravity: Option<f32>,
    /// Set when a terminated run is resumed; the floor already fired for
    /// this run, so the check stays off until reset.
    past_floor: bool,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self::new(MASS1_DEFAULT, MASS2_DEFAULT)
    }
}

impl PhysicsState {
    pub fn new(mass1: f32, mass2: f32) -> Self {
        Self {
            mass1,
            mass2,
            acceleration: acceleration(mass1, mass2),
            velocity: 0.0,
            displacement: 0.0,
            elapsed: 0.0,
            phase: Phase::Idle,
            measured_gravity: None,
            past_floor: false,
        }
    }

    // --------------------- Accessors ---------------------

    pub fn mass1(&self) -> f32 {
        self.mass1
    }

    pub fn mass2(&self) -> f32 {
        self.mass2
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn velocity_squared(&self) -> f32 {
        self.velocity * self.velocity
    }

    /// Displacement in the configured unit.
    pub fn displacement(&self) -> f32 {
        self.displacement
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn measured_gravity(&self) -> Option<f32> {
        self.measured_gravity
    }

    pub fn displacement_meters(&self, cfg: &SimConfig) -> f32 {
        match cfg.displacement_unit {
            DisplacementUnit::Pixels => to_meters(self.displacement),
            DisplacementUnit::Meters => self.displacement,
        }
    }

    pub fn displacement_pixels(&self, cfg: &SimConfig) -> f32 {
        match cfg.displacement_unit {
            DisplacementUnit::Pixels => self.displacement,
            DisplacementUnit::Meters => to_pixels(self.displacement),
        }
    }

    // --------------------- Inputs ---------------------

    pub fn set_mass1(&mut self, mass1: f32) {
        self.mass1 = mass1;
        self.recompute_acceleration();
    }

    pub fn set_mass2(&mut self, mass2: f32) {
        self.mass2 = mass2;
        self.recompute_acceleration();
    }

    fn recompute_acceleration(&mut self) {
        self.acceleration = acceleration(self.mass1, self.mass2);
        debug!(
            m1 = self.mass1,
            m2 = self.mass2,
            a = self.acceleration,
            "acceleration recomputed"
        );
    }

    /// Start/stop button. A terminated run only resumes when the config
    /// allows it; otherwise it waits for [`reset`](Self::reset). A resumed
    /// run keeps falling below the floor and never terminates again.
    pub fn toggle(&mut self, cfg: &SimConfig) -> Phase {
        self.phase = match self.phase {
            Phase::Idle => Phase::Running,
            Phase::Running => Phase::Idle,
            Phase::Terminated if cfg.resume_after_terminal => {
                self.past_floor = true;
                Phase::Running
            }
            Phase::Terminated => {
                warn!("run already terminated; reset before starting again");
                Phase::Terminated
            }
        };
        info!(phase = ?self.phase, "start/stop toggled");
        self.phase
    }

    /// Back to rest at the top, idle, with the acceleration rebuilt from the
    /// current masses.
    pub fn reset(&mut self) {
        self.velocity = 0.0;
        self.displacement = 0.0;
        self.elapsed = 0.0;
        self.phase = Phase::Idle;
        self.measured_gravity = None;
        self.past_floor = false;
        self.recompute_acceleration();
        info!("simulation reset");
    }

    // --------------------- Integration ---------------------

    /// Advance by one frame delta `dt` (in the config's time base).
    ///
    /// The floor check uses the geometry left by the previous tick; when it
    /// fires nothing else is mutated this tick.
    pub fn tick(&mut self, dt: f32, cfg: &SimConfig, bounds: &impl FallBounds) -> Tick {
        if !self.is_running() {
            return Tick::Skipped;
        }

        if !self.past_floor && bounds.reached_floor(self.displacement_pixels(cfg)) {
            return self.terminate(cfg);
        }

        self.elapsed += dt;
        let a = self.acceleration;
        match cfg.integration {
            IntegrationMode::Incremental => {
                self.velocity += a * dt;
                self.displacement += law_to_unit(self.velocity * dt, cfg);
            }
            IntegrationMode::ClosedForm => {
                self.velocity = a * self.elapsed;
                self.displacement = law_to_unit(0.5 * a * self.elapsed * self.elapsed, cfg);
            }
        }
        Tick::Advanced
    }

    fn terminate(&mut self, cfg: &SimConfig) -> Tick {
        self.phase = Phase::Terminated;
        if self.measured_gravity.is_none() {
            self.measured_gravity = self.estimate_gravity(cfg);
        }
        info!(
            h = self.displacement_meters(cfg),
            v = self.velocity,
            t = self.elapsed,
            g = ?self.measured_gravity,
            "floor reached"
        );
        Tick::Terminated {
            gravity: self.measured_gravity,
        }
    }

    fn estimate_gravity(&self, cfg: &SimConfig) -> Option<f32> {
        let h = unit_to_law(self.displacement, cfg);
        let (v, t) = (self.velocity, self.elapsed);
        if h <= 0.0 || t <= 0.0 || self.mass2 <= 0.0 {
            return None;
        }
        let g = match cfg.estimator {
            GravityEstimator::Energy => gravity_from_energy(self.mass1, self.mass2, h, v),
            GravityEstimator::Timed => gravity_from_timing(self.mass1, self.mass2, h, v * t, t),
        };
        g.is_finite().then_some(g)
    }
}

/// The kinematic law works in meters when time is in seconds; with a
/// frame-scale time base its output is taken as raw pixels.
fn law_to_unit(value: f32, cfg: &SimConfig) -> f32 {
    match (cfg.displacement_unit, cfg.time_base) {
        (DisplacementUnit::Pixels, TimeBase::Seconds) => to_pixels(value),
        _ => value,
    }
}

fn unit_to_law(value: f32, cfg: &SimConfig) -> f32 {
    match (cfg.displacement_unit, cfg.time_base) {
        (DisplacementUnit::Pixels, TimeBase::Seconds) => to_meters(value),
        _ => value,
    }
}

use bevy::prelude::*;

/// Physics timing
pub const PHYSICS_HZ: f64 = 120.0;
/// Frames per second that a frame-scale delta of 1.0 stands for.
pub const FRAME_SCALE_HZ: f32 = 60.0;

/// Standard gravity (m/s^2)
pub const GRAVITY: f32 = 9.81;

/// Default masses (already scaled, "g" in the readouts)
pub const MASS1_DEFAULT: f32 = 0.1;
pub const MASS2_DEFAULT: f32 = 0.001;

/// Pixel <-> meter conversion pair. The two factors are not exact inverses
/// of each other, they are the values the readouts are calibrated against.
pub const METERS_PER_PIXEL: f32 = 0.000_264_583_3;
pub const PIXELS_PER_METER: f32 = 3_779.527_6;

/// Scene geometry, in screen pixels (origin top-left, +Y down)
pub const PULLEY_RADIUS: f32 = 80.0;
pub const STRING_REST_LENGTH: f32 = 240.0;
pub const WEIGHT_SIZE: Vec2 = Vec2::new(60.0, 80.0);
pub const RIDER_SIZE: Vec2 = Vec2::new(100.0, 10.0);

/// Chart panel placement (fraction of the window, right-hand side)
pub const CHART_PANEL_WIDTH_FRAC: f32 = 0.35;
pub const CHART_PANEL_MARGIN: f32 = 40.0;

pub const BACKGROUND: Color = Color::WHITE;
pub const STROKE: Color = Color::BLACK;
pub const WEIGHT_FILL: Color = Color::srgba(0.0, 0.0, 0.0, 0.2);
pub const RIDER_FILL: Color = Color::srgba(0.82, 0.19, 0.29, 0.6);
pub const CHART_LINE: Color = Color::srgb(0.39, 0.42, 1.0);

/// Step applied to the raw mass inputs by the arrow keys.
pub const RAW_INPUT_STEP: f32 = 1.0;

/// How velocity and displacement are advanced each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum IntegrationMode {
    /// Per-tick Euler accumulation. First-order: the displacement drifts
    /// from `a t^2 / 2` and disagrees with the terminal gravity estimate.
    Incremental,
    /// `v = a t`, `s = a t^2 / 2`.
    #[default]
    ClosedForm,
}

/// Unit the displacement is accumulated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum DisplacementUnit {
    #[default]
    Pixels,
    Meters,
}

/// What a tick's delta is measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum TimeBase {
    /// Frame time converted to seconds.
    #[default]
    Seconds,
    /// Normalized frame scale: 1.0 == one frame at `FRAME_SCALE_HZ`.
    FrameScale,
}

/// Inversion used to back-compute g when the run terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum GravityEstimator {
    /// From final speed and height: `(2 m1 + m2) v^2 / (2 m2 h)`.
    #[default]
    Energy,
    /// From height, time and the uniform-speed distance `H = v t`.
    Timed,
}

/// Decimal places used by each readout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
pub struct Decimals {
    pub displacement: usize,
    pub time: usize,
    pub velocity: usize,
    pub gravity: usize,
}

impl Default for Decimals {
    fn default() -> Self {
        Self {
            displacement: 4,
            time: 2,
            velocity: 4,
            gravity: 2,
        }
    }
}

/// The three shipped flavours of the demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Variant {
    /// Pixel displacement, v^2/h chart, start clears the chart.
    #[default]
    Chart,
    /// Pixel displacement, frame-scale time, no chart.
    Pixels,
    /// Meter displacement, no chart.
    Meters,
}

impl Variant {
    /// Parse the `ATWOOD_VARIANT` value. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chart" => Some(Self::Chart),
            "pixels" | "px" => Some(Self::Pixels),
            "meters" | "m" => Some(Self::Meters),
            _ => None,
        }
    }
}

/// Run-time simulation settings.
#[derive(Resource, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct SimConfig {
    pub integration: IntegrationMode,
    pub displacement_unit: DisplacementUnit,
    pub time_base: TimeBase,
    /// Raw mass-1 input is divided by this.
    pub mass_scale1: f32,
    /// Raw mass-2 input is divided by this.
    pub mass_scale2: f32,
    pub chart_enabled: bool,
    /// Append one chart point every `chart_stride` running ticks.
    pub chart_stride: u32,
    pub clear_chart_on_start: bool,
    pub estimator: GravityEstimator,
    pub decimals: Decimals,
    /// Allow the start toggle to resume a terminated run without a reset.
    pub resume_after_terminal: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::preset(Variant::default())
    }
}

impl SimConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Chart => Self {
                integration: IntegrationMode::ClosedForm,
                displacement_unit: DisplacementUnit::Pixels,
                time_base: TimeBase::Seconds,
                mass_scale1: 100.0,
                mass_scale2: 10_000.0,
                chart_enabled: true,
                chart_stride: 2,
                clear_chart_on_start: true,
                estimator: GravityEstimator::Energy,
                decimals: Decimals::default(),
                resume_after_terminal: false,
            },
            Variant::Pixels => Self {
                integration: IntegrationMode::ClosedForm,
                displacement_unit: DisplacementUnit::Pixels,
                time_base: TimeBase::FrameScale,
                mass_scale1: 10.0,
                mass_scale2: 100.0,
                chart_enabled: false,
                chart_stride: 1,
                clear_chart_on_start: false,
                estimator: GravityEstimator::Timed,
                decimals: Decimals {
                    displacement: 2,
                    time: 2,
                    velocity: 2,
                    gravity: 2,
                },
                resume_after_terminal: false,
            },
            Variant::Meters => Self {
                integration: IntegrationMode::ClosedForm,
                displacement_unit: DisplacementUnit::Meters,
                time_base: TimeBase::Seconds,
                mass_scale1: 100.0,
                mass_scale2: 10_000.0,
                chart_enabled: false,
                chart_stride: 1,
                clear_chart_on_start: false,
                estimator: GravityEstimator::Timed,
                decimals: Decimals {
                    displacement: 5,
                    time: 3,
                    velocity: 5,
                    gravity: 3,
                },
                resume_after_terminal: false,
            },
        }
    }

    /// Convert a frame delta in seconds into this config's time base.
    pub fn tick_delta(&self, delta_secs: f32) -> f32 {
        match self.time_base {
            TimeBase::Seconds => delta_secs,
            TimeBase::FrameScale => delta_secs * FRAME_SCALE_HZ,
        }
    }

    /// Resolve the config from the environment: `ATWOOD_CONFIG` (JSON, with
    /// the `config-file` feature) wins over `ATWOOD_VARIANT`.
    pub fn from_env() -> Self {
        #[cfg(feature = "config-file")]
        if let Ok(path) = std::env::var("ATWOOD_CONFIG") {
            match load_json(&path) {
                Ok(cfg) => {
                    tracing::info!(%path, "loaded simulation config");
                    return cfg;
                }
                Err(err) => tracing::warn!(%path, %err, "ignoring config file"),
            }
        }

        let variant = match std::env::var("ATWOOD_VARIANT") {
            Ok(name) => Variant::from_name(&name).unwrap_or_else(|| {
                tracing::warn!(%name, "unknown ATWOOD_VARIANT, using default");
                Variant::default()
            }),
            Err(_) => Variant::default(),
        };
        tracing::info!(?variant, "simulation variant");
        Self::preset(variant)
    }
}

/// Errors from reading a JSON config file.
#[cfg(feature = "config-file")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(feature = "config-file")]
fn load_json(path: &str) -> Result<SimConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_parse_case_insensitively() {
        assert_eq!(Variant::from_name("Chart"), Some(Variant::Chart));
        assert_eq!(Variant::from_name(" px "), Some(Variant::Pixels));
        assert_eq!(Variant::from_name("METERS"), Some(Variant::Meters));
        assert_eq!(Variant::from_name("feet"), None);
    }

    #[test]
    fn only_the_chart_preset_plots() {
        assert!(SimConfig::preset(Variant::Chart).chart_enabled);
        assert!(!SimConfig::preset(Variant::Pixels).chart_enabled);
        assert!(!SimConfig::preset(Variant::Meters).chart_enabled);
    }

    #[test]
    fn frame_scale_delta_is_one_per_nominal_frame() {
        let cfg = SimConfig::preset(Variant::Pixels);
        let d = cfg.tick_delta(1.0 / FRAME_SCALE_HZ);
        assert!((d - 1.0).abs() < 1e-6);

        let cfg = SimConfig::preset(Variant::Meters);
        assert_eq!(cfg.tick_delta(0.25), 0.25);
    }
}

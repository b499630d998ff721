use std::time::Duration;

/// Table geometry. The bed is centered on the origin in the x/z plane.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Extent along x
    pub width: f64,
    /// Extent along z
    pub height: f64,
    /// Height of ball centers above the floor
    pub bed_height: f64,
    pub pocket_radius: f64,
    pub ball_radius: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 2.8,
            height: 1.4,
            bed_height: 0.55,
            pocket_radius: 0.1,
            ball_radius: 0.05,
        }
    }
}

impl TableConfig {
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Pocket centers (x, z): four corners, then the two side pockets.
    pub fn pockets(&self) -> [(f64, f64); 6] {
        let hw = self.half_width();
        let hh = self.half_height();
        [
            (hw, hh),
            (-hw, hh),
            (hw, -hh),
            (-hw, -hh),
            (0.0, -hh),
            (0.0, hh),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err("width must be finite and > 0".to_string());
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err("height must be finite and > 0".to_string());
        }
        if !self.bed_height.is_finite() {
            return Err("bed_height must be finite".to_string());
        }
        if !self.pocket_radius.is_finite() || self.pocket_radius < 0.0 {
            return Err("pocket_radius must be finite and >= 0".to_string());
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err("ball_radius must be finite and > 0".to_string());
        }
        if self.ball_radius * 2.0 >= self.height.min(self.width) {
            return Err("ball_radius must fit on the table".to_string());
        }
        Ok(())
    }
}

/// Motion and collision constants. Velocities are per-tick displacements,
/// so changing `tick_rate_hz` changes how fast the table plays in wall time.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Speed lost per tick (linear drag)
    pub drag: f64,
    pub restitution: f64,
    /// Speeds at or below this count as stopped
    pub rest_speed: f64,
    pub tick_rate_hz: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            drag: 0.0000625,
            restitution: 1.0,
            rest_speed: 1e-6,
            tick_rate_hz: 60,
        }
    }
}

impl PhysicsConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.drag.is_finite() || self.drag < 0.0 {
            return Err("drag must be finite and >= 0".to_string());
        }
        if !self.restitution.is_finite() || !(0.0..=1.0).contains(&self.restitution) {
            return Err("restitution must be within [0, 1]".to_string());
        }
        if !self.rest_speed.is_finite() || self.rest_speed < 0.0 {
            return Err("rest_speed must be finite and >= 0".to_string());
        }
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        Ok(())
    }
}

/// Hold-to-charge shot tuning
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ShotConfig {
    /// Strength gained per tick while charging
    pub charge_step: f64,
    /// Maximum strength (per-tick cue ball displacement)
    pub charge_limit: f64,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            charge_step: 0.00025,
            charge_limit: 0.1,
        }
    }
}

impl ShotConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.charge_step.is_finite() || self.charge_step <= 0.0 {
            return Err("charge_step must be finite and > 0".to_string());
        }
        if !self.charge_limit.is_finite() || self.charge_limit < self.charge_step {
            return Err("charge_limit must be finite and >= charge_step".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SimConfig {
    pub table: TableConfig,
    pub physics: PhysicsConfig,
    pub shot: ShotConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.table.validate()?;
        self.physics.validate()?;
        self.shot.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sim_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn default_pockets_sit_on_corners_and_sides() {
        let pockets = TableConfig::default().pockets();
        assert!(pockets.contains(&(1.4, 0.7)));
        assert!(pockets.contains(&(-1.4, -0.7)));
        assert!(pockets.contains(&(0.0, 0.7)));
        assert!(pockets.contains(&(0.0, -0.7)));
    }

    #[test]
    fn zero_ball_radius_invalid() {
        let mut config = SimConfig::default();
        config.table.ball_radius = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_ball_invalid() {
        let mut config = TableConfig::default();
        config.ball_radius = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_drag_invalid() {
        let mut config = PhysicsConfig::default();
        config.drag = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn restitution_above_one_invalid() {
        let mut config = PhysicsConfig::default();
        config.restitution = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tick_rate_invalid() {
        let mut config = SimConfig::default();
        config.physics.tick_rate_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn charge_limit_below_step_invalid() {
        let mut config = ShotConfig::default();
        config.charge_limit = config.charge_step / 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tick_duration_matches_rate() {
        let config = PhysicsConfig {
            tick_rate_hz: 50,
            ..Default::default()
        };
        assert_eq!(config.tick_duration(), Duration::from_millis(20));
    }

    #[test]
    fn config_serializes_camel_case() {
        let json = serde_json::to_string(&SimConfig::default()).unwrap();
        assert!(json.contains("\"pocketRadius\":0.1"));
        assert!(json.contains("\"tickRateHz\":60"));
        assert!(json.contains("\"chargeLimit\":0.1"));
    }
}

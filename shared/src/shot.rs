use crate::ball::Ball;
use crate::config::ShotConfig;
use crate::vec3::{distance, horizontal, project_point_onto_line, scale, try_normalize, Vec3};

/// Where the player is looking when the trigger is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl AimRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// True if the ray's line passes closer than the ball's radius to its center.
    pub fn hits(&self, ball: &Ball) -> bool {
        match project_point_onto_line(ball.position, self.origin, self.direction) {
            Some(closest) => distance(ball.position, closest) < ball.radius,
            None => false,
        }
    }

    /// Unit direction of travel on the table, or `None` when aiming straight up or down.
    pub fn table_direction(&self) -> Option<Vec3> {
        try_normalize(horizontal(self.direction))
    }
}

/// Charge state of the hold-to-shoot trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShotCharge {
    pub strength: f64,
    pub trigger_held: bool,
}

/// Advance the charge by one tick. Strength only builds while the trigger is
/// held and the table is still; anything else drops it back to zero.
pub fn step_charge(mut state: ShotCharge, config: &ShotConfig, at_rest: bool) -> ShotCharge {
    if state.trigger_held && at_rest {
        state.strength = (state.strength + config.charge_step).min(config.charge_limit);
    } else {
        state.strength = 0.0;
    }
    state
}

/// Release the trigger. Returns the cue ball velocity when the aim is on the
/// cue ball and there is charge to spend.
pub fn release(mut state: ShotCharge, aim: &AimRay, cue: &Ball) -> (ShotCharge, Option<Vec3>) {
    let strength = state.strength;
    state.trigger_held = false;
    state.strength = 0.0;

    if !cue.active || strength <= 0.0 || !aim.hits(cue) {
        return (state, None);
    }

    let velocity = aim.table_direction().map(|dir| scale(dir, strength));
    (state, velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::WHITE;
    use crate::vec3::{length, vec3};

    fn config() -> ShotConfig {
        ShotConfig::default()
    }

    fn cue() -> Ball {
        Ball::new(0.05, WHITE, vec3(0.85, 0.55, 0.0))
    }

    fn held() -> ShotCharge {
        ShotCharge {
            strength: 0.0,
            trigger_held: true,
        }
    }

    fn charged(ticks: usize) -> ShotCharge {
        let mut state = held();
        for _ in 0..ticks {
            state = step_charge(state, &config(), true);
        }
        state
    }

    /// Camera above and behind the cue ball, looking down at it along -x.
    fn aim_at_cue() -> AimRay {
        AimRay::new(vec3(1.85, 1.3, 0.0), vec3(-1.0, -0.75, 0.0))
    }

    #[test]
    fn does_not_charge_when_not_held() {
        let state = step_charge(ShotCharge::default(), &config(), true);
        assert_eq!(state.strength, 0.0);
    }

    #[test]
    fn charges_while_held_and_still() {
        let state = charged(10);
        assert!((state.strength - 10.0 * config().charge_step).abs() < 1e-12);
    }

    #[test]
    fn charge_caps_at_limit() {
        let state = charged(1_000);
        assert_eq!(state.strength, config().charge_limit);
    }

    #[test]
    fn motion_resets_charge() {
        let state = charged(50);
        assert!(state.strength > 0.0);
        let state = step_charge(state, &config(), false);
        assert_eq!(state.strength, 0.0);
        assert!(state.trigger_held);
    }

    #[test]
    fn aim_through_cue_ball_hits() {
        assert!(aim_at_cue().hits(&cue()));
    }

    #[test]
    fn aim_beside_cue_ball_misses() {
        let aim = AimRay::new(vec3(1.85, 0.55, 0.2), vec3(-1.0, 0.0, 0.0));
        assert!(!aim.hits(&cue()));
    }

    #[test]
    fn zero_direction_never_hits() {
        let aim = AimRay::new(vec3(0.85, 0.55, 0.0), Vec3::ZERO);
        assert!(!aim.hits(&cue()));
    }

    #[test]
    fn release_on_target_fires_flat_at_full_strength() {
        let state = charged(40);
        let expected = state.strength;
        let (after, shot) = release(state, &aim_at_cue(), &cue());
        let velocity = shot.expect("aimed shot should fire");
        assert_eq!(velocity.y, 0.0);
        assert!(velocity.x < 0.0);
        assert!(velocity.z.abs() < 1e-12);
        assert!((length(velocity) - expected).abs() < 1e-12);
        assert_eq!(after, ShotCharge::default());
    }

    #[test]
    fn release_off_target_fires_nothing() {
        let aim = AimRay::new(vec3(1.85, 1.3, 1.0), vec3(-1.0, -0.75, 0.0));
        let (after, shot) = release(charged(40), &aim, &cue());
        assert!(shot.is_none());
        assert_eq!(after.strength, 0.0);
        assert!(!after.trigger_held);
    }

    #[test]
    fn release_without_charge_fires_nothing() {
        let (_, shot) = release(held(), &aim_at_cue(), &cue());
        assert!(shot.is_none());
    }

    #[test]
    fn release_looking_straight_down_fires_nothing() {
        let aim = AimRay::new(vec3(0.85, 2.0, 0.0), vec3(0.0, -1.0, 0.0));
        assert!(aim.hits(&cue()));
        let (_, shot) = release(charged(40), &aim, &cue());
        assert!(shot.is_none());
    }

    #[test]
    fn pocketed_cue_ball_cannot_be_shot() {
        let mut ball = cue();
        ball.active = false;
        let (_, shot) = release(charged(40), &aim_at_cue(), &ball);
        assert!(shot.is_none());
    }
}

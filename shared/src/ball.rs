use crate::vec3::{add, length, scale, Vec3};

/// Index of the cue ball in every ball list.
pub const CUE_BALL: usize = 0;

/// RGB color, each channel in [0, 1]
pub type Color = [f32; 3];

pub const WHITE: Color = [1.0, 1.0, 1.0];
pub const RED: Color = [1.0, 0.0, 0.0];
pub const BLACK: Color = [0.0, 0.0, 0.0];

/// One sphere on the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub radius: f64,
    /// Uniform for now; collisions weigh balls by radius.
    pub mass: f64,
    pub position: Vec3,
    /// Displacement per tick. Motion is planar, so y stays 0.
    pub velocity: Vec3,
    pub color: Color,
    /// Cleared for good once the ball drops into a pocket.
    pub active: bool,
}

impl Ball {
    pub fn new(radius: f64, color: Color, position: Vec3) -> Self {
        debug_assert!(radius > 0.0, "ball radius must be positive");
        Self {
            radius,
            mass: 1.0,
            position,
            velocity: Vec3::ZERO,
            color,
            active: true,
        }
    }

    pub fn speed(&self) -> f64 {
        length(self.velocity)
    }

    pub fn is_moving(&self, rest_speed: f64) -> bool {
        self.speed() > rest_speed
    }

    /// Set velocity, locking it to the table plane.
    pub fn set_movement(&mut self, velocity: Vec3) {
        self.velocity = Vec3::new(velocity.x, 0.0, velocity.z);
    }

    /// Advance one tick: move by the velocity, then shed `drag` worth of speed.
    /// Speed drops linearly and snaps to exactly zero instead of reversing.
    pub fn advance(&mut self, drag: f64) {
        let len = self.speed();
        if len == 0.0 {
            return;
        }

        self.position = add(self.position, self.velocity);

        let remaining = len - drag;
        if remaining < 0.0 {
            self.velocity = Vec3::ZERO;
        } else {
            self.velocity = scale(self.velocity, remaining / len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::vec3;

    const DRAG: f64 = 0.0000625;

    fn moving_ball(velocity: Vec3) -> Ball {
        let mut ball = Ball::new(0.05, RED, vec3(0.0, 0.55, 0.0));
        ball.velocity = velocity;
        ball
    }

    #[test]
    fn new_ball_is_active_and_still() {
        let ball = Ball::new(0.05, WHITE, vec3(0.85, 0.55, 0.0));
        assert!(ball.active);
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert_eq!(ball.mass, 1.0);
    }

    #[test]
    fn advance_moves_by_velocity() {
        let mut ball = moving_ball(vec3(0.01, 0.0, -0.02));
        ball.advance(DRAG);
        assert!((ball.position.x - 0.01).abs() < 1e-12);
        assert!((ball.position.z + 0.02).abs() < 1e-12);
        assert_eq!(ball.position.y, 0.55);
    }

    #[test]
    fn advance_reduces_speed_by_drag() {
        let mut ball = moving_ball(vec3(0.0, 0.0, 0.01));
        ball.advance(DRAG);
        assert!((ball.speed() - (0.01 - DRAG)).abs() < 1e-12);
        assert!(ball.velocity.z > 0.0);
    }

    #[test]
    fn drag_is_monotonic_down_to_exact_zero() {
        let mut ball = moving_ball(vec3(0.003, 0.0, -0.004));
        let mut previous = ball.speed();
        let mut ticks = 0;
        while ball.speed() > 0.0 {
            ball.advance(DRAG);
            let now = ball.speed();
            assert!(now < previous, "speed must strictly decrease");
            assert!(now >= 0.0);
            assert!(ball.velocity.x >= 0.0, "x component flipped sign");
            assert!(ball.velocity.z <= 0.0, "z component flipped sign");
            previous = now;
            ticks += 1;
            assert!(ticks < 1000, "ball never came to rest");
        }
        assert_eq!(ball.velocity, Vec3::ZERO);
    }

    #[test]
    fn speed_below_drag_snaps_to_zero() {
        let mut ball = moving_ball(vec3(DRAG / 2.0, 0.0, 0.0));
        ball.advance(DRAG);
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert!(ball.position.x > 0.0);
    }

    #[test]
    fn advance_at_rest_is_noop() {
        let mut ball = moving_ball(Vec3::ZERO);
        let before = ball.clone();
        ball.advance(DRAG);
        assert_eq!(ball, before);
    }

    #[test]
    fn set_movement_locks_to_plane() {
        let mut ball = moving_ball(Vec3::ZERO);
        ball.set_movement(vec3(0.02, 0.5, -0.01));
        assert_eq!(ball.velocity, vec3(0.02, 0.0, -0.01));
    }
}

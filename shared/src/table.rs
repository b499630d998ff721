use crate::ball::{Ball, Color, BLACK, RED, WHITE};
use crate::config::TableConfig;
use crate::vec3::Vec3;

/// Number of balls on a full rack, cue ball included.
pub const BALL_COUNT: usize = 16;

/// Cue ball spot (x, z)
const CUE_SPOT: (f64, f64) = (0.85, 0.0);

/// x of the five-ball back row of the triangle
const RACK_BACK_X: f64 = -0.7;

/// Rows sit closer than one diameter so neighbouring rows nest.
const ROW_TIGHTEN: f64 = 0.0134;

/// Object balls as (row, lateral slot, color). Row 0 is the back row; the
/// slot is in ball radii from the centerline. Listed in ball-index order.
const RACK_LAYOUT: [(u8, i8, Color); BALL_COUNT - 1] = [
    (0, 0, RED),   // 1
    (0, 2, RED),   // 2
    (0, -2, RED),  // 3
    (0, 4, RED),   // 4
    (0, -4, RED),  // 5
    (1, 1, RED),   // 6
    (1, 3, RED),   // 7
    (2, 0, BLACK), // 8
    (1, -1, RED),  // 9
    (1, -3, RED),  // 10
    (2, 2, RED),   // 11
    (2, -2, RED),  // 12
    (3, 1, RED),   // 13
    (3, -1, RED),  // 14
    (4, 0, RED),   // 15
];

/// Build the opening layout: cue ball first, then the triangle, all at rest.
pub fn rack(table: &TableConfig) -> Vec<Ball> {
    let r = table.ball_radius;
    let diameter = 2.0 * r;
    let y = table.bed_height;

    let mut balls = Vec::with_capacity(BALL_COUNT);
    balls.push(Ball::new(r, WHITE, Vec3::new(CUE_SPOT.0, y, CUE_SPOT.1)));

    for &(row, slot, color) in RACK_LAYOUT.iter() {
        let x = RACK_BACK_X + row as f64 * (diameter - ROW_TIGHTEN);
        let z = slot as f64 * r;
        balls.push(Ball::new(r, color, Vec3::new(x, y, z)));
    }

    balls
}

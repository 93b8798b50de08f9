//! Timed brick-row activation
//!
//! Row `r` waits `BRICK_WAIT * (r + 1)` seconds of simulated time before
//! its bricks appear. Deadlines count down by the `dt` handed to each
//! update, so the activation point depends on elapsed time only, not on
//! how that time was sliced into steps.

use glam::Vec2;

use crate::consts::*;

/// Slack when comparing a countdown against zero; absorbs the rounding
/// left over from summing many small `dt`s
pub const DEADLINE_TOLERANCE: f32 = 1e-4;

/// Countdown and bookkeeping for one row of bricks
#[derive(Debug, Clone, PartialEq)]
pub struct BrickRow {
    pub row_index: usize,
    /// Seconds left before the row activates
    pub spawn_deadline: f32,
    /// Set once, when the deadline elapses
    pub alive: bool,
    /// Bricks of this row not destroyed yet
    pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct BrickSpawner {
    rows: Vec<BrickRow>,
    columns: usize,
}

impl Default for BrickSpawner {
    fn default() -> Self {
        Self::new(BRICK_ROWS, BRICK_COLUMNS, BRICK_WAIT)
    }
}

impl BrickSpawner {
    pub fn new(rows: usize, columns: usize, wait: f32) -> Self {
        Self {
            rows: (0..rows)
                .map(|row_index| BrickRow {
                    row_index,
                    spawn_deadline: wait * (row_index + 1) as f32,
                    alive: false,
                    remaining: columns,
                })
                .collect(),
            columns,
        }
    }

    /// Count pending deadlines down by `dt`; returns the rows that just
    /// became active, in row order
    pub fn advance(&mut self, dt: f32) -> Vec<usize> {
        if !(dt > 0.0) {
            return Vec::new();
        }

        let mut activated = Vec::new();
        for row in self.rows.iter_mut().filter(|row| !row.alive) {
            row.spawn_deadline -= dt;
            if row.spawn_deadline <= DEADLINE_TOLERANCE {
                row.spawn_deadline = 0.0;
                row.alive = true;
                activated.push(row.row_index);
            }
        }
        activated
    }

    /// Record one destroyed brick in `row`; false if the row has none left
    /// or has not spawned
    pub fn brick_destroyed(&mut self, row: usize) -> bool {
        match self.rows.get_mut(row) {
            Some(r) if r.alive && r.remaining > 0 => {
                r.remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Every row has spawned and every brick is gone
    pub fn is_cleared(&self) -> bool {
        self.rows.iter().all(|row| row.alive && row.remaining == 0)
    }

    pub fn rows(&self) -> &[BrickRow] {
        &self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn active_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.alive).count()
    }

    /// Bricks alive or still waiting to spawn
    pub fn remaining(&self) -> usize {
        self.rows.iter().map(|row| row.remaining).sum()
    }
}

/// Registry name of a brick
pub fn brick_name(row: usize, column: usize) -> String {
    format!("Brick_{row}_{column}")
}

/// Center of the brick at `(row, column)`
pub fn brick_position(row: usize, column: usize) -> Vec2 {
    Vec2::new(
        BRICK_POS_X + column as f32 * (BRICK_WIDTH + BRICK_SPACING),
        BRICK_POS_Y + row as f32 * (BRICK_HEIGHT + BRICK_SPACING),
    )
}

/// Min and max corners of the full brick grid
pub fn grid_bounds() -> (Vec2, Vec2) {
    let half = Vec2::new(BRICK_WIDTH, BRICK_HEIGHT) * 0.5;
    let first = brick_position(0, 0);
    let last = brick_position(BRICK_ROWS.saturating_sub(1), BRICK_COLUMNS.saturating_sub(1));
    (first.min(last) - half, first.max(last) + half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rows_start_pending() {
        let spawner = BrickSpawner::default();
        assert_eq!(spawner.rows().len(), BRICK_ROWS);
        assert_eq!(spawner.active_rows(), 0);
        assert_eq!(spawner.remaining(), BRICK_ROWS * BRICK_COLUMNS);
        assert!(!spawner.is_cleared());
    }

    #[test]
    fn test_first_row_fires_once_at_wait() {
        let mut spawner = BrickSpawner::default();

        assert!(spawner.advance(BRICK_WAIT * 0.5).is_empty());
        assert_eq!(spawner.advance(BRICK_WAIT * 0.5), vec![0]);
        // Already active: never re-armed
        assert!(spawner.advance(BRICK_WAIT * 0.5).is_empty());
        assert_eq!(spawner.advance(BRICK_WAIT * 0.5), vec![1]);
        assert_eq!(spawner.active_rows(), 2);
    }

    #[test]
    fn test_large_step_fires_several_rows() {
        let mut spawner = BrickSpawner::new(3, 2, 1.0);
        assert_eq!(spawner.advance(2.5), vec![0, 1]);
        assert_eq!(spawner.advance(10.0), vec![2]);
    }

    #[test]
    fn test_non_positive_dt_is_ignored() {
        let mut spawner = BrickSpawner::default();
        assert!(spawner.advance(0.0).is_empty());
        assert!(spawner.advance(-5.0).is_empty());
        assert!(spawner.advance(f32::NAN).is_empty());
        assert_eq!(spawner.rows()[0].spawn_deadline, BRICK_WAIT);
    }

    #[test]
    fn test_cleared_after_every_brick() {
        let mut spawner = BrickSpawner::new(2, 2, 1.0);
        // Nothing spawned: destroying is refused
        assert!(!spawner.brick_destroyed(0));

        spawner.advance(2.0);
        for row in 0..2 {
            for _ in 0..2 {
                assert!(!spawner.is_cleared());
                assert!(spawner.brick_destroyed(row));
            }
        }
        assert!(spawner.is_cleared());
        assert!(!spawner.brick_destroyed(1));
    }

    #[test]
    fn test_grid_layout() {
        assert_eq!(brick_name(3, 1), "Brick_3_1");
        let origin = brick_position(0, 0);
        assert_eq!(origin, Vec2::new(BRICK_POS_X, BRICK_POS_Y));
        let next = brick_position(1, 1);
        assert!((next.x - origin.x - (BRICK_WIDTH + BRICK_SPACING)).abs() < 0.0001);
        assert!((next.y - origin.y - (BRICK_HEIGHT + BRICK_SPACING)).abs() < 0.0001);
    }

    #[test]
    fn test_grid_bounds_cover_every_brick() {
        let (min, max) = grid_bounds();
        assert!((min - Vec2::new(-23.0, 38.5)).length() < 0.0001);
        assert!((max - Vec2::new(23.0, 69.5)).length() < 0.0001);

        let half = Vec2::new(BRICK_WIDTH, BRICK_HEIGHT) * 0.5;
        for row in 0..BRICK_ROWS {
            for column in 0..BRICK_COLUMNS {
                let center = brick_position(row, column);
                assert!((center - half).cmpge(min - 0.0001).all());
                assert!((center + half).cmple(max + 0.0001).all());
            }
        }
    }

    proptest! {
        #[test]
        fn prop_activation_depends_on_elapsed_time_only(steps in 2usize..250) {
            // Slice BRICK_WAIT into `steps` equal pieces: row 0 fires on the
            // last piece, never before
            let dt = BRICK_WAIT / steps as f32;
            let mut spawner = BrickSpawner::default();
            for step in 1..=steps {
                let fired = spawner.advance(dt);
                if step < steps {
                    prop_assert!(fired.is_empty(), "fired early at step {}", step);
                } else {
                    prop_assert_eq!(fired, vec![0]);
                }
            }
        }
    }
}

//! Level progression: xp goals and level-scaled health.

const XP_BASE: f64 = 100.0;
const XP_SCALE: f64 = 1.1;
const HEALTH_BASE: f64 = 100.0;
const HEALTH_SCALE: f64 = 0.05;

/// Xp needed to advance from `level`: `100 * (level + 1)^1.1`, rounded.
pub fn xp_goal(level: i32) -> i64 {
    (XP_BASE * ((level + 1) as f64).powf(XP_SCALE)).round() as i64
}

/// Maximum health at `level`: `100 * (1 + 0.05 * level^2)`, rounded.
pub fn scaled_health(level: i32) -> i32 {
    let l = level as f64;
    (HEALTH_BASE * (1.0 + HEALTH_SCALE * l * l)).round() as i32
}

/// A player's level, xp and the health that follows from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: i32,
    pub xp: i64,
    pub xp_goal: i64,
    pub health: i32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 0,
            xp: 0,
            xp_goal: xp_goal(0),
            health: scaled_health(0),
        }
    }
}

impl Progress {
    /// Add xp and take every level it pays for. Leftover xp carries over.
    /// Returns the number of levels gained.
    pub fn gain(&mut self, xp: i64) -> u32 {
        self.xp += xp.max(0);
        let mut gained = 0;
        while self.xp_goal > 0 && self.xp >= self.xp_goal {
            self.xp -= self.xp_goal;
            self.level += 1;
            self.xp_goal = xp_goal(self.level);
            gained += 1;
        }
        if gained > 0 {
            self.health = scaled_health(self.level);
        }
        gained
    }

    /// Repair values loaded from a save: a goal that does not match the
    /// level resets xp, pending level-ups are taken, and health is
    /// recomputed. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = *self;
        if self.level < 0 {
            self.level = 0;
        }
        let goal = xp_goal(self.level);
        if self.xp_goal != goal {
            self.xp = 0;
            self.xp_goal = goal;
        }
        self.xp = self.xp.max(0);
        self.gain(0);
        self.health = scaled_health(self.level);
        *self != before
    }
}

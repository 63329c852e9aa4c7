//! Entity variants
//!
//! Every simulated object is an `Entity`: a sprite name, a box, and one of a
//! closed set of variant states. The board owns entities by value and hands
//! out `EntityId`s; nothing holds an owning reference back to the board.

use std::collections::HashMap;

use glam::Vec2;

use super::collision::Aabb;
use crate::atlas::{SpriteInfo, SpriteKind};
use crate::config::GameConfig;
use crate::input::InputState;

/// Sprite-less name of the flock coordinator
pub const FLOCK_NAME: &str = "alienFlock";

/// Stable handle to an entity within its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Placeholder until the board assigns a real id
    pub const UNASSIGNED: EntityId = EntityId(0);
}

/// Per-spawn options passed through `Board::add_sprite`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnOptions {
    /// Missile vertical velocity (pixels/s, negative = up)
    pub dy: f32,
    /// Missile counts against the player's in-flight cap
    pub player_fired: bool,
    /// Flock an alien belongs to
    pub flock: Option<EntityId>,
}

impl SpawnOptions {
    pub fn player_missile(dy: f32) -> Self {
        Self {
            dy,
            player_fired: true,
            flock: None,
        }
    }

    pub fn alien_missile(dy: f32) -> Self {
        Self {
            dy,
            player_fired: false,
            flock: None,
        }
    }

    pub fn in_flock(flock: EntityId) -> Self {
        Self {
            flock: Some(flock),
            ..Default::default()
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Steps until the next shot; may go negative while waiting
    pub reloading: i32,
}

impl Player {
    pub fn new(reloading: i32) -> Self {
        Self { reloading }
    }

    /// New x after applying held left/right, clamped to `[0, surface_width - w]`
    pub fn steer(&self, x: f32, w: f32, input: &InputState, dt: f32, speed: f32, surface_width: f32) -> f32 {
        let mut x = x;
        if input.left {
            x -= speed * dt;
        }
        if input.right {
            x += speed * dt;
        }
        // Not `clamp`: a sprite wider than the surface pins to the right edge
        x.max(0.0).min(surface_width - w)
    }

    /// Count down the reload timer and decide whether to shoot this step
    pub fn wants_to_fire(&mut self, input: &InputState, missiles_in_flight: u32, cap: u32) -> bool {
        self.reloading -= 1;
        input.fire && self.reloading <= 0 && missiles_in_flight < cap
    }
}

/// One invader in the flock
#[derive(Debug, Clone, PartialEq)]
pub struct Alien {
    pub flock: Option<EntityId>,
    /// Animation frame (0 or 1)
    pub frame: u32,
    /// Horizontal drift not yet committed to `x`
    pub mx: f32,
}

impl Alien {
    pub fn new(flock: Option<EntityId>) -> Self {
        Self {
            flock,
            frame: 0,
            mx: 0.0,
        }
    }

    /// Accumulate drift; once it passes `threshold`, return the move to
    /// commit and advance the animation.
    pub fn drift(&mut self, dt: f32, flock_dx: f32, threshold: f32) -> Option<f32> {
        self.mx += dt * flock_dx;
        if self.mx.abs() <= threshold {
            return None;
        }
        let step = self.mx;
        self.mx = 0.0;
        self.frame = (self.frame + 1) % 2;
        Some(step)
    }
}

/// Column key for the flock's front table; folds -0.0 into 0.0
fn column_key(x: f32) -> u32 {
    (x + 0.0).to_bits()
}

/// Invisible coordinator shared by every alien on a board
#[derive(Debug, Clone, PartialEq)]
pub struct AlienFlock {
    /// Sweep direction: 1 = right, -1 = left
    pub direction: i8,
    last_direction: i8,
    /// Horizontal speed applied to every alien this step
    pub dx: f32,
    /// Vertical step applied to every alien this step
    pub dy: f32,
    pub speed: f32,
    /// Lowest alien y per x column
    front: HashMap<u32, f32>,
    pub alien_count: usize,
    cleared: bool,
}

impl AlienFlock {
    pub fn new(speed: f32) -> Self {
        Self {
            direction: 1,
            last_direction: 0,
            dx: speed,
            dy: 0.0,
            speed,
            front: HashMap::new(),
            alien_count: 0,
            cleared: false,
        }
    }

    /// Descend once when the direction changed since last step, then
    /// refresh the shared horizontal delta.
    pub fn begin_step(&mut self) {
        if self.direction != 0 && self.direction != self.last_direction {
            self.last_direction = self.direction;
            self.dy = self.speed;
        } else {
            self.dy = 0.0;
        }
        self.dx = self.speed * f32::from(self.direction);
    }

    /// Replace the front table with a fresh scan of `(x, y)` alien positions
    pub fn rescan(&mut self, aliens: impl IntoIterator<Item = Vec2>) {
        self.front.clear();
        self.alien_count = 0;
        for pos in aliens {
            let slot = self.front.entry(column_key(pos.x)).or_insert(pos.y);
            if pos.y > *slot {
                *slot = pos.y;
            }
            self.alien_count += 1;
        }
    }

    /// Lowest alien y in the column at `x`, as of the last scan
    pub fn front_y(&self, x: f32) -> Option<f32> {
        self.front.get(&column_key(x)).copied()
    }

    pub fn speed_up(&mut self) {
        self.speed += 1.0;
    }

    /// Returns true only the first time the flock reports itself cleared
    pub fn mark_cleared(&mut self) -> bool {
        !std::mem::replace(&mut self.cleared, true)
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    pub dy: f32,
    pub player_fired: bool,
}

impl Missile {
    pub fn out_of_bounds(y: f32, surface_height: f32) -> bool {
        y < 0.0 || y > surface_height
    }
}

/// A static shield block
#[derive(Debug, Clone, PartialEq)]
pub struct Shield {
    pub hit_points: u8,
}

impl Shield {
    pub fn new(hit_points: u8) -> Self {
        Self { hit_points }
    }

    /// Absorb one hit; true when the block is destroyed
    pub fn hit(&mut self) -> bool {
        self.hit_points = self.hit_points.saturating_sub(1);
        self.hit_points == 0
    }
}

/// Variant-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player(Player),
    Alien(Alien),
    Flock(AlienFlock),
    Missile(Missile),
    Shield(Shield),
}

/// A simulated object on a board
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Sprite lookup key
    pub name: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: EntityKind,
}

impl Entity {
    /// Build the variant an atlas entry names, sized from the atlas
    pub fn from_sprite(name: &str, info: &SpriteInfo, pos: Vec2, opts: &SpawnOptions, config: &GameConfig) -> Self {
        let kind = match info.kind {
            SpriteKind::Player => EntityKind::Player(Player::new(config.player_initial_reload)),
            SpriteKind::Alien => EntityKind::Alien(Alien::new(opts.flock)),
            SpriteKind::Missile => EntityKind::Missile(Missile {
                dy: opts.dy,
                player_fired: opts.player_fired,
            }),
            SpriteKind::Shield => EntityKind::Shield(Shield::new(config.shield_hit_points)),
        };
        Self {
            id: EntityId::UNASSIGNED,
            name: name.to_string(),
            pos,
            size: Vec2::new(info.w, info.h),
            kind,
        }
    }

    pub fn flock(speed: f32) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            name: FLOCK_NAME.to_string(),
            pos: Vec2::ZERO,
            size: Vec2::ZERO,
            kind: EntityKind::Flock(AlienFlock::new(speed)),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Never returned as a collision target
    pub fn is_invulnerable(&self) -> bool {
        matches!(self.kind, EntityKind::Flock(_))
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.kind, EntityKind::Flock(_))
    }

    /// Animation frame to draw
    pub fn frame(&self) -> u32 {
        match &self.kind {
            EntityKind::Alien(alien) => alien.frame,
            _ => 0,
        }
    }

    pub fn as_alien(&self) -> Option<&Alien> {
        match &self.kind {
            EntityKind::Alien(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_flock(&self) -> Option<&AlienFlock> {
        match &self.kind {
            EntityKind::Flock(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_missile(&self) -> Option<&Missile> {
        match &self.kind {
            EntityKind::Missile(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_shield(&self) -> Option<&Shield> {
        match &self.kind {
            EntityKind::Shield(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_steer_clamps_to_surface() {
        let player = Player::new(0);
        let left = InputState {
            left: true,
            ..Default::default()
        };
        let right = InputState {
            right: true,
            ..Default::default()
        };
        assert_eq!(player.steer(3.0, 26.0, &left, 0.1, 100.0, 500.0), 0.0);
        assert_eq!(player.steer(470.0, 26.0, &right, 0.1, 100.0, 500.0), 474.0);
        assert_eq!(player.steer(100.0, 26.0, &right, 0.1, 100.0, 500.0), 110.0);
    }

    #[test]
    fn test_player_reload_counts_down_every_step() {
        let mut player = Player::new(2);
        let fire = InputState {
            fire: true,
            ..Default::default()
        };
        assert!(!player.wants_to_fire(&fire, 0, 3));
        assert!(player.wants_to_fire(&fire, 0, 3));
        // At cap nothing fires, but the timer keeps running
        assert!(!player.wants_to_fire(&fire, 3, 3));
        assert_eq!(player.reloading, -1);
    }

    #[test]
    fn test_alien_commits_drift_past_threshold() {
        let mut alien = Alien::new(None);
        assert_eq!(alien.drift(0.5, 10.0, 10.0), None);
        assert_eq!(alien.drift(0.5, 10.0, 10.0), None); // exactly 10 is not past
        let step = alien.drift(0.1, 10.0, 10.0).unwrap();
        assert!((step - 11.0).abs() < 1e-4);
        assert_eq!(alien.mx, 0.0);
        assert_eq!(alien.frame, 1);
    }

    #[test]
    fn test_flock_descends_once_per_direction_change() {
        let mut flock = AlienFlock::new(10.0);
        flock.begin_step();
        assert_eq!((flock.dx, flock.dy), (10.0, 10.0));
        flock.begin_step();
        assert_eq!((flock.dx, flock.dy), (10.0, 0.0));

        flock.direction = -1;
        flock.begin_step();
        assert_eq!((flock.dx, flock.dy), (-10.0, 10.0));
        flock.begin_step();
        assert_eq!(flock.dy, 0.0);
    }

    #[test]
    fn test_flock_front_tracks_lowest_alien_per_column() {
        let mut flock = AlienFlock::new(10.0);
        flock.rescan([
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 18.0),
            Vec2::new(33.0, 0.0),
        ]);
        assert_eq!(flock.alien_count, 3);
        assert_eq!(flock.front_y(0.0), Some(18.0));
        assert_eq!(flock.front_y(-0.0), Some(18.0));
        assert_eq!(flock.front_y(33.0), Some(0.0));
        assert_eq!(flock.front_y(66.0), None);
    }

    #[test]
    fn test_flock_cleared_reports_once() {
        let mut flock = AlienFlock::new(10.0);
        assert!(flock.mark_cleared());
        assert!(!flock.mark_cleared());
        assert!(flock.is_cleared());
    }

    #[test]
    fn test_shield_hit_points() {
        let mut single = Shield::new(1);
        assert!(single.hit());

        let mut sturdy = Shield::new(2);
        assert!(!sturdy.hit());
        assert!(sturdy.hit());
    }

    #[test]
    fn test_missile_bounds() {
        assert!(Missile::out_of_bounds(-0.5, 500.0));
        assert!(Missile::out_of_bounds(500.5, 500.0));
        assert!(!Missile::out_of_bounds(500.0, 500.0));
    }
}

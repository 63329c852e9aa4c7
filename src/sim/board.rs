//! The level board
//!
//! Owns every entity of one level and drives the per-frame protocol:
//! step all entities in insertion order, reconcile deferred removals, then
//! render in the same order (insertion order is draw order).

use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{AlienFlock, Entity, EntityId, EntityKind, Missile, SpawnOptions};
use super::level::{LevelGrid, LevelSet, alien_sprite_name};
use crate::atlas::SpriteSheet;
use crate::audio::{AudioPort, sounds};
use crate::config::GameConfig;
use crate::consts::ALIEN_GRID_GAP;
use crate::error::EngineError;
use crate::input::InputState;
use crate::surface::Surface;

/// Sprite names the board spawns directly
pub mod sprites {
    pub const PLAYER: &str = "player";
    pub const MISSILE: &str = "missile";
    pub const SHIELDS: [&str; 3] = ["shield1", "shield2", "shield3"];
}

/// Player spawn: gap between the ship's bottom and the surface bottom
const PLAYER_BOTTOM_GAP: f32 = 15.0;
/// Shield spawn: gap between a block's bottom and the surface bottom
const SHIELD_BOTTOM_GAP: f32 = 50.0;
/// Shield x offsets from the surface center
const SHIELD_OFFSETS: [f32; 3] = [-70.0, -10.0, 50.0];

/// Read-only data every board of a run shares
#[derive(Debug, Clone)]
pub struct GameAssets {
    pub sprites: SpriteSheet,
    pub levels: LevelSet,
}

impl GameAssets {
    /// Pair a sheet with levels, rejecting levels that name unknown aliens
    pub fn new(sprites: SpriteSheet, levels: LevelSet) -> Result<Self, EngineError> {
        levels.validate(&sprites)?;
        Ok(Self { sprites, levels })
    }

    pub fn builtin() -> Result<Self, EngineError> {
        Self::new(SpriteSheet::builtin()?, LevelSet::builtin()?)
    }
}

/// How a level ended; read by the driver after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The player was hit. Terminal for the run.
    PlayerDied,
    /// No aliens remain. `next_level` is `None` after the last level.
    Cleared { next_level: Option<u32> },
}

/// What a dying entity still has to do once its borrow is released
enum Death {
    Player,
    Alien(Option<EntityId>),
    FlockCleared,
    Missile { player_fired: bool },
    Shield { destroyed: bool },
    Nothing,
}

/// Live simulation of one level
#[derive(Debug)]
pub struct Board {
    entities: Vec<Entity>,
    /// Ids queued for removal this step
    removed: Vec<EntityId>,
    /// Player missiles in flight
    missiles: u32,
    level: u32,
    player: Option<EntityId>,
    flock: Option<EntityId>,
    next_id: u32,
    assets: Rc<GameAssets>,
    config: GameConfig,
    rng: Pcg32,
    outcome: Option<LevelOutcome>,
}

impl Board {
    /// Build the board for `level` from the shared level data
    pub fn new(level: u32, assets: Rc<GameAssets>, config: &GameConfig) -> Result<Self, EngineError> {
        let mut board = Self::empty(level, assets, config);
        let assets = Rc::clone(&board.assets);
        let grid = assets
            .levels
            .grid(level)
            .ok_or(EngineError::LevelNotFound { level })?;
        board.load_level(grid)?;
        log::info!(
            "Level {} loaded: {} aliens",
            level,
            board.entities.iter().filter(|e| e.as_alien().is_some()).count()
        );
        Ok(board)
    }

    /// A board with no entities; `load_level` populates it
    pub fn empty(level: u32, assets: Rc<GameAssets>, config: &GameConfig) -> Self {
        Self {
            entities: Vec::new(),
            removed: Vec::new(),
            missiles: 0,
            level,
            player: None,
            flock: None,
            next_id: 1,
            assets,
            config: config.clone(),
            rng: Pcg32::seed_from_u64(config.seed.wrapping_add(u64::from(level))),
            outcome: None,
        }
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Container ===

    /// Register an entity at the end of the list (top of the draw order)
    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_entity_id();
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Spawn the entity variant the atlas names for `name`
    pub fn add_sprite(&mut self, name: &str, x: f32, y: f32, opts: SpawnOptions) -> Result<EntityId, EngineError> {
        let info = *self.assets.sprites.require(name)?;
        let opts = SpawnOptions {
            flock: opts.flock.or(self.flock),
            ..opts
        };
        let entity = Entity::from_sprite(name, &info, Vec2::new(x, y), &opts, &self.config);
        Ok(self.add(entity))
    }

    /// Queue an entity for removal at the end of the current step (or the
    /// start of the next one). Queuing the same id twice removes it once.
    pub fn remove(&mut self, id: EntityId) {
        if !self.removed.contains(&id) {
            self.removed.push(id);
        }
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.removed.contains(&id)
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entities in insertion (draw) order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn missiles(&self) -> u32 {
        self.missiles
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn flock(&self) -> Option<EntityId> {
        self.flock
    }

    pub fn flock_state(&self) -> Option<&AlienFlock> {
        self.flock
            .and_then(|id| self.entity(id))
            .and_then(Entity::as_flock)
    }

    fn flock_mut(&mut self, id: EntityId) -> Option<&mut AlienFlock> {
        match self.entity_mut(id).map(|e| &mut e.kind) {
            Some(EntityKind::Flock(flock)) => Some(flock),
            _ => None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// How the level ended, if it has; cleared by reading
    pub fn take_outcome(&mut self) -> Option<LevelOutcome> {
        self.outcome.take()
    }

    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    /// First outcome wins
    fn finish(&mut self, outcome: LevelOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    // === Frame protocol ===

    /// Advance every entity by `dt` and reconcile removals.
    ///
    /// Removals queued since the last step are applied first, so the sweep
    /// starts with an empty queue. Entities spawned during the sweep are
    /// appended and visited later in the same sweep.
    ///
    /// Unlike a plain sweep over the whole list, entities queued for removal
    /// earlier in the same sweep are not stepped again. A missile destroyed by
    /// another missile therefore never runs its own hit and death effects a
    /// second time, and the player's missile counter drops once per missile.
    pub fn step(&mut self, dt: f32, input: &InputState, audio: &mut dyn AudioPort) {
        self.finalize_removed();

        let mut idx = 0;
        while idx < self.entities.len() {
            let id = self.entities[idx].id;
            if !self.is_pending_removal(id) && !self.step_entity(idx, dt, input, audio) {
                self.kill(id, audio);
                self.remove(id);
            }
            idx += 1;
        }
        self.finalize_removed();
    }

    /// Drop every queued entity from the list and reset the queue
    fn finalize_removed(&mut self) {
        let removed = std::mem::take(&mut self.removed);
        self.entities.retain(|e| !removed.contains(&e.id));
    }

    /// Clear the surface and draw every visible entity in list order
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        for entity in self.entities.iter().filter(|e| e.is_visible()) {
            self.assets
                .sprites
                .draw(surface, &entity.name, entity.pos.x, entity.pos.y, entity.frame());
        }
    }

    /// Inclusive bounding-box overlap
    pub fn collision(a: &Entity, b: &Entity) -> bool {
        a.bounds().overlaps(&b.bounds())
    }

    /// First entity in list order overlapping `id`, skipping itself and
    /// invulnerable entities
    pub fn collide(&self, id: EntityId) -> Option<EntityId> {
        let me = self.entity(id)?;
        self.entities
            .iter()
            .find(|other| other.id != id && !other.is_invulnerable() && Self::collision(me, other))
            .map(|other| other.id)
    }

    /// Replace all entities with the layout for `grid`
    pub fn load_level(&mut self, grid: &LevelGrid) -> Result<(), EngineError> {
        self.entities.clear();
        self.removed.clear();
        self.player = None;
        self.flock = None;

        let assets = Rc::clone(&self.assets);
        let sheet = &assets.sprites;
        let (width, height) = (self.config.width, self.config.height);

        let player_h = sheet.require(sprites::PLAYER)?.h;
        self.player = Some(self.add_sprite(
            sprites::PLAYER,
            width / 2.0,
            height - player_h - PLAYER_BOTTOM_GAP,
            SpawnOptions::default(),
        )?);

        for (name, offset) in sprites::SHIELDS.iter().zip(SHIELD_OFFSETS) {
            let shield_h = sheet.require(name)?.h;
            self.add_sprite(
                name,
                width / 2.0 + offset,
                height - shield_h - SHIELD_BOTTOM_GAP,
                SpawnOptions::default(),
            )?;
        }

        let flock = self.add(Entity::flock(self.config.flock_speed));
        self.flock = Some(flock);

        for (row, cells) in grid.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                if cell == 0 {
                    continue;
                }
                let name = alien_sprite_name(cell);
                let info = sheet.require(&name)?;
                self.add_sprite(
                    &name,
                    (info.w + ALIEN_GRID_GAP) * col as f32,
                    info.h * row as f32,
                    SpawnOptions::in_flock(flock),
                )?;
            }
        }
        Ok(())
    }

    /// The level after this one, or `None` when this is the last
    pub fn next_level(&self) -> Option<u32> {
        let next = self.level + 1;
        self.assets.levels.contains(next).then_some(next)
    }

    // === Entity behaviour ===

    /// Returns false when the entity wants to die
    fn step_entity(&mut self, idx: usize, dt: f32, input: &InputState, audio: &mut dyn AudioPort) -> bool {
        match self.entities[idx].kind {
            EntityKind::Player(_) => self.step_player(idx, dt, input, audio),
            EntityKind::Alien(_) => self.step_alien(idx, dt),
            EntityKind::Flock(_) => self.step_flock(idx),
            EntityKind::Missile(_) => self.step_missile(idx, dt, audio),
            EntityKind::Shield(_) => true,
        }
    }

    fn step_player(&mut self, idx: usize, dt: f32, input: &InputState, audio: &mut dyn AudioPort) -> bool {
        let cfg = &self.config;
        let entity = &mut self.entities[idx];
        let EntityKind::Player(player) = &mut entity.kind else {
            return true;
        };

        entity.pos.x = player.steer(entity.pos.x, entity.size.x, input, dt, cfg.player_speed, cfg.width);
        if !player.wants_to_fire(input, self.missiles, cfg.max_player_missiles) {
            return true;
        }
        player.reloading = cfg.player_reload;
        let (pos, size) = (entity.pos, entity.size);

        audio.play(sounds::FIRE);
        let x = pos.x + size.x / 2.0 - self.missile_width() / 2.0;
        let y = pos.y - size.y;
        match self.add_sprite(sprites::MISSILE, x, y, SpawnOptions::player_missile(-self.config.missile_speed)) {
            Ok(_) => self.missiles += 1,
            Err(e) => log::error!("Player missile not spawned: {}", e),
        }
        true
    }

    fn step_alien(&mut self, idx: usize, dt: f32) -> bool {
        let (x, flock_id) = match &self.entities[idx].kind {
            EntityKind::Alien(alien) => (self.entities[idx].pos.x, alien.flock),
            _ => return true,
        };
        let Some((flock_dx, flock_dy, front_y)) = flock_id
            .and_then(|id| self.entity(id))
            .and_then(Entity::as_flock)
            .map(|f| (f.dx, f.dy, f.front_y(x)))
        else {
            return true;
        };

        let threshold = self.config.alien_move_threshold;
        let entity = &mut self.entities[idx];
        let EntityKind::Alien(alien) = &mut entity.kind else {
            return true;
        };
        entity.pos.y += flock_dy;
        let Some(step) = alien.drift(dt, flock_dx, threshold) else {
            return true;
        };
        let (pos, size) = (entity.pos, entity.size);

        // Only the frontmost alien of a column may shoot
        if front_y == Some(pos.y) {
            self.fire_sometimes(pos, size);
        }

        let new_x = pos.x + step;
        self.entities[idx].pos.x = new_x;

        let width = self.config.width;
        if let Some(flock) = flock_id.and_then(|id| self.flock_mut(id)) {
            if new_x > width - size.x * 2.0 {
                flock.direction = -1;
            }
            if new_x < size.x {
                flock.direction = 1;
            }
        }
        true
    }

    fn fire_sometimes(&mut self, pos: Vec2, size: Vec2) {
        if self.rng.random::<f64>() >= self.config.alien_fire_chance {
            return;
        }
        let x = pos.x + size.x / 2.0 - self.missile_width() / 2.0;
        let y = pos.y + size.y;
        if let Err(e) = self.add_sprite(sprites::MISSILE, x, y, SpawnOptions::alien_missile(self.config.missile_speed)) {
            log::error!("Alien missile not spawned: {}", e);
        }
    }

    fn step_flock(&mut self, idx: usize) -> bool {
        let aliens: Vec<Vec2> = self
            .entities
            .iter()
            .filter(|e| e.as_alien().is_some())
            .map(|e| e.pos)
            .collect();

        let EntityKind::Flock(flock) = &mut self.entities[idx].kind else {
            return true;
        };
        flock.begin_step();
        flock.rescan(aliens);
        if flock.alien_count == 0 && flock.mark_cleared() {
            self.level_cleared();
        }
        true
    }

    fn step_missile(&mut self, idx: usize, dt: f32, audio: &mut dyn AudioPort) -> bool {
        let entity = &mut self.entities[idx];
        let EntityKind::Missile(missile) = &entity.kind else {
            return true;
        };
        entity.pos.y += missile.dy * dt;
        let (id, y) = (entity.id, entity.pos.y);

        if let Some(victim) = self.collide(id) {
            self.kill(victim, audio);
            return false;
        }
        !Missile::out_of_bounds(y, self.config.height)
    }

    fn missile_width(&self) -> f32 {
        self.assets
            .sprites
            .get(sprites::MISSILE)
            .map(|m| m.w)
            .unwrap_or(0.0)
    }

    // === Death ===

    /// Run an entity's death effects. Applied at most once per entity per
    /// step; entities already queued for removal are left alone.
    pub fn kill(&mut self, id: EntityId, audio: &mut dyn AudioPort) {
        if self.is_pending_removal(id) {
            return;
        }
        let Some(idx) = self.index_of(id) else {
            return;
        };

        let death = match &mut self.entities[idx].kind {
            EntityKind::Player(_) => Death::Player,
            EntityKind::Alien(alien) => Death::Alien(alien.flock),
            EntityKind::Flock(flock) => {
                if flock.mark_cleared() {
                    Death::FlockCleared
                } else {
                    Death::Nothing
                }
            }
            EntityKind::Missile(missile) => Death::Missile {
                player_fired: missile.player_fired,
            },
            EntityKind::Shield(shield) => Death::Shield {
                destroyed: shield.hit(),
            },
        };

        match death {
            Death::Player if self.outcome == Some(LevelOutcome::PlayerDied) => {}
            Death::Player => {
                audio.play(sounds::DIE);
                log::info!("Player destroyed on level {}", self.level);
                self.finish(LevelOutcome::PlayerDied);
            }
            Death::Alien(flock) => {
                audio.play(sounds::DIE);
                if let Some(flock) = flock.and_then(|f| self.flock_mut(f)) {
                    flock.speed_up();
                }
                self.remove(id);
            }
            Death::FlockCleared => self.level_cleared(),
            Death::Missile { player_fired } => {
                if player_fired {
                    self.missiles = self.missiles.saturating_sub(1);
                }
                self.remove(id);
            }
            Death::Shield { destroyed } => {
                audio.play(sounds::DIE);
                if destroyed {
                    self.remove(id);
                }
            }
            Death::Nothing => {}
        }
    }

    /// Damage a shield block: plays the hit sound and removes it once its
    /// hit points run out
    pub fn hit_shield(&mut self, id: EntityId, audio: &mut dyn AudioPort) {
        if self.entity(id).and_then(Entity::as_shield).is_some() {
            self.kill(id, audio);
        }
    }

    fn level_cleared(&mut self) {
        let next_level = self.next_level();
        match next_level {
            Some(next) => log::info!("Level {} cleared, advancing to {}", self.level, next),
            None => log::info!("Level {} cleared, no levels left", self.level),
        }
        self.finish(LevelOutcome::Cleared { next_level });
    }
}

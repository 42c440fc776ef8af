//! Game session
//!
//! The explicitly owned game context: registry (and through it the physics
//! engine), score, custom skins and share codec. UI entry points land here,
//! and the fixed-timestep loop runs here. Dropping a session tears the
//! engine down.

use std::collections::VecDeque;

use glam::Vec2;

use super::customize::CustomizationStore;
use super::merge::{MergeEvent, resolve_batch};
use super::registry::{Piece, PieceRegistry};
use super::score::ScoreLedger;
use super::tiers::TierTable;
use crate::consts::{ESCAPE_MARGIN, MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT, WALL_THICKNESS};
use crate::error::{GameError, Result};
use crate::physics::{PhysicsEngine, World};
use crate::settings::Settings;
use crate::share::{ShareCodec, share_link, token_from_link};

/// UI request marshalled onto the simulation thread
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Drop a smallest-tier fruit at this x
    Drop { x: f32 },
    /// Replace (or clear, with an empty payload) a tier's image
    UploadImage { tier: usize, payload: String },
}

pub struct Session<E: PhysicsEngine = World> {
    registry: PieceRegistry<E>,
    customization: CustomizationStore,
    ledger: ScoreLedger,
    codec: ShareCodec,
    settings: Settings,
    /// Commands applied at the start of the next step
    pending: VecDeque<Command>,
    /// Merges not yet drained by the UI
    events: Vec<MergeEvent>,
    accumulator: f32,
    time_ticks: u64,
}

impl<E: PhysicsEngine> Session<E> {
    /// Start a fresh session with an empty container
    pub fn new(engine: E, tiers: TierTable, settings: Settings) -> Self {
        let customization = CustomizationStore::new(tiers.tier_count());
        Self::with_state(engine, tiers, settings, customization, ScoreLedger::new())
    }

    /// Start a fresh session carrying the skins and score from a share token.
    /// The engine is torn down if the token is rejected.
    pub fn restore_from_link(
        mut engine: E,
        tiers: TierTable,
        settings: Settings,
        token: &str,
    ) -> Result<Self> {
        let codec = ShareCodec::new(tiers.tier_count());
        let restored = codec.decode(token).and_then(|payload| {
            let customization =
                CustomizationStore::from_snapshot(tiers.tier_count(), payload.customization)?;
            Ok((customization, payload.score))
        });
        let (customization, score) = match restored {
            Ok(restored) => restored,
            Err(err) => {
                log::warn!("Could not load shared game: {err}");
                engine.teardown();
                return Err(err);
            }
        };
        log::info!(
            "Restored shared game (score {score}, {} custom images)",
            customization.custom_count()
        );
        Ok(Self::with_state(
            engine,
            tiers,
            settings,
            customization,
            ScoreLedger::starting_at(score),
        ))
    }

    /// Restore from `link` if it carries a share token, else start fresh.
    /// A rejected token still yields a fresh session, returned with the error
    /// so the UI can tell the player.
    pub fn from_link_or_new(
        mut make_engine: impl FnMut() -> E,
        tiers: TierTable,
        settings: Settings,
        link: &str,
    ) -> (Self, Option<GameError>) {
        let Some(token) = token_from_link(link, &settings.share_query_key) else {
            return (Self::new(make_engine(), tiers, settings), None);
        };
        match Self::restore_from_link(make_engine(), tiers.clone(), settings.clone(), token) {
            Ok(session) => (session, None),
            Err(err) => (Self::new(make_engine(), tiers, settings), Some(err)),
        }
    }

    fn with_state(
        engine: E,
        tiers: TierTable,
        settings: Settings,
        customization: CustomizationStore,
        ledger: ScoreLedger,
    ) -> Self {
        let codec = ShareCodec::new(tiers.tier_count());
        let registry = PieceRegistry::new(engine, tiers, settings.asset_pattern.clone());
        let mut session = Self {
            registry,
            customization,
            ledger,
            codec,
            settings,
            pending: VecDeque::new(),
            events: Vec::new(),
            accumulator: 0.0,
            time_ticks: 0,
        };
        session.build_container();
        session
    }

    /// Floor plus two side walls, just outside the visible arena
    fn build_container(&mut self) {
        let w = self.settings.arena_width;
        let h = self.settings.arena_height;
        let t = WALL_THICKNESS;

        self.registry
            .add_boundary(Vec2::new(w / 2.0, h + t / 2.0), Vec2::new(w + 2.0 * t, t));
        self.registry
            .add_boundary(Vec2::new(-t / 2.0, h / 2.0), Vec2::new(t, h));
        self.registry
            .add_boundary(Vec2::new(w + t / 2.0, h / 2.0), Vec2::new(t, h));
    }

    /// Drop a smallest-tier fruit at `x` (clamped inside the walls)
    pub fn on_drop(&mut self, x: f32) -> Result<Piece> {
        if !x.is_finite() {
            return Err(GameError::InvalidDrop(x));
        }
        let radius = self.registry.tiers().tier_at(0)?.radius;
        let max_x = (self.settings.arena_width - radius).max(radius);
        let x = x.clamp(radius, max_x);
        let y = self.settings.drop_height;
        self.spawn_at(0, Vec2::new(x, y))
    }

    /// Spawn a piece of any tier at an exact position
    pub fn spawn_at(&mut self, tier: usize, position: Vec2) -> Result<Piece> {
        self.registry.spawn(tier, position, &self.customization)
    }

    pub fn on_image_upload(&mut self, tier: usize, payload: impl Into<String>) -> Result<()> {
        self.customization.set_image(tier, payload)
    }

    pub fn current_score(&self) -> u64 {
        self.ledger.current()
    }

    /// Token for the current skins and score
    pub fn share_token(&self) -> Result<String> {
        self.codec
            .encode(&self.customization.snapshot(), self.ledger.current())
    }

    /// `base_url?game=<token>`
    pub fn request_share_link(&self, base_url: &str) -> Result<String> {
        let token = self.share_token()?;
        Ok(share_link(base_url, &self.settings.share_query_key, &token))
    }

    /// Queue a UI command for the next step
    pub fn queue(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    fn apply(&mut self, command: Command) {
        let result = match command {
            Command::Drop { x } => self.on_drop(x).map(|_| ()),
            Command::UploadImage { tier, payload } => self.on_image_upload(tier, payload),
        };
        if let Err(err) = result {
            log::warn!("Rejected command: {err}");
        }
    }

    /// Apply queued commands, advance one fixed step and resolve its collisions.
    /// Returns the number of merges in this step.
    pub fn step(&mut self) -> usize {
        while let Some(command) = self.pending.pop_front() {
            self.apply(command);
        }

        let batch = self.registry.step(SIM_DT);
        let merges = resolve_batch(
            &mut self.registry,
            &mut self.ledger,
            &self.customization,
            &batch,
        );
        let count = merges.len();

        self.events.extend(merges);
        self.remove_escaped();
        self.time_ticks += 1;
        count
    }

    /// Unregister pieces that left the container (e.g. spilled over a wall)
    fn remove_escaped(&mut self) {
        let limit = self.settings.arena_height + ESCAPE_MARGIN;
        let escaped: Vec<Piece> = self
            .registry
            .pieces()
            .filter(|p| {
                self.registry
                    .position(p.handle)
                    .is_some_and(|pos| pos.y > limit)
            })
            .collect();

        for piece in escaped {
            log::debug!("Piece {:?} left the container", piece.handle);
            if let Err(err) = self.registry.remove(piece) {
                log::error!("{err}");
            }
        }
    }

    /// Feed a frame delta into the fixed-step accumulator. Returns steps run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Take the merges since the last call
    pub fn drain_events(&mut self) -> Vec<MergeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Live pieces in handle order
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.registry.pieces()
    }

    pub fn piece_count(&self) -> usize {
        self.registry.len()
    }

    pub fn position(&self, piece: Piece) -> Option<Vec2> {
        self.registry.position(piece.handle)
    }

    pub fn registry(&self) -> &PieceRegistry<E> {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        self.registry.engine()
    }

    pub fn tiers(&self) -> &TierTable {
        self.registry.tiers()
    }

    pub fn customization(&self) -> &CustomizationStore {
        &self.customization
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }
}

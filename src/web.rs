//! Browser entry points
//!
//! JavaScript owns a `WebGame` and calls into it from its event handlers and
//! `requestAnimationFrame` loop, all on the one JS thread.

use wasm_bindgen::prelude::*;

use crate::physics::World;
use crate::sim::{Session, TierTable};
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Fruit Merge (web) starting...");
}

fn to_js(err: crate::GameError) -> JsValue {
    log::warn!("{err}");
    JsValue::from_str(err.user_message())
}

fn location() -> Option<web_sys::Location> {
    web_sys::window().map(|w| w.location())
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session<World>,
    /// Player-facing message when a shared game could not be loaded
    load_error: Option<String>,
}

#[wasm_bindgen]
impl WebGame {
    /// Fresh game with stored settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        WebGame {
            session: Session::new(World::default(), TierTable::default(), Settings::load()),
            load_error: None,
        }
    }

    /// Game restored from a share token
    pub fn from_share_token(token: &str) -> Result<WebGame, JsValue> {
        let session = Session::restore_from_link(
            World::default(),
            TierTable::default(),
            Settings::load(),
            token,
        )
        .map_err(to_js)?;
        Ok(WebGame {
            session,
            load_error: None,
        })
    }

    /// Restore from the page URL if it carries a share token, else start fresh.
    /// A bad token still starts a fresh game; check `load_error` afterwards.
    pub fn from_page() -> WebGame {
        let href = location().and_then(|l| l.href().ok()).unwrap_or_default();
        let (session, err) = Session::from_link_or_new(
            World::default,
            TierTable::default(),
            Settings::load(),
            &href,
        );
        let load_error = err.map(|err| {
            log::warn!("{err}");
            err.user_message().to_owned()
        });
        WebGame {
            session,
            load_error,
        }
    }

    /// Message to show the player if the shared game in the URL was rejected
    pub fn load_error(&self) -> Option<String> {
        self.load_error.clone()
    }

    /// Drop a fruit at a canvas x coordinate
    pub fn drop_fruit(&mut self, x: f32) -> Result<(), JsValue> {
        self.session.on_drop(x).map(|_| ()).map_err(to_js)
    }

    /// Set a tier's image (data URI); an empty string restores the default
    pub fn upload_image(&mut self, tier: usize, payload: String) -> Result<(), JsValue> {
        self.session.on_image_upload(tier, payload).map_err(to_js)
    }

    pub fn score(&self) -> f64 {
        self.session.current_score() as f64
    }

    pub fn tier_count(&self) -> usize {
        self.session.tiers().tier_count()
    }

    /// Share link rooted at the page origin
    pub fn share_link(&self) -> Result<String, JsValue> {
        let origin = location()
            .and_then(|l| l.origin().ok())
            .unwrap_or_default();
        self.session.request_share_link(&origin).map_err(to_js)
    }

    pub fn share_link_with_base(&self, base_url: &str) -> Result<String, JsValue> {
        self.session.request_share_link(base_url).map_err(to_js)
    }

    /// Advance by a frame delta (seconds). Returns fixed steps run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.session.advance(dt)
    }

    /// Flat `[x, y, radius, tier]` per live piece, in handle order
    pub fn pieces(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.session.piece_count() * 4);
        for piece in self.session.pieces() {
            let Some(body) = self.session.engine().body(piece.handle) else {
                continue;
            };
            out.push(body.pos.x);
            out.push(body.pos.y);
            out.push(body.shape.circle_radius().unwrap_or(0.0));
            out.push(piece.tier as f32);
        }
        out
    }

    /// Texture source per live piece, same order as `pieces`
    pub fn sprites(&self) -> Vec<String> {
        self.session
            .pieces()
            .filter_map(|piece| self.session.engine().body(piece.handle))
            .map(|body| body.sprite.as_ref().map(|s| s.source().to_owned()).unwrap_or_default())
            .collect()
    }

    /// Merges since the last call, as JSON
    pub fn drain_events(&mut self) -> String {
        serde_json::to_string(&self.session.drain_events()).unwrap_or_else(|_| "[]".into())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

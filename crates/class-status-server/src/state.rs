//! Application state for the HTTP server.

use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use class_status::{Clock, MemoryStore, ScheduleExtractor, Seed, SystemClock};
use tracing::info;

use crate::auth::{StaticTokens, TokenVerifier};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<dyn TokenVerifier>,
    /// Source of "now" for status checks and invites.
    pub clock: Arc<dyn Clock>,
    /// Image-to-schedule service behind `POST /schedule/upload`.
    pub extractor: Option<Arc<dyn ScheduleExtractor>>,
}

impl AppState {
    pub fn new(
        store: Arc<MemoryStore>,
        tokens: Arc<dyn TokenVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            clock,
            extractor: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ScheduleExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build a store and token table from seed data, on the system clock.
    pub fn from_seed(seed: &Seed) -> anyhow::Result<Self> {
        Self::from_seed_with_clock(seed, Arc::new(SystemClock))
    }

    pub fn from_seed_with_clock(seed: &Seed, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        let ids = store.load_seed(seed).context("Failed to load seed data")?;

        let mut tokens = StaticTokens::new();
        for user in &seed.users {
            if let (Some(token), Some(&id)) = (&user.token, ids.get(&user.username)) {
                tokens.insert(token.clone(), id);
            }
        }
        info!(tokens = tokens.len(), "token table ready");

        Ok(Self::new(Arc::new(store), Arc::new(tokens), clock))
    }

    /// Read a seed file from disk and build state from it.
    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let text = read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        let seed = Seed::from_json(&text)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))?;
        Self::from_seed(&seed)
    }
}

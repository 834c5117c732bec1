//! Application state: the item factory, issued items, learner progress and
//! selection logic.
//!
//! This module owns:
//!   - the shared `ItemFactory` (immutable after startup)
//!   - issued items by id, so attempts and hints can find them
//!   - the mastery tracker and review queue
//!   - the resolved configuration (TOML or defaults)
//!
//! Selection asks the curriculum for a difficulty, generates with bounded
//! retries and falls back to a built-in item when generation is exhausted.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{resolve_config, TutorConfig};
use crate::curriculum::Curriculum;
use crate::domain::Item;
use crate::error::{GenerationError, TemplateError};
use crate::factory::ItemFactory;
use crate::mastery::MasteryTracker;
use crate::review::ReviewScheduler;
use crate::seeds::{hard_fallback_item, seed_items};
use crate::skills::SkillRegistry;
use crate::templates::TemplateStore;
use crate::validator::Moderation;

/// Difficulty for a skill with no history.
pub const STARTING_DIFFICULTY: u8 = 2;

/// Issued items kept for attempts and hints before the oldest is evicted.
pub const ISSUED_CAPACITY: usize = 4096;

/// Issued items by id, bounded; inserting past capacity evicts the oldest.
#[derive(Debug)]
pub struct IssuedItems {
    capacity: usize,
    by_id: HashMap<String, Item>,
    order: VecDeque<String>,
}

impl IssuedItems {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, by_id: HashMap::new(), order: VecDeque::new() }
    }

    /// Store `item`; re-issuing a known id refreshes it in place.
    pub fn insert(&mut self, item: Item) {
        let id = item.id.clone();
        if self.by_id.insert(id.clone(), item).is_some() {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.by_id.remove(&old);
                debug!(target: "item", id = %old, "Evicted issued item");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<ItemFactory>,
    pub config: TutorConfig,
    pub curriculum: Curriculum,
    pub issued: Arc<RwLock<IssuedItems>>,
    pub mastery: Arc<RwLock<MasteryTracker>>,
    pub reviews: Arc<RwLock<ReviewScheduler>>,
}

impl AppState {
    /// Build state from env: resolve config, load templates, seed fallback items.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self, TemplateError> {
        let config = resolve_config();
        let store = TemplateStore::load_dir(&config.generation.templates_dir).map_err(|e| {
            error!(target: "teks_tutor", dir = %config.generation.templates_dir, error = %e, "Failed to load templates");
            e
        })?;
        Ok(Self::from_store(store, config))
    }

    /// Build state around an already loaded template store.
    pub fn from_store(store: TemplateStore, config: TutorConfig) -> Self {
        let moderation = Moderation::with_extra(&config.moderation.extra_banned_terms);
        let factory = ItemFactory::new(store, SkillRegistry::builtin(), moderation);

        let mut issued = IssuedItems::with_capacity(ISSUED_CAPACITY);
        for item in seed_items() {
            issued.insert(item);
        }
        info!(target: "teks_tutor", templates = factory.templates().len(), seeded = issued.len(), "State ready");
        let mastery = MasteryTracker::new(config.mastery);

        Self {
            factory: Arc::new(factory),
            config,
            curriculum: Curriculum::default(),
            issued: Arc::new(RwLock::new(issued)),
            mastery: Arc::new(RwLock::new(mastery)),
            reviews: Arc::new(RwLock::new(ReviewScheduler::new())),
        }
    }

    /// Insert an item into the issued store.
    #[instrument(level = "debug", skip(self, item), fields(id = %item.id))]
    pub async fn insert_item(&self, item: Item) {
        self.issued.write().await.insert(item);
    }

    /// Read-only access to an issued item by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_item(&self, id: &str) -> Option<Item> {
        self.issued.read().await.get(id).cloned()
    }

    /// Difficulty to aim for next on `teks`, from its recent outcomes.
    pub async fn target_difficulty(&self, teks: &str) -> u8 {
        let mastery = self.mastery.read().await;
        let current = mastery.get(teks).map(|r| r.last_difficulty).unwrap_or(STARTING_DIFFICULTY);
        self.curriculum.next_difficulty(current, &mastery.recent(teks))
    }

    /// Selection policy:
    /// 1) template nearest the target difficulty, retrying seed-dependent failures
    /// 2) the skill's easiest template, when that is a different one
    /// 3) the built-in fallback item
    #[instrument(level = "info", skip(self), fields(%teks, seed))]
    pub async fn choose_item(&self, teks: &str, seed: u64) -> (Item, &'static str) {
        let difficulty = self.target_difficulty(teks).await;
        let attempts = self.config.generation.max_attempts;

        let near = self.factory.template_near_difficulty(teks, difficulty);
        let easiest = self.factory.template_for_teks(teks);
        if near.is_none() {
            warn!(target: "item", %teks, "No template for skill; using hard fallback");
        }

        if let Some(template) = near {
            match self.factory.generate_with_retries(&template.id, seed, attempts) {
                Ok(item) => {
                    info!(target: "item", %teks, chosen = %item.id, difficulty, source = "generated", "Generated item");
                    self.insert_item(item.clone()).await;
                    return (item, "generated");
                }
                Err(e) => {
                    error!(target: "item", %teks, template_id = %template.id, error = %e, "Generation failed");
                }
            }
        }

        if let Some(template) = easiest.filter(|t| near.map_or(true, |n| n.id != t.id)) {
            match self.factory.generate_with_retries(&template.id, seed, attempts) {
                Ok(item) => {
                    info!(target: "item", %teks, chosen = %item.id, source = "easiest_template", "Generated item");
                    self.insert_item(item.clone()).await;
                    return (item, "easiest_template");
                }
                Err(e) => {
                    error!(target: "item", %teks, template_id = %template.id, error = %e, "Easiest template failed too");
                }
            }
        }

        let item = hard_fallback_item(teks);
        self.insert_item(item.clone()).await;
        warn!(target: "item", %teks, chosen = %item.id, source = "hard_fallback", "Serving fallback item");
        (item, "hard_fallback")
    }

    /// Deterministic item for a named template; errors are returned, not masked.
    #[instrument(level = "info", skip(self), fields(%template_id, seed))]
    pub async fn item_for_template(&self, template_id: &str, seed: u64) -> Result<Item, GenerationError> {
        let item = self
            .factory
            .generate_with_retries(template_id, seed, self.config.generation.max_attempts)?;
        self.insert_item(item.clone()).await;
        Ok(item)
    }
}

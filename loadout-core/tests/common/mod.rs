//! tests/common/mod.rs
//!
//! Hand-rolled mock collaborators shared by the integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use loadout_common::Error;
use loadout_common::models::WorldPoint;
use loadout_common::traits::{
    GameClient, ProductsResponse, SpawnedObjectId, TransactionsResponse, TwitchApi,
};

// ---------- Mock game client ----------

#[derive(Debug, Clone, PartialEq)]
pub enum GameCall {
    Spawn { object: u64, model_id: i32 },
    Despawn { object: u64 },
    SetAnimation { object: u64, animation_id: i32 },
    SetLocation { object: u64 },
    SetActive { object: u64, active: bool },
    OverheadText(String),
    ChatMessage(String),
}

pub struct MockGameClient {
    pub logged_in: AtomicBool,
    next_object: AtomicU64,
    pub calls: Mutex<Vec<GameCall>>,
}

impl MockGameClient {
    pub fn new() -> Self {
        Self {
            logged_in: AtomicBool::new(true),
            next_object: AtomicU64::new(1),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> Vec<GameCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GameCall::ChatMessage(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn overhead_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GameCall::OverheadText(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn spawned_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GameCall::Spawn { .. }))
            .count()
    }

    pub fn despawned_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GameCall::Despawn { .. }))
            .count()
    }
}

impl GameClient for MockGameClient {
    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn local_player_location(&self) -> Option<WorldPoint> {
        if self.is_logged_in() {
            Some(WorldPoint {
                x: 3200,
                y: 3200,
                plane: 0,
            })
        } else {
            None
        }
    }

    fn spawn_object(&self, model_id: i32, _location: WorldPoint) -> SpawnedObjectId {
        let object = self.next_object.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push(GameCall::Spawn { object, model_id });
        object
    }

    fn despawn_object(&self, object: SpawnedObjectId) {
        self.calls.lock().unwrap().push(GameCall::Despawn { object });
    }

    fn set_animation(&self, object: SpawnedObjectId, animation_id: i32, _should_loop: bool) {
        self.calls.lock().unwrap().push(GameCall::SetAnimation {
            object,
            animation_id,
        });
    }

    fn set_location(&self, object: SpawnedObjectId, _location: WorldPoint) {
        self.calls.lock().unwrap().push(GameCall::SetLocation { object });
    }

    fn set_active(&self, object: SpawnedObjectId, active: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(GameCall::SetActive { object, active });
    }

    fn set_overhead_text(&self, text: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(GameCall::OverheadText(text.to_string()));
    }

    fn queue_chat_message(&self, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(GameCall::ChatMessage(message.to_string()));
    }
}

// ---------- Mock EBS API ----------

pub struct MockTwitchApi {
    pub transactions: Mutex<TransactionsResponse>,
    pub products: Mutex<ProductsResponse>,
    pub segment: Mutex<serde_json::Value>,
    pub last_since: Mutex<Option<DateTime<Utc>>>,
}

impl MockTwitchApi {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(TransactionsResponse {
                status: true,
                message: String::new(),
                transactions: vec![],
            }),
            products: Mutex::new(ProductsResponse {
                status: true,
                message: String::new(),
                products: vec![],
                durations: vec![],
            }),
            segment: Mutex::new(serde_json::json!({ "streamerProducts": [] })),
            last_since: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TwitchApi for MockTwitchApi {
    async fn get_ebs_transactions(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<TransactionsResponse, Error> {
        *self.last_since.lock().unwrap() = since;
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn get_ebs_products(&self) -> Result<ProductsResponse, Error> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn get_configuration_segment(&self) -> Result<serde_json::Value, Error> {
        Ok(self.segment.lock().unwrap().clone())
    }
}

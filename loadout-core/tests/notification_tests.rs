//! tests/notification_tests.rs
//!
//! Notification scheduler behaviour: throttling, lock extension, overhead
//! clearing, suppression for torn-down products and queue bounds.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use common::MockGameClient;
use loadout_common::models::{
    EbsEffect, EbsNotification, EbsProduct, NotificationKind, NotificationTiming, StreamerProduct,
    TwitchProductCost, TwitchProductData, TwitchTransaction,
};
use loadout_common::time::{Clock, ManualClock};
use loadout_core::config::MarketplaceConfig;
use loadout_core::marketplace::{MarketplaceProduct, NotificationManager, SharedProduct};

struct Harness {
    manager: NotificationManager,
    game: Arc<MockGameClient>,
    clock: Arc<ManualClock>,
}

fn harness(config: MarketplaceConfig) -> Harness {
    let clock = ManualClock::new(Utc::now());
    let game = Arc::new(MockGameClient::new());
    let manager = NotificationManager::new(game.clone(), clock.clone(), config);
    Harness {
        manager,
        game,
        clock,
    }
}

fn notification(
    message: Option<&str>,
    kind: NotificationKind,
    timing: NotificationTiming,
) -> EbsNotification {
    EbsNotification {
        message: message.map(str::to_string),
        message_type: kind,
        timing_type: timing,
    }
}

fn product(h: &Harness, cost: Option<TwitchProductCost>) -> SharedProduct {
    let transaction = TwitchTransaction {
        id: "t1".to_string(),
        user_name: "bob".to_string(),
        product_sku: None,
        product_data: Some(TwitchProductData {
            sku: "sku-1".to_string(),
            display_name: None,
            cost,
        }),
        received_at: h.clock.now(),
    };
    let streamer_product = StreamerProduct {
        twitch_product_sku: "sku-1".to_string(),
        ebs_product_id: "p1".to_string(),
        name: "Effect".to_string(),
        duration_s: None,
    };
    let ebs_product = EbsProduct {
        id: "p1".to_string(),
        enabled: true,
        name: None,
        effect: EbsEffect::default(),
        durations: vec![],
    };
    MarketplaceProduct::new(transaction, streamer_product, ebs_product, h.clock.now())
        .into_shared()
}

#[test]
fn chat_notifications_are_throttled_one_group_per_window() {
    let h = harness(MarketplaceConfig::default());
    let p = product(&h, None);

    let first = notification(Some("first"), NotificationKind::Chat, NotificationTiming::Start);
    let second = notification(Some("second"), NotificationKind::Chat, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&first));
    h.manager.queue_notifications(&p, std::slice::from_ref(&second));

    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["first"]);

    // still within the one-second chat lock
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["first"]);

    h.clock.advance(Duration::milliseconds(1_000));
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["first", "second"]);
}

#[test]
fn shorter_lock_never_moves_the_unlock_time_earlier() {
    let h = harness(MarketplaceConfig::default());
    let p = product(&h, None);

    let overhead = notification(Some("big"), NotificationKind::Overhead, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&overhead));
    h.manager.on_game_tick();
    assert_eq!(h.game.overhead_texts(), vec!["big"]);

    // an immediate notification fires regardless of the lock, and its
    // shorter chat lock must not shorten the three-second overhead lock
    let now_chat = notification(Some("now"), NotificationKind::Chat, NotificationTiming::Now);
    h.manager.queue_notifications(&p, std::slice::from_ref(&now_chat));
    assert_eq!(h.game.chat_messages(), vec!["now"]);

    let queued = notification(Some("later"), NotificationKind::Chat, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&queued));

    h.clock.advance(Duration::milliseconds(1_500));
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["now"], "overhead lock still held");

    h.clock.advance(Duration::milliseconds(1_500));
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["now", "later"]);
}

#[test]
fn overhead_text_is_cleared_after_its_display_window() {
    let h = harness(MarketplaceConfig::default());
    let p = product(&h, None);

    let overhead = notification(Some("hello"), NotificationKind::Overhead, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&overhead));
    h.manager.on_game_tick();
    assert_eq!(h.game.overhead_texts(), vec!["hello"]);

    h.clock.advance(Duration::milliseconds(1_999));
    h.manager.on_game_tick();
    assert_eq!(h.game.overhead_texts(), vec!["hello"], "window not over yet");

    h.clock.advance(Duration::milliseconds(1));
    h.manager.on_game_tick();
    assert_eq!(h.game.overhead_texts(), vec!["hello", ""]);
}

#[test]
fn notifications_for_stopped_products_are_suppressed() {
    let h = harness(MarketplaceConfig::default());
    let p = product(&h, None);
    p.lock().stop(&*h.game, h.clock.now());

    let start = notification(Some("start"), NotificationKind::Chat, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&start));
    h.manager.on_game_tick();
    assert!(h.game.chat_messages().is_empty());
}

#[test]
fn end_notifications_stay_valid_within_the_grace_window() {
    let h = harness(MarketplaceConfig::default());
    let p = product(&h, None);
    p.lock().stop(&*h.game, h.clock.now());

    let end = notification(Some("bye"), NotificationKind::Chat, NotificationTiming::End);

    h.clock.advance(Duration::milliseconds(1_000));
    h.manager.queue_notifications(&p, std::slice::from_ref(&end));
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["bye"]);

    // past the seven-second grace window the announcement is stale
    h.clock.advance(Duration::milliseconds(7_000));
    h.manager.queue_notifications(&p, std::slice::from_ref(&end));
    h.manager.on_game_tick();
    assert_eq!(h.game.chat_messages(), vec!["bye"]);
}

#[test]
fn missing_message_composes_the_default_thank_you_line() {
    let h = harness(MarketplaceConfig::default());
    let p = product(
        &h,
        Some(TwitchProductCost {
            amount: 5,
            cost_type: "bits".to_string(),
        }),
    );

    let chat = notification(None, NotificationKind::Chat, NotificationTiming::Start);
    h.manager.queue_notifications(&p, std::slice::from_ref(&chat));
    h.manager.on_game_tick();

    assert_eq!(
        h.game.chat_messages(),
        vec!["Thank you bob for donating 5 bits!"]
    );
}

#[test]
fn full_queue_evicts_the_oldest_group() {
    let config = MarketplaceConfig {
        notification_queue_size: 2,
        ..Default::default()
    };
    let h = harness(config);
    let p = product(&h, None);

    for text in ["one", "two", "three"] {
        let n = notification(Some(text), NotificationKind::Chat, NotificationTiming::Start);
        h.manager.queue_notifications(&p, std::slice::from_ref(&n));
    }
    assert_eq!(h.manager.queued_group_count(), 2);

    h.manager.on_game_tick();
    h.clock.advance(Duration::milliseconds(1_000));
    h.manager.on_game_tick();

    assert_eq!(h.game.chat_messages(), vec!["two", "three"]);
}

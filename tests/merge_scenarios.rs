//! End-to-end merge scenarios through the public session API

use fruit_merge::physics::{Sprite, World};
use fruit_merge::sim::{Session, Tier, TierTable};
use fruit_merge::Settings;
use glam::Vec2;

fn three_tiers() -> TierTable {
    TierTable::new(vec![Tier::new(15.0, 1), Tier::new(20.0, 2), Tier::new(25.0, 3)]).unwrap()
}

fn weightless(tiers: TierTable) -> Session {
    Session::new(World::new(Vec2::ZERO), tiers, Settings::default())
}

#[test]
fn test_three_tier_scenario() {
    let mut session = weightless(three_tiers());

    // Two tier-0 pieces touching -> one tier-1, score 1
    session.spawn_at(0, Vec2::new(100.0, 300.0)).unwrap();
    session.spawn_at(0, Vec2::new(110.0, 300.0)).unwrap();
    assert_eq!(session.step(), 1);
    assert_eq!(session.current_score(), 1);
    let pieces: Vec<_> = session.pieces().collect();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].tier, 1);

    // With a fresh tier-1 piece -> tier-2, score 1 + 2
    session.spawn_at(1, Vec2::new(130.0, 300.0)).unwrap();
    assert_eq!(session.step(), 1);
    assert_eq!(session.current_score(), 3);
    let pieces: Vec<_> = session.pieces().collect();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].tier, 2);

    // Two max-tier pieces only collide
    let last = pieces[0];
    let other = session.spawn_at(2, Vec2::new(160.0, 300.0)).unwrap();
    for _ in 0..60 {
        assert_eq!(session.step(), 0);
    }
    assert_eq!(session.current_score(), 3);
    assert_eq!(session.piece_count(), 2);
    assert!(session.pieces().any(|p| p == last));
    assert!(session.pieces().any(|p| p == other));
}

#[test]
fn test_merge_events_report_tiers() {
    let mut session = weightless(three_tiers());
    let a = session.spawn_at(0, Vec2::new(200.0, 200.0)).unwrap();
    let b = session.spawn_at(0, Vec2::new(220.0, 200.0)).unwrap();
    session.step();

    let events = session.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].consumed, [a.handle, b.handle]);
    assert_eq!(events[0].from_tier, 0);
    assert_eq!(events[0].credited, 1);
    assert!((events[0].position - Vec2::new(210.0, 200.0)).length() < 0.01);
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_custom_image_applies_to_its_tier_only() {
    let mut session = weightless(three_tiers());
    session.on_image_upload(2, "X").unwrap();

    let big = session.spawn_at(2, Vec2::new(100.0, 100.0)).unwrap();
    let mid = session.spawn_at(1, Vec2::new(300.0, 100.0)).unwrap();

    let sprite = |handle| session.engine().body(handle).and_then(|b| b.sprite.clone());
    assert_eq!(sprite(big.handle), Some(Sprite::Custom("X".into())));
    assert_eq!(sprite(mid.handle), Some(Sprite::Asset("fruit1.png".into())));
}

#[test]
fn test_merged_piece_uses_custom_image() {
    let mut session = weightless(three_tiers());
    session.on_image_upload(1, "cherry-upgrade").unwrap();
    session.spawn_at(0, Vec2::new(100.0, 300.0)).unwrap();
    session.spawn_at(0, Vec2::new(110.0, 300.0)).unwrap();
    session.step();

    let merged = session.pieces().next().unwrap();
    assert_eq!(
        session.engine().body(merged.handle).and_then(|b| b.sprite.clone()),
        Some(Sprite::Custom("cherry-upgrade".into()))
    );
}

#[test]
fn test_dropped_fruit_stack_and_merge() {
    let mut session: Session =
        Session::new(World::default(), TierTable::default(), Settings::default());

    session.on_drop(200.0).unwrap();
    // Let the first fruit land
    for _ in 0..40 {
        session.advance(0.05);
    }
    assert_eq!(session.current_score(), 0);

    session.on_drop(200.0).unwrap();
    for _ in 0..100 {
        session.advance(0.05);
    }

    assert_eq!(session.current_score(), 1);
    let pieces: Vec<_> = session.pieces().collect();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].tier, 1);
    let pos = session.position(pieces[0]).unwrap();
    assert!(pos.y > 500.0 && pos.y < 600.0, "merged piece at {pos}");
}

#[test]
fn test_share_then_restore_keeps_score() {
    let mut session = weightless(three_tiers());
    session.spawn_at(0, Vec2::new(100.0, 300.0)).unwrap();
    session.spawn_at(0, Vec2::new(110.0, 300.0)).unwrap();
    session.step();
    session.on_image_upload(0, "data:image/png;base64,AAAA").unwrap();

    let link = session.request_share_link("https://fruit.example/").unwrap();
    let token = link.split_once("?game=").map(|(_, t)| t).unwrap();

    let restored =
        Session::restore_from_link(World::default(), three_tiers(), Settings::default(), token)
            .unwrap();
    assert_eq!(restored.current_score(), 1);
    assert_eq!(restored.customization().get_image(0), Some("data:image/png;base64,AAAA"));
    assert_eq!(restored.piece_count(), 0);
}

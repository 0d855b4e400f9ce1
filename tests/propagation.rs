use status_core::{
    entity::{EntitySpec, Position},
    notify::Notification,
    status::{EffectKind, EndCause, StartRequest},
};

mod common;

use common::{engine, plain};

/// 보호 대상의 Devotion 은 시전자가 사라진 뒤 다음 링크 확인에서 끝난다.
#[test]
fn devotion_is_torn_down_after_partner_removal() {
    let mut engine = engine(1);
    let crusader = engine.spawn(EntitySpec::player(plain()).party(7));
    let ward = engine.spawn(
        EntitySpec::player(plain())
            .party(7)
            .at(Position::new(1, 1)),
    );

    // Given
    engine
        .start_effect(ward, StartRequest::new(EffectKind::Devotion).partner(crusader))
        .unwrap();

    // When
    engine.despawn(crusader).unwrap();
    engine.advance(5_000);

    // Then: 종료 알림은 정확히 한 번
    let ended: Vec<EndCause> = engine
        .observer()
        .notifications()
        .filter_map(|n| match n {
            Notification::EffectEnded {
                entity,
                kind: EffectKind::Devotion,
                cause,
            } if *entity == ward => Some(*cause),
            _ => None,
        })
        .collect();
    assert_eq!(ended, vec![EndCause::LinkBroken]);
    assert!(!engine.entity(ward).unwrap().effects().has(EffectKind::Devotion));
}

/// 한쪽 BladeStop 이 끝나면 상대 BladeStop 도 끝난다.
#[test]
fn blade_stop_ends_both_sides() {
    let mut engine = engine(1);
    let monk = engine.spawn(EntitySpec::player(plain()));
    let attacker = engine.spawn(EntitySpec::monster(plain()).at(Position::new(1, 0)));

    engine
        .start_effect(monk, StartRequest::new(EffectKind::BladeStop).partner(attacker))
        .unwrap();
    assert!(!engine.entity(attacker).unwrap().can_act());
    assert!(!engine.entity(monk).unwrap().can_act());

    engine
        .end_effect(attacker, EffectKind::BladeStop, EndCause::Cancelled)
        .unwrap();

    assert!(!engine.entity(monk).unwrap().effects().has(EffectKind::BladeStop));
    assert_eq!(engine.observer().ended(monk, EffectKind::BladeStop), 1);
    assert_eq!(engine.observer().ended(attacker, EffectKind::BladeStop), 1);
}

/// 자기 자신에게 거는 오라: 주변 아군은 사본을 받고, 사본은 다시 퍼지지 않는다.
#[test]
fn battle_orders_reaches_party_and_companions() {
    let mut engine = engine(1);
    let leader = engine.spawn(EntitySpec::player(plain()).party(3));
    let member = engine.spawn(EntitySpec::player(plain()).party(3).at(Position::new(5, 5)));
    let pet = engine.spawn(EntitySpec::companion(plain(), leader).at(Position::new(1, 0)));
    let outsider = engine.spawn(EntitySpec::player(plain()).at(Position::new(2, 2)));

    engine
        .start_effect(leader, StartRequest::new(EffectKind::BattleOrders))
        .unwrap();

    for id in [member, pet] {
        let copy = engine
            .entity(id)
            .unwrap()
            .effects()
            .get(EffectKind::BattleOrders)
            .unwrap();
        assert!(copy.relayed);
        assert_eq!(copy.source, Some(leader));
        assert_eq!(engine.get_derived_stats(id).unwrap().str, 6);
    }
    assert!(!engine.entity(outsider).unwrap().effects().has(EffectKind::BattleOrders));
    assert!(!engine
        .entity(leader)
        .unwrap()
        .effects()
        .get(EffectKind::BattleOrders)
        .unwrap()
        .relayed);

    engine
        .end_effect(leader, EffectKind::BattleOrders, EndCause::Cancelled)
        .unwrap();
    assert!(!engine.entity(member).unwrap().effects().has(EffectKind::BattleOrders));
    assert!(!engine.entity(pet).unwrap().effects().has(EffectKind::BattleOrders));
}

/// 오라 사본은 시전자 범위를 벗어나면 갱신되지 않고 만료된다.
#[test]
fn aura_copy_expires_out_of_range() {
    let mut engine = engine(1);
    let priest = engine.spawn(EntitySpec::player(plain()).party(1));
    let ally = engine.spawn(EntitySpec::player(plain()).party(1).at(Position::new(1, 0)));

    engine
        .start_effect(priest, StartRequest::new(EffectKind::Gospel))
        .unwrap();
    engine.set_position(ally, Position::new(40, 0)).unwrap();
    engine.advance(15_000);

    assert!(!engine.entity(ally).unwrap().effects().has(EffectKind::GospelBlessing));
    assert!(engine.entity(priest).unwrap().effects().has(EffectKind::Gospel));
}

use status_core::{
    entity::{BaseAttributes, Element, EntitySpec},
    status::{EffectKind, Rejected, StartOutcome, StartRequest, TimerService},
};

mod common;

use common::{engine, plain, spec_from_ron};

/// 언데드 속성은 빙결에 면역이고, 거절되면 효과 테이블이 그대로여야 한다.
#[test]
fn undead_rejects_freeze_and_table_is_unchanged() {
    let mut engine = engine(1);

    // Given: RON 으로 정의한 언데드 몬스터
    let ghoul = engine.spawn(spec_from_ron(
        "(entity_type: Monster, base: (max_hp: 500), element: Undead, race: Undead)",
    ));
    engine
        .start_effect(ghoul, StartRequest::new(EffectKind::Blessing))
        .unwrap();
    let before = engine.entity(ghoul).unwrap().effects().kinds_sorted();

    // When
    let result = engine.start_effect(ghoul, StartRequest::new(EffectKind::Freeze));

    // Then
    assert_eq!(result, Err(Rejected::Immune));
    assert_eq!(engine.entity(ghoul).unwrap().effects().kinds_sorted(), before);
    assert_eq!(engine.entity(ghoul).unwrap().element(), Element::Undead);
}

/// 레벨 2 Slow 위에 레벨 1 은 거절, 레벨 3 은 교체 + 타이머 재등록
#[test]
fn slow_refresh_versus_reject() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));

    // Given
    engine
        .start_effect(id, StartRequest::new(EffectKind::Slow).level(2).duration(10_000))
        .unwrap();
    engine.advance(4_000);

    // When: 약한 요청
    let weaker = engine.start_effect(id, StartRequest::new(EffectKind::Slow).level(1));

    // Then
    assert_eq!(weaker, Err(Rejected::Overridden));
    assert_eq!(
        engine
            .entity(id)
            .unwrap()
            .effects()
            .get(EffectKind::Slow)
            .unwrap()
            .level(),
        2
    );

    // When: 강한 요청
    let stronger = engine
        .start_effect(id, StartRequest::new(EffectKind::Slow).level(3).duration(10_000))
        .unwrap();

    // Then: 새 지속시간 기준으로 만료 시각이 다시 잡힌다.
    assert_eq!(stronger.outcome, StartOutcome::Refreshed);
    let slow = engine.entity(id).unwrap().effects().get(EffectKind::Slow).unwrap();
    assert_eq!(slow.level(), 3);
    assert_eq!(slow.expires_at_ms, Some(14_000));
    assert_eq!(engine.timers().pending(), 1);

    engine.advance(10_000);
    assert!(engine.entity(id).unwrap().effects().has(EffectKind::Slow));
    engine.advance(14_000);
    assert!(!engine.entity(id).unwrap().effects().has(EffectKind::Slow));
}

/// 저항이 아무리 높아도 지속시간은 하한 아래로 내려가지 않는다.
#[test]
fn bleeding_duration_never_drops_below_floor() {
    let mut engine = engine(1);
    let tough = engine.spawn(EntitySpec::player(BaseAttributes {
        vit: 90,
        ..plain()
    }));

    let applied = engine
        .start_effect(tough, StartRequest::new(EffectKind::Bleeding).unconditional())
        .unwrap();

    assert_eq!(applied.duration_ms, Some(50_000));
}

/// 주기 효과도 하한까지는 살아 있다. 틱 간격이 하한과 맞지 않아도 만료는 하한 시각.
#[test]
fn deadly_poison_stays_until_its_floor() {
    let mut engine = engine(1);
    let tough = engine.spawn(EntitySpec::player(BaseAttributes {
        vit: 90,
        ..plain()
    }));

    // Given: 2초 간격, 하한 3초
    let applied = engine
        .start_effect(tough, StartRequest::new(EffectKind::DeadlyPoison).unconditional())
        .unwrap();
    assert_eq!(applied.duration_ms, Some(3_000));
    let poison = engine
        .entity(tough)
        .unwrap()
        .effects()
        .get(EffectKind::DeadlyPoison)
        .unwrap();
    assert_eq!(poison.expires_at_ms, Some(3_000));

    // When: 하한 직전
    engine.advance(2_999);

    // Then
    assert!(engine.entity(tough).unwrap().effects().has(EffectKind::DeadlyPoison));
    assert_eq!(engine.observer().ticks(tough, EffectKind::DeadlyPoison).len(), 1);

    engine.advance(3_000);
    assert!(!engine.entity(tough).unwrap().effects().has(EffectKind::DeadlyPoison));
    assert_eq!(engine.observer().ended(tough, EffectKind::DeadlyPoison), 1);
    assert_eq!(engine.timers().pending(), 0);
}

/// 틱 간격보다 짧은 고정 지속시간은 틱 없이 제 시각에 끝난다.
#[test]
fn short_fixed_poison_never_outlives_its_duration() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));

    let applied = engine
        .start_effect(
            id,
            StartRequest::new(EffectKind::Poison)
                .duration(1_000)
                .unconditional()
                .fixed_duration(),
        )
        .unwrap();
    assert_eq!(applied.duration_ms, Some(1_000));

    engine.advance(999);
    assert!(engine.entity(id).unwrap().effects().has(EffectKind::Poison));

    engine.advance(1_000);
    assert!(!engine.entity(id).unwrap().effects().has(EffectKind::Poison));
    assert!(engine.observer().ticks(id, EffectKind::Poison).is_empty());
    assert_eq!(engine.entity(id).unwrap().hp(), 1000);
}

/// 아주 긴 지속시간도 넘치지 않고 받아들여진다.
#[test]
fn huge_durations_are_accepted() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));

    let blessing = engine
        .start_effect(id, StartRequest::new(EffectKind::Blessing).duration(u64::MAX))
        .unwrap();
    assert_eq!(blessing.duration_ms, Some(u64::MAX));

    assert!(engine
        .start_effect(
            id,
            StartRequest::new(EffectKind::Stun)
                .duration(u64::MAX / 2)
                .unconditional()
        )
        .is_ok());
    assert!(engine
        .start_effect(
            id,
            StartRequest::new(EffectKind::Poison)
                .duration(u64::MAX)
                .unconditional()
        )
        .is_ok());

    engine.advance(10_000_000);

    let effects = engine.entity(id).unwrap().effects();
    assert!(effects.has(EffectKind::Blessing));
    assert!(effects.has(EffectKind::Stun));
    assert!(effects.has(EffectKind::Poison));
    assert_eq!(
        effects.get(EffectKind::Blessing).unwrap().expires_at_ms,
        Some(u64::MAX)
    );
}

#[test]
fn fixed_duration_skips_reduction() {
    let mut engine = engine(1);
    let tough = engine.spawn(EntitySpec::player(BaseAttributes {
        vit: 50,
        ..plain()
    }));

    let applied = engine
        .start_effect(
            tough,
            StartRequest::new(EffectKind::Stun)
                .duration(4_000)
                .unconditional()
                .fixed_duration(),
        )
        .unwrap();

    assert_eq!(applied.duration_ms, Some(4_000));
}

/// 저항 100% 이상이면 면역
#[test]
fn full_resistance_is_immunity() {
    let mut engine = engine(1);
    let wall = engine.spawn(EntitySpec::player(BaseAttributes {
        vit: 97,
        ..plain()
    }));

    assert_eq!(
        engine.start_effect(wall, StartRequest::new(EffectKind::Stun)),
        Err(Rejected::Immune)
    );
    assert!(engine
        .start_effect(wall, StartRequest::new(EffectKind::Stun).unconditional())
        .is_ok());
}

#[test]
fn quickening_is_blocked_while_agility_is_decreased() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));
    engine
        .start_effect(id, StartRequest::new(EffectKind::DecreaseAgi).unconditional())
        .unwrap();

    for kind in [
        EffectKind::TwoHandQuicken,
        EffectKind::SpearsQuicken,
        EffectKind::Adrenaline,
    ] {
        assert_eq!(
            engine.start_effect(id, StartRequest::new(kind)),
            Err(Rejected::Blocked)
        );
    }
}

#[test]
fn blessing_lifts_curse() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));
    engine
        .start_effect(id, StartRequest::new(EffectKind::Curse).unconditional())
        .unwrap();
    assert_eq!(engine.get_derived_stats(id).unwrap().luk, 0);

    engine
        .start_effect(id, StartRequest::new(EffectKind::Blessing))
        .unwrap();

    assert!(!engine.entity(id).unwrap().effects().has(EffectKind::Curse));
    assert_eq!(engine.get_derived_stats(id).unwrap().speed, 150);
}

#[test]
fn silence_blocks_casting_but_not_movement() {
    let mut engine = engine(1);
    let id = engine.spawn(EntitySpec::player(plain()));

    engine
        .start_effect(id, StartRequest::new(EffectKind::Silence).unconditional())
        .unwrap();

    let entity = engine.entity(id).unwrap();
    assert!(!entity.can_cast());
    assert!(entity.can_act());
    assert!(entity.can_move());
}

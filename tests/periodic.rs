use status_core::{
    entity::EntitySpec,
    notify::{Notification, TickOutcome},
    status::{EffectKind, EndCause, StartRequest, TimerService},
};

mod common;

use common::{counting_engine, plain, CountingTimers};

/// 9초 독, 3초 간격: 틱 3번 후 한 번만 만료된다.
#[test]
fn poison_ticks_three_times_then_expires_once() {
    let mut engine = counting_engine(CountingTimers::default());
    let id = engine.spawn(EntitySpec::player(plain()));

    // Given
    engine
        .start_effect(
            id,
            StartRequest::new(EffectKind::Poison)
                .duration(9_000)
                .unconditional()
                .fixed_duration(),
        )
        .unwrap();

    // When
    engine.advance(30_000);

    // Then: 틱 알림 3개가 순서대로, 그 다음 종료 알림 하나
    let poison_events: Vec<&Notification> = engine
        .observer()
        .notifications()
        .filter(|n| {
            matches!(
                n,
                Notification::PeriodicTick { kind: EffectKind::Poison, .. }
                    | Notification::EffectEnded { kind: EffectKind::Poison, .. }
            )
        })
        .collect();
    assert_eq!(poison_events.len(), 4);
    for tick in &poison_events[..3] {
        assert!(matches!(
            tick,
            Notification::PeriodicTick {
                outcome: TickOutcome::Damaged { amount: 30 },
                ..
            }
        ));
    }
    assert!(matches!(
        poison_events[3],
        Notification::EffectEnded {
            cause: EndCause::Expired,
            ..
        }
    ));

    let tick_times: Vec<u64> = engine
        .observer()
        .entries
        .iter()
        .filter(|e| matches!(e.notification, Notification::PeriodicTick { .. }))
        .map(|e| e.time_ms)
        .collect();
    assert_eq!(tick_times, vec![3_000, 6_000, 9_000]);

    let timers = engine.timers();
    assert_eq!((timers.scheduled, timers.fired, timers.cancelled), (3, 3, 0));
    assert_eq!(timers.pending(), 0);
}

/// 같은 슬롯을 여러 번 갱신해도 살아있는 타이머는 하나다.
#[test]
fn refreshing_keeps_a_single_live_timer() {
    let mut engine = counting_engine(CountingTimers::default());
    let id = engine.spawn(EntitySpec::player(plain()));

    for _ in 0..5 {
        engine
            .start_effect(id, StartRequest::new(EffectKind::Slow).duration(10_000))
            .unwrap();
    }

    assert_eq!(engine.timers().scheduled, 5);
    assert_eq!(engine.timers().cancelled, 4);
    assert_eq!(engine.timers().pending(), 1);

    engine.advance(10_000);
    assert_eq!(engine.timers().fired, 1);
    assert_eq!(engine.observer().ended(id, EffectKind::Slow), 1);
}

/// 취소가 반영되지 않은 옛 타이머가 만료돼도 새 인스턴스는 그대로다.
#[test]
fn stale_timer_does_not_end_the_replacement() {
    let mut engine = counting_engine(CountingTimers::ignoring_cancel());
    let id = engine.spawn(EntitySpec::player(plain()));

    // Given: 0ms 에 10초, 5000ms 에 다시 10초
    engine
        .start_effect(id, StartRequest::new(EffectKind::Slow).duration(10_000))
        .unwrap();
    engine.advance(5_000);
    engine
        .start_effect(id, StartRequest::new(EffectKind::Slow).duration(10_000))
        .unwrap();

    // When: 옛 타이머 만료 시각
    engine.advance(10_000);

    // Then
    assert_eq!(engine.timers().fired, 1);
    assert!(engine.entity(id).unwrap().effects().has(EffectKind::Slow));
    assert_eq!(engine.observer().ended(id, EffectKind::Slow), 0);

    engine.advance(15_000);
    assert_eq!(engine.observer().ended(id, EffectKind::Slow), 1);
}

#[test]
fn cloaking_drains_sp_every_interval() {
    let mut engine = counting_engine(CountingTimers::default());
    let id = engine.spawn(EntitySpec::player(plain()));

    engine
        .start_effect(id, StartRequest::new(EffectKind::Cloaking))
        .unwrap();
    engine.advance(9_000);

    assert_eq!(
        engine.observer().ticks(id, EffectKind::Cloaking),
        vec![TickOutcome::Drained { amount: 1 }; 3]
    );
    assert_eq!(engine.entity(id).unwrap().sp(), 97);
}

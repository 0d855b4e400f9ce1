use std::sync::Arc;

use status_core::{
    config::EngineConfig,
    entity::{BaseAttributes, EntitySpec},
    notify::Recorder,
    status::{
        EffectDatabase, FiredTimer, TimerHandle, TimerQueue, TimerService, TimerTarget,
    },
    StatusEngine,
};

/// 호출 횟수를 세는 타이머
///
/// `ignore_cancel` 을 켜면 취소 요청을 무시해서 이미 교체된 효과의 타이머도
/// 그대로 만료된다. 엔진이 오래된 타이머를 걸러내는지 확인할 때 쓴다.
#[derive(Debug, Default)]
pub struct CountingTimers {
    inner: TimerQueue,
    pub scheduled: usize,
    pub cancelled: usize,
    pub fired: usize,
    pub ignore_cancel: bool,
}

impl CountingTimers {
    #[allow(dead_code)]
    pub fn ignoring_cancel() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }
}

impl TimerService for CountingTimers {
    fn schedule(&mut self, due_ms: u64, target: TimerTarget) -> TimerHandle {
        self.scheduled += 1;
        self.inner.schedule(due_ms, target)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.cancelled += 1;
        if self.ignore_cancel {
            return false;
        }
        self.inner.cancel(handle)
    }

    fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer> {
        let fired = self.inner.pop_due(now_ms);
        if fired.is_some() {
            self.fired += 1;
        }
        fired
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

#[allow(dead_code)]
pub fn engine(seed: u64) -> StatusEngine {
    StatusEngine::new(
        Arc::new(EngineConfig::default()),
        Arc::new(EffectDatabase::builtin()),
        seed,
    )
}

#[allow(dead_code)]
pub fn counting_engine(timers: CountingTimers) -> StatusEngine<CountingTimers, Recorder> {
    StatusEngine::with_parts(
        Arc::new(EngineConfig::default()),
        Arc::new(EffectDatabase::builtin()),
        timers,
        Recorder::new(),
        1,
    )
}

/// vit/int/luk 0 인 1레벨 능력치. 최대 HP 1000, 최대 SP 100.
#[allow(dead_code)]
pub fn plain() -> BaseAttributes {
    BaseAttributes {
        vit: 0,
        int: 0,
        luk: 0,
        max_hp: 1000,
        max_sp: 100,
        ..Default::default()
    }
}

/// RON 표기 엔티티 정의 파싱
#[allow(dead_code)]
pub fn spec_from_ron(source: &str) -> EntitySpec {
    ron::de::from_str(source).expect("Failed to deserialize entity spec")
}

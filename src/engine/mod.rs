use std::{collections::VecDeque, sync::Arc};

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::EngineConfig,
    entity::{Entity, EntityArena, EntityId, EntitySpec, Position},
    error::EngineError,
    notify::{Recorder, StatusObserver},
    stats::{recalculate, DerivedStats, StatBlock, StatInputs},
    status::{
        ClearReason, EffectDatabase, EffectKind, EndCause, StartRequest, TimerQueue, TimerService,
    },
};

mod commands;
mod end;
mod persist;
mod propagation;
mod start;
mod tick;


pub use persist::PersistedEffect;

/// 변경 도중 발생한 후속 작업
///
/// 핸들러 안에서 다른 엔티티(또는 자기 자신)에 대한 시작/종료가 필요하면 바로 부르지
/// 않고 큐에 넣는다. 현재 변경이 끝난 뒤 순서대로 처리된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Start {
        target: EntityId,
        request: StartRequest,
    },
    End {
        target: EntityId,
        kind: EffectKind,
        cause: EndCause,
        guard: EndGuard,
    },
    /// 상대 효과의 partner 필드만 비운다.
    Detach {
        target: EntityId,
        kind: EffectKind,
        from: EntityId,
    },
}

/// 대상 효과가 이 조건을 만족할 때만 종료한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndGuard {
    Any,
    Source(EntityId),
    Partner(EntityId),
}

/// 상태 이상 엔진
///
/// 엔티티 아레나, 타이머, 관찰자, 난수, 후속 명령 큐를 소유하고 모든 진입점을 제공한다.
/// 단일 스레드에서 실행되며 하나의 변경은 끝까지 실행된 뒤에 다음 명령이 처리된다.
pub struct StatusEngine<T: TimerService = TimerQueue, O: StatusObserver = Recorder> {
    arena: EntityArena,
    db: Arc<EffectDatabase>,
    config: Arc<EngineConfig>,
    timers: T,
    observer: O,
    rng: StdRng,
    now_ms: u64,
    queue: VecDeque<Command>,
    draining: bool,
}

impl StatusEngine<TimerQueue, Recorder> {
    pub fn new(config: Arc<EngineConfig>, db: Arc<EffectDatabase>, seed: u64) -> Self {
        Self::with_parts(config, db, TimerQueue::new(), Recorder::new(), seed)
    }
}

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    pub fn with_parts(
        config: Arc<EngineConfig>,
        db: Arc<EffectDatabase>,
        timers: T,
        observer: O,
        seed: u64,
    ) -> Self {
        Self {
            arena: EntityArena::new(),
            db,
            config,
            timers,
            observer,
            rng: StdRng::seed_from_u64(seed),
            now_ms: 0,
            queue: VecDeque::new(),
            draining: false,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &EffectDatabase {
        &self.db
    }

    pub fn arena(&self) -> &EntityArena {
        &self.arena
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(id)
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// 엔진을 소비하고 관찰자만 꺼낸다.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// 엔티티 생성. 파생 스탯을 계산하고 HP/SP 를 최대치로 채운다.
    pub fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        let id = self.arena.insert(spec);
        if let Some(entity) = self.arena.get_mut(id) {
            entity.derived = recalculate(&StatInputs {
                base: &entity.base,
                equipment: &entity.equipment,
                effects: &entity.effects,
                db: &self.db,
                bounds: &self.config.bounds,
            });
            entity.hp = entity.derived.max_hp;
            entity.sp = entity.derived.max_sp;
        }
        tracing::debug!("entity {} spawned", id);
        id
    }

    /// 사망 처리: 소프트 클리어
    pub fn kill(&mut self, id: EntityId) -> Result<(), EngineError> {
        let entity = self
            .arena
            .get_mut(id)
            .ok_or(EngineError::UnknownEntity(id))?;
        entity.alive = false;
        entity.hp = 0;
        tracing::debug!("entity {} died", id);

        self.clear_all(id, ClearReason::Death)
    }

    /// 하드 클리어 후 아레나에서 제거
    pub fn despawn(&mut self, id: EntityId) -> Result<(), EngineError> {
        self.clear_all(id, ClearReason::Despawn)?;
        self.arena.remove(id);
        tracing::debug!("entity {} despawned", id);
        Ok(())
    }

    pub fn set_position(&mut self, id: EntityId, position: Position) -> Result<(), EngineError> {
        let entity = self
            .arena
            .get_mut(id)
            .ok_or(EngineError::UnknownEntity(id))?;
        entity.position = position;
        Ok(())
    }

    /// 장비 보정치 교체 후 재계산
    pub fn set_equipment(&mut self, id: EntityId, equipment: StatBlock) -> Result<(), EngineError> {
        let entity = self
            .arena
            .get_mut(id)
            .ok_or(EngineError::UnknownEntity(id))?;
        entity.equipment = equipment;
        self.refresh_stats(id);
        Ok(())
    }

    /// 캐시된 파생 스탯 (읽기 전용 스냅샷)
    pub fn get_derived_stats(&self, id: EntityId) -> Result<DerivedStats, EngineError> {
        self.arena
            .get(id)
            .map(|e| e.derived)
            .ok_or(EngineError::UnknownEntity(id))
    }

    /// now_ms 까지 만료된 타이머를 시간순으로 처리한다.
    pub fn advance(&mut self, now_ms: u64) {
        if now_ms < self.now_ms {
            tracing::warn!("clock moved backwards: {} -> {}", self.now_ms, now_ms);
            return;
        }

        while let Some(fired) = self.timers.pop_due(now_ms) {
            self.now_ms = fired.due_ms.max(self.now_ms);
            self.on_timer(fired);
            self.drain_commands();
        }
        self.now_ms = now_ms;
    }

    /// 파생 스탯을 다시 계산하고 달라진 스탯을 알린다. HP/SP 는 새 최대치로 자른다.
    pub(crate) fn refresh_stats(&mut self, id: EntityId) {
        let Some(entity) = self.arena.get_mut(id) else {
            return;
        };

        let derived = recalculate(&StatInputs {
            base: &entity.base,
            equipment: &entity.equipment,
            effects: &entity.effects,
            db: &self.db,
            bounds: &self.config.bounds,
        });
        let changed = derived.changed_from(&entity.derived);
        entity.derived = derived;
        entity.clamp_resources();

        if !changed.is_empty() {
            self.observer
                .on_derived_stats_changed(self.now_ms, id, &changed);
        }
    }
}

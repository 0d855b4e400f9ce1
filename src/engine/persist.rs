use serde::{Deserialize, Serialize};

use crate::{
    entity::EntityId,
    error::EngineError,
    notify::StatusObserver,
    status::{Applied, EffectKind, Rejected, StartFlags, StartRequest, TimerService},
};

use super::StatusEngine;

/// 로그아웃/맵 이동 때 저장되는 효과 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEffect {
    pub kind: EffectKind,
    pub params: [i32; 4],
    /// None 이면 무기한
    pub remaining_ms: Option<u64>,
    pub stacks: u8,
}

impl PersistedEffect {
    pub fn list_to_json(effects: &[PersistedEffect]) -> Result<String, EngineError> {
        Ok(serde_json::to_string(effects)?)
    }

    pub fn list_from_json(source: &str) -> Result<Vec<PersistedEffect>, EngineError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    /// 설정의 persistence.kinds 에 속한 효과를 남은 시간과 함께 꺼낸다 (종류 순).
    pub fn snapshot_persistent(&self, id: EntityId) -> Result<Vec<PersistedEffect>, EngineError> {
        let entity = self.arena.get(id).ok_or(EngineError::UnknownEntity(id))?;
        let kinds = &self.config.persistence.kinds;

        let snapshot = entity
            .effects
            .kinds_sorted()
            .into_iter()
            .filter(|kind| kinds.contains(kind))
            .filter_map(|kind| entity.effects.get(kind))
            .map(|effect| PersistedEffect {
                kind: effect.kind,
                params: effect.params,
                remaining_ms: effect.remaining_ms(self.now_ms),
                stacks: effect.stacks,
            })
            .collect();
        Ok(snapshot)
    }

    /// 저장된 효과를 다시 건다.
    ///
    /// 확률, 면역, 저항 감소, 시작 훅을 모두 건너뛴다. 남은 시간이 0 인 항목은 버린다.
    /// 항목별 결과를 입력 순서대로 돌려준다.
    pub fn restore_persistent(
        &mut self,
        id: EntityId,
        snapshot: &[PersistedEffect],
    ) -> Result<Vec<Result<Applied, Rejected>>, EngineError> {
        if !self.arena.contains(id) {
            return Err(EngineError::UnknownEntity(id));
        }

        let mut results = Vec::with_capacity(snapshot.len());
        for saved in snapshot {
            if saved.remaining_ms == Some(0) {
                tracing::debug!("skipping expired {} for {}", saved.kind, id);
                continue;
            }

            let mut request = StartRequest::new(saved.kind).params(saved.params).flags(
                StartFlags::RESTORED | StartFlags::UNCONDITIONAL | StartFlags::FIXED_DURATION,
            );
            if let Some(ms) = saved.remaining_ms {
                request = request.duration(ms);
            }

            let result = self.start_inner(id, request);
            if result.is_ok() && saved.stacks > 1 {
                if let Some(effect) = self
                    .arena
                    .get_mut(id)
                    .and_then(|e| e.effects.get_mut(saved.kind))
                {
                    effect.stacks = saved.stacks;
                }
                self.refresh_stats(id);
            }
            results.push(result);
        }

        self.drain_commands();
        Ok(results)
    }
}

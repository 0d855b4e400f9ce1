use std::sync::Arc;

use crate::{
    entity::EntityId,
    error::EngineError,
    notify::StatusObserver,
    status::{ClearReason, EffectKind, EndCause, TimerService},
};

use super::StatusEngine;

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    /// 효과 하나 종료. 걸려 있지 않으면 아무 일도 하지 않고 false.
    pub fn end_effect(
        &mut self,
        id: EntityId,
        kind: EffectKind,
        cause: EndCause,
    ) -> Result<bool, EngineError> {
        if !self.arena.contains(id) {
            tracing::warn!("end of {} addressed to missing entity {}", kind, id);
            return Err(EngineError::UnknownEntity(id));
        }
        let ended = self.end_inner(id, kind, cause);
        self.drain_commands();
        Ok(ended)
    }

    /// 걸려 있는 효과를 모두 종료한다. 소프트 클리어는 survives_death 종류를 남긴다.
    pub fn clear_all(&mut self, id: EntityId, reason: ClearReason) -> Result<(), EngineError> {
        let kinds = self
            .arena
            .get(id)
            .ok_or(EngineError::UnknownEntity(id))?
            .effects
            .kinds_sorted();
        let db = Arc::clone(&self.db);

        for kind in kinds {
            let survives = db.get(kind).map(|d| d.survives_death).unwrap_or(false);
            if reason.is_soft() && survives {
                continue;
            }
            self.end_inner(id, kind, reason.end_cause());
        }

        tracing::debug!("effects cleared on {} ({:?})", id, reason);
        self.drain_commands();
        Ok(())
    }

    pub(super) fn end_inner(&mut self, id: EntityId, kind: EffectKind, cause: EndCause) -> bool {
        let Some(entity) = self.arena.get_mut(id) else {
            tracing::warn!("end of {} addressed to missing entity {}", kind, id);
            return false;
        };
        let Some(effect) = entity.effects.remove(kind) else {
            tracing::trace!("{} is not active on {}", kind, id);
            return false;
        };
        if let Some(handle) = effect.timer {
            self.timers.cancel(handle);
        }

        tracing::debug!("{} ended on {} ({:?})", kind, id, cause);
        self.observer.on_effect_ended(self.now_ms, id, kind, cause);
        self.refresh_stats(id);

        let db = Arc::clone(&self.db);
        if let Some(desc) = db.get(kind) {
            self.propagate_end(id, &effect, desc);
        }
        true
    }
}

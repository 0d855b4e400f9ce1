use std::sync::Arc;

use crate::{
    entity::{EntityId, SpatialQuery, TypeFilter},
    notify::{StatusObserver, TickOutcome},
    status::{
        EffectDescriptor, EffectKind, EndCause, FiredTimer, TickAction, TimerService,
        TimerTarget,
    },
};

use super::{Command, EndGuard, StatusEngine};

/// 주기 동작의 (간격, 동작)
///
/// 오라로 받은 사본은 펄스를 내보내지 않는다. 오라 펄스 간격은 설정값을 따른다.
pub(super) fn periodic_of(
    desc: &EffectDescriptor,
    relayed: bool,
    aura_pulse_ms: u64,
) -> Option<(u64, &TickAction)> {
    let periodic = desc.periodic.as_ref()?;
    match periodic.action {
        TickAction::AuraPulse if relayed => None,
        TickAction::AuraPulse => Some((aura_pulse_ms.max(1), &periodic.action)),
        _ => Some((periodic.interval_ms.max(1), &periodic.action)),
    }
}

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    /// 만료된 타이머 하나 처리
    ///
    /// 슬롯에 저장된 핸들과 다르면 이미 교체/종료된 인스턴스의 타이머이므로 무시한다.
    pub(super) fn on_timer(&mut self, fired: FiredTimer) {
        let TimerTarget { entity: id, kind } = fired.target;
        let Some(effect) = self
            .arena
            .get_mut(id)
            .and_then(|e| e.effects.get_mut(kind))
        else {
            tracing::trace!("stale timer {:?}: {} on {} is gone", fired.handle, kind, id);
            return;
        };
        if effect.timer != Some(fired.handle) {
            tracing::trace!("stale timer {:?} for {} on {}", fired.handle, kind, id);
            return;
        }
        effect.timer = None;
        let relayed = effect.relayed;
        let level = effect.level();
        let expires_at = effect.expires_at_ms;
        // 남은 틱이 없으면 만료 시각에 맞춘 마지막 타이머
        let tick_due = effect.ticks_remaining != Some(0);

        let db = Arc::clone(&self.db);
        let Some(desc) = db.get(kind) else {
            return;
        };
        let Some((interval, action)) = periodic_of(desc, relayed, self.config.world.aura_pulse_ms)
        else {
            self.end_inner(id, kind, EndCause::Expired);
            return;
        };
        if !tick_due {
            self.end_inner(id, kind, EndCause::Expired);
            return;
        }

        let outcome = match action {
            TickAction::Damage {
                percent_of_max_hp,
                min,
            } => self.tick_damage(id, *percent_of_max_hp, *min),
            TickAction::SpDrain { amount } => match self.tick_drain(id, *amount) {
                Some(outcome) => outcome,
                None => {
                    self.end_inner(id, kind, EndCause::Exhausted);
                    return;
                }
            },
            TickAction::LinkCheck => {
                if !self.link_intact(id, kind, desc) {
                    self.end_inner(id, kind, EndCause::LinkBroken);
                    return;
                }
                TickOutcome::LinkHeld
            }
            TickAction::Reveal { radius, ends } => self.tick_reveal(id, *radius, ends),
            TickAction::AuraPulse => TickOutcome::Pulsed {
                targets: self.pulse_aura(id, desc, level),
            },
        };
        self.observer.on_periodic_tick(self.now_ms, id, kind, outcome);

        let Some(effect) = self
            .arena
            .get_mut(id)
            .and_then(|e| e.effects.get_mut(kind))
        else {
            return;
        };
        if let Some(remaining) = effect.ticks_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        if expires_at.is_some_and(|at| self.now_ms >= at) {
            self.end_inner(id, kind, EndCause::Expired);
            return;
        }

        let next = self.now_ms.saturating_add(interval);
        let due_ms = expires_at.map_or(next, |at| next.min(at));
        let handle = self
            .timers
            .schedule(due_ms, TimerTarget { entity: id, kind });
        effect.timer = Some(handle);
    }

    /// 최대 HP 비율 피해. 해독 지연 중이면 보류. HP 는 1 아래로 내려가지 않는다.
    fn tick_damage(&mut self, id: EntityId, percent: i32, min: i32) -> TickOutcome {
        let Some(entity) = self.arena.get_mut(id) else {
            return TickOutcome::Suppressed;
        };
        if entity.effects.has(EffectKind::SlowPoison) {
            return TickOutcome::Suppressed;
        }

        let scaled = i64::from(entity.derived.max_hp) * i64::from(percent) / 100;
        let damage = i32::try_from(scaled).unwrap_or(i32::MAX).max(min);
        let before = entity.hp;
        entity.hp = (entity.hp.saturating_sub(damage)).max(1).min(before);

        TickOutcome::Damaged {
            amount: before - entity.hp,
        }
    }

    /// SP 소모. 모자라면 None.
    fn tick_drain(&mut self, id: EntityId, amount: i32) -> Option<TickOutcome> {
        let entity = self.arena.get_mut(id)?;
        if entity.sp < amount {
            return None;
        }
        entity.sp -= amount;
        Some(TickOutcome::Drained { amount })
    }

    fn link_intact(&self, id: EntityId, kind: EffectKind, desc: &EffectDescriptor) -> bool {
        let Some(link) = desc.link else {
            return true;
        };
        let Some(entity) = self.arena.get(id) else {
            return false;
        };
        let Some(partner_id) = entity.effects.get(kind).and_then(|e| e.partner) else {
            return false;
        };
        let Some(partner) = self.arena.get(partner_id) else {
            return false;
        };
        if !partner.alive {
            return false;
        }

        let range = link.range.unwrap_or(self.config.world.link_range);
        if entity.position.distance(&partner.position) > range {
            return false;
        }

        match link.partner_kind {
            Some(partner_kind) => partner
                .effects
                .get(partner_kind)
                .map(|e| e.partner == Some(id))
                .unwrap_or(false),
            None => true,
        }
    }

    /// 범위 안 적 중 은신 계열이 걸린 대상마다 종료 명령을 쌓는다.
    fn tick_reveal(&mut self, id: EntityId, radius: i32, ends: &[EffectKind]) -> TickOutcome {
        let Some(origin) = self.arena.get(id) else {
            return TickOutcome::Revealed { targets: 0 };
        };

        let mut commands = Vec::new();
        let mut targets = 0;
        for target_id in self
            .arena
            .entities_in_range(origin.position, radius, TypeFilter::all())
        {
            let Some(target) = self.arena.get(target_id) else {
                continue;
            };
            if target.is_ally_of(origin) {
                continue;
            }
            let found: Vec<EffectKind> = ends
                .iter()
                .copied()
                .filter(|k| target.effects.has(*k))
                .collect();
            if found.is_empty() {
                continue;
            }
            targets += 1;
            commands.extend(found.into_iter().map(|kind| Command::End {
                target: target_id,
                kind,
                cause: EndCause::Dispelled,
                guard: EndGuard::Any,
            }));
        }

        for command in commands {
            self.push_command(command);
        }
        TickOutcome::Revealed { targets }
    }
}

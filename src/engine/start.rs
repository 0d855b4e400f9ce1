use std::sync::Arc;

use rand::Rng;

use crate::{
    config::ResistanceConfig,
    entity::{Entity, EntityId, EntityType},
    notify::StatusObserver,
    status::{
        hooks, ActiveEffect, Applied, EffectKind, EndCause, Rejected, ResistFormula, StackPolicy,
        StartFlags, StartOutcome, StartRequest, TimerService, TimerTarget, CHANCE_MAX,
    },
};

use super::{tick::periodic_of, StatusEngine};

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    /// 효과 시작 요청
    ///
    /// 거절은 오류가 아니라 일반 결과값이다. 수락되면 후속 명령(링크, 오라, 소환수 전파)까지
    /// 모두 처리한 뒤 돌아온다.
    pub fn start_effect(
        &mut self,
        target: EntityId,
        request: StartRequest,
    ) -> Result<Applied, Rejected> {
        let result = self.start_inner(target, request);
        self.drain_commands();
        result
    }

    pub(super) fn start_inner(
        &mut self,
        id: EntityId,
        request: StartRequest,
    ) -> Result<Applied, Rejected> {
        let db = Arc::clone(&self.db);
        let config = Arc::clone(&self.config);
        let kind = request.kind;
        let flags = request.flags;
        let unconditional = flags.contains(StartFlags::UNCONDITIONAL);
        let restored = flags.contains(StartFlags::RESTORED);

        let Some(desc) = db.get(kind) else {
            tracing::warn!("no descriptor for {}", kind);
            return Err(Rejected::Blocked);
        };

        let Some(entity) = self.arena.get(id) else {
            tracing::warn!("start of {} addressed to missing entity {}", kind, id);
            return Err(Rejected::Missing);
        };

        // 1. 사망
        if !entity.alive {
            return Err(Rejected::Dead);
        }

        // 2. 행동 불능 계열끼리는 배타적
        let active_incapacitation: Vec<EffectKind> = if desc.incapacitating {
            entity
                .effects
                .kinds_sorted()
                .into_iter()
                .filter(|k| k.is_incapacitation())
                .collect()
        } else {
            Vec::new()
        };
        if !active_incapacitation.is_empty() && !unconditional {
            return Err(Rejected::Overridden);
        }

        // 3. 보스 면역
        if !unconditional && entity.boss && config.resistance.boss_immune.contains(&kind) {
            return Err(Rejected::Immune);
        }

        // 4. 속성 면역, 저항 100% 이상
        let resistance = resistance_percent(entity, desc.resist, &config.resistance);
        if !unconditional
            && (desc.immune_elements.contains(&entity.element) || resistance >= 100)
        {
            return Err(Rejected::Immune);
        }

        if entity.effects.has_any(&desc.blocked_by) {
            return Err(Rejected::Blocked);
        }
        if !desc.requires_any.is_empty() && !entity.effects.has_any(&desc.requires_any) {
            return Err(Rejected::Blocked);
        }

        // 5. 확률 판정
        if !unconditional && !restored {
            let chance = effective_chance(
                request.chance,
                resistance,
                entity.entity_type == EntityType::Monster,
                &config.resistance,
            );
            if self.rng.gen_range(0..CHANCE_MAX) >= chance {
                return Err(Rejected::RolledOut);
            }
        }

        // 6. 지속시간
        let requested = request.duration_ms.unwrap_or(desc.base_duration_ms);
        let duration = if requested == 0 {
            None
        } else {
            let mut ms = requested;
            if !restored {
                ms = hooks::adjust_duration(kind, entity, ms);
            }
            let reduce = config.duration.reduce_by_resistance
                && !flags.intersects(StartFlags::FIXED_DURATION | StartFlags::RESTORED);
            if reduce {
                ms = reduce_duration(ms, resistance, desc.min_duration_ms);
            }
            Some(ms)
        };

        // 7. 같은 종류와의 중첩 처리
        let existing = entity.effects.get(kind);
        let (outcome, stacks) = match (existing, desc.stacking) {
            (None, _) => (StartOutcome::Started, 1),
            (Some(_), StackPolicy::NoRefresh) => return Err(Rejected::Overridden),
            (Some(current), StackPolicy::Replace) if current.level() > request.params[0] => {
                return Err(Rejected::Overridden)
            }
            (Some(_), StackPolicy::Replace | StackPolicy::AlwaysRefresh) => {
                (StartOutcome::Refreshed, 1)
            }
            (Some(current), StackPolicy::Counter { max }) => {
                let stacks = current.stacks.saturating_add(1).min(max.max(1));
                (StartOutcome::Stacked { stacks }, stacks)
            }
        };
        let old_timer = existing.and_then(|e| e.timer);

        let params = if restored {
            request.params
        } else {
            hooks::start_params(kind, entity, request.params)
        };

        // 8. 수락
        for other in active_incapacitation.iter().filter(|k| **k != kind) {
            self.end_inner(id, *other, EndCause::Replaced);
        }
        for other in &desc.clears_on_start {
            self.end_inner(id, *other, EndCause::Replaced);
        }

        // 같은 슬롯에 살아있는 타이머는 하나뿐이어야 한다.
        if let Some(handle) = old_timer {
            self.timers.cancel(handle);
        }

        let relayed = flags.contains(StartFlags::RELAYED);
        let now = self.now_ms;
        let periodic = periodic_of(desc, relayed, config.world.aura_pulse_ms);

        // 주기 효과도 만료 시각은 최종 지속시간이 정한다. 틱은 그 안에 들어가는 만큼만.
        let (due, ticks_remaining, expires_at_ms) = match (periodic, duration) {
            (Some((interval, _)), Some(ms)) => {
                let expires = now.saturating_add(ms);
                let ticks = u32::try_from(ms / interval).unwrap_or(u32::MAX);
                (
                    Some(now.saturating_add(interval).min(expires)),
                    Some(ticks),
                    Some(expires),
                )
            }
            (Some((interval, _)), None) => (Some(now.saturating_add(interval)), None, None),
            (None, Some(ms)) => {
                let expires = now.saturating_add(ms);
                (Some(expires), None, Some(expires))
            }
            (None, None) => (None, None, None),
        };
        let timer = due.map(|due_ms| {
            self.timers
                .schedule(due_ms, TimerTarget { entity: id, kind })
        });

        let mut effect = ActiveEffect::new(kind, params, desc.groups);
        effect.partner = request.partner;
        effect.source = request.source;
        effect.relayed = relayed;
        effect.stacks = stacks;
        effect.duration_ms = duration;
        effect.started_at_ms = now;
        effect.expires_at_ms = expires_at_ms;
        effect.ticks_remaining = ticks_remaining;
        effect.timer = timer;

        let Some(entity) = self.arena.get_mut(id) else {
            if let Some(handle) = timer {
                self.timers.cancel(handle);
            }
            return Err(Rejected::Missing);
        };
        entity.effects.insert(effect);
        if !restored {
            hooks::after_start(kind, entity);
        }

        tracing::debug!(
            "{} started on {} ({:?}, duration {:?})",
            kind,
            id,
            outcome,
            duration
        );
        self.observer.on_effect_started(now, id, kind, desc.icon);
        self.refresh_stats(id);
        self.propagate_start(id, desc, &request, duration);

        Ok(Applied {
            outcome,
            duration_ms: duration,
        })
    }
}

/// 대상의 저항(%)
///
/// vit/int/mdef 공식은 base + 스탯 + luk / luk_divisor, luk 공식은 base + luk.
pub(crate) fn resistance_percent(
    entity: &Entity,
    formula: ResistFormula,
    config: &ResistanceConfig,
) -> i32 {
    let stats = entity.derived();
    let luk_bonus = stats.luk / config.luk_divisor.max(1);
    let value = match formula {
        ResistFormula::None => return 0,
        ResistFormula::Vit => config.base + stats.vit + luk_bonus,
        ResistFormula::Int => config.base + stats.int + luk_bonus,
        ResistFormula::Mdef => config.base + stats.mdef + luk_bonus,
        ResistFormula::Luk => config.base + stats.luk,
    };
    value.max(0)
}

/// 저항을 반영한 유효 확률 (basis point)
pub(crate) fn effective_chance(
    chance: u32,
    resistance: i32,
    monster: bool,
    config: &ResistanceConfig,
) -> u32 {
    let mut rate = (100 - resistance.clamp(0, 100)) as u32;
    if monster {
        rate = rate.max(config.monster_min_rate.clamp(0, 100) as u32);
    }
    chance.min(CHANCE_MAX) * rate / 100
}

/// 저항으로 줄어든 지속시간. 하한(floor)보다 짧아지지 않고 요청보다 길어지지 않는다.
pub(crate) fn reduce_duration(requested: u64, resistance: i32, floor: u64) -> u64 {
    let keep = (100 - resistance.clamp(0, 100)) as u128;
    let reduced = u64::try_from(u128::from(requested) * keep / 100).unwrap_or(requested);
    reduced.max(floor.min(requested))
}

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

use super::EffectKind;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StartFlags: u8 {
        /// 면역/확률/행동불능 배타 검사를 모두 건너뛴다 (스크립트, 운영자).
        const UNCONDITIONAL = 1 << 0;
        /// 저항에 의한 지속시간 감소를 하지 않는다.
        const FIXED_DURATION = 1 << 1;
        /// 저장된 상태 복원. 시작 훅을 실행하지 않는다.
        const RESTORED = 1 << 2;
        /// 오라/소환수 전파로 받은 사본. 다시 전파하지 않는다.
        const RELAYED = 1 << 3;
    }
}

/// 확률 최대값 (basis point)
pub const CHANCE_MAX: u32 = 10_000;

/// start_effect 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub kind: EffectKind,
    pub params: [i32; 4],
    /// None 이면 서술자의 기본 지속시간
    pub duration_ms: Option<u64>,
    /// basis point (0..=10000)
    pub chance: u32,
    pub flags: StartFlags,
    pub partner: Option<EntityId>,
    pub source: Option<EntityId>,
}

impl StartRequest {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            params: [1, 0, 0, 0],
            duration_ms: None,
            chance: CHANCE_MAX,
            flags: StartFlags::empty(),
            partner: None,
            source: None,
        }
    }

    pub fn level(mut self, level: i32) -> Self {
        self.params[0] = level;
        self
    }

    pub fn params(mut self, params: [i32; 4]) -> Self {
        self.params = params;
        self
    }

    pub fn duration(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn chance(mut self, basis_points: u32) -> Self {
        self.chance = basis_points.min(CHANCE_MAX);
        self
    }

    pub fn flags(mut self, flags: StartFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn unconditional(self) -> Self {
        self.flags(StartFlags::UNCONDITIONAL)
    }

    pub fn fixed_duration(self) -> Self {
        self.flags(StartFlags::FIXED_DURATION)
    }

    pub fn partner(mut self, partner: EntityId) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOutcome {
    Started,
    /// 기존 인스턴스를 새 값으로 교체
    Refreshed,
    Stacked { stacks: u8 },
}

/// 수락된 시작 요청의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applied {
    pub outcome: StartOutcome,
    /// 실제 예약된 지속시간. 무기한이면 None.
    pub duration_ms: Option<u64>,
}

/// 적용되지 않은 시작 요청. 오류가 아니라 일반 결과값이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejected {
    Dead,
    Immune,
    RolledOut,
    Overridden,
    /// 종류별 선행 조건 불충족
    Blocked,
    /// 아레나에 없는 엔티티
    Missing,
}

/// 효과가 끝난 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndCause {
    Expired,
    Cancelled,
    Replaced,
    Dispelled,
    Death,
    Despawn,
    LinkBroken,
    /// 유지 자원 고갈
    Exhausted,
}

/// clear_all 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearReason {
    /// 소프트 클리어: survives_death 종류는 남는다.
    Death,
    Dispel,
    Despawn,
}

impl ClearReason {
    pub fn is_soft(self) -> bool {
        matches!(self, ClearReason::Death)
    }

    pub fn end_cause(self) -> EndCause {
        match self {
            ClearReason::Death => EndCause::Death,
            ClearReason::Dispel => EndCause::Dispelled,
            ClearReason::Despawn => EndCause::Despawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_flags_and_clamps_chance() {
        let request = StartRequest::new(EffectKind::Stun)
            .level(3)
            .chance(20_000)
            .unconditional()
            .fixed_duration();

        assert_eq!(request.params[0], 3);
        assert_eq!(request.chance, CHANCE_MAX);
        assert!(request
            .flags
            .contains(StartFlags::UNCONDITIONAL | StartFlags::FIXED_DURATION));
    }

    #[test]
    fn only_death_is_soft() {
        assert!(ClearReason::Death.is_soft());
        assert!(!ClearReason::Dispel.is_soft());
        assert!(!ClearReason::Despawn.is_soft());
    }
}

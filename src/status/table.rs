use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

use super::{EffectKind, GroupBits, TimerHandle};

/// 현재 적용 중인 효과 인스턴스 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    /// 종류별 의미가 다른 수치 4개. params[0] 은 항상 레벨.
    pub params: [i32; 4],
    /// 링크 효과의 상대 엔티티
    pub partner: Option<EntityId>,
    /// 효과를 건 엔티티
    pub source: Option<EntityId>,
    /// 오라/소환수 전파로 받은 사본
    pub relayed: bool,
    /// 누적형 효과의 중첩 수
    pub stacks: u8,
    /// None 이면 무기한
    pub duration_ms: Option<u64>,
    pub started_at_ms: u64,
    pub expires_at_ms: Option<u64>,
    /// 주기 효과의 남은 틱 수
    pub ticks_remaining: Option<u32>,
    /// 이 효과가 독점하는 타이머 핸들
    pub timer: Option<TimerHandle>,
    pub groups: GroupBits,
}

impl ActiveEffect {
    pub fn new(kind: EffectKind, params: [i32; 4], groups: GroupBits) -> Self {
        Self {
            kind,
            params,
            partner: None,
            source: None,
            relayed: false,
            stacks: 1,
            duration_ms: None,
            started_at_ms: 0,
            expires_at_ms: None,
            ticks_remaining: None,
            timer: None,
            groups,
        }
    }

    pub fn level(&self) -> i32 {
        self.params[0]
    }

    /// 남은 지속시간. 무기한이면 None.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at_ms.map(|end| end.saturating_sub(now_ms))
    }
}

/// 엔티티 하나의 효과 테이블
///
/// 종류마다 최대 하나의 인스턴스만 가진다. 삽입/삭제 시 그룹 비트마스크 캐시도
/// 같이 갱신한다. 종류마다 비트가 고유하므로 삭제는 그 효과의 비트만 끄면 된다.
#[derive(Debug, Clone, Default)]
pub struct EffectTable {
    slots: HashMap<EffectKind, ActiveEffect>,
    groups: GroupBits,
}

impl EffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.slots.get(&kind)
    }

    pub(crate) fn get_mut(&mut self, kind: EffectKind) -> Option<&mut ActiveEffect> {
        self.slots.get_mut(&kind)
    }

    /// 효과를 슬롯에 넣는다. 같은 종류가 있었다면 꺼내서 돌려준다.
    pub fn insert(&mut self, effect: ActiveEffect) -> Option<ActiveEffect> {
        let groups = effect.groups;
        let previous = self.slots.insert(effect.kind, effect);
        if let Some(previous) = &previous {
            self.groups.remove(previous.groups);
        }
        self.groups.insert(groups);
        previous
    }

    pub fn remove(&mut self, kind: EffectKind) -> Option<ActiveEffect> {
        let removed = self.slots.remove(&kind)?;
        self.groups.remove(removed.groups);
        Some(removed)
    }

    /// 선언 순으로 정렬된 활성 종류 목록
    pub fn kinds_sorted(&self) -> Vec<EffectKind> {
        let mut kinds: Vec<EffectKind> = self.slots.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.slots.values()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn groups(&self) -> GroupBits {
        self.groups
    }

    pub fn has_any(&self, kinds: &[EffectKind]) -> bool {
        kinds.iter().any(|k| self.has(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Ailment, CrowdControl};

    fn stun() -> ActiveEffect {
        ActiveEffect::new(
            EffectKind::Stun,
            [1, 0, 0, 0],
            GroupBits::cc(CrowdControl::STUN),
        )
    }

    #[test]
    fn insert_and_remove_maintain_groups() {
        let mut table = EffectTable::new();
        table.insert(stun());
        table.insert(ActiveEffect::new(
            EffectKind::Silence,
            [1, 0, 0, 0],
            GroupBits::ailment(Ailment::SILENCE),
        ));

        assert!(table.has(EffectKind::Stun));
        assert!(table.groups().cc.contains(CrowdControl::STUN));
        assert!(table.groups().ailment.contains(Ailment::SILENCE));

        let removed = table.remove(EffectKind::Stun).unwrap();
        assert_eq!(removed.kind, EffectKind::Stun);
        assert!(table.groups().cc.is_empty());
        assert!(table.groups().ailment.contains(Ailment::SILENCE));
    }

    #[test]
    fn slot_holds_at_most_one_instance() {
        let mut table = EffectTable::new();
        assert!(table.insert(stun()).is_none());

        let mut stronger = stun();
        stronger.params[0] = 5;
        let previous = table.insert(stronger).unwrap();

        assert_eq!(previous.level(), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(EffectKind::Stun).map(|e| e.level()), Some(5));
        assert!(table.groups().cc.contains(CrowdControl::STUN));
    }

    #[test]
    fn removing_absent_kind_is_noop() {
        let mut table = EffectTable::new();
        table.insert(stun());
        let before = table.groups();

        assert!(table.remove(EffectKind::Poison).is_none());
        assert_eq!(table.groups(), before);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn kinds_sorted_ignores_insertion_order() {
        let mut a = EffectTable::new();
        let mut b = EffectTable::new();
        let kinds = [EffectKind::Weight50, EffectKind::Stone, EffectKind::Blessing];

        for kind in kinds {
            a.insert(ActiveEffect::new(kind, [1, 0, 0, 0], GroupBits::NONE));
        }
        for kind in kinds.iter().rev() {
            b.insert(ActiveEffect::new(*kind, [1, 0, 0, 0], GroupBits::NONE));
        }

        assert_eq!(a.kinds_sorted(), b.kinds_sorted());
        assert_eq!(a.kinds_sorted()[0], EffectKind::Stone);
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    entity::{Element, TypeFilter},
    error::EngineError,
    stats::StatId,
};

use super::{catalog, ActiveEffect, EffectKind, GroupBits};

/// 저항 공식 선택자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResistFormula {
    None,
    Vit,
    Int,
    Mdef,
    /// luk 단독
    Luk,
}

/// 같은 종류가 이미 있을 때의 처리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackPolicy {
    /// 레벨이 더 낮으면 거절, 같거나 높으면 교체
    Replace,
    /// 항상 새 값으로 갱신 (오라형 파티 버프)
    AlwaysRefresh,
    /// 교체 대신 중첩 수 증가
    Counter { max: u8 },
    /// 걸려 있는 동안에는 다시 걸 수 없음
    NoRefresh,
}

/// 주기 틱마다 하는 일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickAction {
    /// 최대 HP 의 일정 비율 피해. HP 는 1 미만으로 내려가지 않는다.
    Damage { percent_of_max_hp: i32, min: i32 },
    /// SP 소모. 모자라면 효과가 끝난다.
    SpDrain { amount: i32 },
    /// 링크 상대가 살아있고 범위 안에 있는지 확인
    LinkCheck,
    /// 주변 적의 은신 계열 효과를 해제
    Reveal { radius: i32, ends: Vec<EffectKind> },
    /// 범위 내 아군에게 오라 효과 재부여
    AuraPulse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicSpec {
    pub interval_ms: u64,
    pub action: TickAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOp {
    /// 고정 가감
    Flat,
    /// 백분율 보정. 모든 효과의 값을 합산해 한 번만 곱한다.
    Rate,
}

/// 스탯 기여 하나: (base + per_level * level) [* stacks]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub stat: StatId,
    pub op: ModifierOp,
    pub base: i32,
    pub per_level: i32,
    pub per_stack: bool,
}

impl ModifierSpec {
    pub fn value_for(&self, effect: &ActiveEffect) -> i32 {
        let value = self
            .base
            .saturating_add(self.per_level.saturating_mul(effect.level()));
        if self.per_stack {
            value.saturating_mul(i32::from(effect.stacks))
        } else {
            value
        }
    }
}

/// 파이프라인을 건너뛰고 스탯을 고정하는 값
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverride {
    pub stat: StatId,
    pub value: i32,
}

/// 링크가 끊어졌을 때 상대 쪽 처리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkBreak {
    /// 상대의 짝 효과도 종료
    EndPartner,
    /// 상대의 partner 필드만 비운다 (상대 효과는 유지)
    Detach,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// 상대에게 걸리는 짝 효과
    pub partner_kind: Option<EffectKind>,
    /// None 이면 설정의 world.link_range
    pub range: Option<i32>,
    pub on_break: LinkBreak,
    /// 시작 시 상대에게 짝 효과를 같이 건다.
    pub start_partner: bool,
}

/// 범위 오라: 시전자 주변 아군에게 grant 효과를 부여
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraSpec {
    pub grant: EffectKind,
    pub radius: i32,
    pub filter: TypeFilter,
    /// 부여되는 효과의 지속시간. 다음 펄스 전에 끊기지 않도록 펄스 주기보다 길게 잡는다.
    pub grant_duration_ms: u64,
}

/// 종류별 정적 메타데이터
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDescriptor {
    pub kind: EffectKind,
    pub icon: Option<u16>,
    /// 0 이면 호출자가 지속시간을 주지 않을 때 무기한
    pub base_duration_ms: u64,
    /// 저항 감소의 하한
    pub min_duration_ms: u64,
    pub resist: ResistFormula,
    pub groups: GroupBits,
    pub stacking: StackPolicy,
    pub periodic: Option<PeriodicSpec>,
    pub modifiers: Vec<ModifierSpec>,
    pub overrides: Vec<StatOverride>,
    pub immune_elements: Vec<Element>,
    pub incapacitating: bool,
    pub survives_death: bool,
    pub link: Option<LinkSpec>,
    pub aura: Option<AuraSpec>,
    pub mirror_to_companions: bool,
    pub clears_on_start: Vec<EffectKind>,
    pub blocked_by: Vec<EffectKind>,
    pub requires_any: Vec<EffectKind>,
}

impl EffectDescriptor {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            icon: None,
            base_duration_ms: 0,
            min_duration_ms: 0,
            resist: ResistFormula::None,
            groups: GroupBits::NONE,
            stacking: StackPolicy::Replace,
            periodic: None,
            modifiers: Vec::new(),
            overrides: Vec::new(),
            immune_elements: Vec::new(),
            incapacitating: kind.is_incapacitation(),
            survives_death: false,
            link: None,
            aura: None,
            mirror_to_companions: false,
            clears_on_start: Vec::new(),
            blocked_by: Vec::new(),
            requires_any: Vec::new(),
        }
    }

    pub fn icon(mut self, icon: u16) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn duration(mut self, ms: u64) -> Self {
        self.base_duration_ms = ms;
        self
    }

    pub fn min_duration(mut self, ms: u64) -> Self {
        self.min_duration_ms = ms;
        self
    }

    pub fn resist(mut self, formula: ResistFormula) -> Self {
        self.resist = formula;
        self
    }

    pub fn groups(mut self, groups: GroupBits) -> Self {
        self.groups = groups;
        self
    }

    pub fn stacking(mut self, policy: StackPolicy) -> Self {
        self.stacking = policy;
        self
    }

    pub fn periodic(mut self, interval_ms: u64, action: TickAction) -> Self {
        self.periodic = Some(PeriodicSpec {
            interval_ms,
            action,
        });
        self
    }

    pub fn flat(self, stat: StatId, base: i32, per_level: i32) -> Self {
        self.modifier(stat, ModifierOp::Flat, base, per_level, false)
    }

    pub fn rate(self, stat: StatId, base: i32, per_level: i32) -> Self {
        self.modifier(stat, ModifierOp::Rate, base, per_level, false)
    }

    /// 중첩 수만큼 곱해지는 비율 보정
    pub fn stacked_rate(self, stat: StatId, per_stack: i32) -> Self {
        self.modifier(stat, ModifierOp::Rate, per_stack, 0, true)
    }

    fn modifier(
        mut self,
        stat: StatId,
        op: ModifierOp,
        base: i32,
        per_level: i32,
        per_stack: bool,
    ) -> Self {
        self.modifiers.push(ModifierSpec {
            stat,
            op,
            base,
            per_level,
            per_stack,
        });
        self
    }

    pub fn force(mut self, stat: StatId, value: i32) -> Self {
        self.overrides.push(StatOverride { stat, value });
        self
    }

    pub fn immune(mut self, elements: &[Element]) -> Self {
        self.immune_elements.extend_from_slice(elements);
        self
    }

    pub fn survives_death(mut self) -> Self {
        self.survives_death = true;
        self
    }

    pub fn link(mut self, link: LinkSpec) -> Self {
        self.link = Some(link);
        self
    }

    pub fn aura(mut self, aura: AuraSpec) -> Self {
        self.aura = Some(aura);
        self
    }

    pub fn mirror_to_companions(mut self) -> Self {
        self.mirror_to_companions = true;
        self
    }

    pub fn clears(mut self, kinds: &[EffectKind]) -> Self {
        self.clears_on_start.extend_from_slice(kinds);
        self
    }

    pub fn blocked_by(mut self, kinds: &[EffectKind]) -> Self {
        self.blocked_by.extend_from_slice(kinds);
        self
    }

    pub fn requires_any(mut self, kinds: &[EffectKind]) -> Self {
        self.requires_any.extend_from_slice(kinds);
        self
    }
}

/// RON 으로 덮어쓸 수 있는 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorOverride {
    pub kind: EffectKind,
    #[serde(default)]
    pub icon: Option<u16>,
    #[serde(default)]
    pub base_duration_ms: Option<u64>,
    #[serde(default)]
    pub min_duration_ms: Option<u64>,
}

/// 종류 → 서술자 테이블
///
/// 시작 시 한 번 만들어지고 엔진이 실행되는 동안 바뀌지 않는다.
#[derive(Debug, Clone)]
pub struct EffectDatabase {
    descriptors: Vec<EffectDescriptor>,
}

impl EffectDatabase {
    pub fn builtin() -> Self {
        let mut descriptors: Vec<EffectDescriptor> =
            EffectKind::ALL.iter().map(|k| EffectDescriptor::new(*k)).collect();

        for descriptor in catalog::builtin_descriptors() {
            let slot = descriptor.kind.ordinal();
            descriptors[slot] = descriptor;
        }
        Self { descriptors }
    }

    pub fn get(&self, kind: EffectKind) -> Option<&EffectDescriptor> {
        self.descriptors.get(kind.ordinal())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.descriptors.iter()
    }

    /// RON 덮어쓰기 목록을 적용하고 적용된 항목 수를 돌려준다.
    pub fn apply_overrides_ron(&mut self, source: &str) -> Result<usize, EngineError> {
        let overrides: Vec<DescriptorOverride> = ron::de::from_str(source)?;

        for entry in &overrides {
            let Some(descriptor) = self.descriptors.get_mut(entry.kind.ordinal()) else {
                continue;
            };
            if let Some(icon) = entry.icon {
                descriptor.icon = Some(icon);
            }
            if let Some(ms) = entry.base_duration_ms {
                descriptor.base_duration_ms = ms;
            }
            if let Some(ms) = entry.min_duration_ms {
                descriptor.min_duration_ms = ms;
            }
            tracing::debug!("descriptor override applied: {:?}", entry);
        }

        self.validate().map_err(EngineError::Config)?;
        Ok(overrides.len())
    }

    /// 그룹 비트 고유성, 링크/오라 참조 검증
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = GroupBits::NONE;
        for descriptor in &self.descriptors {
            if seen.intersects(&descriptor.groups) {
                return Err(format!("{} shares a group bit with another kind", descriptor.kind));
            }
            seen.insert(descriptor.groups);

            if descriptor.min_duration_ms > 0
                && descriptor.base_duration_ms > 0
                && descriptor.min_duration_ms > descriptor.base_duration_ms
            {
                return Err(format!(
                    "{}: min duration {} exceeds base duration {}",
                    descriptor.kind, descriptor.min_duration_ms, descriptor.base_duration_ms
                ));
            }

            if let Some(periodic) = &descriptor.periodic {
                if periodic.interval_ms == 0 {
                    return Err(format!("{}: periodic interval is 0", descriptor.kind));
                }
            }
        }
        Ok(())
    }
}

impl Default for EffectDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// 상태 이상 종류
///
/// 선언 순서가 곧 고정 평가 순서다. 스탯 파이프라인의 기여 수집, 강제 고정값의
/// 우선순위, clear_all 의 종료 순서가 모두 이 순서를 따른다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    // 행동 불능
    Stone,
    Freeze,
    Stun,
    Sleep,

    // 상태 이상
    Poison,
    DeadlyPoison,
    Curse,
    Silence,
    Confusion,
    Blind,
    Bleeding,

    // 버프
    Blessing,
    IncreaseAgi,
    Angelus,
    Gloria,
    Impositio,
    Magnificat,
    Concentrate,
    Endure,
    TwoHandQuicken,
    SpearsQuicken,
    Adrenaline,
    Overthrust,
    WeaponPerfection,
    Loud,
    TrueSight,
    WindWalk,
    AtkPotion,
    MatkPotion,
    SpeedPotion,
    Kyrie,
    Assumptio,
    EnergyCoat,
    SteelBody,
    Keeping,
    Barrier,
    Berserk,
    Concentration,
    Provoke,
    MindBreaker,
    Regeneration,

    // 디버프
    DecreaseAgi,
    Quagmire,
    SignumCrucis,
    EternalChaos,
    Slow,
    SpiderWeb,
    AnkleSnare,
    StripShield,

    // 자세
    Hiding,
    Cloaking,
    Chasewalk,
    Sight,
    Ruwach,
    Dancing,
    Riding,
    Wedding,
    NoChat,

    // 링크
    Devotion,
    Marionette,
    MarionetteTarget,
    BladeStop,

    // 오라
    Gospel,
    GospelBlessing,
    BattleOrders,
    GuildAura,

    SlowPoison,
    Weight50,
    Weight90,
}

impl EffectKind {
    pub const COUNT: usize = 69;

    pub const ALL: [EffectKind; Self::COUNT] = [
        EffectKind::Stone,
        EffectKind::Freeze,
        EffectKind::Stun,
        EffectKind::Sleep,
        EffectKind::Poison,
        EffectKind::DeadlyPoison,
        EffectKind::Curse,
        EffectKind::Silence,
        EffectKind::Confusion,
        EffectKind::Blind,
        EffectKind::Bleeding,
        EffectKind::Blessing,
        EffectKind::IncreaseAgi,
        EffectKind::Angelus,
        EffectKind::Gloria,
        EffectKind::Impositio,
        EffectKind::Magnificat,
        EffectKind::Concentrate,
        EffectKind::Endure,
        EffectKind::TwoHandQuicken,
        EffectKind::SpearsQuicken,
        EffectKind::Adrenaline,
        EffectKind::Overthrust,
        EffectKind::WeaponPerfection,
        EffectKind::Loud,
        EffectKind::TrueSight,
        EffectKind::WindWalk,
        EffectKind::AtkPotion,
        EffectKind::MatkPotion,
        EffectKind::SpeedPotion,
        EffectKind::Kyrie,
        EffectKind::Assumptio,
        EffectKind::EnergyCoat,
        EffectKind::SteelBody,
        EffectKind::Keeping,
        EffectKind::Barrier,
        EffectKind::Berserk,
        EffectKind::Concentration,
        EffectKind::Provoke,
        EffectKind::MindBreaker,
        EffectKind::Regeneration,
        EffectKind::DecreaseAgi,
        EffectKind::Quagmire,
        EffectKind::SignumCrucis,
        EffectKind::EternalChaos,
        EffectKind::Slow,
        EffectKind::SpiderWeb,
        EffectKind::AnkleSnare,
        EffectKind::StripShield,
        EffectKind::Hiding,
        EffectKind::Cloaking,
        EffectKind::Chasewalk,
        EffectKind::Sight,
        EffectKind::Ruwach,
        EffectKind::Dancing,
        EffectKind::Riding,
        EffectKind::Wedding,
        EffectKind::NoChat,
        EffectKind::Devotion,
        EffectKind::Marionette,
        EffectKind::MarionetteTarget,
        EffectKind::BladeStop,
        EffectKind::Gospel,
        EffectKind::GospelBlessing,
        EffectKind::BattleOrders,
        EffectKind::GuildAura,
        EffectKind::SlowPoison,
        EffectKind::Weight50,
        EffectKind::Weight90,
    ];

    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// 서로 배타적인 행동 불능 계열
    pub fn is_incapacitation(self) -> bool {
        matches!(
            self,
            EffectKind::Stone | EffectKind::Freeze | EffectKind::Stun | EffectKind::Sleep
        )
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

use crate::{
    entity::{Element, TypeFilter},
    stats::StatId,
};

use super::{
    Ailment, AuraSpec, CrowdControl, EffectDescriptor, EffectKind, GroupBits, LinkBreak,
    LinkSpec, Posture, ResistFormula, StackPolicy, TickAction,
};

use EffectKind::*;

const HASTE: [EffectKind; 8] = [
    Concentrate,
    IncreaseAgi,
    TwoHandQuicken,
    SpearsQuicken,
    Adrenaline,
    Loud,
    TrueSight,
    WindWalk,
];

const QUICKENING: [EffectKind; 3] = [TwoHandQuicken, SpearsQuicken, Adrenaline];

const AURA_TARGETS: TypeFilter = TypeFilter::PLAYER.union(TypeFilter::COMPANION);

fn d(kind: EffectKind) -> EffectDescriptor {
    EffectDescriptor::new(kind)
}

fn all_attributes(mut desc: EffectDescriptor, base: i32, per_level: i32) -> EffectDescriptor {
    for stat in StatId::ATTRIBUTES {
        desc = desc.flat(stat, base, per_level);
    }
    desc
}

/// 기본 서술자 목록
///
/// 수치는 게임 밸런스 값이 아니라 동작 확인용 기본값이다. 운영 값은
/// data/effect_overrides.ron 으로 덮어쓴다.
pub(crate) fn builtin_descriptors() -> Vec<EffectDescriptor> {
    vec![
        // 행동 불능
        d(Stone)
            .icon(1)
            .duration(20_000)
            .min_duration(2_000)
            .resist(ResistFormula::Mdef)
            .groups(GroupBits::cc(CrowdControl::STONE))
            .stacking(StackPolicy::NoRefresh)
            .immune(&[Element::Undead])
            .rate(StatId::Def, -50, 0)
            .rate(StatId::Mdef, 25, 0),
        d(Freeze)
            .icon(2)
            .duration(12_000)
            .min_duration(1_500)
            .resist(ResistFormula::Mdef)
            .groups(GroupBits::cc(CrowdControl::FREEZE))
            .stacking(StackPolicy::NoRefresh)
            .immune(&[Element::Undead])
            .rate(StatId::Def, -50, 0)
            .rate(StatId::Mdef, 25, 0),
        d(Stun)
            .icon(3)
            .duration(5_000)
            .min_duration(1_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::cc(CrowdControl::STUN))
            .stacking(StackPolicy::NoRefresh),
        d(Sleep)
            .icon(4)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Int)
            .groups(GroupBits::cc(CrowdControl::SLEEP))
            .stacking(StackPolicy::NoRefresh),
        // 상태 이상
        d(Poison)
            .icon(5)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::ailment(Ailment::POISON))
            .stacking(StackPolicy::NoRefresh)
            .periodic(
                3_000,
                TickAction::Damage {
                    percent_of_max_hp: 3,
                    min: 1,
                },
            )
            .rate(StatId::Def, -25, 0),
        d(DeadlyPoison)
            .icon(6)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::ailment(Ailment::DEADLY_POISON))
            .stacking(StackPolicy::NoRefresh)
            .periodic(
                2_000,
                TickAction::Damage {
                    percent_of_max_hp: 5,
                    min: 1,
                },
            )
            .rate(StatId::Atk, -25, 0)
            .rate(StatId::Def, -25, 0),
        d(Curse)
            .icon(7)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Luk)
            .groups(GroupBits::ailment(Ailment::CURSE))
            .stacking(StackPolicy::NoRefresh)
            .immune(&[Element::Dark])
            .force(StatId::Luk, 0)
            .flat(StatId::Speed, 450, 0)
            .rate(StatId::Atk, -25, 0),
        d(Silence)
            .icon(8)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::ailment(Ailment::SILENCE))
            .stacking(StackPolicy::NoRefresh),
        d(Confusion)
            .icon(9)
            .duration(30_000)
            .groups(GroupBits::ailment(Ailment::CONFUSION))
            .stacking(StackPolicy::NoRefresh),
        d(Blind)
            .icon(10)
            .duration(30_000)
            .min_duration(3_000)
            .resist(ResistFormula::Int)
            .groups(GroupBits::ailment(Ailment::BLIND))
            .stacking(StackPolicy::NoRefresh)
            .rate(StatId::Hit, -25, 0)
            .rate(StatId::Flee, -25, 0),
        d(Bleeding)
            .icon(11)
            .duration(120_000)
            .min_duration(50_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::ailment(Ailment::BLEEDING))
            .stacking(StackPolicy::NoRefresh)
            .periodic(
                10_000,
                TickAction::Damage {
                    percent_of_max_hp: 2,
                    min: 1,
                },
            ),
        // 버프
        d(Blessing)
            .icon(20)
            .duration(240_000)
            .clears(&[Curse, Stone])
            .flat(StatId::Str, 0, 1)
            .flat(StatId::Int, 0, 1)
            .flat(StatId::Dex, 0, 1),
        d(IncreaseAgi)
            .icon(21)
            .duration(240_000)
            .clears(&[DecreaseAgi])
            .blocked_by(&[Quagmire])
            .flat(StatId::Agi, 2, 1)
            .rate(StatId::Speed, -25, 0),
        d(Angelus)
            .icon(22)
            .duration(300_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .rate(StatId::Def, 10, 5),
        d(Gloria)
            .icon(23)
            .duration(30_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .mirror_to_companions()
            .flat(StatId::Luk, 30, 0),
        d(Impositio)
            .icon(24)
            .duration(60_000)
            .flat(StatId::Atk, 0, 5),
        d(Magnificat)
            .icon(25)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh),
        d(Concentrate)
            .icon(26)
            .duration(60_000)
            .blocked_by(&[Quagmire])
            .rate(StatId::Agi, 2, 1)
            .rate(StatId::Dex, 2, 1),
        d(Endure)
            .icon(27)
            .duration(60_000)
            .flat(StatId::Mdef, 0, 1),
        d(TwoHandQuicken)
            .icon(28)
            .duration(300_000)
            .groups(GroupBits::posture(Posture::TWO_HAND_QUICKEN))
            .blocked_by(&[DecreaseAgi, Quagmire])
            .rate(StatId::AttackDelay, -30, 0),
        d(SpearsQuicken)
            .icon(29)
            .duration(300_000)
            .blocked_by(&[DecreaseAgi, Quagmire])
            .rate(StatId::AttackDelay, -20, -1),
        d(Adrenaline)
            .icon(30)
            .duration(150_000)
            .blocked_by(&[DecreaseAgi, Quagmire])
            .rate(StatId::AttackDelay, -30, 0),
        d(Overthrust)
            .icon(31)
            .duration(100_000)
            .groups(GroupBits::posture(Posture::OVERTHRUST))
            .rate(StatId::Atk, 0, 5),
        d(WeaponPerfection).icon(32).duration(50_000),
        d(Loud)
            .icon(33)
            .duration(300_000)
            .blocked_by(&[Quagmire])
            .flat(StatId::Str, 4, 0),
        all_attributes(d(TrueSight), 5, 0)
            .icon(34)
            .duration(30_000)
            .blocked_by(&[Quagmire])
            .flat(StatId::Hit, 0, 3)
            .rate(StatId::Critical, 0, 1),
        d(WindWalk)
            .icon(35)
            .duration(130_000)
            .blocked_by(&[Quagmire])
            .rate(StatId::Speed, 0, -2)
            .rate(StatId::Flee, 0, 1),
        d(AtkPotion)
            .icon(36)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .flat(StatId::Atk, 0, 1),
        d(MatkPotion)
            .icon(37)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .flat(StatId::Matk, 0, 1),
        d(SpeedPotion)
            .icon(38)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .rate(StatId::AttackDelay, 0, -1),
        d(Kyrie)
            .icon(39)
            .duration(120_000)
            .clears(&[Assumptio]),
        d(Assumptio)
            .icon(40)
            .duration(60_000)
            .groups(GroupBits::posture(Posture::ASSUMPTIO))
            .clears(&[Kyrie]),
        d(EnergyCoat)
            .icon(41)
            .duration(300_000)
            .groups(GroupBits::posture(Posture::ENERGY_COAT)),
        d(SteelBody)
            .icon(42)
            .duration(30_000)
            .groups(GroupBits::posture(Posture::STEEL_BODY))
            .force(StatId::Def, 90)
            .force(StatId::Mdef, 90)
            .rate(StatId::Speed, 25, 0)
            .rate(StatId::AttackDelay, 25, 0),
        d(Keeping)
            .icon(43)
            .duration(10_000)
            .force(StatId::Def, 100),
        d(Barrier)
            .icon(44)
            .duration(10_000)
            .force(StatId::Mdef, 100),
        d(Berserk)
            .icon(45)
            .duration(300_000)
            .groups(GroupBits::posture(Posture::BERSERK))
            .force(StatId::Def, 0)
            .force(StatId::Mdef, 0)
            .rate(StatId::MaxHp, 200, 0)
            .rate(StatId::Flee, -50, 0)
            .rate(StatId::Speed, -25, 0)
            .rate(StatId::AttackDelay, -30, 0),
        d(Concentration)
            .icon(46)
            .duration(25_000)
            .rate(StatId::Atk, 0, 5)
            .rate(StatId::Def, 0, -5),
        d(Provoke)
            .icon(47)
            .duration(30_000)
            .rate(StatId::Def, 0, -6)
            .rate(StatId::Atk, 0, 2),
        d(MindBreaker)
            .icon(48)
            .duration(30_000)
            .rate(StatId::Matk, 0, 20)
            .rate(StatId::Mdef, 0, -12),
        d(Regeneration).icon(49).duration(60_000),
        // 디버프
        d(DecreaseAgi)
            .icon(60)
            .duration(40_000)
            .resist(ResistFormula::Mdef)
            .clears(&[IncreaseAgi])
            .clears(&QUICKENING)
            .flat(StatId::Agi, -2, -1)
            .rate(StatId::Speed, 25, 0),
        d(Quagmire)
            .icon(61)
            .duration(20_000)
            .clears(&HASTE)
            .flat(StatId::Agi, 0, -10)
            .flat(StatId::Dex, 0, -10)
            .rate(StatId::Speed, 50, 0),
        d(SignumCrucis)
            .icon(62)
            .duration(600_000)
            .groups(GroupBits::ailment(Ailment::SIGNUM_CRUCIS))
            .rate(StatId::Def, -10, -2),
        d(EternalChaos)
            .icon(63)
            .duration(60_000)
            .force(StatId::Def, 0),
        d(Slow)
            .icon(64)
            .duration(10_000)
            .rate(StatId::Speed, 0, 10)
            .rate(StatId::AttackDelay, 0, 5),
        d(SpiderWeb)
            .icon(65)
            .duration(8_000)
            .groups(GroupBits::cc(CrowdControl::SPIDER_WEB))
            .stacking(StackPolicy::Counter { max: 3 })
            .stacked_rate(StatId::Flee, -25),
        d(AnkleSnare)
            .icon(66)
            .duration(20_000)
            .min_duration(3_000)
            .resist(ResistFormula::Vit)
            .groups(GroupBits::cc(CrowdControl::ANKLE_SNARE)),
        d(StripShield)
            .icon(67)
            .duration(60_000)
            .rate(StatId::Def, -15, 0),
        // 자세
        d(Hiding)
            .icon(80)
            .groups(GroupBits::posture(Posture::HIDING))
            .periodic(5_000, TickAction::SpDrain { amount: 1 }),
        d(Cloaking)
            .icon(81)
            .groups(GroupBits::posture(Posture::CLOAKING))
            .periodic(3_000, TickAction::SpDrain { amount: 1 })
            .rate(StatId::Speed, 30, 0),
        d(Chasewalk)
            .icon(82)
            .groups(GroupBits::posture(Posture::CHASEWALK))
            .periodic(5_000, TickAction::SpDrain { amount: 2 })
            .rate(StatId::Speed, 40, 0),
        d(Sight)
            .icon(83)
            .duration(10_000)
            .groups(GroupBits::posture(Posture::SIGHT))
            .periodic(
                1_000,
                TickAction::Reveal {
                    radius: 3,
                    ends: vec![Hiding, Cloaking],
                },
            ),
        d(Ruwach)
            .icon(84)
            .duration(10_000)
            .groups(GroupBits::posture(Posture::RUWACH))
            .periodic(
                1_000,
                TickAction::Reveal {
                    radius: 2,
                    ends: vec![Hiding, Cloaking],
                },
            ),
        d(Dancing)
            .icon(85)
            .duration(180_000)
            .groups(GroupBits::posture(Posture::DANCING))
            .periodic(10_000, TickAction::SpDrain { amount: 1 })
            .link(LinkSpec {
                partner_kind: Some(Dancing),
                range: None,
                on_break: LinkBreak::Detach,
                start_partner: false,
            })
            .rate(StatId::Speed, 100, 0),
        d(Riding)
            .icon(86)
            .groups(GroupBits::posture(Posture::RIDING))
            .survives_death()
            .rate(StatId::Speed, -25, 0),
        d(Wedding)
            .icon(87)
            .groups(GroupBits::posture(Posture::WEDDING))
            .survives_death()
            .rate(StatId::Speed, 100, 0),
        d(NoChat).icon(88).survives_death(),
        // 링크
        d(Devotion)
            .icon(100)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .periodic(1_000, TickAction::LinkCheck)
            .link(LinkSpec {
                partner_kind: None,
                range: None,
                on_break: LinkBreak::Nothing,
                start_partner: false,
            }),
        d(Marionette)
            .icon(101)
            .duration(300_000)
            .groups(GroupBits::posture(Posture::MARIONETTE))
            .periodic(1_000, TickAction::LinkCheck)
            .link(LinkSpec {
                partner_kind: Some(MarionetteTarget),
                range: None,
                on_break: LinkBreak::EndPartner,
                start_partner: true,
            }),
        d(MarionetteTarget)
            .icon(102)
            .duration(300_000)
            .periodic(1_000, TickAction::LinkCheck)
            .link(LinkSpec {
                partner_kind: Some(Marionette),
                range: None,
                on_break: LinkBreak::EndPartner,
                start_partner: false,
            }),
        d(BladeStop)
            .icon(103)
            .duration(5_000)
            .groups(GroupBits::cc(CrowdControl::BLADE_STOP))
            .link(LinkSpec {
                partner_kind: Some(BladeStop),
                range: Some(2),
                on_break: LinkBreak::EndPartner,
                start_partner: true,
            }),
        // 오라
        d(Gospel)
            .icon(110)
            .duration(60_000)
            .periodic(10_000, TickAction::AuraPulse)
            .aura(AuraSpec {
                grant: GospelBlessing,
                radius: 4,
                filter: AURA_TARGETS,
                grant_duration_ms: 15_000,
            }),
        all_attributes(d(GospelBlessing), 20, 0)
            .icon(111)
            .duration(15_000)
            .stacking(StackPolicy::AlwaysRefresh),
        d(BattleOrders)
            .icon(112)
            .duration(60_000)
            .stacking(StackPolicy::AlwaysRefresh)
            .mirror_to_companions()
            .periodic(10_000, TickAction::AuraPulse)
            .aura(AuraSpec {
                grant: BattleOrders,
                radius: 7,
                filter: AURA_TARGETS,
                grant_duration_ms: 15_000,
            })
            .flat(StatId::Str, 5, 0)
            .flat(StatId::Int, 5, 0)
            .flat(StatId::Dex, 5, 0),
        d(GuildAura)
            .icon(113)
            .stacking(StackPolicy::AlwaysRefresh)
            .periodic(10_000, TickAction::AuraPulse)
            .aura(AuraSpec {
                grant: GuildAura,
                radius: 7,
                filter: TypeFilter::PLAYER,
                grant_duration_ms: 15_000,
            })
            .flat(StatId::Str, 0, 1)
            .flat(StatId::Vit, 0, 1)
            .flat(StatId::Dex, 0, 1),
        d(SlowPoison)
            .icon(120)
            .duration(60_000)
            .requires_any(&[Poison, DeadlyPoison]),
        d(Weight50).icon(121).survives_death(),
        d(Weight90)
            .icon(122)
            .survives_death()
            .rate(StatId::AttackDelay, 10, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_kind_is_described_once() {
        let descriptors = builtin_descriptors();
        let kinds: HashSet<EffectKind> = descriptors.iter().map(|d| d.kind).collect();

        assert_eq!(descriptors.len(), EffectKind::COUNT);
        assert_eq!(kinds.len(), EffectKind::COUNT);
    }

    #[test]
    fn group_bits_are_unique_per_kind() {
        let mut seen = GroupBits::NONE;
        for desc in builtin_descriptors() {
            assert!(
                !seen.intersects(&desc.groups),
                "{} reuses a group bit",
                desc.kind
            );
            seen.insert(desc.groups);
        }
    }

    #[test]
    fn death_survivors_are_the_persistent_postures() {
        let survivors: Vec<EffectKind> = builtin_descriptors()
            .into_iter()
            .filter(|d| d.survives_death)
            .map(|d| d.kind)
            .collect();

        assert_eq!(survivors, vec![Riding, Wedding, NoChat, Weight50, Weight90]);
    }

    #[test]
    fn incapacitation_flag_follows_kind_family() {
        for desc in builtin_descriptors() {
            assert_eq!(desc.incapacitating, desc.kind.is_incapacitation());
        }
    }
}

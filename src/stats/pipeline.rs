use crate::{
    config::StatBounds,
    entity::BaseAttributes,
    status::{EffectDatabase, EffectTable, ModifierOp},
};

use super::{DerivedStats, StatBlock, StatId};

/// 재계산 입력 묶음
///
/// 파이프라인은 이 입력의 순수 함수다. 같은 입력이면 효과 삽입 순서와
/// 무관하게 항상 같은 결과를 낸다.
pub struct StatInputs<'a> {
    pub base: &'a BaseAttributes,
    pub equipment: &'a StatBlock,
    pub effects: &'a EffectTable,
    pub db: &'a EffectDatabase,
    pub bounds: &'a StatBounds,
}

/// 활성 효과들로부터 모은 기여분
#[derive(Debug, Default)]
struct Contributions {
    flat: StatBlock,
    rate: StatBlock,
    overrides: [Option<i32>; StatId::COUNT],
}

/// 파생 스탯 전체를 다시 계산한다.
///
/// 레이어마다 다음 순서를 지킨다.
/// 1. 기본값 + 패시브(장비) 고정 가산
/// 2. 활성 효과의 고정 가감 (EffectKind 선언 순)
/// 3. 활성 효과의 비율 보정을 합산해 한 번만 곱함
/// 4. 설정된 최소/최대로 clamp
///
/// 강제 고정(short-circuit) 효과가 있는 스탯은 1~4 를 건너뛰고 그 값을 그대로 쓴다.
pub fn recalculate(inputs: &StatInputs<'_>) -> DerivedStats {
    let contributions = collect_contributions(inputs.effects, inputs.db);
    let mut out = DerivedStats::default();

    for stat in StatId::ATTRIBUTES {
        let base = inputs.base.attribute(stat);
        out.set(stat, compose(stat, base, inputs, &contributions));
    }

    // 전투 레이어의 기본값은 합성이 끝난 1차 능력치에서 나온다.
    for stat in StatId::COMBAT {
        let base = combat_base(stat, inputs.base, &out);
        out.set(stat, compose(stat, base, inputs, &contributions));
    }

    out
}

fn collect_contributions(effects: &EffectTable, db: &EffectDatabase) -> Contributions {
    let mut contributions = Contributions::default();

    for kind in effects.kinds_sorted() {
        let (Some(desc), Some(effect)) = (db.get(kind), effects.get(kind)) else {
            continue;
        };

        for forced in &desc.overrides {
            let slot = &mut contributions.overrides[forced.stat.index()];
            if slot.is_none() {
                *slot = Some(forced.value);
            }
        }

        for modifier in &desc.modifiers {
            let value = modifier.value_for(effect);
            match modifier.op {
                ModifierOp::Flat => {
                    let slot = &mut contributions.flat[modifier.stat];
                    *slot = slot.saturating_add(value);
                }
                ModifierOp::Rate => {
                    let slot = &mut contributions.rate[modifier.stat];
                    *slot = slot.saturating_add(value);
                }
            }
        }
    }

    contributions
}

fn compose(
    stat: StatId,
    base: i64,
    inputs: &StatInputs<'_>,
    contributions: &Contributions,
) -> i32 {
    if let Some(forced) = contributions.overrides[stat.index()] {
        return forced;
    }

    let mut value = base + i64::from(inputs.equipment[stat]);
    value += i64::from(contributions.flat[stat]);

    let rate = (100 + i64::from(contributions.rate[stat])).max(0);
    value = value * rate / 100;

    inputs.bounds.clamp(stat, value)
}

fn combat_base(stat: StatId, base: &BaseAttributes, attrs: &DerivedStats) -> i64 {
    let level = i64::from(base.level);
    let str = i64::from(attrs.str);
    let agi = i64::from(attrs.agi);
    let vit = i64::from(attrs.vit);
    let int = i64::from(attrs.int);
    let dex = i64::from(attrs.dex);
    let luk = i64::from(attrs.luk);

    match stat {
        StatId::MaxHp => i64::from(base.max_hp) * (100 + vit) / 100,
        StatId::MaxSp => i64::from(base.max_sp) * (100 + int) / 100,
        StatId::Atk => {
            let str_bonus = str / 10;
            i64::from(base.atk) + str + str_bonus * str_bonus + dex / 5 + luk / 5
        }
        StatId::Matk => {
            let int_bonus = int / 5;
            i64::from(base.matk) + int + int_bonus * int_bonus
        }
        StatId::Def => i64::from(base.def) + vit / 2,
        StatId::Mdef => i64::from(base.mdef) + int / 2,
        StatId::Hit => level + dex,
        StatId::Flee => level + agi,
        StatId::Critical => 10 + luk * 3,
        StatId::Speed => i64::from(base.speed),
        StatId::AttackDelay => {
            let delay = i64::from(base.attack_delay);
            delay - delay * (agi * 4 + dex) / 1000
        }
        // 1차 능력치는 attribute 레이어에서 처리된다.
        _ => base.attribute(stat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        status::{ActiveEffect, EffectKind},
    };

    fn base() -> BaseAttributes {
        BaseAttributes {
            level: 50,
            str: 30,
            agi: 20,
            vit: 20,
            int: 10,
            dex: 25,
            luk: 9,
            max_hp: 1000,
            max_sp: 200,
            atk: 100,
            matk: 20,
            def: 10,
            mdef: 5,
            speed: 150,
            attack_delay: 1000,
        }
    }

    #[test]
    fn bare_entity_uses_layered_formulas() {
        let config = EngineConfig::default();
        let db = EffectDatabase::builtin();
        let table = EffectTable::new();
        let equipment = StatBlock::new();
        let base = base();

        let stats = recalculate(&StatInputs {
            base: &base,
            equipment: &equipment,
            effects: &table,
            db: &db,
            bounds: &config.bounds,
        });

        assert_eq!(stats.str, 30);
        assert_eq!(stats.max_hp, 1200);
        assert_eq!(stats.max_sp, 220);
        // 100 + 30 + 3*3 + 25/5 + 9/5
        assert_eq!(stats.atk, 100 + 30 + 9 + 5 + 1);
        assert_eq!(stats.def, 20);
        assert_eq!(stats.hit, 75);
        assert_eq!(stats.flee, 70);
        assert_eq!(stats.critical, 37);
        // 1000 - 1000 * (80 + 25) / 1000
        assert_eq!(stats.attack_delay, 895);
    }

    #[test]
    fn override_skips_composition_for_that_stat_only() {
        let config = EngineConfig::default();
        let db = EffectDatabase::builtin();
        let mut table = EffectTable::new();
        let equipment = StatBlock::from_pairs([(StatId::Def, 40)]);
        let base = base();

        let desc = db.get(EffectKind::SteelBody).expect("steel body descriptor");
        table.insert(ActiveEffect::new(EffectKind::SteelBody, [5, 0, 0, 0], desc.groups));

        let stats = recalculate(&StatInputs {
            base: &base,
            equipment: &equipment,
            effects: &table,
            db: &db,
            bounds: &config.bounds,
        });

        assert_eq!(stats.def, 90, "equipment def must not leak through the override");
        assert_eq!(stats.mdef, 90);
        assert_eq!(stats.speed, 150 * 125 / 100);
    }

    /// 같은 효과 집합이면 넣은 순서와 상관없이 결과가 같다.
    #[test]
    fn insertion_order_does_not_change_the_result() {
        let config = EngineConfig::default();
        let db = EffectDatabase::builtin();
        let equipment = StatBlock::from_pairs([(StatId::Def, 40), (StatId::Atk, 15)]);
        let base = base();

        // 고정치(Blessing, Gloria, IncreaseAgi), 비율(Poison), 덮어쓰기(SteelBody, Curse)
        let kinds = [
            EffectKind::Poison,
            EffectKind::Blessing,
            EffectKind::SteelBody,
            EffectKind::Curse,
            EffectKind::Gloria,
            EffectKind::IncreaseAgi,
        ];
        let fill = |order: &mut dyn Iterator<Item = EffectKind>| {
            let mut table = EffectTable::new();
            for kind in order {
                let groups = db.get(kind).map(|d| d.groups).unwrap_or_default();
                table.insert(ActiveEffect::new(kind, [4, 0, 0, 0], groups));
            }
            table
        };
        let forward = fill(&mut kinds.iter().copied());
        let backward = fill(&mut kinds.iter().rev().copied());

        let compute = |table: &EffectTable| {
            recalculate(&StatInputs {
                base: &base,
                equipment: &equipment,
                effects: table,
                db: &db,
                bounds: &config.bounds,
            })
        };
        let first = compute(&forward);
        let second = compute(&backward);

        assert_eq!(first, second);
        assert_eq!(first.def, 90);
        assert_eq!(first.luk, 0);
    }
}

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub mod pipeline;

pub use pipeline::{recalculate, StatInputs};

/// 전역 스탯 ID
///
/// 선언 순서가 곧 파이프라인 평가 순서이므로 임의로 재배치하지 않는다.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatId {
    Str,
    Agi,
    Vit,
    Int,
    Dex,
    Luk,
    /// 최대 체력
    MaxHp,
    /// 최대 SP
    MaxSp,
    /// 물리 공격력
    Atk,
    /// 마법 공격력
    Matk,
    /// 물리 방어력
    Def,
    /// 마법 방어력
    Mdef,
    /// 명중
    Hit,
    /// 회피
    Flee,
    /// 치명타 (0.1% 단위)
    Critical,
    /// 한 칸 이동에 걸리는 시간(ms). 작을수록 빠름.
    Speed,
    /// 공격 주기(ms). 작을수록 빠름.
    AttackDelay,
}

impl StatId {
    pub const COUNT: usize = 17;

    pub const ALL: [StatId; Self::COUNT] = [
        StatId::Str,
        StatId::Agi,
        StatId::Vit,
        StatId::Int,
        StatId::Dex,
        StatId::Luk,
        StatId::MaxHp,
        StatId::MaxSp,
        StatId::Atk,
        StatId::Matk,
        StatId::Def,
        StatId::Mdef,
        StatId::Hit,
        StatId::Flee,
        StatId::Critical,
        StatId::Speed,
        StatId::AttackDelay,
    ];

    /// 1차 능력치 레이어
    pub const ATTRIBUTES: [StatId; 6] = [
        StatId::Str,
        StatId::Agi,
        StatId::Vit,
        StatId::Int,
        StatId::Dex,
        StatId::Luk,
    ];

    /// 1차 능력치로부터 파생되는 전투 레이어
    pub const COMBAT: [StatId; 11] = [
        StatId::MaxHp,
        StatId::MaxSp,
        StatId::Atk,
        StatId::Matk,
        StatId::Def,
        StatId::Mdef,
        StatId::Hit,
        StatId::Flee,
        StatId::Critical,
        StatId::Speed,
        StatId::AttackDelay,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// StatId 로 인덱싱되는 고정 크기 값 묶음
///
/// 장비 보정치처럼 "스탯별 정수 하나" 가 필요한 곳에서 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock([i32; StatId::COUNT]);

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// (스탯, 값) 목록으로부터 생성. 같은 스탯이 여러 번 나오면 합산한다.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (StatId, i32)>,
    {
        let mut block = Self::default();
        for (stat, value) in pairs {
            block[stat] = block[stat].saturating_add(value);
        }
        block
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatId, i32)> + '_ {
        StatId::ALL.iter().map(move |stat| (*stat, self.0[stat.index()]))
    }
}

impl Index<StatId> for StatBlock {
    type Output = i32;

    fn index(&self, stat: StatId) -> &Self::Output {
        &self.0[stat.index()]
    }
}

impl IndexMut<StatId> for StatBlock {
    fn index_mut(&mut self, stat: StatId) -> &mut Self::Output {
        &mut self.0[stat.index()]
    }
}

/// 파이프라인이 만들어 내는 최종 스탯 (캐시)
///
/// 전투/표시 계층은 매번 재계산하지 않고 이 값을 읽는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedStats {
    pub str: i32,
    pub agi: i32,
    pub vit: i32,
    pub int: i32,
    pub dex: i32,
    pub luk: i32,
    pub max_hp: i32,
    pub max_sp: i32,
    pub atk: i32,
    pub matk: i32,
    pub def: i32,
    pub mdef: i32,
    pub hit: i32,
    pub flee: i32,
    pub critical: i32,
    pub speed: i32,
    pub attack_delay: i32,
}

impl DerivedStats {
    pub fn get(&self, stat: StatId) -> i32 {
        use StatId::*;
        match stat {
            Str => self.str,
            Agi => self.agi,
            Vit => self.vit,
            Int => self.int,
            Dex => self.dex,
            Luk => self.luk,
            MaxHp => self.max_hp,
            MaxSp => self.max_sp,
            Atk => self.atk,
            Matk => self.matk,
            Def => self.def,
            Mdef => self.mdef,
            Hit => self.hit,
            Flee => self.flee,
            Critical => self.critical,
            Speed => self.speed,
            AttackDelay => self.attack_delay,
        }
    }

    pub fn set(&mut self, stat: StatId, value: i32) {
        use StatId::*;
        let slot = match stat {
            Str => &mut self.str,
            Agi => &mut self.agi,
            Vit => &mut self.vit,
            Int => &mut self.int,
            Dex => &mut self.dex,
            Luk => &mut self.luk,
            MaxHp => &mut self.max_hp,
            MaxSp => &mut self.max_sp,
            Atk => &mut self.atk,
            Matk => &mut self.matk,
            Def => &mut self.def,
            Mdef => &mut self.mdef,
            Hit => &mut self.hit,
            Flee => &mut self.flee,
            Critical => &mut self.critical,
            Speed => &mut self.speed,
            AttackDelay => &mut self.attack_delay,
        };
        *slot = value;
    }

    /// 값이 달라진 스탯 ID 목록 (StatId 선언 순)
    pub fn changed_from(&self, before: &DerivedStats) -> Vec<StatId> {
        StatId::ALL
            .iter()
            .copied()
            .filter(|stat| self.get(*stat) != before.get(*stat))
            .collect()
    }
}

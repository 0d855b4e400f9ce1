use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    stats::{DerivedStats, StatBlock, StatId},
    status::EffectTable,
};

mod arena;

pub use arena::{EntityArena, SpatialQuery};

/// 엔티티 식별자
///
/// 효과/타이머는 엔티티를 직접 참조하지 않고 이 ID 만 들고 있는다.
/// 파괴된 엔티티의 ID 로는 아레나 조회가 실패할 뿐 dangling 참조가 생기지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Player,
    Monster,
    /// 소환수/펫 등 주인이 있는 개체
    Companion,
}

bitflags! {
    /// 범위 질의에서 쓰는 엔티티 타입 필터
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TypeFilter: u8 {
        const PLAYER = 1 << 0;
        const MONSTER = 1 << 1;
        const COMPANION = 1 << 2;
    }
}

impl TypeFilter {
    pub fn matches(self, entity_type: EntityType) -> bool {
        let bit = match entity_type {
            EntityType::Player => TypeFilter::PLAYER,
            EntityType::Monster => TypeFilter::MONSTER,
            EntityType::Companion => TypeFilter::COMPANION,
        };
        self.contains(bit)
    }
}

/// 방어 속성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Neutral,
    Water,
    Earth,
    Fire,
    Wind,
    Poison,
    Holy,
    Dark,
    Ghost,
    Undead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Formless,
    Undead,
    Brute,
    Plant,
    Insect,
    Fish,
    Demon,
    DemiHuman,
    Angel,
    Dragon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 정사각 범위 판정용 거리 (체비쇼프)
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// 직업/몬스터 DB 에서 오는 기본 능력치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseAttributes {
    pub level: u32,
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
    /// 이동 속도(ms/칸)
    pub speed: i32,
    /// 공격 주기(ms)
    pub attack_delay: i32,
}

impl BaseAttributes {
    /// 1차 능력치 값. 1차 능력치가 아닌 스탯은 0.
    pub fn attribute(&self, stat: StatId) -> i64 {
        let value = match stat {
            StatId::Str => self.str,
            StatId::Agi => self.agi,
            StatId::Vit => self.vit,
            StatId::Int => self.int,
            StatId::Dex => self.dex,
            StatId::Luk => self.luk,
            _ => 0,
        };
        i64::from(value)
    }
}

impl Default for BaseAttributes {
    fn default() -> Self {
        Self {
            level: 1,
            str: 1,
            agi: 1,
            vit: 1,
            int: 1,
            dex: 1,
            luk: 1,
            max_hp: 40,
            max_sp: 10,
            atk: 0,
            matk: 0,
            def: 0,
            mdef: 0,
            speed: 150,
            attack_delay: 2000,
        }
    }
}

/// 엔티티 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub entity_type: EntityType,
    pub base: BaseAttributes,
    #[serde(default)]
    pub equipment: StatBlock,
    pub element: Element,
    pub race: Race,
    /// 보스 속성. 설정된 일부 효과에 면역.
    #[serde(default)]
    pub boss: bool,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub party: Option<u32>,
    #[serde(default)]
    pub master: Option<EntityId>,
}

impl EntitySpec {
    pub fn player(base: BaseAttributes) -> Self {
        Self {
            entity_type: EntityType::Player,
            base,
            equipment: StatBlock::new(),
            element: Element::Neutral,
            race: Race::DemiHuman,
            boss: false,
            position: Position::default(),
            party: None,
            master: None,
        }
    }

    pub fn monster(base: BaseAttributes) -> Self {
        Self {
            entity_type: EntityType::Monster,
            race: Race::Formless,
            ..Self::player(base)
        }
    }

    pub fn companion(base: BaseAttributes, master: EntityId) -> Self {
        Self {
            entity_type: EntityType::Companion,
            race: Race::Brute,
            master: Some(master),
            ..Self::player(base)
        }
    }

    pub fn element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn race(mut self, race: Race) -> Self {
        self.race = race;
        self
    }

    pub fn boss(mut self) -> Self {
        self.boss = true;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn party(mut self, party: u32) -> Self {
        self.party = Some(party);
        self
    }

    pub fn equipment(mut self, equipment: StatBlock) -> Self {
        self.equipment = equipment;
        self
    }
}

/// 전투 개체 한 명
///
/// 효과 테이블, 그룹 비트마스크(테이블 내부), 파생 스탯 캐시를 직접 소유한다.
#[derive(Debug)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) entity_type: EntityType,
    pub(crate) base: BaseAttributes,
    pub(crate) equipment: StatBlock,
    pub(crate) element: Element,
    pub(crate) race: Race,
    pub(crate) boss: bool,
    pub(crate) position: Position,
    pub(crate) party: Option<u32>,
    pub(crate) master: Option<EntityId>,
    pub(crate) companions: Vec<EntityId>,
    pub(crate) alive: bool,
    pub(crate) hp: i32,
    pub(crate) sp: i32,
    pub(crate) effects: EffectTable,
    pub(crate) derived: DerivedStats,
}

impl Entity {
    pub(crate) fn from_spec(id: EntityId, spec: EntitySpec) -> Self {
        Self {
            id,
            entity_type: spec.entity_type,
            base: spec.base,
            equipment: spec.equipment,
            element: spec.element,
            race: spec.race,
            boss: spec.boss,
            position: spec.position,
            party: spec.party,
            master: spec.master,
            companions: Vec::new(),
            alive: true,
            hp: 0,
            sp: 0,
            effects: EffectTable::new(),
            derived: DerivedStats::default(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn is_player(&self) -> bool {
        self.entity_type == EntityType::Player
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn race(&self) -> Race {
        self.race
    }

    pub fn is_boss(&self) -> bool {
        self.boss
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn party(&self) -> Option<u32> {
        self.party
    }

    pub fn master(&self) -> Option<EntityId> {
        self.master
    }

    pub fn companions(&self) -> &[EntityId] {
        &self.companions
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn sp(&self) -> i32 {
        self.sp
    }

    pub fn base(&self) -> &BaseAttributes {
        &self.base
    }

    pub fn effects(&self) -> &EffectTable {
        &self.effects
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    /// 같은 파티이거나 자기 자신이면 아군
    pub fn is_ally_of(&self, other: &Entity) -> bool {
        if self.id == other.id {
            return true;
        }
        match (self.party, other.party) {
            (Some(a), Some(b)) => a == b,
            _ => self.master == Some(other.id) || other.master == Some(self.id),
        }
    }

    /// 현재 HP/SP 를 최대치 이내로 맞춘다.
    pub(crate) fn clamp_resources(&mut self) {
        self.hp = self.hp.clamp(0, self.derived.max_hp.max(0));
        self.sp = self.sp.clamp(0, self.derived.max_sp.max(0));
    }

    pub fn can_act(&self) -> bool {
        self.alive && self.effects.groups().allows_action()
    }

    pub fn can_move(&self) -> bool {
        self.alive && self.effects.groups().allows_movement()
    }

    pub fn can_cast(&self) -> bool {
        self.alive && self.effects.groups().allows_casting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_filter_matches_only_selected_types() {
        let filter = TypeFilter::PLAYER | TypeFilter::COMPANION;
        assert!(filter.matches(EntityType::Player));
        assert!(filter.matches(EntityType::Companion));
        assert!(!filter.matches(EntityType::Monster));
    }

    #[test]
    fn distance_is_square_range() {
        let a = Position::new(0, 0);
        assert_eq!(a.distance(&Position::new(3, -2)), 3);
        assert_eq!(a.distance(&Position::new(-1, 5)), 5);
    }

    #[test]
    fn allies_share_party_or_master() {
        let base = BaseAttributes::default();
        let a = Entity::from_spec(EntityId::new(1), EntitySpec::player(base).party(7));
        let b = Entity::from_spec(EntityId::new(2), EntitySpec::player(base).party(7));
        let c = Entity::from_spec(EntityId::new(3), EntitySpec::player(base).party(8));
        let pet = Entity::from_spec(EntityId::new(4), EntitySpec::companion(base, a.id()));

        assert!(a.is_ally_of(&b));
        assert!(!a.is_ally_of(&c));
        assert!(a.is_ally_of(&pet));
        assert!(pet.is_ally_of(&a));
    }
}

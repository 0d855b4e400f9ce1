use std::collections::HashMap;

use super::{Entity, EntityId, EntitySpec, Position, TypeFilter};

/// 월드 범위 질의
///
/// 전파(오라, 링크 거리 검사)에서만 사용한다. 반환 순서는 호출자가 의존하면 안 된다.
pub trait SpatialQuery {
    fn entities_in_range(&self, origin: Position, radius: i32, filter: TypeFilter)
        -> Vec<EntityId>;
}

/// ID 로 엔티티를 소유하는 아레나
///
/// 엔티티끼리, 효과와 엔티티 사이의 참조는 모두 EntityId 를 거친다.
#[derive(Debug, Default)]
pub struct EntityArena {
    entities: HashMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: EntitySpec) -> EntityId {
        self.next_id += 1;
        let id = EntityId::new(self.next_id);

        let master = spec.master;
        self.entities.insert(id, Entity::from_spec(id, spec));

        if let Some(master) = master.and_then(|m| self.entities.get_mut(&m)) {
            master.companions.push(id);
        }
        id
    }

    /// 아레나에서 제거한다. 주인/소환수 역참조도 같이 정리한다.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;

        if let Some(master) = entity.master.and_then(|m| self.entities.get_mut(&m)) {
            master.companions.retain(|c| *c != id);
        }
        for companion in &entity.companions {
            if let Some(companion) = self.entities.get_mut(companion) {
                companion.master = None;
            }
        }
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// ID 오름차순
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl SpatialQuery for EntityArena {
    fn entities_in_range(
        &self,
        origin: Position,
        radius: i32,
        filter: TypeFilter,
    ) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.alive && filter.matches(e.entity_type))
            .filter(|e| e.position.distance(&origin) <= radius)
            .map(|e| e.id)
            .collect();
        found.sort();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BaseAttributes;

    #[test]
    fn companions_are_linked_both_ways() {
        let mut arena = EntityArena::new();
        let master = arena.insert(EntitySpec::player(BaseAttributes::default()));
        let pet = arena.insert(EntitySpec::companion(BaseAttributes::default(), master));

        assert_eq!(arena.get(master).unwrap().companions(), &[pet]);

        arena.remove(pet);
        assert!(arena.get(master).unwrap().companions().is_empty());
    }

    #[test]
    fn removing_master_orphans_companions() {
        let mut arena = EntityArena::new();
        let master = arena.insert(EntitySpec::player(BaseAttributes::default()));
        let pet = arena.insert(EntitySpec::companion(BaseAttributes::default(), master));

        arena.remove(master);
        assert_eq!(arena.get(pet).unwrap().master(), None);
        assert!(!arena.contains(master));
    }

    #[test]
    fn range_query_filters_type_and_distance() {
        let mut arena = EntityArena::new();
        let base = BaseAttributes::default();
        let near = arena.insert(EntitySpec::player(base).at(Position::new(2, 2)));
        let _far = arena.insert(EntitySpec::player(base).at(Position::new(20, 0)));
        let mob = arena.insert(EntitySpec::monster(base).at(Position::new(1, 0)));

        let players = arena.entities_in_range(Position::new(0, 0), 5, TypeFilter::PLAYER);
        assert_eq!(players, vec![near]);

        let all = arena.entities_in_range(Position::new(0, 0), 5, TypeFilter::all());
        assert_eq!(all, vec![near, mob]);
    }
}

use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::{
    entity::EntityId,
    error::EngineError,
    stats::StatId,
    status::{EffectKind, EndCause},
};

pub const LOG_VERSION: u32 = 1;

/// 주기 틱 한 번의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Damaged { amount: i32 },
    /// 피해가 다른 효과에 의해 보류됨
    Suppressed,
    Drained { amount: i32 },
    LinkHeld,
    Revealed { targets: u32 },
    Pulsed { targets: u32 },
}

/// 표시 계층으로 나가는 알림
///
/// 엔진은 패킷을 만들지 않는다. 프로토콜 계층이 이 콜백을 받아 변환한다.
/// 모든 메서드는 기본 구현이 비어 있어서 필요한 것만 구현하면 된다.
pub trait StatusObserver {
    fn on_effect_started(
        &mut self,
        _at_ms: u64,
        _entity: EntityId,
        _kind: EffectKind,
        _icon: Option<u16>,
    ) {
    }

    fn on_effect_ended(&mut self, _at_ms: u64, _entity: EntityId, _kind: EffectKind, _cause: EndCause) {}

    fn on_derived_stats_changed(&mut self, _at_ms: u64, _entity: EntityId, _changed: &[StatId]) {}

    fn on_periodic_tick(
        &mut self,
        _at_ms: u64,
        _entity: EntityId,
        _kind: EffectKind,
        _outcome: TickOutcome,
    ) {
    }
}

/// 아무것도 하지 않는 관찰자
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl StatusObserver for NullObserver {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    EffectStarted {
        entity: EntityId,
        kind: EffectKind,
        icon: Option<u16>,
    },
    EffectEnded {
        entity: EntityId,
        kind: EffectKind,
        cause: EndCause,
    },
    DerivedStatsChanged {
        entity: EntityId,
        changed: Vec<StatId>,
    },
    PeriodicTick {
        entity: EntityId,
        kind: EffectKind,
        outcome: TickOutcome,
    },
}

impl Notification {
    pub fn entity(&self) -> EntityId {
        match self {
            Notification::EffectStarted { entity, .. }
            | Notification::EffectEnded { entity, .. }
            | Notification::DerivedStatsChanged { entity, .. }
            | Notification::PeriodicTick { entity, .. } => *entity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub time_ms: u64,
    pub seq: u64,
    pub notification: Notification,
}

/// 모든 알림을 순서대로 기록하는 관찰자
///
/// 테스트와 status-sim 에서 결과 확인용으로 쓴다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recorder {
    pub version: u32,
    pub entries: Vec<NotificationEntry>,
    #[serde(skip)]
    next_seq: u64,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            version: LOG_VERSION,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, time_ms: u64, notification: Notification) {
        self.entries.push(NotificationEntry {
            time_ms,
            seq: self.next_seq,
            notification,
        });
        self.next_seq += 1;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().map(|e| &e.notification)
    }

    pub fn ended(&self, entity: EntityId, kind: EffectKind) -> usize {
        self.notifications()
            .filter(|n| {
                matches!(n, Notification::EffectEnded { entity: e, kind: k, .. }
                    if *e == entity && *k == kind)
            })
            .count()
    }

    pub fn started(&self, entity: EntityId, kind: EffectKind) -> usize {
        self.notifications()
            .filter(|n| {
                matches!(n, Notification::EffectStarted { entity: e, kind: k, .. }
                    if *e == entity && *k == kind)
            })
            .count()
    }

    pub fn ticks(&self, entity: EntityId, kind: EffectKind) -> Vec<TickOutcome> {
        self.notifications()
            .filter_map(|n| match n {
                Notification::PeriodicTick {
                    entity: e,
                    kind: k,
                    outcome,
                } if *e == entity && *k == kind => Some(*outcome),
                _ => None,
            })
            .collect()
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_pretty_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut recorder: Recorder = serde_json::from_reader(reader)?;
        recorder.next_seq = recorder.entries.last().map(|e| e.seq + 1).unwrap_or(0);
        Ok(recorder)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusObserver for Recorder {
    fn on_effect_started(&mut self, at_ms: u64, entity: EntityId, kind: EffectKind, icon: Option<u16>) {
        self.push(at_ms, Notification::EffectStarted { entity, kind, icon });
    }

    fn on_effect_ended(&mut self, at_ms: u64, entity: EntityId, kind: EffectKind, cause: EndCause) {
        self.push(at_ms, Notification::EffectEnded { entity, kind, cause });
    }

    fn on_derived_stats_changed(&mut self, at_ms: u64, entity: EntityId, changed: &[StatId]) {
        self.push(
            at_ms,
            Notification::DerivedStatsChanged {
                entity,
                changed: changed.to_vec(),
            },
        );
    }

    fn on_periodic_tick(
        &mut self,
        at_ms: u64,
        entity: EntityId,
        kind: EffectKind,
        outcome: TickOutcome,
    ) {
        self.push(at_ms, Notification::PeriodicTick { entity, kind, outcome });
    }
}

//! status-sim 시나리오
//!
//! RON 파일에 엔티티 목록과 시각별 명령을 적어 두고 엔진을 돌려 알림 로그를 얻는다.
//! 엔티티 ID 는 목록 순서대로 1 부터 부여된다.

use std::{path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    entity::{EntityId, EntitySpec, Position},
    error::EngineError,
    notify::Recorder,
    stats::{StatBlock, StatId},
    status::{ClearReason, EffectDatabase, EffectKind, EndCause, StartRequest},
    StatusEngine,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    pub entities: Vec<EntitySpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    pub action: Action,
}

/// 시작 요청의 시나리오 표기. 생략한 항목은 StartRequest 기본값.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartStep {
    pub kind: EffectKind,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub chance: Option<u32>,
    #[serde(default)]
    pub unconditional: bool,
    #[serde(default)]
    pub fixed_duration: bool,
    #[serde(default)]
    pub partner: Option<EntityId>,
    #[serde(default)]
    pub source: Option<EntityId>,
}

impl StartStep {
    pub fn to_request(&self) -> StartRequest {
        let mut request = StartRequest::new(self.kind);
        if let Some(level) = self.level {
            request = request.level(level);
        }
        if let Some(ms) = self.duration_ms {
            request = request.duration(ms);
        }
        if let Some(chance) = self.chance {
            request = request.chance(chance);
        }
        if self.unconditional {
            request = request.unconditional();
        }
        if self.fixed_duration {
            request = request.fixed_duration();
        }
        if let Some(partner) = self.partner {
            request = request.partner(partner);
        }
        if let Some(source) = self.source {
            request = request.source(source);
        }
        request
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    Start { entity: EntityId, start: StartStep },
    End {
        entity: EntityId,
        kind: EffectKind,
        cause: EndCause,
    },
    Dispel { entity: EntityId },
    Kill { entity: EntityId },
    Despawn { entity: EntityId },
    Move { entity: EntityId, x: i32, y: i32 },
    Equip {
        entity: EntityId,
        equipment: Vec<(StatId, i32)>,
    },
}

impl Scenario {
    pub fn from_ron_str(source: &str) -> Result<Self, EngineError> {
        Ok(ron::de::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// 시나리오를 끝까지 실행하고 알림 기록을 돌려준다.
    ///
    /// seed 를 주면 시나리오 파일의 값보다 우선한다. 마지막 명령 이후에도 남은
    /// 타이머는 `settle_ms` 만큼 더 진행한다.
    pub fn run(
        &self,
        config: Arc<EngineConfig>,
        db: Arc<EffectDatabase>,
        seed: Option<u64>,
        settle_ms: u64,
    ) -> Result<Recorder, EngineError> {
        let mut engine = StatusEngine::new(config, db, seed.unwrap_or(self.seed));
        for spec in &self.entities {
            engine.spawn(spec.clone());
        }

        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.at_ms);

        for step in steps {
            engine.advance(step.at_ms);
            match &step.action {
                Action::Start { entity, start } => {
                    let result = engine.start_effect(*entity, start.to_request());
                    tracing::info!("{}ms start {} on {}: {:?}", step.at_ms, start.kind, entity, result);
                }
                Action::End {
                    entity,
                    kind,
                    cause,
                } => {
                    engine.end_effect(*entity, *kind, *cause)?;
                }
                Action::Dispel { entity } => engine.clear_all(*entity, ClearReason::Dispel)?,
                Action::Kill { entity } => engine.kill(*entity)?,
                Action::Despawn { entity } => engine.despawn(*entity)?,
                Action::Move { entity, x, y } => {
                    engine.set_position(*entity, Position::new(*x, *y))?
                }
                Action::Equip { entity, equipment } => engine
                    .set_equipment(*entity, StatBlock::from_pairs(equipment.iter().copied()))?,
            }
        }

        let end = engine.now_ms().saturating_add(settle_ms);
        engine.advance(end);

        Ok(engine.into_observer())
    }
}

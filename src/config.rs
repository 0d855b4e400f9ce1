use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{error::EngineError, stats::StatId, status::EffectKind};

const CONFIG_FILE: &str = "config/status_engine.toml";

/// 상태 이상 엔진 설정 전체
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub resistance: ResistanceConfig,
    pub duration: DurationConfig,
    pub bounds: StatBounds,
    pub persistence: PersistenceConfig,
    pub world: WorldConfig,
}

/// 저항 판정 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResistanceConfig {
    /// 모든 저항 공식에 더해지는 기본값(%)
    pub base: i32,
    /// luk 보정 나눗수 (base + stat + luk / luk_divisor)
    pub luk_divisor: i32,
    /// 몬스터의 유효 확률 배율 하한(%)
    pub monster_min_rate: i32,
    /// 보스가 면역인 효과 목록
    pub boss_immune: Vec<EffectKind>,
}

impl ResistanceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.luk_divisor <= 0 {
            return Err(format!(
                "Invalid resistance.luk_divisor: {} (must be > 0)",
                self.luk_divisor
            ));
        }
        if !(0..=100).contains(&self.monster_min_rate) {
            return Err(format!(
                "Invalid resistance.monster_min_rate: {} (must be 0~100)",
                self.monster_min_rate
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationConfig {
    /// 대상 저항으로 지속시간을 줄일지 여부
    pub reduce_by_resistance: bool,
}

/// 스탯 하나의 최소/최대
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBound {
    pub stat: StatId,
    pub min: i32,
    pub max: i32,
}

/// 파이프라인 마지막 단계의 clamp 범위
///
/// 목록에 없는 스탯은 i32 범위로만 잘린다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBounds {
    pub entries: Vec<StatBound>,
}

impl StatBounds {
    pub fn get(&self, stat: StatId) -> Option<&StatBound> {
        self.entries.iter().find(|bound| bound.stat == stat)
    }

    pub fn clamp(&self, stat: StatId, value: i64) -> i32 {
        let (min, max) = match self.get(stat) {
            Some(bound) => (i64::from(bound.min), i64::from(bound.max)),
            None => (i64::from(i32::MIN), i64::from(i32::MAX)),
        };
        // min > max 는 validate 에서 걸러진다.
        value.clamp(min, max) as i32
    }

    pub fn validate(&self) -> Result<(), String> {
        for bound in &self.entries {
            if bound.min > bound.max {
                return Err(format!(
                    "Invalid bounds for {:?}: min {} > max {}",
                    bound.stat, bound.min, bound.max
                ));
            }
        }
        for (i, bound) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|b| b.stat == bound.stat) {
                return Err(format!("Duplicated bounds entry for {:?}", bound.stat));
            }
        }
        Ok(())
    }
}

/// 재접속 후에도 유지되는 효과 목록
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub kinds: Vec<EffectKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// 링크 효과의 기본 유지 거리(칸)
    pub link_range: i32,
    /// 오라 효과 재부여 주기(ms)
    pub aura_pulse_ms: u64,
}

/// 전역 엔진 설정 인스턴스
static ENGINE_CONFIG: Lazy<EngineConfig> = Lazy::new(|| {
    EngineConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load status engine config: {}. Using defaults.", e);
        EngineConfig::default()
    })
});

impl EngineConfig {
    /// 전역 설정 인스턴스 가져오기
    pub fn global() -> &'static EngineConfig {
        &ENGINE_CONFIG
    }

    /// 설정 파일 로드
    pub fn load() -> Result<Self, EngineError> {
        let config_path = Self::find_config_file()?;
        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::from_toml_str(&content)?;

        tracing::info!("Status engine config loaded from: {:?}", config_path);
        Ok(config)
    }

    /// TOML 문자열 파싱 + 검증
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.resistance.validate()?;
        self.bounds.validate()?;
        if self.world.link_range < 0 {
            return Err(format!(
                "Invalid world.link_range: {} (must be >= 0)",
                self.world.link_range
            ));
        }
        if self.world.aura_pulse_ms == 0 {
            return Err("Invalid world.aura_pulse_ms: 0 (must be > 0)".to_string());
        }
        Ok(())
    }

    /// 설정 파일 위치 찾기
    fn find_config_file() -> Result<PathBuf, EngineError> {
        // 1. 현재 작업 디렉토리
        let cwd = std::env::current_dir()?;
        let cwd_config = cwd.join(CONFIG_FILE);
        if cwd_config.exists() {
            return Ok(cwd_config);
        }

        // 2. 실행 파일 위치 기준
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let exe_config = exe_dir.join(CONFIG_FILE);
                if exe_config.exists() {
                    return Ok(exe_config);
                }
            }
        }

        Err(EngineError::Config(format!(
            "{} not found, using built-in defaults",
            CONFIG_FILE
        )))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        use StatId::*;

        let bound = |stat, min, max| StatBound { stat, min, max };
        let mut entries: Vec<StatBound> = StatId::ATTRIBUTES
            .iter()
            .map(|stat| bound(*stat, 0, 999))
            .collect();
        entries.extend([
            bound(MaxHp, 1, 1_000_000),
            bound(MaxSp, 0, 1_000_000),
            bound(Atk, 0, 100_000),
            bound(Matk, 0, 100_000),
            bound(Def, 0, 100),
            bound(Mdef, 0, 100),
            bound(Hit, 1, 10_000),
            bound(Flee, 0, 10_000),
            bound(Critical, 0, 1_000),
            bound(Speed, 20, 1_000),
            bound(AttackDelay, 200, 10_000),
        ]);

        Self {
            resistance: ResistanceConfig {
                base: 3,
                luk_divisor: 3,
                monster_min_rate: 50,
                boss_immune: vec![
                    EffectKind::Stone,
                    EffectKind::Freeze,
                    EffectKind::Stun,
                    EffectKind::Sleep,
                    EffectKind::Silence,
                    EffectKind::Quagmire,
                    EffectKind::DecreaseAgi,
                    EffectKind::SignumCrucis,
                    EffectKind::Provoke,
                ],
            },
            duration: DurationConfig {
                reduce_by_resistance: true,
            },
            bounds: StatBounds { entries },
            persistence: PersistenceConfig {
                kinds: vec![
                    EffectKind::Riding,
                    EffectKind::Wedding,
                    EffectKind::NoChat,
                    EffectKind::Endure,
                    EffectKind::Weight50,
                    EffectKind::Weight90,
                ],
            },
            world: WorldConfig {
                link_range: 7,
                aura_pulse_ms: 10_000,
            },
        }
    }
}

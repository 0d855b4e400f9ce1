//! 데이터 테이블로 표현할 수 없는 종류별 처리
//!
//! 대부분의 종류는 서술자만으로 동작한다. 여기 있는 함수는 계산식이 대상의
//! 현재 상태에 의존하는 소수 종류만 다룬다.

use crate::entity::Entity;

use super::EffectKind;

/// 시작 시 파라미터 보정
pub(crate) fn start_params(kind: EffectKind, target: &Entity, mut params: [i32; 4]) -> [i32; 4] {
    let level = params[0];
    match kind {
        EffectKind::Kyrie => {
            // 보호막 내구도, 막을 수 있는 횟수
            let max_hp = i64::from(target.derived().max_hp);
            let barrier = max_hp * i64::from(level * 2 + 10) / 100;
            params[1] = i32::try_from(barrier).unwrap_or(i32::MAX);
            params[2] = level / 2 + 5;
        }
        EffectKind::SignumCrucis => {
            params[1] = 10 + level * 2;
        }
        _ => {}
    }
    params
}

/// 저항 감소 전에 적용되는 지속시간 보정
pub(crate) fn adjust_duration(kind: EffectKind, target: &Entity, duration_ms: u64) -> u64 {
    match kind {
        EffectKind::DecreaseAgi if target.is_player() => duration_ms / 2,
        _ => duration_ms,
    }
}

/// 슬롯에 들어간 직후의 1회성 처리
pub(crate) fn after_start(kind: EffectKind, target: &mut Entity) {
    if kind == EffectKind::Berserk {
        target.sp = 0;
    }
}

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
};

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

use super::EffectKind;

/// 예약된 타이머 하나를 가리키는 핸들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// 타이머가 만료될 때 처리할 대상 (엔티티 + 효과 슬롯)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerTarget {
    pub entity: EntityId,
    pub kind: EffectKind,
}

/// 만료되어 꺼내진 타이머
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub target: TimerTarget,
    pub due_ms: u64,
}

/// 외부 타이머 설비
///
/// 엔진은 이 trait 으로만 타이머를 등록/취소한다. 등록된 핸들은 효과 하나가
/// 독점하고, 자연 만료(pop_due) 또는 cancel 중 정확히 한 번만 해제된다.
pub trait TimerService {
    fn schedule(&mut self, due_ms: u64, target: TimerTarget) -> TimerHandle;

    /// 아직 살아있는 핸들이면 true
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// now_ms 까지 만료된 타이머를 시간순으로 하나 꺼낸다.
    fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer>;

    /// 등록되어 있고 아직 해제되지 않은 타이머 수
    fn pending(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due_ms: u64,
    handle: TimerHandle,
    target: TimerTarget,
}

/// BinaryHeap 에서 가장 이른 타이머가 먼저 나오도록 순서를 뒤집는다.
/// 같은 시각이면 먼저 등록된(핸들 번호가 작은) 타이머가 먼저다.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const COMPACT_MIN_ENTRIES: usize = 64;

/// 기본 타이머 구현: 최소 힙 + 지연 취소
///
/// cancel 은 live 집합에서만 지우고, 힙에 남은 항목은 pop 시점에 버린다.
/// 취소된 항목이 살아있는 항목보다 훨씬 많아지면 힙을 한 번 정리한다.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    live: HashSet<TimerHandle>,
    next_handle: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 만료 시각 (취소된 항목 포함 가능)
    pub fn peek_due(&self) -> Option<u64> {
        self.heap.peek().map(|s| s.due_ms)
    }

    fn compact_if_bloated(&mut self) {
        let total = self.heap.len();
        if total < COMPACT_MIN_ENTRIES || total <= self.live.len() * 2 {
            return;
        }
        let live = &self.live;
        self.heap.retain(|s| live.contains(&s.handle));
        tracing::trace!("timer heap compacted: {} -> {}", total, self.heap.len());
    }
}

impl TimerService for TimerQueue {
    fn schedule(&mut self, due_ms: u64, target: TimerTarget) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.heap.push(Scheduled {
            due_ms,
            handle,
            target,
        });
        self.live.insert(handle);
        tracing::trace!("timer {:?} scheduled at {}ms for {:?}", handle, due_ms, target);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.live.remove(&handle);
        if removed {
            tracing::trace!("timer {:?} cancelled", handle);
            self.compact_if_bloated();
        }
        removed
    }

    fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer> {
        while let Some(top) = self.heap.peek() {
            if top.due_ms > now_ms {
                return None;
            }
            let Some(scheduled) = self.heap.pop() else {
                return None;
            };
            if self.live.remove(&scheduled.handle) {
                return Some(FiredTimer {
                    handle: scheduled.handle,
                    target: scheduled.target,
                    due_ms: scheduled.due_ms,
                });
            }
            // 취소된 항목
        }
        None
    }

    fn pending(&self) -> usize {
        self.live.len()
    }
}

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// 행동/이동을 막는 효과
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CrowdControl: u32 {
        const STONE = 1 << 0;
        const FREEZE = 1 << 1;
        const STUN = 1 << 2;
        const SLEEP = 1 << 3;
        const BLADE_STOP = 1 << 4;
        /// 이동만 막는다.
        const ANKLE_SNARE = 1 << 5;
        /// 이동만 막는다.
        const SPIDER_WEB = 1 << 6;

        /// 행동 자체가 불가능한 상태
        const DISABLING = Self::STONE.bits()
            | Self::FREEZE.bits()
            | Self::STUN.bits()
            | Self::SLEEP.bits()
            | Self::BLADE_STOP.bits();
    }
}

bitflags! {
    /// 속성/상태 이상
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Ailment: u32 {
        const POISON = 1 << 0;
        const DEADLY_POISON = 1 << 1;
        const CURSE = 1 << 2;
        const SILENCE = 1 << 3;
        const CONFUSION = 1 << 4;
        const BLIND = 1 << 5;
        const BLEEDING = 1 << 6;
        const SIGNUM_CRUCIS = 1 << 7;
    }
}

bitflags! {
    /// 특수 자세/외형 상태
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Posture: u32 {
        const HIDING = 1 << 0;
        const CLOAKING = 1 << 1;
        const CHASEWALK = 1 << 2;
        const SIGHT = 1 << 3;
        const RUWACH = 1 << 4;
        const DANCING = 1 << 5;
        const RIDING = 1 << 6;
        const WEDDING = 1 << 7;
        const BERSERK = 1 << 8;
        const STEEL_BODY = 1 << 9;
        const TWO_HAND_QUICKEN = 1 << 10;
        const OVERTHRUST = 1 << 11;
        const ENERGY_COAT = 1 << 12;
        const MARIONETTE = 1 << 13;
        const ASSUMPTIO = 1 << 14;

        const INVISIBLE = Self::HIDING.bits() | Self::CLOAKING.bits() | Self::CHASEWALK.bits();
    }
}

/// 세 비트마스크 묶음
///
/// 효과 하나가 기여하는 비트이기도 하고, 엔티티 전체의 캐시 요약이기도 하다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupBits {
    pub cc: CrowdControl,
    pub ailment: Ailment,
    pub posture: Posture,
}

impl GroupBits {
    pub const NONE: GroupBits = GroupBits {
        cc: CrowdControl::empty(),
        ailment: Ailment::empty(),
        posture: Posture::empty(),
    };

    pub const fn cc(cc: CrowdControl) -> Self {
        Self {
            cc,
            ..Self::NONE
        }
    }

    pub const fn ailment(ailment: Ailment) -> Self {
        Self {
            ailment,
            ..Self::NONE
        }
    }

    pub const fn posture(posture: Posture) -> Self {
        Self {
            posture,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cc.is_empty() && self.ailment.is_empty() && self.posture.is_empty()
    }

    pub fn intersects(&self, other: &GroupBits) -> bool {
        self.cc.intersects(other.cc)
            || self.ailment.intersects(other.ailment)
            || self.posture.intersects(other.posture)
    }

    pub fn insert(&mut self, other: GroupBits) {
        self.cc.insert(other.cc);
        self.ailment.insert(other.ailment);
        self.posture.insert(other.posture);
    }

    pub fn remove(&mut self, other: GroupBits) {
        self.cc.remove(other.cc);
        self.ailment.remove(other.ailment);
        self.posture.remove(other.posture);
    }

    pub fn allows_action(&self) -> bool {
        !self.cc.intersects(CrowdControl::DISABLING)
    }

    pub fn allows_movement(&self) -> bool {
        self.cc.is_empty()
    }

    pub fn allows_casting(&self) -> bool {
        self.allows_action() && !self.ailment.contains(Ailment::SILENCE)
    }

    pub fn is_invisible(&self) -> bool {
        self.posture.intersects(Posture::INVISIBLE)
    }
}

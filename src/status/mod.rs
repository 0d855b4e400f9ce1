mod catalog;
pub mod descriptor;
pub mod groups;
pub(crate) mod hooks;
pub mod kind;
pub mod request;
pub mod table;
pub mod timer;

pub use descriptor::{
    AuraSpec, DescriptorOverride, EffectDatabase, EffectDescriptor, LinkBreak, LinkSpec,
    ModifierOp, ModifierSpec, PeriodicSpec, ResistFormula, StackPolicy, StatOverride,
    TickAction,
};
pub use groups::{Ailment, CrowdControl, GroupBits, Posture};
pub use kind::EffectKind;
pub use request::{
    Applied, ClearReason, EndCause, Rejected, StartFlags, StartOutcome, StartRequest,
    CHANCE_MAX,
};
pub use table::{ActiveEffect, EffectTable};
pub use timer::{FiredTimer, TimerHandle, TimerQueue, TimerService, TimerTarget};

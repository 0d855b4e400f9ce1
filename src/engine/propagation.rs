//! 다른 엔티티로 번지는 처리
//!
//! 링크 상대, 오라 범위 아군, 소환수에 대한 시작/종료는 전부 명령 큐를 거친다.
//! 오라 최초 부여만 시작 직후에 명령으로 쌓이고, 이후 펄스는 주기 틱이 담당한다.

use crate::{
    entity::{EntityId, SpatialQuery},
    notify::StatusObserver,
    status::{
        ActiveEffect, EffectDescriptor, EndCause, LinkBreak, StartFlags, StartRequest,
        TimerService,
    },
};

use super::{Command, EndGuard, StatusEngine};

/// 전파로 받은 사본의 시작 플래그
fn relay_flags() -> StartFlags {
    StartFlags::UNCONDITIONAL | StartFlags::FIXED_DURATION | StartFlags::RELAYED
}

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    pub(super) fn propagate_start(
        &mut self,
        id: EntityId,
        desc: &EffectDescriptor,
        request: &StartRequest,
        duration: Option<u64>,
    ) {
        if let (Some(link), Some(partner)) = (desc.link, request.partner) {
            if let (true, Some(partner_kind)) = (link.start_partner, link.partner_kind) {
                let links_back = self
                    .arena
                    .get(partner)
                    .and_then(|p| p.effects.get(partner_kind))
                    .map(|e| e.partner == Some(id))
                    .unwrap_or(false);
                if !links_back {
                    let mut follow = StartRequest::new(partner_kind)
                        .params(request.params)
                        .partner(id)
                        .source(id)
                        .flags(StartFlags::UNCONDITIONAL | StartFlags::FIXED_DURATION);
                    if let Some(ms) = duration {
                        follow = follow.duration(ms);
                    }
                    self.push_command(Command::Start {
                        target: partner,
                        request: follow,
                    });
                }
            }
        }

        if request.flags.contains(StartFlags::RELAYED) {
            return;
        }

        if desc.aura.is_some() {
            self.pulse_aura(id, desc, request.params[0]);
        }

        if desc.mirror_to_companions {
            let companions = self
                .arena
                .get(id)
                .map(|e| e.companions.clone())
                .unwrap_or_default();
            for companion in companions {
                let mut copy = StartRequest::new(desc.kind)
                    .params(request.params)
                    .source(id)
                    .flags(relay_flags());
                if let Some(ms) = duration {
                    copy = copy.duration(ms);
                }
                self.push_command(Command::Start {
                    target: companion,
                    request: copy,
                });
            }
        }
    }

    /// 오라 한 번 펄스: 범위 안 아군에게 부여 명령을 쌓고 대상 수를 돌려준다.
    ///
    /// 시전자 자신과, 같은 효과를 직접 시전해 가지고 있는 대상은 건너뛴다.
    pub(super) fn pulse_aura(&mut self, id: EntityId, desc: &EffectDescriptor, level: i32) -> u32 {
        let Some(aura) = desc.aura else {
            return 0;
        };
        let Some(origin) = self.arena.get(id) else {
            return 0;
        };

        let targets: Vec<EntityId> = self
            .arena
            .entities_in_range(origin.position, aura.radius, aura.filter)
            .into_iter()
            .filter(|target_id| *target_id != id)
            .filter(|target_id| {
                self.arena
                    .get(*target_id)
                    .map(|target| {
                        let own_cast = target
                            .effects
                            .get(aura.grant)
                            .map(|e| !e.relayed)
                            .unwrap_or(false);
                        target.is_ally_of(origin) && !own_cast
                    })
                    .unwrap_or(false)
            })
            .collect();

        for target in &targets {
            self.push_command(Command::Start {
                target: *target,
                request: StartRequest::new(aura.grant)
                    .level(level)
                    .duration(aura.grant_duration_ms)
                    .source(id)
                    .flags(relay_flags()),
            });
        }
        targets.len() as u32
    }

    pub(super) fn propagate_end(&mut self, id: EntityId, effect: &ActiveEffect, desc: &EffectDescriptor) {
        if let (Some(link), Some(partner)) = (desc.link, effect.partner) {
            match (link.on_break, link.partner_kind) {
                (LinkBreak::EndPartner, Some(partner_kind)) => self.push_command(Command::End {
                    target: partner,
                    kind: partner_kind,
                    cause: EndCause::LinkBroken,
                    guard: EndGuard::Partner(id),
                }),
                (LinkBreak::Detach, Some(partner_kind)) => self.push_command(Command::Detach {
                    target: partner,
                    kind: partner_kind,
                    from: id,
                }),
                _ => {}
            }
        }

        if effect.relayed {
            return;
        }

        if let Some(aura) = desc.aura {
            if let Some(origin) = self.arena.get(id) {
                let targets =
                    self.arena
                        .entities_in_range(origin.position, aura.radius, aura.filter);
                for target in targets.into_iter().filter(|t| *t != id) {
                    self.push_command(Command::End {
                        target,
                        kind: aura.grant,
                        cause: EndCause::Cancelled,
                        guard: EndGuard::Source(id),
                    });
                }
            }
        }

        if desc.mirror_to_companions {
            let companions = self
                .arena
                .get(id)
                .map(|e| e.companions.clone())
                .unwrap_or_default();
            for companion in companions {
                self.push_command(Command::End {
                    target: companion,
                    kind: desc.kind,
                    cause: EndCause::Cancelled,
                    guard: EndGuard::Source(id),
                });
            }
        }
    }
}

use crate::{notify::StatusObserver, status::TimerService};

use super::{Command, EndGuard, StatusEngine};

impl<T: TimerService, O: StatusObserver> StatusEngine<T, O> {
    pub(super) fn push_command(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// 큐에 쌓인 후속 명령을 모두 처리한다. 처리 중 새로 쌓인 명령도 같은 루프에서 처리된다.
    pub(super) fn drain_commands(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;

        while let Some(command) = self.queue.pop_front() {
            self.execute_command(command);
        }

        self.draining = false;
    }

    fn execute_command(&mut self, command: Command) {
        match command {
            Command::Start { target, request } => {
                if !self.arena.contains(target) {
                    tracing::warn!("dropping start of {} for missing entity {}", request.kind, target);
                    return;
                }
                let kind = request.kind;
                match self.start_inner(target, request) {
                    Ok(applied) => {
                        tracing::trace!("follow-up start {} on {}: {:?}", kind, target, applied)
                    }
                    Err(rejected) => {
                        tracing::debug!("follow-up start {} on {} rejected: {:?}", kind, target, rejected)
                    }
                }
            }
            Command::End {
                target,
                kind,
                cause,
                guard,
            } => {
                let Some(entity) = self.arena.get(target) else {
                    tracing::warn!("dropping end of {} for missing entity {}", kind, target);
                    return;
                };
                let Some(effect) = entity.effects.get(kind) else {
                    return;
                };
                let matches = match guard {
                    EndGuard::Any => true,
                    EndGuard::Source(source) => effect.source == Some(source),
                    EndGuard::Partner(partner) => effect.partner == Some(partner),
                };
                if matches {
                    self.end_inner(target, kind, cause);
                }
            }
            Command::Detach { target, kind, from } => {
                let Some(effect) = self
                    .arena
                    .get_mut(target)
                    .and_then(|e| e.effects.get_mut(kind))
                else {
                    return;
                };
                if effect.partner == Some(from) {
                    effect.partner = None;
                    tracing::trace!("{} on {} detached from {}", kind, target, from);
                }
            }
        }
    }
}

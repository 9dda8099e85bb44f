// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-driven reconciliation of the kernel address sets.
//!
//! The reconciler is a two-state machine driven by decoded feed events.
//!
//! ```text
//!                    up: ensure both sets
//!      *-----------*---------------------->*-----------*
//!      | NoSession |                       | SessionUp |
//!      *-----------*<----------------------*-----------*
//!                    down: flush both sets
//! ```
//!
//! Announce and withdraw events add and remove members of the set for
//! their family. Route events are applied in whichever state they
//! arrive; before the first up event the store rejects them and the
//! failure is logged like any other. Every store failure is logged and
//! dropped, no call is retried, and nothing here aborts the feed loop.
//! On session loss both sets are flushed, so stale members never
//! outlive the session that announced them.

use crate::messages::{
    set_member, Event, PeerState, RouteAction, RouteEvent,
};
use crate::sets::{SetFamily, SetNames, SetStore};
use crate::{dbg, err, inf, trc, wrn};
use slog::Logger;
use std::fmt;

/// Reconciliation states. There is exactly one session: the speaker
/// feeding this process peers with one neighbor, so no state is keyed
/// by peer identity. A restart-aware extension would add a holding
/// state between SessionUp and NoSession that defers the flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmState {
    /// No session has been reported up, or the last report was down.
    NoSession,
    /// The peering session is established and updates are flowing.
    SessionUp,
}

impl fmt::Display for FsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session"),
            Self::SessionUp => write!(f, "session up"),
        }
    }
}

pub struct Reconciler<S: SetStore> {
    names: SetNames,
    store: S,
    state: FsmState,
    log: Logger,
}

impl<S: SetStore> Reconciler<S> {
    pub fn new(names: SetNames, store: S, log: Logger) -> Self {
        Self {
            names,
            store,
            state: FsmState::NoSession,
            log,
        }
    }

    pub fn current(&self) -> FsmState {
        self.state
    }

    /// Apply one decoded event. Never fails: store errors are logged
    /// and dropped.
    pub fn handle_event(&mut self, event: Event) {
        trc!(self; "event: {:?}", event);
        match event {
            Event::Session(s) => match s.state {
                PeerState::Up => self.peer_up(),
                PeerState::Down => self.peer_down(),
            },
            Event::Route(r) => self.apply_route(r),
        }
    }

    fn peer_up(&mut self) {
        for family in [SetFamily::V4, SetFamily::V6] {
            let name = self.names.name(family);
            if let Err(e) = self.store.ensure(name, family) {
                err!(self; "ensure {} ({}): {}", name, family, e);
            }
        }
        self.transition(FsmState::SessionUp);
    }

    fn peer_down(&mut self) {
        for family in [SetFamily::V4, SetFamily::V6] {
            let name = self.names.name(family);
            if let Err(e) = self.store.flush(name) {
                err!(self; "flush {}: {}", name, e);
            }
        }
        self.transition(FsmState::NoSession);
    }

    fn apply_route(&self, route: RouteEvent) {
        if self.state == FsmState::NoSession {
            wrn!(self; "route update before session up");
        }
        let name = self.names.name(route.family);
        for prefix in &route.prefixes {
            let member = set_member(route.family, prefix);
            let result = match route.action {
                RouteAction::Announce => {
                    self.store.add(name, member, route.family)
                }
                RouteAction::Withdraw => {
                    self.store.remove(name, member, route.family)
                }
            };
            match result {
                Ok(()) => {
                    dbg!(self; "{} {} -> {}", route.action, member, name)
                }
                // A failed member does not stop the rest of the event.
                Err(e) => {
                    err!(self; "{} {} -> {}: {}", route.action, member, name, e)
                }
            }
        }
    }

    fn transition(&mut self, next: FsmState) {
        if self.state != next {
            inf!(self; "transition -> {}", next);
            self.state = next;
        }
    }
}

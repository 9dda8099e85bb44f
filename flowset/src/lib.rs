// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! This crate keeps a pair of kernel IP address sets, one IPv4 and one
//! IPv6, synchronized with the FlowSpec state a BGP speaker reports
//! over a line-oriented JSON feed. Lines are decoded into typed events
//! by [`messages`], folded through the session state machine in [`sm`],
//! and turned into idempotent set mutations behind the [`sets`]
//! gateway. Processing is strictly sequential: one line is fully
//! decoded and applied before the next is read, so set state always
//! reflects a prefix of the feed.

use crate::error::Error;
use crate::messages::decode_line;
use crate::sets::SetStore;
use crate::sm::Reconciler;
use slog::{info, warn, Logger};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod error;
pub mod log;
pub mod messages;
pub mod sets;
pub mod sets_ipset;
#[cfg(test)]
pub mod sets_mem;
pub mod sm;


/// Default name of the IPv4 address set.
pub const DEFAULT_IP4_SET: &str = "flowspec4";

/// Default name of the IPv6 address set.
pub const DEFAULT_IP6_SET: &str = "flowspec6";

/// Drive a reconciler from a line-oriented feed until the feed ends or
/// `shutdown` is raised.
///
/// The shutdown flag is checked once per iteration, at the read-line
/// boundary, so a signal taking effect mid-feed leaves already-applied
/// mutations in place and never a half-applied line. Lines that fail
/// to decode are logged and skipped. End of feed and shutdown both
/// return `Ok`; a hard read error on the feed is the only failure.
pub fn run<F: BufRead, S: SetStore>(
    mut feed: F,
    reconciler: &mut Reconciler<S>,
    shutdown: &AtomicBool,
    log: &Logger,
) -> Result<(), Error> {
    let mut line = String::new();
    let mut lines = 0u64;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!(log, "shutdown requested, stopping feed loop");
            return Ok(());
        }
        line.clear();
        if feed.read_line(&mut line)? == 0 {
            info!(log, "feed closed"; "lines" => lines);
            return Ok(());
        }
        lines += 1;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match decode_line(input) {
            Ok(events) => {
                for event in events {
                    reconciler.handle_event(event);
                }
            }
            Err(e) => {
                warn!(log, "skipping undecodable line: {}", e);
            }
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A [`SetStore`] backed by the platform `ipset(8)` utility. Each
//! operation is one blocking invocation of the program; `-exist` makes
//! create, add and del forgiving of repeats, which is exactly the
//! idempotence the store contract asks for. A missing set is still an
//! error for add, del and flush, surfaced to the caller through the
//! captured stderr.

use crate::error::Error;
use crate::sets::{SetFamily, SetStore};
use slog::{trace, Logger};
use std::process::Command;

/// Program invoked for every set mutation.
pub const IPSET_PROGRAM: &str = "ipset";

pub struct SetStoreIpset {
    log: Logger,
}

impl SetStoreIpset {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }

    fn ipset(&self, args: &[&str]) -> Result<(), Error> {
        let out = Command::new(IPSET_PROGRAM).args(args).output()?;
        if !out.status.success() {
            return Err(Error::SetCommand(format!(
                "{} {}: {}",
                IPSET_PROGRAM,
                args.join(" "),
                String::from_utf8_lossy(&out.stderr).trim(),
            )));
        }
        trace!(self.log, "{} {}", IPSET_PROGRAM, args.join(" "));
        Ok(())
    }
}

fn family_arg(family: SetFamily) -> &'static str {
    match family {
        SetFamily::V4 => "inet",
        SetFamily::V6 => "inet6",
    }
}

impl SetStore for SetStoreIpset {
    fn ensure(&self, name: &str, family: SetFamily) -> Result<(), Error> {
        // hash:net members are prefixes, not point addresses.
        self.ipset(&[
            "-exist",
            "create",
            name,
            "hash:net",
            "family",
            family_arg(family),
        ])
    }

    fn flush(&self, name: &str) -> Result<(), Error> {
        self.ipset(&["flush", name])
    }

    fn add(
        &self,
        name: &str,
        member: &str,
        _family: SetFamily,
    ) -> Result<(), Error> {
        self.ipset(&["-exist", "add", name, member])
    }

    fn remove(
        &self,
        name: &str,
        member: &str,
        _family: SetFamily,
    ) -> Result<(), Error> {
        self.ipset(&["-exist", "del", name, member])
    }
}

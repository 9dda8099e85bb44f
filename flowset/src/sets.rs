// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The address-set gateway. [`SetStore`] is the seam between the
//! reconciler and the kernel sets it maintains; [`crate::sets_ipset`]
//! implements it over the platform set utility and the test suite
//! substitutes an in-memory store.

use crate::error::Error;
use std::fmt;

/// Address family of a set and its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetFamily {
    V4,
    V6,
}

impl fmt::Display for SetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "v4"),
            Self::V6 => write!(f, "v6"),
        }
    }
}

/// The pair of set names the reconciler maintains, one per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNames {
    pub v4: String,
    pub v6: String,
}

impl SetNames {
    pub fn name(&self, family: SetFamily) -> &str {
        match family {
            SetFamily::V4 => &self.v4,
            SetFamily::V6 => &self.v6,
        }
    }
}

impl Default for SetNames {
    fn default() -> Self {
        Self {
            v4: crate::DEFAULT_IP4_SET.to_owned(),
            v6: crate::DEFAULT_IP6_SET.to_owned(),
        }
    }
}

/// Mutating capability over named kernel address sets.
///
/// Implementations must be idempotent: ensuring a set that already
/// exists, adding a member that is already present and removing a member
/// that is absent all succeed. Operating on a set that has never been
/// created is an error and is surfaced to the caller, who decides what
/// to do with it.
pub trait SetStore {
    /// Create the named set for the given family if it does not already
    /// exist.
    fn ensure(&self, name: &str, family: SetFamily) -> Result<(), Error>;

    /// Remove every member from the named set. The set itself remains
    /// defined.
    fn flush(&self, name: &str) -> Result<(), Error>;

    /// Add a prefix member to the named set.
    fn add(
        &self,
        name: &str,
        member: &str,
        family: SetFamily,
    ) -> Result<(), Error>;

    /// Remove a prefix member from the named set.
    fn remove(
        &self,
        name: &str,
        member: &str,
        family: SetFamily,
    ) -> Result<(), Error>;
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory [`SetStore`] for the test suite. It models the edge
//! semantics of the real backend: duplicate creates, duplicate adds and
//! absent removes succeed, while any operation against a set that was
//! never created fails. Every call is journaled before its outcome is
//! decided so failed attempts are visible to assertions.

use crate::error::Error;
use crate::sets::{SetFamily, SetStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOp {
    Ensure(String, SetFamily),
    Flush(String),
    Add(String, String),
    Remove(String, String),
}

#[derive(Debug)]
struct MemSet {
    family: SetFamily,
    members: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MemInner {
    sets: BTreeMap<String, MemSet>,
    ops: Vec<SetOp>,
}

#[derive(Debug, Clone, Default)]
pub struct SetStoreMem {
    inner: Arc<Mutex<MemInner>>,
}

impl SetStoreMem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of the named set, sorted. Empty when the set does not
    /// exist.
    pub fn members(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .sets
            .get(name)
            .map(|s| s.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn defined(&self, name: &str) -> bool {
        self.inner.lock().unwrap().sets.contains_key(name)
    }

    /// Every gateway call in invocation order, including failed ones.
    pub fn ops(&self) -> Vec<SetOp> {
        self.inner.lock().unwrap().ops.clone()
    }
}

impl SetStore for SetStoreMem {
    fn ensure(&self, name: &str, family: SetFamily) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(SetOp::Ensure(name.to_owned(), family));
        match inner.sets.get(name) {
            Some(s) if s.family != family => {
                Err(Error::FamilyMismatch(name.to_owned()))
            }
            Some(_) => Ok(()),
            None => {
                inner.sets.insert(
                    name.to_owned(),
                    MemSet {
                        family,
                        members: BTreeSet::new(),
                    },
                );
                Ok(())
            }
        }
    }

    fn flush(&self, name: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(SetOp::Flush(name.to_owned()));
        match inner.sets.get_mut(name) {
            Some(s) => {
                s.members.clear();
                Ok(())
            }
            None => Err(Error::NoSuchSet(name.to_owned())),
        }
    }

    fn add(
        &self,
        name: &str,
        member: &str,
        _family: SetFamily,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .ops
            .push(SetOp::Add(name.to_owned(), member.to_owned()));
        match inner.sets.get_mut(name) {
            Some(s) => {
                s.members.insert(member.to_owned());
                Ok(())
            }
            None => Err(Error::NoSuchSet(name.to_owned())),
        }
    }

    fn remove(
        &self,
        name: &str,
        member: &str,
        _family: SetFamily,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .ops
            .push(SetOp::Remove(name.to_owned(), member.to_owned()));
        match inner.sets.get_mut(name) {
            Some(s) => {
                s.members.remove(member);
                Ok(())
            }
            None => Err(Error::NoSuchSet(name.to_owned())),
        }
    }
}

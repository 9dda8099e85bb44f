// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error {0}")]
    Io(#[from] std::io::Error),

    #[error("set command failed: {0}")]
    SetCommand(String),

    #[error("no such set {0}")]
    NoSuchSet(String),

    #[error("set {0} exists with a different family")]
    FamilyMismatch(String),
}

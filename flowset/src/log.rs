// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logging macros for types that carry a `log` and a `state`. Messages
//! are prefixed with the current reconciliation state so transitions can
//! be followed in the feed's own order.

#[macro_export]
macro_rules! trc {
    ($self:ident; $($args:tt)+) => {
        slog::trace!(
            $self.log,
            "[{}] {}",
            $self.state,
            format!($($args)+)
        )
    }
}

#[macro_export]
macro_rules! dbg {
    ($self:ident; $($args:tt)+) => {
        slog::debug!(
            $self.log,
            "[{}] {}",
            $self.state,
            format!($($args)+)
        )
    }
}

#[macro_export]
macro_rules! inf {
    ($self:ident; $($args:tt)+) => {
        slog::info!(
            $self.log,
            "[{}] {}",
            $self.state,
            format!($($args)+)
        )
    }
}

#[macro_export]
macro_rules! wrn {
    ($self:ident; $($args:tt)+) => {
        slog::warn!(
            $self.log,
            "[{}] {}",
            $self.state,
            format!($($args)+)
        )
    }
}

#[macro_export]
macro_rules! err {
    ($self:ident; $($args:tt)+) => {
        slog::error!(
            $self.log,
            "[{}] {}",
            $self.state,
            format!($($args)+)
        )
    }
}

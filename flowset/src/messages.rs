// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of the speaker's monitoring feed.
//!
//! The speaker emits one JSON object per line. Two message classes
//! matter here, selected by the top level `type` key.
//!
//! Session transitions:
//!
//! ```text
//! {"type": "state", "neighbor": {"address": {...}, "state": "up"}}
//! ```
//!
//! FlowSpec updates, announce and withdraw, carrying source prefixes
//! per address family:
//!
//! ```text
//! {"type": "update", "neighbor": {"direction": "receive", "message":
//!   {"update": {"announce": {"ipv4 flow": {"no-nexthop":
//!     [{"source-ipv4": ["100.64.1.0/24"]}]}}}}}}
//! ```
//!
//! Everything else the speaker prints, open and keepalive chatter,
//! notifications, end of rib markers, locally originated updates echoed
//! with direction `send`, decodes to no events at all. Decoding is two
//! stage: the envelope picks the message class, and only then is the
//! neighbor payload held to that class's shape. Only a line violating
//! the shape of its own class is an error.

use crate::error::Error;
use crate::sets::SetFamily;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A decoded feed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Session(SessionEvent),
    Route(RouteEvent),
}

/// A peering session transition reported by the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEvent {
    pub state: PeerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Up,
    Down,
}

/// A FlowSpec route update for a single address family. A feed line
/// covering both families decodes into two of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEvent {
    pub direction: Direction,
    pub action: RouteAction,
    pub family: SetFamily,
    /// Source prefixes exactly as the speaker rendered them. IPv6
    /// entries still carry the trailing offset, see [`set_member`].
    pub prefixes: Vec<String>,
}

/// Which way an update traveled over the peering session. Updates the
/// speaker originates itself are echoed into the feed with direction
/// `send` and are not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Receive,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    Announce,
    Withdraw,
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Announce => write!(f, "announce"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

// Raw wire shapes, private to this module. Fields are optional so a
// line missing any of them classifies cleanly instead of erroring. Keys
// the feed carries beyond these, timestamps, peer addresses, path
// attributes, are ignored by serde.

#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(rename = "type")]
    kind: Option<String>,
    neighbor: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StateNeighbor {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateNeighbor {
    direction: Option<String>,
    message: Option<NeighborMessage>,
}

#[derive(Debug, Deserialize)]
struct NeighborMessage {
    update: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct UpdateMessage {
    announce: Option<AnnounceFamilies>,
    withdraw: Option<WithdrawFamilies>,
}

// Announced flows sit one level deeper than withdrawn ones: the match
// list is keyed by next hop, and FlowSpec rules have none.

#[derive(Debug, Deserialize)]
struct AnnounceFamilies {
    #[serde(rename = "ipv4 flow")]
    ipv4: Option<NoNextHop>,
    #[serde(rename = "ipv6 flow")]
    ipv6: Option<NoNextHop>,
}

#[derive(Debug, Deserialize)]
struct NoNextHop {
    #[serde(rename = "no-nexthop", default)]
    matches: Vec<FlowMatch>,
}

#[derive(Debug, Deserialize)]
struct WithdrawFamilies {
    #[serde(rename = "ipv4 flow")]
    ipv4: Option<Vec<FlowMatch>>,
    #[serde(rename = "ipv6 flow")]
    ipv6: Option<Vec<FlowMatch>>,
}

/// One FlowSpec match object. Only source prefixes translate into set
/// members; destination, port and protocol components are not carried
/// into events.
#[derive(Debug, Deserialize)]
struct FlowMatch {
    #[serde(rename = "source-ipv4", default)]
    source_ipv4: Vec<String>,
    #[serde(rename = "source-ipv6", default)]
    source_ipv6: Vec<String>,
}

impl FlowMatch {
    fn sources(&self, family: SetFamily) -> &[String] {
        match family {
            SetFamily::V4 => &self.source_ipv4,
            SetFamily::V6 => &self.source_ipv6,
        }
    }
}

/// Decode one feed line into zero, one or two events.
///
/// A session line yields at most one [`Event::Session`]. An update line
/// yields one [`Event::Route`] per family key present, IPv4 first. A
/// line that parses but matches no recognized shape yields an empty
/// vector; a line that does not parse at all is an [`Error::Decode`].
pub fn decode_line(line: &str) -> Result<Vec<Event>, Error> {
    let msg: FeedMessage = serde_json::from_str(line)?;
    let Some(neighbor) = msg.neighbor else {
        return Ok(Vec::new());
    };
    match msg.kind.as_deref() {
        Some("state") => session_events(neighbor),
        Some("update") => route_events(neighbor),
        _ => Ok(Vec::new()),
    }
}

fn session_events(neighbor: Value) -> Result<Vec<Event>, Error> {
    let n: StateNeighbor = serde_json::from_value(neighbor)?;
    let state = match n.state.as_deref() {
        Some("up") => PeerState::Up,
        Some("down") => PeerState::Down,
        // Intermediate states such as "connected" are session plumbing,
        // not transitions acted on here.
        _ => return Ok(Vec::new()),
    };
    Ok(vec![Event::Session(SessionEvent { state })])
}

fn route_events(neighbor: Value) -> Result<Vec<Event>, Error> {
    let n: UpdateNeighbor = serde_json::from_value(neighbor)?;
    if n.direction.as_deref() != Some("receive") {
        return Ok(Vec::new());
    }
    let Some(update) = n.message.and_then(|m| m.update) else {
        return Ok(Vec::new());
    };
    // Withdraw wins should a line carry both keys.
    let (action, v4, v6) = if let Some(w) = update.withdraw {
        (RouteAction::Withdraw, w.ipv4, w.ipv6)
    } else if let Some(a) = update.announce {
        (
            RouteAction::Announce,
            a.ipv4.map(|f| f.matches),
            a.ipv6.map(|f| f.matches),
        )
    } else {
        // End of rib markers and attribute only updates land here.
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    if let Some(matches) = v4 {
        out.push(route_event(action, SetFamily::V4, &matches));
    }
    if let Some(matches) = v6 {
        out.push(route_event(action, SetFamily::V6, &matches));
    }
    Ok(out)
}

fn route_event(
    action: RouteAction,
    family: SetFamily,
    matches: &[FlowMatch],
) -> Event {
    // Flatten across match objects in feed order, duplicates preserved.
    let prefixes = matches
        .iter()
        .flat_map(|m| m.sources(family))
        .cloned()
        .collect();
    Event::Route(RouteEvent {
        direction: Direction::Receive,
        action,
        family,
        prefixes,
    })
}

/// The offset suffix the speaker appends to IPv6 flow prefixes.
const V6_OFFSET_SUFFIX: &str = "/0";

/// Render a decoded prefix string as a set member.
///
/// The speaker prints IPv6 flow prefixes as `address/length/offset`,
/// e.g. `2001:db8::/32/0`, and the kernel set wants `address/length`.
/// The offset is stripped here and nowhere else. IPv4 prefixes pass
/// through unchanged.
pub fn set_member(family: SetFamily, prefix: &str) -> &str {
    match family {
        SetFamily::V4 => prefix,
        SetFamily::V6 => strip_v6_offset(prefix),
    }
}

/// Strip the trailing offset rendered after an IPv6 prefix length. A
/// string without the suffix, however short, passes through unchanged.
fn strip_v6_offset(prefix: &str) -> &str {
    prefix.strip_suffix(V6_OFFSET_SUFFIX).unwrap_or(prefix)
}

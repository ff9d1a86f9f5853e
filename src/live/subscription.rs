//! Subscription manager: which selection the stream should carry.

use crate::shared::Selection;
use crate::ws::MessageOut;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubscriptionState {
    #[default]
    Idle,
    Subscribed(Selection),
}

/// Tracks the active selection and produces the subscribe commands for it.
///
/// Starts `Idle`, moves to `Subscribed` on the first selection and never goes
/// back. The transport remembers nothing across reconnects, so this is the
/// only place the current subscription lives.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionManager {
    state: SubscriptionState,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `selection`.
    ///
    /// Returns the subscribe command when the selection actually changed and
    /// `None` when it equals the current one.
    pub fn set_selection(&mut self, selection: Selection) -> Option<MessageOut> {
        if self.current() == Some(&selection) {
            return None;
        }
        let msg = MessageOut::subscribe(&selection);
        self.state = SubscriptionState::Subscribed(selection);
        Some(msg)
    }

    /// The subscribe command to replay after the transport reconnects.
    ///
    /// Always for the selection active now, not the one active when the
    /// connection dropped.
    pub fn on_reconnect(&self) -> Option<MessageOut> {
        self.current().map(MessageOut::subscribe)
    }

    pub fn current(&self) -> Option<&Selection> {
        match &self.state {
            SubscriptionState::Subscribed(selection) => Some(selection),
            SubscriptionState::Idle => None,
        }
    }

    pub fn state(&self) -> &SubscriptionState {
        &self.state
    }
}

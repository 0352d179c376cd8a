//! The tri-state vote ledger.
//!
//! Each `(item, voter)` pair is in one of three states: no vote, up, or down.
//! Casting the vote already on record retracts it; casting the opposite vote
//! switches it; casting onto no vote records it.
//!
//! | current | desired | transition | outcome    |
//! |---------|---------|------------|------------|
//! | none    | v       | `Insert`   | `Recorded` |
//! | up      | up      | `Retract`  | `Cleared`  |
//! | up      | down    | `Switch`   | `Recorded` |
//! | down    | down    | `Retract`  | `Cleared`  |
//! | down    | up      | `Switch`   | `Recorded` |

/// The store operation a cast vote resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
  /// No row exists; insert one.
  Insert,
  /// The same vote exists; delete it.
  Retract,
  /// The opposite vote exists; replace it.
  Switch,
}

impl VoteTransition {
  pub fn from_state(current: Option<bool>, desired: bool) -> Self {
    match current {
      None => Self::Insert,
      Some(v) if v == desired => Self::Retract,
      Some(_) => Self::Switch,
    }
  }

  pub fn outcome(self) -> VoteOutcome {
    match self {
      Self::Insert | Self::Switch => VoteOutcome::Recorded,
      Self::Retract => VoteOutcome::Cleared,
    }
  }
}

/// What a cast vote left behind for the voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
  /// The voter's vote on the item has been cleared.
  Cleared,
  /// The desired vote is now on record.
  Recorded,
}

impl VoteOutcome {
  /// The wire result code: `1` when recorded, `0` when cleared.
  pub fn code(self) -> u8 {
    match self {
      Self::Cleared => 0,
      Self::Recorded => 1,
    }
  }
}

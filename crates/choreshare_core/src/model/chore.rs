//! Chore estimate and assignment records.
//!
//! # Responsibility
//! - Describe one chore with per-user time estimates and an optional pin.
//! - Describe the final, immutable assignment decision for one chore.
//!
//! # Invariants
//! - `name` and `day` are non-blank; together they form a unique key per run.
//! - `ChoreException` only ever maps to wire values `0`, `1` or `2`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One of the two participants of an allocation run.
///
/// Serialized as the numeric owner id (`1` or `2`) used by the assignment sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum UserSlot {
    One,
    Two,
}

impl UserSlot {
    /// Both slots in tie-break order.
    pub const BOTH: [UserSlot; 2] = [UserSlot::One, UserSlot::Two];

    /// Stable numeric user id (`1` or `2`).
    pub fn id(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Position of this user inside two-element estimate arrays.
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The opposite participant.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl Display for UserSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "user{}", self.id())
    }
}

impl From<UserSlot> for u8 {
    fn from(value: UserSlot) -> Self {
        value.id()
    }
}

impl TryFrom<u8> for UserSlot {
    type Error = ChoreValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(ChoreValidationError::UnsupportedUser(other)),
        }
    }
}

/// Manual override that pins a chore away from one user's normal consideration.
///
/// Wire values: `0` = none, `1` = away from user 1, `2` = away from user 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChoreException {
    #[default]
    None,
    AwayFromUser1,
    AwayFromUser2,
}

impl ChoreException {
    /// Returns the user this chore is pinned away from, if any.
    pub fn pinned_away_from(self) -> Option<UserSlot> {
        match self {
            Self::None => None,
            Self::AwayFromUser1 => Some(UserSlot::One),
            Self::AwayFromUser2 => Some(UserSlot::Two),
        }
    }

    /// Whether this value carries any override.
    pub fn is_pinned(self) -> bool {
        self != Self::None
    }

    /// Wire value of this tag.
    pub fn as_wire(self) -> u8 {
        match self {
            Self::None => 0,
            Self::AwayFromUser1 => 1,
            Self::AwayFromUser2 => 2,
        }
    }
}

impl From<ChoreException> for u8 {
    fn from(value: ChoreException) -> Self {
        value.as_wire()
    }
}

impl TryFrom<u8> for ChoreException {
    type Error = ChoreValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::AwayFromUser1),
            2 => Ok(Self::AwayFromUser2),
            other => Err(ChoreValidationError::UnsupportedException(other)),
        }
    }
}

/// Natural key of a chore within one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChoreKey {
    pub name: String,
    pub day: String,
}

impl ChoreKey {
    pub fn new(name: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            day: day.into(),
        }
    }
}

impl Display for ChoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.day)
    }
}

/// Input record: one chore with each user's own time estimate.
///
/// Deserializes from `{"name": .., "day": .., "estimate": [u1, u2], "exception": 0|1|2}`;
/// `exception` defaults to `0` when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreEstimate {
    pub name: String,
    pub day: String,
    /// Estimated minutes, indexed by `UserSlot::index()`.
    #[serde(rename = "estimate")]
    pub estimate_minutes: [u32; 2],
    #[serde(default)]
    pub exception: ChoreException,
}

impl ChoreEstimate {
    /// Creates an estimate without any override.
    pub fn new(name: impl Into<String>, day: impl Into<String>, estimate_minutes: [u32; 2]) -> Self {
        Self {
            name: name.into(),
            day: day.into(),
            estimate_minutes,
            exception: ChoreException::None,
        }
    }

    /// Returns this estimate with the given override applied.
    pub fn with_exception(mut self, exception: ChoreException) -> Self {
        self.exception = exception;
        self
    }

    pub fn key(&self) -> ChoreKey {
        ChoreKey::new(self.name.as_str(), self.day.as_str())
    }

    /// Estimate for one user, in minutes.
    pub fn estimate_for(&self, user: UserSlot) -> u32 {
        self.estimate_minutes[user.index()]
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `BlankName` / `BlankDay` when either key part is empty or whitespace.
    pub fn validate(&self) -> Result<(), ChoreValidationError> {
        if self.name.trim().is_empty() {
            return Err(ChoreValidationError::BlankName {
                day: self.day.clone(),
            });
        }
        if self.day.trim().is_empty() {
            return Err(ChoreValidationError::BlankDay {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Final decision for one chore, produced exactly once per chore per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedChore {
    pub name: String,
    pub day: String,
    /// Normalized fraction charged to the owner's running load.
    pub time_value: f64,
    /// Whether the chore carried an exception tag in input.
    pub is_exception: bool,
    pub owner: UserSlot,
}

impl AssignedChore {
    pub fn key(&self) -> ChoreKey {
        ChoreKey::new(self.name.as_str(), self.day.as_str())
    }
}

/// Input validation failures detected before allocation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoreValidationError {
    /// Chore name is empty or whitespace.
    BlankName { day: String },
    /// Chore day is empty or whitespace.
    BlankDay { name: String },
    /// The same `(name, day)` pair appears more than once.
    DuplicateKey(ChoreKey),
    /// Exception tag outside `0|1|2`.
    UnsupportedException(u8),
    /// User id outside `1|2`.
    UnsupportedUser(u8),
    /// A user's estimates sum to zero, so fractions cannot be derived.
    ZeroTotalEstimate(UserSlot),
}

impl Display for ChoreValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { day } => write!(f, "chore name must not be blank (day `{day}`)"),
            Self::BlankDay { name } => write!(f, "chore day must not be blank (chore `{name}`)"),
            Self::DuplicateKey(key) => write!(f, "duplicate chore key: {key}"),
            Self::UnsupportedException(value) => {
                write!(f, "unsupported exception value {value}; expected 0|1|2")
            }
            Self::UnsupportedUser(value) => {
                write!(f, "unsupported user id {value}; expected 1|2")
            }
            Self::ZeroTotalEstimate(user) => {
                write!(f, "total estimated time for {user} is zero")
            }
        }
    }
}

impl Error for ChoreValidationError {}

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Card suit, in the wire-format order `c`, `d`, `h`, `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(Suit::Clubs),
            'd' => Some(Suit::Diamonds),
            'h' => Some(Suit::Hearts),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Card rank. Aces are high (14); the wheel straight is the only place an
/// ace plays low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A single playing card. Ordering of hands is decided by rank alone; suit
/// only matters for flush detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl FromStr for Card {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(EngineError::InvalidCard(s.to_string()));
        };
        let rank = Rank::from_char(r).ok_or_else(|| EngineError::InvalidCard(s.to_string()))?;
        let suit = Suit::from_char(u).ok_or_else(|| EngineError::InvalidCard(s.to_string()))?;
        Ok(Card { rank, suit })
    }
}

// Cards cross the bot boundary as their two-character text form.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Betting phase of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub fn index(self) -> u8 {
        match self {
            Street::Preflop => 0,
            Street::Flop => 1,
            Street::Turn => 2,
            Street::River => 3,
            Street::Showdown => 4,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        };
        write!(f, "{name}")
    }
}

/// Seat status within one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Active,
    Folded,
    AllIn,
}

/// A validated action. Bet and raise amounts are the seat's total
/// commitment for the street after the action, not increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(u32),
    Raise(u32),
    AllIn,
}

/// Untrusted action shape as a bot proposes it. Amounts may be fractional
/// or out of range; normalization fixes both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl ProposedAction {
    pub fn of(kind: &str) -> Self {
        ProposedAction {
            kind: kind.to_string(),
            amount: None,
        }
    }

    pub fn with_amount(kind: &str, amount: f64) -> Self {
        ProposedAction {
            kind: kind.to_string(),
            amount: Some(amount),
        }
    }
}

/// What the injected decision callable reports for one decision point,
/// mirroring the sandbox run result: an action on success, captured log
/// output either way, and an error description on failure.
#[derive(Debug, Clone, Default)]
pub struct BotReply {
    pub action: Option<ProposedAction>,
    pub logs: Option<String>,
    pub error: Option<String>,
}

impl BotReply {
    pub fn action(action: ProposedAction) -> Self {
        BotReply {
            action: Some(action),
            logs: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        BotReply {
            action: None,
            logs: None,
            error: Some(error.into()),
        }
    }
}

/// Kind tag for one entry of the public action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostSmallBlind,
    PostBigBlind,
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// One public action-log entry. `amount` is the chips the action moved
/// into the pot, so the log plus seed and config replays the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub street: Street,
    pub action: ActionKind,
    pub amount: u32,
}

/// Table parameters, immutable for the duration of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub seats: usize,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.seats < 2 {
            return Err(EngineError::InvalidInput(
                "a table needs at least two seats".to_string(),
            ));
        }
        if self.starting_stack == 0 {
            return Err(EngineError::InvalidInput(
                "starting stack must be positive".to_string(),
            ));
        }
        if self.small_blind == 0 || self.big_blind < self.small_blind {
            return Err(EngineError::InvalidInput(
                "blinds must satisfy 0 < small_blind <= big_blind".to_string(),
            ));
        }
        Ok(())
    }
}

/// Chips awarded to one seat at hand end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub seat: usize,
    pub amount: u32,
}

/// One main or side pot and how it was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    pub eligible: Vec<usize>,
    pub winners: Vec<usize>,
}

/// Full record of one simulated hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub seed: u64,
    pub dealer_seat: usize,
    pub board: Vec<Card>,
    pub actions: Vec<ActionRecord>,
    pub winners: Vec<Winner>,
    pub delta_stacks: Vec<i64>,
    pub side_pots: Vec<SidePot>,
    pub final_stacks: Vec<u32>,
    pub seat_logs: Vec<String>,
    pub seat_errors: Vec<String>,
}

/// Captured bot output for one seat over a whole match, tail-capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeatLog {
    pub logs: String,
    pub errors: String,
}

/// Full record of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub seed: u64,
    pub hands: u32,
    pub seats: usize,
    pub final_stacks: Vec<u32>,
    pub chips_won: Vec<i64>,
    pub hand_results: Vec<HandResult>,
    pub bot_logs: Vec<SeatLog>,
}

/// Error type for the simulation core. Bot misbehavior is never an error
/// here: bad proposals are normalized and decide failures fall back.
/// `Inconsistency` means the engine itself broke an invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid card: {0}")]
    InvalidCard(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("engine inconsistency: {0}")]
    Inconsistency(String),
}

use serde::{Deserialize, Serialize};

use super::equity;
use super::rng::DetRng;
use super::shared::*;
use super::state::HandState;

/// What one seat is allowed to reveal about another: chips and status,
/// never hole cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub stack: u32,
    pub status: SeatStatus,
    pub committed_street: u32,
    pub committed_hand: u32,
}

/// A legal action offered to the acting seat, with its amount bounds.
/// Bet and raise bounds are in the "to" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegalAction {
    Fold,
    Check,
    Call { amount: u32 },
    Bet { min: u32, max: u32 },
    Raise { min_to: u32, max_to: u32 },
    AllIn { amount: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Equity {
    pub win: f64,
    pub tie: f64,
}

/// The constrained projection of a hand handed to a bot: public
/// information, the actor's own cards, the legal actions, and a
/// Monte-Carlo equity estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleState {
    pub hand_id: String,
    pub street: Street,
    pub actor_seat: usize,
    pub dealer_seat: usize,
    pub board: Vec<Card>,
    pub hole_cards: (Card, Card),
    pub seats: Vec<SeatView>,
    pub bet_to_match: u32,
    pub min_raise: u32,
    pub pot: u32,
    pub actions: Vec<ActionRecord>,
    pub legal_actions: Vec<LegalAction>,
    pub equity: Equity,
}

/// Enumerate the legal actions for a seat under the betting rules.
///
/// A seat that already acted at a bet level that was only pushed up by a
/// short all-in may call or fold but not raise; that is encoded by the
/// `has_acted` flag, which full bets and raises clear for everyone else.
pub fn legal_actions(hand: &HandState, seat: usize) -> Vec<LegalAction> {
    let s = &hand.seats[seat];
    let mut actions = vec![LegalAction::Fold];

    if hand.bet_to_match == s.committed_street {
        actions.push(LegalAction::Check);
    } else {
        actions.push(LegalAction::Call {
            amount: (hand.bet_to_match - s.committed_street).min(s.stack),
        });
    }

    let ceiling = s.stack + s.committed_street;
    if hand.bet_to_match == 0 {
        if ceiling >= hand.big_blind {
            actions.push(LegalAction::Bet {
                min: hand.big_blind,
                max: ceiling,
            });
        }
    } else if !s.has_acted && ceiling >= hand.bet_to_match + hand.min_raise {
        actions.push(LegalAction::Raise {
            min_to: hand.bet_to_match + hand.min_raise,
            max_to: ceiling,
        });
    }

    if s.stack > 0 {
        actions.push(LegalAction::AllIn { amount: s.stack });
    }
    actions
}

/// Build the visible state for the acting seat. The equity stream is
/// derived from the hand seed, street and seat, so it never perturbs the
/// deck and stays reproducible per decision point.
pub fn make_visible_state(hand: &HandState, actor: usize, equity_samples: u32) -> VisibleState {
    let seat = &hand.seats[actor];
    let hole = seat.hole.expect("acting seat was dealt cards");

    let live_opponents = hand.seats.iter().filter(|s| s.is_live()).count().saturating_sub(1);
    let mut rng = DetRng::for_decision(hand.seed, hand.street.index(), actor);
    let (win, tie) = equity::estimate(hole, &hand.board, live_opponents, equity_samples, &mut rng);

    VisibleState {
        hand_id: hand.hand_id.clone(),
        street: hand.street,
        actor_seat: actor,
        dealer_seat: hand.dealer,
        board: hand.board.clone(),
        hole_cards: hole,
        seats: hand
            .seats
            .iter()
            .map(|s| SeatView {
                stack: s.stack,
                status: s.status,
                committed_street: s.committed_street,
                committed_hand: s.committed_hand,
            })
            .collect(),
        bet_to_match: hand.bet_to_match,
        min_raise: hand.min_raise,
        pot: hand.pot(),
        actions: hand.actions.clone(),
        legal_actions: legal_actions(hand, actor),
        equity: Equity { win, tie },
    }
}

/// The defensive substitute when a bot proposes nothing usable: check if
/// possible, otherwise call, otherwise fold.
pub fn fallback_action(legal: &[LegalAction]) -> Action {
    if legal.contains(&LegalAction::Check) {
        return Action::Check;
    }
    if legal.iter().any(|a| matches!(a, LegalAction::Call { .. })) {
        return Action::Call;
    }
    Action::Fold
}

/// Map a bot's proposed action onto the legal-action set.
///
/// Unknown or currently illegal types fall back; fractional amounts are
/// truncated; bet and raise amounts are clamped into the advertised
/// bounds.
pub fn normalize_action(proposed: Option<&ProposedAction>, legal: &[LegalAction]) -> Action {
    let Some(p) = proposed else {
        return fallback_action(legal);
    };
    let amount = p.amount.map(truncate_amount);
    match p.kind.as_str() {
        "fold" => Action::Fold,
        "check" if legal.contains(&LegalAction::Check) => Action::Check,
        "call" if legal.iter().any(|a| matches!(a, LegalAction::Call { .. })) => Action::Call,
        "bet" => {
            if let Some(LegalAction::Bet { min, max }) = legal
                .iter()
                .copied()
                .find(|a| matches!(a, LegalAction::Bet { .. }))
            {
                Action::Bet(amount.unwrap_or(min).clamp(min, max))
            } else {
                fallback_action(legal)
            }
        }
        "raise" => {
            if let Some(LegalAction::Raise { min_to, max_to }) = legal
                .iter()
                .copied()
                .find(|a| matches!(a, LegalAction::Raise { .. }))
            {
                Action::Raise(amount.unwrap_or(min_to).clamp(min_to, max_to))
            } else {
                fallback_action(legal)
            }
        }
        "all_in" if legal.iter().any(|a| matches!(a, LegalAction::AllIn { .. })) => Action::AllIn,
        _ => fallback_action(legal),
    }
}

fn truncate_amount(amount: f64) -> u32 {
    if !amount.is_finite() || amount <= 0.0 {
        0
    } else if amount >= u32::MAX as f64 {
        u32::MAX
    } else {
        amount as u32
    }
}

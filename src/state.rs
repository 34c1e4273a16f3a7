use super::rng::DetRng;
use super::rules::{HandStrength, best_of_7, shuffled_deck};
use super::shared::*;
use super::view::{VisibleState, fallback_action, legal_actions, normalize_action};

/// Per-seat state, owned by a single hand.
#[derive(Debug, Clone)]
pub struct SeatState {
    pub stack: u32,
    pub committed_street: u32,
    pub committed_hand: u32,
    pub status: SeatStatus,
    pub hole: Option<(Card, Card)>,
    pub has_acted: bool,
}

impl SeatState {
    pub fn is_active(&self) -> bool {
        self.status == SeatStatus::Active
    }

    /// Live seats have not folded; all-in seats still contest pots.
    pub fn is_live(&self) -> bool {
        self.status != SeatStatus::Folded
    }
}

/// Complete state of one hand in flight.
#[derive(Debug, Clone)]
pub struct HandState {
    pub hand_id: String,
    pub seed: u64,
    pub dealer: usize,
    pub street: Street,
    pub board: Vec<Card>,
    pub seats: Vec<SeatState>,
    pub to_act: usize,
    pub bet_to_match: u32,
    pub min_raise: u32,
    pub big_blind: u32,
    pub actions: Vec<ActionRecord>,
}

impl HandState {
    pub fn pot(&self) -> u32 {
        self.seats.iter().map(|s| s.committed_hand).sum()
    }

    pub fn live_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.is_live()).count()
    }

    fn next_live_from(&self, idx: usize) -> usize {
        let n = self.seats.len();
        for off in 1..=n {
            let i = (idx + off) % n;
            if self.seats[i].is_live() {
                return i;
            }
        }
        idx
    }

    fn next_active_from(&self, idx: usize) -> Option<usize> {
        let n = self.seats.len();
        for off in 1..=n {
            let i = (idx + off) % n;
            if self.seats[i].is_active() {
                return Some(i);
            }
        }
        None
    }

    /// A betting round ends once every active seat has acted this street
    /// and matched the current bet. Vacuously true when nobody can act.
    fn round_complete(&self) -> bool {
        self.seats
            .iter()
            .filter(|s| s.is_active())
            .all(|s| s.has_acted && s.committed_street == self.bet_to_match)
    }

    fn commit(&mut self, seat: usize, amount: u32) {
        let s = &mut self.seats[seat];
        s.stack -= amount;
        s.committed_street += amount;
        s.committed_hand += amount;
        if s.stack == 0 && s.status == SeatStatus::Active {
            s.status = SeatStatus::AllIn;
        }
    }

    fn reopen_except(&mut self, actor: usize) {
        for (i, seat) in self.seats.iter_mut().enumerate() {
            if i != actor && seat.is_active() {
                seat.has_acted = false;
            }
        }
    }

    fn record(&mut self, seat: usize, action: ActionKind, amount: u32) {
        let street = self.street;
        self.actions.push(ActionRecord {
            seat,
            street,
            action,
            amount,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundOutcome {
    Continue,
    HandEnded,
}

/// Per-seat capture of bot log and error blocks for one hand.
struct Capture {
    logs: Vec<Vec<String>>,
    errors: Vec<Vec<String>>,
}

impl Capture {
    fn new(seats: usize) -> Self {
        Capture {
            logs: vec![Vec::new(); seats],
            errors: vec![Vec::new(); seats],
        }
    }

    fn log(&mut self, seat: usize, header: String, text: &str) {
        if !text.trim().is_empty() {
            self.logs[seat].push(format!("{header}\n{}", text.trim_end()));
        }
    }

    fn error(&mut self, seat: usize, header: String, text: &str) {
        if !text.trim().is_empty() {
            self.errors[seat].push(format!("{header}\n{}", text.trim_end()));
        }
    }
}

/// Simulate one complete hand of poker.
///
/// `decide` and `make_state` are injected so the host controls bot
/// execution and equity sample counts; the engine only sees replies.
/// A reply without an action never aborts the hand: the fallback chain
/// (check, else call, else fold) is substituted and the reported error
/// is captured against the seat.
pub fn simulate_hand<D, V>(
    bot_codes: &[String],
    seed: u64,
    config: &TableConfig,
    dealer_seat: usize,
    initial_stacks: &[u32],
    decide: &mut D,
    make_state: &mut V,
) -> Result<HandResult, EngineError>
where
    D: FnMut(&str, &VisibleState) -> BotReply,
    V: FnMut(&HandState, usize) -> VisibleState,
{
    config.validate()?;
    let n = config.seats;
    if bot_codes.len() != n {
        return Err(EngineError::InvalidInput(
            "bot_codes length must equal the seat count".to_string(),
        ));
    }
    if initial_stacks.len() != n {
        return Err(EngineError::InvalidInput(
            "initial_stacks length must equal the seat count".to_string(),
        ));
    }
    if dealer_seat >= n {
        return Err(EngineError::InvalidInput(
            "dealer seat out of range".to_string(),
        ));
    }
    if initial_stacks.iter().filter(|&&s| s > 0).count() < 2 {
        return Err(EngineError::InvalidInput(
            "a hand needs at least two seats with chips".to_string(),
        ));
    }

    let mut rng = DetRng::new(seed);
    let mut deck = shuffled_deck(&mut rng).into_iter();

    let mut hand = HandState {
        hand_id: format!("hand-{seed}"),
        seed,
        dealer: dealer_seat,
        street: Street::Preflop,
        board: Vec::new(),
        seats: initial_stacks
            .iter()
            .map(|&stack| SeatState {
                stack,
                committed_street: 0,
                committed_hand: 0,
                // busted seats sit the hand out
                status: if stack > 0 {
                    SeatStatus::Active
                } else {
                    SeatStatus::Folded
                },
                hole: None,
                has_acted: false,
            })
            .collect(),
        to_act: dealer_seat,
        bet_to_match: 0,
        min_raise: config.big_blind,
        big_blind: config.big_blind,
        actions: Vec::new(),
    };

    // One card at a time, two passes, starting left of the dealer.
    let mut dealt: Vec<Vec<Card>> = vec![Vec::new(); n];
    for _ in 0..2 {
        for off in 1..=n {
            let seat = (dealer_seat + off) % n;
            if hand.seats[seat].is_live() {
                dealt[seat].push(draw(&mut deck)?);
            }
        }
    }
    for (seat, cards) in dealt.into_iter().enumerate() {
        if cards.len() == 2 {
            hand.seats[seat].hole = Some((cards[0], cards[1]));
        }
    }

    // Blinds. Heads-up, the dealer posts the small blind and acts first.
    let (sb_seat, bb_seat) = if hand.live_seats() == 2 {
        let sb = if hand.seats[dealer_seat].is_live() {
            dealer_seat
        } else {
            hand.next_live_from(dealer_seat)
        };
        (sb, hand.next_live_from(sb))
    } else {
        let sb = hand.next_live_from(dealer_seat);
        (sb, hand.next_live_from(sb))
    };
    post_blind(&mut hand, sb_seat, config.small_blind, ActionKind::PostSmallBlind);
    post_blind(&mut hand, bb_seat, config.big_blind, ActionKind::PostBigBlind);
    hand.bet_to_match = config.big_blind;
    hand.min_raise = config.big_blind;
    hand.to_act = hand.next_active_from(bb_seat).unwrap_or(bb_seat);

    let mut capture = Capture::new(n);
    let mut outcome = betting_round(&mut hand, bot_codes, decide, make_state, &mut capture)?;
    for street in [Street::Flop, Street::Turn, Street::River] {
        if outcome == RoundOutcome::HandEnded {
            break;
        }
        open_street(&mut hand, street, &mut deck)?;
        outcome = betting_round(&mut hand, bot_codes, decide, make_state, &mut capture)?;
    }

    let (winners, side_pots, payouts) = if outcome == RoundOutcome::HandEnded {
        award_uncontested(&hand)?
    } else {
        hand.street = Street::Showdown;
        resolve_showdown(&hand)?
    };

    let pot = hand.pot();
    let paid: u32 = payouts.iter().sum();
    if paid != pot {
        return Err(EngineError::Inconsistency(format!(
            "distributed {paid} chips from a {pot} chip pot"
        )));
    }

    let final_stacks: Vec<u32> = hand
        .seats
        .iter()
        .zip(&payouts)
        .map(|(s, &p)| s.stack + p)
        .collect();
    let before: u64 = initial_stacks.iter().map(|&s| s as u64).sum();
    let after: u64 = final_stacks.iter().map(|&s| s as u64).sum();
    if before != after {
        return Err(EngineError::Inconsistency(format!(
            "chips not conserved: {before} before, {after} after"
        )));
    }
    let delta_stacks: Vec<i64> = final_stacks
        .iter()
        .zip(initial_stacks)
        .map(|(&f, &i)| f as i64 - i as i64)
        .collect();

    Ok(HandResult {
        seed,
        dealer_seat,
        board: hand.board,
        actions: hand.actions,
        winners,
        delta_stacks,
        side_pots,
        final_stacks,
        seat_logs: capture.logs.into_iter().map(|b| b.join("\n")).collect(),
        seat_errors: capture.errors.into_iter().map(|b| b.join("\n")).collect(),
    })
}

fn draw(deck: &mut std::vec::IntoIter<Card>) -> Result<Card, EngineError> {
    deck.next()
        .ok_or_else(|| EngineError::Inconsistency("deck underflow".to_string()))
}

/// Post a blind, capping to the available stack; a covered seat goes
/// all-in on the post.
fn post_blind(hand: &mut HandState, seat: usize, amount: u32, kind: ActionKind) {
    let pay = amount.min(hand.seats[seat].stack);
    hand.commit(seat, pay);
    hand.record(seat, kind, pay);
}

/// Deal the next street's board cards and reset per-street betting state.
fn open_street(
    hand: &mut HandState,
    street: Street,
    deck: &mut std::vec::IntoIter<Card>,
) -> Result<(), EngineError> {
    let count = if street == Street::Flop { 3 } else { 1 };
    for _ in 0..count {
        let card = draw(deck)?;
        hand.board.push(card);
    }
    hand.street = street;
    for seat in &mut hand.seats {
        seat.committed_street = 0;
        seat.has_acted = false;
    }
    hand.bet_to_match = 0;
    hand.min_raise = hand.big_blind;
    hand.to_act = hand.next_active_from(hand.dealer).unwrap_or(hand.dealer);
    Ok(())
}

fn betting_round<D, V>(
    hand: &mut HandState,
    bot_codes: &[String],
    decide: &mut D,
    make_state: &mut V,
    capture: &mut Capture,
) -> Result<RoundOutcome, EngineError>
where
    D: FnMut(&str, &VisibleState) -> BotReply,
    V: FnMut(&HandState, usize) -> VisibleState,
{
    loop {
        if hand.live_seats() == 1 {
            return Ok(RoundOutcome::HandEnded);
        }
        if hand.round_complete() {
            return Ok(RoundOutcome::Continue);
        }

        let actor = hand.to_act;
        if !hand.seats[actor].is_active() {
            return Err(EngineError::Inconsistency(format!(
                "seat {actor} is to act but not active"
            )));
        }

        let view = make_state(hand, actor);
        let reply = decide(&bot_codes[actor], &view);
        if let Some(text) = reply.logs.as_deref() {
            let header = format!("--- {} {} seat={actor} ---", hand.hand_id, hand.street);
            capture.log(actor, header, text);
        }

        let legal = legal_actions(hand, actor);
        let action = match reply.action.as_ref() {
            Some(proposed) => normalize_action(Some(proposed), &legal),
            None => {
                if let Some(text) = reply.error.as_deref() {
                    let header =
                        format!("--- {} {} seat={actor} ERROR ---", hand.hand_id, hand.street);
                    capture.error(actor, header, text);
                }
                fallback_action(&legal)
            }
        };
        apply_action(hand, actor, action);

        if let Some(next) = hand.next_active_from(actor) {
            hand.to_act = next;
        }
    }
}

/// Apply an already-normalized action to the hand.
fn apply_action(hand: &mut HandState, actor: usize, action: Action) {
    match action {
        Action::Fold => {
            hand.seats[actor].status = SeatStatus::Folded;
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::Fold, 0);
        }
        Action::Check => {
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::Check, 0);
        }
        Action::Call => {
            let need = hand.bet_to_match - hand.seats[actor].committed_street;
            let pay = need.min(hand.seats[actor].stack);
            hand.commit(actor, pay);
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::Call, pay);
        }
        Action::Bet(to) => {
            let add = to - hand.seats[actor].committed_street;
            hand.commit(actor, add);
            hand.bet_to_match = to;
            hand.min_raise = to;
            hand.reopen_except(actor);
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::Bet, add);
        }
        Action::Raise(to) => {
            let add = to - hand.seats[actor].committed_street;
            hand.commit(actor, add);
            hand.min_raise = to - hand.bet_to_match;
            hand.bet_to_match = to;
            hand.reopen_except(actor);
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::Raise, add);
        }
        Action::AllIn => {
            let add = hand.seats[actor].stack;
            hand.commit(actor, add);
            let committed = hand.seats[actor].committed_street;
            if committed > hand.bet_to_match {
                let increment = committed - hand.bet_to_match;
                hand.bet_to_match = committed;
                // a short all-in raises the price but does not reopen action
                if increment >= hand.min_raise {
                    hand.min_raise = increment;
                    hand.reopen_except(actor);
                }
            }
            hand.seats[actor].has_acted = true;
            hand.record(actor, ActionKind::AllIn, add);
        }
    }
}

/// Everyone else folded: the last live seat takes the whole pot unseen.
fn award_uncontested(
    hand: &HandState,
) -> Result<(Vec<Winner>, Vec<SidePot>, Vec<u32>), EngineError> {
    let survivors: Vec<usize> = (0..hand.seats.len())
        .filter(|&i| hand.seats[i].is_live())
        .collect();
    if survivors.len() != 1 {
        return Err(EngineError::Inconsistency(
            "uncontested hand without a single live seat".to_string(),
        ));
    }
    let seat = survivors[0];
    let pot = hand.pot();
    let mut payouts = vec![0u32; hand.seats.len()];
    payouts[seat] = pot;
    Ok((
        vec![Winner { seat, amount: pot }],
        vec![SidePot {
            amount: pot,
            eligible: vec![seat],
            winners: vec![seat],
        }],
        payouts,
    ))
}

/// Settle a showdown: build side pots from commitment levels, evaluate
/// every live seat's best seven-card hand, and split each pot among the
/// tied best contenders.
fn resolve_showdown(
    hand: &HandState,
) -> Result<(Vec<Winner>, Vec<SidePot>, Vec<u32>), EngineError> {
    if hand.board.len() != 5 {
        return Err(EngineError::Inconsistency(
            "showdown before the board is complete".to_string(),
        ));
    }
    let n = hand.seats.len();

    let mut strengths: Vec<Option<HandStrength>> = vec![None; n];
    for (i, seat) in hand.seats.iter().enumerate() {
        if seat.is_live() {
            let (a, b) = seat.hole.ok_or_else(|| {
                EngineError::Inconsistency(format!("seat {i} reached showdown without cards"))
            })?;
            strengths[i] = Some(best_of_7(&[
                a,
                b,
                hand.board[0],
                hand.board[1],
                hand.board[2],
                hand.board[3],
                hand.board[4],
            ]));
        }
    }

    // Commitment levels of live seats define the pots; folded seats fund
    // the lower levels but contest nothing.
    let mut levels: Vec<u32> = hand
        .seats
        .iter()
        .filter(|s| s.is_live() && s.committed_hand > 0)
        .map(|s| s.committed_hand)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut payouts = vec![0u32; n];
    let mut pots = Vec::new();
    let mut prev = 0u32;
    for &level in &levels {
        let amount: u32 = hand
            .seats
            .iter()
            .map(|s| s.committed_hand.min(level).saturating_sub(prev))
            .sum();
        let eligible: Vec<usize> = (0..n)
            .filter(|&i| hand.seats[i].is_live() && hand.seats[i].committed_hand >= level)
            .collect();
        let best = eligible
            .iter()
            .filter_map(|&i| strengths[i].as_ref())
            .max()
            .cloned();
        let winners: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&i| strengths[i].as_ref() == best.as_ref())
            .collect();
        if winners.is_empty() {
            return Err(EngineError::Inconsistency(
                "side pot with no contenders".to_string(),
            ));
        }
        let share = amount / winners.len() as u32;
        let remainder = amount % winners.len() as u32;
        for &w in &winners {
            payouts[w] += share;
        }
        if remainder > 0 {
            payouts[first_clockwise(hand.dealer, n, &winners)] += remainder;
        }
        pots.push(SidePot {
            amount,
            eligible,
            winners,
        });
        prev = level;
    }

    let winners: Vec<Winner> = (0..n)
        .filter(|&i| payouts[i] > 0)
        .map(|i| Winner {
            seat: i,
            amount: payouts[i],
        })
        .collect();
    Ok((winners, pots, payouts))
}

/// Earliest of the given seats clockwise from the dealer; odd chips from
/// pot splits land here.
fn first_clockwise(dealer: usize, n: usize, among: &[usize]) -> usize {
    for off in 1..=n {
        let i = (dealer + off) % n;
        if among.contains(&i) {
            return i;
        }
    }
    among[0]
}

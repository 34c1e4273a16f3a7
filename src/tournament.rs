use serde::{Deserialize, Serialize};

use super::logs::{ERROR_CAP, LOG_CAP, TailBuffer};
use super::shared::*;
use super::state::{HandState, simulate_hand};
use super::view::VisibleState;

/// Prime stride between per-hand seeds, so hands within one match deal
/// distinct sequences.
const HAND_SEED_STRIDE: u64 = 10_007;

/// Match parameters: how many hands, and the table they are played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub hands: u32,
    pub seats: usize,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            hands: 50,
            seats: 6,
            starting_stack: 1000,
            small_blind: 10,
            big_blind: 20,
        }
    }
}

impl MatchConfig {
    pub fn table(&self) -> TableConfig {
        TableConfig {
            seats: self.seats,
            starting_stack: self.starting_stack,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
        }
    }
}

/// Run a match: iterate hands, rotate the dealer, carry stacks forward.
///
/// Hand `h` plays with seed `seed + h * 10_007` and dealer `h % seats`.
/// The match ends early once fewer than two seats still hold chips;
/// `MatchResult::hands` reports the hands actually played. Per-seat bot
/// output is folded into tail-capped buffers across the whole match.
pub fn run_match<D, V>(
    bot_codes: &[String],
    seed: u64,
    match_config: &MatchConfig,
    decide: &mut D,
    make_state: &mut V,
) -> Result<MatchResult, EngineError>
where
    D: FnMut(&str, &VisibleState) -> BotReply,
    V: FnMut(&HandState, usize) -> VisibleState,
{
    let cfg = match_config.table();
    cfg.validate()?;
    if bot_codes.len() != cfg.seats {
        return Err(EngineError::InvalidInput(
            "bot_codes length must equal the seat count".to_string(),
        ));
    }

    let mut stacks = vec![cfg.starting_stack; cfg.seats];
    let total: u64 = stacks.iter().map(|&s| s as u64).sum();
    let mut hand_results = Vec::new();
    let mut logs: Vec<TailBuffer> = (0..cfg.seats).map(|_| TailBuffer::new(LOG_CAP)).collect();
    let mut errors: Vec<TailBuffer> = (0..cfg.seats).map(|_| TailBuffer::new(ERROR_CAP)).collect();

    let mut played = 0u32;
    for h in 0..match_config.hands {
        if stacks.iter().filter(|&&s| s > 0).count() < 2 {
            break;
        }
        let hand_seed = seed.wrapping_add((h as u64).wrapping_mul(HAND_SEED_STRIDE));
        let dealer = h as usize % cfg.seats;
        let hr = simulate_hand(bot_codes, hand_seed, &cfg, dealer, &stacks, decide, make_state)?;

        let after: u64 = hr.final_stacks.iter().map(|&s| s as u64).sum();
        if after != total {
            return Err(EngineError::Inconsistency(format!(
                "match chips not conserved after hand {h}: {after} != {total}"
            )));
        }

        for seat in 0..cfg.seats {
            logs[seat].push_block(&hr.seat_logs[seat]);
            errors[seat].push_block(&hr.seat_errors[seat]);
        }
        stacks = hr.final_stacks.clone();
        hand_results.push(hr);
        played += 1;
    }

    let chips_won: Vec<i64> = stacks
        .iter()
        .map(|&s| s as i64 - cfg.starting_stack as i64)
        .collect();
    let bot_logs: Vec<SeatLog> = logs
        .into_iter()
        .zip(errors)
        .map(|(l, e)| SeatLog {
            logs: l.into_string(),
            errors: e.into_string(),
        })
        .collect();

    Ok(MatchResult {
        seed,
        hands: played,
        seats: cfg.seats,
        final_stacks: stacks,
        chips_won,
        hand_results,
        bot_logs,
    })
}

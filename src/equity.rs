use std::cmp::Ordering;

use rand::seq::SliceRandom;

use super::rng::DetRng;
use super::rules::{best_of_7, remaining_deck};
use super::shared::Card;

/// Monte-Carlo estimate of showdown equity for one seat.
///
/// For each sample the missing board cards and two hole cards per live
/// opponent are dealt uniformly without replacement from the unseen deck,
/// every final seven-card hand is evaluated, and strict wins and ties are
/// tallied. Returns empirical `(win, tie)` fractions; `samples == 0`
/// returns `(0.0, 0.0)` without sampling.
pub fn estimate(
    hole: (Card, Card),
    board: &[Card],
    live_opponents: usize,
    samples: u32,
    rng: &mut DetRng,
) -> (f64, f64) {
    if samples == 0 {
        return (0.0, 0.0);
    }

    let mut known = vec![hole.0, hole.1];
    known.extend_from_slice(board);
    let unseen = remaining_deck(&known);
    let missing = 5 - board.len();

    let mut wins = 0u32;
    let mut ties = 0u32;
    for _ in 0..samples {
        let mut deck = unseen.clone();
        deck.shuffle(rng);
        let mut draw = deck.into_iter();

        let mut full_board = board.to_vec();
        for _ in 0..missing {
            full_board.push(draw.next().expect("unseen deck covers the board"));
        }
        let mine = best_of_7(&seven(hole, &full_board));

        let mut beaten = false;
        let mut tied = false;
        for _ in 0..live_opponents {
            let opp_hole = (
                draw.next().expect("unseen deck covers opponents"),
                draw.next().expect("unseen deck covers opponents"),
            );
            let theirs = best_of_7(&seven(opp_hole, &full_board));
            match mine.cmp(&theirs) {
                Ordering::Less => {
                    beaten = true;
                    break;
                }
                Ordering::Equal => tied = true,
                Ordering::Greater => {}
            }
        }
        if beaten {
            continue;
        }
        if tied {
            ties += 1;
        } else {
            wins += 1;
        }
    }

    (
        wins as f64 / samples as f64,
        ties as f64 / samples as f64,
    )
}

fn seven(hole: (Card, Card), board: &[Card]) -> [Card; 7] {
    [
        hole.0, hole.1, board[0], board[1], board[2], board[3], board[4],
    ]
}

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::rng::DetRng;
use super::shared::*;

/// Hand categories, weakest to strongest. Derived `Ord` follows the
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Ranking of a five-card hand: a category plus rank values compared
/// lexicographically at equal category. Derived `Ord` compares the
/// category first and the tiebreak second, which is exactly the poker
/// order; equal values are genuine ties and split pots at showdown.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
}

/// Total-order comparison between two hand strengths.
pub fn compare(a: &HandStrength, b: &HandStrength) -> Ordering {
    a.cmp(b)
}

/// The 52 distinct cards in a fixed order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// A full deck shuffled by the given deterministic stream. Cards are
/// consumed front to back within a hand.
pub fn shuffled_deck(rng: &mut DetRng) -> Vec<Card> {
    let mut deck = full_deck();
    deck.shuffle(rng);
    deck
}

/// The deck minus all cards already visible to the caller.
pub fn remaining_deck(known: &[Card]) -> Vec<Card> {
    full_deck()
        .into_iter()
        .filter(|c| !known.contains(c))
        .collect()
}

/// Rank a five-card hand.
pub fn rank_5(cards: &[Card; 5]) -> HandStrength {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);

    let mut counts: HashMap<u8, u8> = HashMap::new();
    for &r in &ranks {
        *counts.entry(r).or_insert(0) += 1;
    }

    // Groups ordered by multiplicity first, rank second, both descending.
    let mut groups: Vec<(u8, u8)> = counts.iter().map(|(&r, &n)| (n, r)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut unique_desc: Vec<u8> = counts.keys().copied().collect();
    unique_desc.sort_unstable_by(|a, b| b.cmp(a));
    let straight = straight_top(&unique_desc);

    if is_flush {
        if let Some(top) = straight {
            return HandStrength {
                category: HandCategory::StraightFlush,
                tiebreak: vec![top],
            };
        }
    }

    if groups[0].0 == 4 {
        let quad = groups[0].1;
        let kicker = unique_desc.iter().copied().find(|&r| r != quad).unwrap_or(quad);
        return HandStrength {
            category: HandCategory::FourOfAKind,
            tiebreak: vec![quad, kicker],
        };
    }

    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 >= 2 {
        return HandStrength {
            category: HandCategory::FullHouse,
            tiebreak: vec![groups[0].1, groups[1].1],
        };
    }

    if is_flush {
        return HandStrength {
            category: HandCategory::Flush,
            tiebreak: ranks,
        };
    }

    if let Some(top) = straight {
        return HandStrength {
            category: HandCategory::Straight,
            tiebreak: vec![top],
        };
    }

    if groups[0].0 == 3 {
        let trips = groups[0].1;
        let mut tiebreak = vec![trips];
        tiebreak.extend(unique_desc.iter().copied().filter(|&r| r != trips).take(2));
        return HandStrength {
            category: HandCategory::ThreeOfAKind,
            tiebreak,
        };
    }

    let pairs: Vec<u8> = groups.iter().filter(|g| g.0 == 2).map(|g| g.1).collect();
    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        let kicker = unique_desc
            .iter()
            .copied()
            .find(|&r| r != hi && r != lo)
            .unwrap_or(lo);
        return HandStrength {
            category: HandCategory::TwoPair,
            tiebreak: vec![hi, lo, kicker],
        };
    }
    if pairs.len() == 1 {
        let pair = pairs[0];
        let mut tiebreak = vec![pair];
        tiebreak.extend(unique_desc.iter().copied().filter(|&r| r != pair).take(3));
        return HandStrength {
            category: HandCategory::Pair,
            tiebreak,
        };
    }

    HandStrength {
        category: HandCategory::HighCard,
        tiebreak: ranks,
    }
}

/// Best five-card hand among the 21 subsets of seven cards.
pub fn best_of_7(cards: &[Card; 7]) -> HandStrength {
    cards
        .iter()
        .combinations(5)
        .map(|combo| rank_5(&[*combo[0], *combo[1], *combo[2], *combo[3], *combo[4]]))
        .max()
        .expect("seven cards yield 21 five-card subsets")
}

/// Highest straight top among unique descending ranks, or `None`. The
/// wheel A-2-3-4-5 counts with top 5, strictly below 2-3-4-5-6.
fn straight_top(ranks_desc: &[u8]) -> Option<u8> {
    if ranks_desc.len() < 5 {
        return None;
    }
    for w in ranks_desc.windows(5) {
        // unique + descending, so spread 4 means five consecutive ranks
        if w[0] - w[4] == 4 {
            return Some(w[0]);
        }
    }
    if ranks_desc[..4] == [14, 5, 4, 3] && ranks_desc.contains(&2) {
        return Some(5);
    }
    None
}

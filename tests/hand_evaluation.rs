use holdem_sim::rules::{HandCategory, HandStrength, best_of_7, compare, rank_5};
use holdem_sim::{Card, EngineError};
use rstest::rstest;
use std::cmp::Ordering;

fn cards<const N: usize>(s: &str) -> [Card; N] {
    let parsed: Vec<Card> = s
        .split_whitespace()
        .map(|c| c.parse().expect("test card"))
        .collect();
    parsed.try_into().expect("card count")
}

#[test]
fn test_card_parse_and_display() {
    let card: Card = "Ah".parse().unwrap();
    assert_eq!(card.rank.value(), 14);
    assert_eq!(card.to_string(), "Ah");
    assert_eq!("Td".parse::<Card>().unwrap().to_string(), "Td");

    for bad in ["", "A", "Ahh", "1h", "Ax", "ah"] {
        assert_eq!(
            bad.parse::<Card>(),
            Err(EngineError::InvalidCard(bad.to_string()))
        );
    }
}

#[test]
fn test_wheel_vs_six_high_straight() {
    let wheel = rank_5(&cards("Ah 2c 3d 4s 5h"));
    assert_eq!(
        wheel,
        HandStrength {
            category: HandCategory::Straight,
            tiebreak: vec![5],
        }
    );

    let six_high = rank_5(&cards("2c 3d 4s 5h 6d"));
    assert_eq!(
        six_high,
        HandStrength {
            category: HandCategory::Straight,
            tiebreak: vec![6],
        }
    );

    assert_eq!(compare(&wheel, &six_high), Ordering::Less);
}

#[test]
fn test_flush_beats_straight() {
    let flush = rank_5(&cards("Kd Qd Jd 9d 2d"));
    assert_eq!(flush.category, HandCategory::Flush);
    assert_eq!(flush.tiebreak, vec![13, 12, 11, 9, 2]);

    let broadway = rank_5(&cards("Ah Kc Qd Js Th"));
    assert_eq!(broadway.category, HandCategory::Straight);
    assert_eq!(broadway.tiebreak, vec![14]);

    assert_eq!(compare(&flush, &broadway), Ordering::Greater);
}

#[test]
fn test_full_house_trips_rank_dominates() {
    let kings_full = rank_5(&cards("Ks Kh Kd 2c 2h"));
    let queens_full = rank_5(&cards("Qs Qh Qd As Ah"));
    assert_eq!(kings_full.category, HandCategory::FullHouse);
    assert_eq!(kings_full.tiebreak, vec![13, 2]);
    assert_eq!(queens_full.tiebreak, vec![12, 14]);
    assert_eq!(compare(&kings_full, &queens_full), Ordering::Greater);
}

#[test]
fn test_steel_wheel_below_six_high_straight_flush() {
    let steel_wheel = rank_5(&cards("Ah 2h 3h 4h 5h"));
    assert_eq!(
        steel_wheel,
        HandStrength {
            category: HandCategory::StraightFlush,
            tiebreak: vec![5],
        }
    );
    let six_high = rank_5(&cards("2s 3s 4s 5s 6s"));
    assert_eq!(compare(&steel_wheel, &six_high), Ordering::Less);
}

#[rstest]
#[case("Ah Kh Qh Jh Th", HandCategory::StraightFlush, vec![14])]
#[case("Ah Ad Ac As Kh", HandCategory::FourOfAKind, vec![14, 13])]
#[case("Ks Kh Kd Qc Qh", HandCategory::FullHouse, vec![13, 12])]
#[case("Ah Th 7h 4h 2h", HandCategory::Flush, vec![14, 10, 7, 4, 2])]
#[case("Th 9d 8c 7s 6h", HandCategory::Straight, vec![10])]
#[case("Jh Jd Jc Ts 9h", HandCategory::ThreeOfAKind, vec![11, 10, 9])]
#[case("Qh Qd Th Tc 9s", HandCategory::TwoPair, vec![12, 10, 9])]
#[case("Ah Ad Kc Qs Jh", HandCategory::Pair, vec![14, 13, 12, 11])]
#[case("Ah Kd Qc Js 9h", HandCategory::HighCard, vec![14, 13, 12, 11, 9])]
fn test_category_grid(
    #[case] hand: &str,
    #[case] category: HandCategory,
    #[case] tiebreak: Vec<u8>,
) {
    let strength = rank_5(&cards(hand));
    assert_eq!(strength.category, category);
    assert_eq!(strength.tiebreak, tiebreak);
}

#[test]
fn test_suit_relabeling_does_not_change_non_flush_hands() {
    let a = rank_5(&cards("Ah Kd Qc Js 9h"));
    let b = rank_5(&cards("As Kh Qd Jc 9s"));
    assert_eq!(a, b);

    let a = rank_5(&cards("Qh Qd Th Tc 9s"));
    let b = rank_5(&cards("Qc Qs Td Th 9d"));
    assert_eq!(a, b);
}

#[test]
fn test_best_of_7_picks_the_strongest_subset() {
    // Both a straight and a flush are present; the flush must win out.
    let strength = best_of_7(&cards("Ah Th 7h 4h 2h 9d 8c"));
    assert_eq!(strength.category, HandCategory::Flush);

    // Board pairs the hole cards into a full house.
    let strength = best_of_7(&cards("Ks Kh Qc Qh Kd 2c 7s"));
    assert_eq!(strength.category, HandCategory::FullHouse);
    assert_eq!(strength.tiebreak, vec![13, 12]);
}

#[rstest]
#[case("Ah 2c 3d 4s 5h", "9d 8c")]
#[case("Qh Qd Th Tc 9s", "2d 3c")]
#[case("Ah Kd Qc Js 9h", "2d 3c")]
#[case("Kd Qd Jd 9d 2d", "2c 3c")]
fn test_two_extra_cards_never_weaken_a_hand(#[case] five: &str, #[case] extra: &str) {
    let base: [Card; 5] = cards(five);
    let extra: [Card; 2] = cards(extra);
    let seven = [
        base[0], base[1], base[2], base[3], base[4], extra[0], extra[1],
    ];
    assert!(best_of_7(&seven) >= rank_5(&base));
}

#[test]
fn test_equal_seven_card_hands_tie() {
    // Board plays for both: the hole cards are irrelevant.
    let board = "Ah Kh Qh Jh Th";
    let a = best_of_7(&cards(&format!("{board} 2c 3d")));
    let b = best_of_7(&cards(&format!("{board} 4s 5c")));
    assert_eq!(compare(&a, &b), Ordering::Equal);
}

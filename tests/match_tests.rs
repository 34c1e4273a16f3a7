use holdem_sim::logs::TailBuffer;
use holdem_sim::ratings::{EloConfig, clamp_rating, expected_score, update_elo_pairwise};
use holdem_sim::{
    BotReply, EngineError, HandState, LegalAction, MatchConfig, MatchResult, ProposedAction,
    VisibleState, make_visible_state, run_match,
};

fn check_call_reply(view: &VisibleState) -> BotReply {
    if view.legal_actions.contains(&LegalAction::Check) {
        BotReply::action(ProposedAction::of("check"))
    } else if view
        .legal_actions
        .iter()
        .any(|a| matches!(a, LegalAction::Call { .. }))
    {
        BotReply::action(ProposedAction::of("call"))
    } else {
        BotReply::action(ProposedAction::of("fold"))
    }
}

fn scripted_decide(code: &str, view: &VisibleState) -> BotReply {
    match code {
        "all_in" => BotReply::action(ProposedAction::of("all_in")),
        "crash" => BotReply::failure("boom at decision time"),
        "chatty" => {
            let mut reply = check_call_reply(view);
            reply.logs = Some(format!("thinking about {}", view.street));
            reply
        }
        _ => check_call_reply(view),
    }
}

fn no_equity_state(hand: &HandState, actor: usize) -> VisibleState {
    make_visible_state(hand, actor, 0)
}

fn run(codes: &[&str], seed: u64, cfg: &MatchConfig) -> MatchResult {
    let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
    run_match(&codes, seed, cfg, &mut scripted_decide, &mut no_equity_state)
        .expect("match runs")
}

fn small_match(seats: usize, hands: u32) -> MatchConfig {
    MatchConfig {
        hands,
        seats,
        ..MatchConfig::default()
    }
}

#[test]
fn test_match_is_deterministic_across_runs() {
    let cfg = small_match(2, 5);
    let a = run(&["check_call", "check_call"], 42, &cfg);
    let b = run(&["check_call", "check_call"], 42, &cfg);

    assert_eq!(a.final_stacks, b.final_stacks);
    assert_eq!(a.chips_won, b.chips_won);
    assert_eq!(a, b);
    assert_eq!(a.hands, 5);
}

#[test]
fn test_match_conserves_chips_and_rotates_the_dealer() {
    let cfg = small_match(6, 20);
    let result = run(&["check_call", "all_in", "check_call", "check_call", "all_in", "check_call"], 7, &cfg);

    assert_eq!(
        result.final_stacks.iter().map(|&s| s as u64).sum::<u64>(),
        6 * 1000
    );
    assert_eq!(result.chips_won.iter().sum::<i64>(), 0);
    assert!(result.hands <= 20);
    for (h, hr) in result.hand_results.iter().enumerate() {
        assert_eq!(hr.dealer_seat, h % 6);
        assert_eq!(hr.seed, 7 + h as u64 * 10_007);
        assert_eq!(hr.delta_stacks.iter().sum::<i64>(), 0);
    }
}

#[test]
fn test_crashing_bot_still_finishes_a_match() {
    let cfg = small_match(2, 5);
    let result = run(&["crash", "check_call"], 123, &cfg);

    assert_eq!(result.hands, 5);
    assert_eq!(
        result.final_stacks.iter().map(|&s| s as u64).sum::<u64>(),
        2000
    );
    assert!(result.bot_logs[0].errors.contains("boom at decision time"));
    assert!(result.bot_logs[0].errors.contains("ERROR"));
    assert!(result.bot_logs[1].errors.is_empty());
}

#[test]
fn test_bot_logs_are_captured_with_headers() {
    let cfg = small_match(2, 2);
    let result = run(&["chatty", "check_call"], 55, &cfg);

    let logs = &result.bot_logs[0].logs;
    assert!(logs.contains("--- hand-55 preflop seat=0 ---"));
    assert!(logs.contains("thinking about preflop"));
    assert!(result.bot_logs[1].logs.is_empty());
}

#[test]
fn test_wrong_code_count_is_rejected() {
    let cfg = small_match(3, 1);
    let codes = vec!["check_call".to_string(); 2];
    let err = run_match(&codes, 1, &cfg, &mut scripted_decide, &mut no_equity_state).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_tail_buffer_keeps_the_newest_text() {
    let mut buf = TailBuffer::new(100);
    buf.push_block("first block");
    buf.push_block("");
    assert_eq!(buf.as_str(), "first block");

    for i in 0..50 {
        buf.push_block(&format!("block number {i}"));
    }
    let text = buf.as_str();
    assert!(text.len() <= 100);
    assert!(text.contains("block number 49"));
    assert!(!text.contains("first block"));
}

#[test]
fn test_match_result_serializes_and_round_trips() {
    let cfg = small_match(2, 3);
    let result = run(&["check_call", "all_in"], 9, &cfg);

    let json = serde_json::to_string(&result).expect("serializes");
    let back: MatchResult = serde_json::from_str(&json).expect("round trips");
    assert_eq!(result, back);

    // the persistence contract in spot checks
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["seed"], 9);
    assert_eq!(value["seats"], 2);
    let hand = &value["hand_results"][0];
    assert!(hand["board"].is_array());
    assert!(hand["actions"][0]["action"].is_string());
    assert_eq!(hand["actions"][0]["street"], "preflop");
}

#[test]
fn test_visible_state_serializes_for_bots() {
    let cfg = small_match(2, 1);
    let mut captured: Option<serde_json::Value> = None;
    let mut decide = |_: &str, view: &VisibleState| {
        captured.get_or_insert_with(|| serde_json::to_value(view).expect("serializes"));
        check_call_reply(view)
    };
    let codes = vec!["a".to_string(), "b".to_string()];
    run_match(&codes, 31, &cfg, &mut decide, &mut no_equity_state).expect("match runs");

    let view = captured.expect("at least one decision");
    assert!(view["hand_id"].as_str().unwrap().starts_with("hand-"));
    assert_eq!(view["street"], "preflop");
    assert!(view["hole_cards"][0].is_string());
    assert!(view["legal_actions"].is_array());
    assert!(view["legal_actions"][0]["type"].is_string());
    // seat projections expose chips and status only, never cards
    let seats = view["seats"].as_array().unwrap();
    for seat in seats {
        let mut keys: Vec<&str> = seat.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["committed_hand", "committed_street", "stack", "status"]
        );
    }
    assert!(view["equity"]["win"].is_number());
}

#[test]
fn test_elo_heads_up_update_matches_classical_elo() {
    let cfg = EloConfig::default();
    let new = update_elo_pairwise(&[1500.0, 1500.0], &[100.0, -100.0], &cfg).unwrap();
    assert_eq!(new, vec![1516.0, 1484.0]);

    // a draw moves equal ratings nowhere
    let new = update_elo_pairwise(&[1500.0, 1500.0], &[0.0, 0.0], &cfg).unwrap();
    assert_eq!(new, vec![1500.0, 1500.0]);
}

#[test]
fn test_elo_preserves_rating_mass_before_clamping() {
    let cfg = EloConfig::default();
    let old = [1500.0, 1720.0, 1310.0, 1490.0];
    let scores = [250.0, -90.0, -160.0, 0.0];
    let new = update_elo_pairwise(&old, &scores, &cfg).unwrap();

    let before: f64 = old.iter().sum();
    let after: f64 = new.iter().sum();
    assert!((before - after).abs() < 1e-9);

    // the big winner gains, the big loser pays
    assert!(new[0] > old[0]);
    assert!(new[2] < old[2]);
}

#[test]
fn test_elo_k_weight_is_split_across_opponents() {
    let cfg = EloConfig::default();
    // winner of a 5-seat table with equal ratings gains K/2 in total:
    // four pairwise wins at (K/4) * (1 - 0.5) each
    let old = [1500.0; 5];
    let scores = [400.0, -100.0, -100.0, -100.0, -100.0];
    let new = update_elo_pairwise(&old, &scores, &cfg).unwrap();
    assert!((new[0] - 1516.0).abs() < 1e-9);
}

#[test]
fn test_elo_clamps_to_configured_bounds() {
    let cfg = EloConfig {
        k: 32.0,
        min_rating: 100.0,
        max_rating: 1510.0,
    };
    let new = update_elo_pairwise(&[1500.0, 110.0], &[50.0, -50.0], &cfg).unwrap();
    assert!(new[0] <= 1510.0);
    assert!(new[1] >= 100.0);

    assert_eq!(clamp_rating(5000.0, &cfg), 1510.0);
    assert_eq!(clamp_rating(-3.0, &cfg), 100.0);
}

#[test]
fn test_elo_rejects_mismatched_inputs() {
    let cfg = EloConfig::default();
    assert!(matches!(
        update_elo_pairwise(&[1500.0, 1500.0], &[1.0], &cfg),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        update_elo_pairwise(&[1500.0], &[1.0], &cfg),
        Err(EngineError::InvalidInput(_))
    ));
}

#[test]
fn test_expected_score_is_symmetric() {
    let e = expected_score(1600.0, 1400.0);
    assert!((e + expected_score(1400.0, 1600.0) - 1.0).abs() < 1e-12);
    assert!(e > 0.5);
    assert_eq!(expected_score(1500.0, 1500.0), 0.5);
}

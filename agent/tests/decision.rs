//! End-to-end decisions through the agent

use cfrbot_agent::{ActionLabel, CfrPlayer, DecisionRequest, Player};
use cfrbot_engine::{Action, CactusKevEvaluator, Card, CfrSolver, EngineError, LegalAction, Seat, SolverConfig};
use cfrbot_tree::TreeBuilder;

/// Seat zero on the turn facing a 10 chip bet into 10
fn turn_request(hole: &str) -> DecisionRequest {
    let hole = Card::parse_many(hole).unwrap();
    DecisionRequest {
        seat: Seat::Zero,
        hole_cards: [hole[0], hole[1]],
        board: Card::parse_many("Ad Kc 7h 2s").unwrap(),
        pot: 20,
        stacks: [100, 100],
        committed: [0, 10],
        big_blind: 10,
        button: Seat::Zero,
        opponent_acted: true,
        legal: vec![
            LegalAction::Fold,
            LegalAction::Call { amount: 10 },
            LegalAction::Raise { min: 20, max: 100 },
        ],
    }
}

fn config(iterations: u32) -> SolverConfig {
    SolverConfig {
        iterations,
        max_depth: 1,
        ..SolverConfig::default()
    }
}

#[test]
fn test_strong_hand_prefers_call_over_fold() {
    let player = CfrPlayer::new("cfr", config(500));
    let strategy = player.solve(&turn_request("As Ah")).unwrap();

    assert!(strategy.is_distribution(1e-9));
    let fold = strategy.probability(Action::Fold);
    let call = strategy.probability(Action::Call);
    let raises: Vec<f64> = strategy
        .iter()
        .filter(|(a, _)| a.is_raise())
        .map(|(_, p)| p)
        .collect();

    assert!(call > 0.0);
    assert!(!raises.is_empty());
    assert!(raises.iter().all(|&p| p > 0.0), "raises: {:?}", raises);
    assert!(fold < call, "fold {} call {}", fold, call);
}

#[test]
fn test_decisions_are_deterministic() {
    let request = turn_request("Qh Jh");
    let a = CfrPlayer::new("a", config(100)).solve(&request).unwrap();
    let b = CfrPlayer::new("b", config(100)).solve(&request).unwrap();
    assert_eq!(a.actions(), b.actions());
    let bits = |s: &cfrbot_engine::Strategy| s.probabilities().iter().map(|p| p.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));

    let mut first = CfrPlayer::new("a", config(100));
    let mut second = CfrPlayer::new("b", config(100));
    assert_eq!(first.decide(&request).unwrap(), second.decide(&request).unwrap());
}

#[test]
fn test_zero_iterations_produce_no_action() {
    let mut player = CfrPlayer::new("cfr", config(0));
    let result = player.decide(&turn_request("As Ah"));
    assert_eq!(result, Err(EngineError::InvalidIterationCount(0)));
    assert!(player.log().is_empty());
}

#[test]
fn test_empty_legal_set_is_malformed() {
    let mut request = turn_request("As Ah");
    request.legal.clear();
    let mut player = CfrPlayer::new("cfr", config(10));
    assert!(matches!(player.decide(&request), Err(EngineError::MalformedState(_))));
    assert!(player.log().is_empty());
}

#[test]
fn test_chosen_action_is_legal_and_logged() {
    let request = turn_request("As Ah");
    let mut player = CfrPlayer::new("cfr", config(200));
    let action = player.decide(&request).unwrap();
    match action.label {
        ActionLabel::Raise => assert!((20..=100).contains(&action.amount)),
        _ => assert_eq!(action.amount, 0),
    }
    assert_eq!(player.log().len(), 1);
    let record = &player.log().records()[0];
    assert_eq!(record.iterations, 200);
    let total: f64 = record.strategy.iter().map(|(_, p)| p).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_overcommitted_actor_is_malformed() {
    let mut request = turn_request("As Ah");
    request.committed = [20, 10];
    request.legal = vec![LegalAction::Call { amount: 0 }, LegalAction::Raise { min: 15, max: 120 }];
    let mut player = CfrPlayer::new("cfr", config(10));
    assert!(matches!(player.decide(&request), Err(EngineError::MalformedState(_))));
    assert!(player.log().is_empty());
}

#[test]
fn test_zero_equity_samples_rejected() {
    let mut request = turn_request("As Ah");
    request.board.pop();
    let config = SolverConfig {
        equity_samples: 0,
        ..config(10)
    };
    let mut player = CfrPlayer::new("cfr", config);
    assert!(matches!(player.decide(&request), Err(EngineError::InvalidConfig(_))));
    assert!(player.log().is_empty());
}

#[test]
fn test_every_information_set_holds_distributions() {
    let config = SolverConfig {
        max_depth: 2,
        ..config(50)
    };
    let request = turn_request("Qh Jh");
    let state = request.state().unwrap();
    let tree = TreeBuilder::new(&config).build(&state, request.hole_cards, config.max_depth).unwrap();
    let evaluator = CactusKevEvaluator::new();
    let mut solver = CfrSolver::new(&tree, &evaluator, &config).unwrap();
    solver.run(config.iterations).unwrap();

    assert_eq!(solver.iteration(), 50);
    assert!(solver.table().len() > 1);
    for (key, set) in solver.table().iter() {
        let current = set.current_strategy();
        let average = set.average_strategy();
        assert_eq!(current.actions(), set.actions(), "{}", key);
        assert_eq!(average.actions(), set.actions(), "{}", key);
        assert!(current.is_distribution(1e-9), "{}: {}", key, current);
        assert!(average.is_distribution(1e-9), "{}: {}", key, average);
    }
}

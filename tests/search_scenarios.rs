//! End-to-end searches on the reference chess board.

use board::{Board, Move};
use negamax_engine::chess::{side_of, ChessRules};
use negamax_engine::evaluate::MaterialEvaluator;
use negamax_engine::search::{
    search, AlphaBeta, DepthLimit, Memoized, ScoreBound, SearchConfig, SearchResult, Searcher,
};
use negamax_engine::tpt::SearchCache;
use negamax_engine::{SearchError, CHECKMATE_SCORE};
use std::sync::Arc;
use std::time::Duration;

fn alpha_beta(fen: &str, depth: u32) -> SearchResult<Move> {
    let pos = Board::from_fen(fen).unwrap();
    AlphaBeta::new(Arc::new(ChessRules), Arc::new(MaterialEvaluator), Arc::new(DepthLimit::new(depth)))
        .search(&pos, side_of(pos.side_to_move), 0, ScoreBound::full())
}

fn full_stack(fen: &str, depth: u32, threads: usize) -> SearchResult<Move> {
    let pos = Board::from_fen(fen).unwrap();
    let config = SearchConfig {
        threads,
        max_depth: depth,
        ..SearchConfig::default()
    };
    search(
        &pos,
        side_of(pos.side_to_move),
        Arc::new(ChessRules),
        Arc::new(MaterialEvaluator),
        Arc::new(SearchCache::new()),
        &config,
    )
}

fn mv(text: &str) -> Option<Move> {
    Some(Move::parse(text).unwrap())
}

const LONE_KING: &str = "5K1k/8/5Q2/8/8/8/8/8 b - - 0 1";
const HANGING_ROOK: &str = "7k/8/8/3r4/8/8/8/K2R4 w - - 0 1";
const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
const MATE_IN_TWO: &str = "7k/8/8/8/8/8/R7/1R5K w - - 0 1";
const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

#[test]
fn test_only_king_move_against_queen() {
    let outcome = alpha_beta(LONE_KING, 1).unwrap();
    assert_eq!(outcome.best_move, mv("h8h7"));
    assert_eq!(outcome.score, -900.0);
}

#[test]
fn test_winning_capture_scores_captured_piece() {
    for depth in 1..=2 {
        let outcome = alpha_beta(HANGING_ROOK, depth).unwrap();
        assert_eq!(outcome.best_move, mv("d1d5"), "depth {depth}");
        assert_eq!(outcome.score, 500.0, "depth {depth}");
    }
}

#[test]
fn test_mate_in_one() {
    let outcome = alpha_beta(MATE_IN_ONE, 2).unwrap();
    assert_eq!(outcome.best_move, mv("a1a8"));
    assert_eq!(outcome.score, CHECKMATE_SCORE - 1.0);
}

#[test]
fn test_shorter_mate_scores_higher() {
    let one = alpha_beta(MATE_IN_ONE, 2).unwrap();
    let two = alpha_beta(MATE_IN_TWO, 4).unwrap();

    assert_eq!(two.score, CHECKMATE_SCORE - 3.0);
    assert!(one.score > two.score);
    assert!(matches!(two.best_move, Some(m) if m == Move::parse("b1b7").unwrap() || m == Move::parse("a2a7").unwrap()));
}

#[test]
fn test_stalemate_is_a_draw() {
    assert_eq!(alpha_beta(STALEMATE, 1), Err(SearchError::Draw));
    assert_eq!(full_stack(STALEMATE, 3, 2), Err(SearchError::Draw));
}

#[test]
fn test_checkmated_root() {
    assert_eq!(alpha_beta(FOOLS_MATE, 2), Err(SearchError::checkmate_at(0)));
    assert_eq!(full_stack(FOOLS_MATE, 2, 2), Err(SearchError::checkmate_at(0)));
}

#[test]
fn test_illegal_root_position() {
    // White to move with the black king en prise.
    let result = alpha_beta("4k3/8/8/8/8/8/8/4RK2 w - - 0 1", 3);
    assert_eq!(result, Err(SearchError::IllegalKingCapture));
}

#[test]
fn test_memoized_agrees_with_plain_search() {
    let pos = Board::from_fen(MATE_IN_TWO).unwrap();
    let side = side_of(pos.side_to_move);
    let plain = alpha_beta(MATE_IN_TWO, 3).unwrap();

    let inner = Arc::new(AlphaBeta::new(
        Arc::new(ChessRules),
        Arc::new(MaterialEvaluator),
        Arc::new(DepthLimit::new(3)),
    ));
    let cache = Arc::new(SearchCache::new());
    let memo = Memoized::new(inner, cache.clone());
    let memoized = memo.search(&pos, side, 0, ScoreBound::full()).unwrap();

    assert_eq!(memoized.best_move, plain.best_move);
    assert_eq!(memoized.score, plain.score);
    assert!(cache.stats().stores > 0);
}

#[test]
fn test_parallel_stack_agrees_with_plain_search() {
    for (fen, depth) in [(HANGING_ROOK, 2), (MATE_IN_ONE, 2), (MATE_IN_TWO, 4)] {
        let plain = alpha_beta(fen, depth).unwrap();
        for threads in [1, 3] {
            let outcome = full_stack(fen, depth, threads).unwrap();
            assert_eq!(outcome.score, plain.score, "{fen} with {threads} threads");
        }
    }
}

#[test]
fn test_move_time_budget_still_answers() {
    let pos = Board::startpos();
    let config = SearchConfig {
        threads: 2,
        max_depth: 64,
        move_time: Some(Duration::from_millis(200)),
        ..SearchConfig::default()
    };
    let outcome = search(
        &pos,
        side_of(pos.side_to_move),
        Arc::new(ChessRules),
        Arc::new(MaterialEvaluator),
        Arc::new(SearchCache::new()),
        &config,
    )
    .unwrap();
    assert!(outcome.best_move.is_some());
}

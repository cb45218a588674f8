use crate::{
    chess::{side_of, ChessRules},
    evaluate::MaterialEvaluator,
    search::{
        AnyOf, DepthLimit, IterationReport, ManualStop, ParallelSearch, ScoreBound, SearchConfig, Searcher,
        TerminationPolicy, MAX_HASH_MB, MAX_PLY, MAX_THREADS,
    },
    time_control::{calculate_time_allocation, TimeLimit},
    tpt::SearchCache,
    types::{is_mate_score, Score, CHECKMATE_SCORE},
};
use board::{Board, Color, Move};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Budget requested by a `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: u64,
    pub binc: u64,
    pub movestogo: Option<u32>,
    pub infinite: bool,
}

impl GoParams {
    pub fn parse(parts: &[&str]) -> Self {
        let mut params = GoParams::default();
        let mut i = 0;
        while i < parts.len() {
            let value = parts.get(i + 1).copied();
            let consumed = match parts[i] {
                "depth" => {
                    params.depth = value.and_then(|v| v.parse().ok());
                    2
                }
                "movetime" => {
                    params.movetime = value.and_then(|v| v.parse().ok());
                    2
                }
                "wtime" => {
                    params.wtime = value.and_then(|v| v.parse().ok());
                    2
                }
                "btime" => {
                    params.btime = value.and_then(|v| v.parse().ok());
                    2
                }
                "winc" => {
                    params.winc = value.and_then(|v| v.parse().ok()).unwrap_or(0);
                    2
                }
                "binc" => {
                    params.binc = value.and_then(|v| v.parse().ok()).unwrap_or(0);
                    2
                }
                "movestogo" => {
                    params.movestogo = value.and_then(|v| v.parse().ok());
                    2
                }
                "infinite" => {
                    params.infinite = true;
                    1
                }
                _ => 1,
            };
            i += consumed;
        }
        params
    }

    /// Wall-clock budget for the side to move, if the command implies one.
    pub fn move_time(&self, side_to_move: Color) -> Option<Duration> {
        if self.infinite {
            return None;
        }
        if let Some(ms) = self.movetime {
            return Some(Duration::from_millis(ms));
        }

        let (time, inc) = match side_to_move {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        time.map(|ms| Duration::from_millis(calculate_time_allocation(ms, inc, self.movestogo)))
    }
}

/// Formats a score the way `info` lines expect: centipawns, or moves to mate.
pub fn format_score(score: Score) -> String {
    if is_mate_score(score) && score.is_finite() {
        let plies = (CHECKMATE_SCORE - score.abs()).round() as i64;
        let moves = (plies + 1) / 2;
        if score > 0.0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {}", score.round() as i64)
    }
}

pub struct UciEngine {
    position: Board,
    config: SearchConfig,
    cache: Arc<SearchCache<Board>>,
    stop: ManualStop,
    search_thread: Option<JoinHandle<()>>,
}

impl UciEngine {
    pub fn new() -> Self {
        let config = SearchConfig::default();
        UciEngine {
            position: Board::startpos(),
            cache: Arc::new(SearchCache::new_mb(config.hash_mb)),
            config,
            stop: ManualStop::new(),
            search_thread: None,
        }
    }

    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        while let Some(Ok(line)) = lines.next() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            match parts[0] {
                "uci" => self.handle_uci(),
                "isready" => println!("readyok"),
                "ucinewgame" => self.handle_new_game(),
                "setoption" => self.handle_setoption(&parts[1..]),
                "position" => self.handle_position(&parts[1..]),
                "go" => self.handle_go(&parts[1..]),
                "stop" => self.finish_search(),
                "quit" => break,
                _ => {}
            }
        }

        self.finish_search();
    }

    fn handle_uci(&self) {
        println!("id name NegamaxEngine");
        println!("id author the negamax_engine developers");
        println!(
            "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
            self.config.hash_mb
        );
        println!(
            "option name Threads type spin default {} min 1 max {MAX_THREADS}",
            self.config.threads
        );
        println!("uciok");
    }

    fn handle_new_game(&mut self) {
        self.finish_search();
        self.position = Board::startpos();
        self.cache.clear();
    }

    /// `setoption name <Name> value <N>`
    fn handle_setoption(&mut self, parts: &[&str]) {
        let name = parts.iter().skip_while(|&&s| s != "name").nth(1).copied();
        let value = parts
            .iter()
            .skip_while(|&&s| s != "value")
            .nth(1)
            .and_then(|v| v.parse::<usize>().ok());

        match (name, value) {
            (Some(name), Some(n)) if name.eq_ignore_ascii_case("threads") => {
                self.config.threads = n.clamp(1, MAX_THREADS);
            }
            (Some(name), Some(n)) if name.eq_ignore_ascii_case("hash") => {
                self.finish_search();
                self.config.hash_mb = n.clamp(1, MAX_HASH_MB);
                self.cache = Arc::new(SearchCache::new_mb(self.config.hash_mb));
            }
            _ => eprintln!("Unsupported option: {}", parts.join(" ")),
        }
    }

    fn handle_position(&mut self, parts: &[&str]) {
        if parts.is_empty() {
            return;
        }

        // position startpos moves e2e4 e7e5 ...
        // position fen <fen> moves ...
        let moves_idx = parts.iter().position(|&s| s == "moves");

        if parts[0] == "startpos" {
            self.position = Board::startpos();
        } else if parts[0] == "fen" {
            let fen = parts[1..moves_idx.unwrap_or(parts.len())].join(" ");
            match Board::from_fen(&fen) {
                Ok(pos) => self.position = pos,
                Err(e) => {
                    eprintln!("Invalid FEN: {}", e);
                    return;
                }
            }
        } else {
            return;
        }

        if let Some(idx) = moves_idx {
            for text in &parts[idx + 1..] {
                let side = side_of(self.position.side_to_move);
                match ChessRules.parse_move(&self.position, side, text) {
                    Some(mv) => self.position = self.position.apply(&mv),
                    None => {
                        eprintln!("Invalid move: {}", text);
                        break;
                    }
                }
            }
        }
    }

    fn handle_go(&mut self, parts: &[&str]) {
        self.finish_search();

        let params = GoParams::parse(parts);
        let max_depth = params.depth.unwrap_or(if params.infinite { MAX_PLY } else { self.config.max_depth });
        let max_depth = max_depth.clamp(1, MAX_PLY);

        let mut budget = AnyOf::default().with(Arc::new(DepthLimit::new(max_depth)));
        if let Some(limit) = params.move_time(self.position.side_to_move) {
            budget = budget.with(Arc::new(TimeLimit::new(limit)));
        }

        self.stop = ManualStop::new();
        let search = ParallelSearch::new(
            Arc::new(ChessRules),
            Arc::new(MaterialEvaluator),
            self.cache.clone(),
            Arc::new(budget) as Arc<dyn TerminationPolicy>,
        )
        .with_concurrency(self.config.threads)
        .with_max_depth(max_depth)
        .with_stop(self.stop.clone())
        .with_reporter(Arc::new(|report: &IterationReport<Move>| {
            let pv = report.best_move.map(|mv| format!(" pv {mv}")).unwrap_or_default();
            println!("info depth {} score {}{}", report.depth, format_score(report.score), pv);
        }));

        let position = self.position.clone();
        self.search_thread = Some(thread::spawn(move || {
            let side = side_of(position.side_to_move);
            let result = search.search(&position, side, 0, ScoreBound::full());
            let nodes = search.stats().snapshot().nodes;
            println!("info nodes {nodes} hashfull {}", search.cache().hashfull());

            let best = result
                .ok()
                .and_then(|outcome| outcome.best_move)
                .or_else(|| ChessRules.legal_moves(&position, side).into_iter().next());
            match best {
                Some(mv) => println!("bestmove {mv}"),
                None => println!("bestmove 0000"),
            }
        }));
    }

    /// Stops a running search and waits for its `bestmove`.
    fn finish_search(&mut self) {
        if let Some(handle) = self.search_thread.take() {
            self.stop.stop();
            let _ = handle.join();
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

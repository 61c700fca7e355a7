//! UCI command dispatch (spec.md §6). This is peripheral plumbing per
//! spec.md §1: parsing over a fixed command grammar and stdio framing, a
//! single-threaded reader driving one spawned search worker (spec.md §5).

pub mod command;
pub mod options;
pub mod report;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::warn;

use crate::board::Position;
use crate::search::{SearchLimits, SearchOptions, Searcher};
use crate::tt::TranspositionTable;
use crate::types::Move;

use command::{parse_command, GoParams, UciCommand};
use options::{EngineOptions, OptionAction};
use report::{format_bestmove, format_info};

pub const ENGINE_NAME: &str = "chess_engine";
pub const ENGINE_VERSION: &str = "1.0";
pub const ENGINE_AUTHOR: &str = "the chess_engine contributors";

/// Shared state the UCI dispatch loop owns across commands. The search
/// itself borrows `position`/`tt` exclusively for the duration of one
/// `go` (spec.md §5): the front-end guarantees `search`, `make`,
/// `unmake`, `load_fen`, and `clear_tt` never overlap.
pub struct Engine {
    position: Position,
    tt: TranspositionTable,
    options: EngineOptions,
    debug: bool,
    stop: Arc<AtomicBool>,
    search_thread: Option<JoinHandle<TranspositionTable>>,
    last_pv: Arc<Mutex<Vec<Move>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Engine {
            position: Position::new(),
            tt: TranspositionTable::new(options::DEFAULT_HASH_MB),
            options: EngineOptions::default(),
            debug: false,
            stop: Arc::new(AtomicBool::new(false)),
            search_thread: None,
            last_pv: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn info_string(&self, msg: &str) {
        if self.debug {
            println!("info string {msg}");
        }
        warn!("{msg}");
    }

    /// Block until any in-flight search thread has emitted its `bestmove`
    /// and exited. Idempotent.
    fn join_search(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.search_thread.take() {
            if let Ok(tt) = handle.join() {
                self.tt = tt;
            }
        }
    }

    pub fn handle_command(&mut self, cmd: UciCommand) -> bool {
        match cmd {
            UciCommand::Uci => {
                self.options.print(ENGINE_NAME, ENGINE_VERSION, ENGINE_AUTHOR);
            }
            UciCommand::IsReady => {
                println!("readyok");
            }
            UciCommand::UciNewGame => {
                self.join_search();
                self.position = Position::new();
                self.tt.clear();
            }
            UciCommand::Position(parts) => {
                self.join_search();
                self.apply_position(&parts);
            }
            UciCommand::Go(params) => {
                self.start_search(&params);
            }
            UciCommand::SetOption { name, value } => {
                self.apply_setoption(&name, value.as_deref());
            }
            UciCommand::Debug(on) => {
                self.debug = on;
            }
            UciCommand::Display => {
                println!("{}", self.position);
                println!(
                    "Legal moves: {}",
                    crate::movegen::generate_legal(&mut self.position).len()
                );
            }
            UciCommand::Perft(depth) => {
                let start = Instant::now();
                let nodes = self.position.perft(depth);
                let elapsed = start.elapsed();
                println!("Nodes: {nodes} ({:.3}s)", elapsed.as_secs_f64());
            }
            UciCommand::Stop => {
                self.join_search();
            }
            UciCommand::Quit => {
                self.join_search();
                return false;
            }
            UciCommand::Unknown(line) => {
                self.info_string(&format!("unrecognised command '{line}'"));
            }
        }
        true
    }

    fn apply_position(&mut self, parts: &[String]) {
        let mut i = 1;
        if parts.get(i).map(String::as_str) == Some("startpos") {
            self.position = Position::new();
            i += 1;
        } else if parts.get(i).map(String::as_str) == Some("fen") {
            if parts.len() < i + 7 {
                self.info_string("position fen: too few fields");
                return;
            }
            let fen = parts[i + 1..i + 7].join(" ");
            match Position::try_from_fen(&fen) {
                Ok(pos) => self.position = pos,
                Err(e) => {
                    self.info_string(&format!("invalid FEN '{fen}': {e}"));
                    return;
                }
            }
            i += 7;
        } else {
            self.info_string("position: expected 'startpos' or 'fen'");
            return;
        }

        if parts.get(i).map(String::as_str) == Some("moves") {
            i += 1;
            while i < parts.len() {
                match self.position.parse_move(&parts[i]) {
                    Ok(mv) => {
                        self.position.make_move(mv);
                    }
                    Err(e) => {
                        self.info_string(&format!("illegal move '{}': {e}", parts[i]));
                        break;
                    }
                }
                i += 1;
            }
        }
    }

    fn apply_setoption(&mut self, name: &str, value: Option<&str>) {
        match self.options.apply(name, value) {
            Some(OptionAction::ResizeHash(mb)) => self.tt.resize(mb),
            Some(OptionAction::ClearHash) => self.tt.clear(),
            None => {}
        }
    }

    fn search_deadline(&self, params: &GoParams) -> Option<Instant> {
        if let Some(ms) = params.movetime {
            return Some(Instant::now() + Duration::from_millis(ms));
        }
        if params.infinite {
            return None;
        }
        let white = self.position.white_to_move;
        let (time_left, inc) = if white {
            (params.wtime, params.winc.unwrap_or(0))
        } else {
            (params.btime, params.binc.unwrap_or(0))
        };
        let time_left = time_left?;
        let moves_to_go = params.movestogo.unwrap_or(30).max(1) as u64;
        let mut budget = time_left / moves_to_go;
        budget = budget.saturating_sub(50);
        budget = budget.saturating_add(inc / 4);
        Some(Instant::now() + Duration::from_millis(budget.max(1)))
    }

    fn start_search(&mut self, params: &GoParams) {
        self.join_search();
        self.stop.store(false, Ordering::Relaxed);

        let max_depth = if params.infinite {
            crate::search::ABSOLUTE_MAX_DEPTH
        } else {
            params.depth.unwrap_or(self.options.depth)
        };
        let deadline = self.search_deadline(params);

        let mut position = self.position.clone();
        let mut tt = std::mem::replace(&mut self.tt, TranspositionTable::new(1));
        let search_options = self.options.search;
        let stop = Arc::clone(&self.stop);
        let ponder_enabled = self.options.ponder;
        let last_pv = Arc::clone(&self.last_pv);

        // The TT is moved into the search thread for the duration of the
        // call and handed back via the thread's return value when
        // `join_search` rejoins it (spec.md §5: search, make/unmake,
        // load_fen and clear_tt never overlap, so nothing else touches
        // `self.tt` until then).
        let handle = std::thread::spawn(move || {
            let limits = SearchLimits { max_depth, deadline, node_limit: None };
            let mut searcher =
                Searcher::new(&mut position, &mut tt, Arc::clone(&stop), search_options, limits);
            let best = searcher.run(|info| {
                println!("{}", format_info(info));
                if let Ok(mut pv) = last_pv.lock() {
                    *pv = info.pv.clone();
                }
                io::stdout().flush().ok();
            });
            let ponder_move = last_pv.lock().ok().and_then(|pv| pv.get(1).copied());
            println!("{}", format_bestmove(best, ponder_move, ponder_enabled));
            io::stdout().flush().ok();
            tt
        });
        self.search_thread = Some(handle);
    }
}

/// Read UCI commands from stdin until `quit` or EOF, dispatching each to a
/// fresh or ongoing [`Engine`]. Output is flushed after every line so it
/// never buffers behind a GUI waiting on a prompt.
pub fn run_uci_loop() {
    let stdin = io::stdin();
    let mut engine = Engine::new();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let Some(cmd) = parse_command(&line) else { continue };
        if !engine.handle_command(cmd) {
            break;
        }
        io::stdout().flush().ok();
    }
    engine.join_search();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_startpos_moves_applies_moves() {
        let mut engine = Engine::new();
        engine.apply_position(&["position", "startpos", "moves", "e2e4", "e7e5"].map(String::from));
        assert!(!engine.position.white_to_move);
    }

    #[test]
    fn illegal_move_in_list_stops_applying_but_keeps_position() {
        let mut engine = Engine::new();
        engine.apply_position(&["position", "startpos", "moves", "e2e5", "e7e5"].map(String::from));
        // e2e5 is illegal; position should remain at startpos (white to move).
        assert!(engine.position.white_to_move);
    }

    #[test]
    fn invalid_fen_keeps_previous_position() {
        let mut engine = Engine::new();
        let before = engine.position.to_fen();
        engine.apply_position(&["position", "fen", "nonsense"].map(String::from));
        assert_eq!(engine.position.to_fen(), before);
    }

    #[test]
    fn setoption_hash_resizes_tt() {
        let mut engine = Engine::new();
        engine.apply_setoption("Hash", Some("16"));
        assert_eq!(engine.options.hash_mb, 16);
    }
}

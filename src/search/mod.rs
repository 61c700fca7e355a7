//! Negamax PVS search with iterative deepening (spec.md §4.7).
//!
//! The engine owns exactly one search worker (spec.md §5): `Searcher`
//! borrows the `Position` and `TranspositionTable` exclusively for the
//! duration of a `run()` call and cooperates with an external `stop()`
//! signal via a shared `AtomicBool`, checked at node-function entry and
//! after every child call.

pub mod ordering;
mod quiescence;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::board::Position;
use crate::eval::evaluate;
use crate::movegen::generate_legal;
use crate::tt::{BoundType, TranspositionTable};
use crate::types::{color_of, piece_color, piece_type, Move, Square, EMPTY, KING, NO_SQUARE, NULL_MOVE, PAWN};
use crate::zobrist::ZOBRIST;

use ordering::OrderingTables;

/// Score assigned to a position where the side to move has just been
/// checkmated at ply 0; mate-in-N scores are this minus the mating ply.
pub const MATE_SCORE: i32 = 30_000;
const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;
const MAX_PLY: usize = 64;

/// Depth cap used for `go infinite` (bounded by [`MAX_PLY`] since ply
/// counters are sized arrays, not unbounded recursion).
pub const ABSOLUTE_MAX_DEPTH: u32 = MAX_PLY as u32;

/// Non-root draws are scored relative to the side to move, discouraging
/// it from steering toward a draw regardless of material (spec.md §9,
/// "Open question — contempt sign": the unconditional-sign convention).
const CONTEMPT: i32 = 25;

const ASPIRATION_WINDOW: i32 = 50;
const MAX_PV_LEN: usize = 20;

const NULL_MOVE_MIN_DEPTH: i32 = 3;
const NULL_MOVE_REDUCTION: i32 = 2;

const RAZOR_MAX_DEPTH: i32 = 3;
const RAZOR_MARGINS: [i32; 4] = [0, 125, 250, 375];
const RFP_MAX_DEPTH: i32 = 3;
const RFP_MARGINS: [i32; 4] = [0, 100, 200, 300];
const STATIC_PRUNE_MAX_DEPTH: i32 = 4;

const PROBCUT_MIN_DEPTH: i32 = 5;
const PROBCUT_MARGIN_LOW: i32 = 199;
const PROBCUT_MARGIN_HIGH: i32 = 200;

const IID_MIN_DEPTH: i32 = 4;
const IID_REDUCTION: i32 = 2;

const LMP_MAX_DEPTH: i32 = 4;
const LMP_CAPS: [i32; 5] = [0, 5, 8, 12, 16];

const FUTILITY_MAX_DEPTH: i32 = 3;
const FUTILITY_MARGINS: [i32; 4] = [0, 200, 300, 500];

const LMR_FULL_DEPTH_MOVES: i32 = 4;
const LMR_REDUCTION_LIMIT: i32 = 3;
const LMR_LATE_MOVE_THRESHOLD: i32 = 6;

/// Which optional pruning techniques are active. Exposed as UCI check
/// options (`UseNullMove`, `UseLMR`, `UseIID`); `UseTranspositionTable`
/// additionally gates the TT probe/store entirely.
#[derive(Clone, Copy, Debug)]
pub struct SearchOptions {
    pub use_tt: bool,
    pub use_null_move: bool,
    pub use_lmr: bool,
    pub use_iid: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            use_tt: true,
            use_null_move: true,
            use_lmr: true,
            use_iid: true,
        }
    }
}

/// Stopping conditions for one `go` call. `deadline` is armed by the UCI
/// front-end from `movetime`/clock fields; search itself only consults
/// the flag, never a clock (spec.md §5).
pub struct SearchLimits {
    pub max_depth: u32,
    pub deadline: Option<Instant>,
    pub node_limit: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: 6,
            deadline: None,
            node_limit: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    /// Mate in N full moves; positive means the side to move is mating.
    Mate(i32),
}

fn classify_score(raw: i32) -> Score {
    if raw > MATE_THRESHOLD {
        let plies = MATE_SCORE - raw;
        Score::Mate((plies + 1) / 2)
    } else if raw < -MATE_THRESHOLD {
        let plies = MATE_SCORE + raw;
        Score::Mate(-((plies + 1) / 2))
    } else {
        Score::Cp(raw)
    }
}

/// Everything reported after a completed iterative-deepening depth
/// (spec.md §6, "Info record").
pub struct SearchInfo {
    pub depth: u32,
    pub score: Score,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: u64,
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

pub struct Searcher<'a> {
    pos: &'a mut Position,
    tt: &'a mut TranspositionTable,
    stop: Arc<AtomicBool>,
    options: SearchOptions,
    limits: SearchLimits,
    start: Instant,
    nodes: u64,
    ordering: OrderingTables,
    last_move_piece: [u8; MAX_PLY],
    last_move_to: [Square; MAX_PLY],
    root_best: Move,
}

impl<'a> Searcher<'a> {
    pub fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        stop: Arc<AtomicBool>,
        options: SearchOptions,
        limits: SearchLimits,
    ) -> Self {
        Searcher {
            pos,
            tt,
            stop,
            options,
            limits,
            start: Instant::now(),
            nodes: 0,
            ordering: OrderingTables::new(),
            last_move_piece: [EMPTY; MAX_PLY],
            last_move_to: [NO_SQUARE; MAX_PLY],
            root_best: NULL_MOVE,
        }
    }

    /// Run iterative deepening from depth 1 to `limits.max_depth`, calling
    /// `on_info` after every completed depth. Returns the best move from
    /// the last *completed* iteration; a stopped partial iteration never
    /// contributes (spec.md §4.7, "Cancellation").
    pub fn run(&mut self, mut on_info: impl FnMut(&SearchInfo)) -> Move {
        self.ordering.clear_killers();
        self.start = Instant::now();
        self.nodes = 0;

        let max_depth = self.limits.max_depth.max(1);
        let mut completed_move = NULL_MOVE;
        let mut completed_score = 0;

        for depth in 1..=max_depth {
            if depth > 1 && self.should_stop() {
                break;
            }
            self.root_best = NULL_MOVE;

            let score = if depth == 1 {
                self.negamax(1, -MATE_SCORE, MATE_SCORE, 0, true, true)
            } else {
                self.aspiration_search(depth as i32, completed_score)
            };

            if self.root_best == NULL_MOVE {
                break;
            }

            completed_move = self.root_best;
            completed_score = score;

            let pv = self.extract_pv(MAX_PV_LEN);
            let time_ms = self.start.elapsed().as_millis() as u64;
            let nps = if time_ms > 0 { self.nodes * 1000 / time_ms } else { self.nodes };
            on_info(&SearchInfo {
                depth,
                score: classify_score(completed_score),
                nodes: self.nodes,
                time_ms,
                nps,
                hashfull: self.tt.hashfull_per_mille(),
                pv,
            });

            if self.should_stop() {
                break;
            }
        }

        completed_move
    }

    fn aspiration_search(&mut self, depth: i32, prev_score: i32) -> i32 {
        let mut alpha = prev_score - ASPIRATION_WINDOW;
        let mut beta = prev_score + ASPIRATION_WINDOW;
        loop {
            let score = self.negamax(depth, alpha, beta, 0, true, true);
            if self.should_stop() {
                return score;
            }
            if score <= alpha {
                alpha = -MATE_SCORE;
                continue;
            }
            if score >= beta {
                beta = MATE_SCORE;
                continue;
            }
            return score;
        }
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(limit) = self.limits.node_limit {
            if self.nodes >= limit {
                return true;
            }
        }
        if let Some(deadline) = self.limits.deadline {
            if self.nodes % 2048 == 0 && Instant::now() >= deadline {
                return true;
            }
        }
        false
    }

    /// Walk TT best-moves from the current position, bounded by length and
    /// by an already-seen hash set to avoid looping on a repeated position
    /// (spec.md §9, "Cyclic PV extraction"). Restores Position fully.
    fn extract_pv(&mut self, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut seen = Vec::with_capacity(max_len);
        let mut undone = Vec::with_capacity(max_len);

        for _ in 0..max_len {
            let hash = self.pos.hash;
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);

            let Some((_, _, _, Some(mv))) = self.tt.probe(hash, 0) else {
                break;
            };
            if mv.is_null() {
                break;
            }
            if !generate_legal(self.pos).iter().any(|m| *m == mv) {
                break;
            }

            let undo = self.pos.make_move(mv);
            pv.push(mv);
            undone.push((mv, undo));
        }

        for (mv, undo) in undone.into_iter().rev() {
            self.pos.unmake_move(mv, undo);
        }

        pv
    }

    /// Negamax PVS node function (spec.md §4.7, "Node function").
    fn negamax(
        &mut self,
        mut depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: u32,
        is_root: bool,
        allow_null: bool,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        if !is_root {
            if self.pos.is_fifty_moves() || self.pos.has_insufficient_material() {
                return -CONTEMPT;
            }
            if self.pos.approaching_repetition() {
                return -2 * CONTEMPT;
            }
        }

        let mut tt_move = NULL_MOVE;
        if self.options.use_tt {
            if let Some((stored_depth, score, bound, mv)) = self.tt.probe(self.pos.hash, ply) {
                if let Some(mv) = mv {
                    tt_move = mv;
                }
                if stored_depth as i32 >= depth {
                    match bound {
                        BoundType::Exact => return score,
                        BoundType::Lower if score >= beta => return beta,
                        BoundType::Upper if score <= alpha => return alpha,
                        _ => {}
                    }
                }
            }
        }

        let in_check = self.pos.is_in_check(self.pos.white_to_move);
        if in_check {
            depth += 1;
        }

        let legal = generate_legal(self.pos);
        if legal.is_empty() {
            return if in_check { -(MATE_SCORE - ply as i32) } else { 0 };
        }

        if depth <= 0 {
            return quiescence::quiescence(self.pos, &self.stop, &mut self.nodes, alpha, beta, ply, 0);
        }

        if self.options.use_iid && tt_move == NULL_MOVE && depth >= IID_MIN_DEPTH && !in_check {
            self.negamax(depth - IID_REDUCTION, alpha, beta, ply, false, allow_null);
            if let Some((_, _, _, Some(mv))) = self.tt.probe(self.pos.hash, ply) {
                tt_move = mv;
            }
        }

        if self.options.use_null_move
            && allow_null
            && !is_root
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && has_non_pawn_material(self.pos, self.pos.white_to_move)
        {
            let saved_ep = make_null_move(self.pos);
            let score = -self.negamax(
                depth - 1 - NULL_MOVE_REDUCTION,
                -beta,
                -beta + 1,
                ply + 1,
                false,
                false,
            );
            unmake_null_move(self.pos, saved_ep);
            if score >= beta {
                return beta;
            }
        }

        let static_eval = if !in_check && depth <= STATIC_PRUNE_MAX_DEPTH && alpha.abs() < MATE_SCORE - 100 {
            Some(evaluate(self.pos))
        } else {
            None
        };

        if let Some(eval) = static_eval {
            if depth <= RAZOR_MAX_DEPTH {
                let margin = RAZOR_MARGINS[depth.clamp(0, 3) as usize];
                if eval + margin < alpha {
                    let razor_score =
                        quiescence::quiescence(self.pos, &self.stop, &mut self.nodes, alpha, beta, ply, 0);
                    if razor_score < alpha {
                        return razor_score;
                    }
                }
            }
            if depth <= RFP_MAX_DEPTH {
                let margin = RFP_MARGINS[depth.clamp(0, 3) as usize];
                if eval - margin >= beta {
                    return beta;
                }
            }
        }

        if !is_root && !in_check && depth >= PROBCUT_MIN_DEPTH && beta.abs() < MATE_SCORE - 100 {
            let shallow = (depth - 4).max(1);
            let pc_score = self.negamax(
                shallow,
                beta + PROBCUT_MARGIN_LOW,
                beta + PROBCUT_MARGIN_HIGH,
                ply,
                false,
                true,
            );
            if pc_score >= beta + PROBCUT_MARGIN_HIGH {
                return beta;
            }
        }

        let (prev_piece, prev_to) = if ply > 0 {
            (self.last_move_piece[(ply - 1) as usize], self.last_move_to[(ply - 1) as usize])
        } else {
            (EMPTY, NO_SQUARE)
        };

        let pos_ref: &Position = self.pos;
        let ordering_ref = &self.ordering;
        let mut scored: Vec<(Move, i32)> = legal
            .into_iter()
            .map(|mv| {
                let s = ordering::score_move(pos_ref, &mv, tt_move, ordering_ref, ply as usize, prev_piece, prev_to);
                (mv, s)
            })
            .collect();
        scored.sort_by_key(|(_, s)| std::cmp::Reverse(*s));

        let alpha_orig = alpha;
        let mut best_score = -MATE_SCORE;
        let mut best_move = NULL_MOVE;
        let mut moves_searched = 0i32;
        let mut quiets_searched = 0i32;

        for (mv, _) in &scored {
            let mv = *mv;
            if self.should_stop() {
                break;
            }

            let is_capture = ordering::is_capture(self.pos, &mv);
            let is_promo = mv.promotion != EMPTY;
            let is_quiet = !is_capture && !is_promo;

            if is_quiet && !is_root && !in_check && depth <= LMP_MAX_DEPTH {
                let cap = LMP_CAPS[depth.clamp(0, LMP_MAX_DEPTH) as usize];
                if quiets_searched >= cap {
                    quiets_searched += 1;
                    continue;
                }
            }

            if is_quiet && !is_root && !in_check && moves_searched > 0 && depth <= FUTILITY_MAX_DEPTH {
                if let Some(eval) = static_eval {
                    let margin = FUTILITY_MARGINS[depth.clamp(0, FUTILITY_MAX_DEPTH) as usize];
                    if eval + margin <= alpha {
                        quiets_searched += 1;
                        continue;
                    }
                }
            }

            let moving_piece = self.pos.piece_at(mv.from);
            let undo = self.pos.make_move(mv);
            let gives_check = self.pos.is_in_check(self.pos.white_to_move);

            if (ply as usize) < MAX_PLY {
                self.last_move_piece[ply as usize] = moving_piece;
                self.last_move_to[ply as usize] = mv.to;
            }

            let move_index = moves_searched;
            moves_searched += 1;
            if is_quiet {
                quiets_searched += 1;
            }

            let is_killer = is_quiet && self.ordering.is_killer(ply as usize, &mv);
            let mut reduction = 0;
            if self.options.use_lmr
                && move_index >= LMR_FULL_DEPTH_MOVES
                && depth >= LMR_REDUCTION_LIMIT
                && is_quiet
                && !is_killer
                && !in_check
                && !gives_check
            {
                reduction = if move_index >= LMR_LATE_MOVE_THRESHOLD { 2 } else { 1 };
            }

            let score = if move_index == 0 {
                -self.negamax(depth - 1, -beta, -alpha, ply + 1, false, true)
            } else {
                let reduced = (depth - 1 - reduction).max(0);
                let mut s = -self.negamax(reduced, -alpha - 1, -alpha, ply + 1, false, true);
                if reduction > 0 && s > alpha {
                    s = -self.negamax(depth - 1, -alpha - 1, -alpha, ply + 1, false, true);
                }
                if s > alpha && s < beta {
                    s = -self.negamax(depth - 1, -beta, -alpha, ply + 1, false, true);
                }
                s
            };

            self.pos.unmake_move(mv, undo);

            if self.should_stop() {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if is_root {
                    self.root_best = mv;
                }
            }

            if score > alpha {
                alpha = score;
                if is_quiet {
                    self.ordering.add_history(moving_piece, mv.to, depth);
                }
                if alpha >= beta {
                    if is_quiet {
                        self.ordering.update_killer(ply as usize, mv);
                        self.ordering.set_countermove(prev_piece, prev_to, mv);
                    }
                    best_score = alpha;
                    break;
                }
            }
        }

        if self.options.use_tt && !self.should_stop() && best_move != NULL_MOVE {
            let bound = if best_score <= alpha_orig {
                BoundType::Upper
            } else if best_score >= beta {
                BoundType::Lower
            } else {
                BoundType::Exact
            };
            self.tt.store(self.pos.hash, depth.max(0) as u32, best_score, ply, bound, Some(best_move));
        }

        best_score
    }
}

fn has_non_pawn_material(pos: &Position, white: bool) -> bool {
    let color = color_of(white);
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece == EMPTY || piece_color(piece) != color {
            continue;
        }
        let kind = piece_type(piece);
        if kind != PAWN && kind != KING {
            return true;
        }
    }
    false
}

/// Flip side to move for a null-move probe, keeping the hash in sync by
/// XORing the side key and re-keying the (now cleared) en-passant square
/// (spec.md §4.7 step 9). Returns the previous en-passant square so the
/// caller can restore it.
fn make_null_move(pos: &mut Position) -> Square {
    let prev_ep = pos.en_passant_square;
    pos.hash ^= ZOBRIST.ep_key(prev_ep);
    pos.en_passant_square = NO_SQUARE;
    pos.hash ^= ZOBRIST.ep_key(pos.en_passant_square);
    pos.hash ^= ZOBRIST.side_key;
    pos.white_to_move = !pos.white_to_move;
    prev_ep
}

fn unmake_null_move(pos: &mut Position, prev_ep: Square) {
    pos.white_to_move = !pos.white_to_move;
    pos.hash ^= ZOBRIST.side_key;
    pos.hash ^= ZOBRIST.ep_key(pos.en_passant_square);
    pos.en_passant_square = prev_ep;
    pos.hash ^= ZOBRIST.ep_key(pos.en_passant_square);
}

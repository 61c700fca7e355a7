//! Formatting for the `info` and `bestmove` output lines (spec.md §6,
//! "Info record" / "Move wire format").

use crate::search::{Score, SearchInfo};
use crate::types::Move;

#[must_use]
pub fn format_info(info: &SearchInfo) -> String {
    let score = match info.score {
        Score::Cp(cp) => format!("cp {cp}"),
        Score::Mate(n) => format!("mate {n}"),
    };
    let mut line = format!(
        "info depth {} score {} nodes {} time {} nps {} hashfull {}",
        info.depth, score, info.nodes, info.time_ms, info.nps, info.hashfull
    );
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            line.push(' ');
            line.push_str(&mv.to_string());
        }
    }
    line
}

/// `bestmove <m> [ponder <m2>]`. `best` is `NULL_MOVE` when there is no
/// legal move at root (spec.md §4.7, "Failure semantics") — still printed,
/// never an error. `ponder_move` is the PV's second move, only included
/// when the `Ponder` option is on.
#[must_use]
pub fn format_bestmove(best: Move, ponder_move: Option<Move>, ponder_enabled: bool) -> String {
    let mut line = format!("bestmove {best}");
    if ponder_enabled {
        if let Some(p) = ponder_move {
            line.push_str(&format!(" ponder {p}"));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Score;
    use crate::types::NULL_MOVE;

    #[test]
    fn formats_cp_score_with_pv() {
        let info = SearchInfo {
            depth: 4,
            score: Score::Cp(35),
            nodes: 1000,
            time_ms: 50,
            nps: 20000,
            hashfull: 10,
            pv: vec![Move::quiet(12, 28)],
        };
        let line = format_info(&info);
        assert!(line.starts_with("info depth 4 score cp 35"));
        assert!(line.contains("pv e2e4"));
    }

    #[test]
    fn formats_mate_score() {
        let info = SearchInfo {
            depth: 2,
            score: Score::Mate(-1),
            nodes: 10,
            time_ms: 1,
            nps: 10,
            hashfull: 0,
            pv: vec![],
        };
        assert!(format_info(&info).contains("mate -1"));
    }

    #[test]
    fn null_move_still_formats() {
        assert_eq!(format_bestmove(NULL_MOVE, None, false), "bestmove 0000");
    }

    #[test]
    fn ponder_move_omitted_when_disabled() {
        let line = format_bestmove(Move::quiet(12, 28), Some(Move::quiet(52, 36)), false);
        assert_eq!(line, "bestmove e2e4");
    }

    #[test]
    fn ponder_move_included_when_enabled() {
        let line = format_bestmove(Move::quiet(12, 28), Some(Move::quiet(52, 36)), true);
        assert_eq!(line, "bestmove e2e4 ponder e7e5");
    }
}

//! The `setoption`-backed configuration surface (spec.md §6, "Options
//! exposed"). There is no config file: `setoption` *is* configuration for
//! this engine, matching the teacher and the original source.

use crate::search::SearchOptions;

pub const DEFAULT_HASH_MB: usize = 64;
pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 1024;

pub const DEFAULT_DEPTH: u32 = 6;
pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 30;

/// An action the UCI dispatch loop must take in response to a `setoption`
/// that the option table alone cannot perform (resizing/clearing the TT
/// is owned by the caller, not by `EngineOptions`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionAction {
    ResizeHash(usize),
    ClearHash,
}

pub struct EngineOptions {
    pub hash_mb: usize,
    pub depth: u32,
    pub ponder: bool,
    pub search: SearchOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            hash_mb: DEFAULT_HASH_MB,
            depth: DEFAULT_DEPTH,
            ponder: true,
            search: SearchOptions::default(),
        }
    }
}

impl EngineOptions {
    /// Emit the `id`/`option`/`uciok` block for the `uci` command.
    pub fn print(&self, name: &str, version: &str, author: &str) {
        println!("id name {name} {version}");
        println!("id author {author}");
        println!(
            "option name Hash type spin default {DEFAULT_HASH_MB} min {MIN_HASH_MB} max {MAX_HASH_MB}"
        );
        println!(
            "option name Depth type spin default {DEFAULT_DEPTH} min {MIN_DEPTH} max {MAX_DEPTH}"
        );
        print_check("Ponder", true);
        print_check("UseTranspositionTable", true);
        print_check("UseNullMove", true);
        print_check("UseLMR", true);
        print_check("UseIID", true);
        println!("option name Clear Hash type button");
        println!("uciok");
    }

    /// Apply one `setoption name <N> [value <V>]`. Unknown names and
    /// out-of-range values are clamped or ignored, never a hard failure
    /// (spec.md §7, "Option out of range").
    pub fn apply(&mut self, name: &str, value: Option<&str>) -> Option<OptionAction> {
        let as_bool = |v: &str| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");

        match name.trim() {
            "Hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_HASH_MB)
                    .clamp(MIN_HASH_MB, MAX_HASH_MB);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Some(OptionAction::ResizeHash(mb));
                }
            }
            "Depth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    self.depth = v.clamp(MIN_DEPTH, MAX_DEPTH);
                }
            }
            "Ponder" => {
                if let Some(v) = value {
                    self.ponder = as_bool(v);
                }
            }
            "UseTranspositionTable" => {
                if let Some(v) = value {
                    self.search.use_tt = as_bool(v);
                }
            }
            "UseNullMove" => {
                if let Some(v) = value {
                    self.search.use_null_move = as_bool(v);
                }
            }
            "UseLMR" => {
                if let Some(v) = value {
                    self.search.use_lmr = as_bool(v);
                }
            }
            "UseIID" => {
                if let Some(v) = value {
                    self.search.use_iid = as_bool(v);
                }
            }
            "Clear Hash" => return Some(OptionAction::ClearHash),
            _ => {}
        }
        None
    }
}

fn print_check(name: &str, default: bool) {
    println!("option name {name} type check default {}", if default { "true" } else { "false" });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_option_clamps_to_range() {
        let mut opts = EngineOptions::default();
        let action = opts.apply("Hash", Some("99999"));
        assert_eq!(opts.hash_mb, MAX_HASH_MB);
        assert_eq!(action, Some(OptionAction::ResizeHash(MAX_HASH_MB)));
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut opts = EngineOptions::default();
        assert_eq!(opts.apply("NotARealOption", Some("1")), None);
    }

    #[test]
    fn clear_hash_button_has_no_value() {
        let mut opts = EngineOptions::default();
        assert_eq!(opts.apply("Clear Hash", None), Some(OptionAction::ClearHash));
    }

    #[test]
    fn use_null_move_toggles_search_options() {
        let mut opts = EngineOptions::default();
        opts.apply("UseNullMove", Some("false"));
        assert!(!opts.search.use_null_move);
    }
}

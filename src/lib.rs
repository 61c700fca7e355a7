//! A single-threaded UCI chess engine: mailbox board representation,
//! legal move generation, incrementally-hashed transposition-aware
//! alpha-beta search, and static evaluation. See spec.md for the full
//! specification; the UCI front-end in [`uci`] is peripheral plumbing
//! over the core in [`board`], [`movegen`], [`search`] and [`eval`].

pub mod board;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod search;
pub mod see;
pub mod tt;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use error::EngineError;

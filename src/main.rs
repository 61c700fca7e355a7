//! Process entry point: initialise logging to stderr (so it never
//! interleaves with the UCI protocol's stdout stream) and run the UCI
//! read loop on the main thread.

fn main() {
    env_logger::init();
    chess_engine::uci::run_uci_loop();
}

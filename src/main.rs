use negamax_engine::uci::UciEngine;

fn main() {
    let mut engine = UciEngine::new();
    engine.run();
}

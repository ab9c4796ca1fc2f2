//! Throughput of each generation kind, for flamegraph runs.
//!
//!   cargo flamegraph --example movegen_bench -p chess_core -- [rounds]

use std::env;
use std::time::{Duration, Instant};

use chess_core::{GenType, MoveList, Position, generate};

const FENS: [&str; 6] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r1bqkb1r/pppp1Npp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K2R b KQkq - 0 1",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 1",
];

fn main() {
    let rounds: u32 = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(50_000);
    let positions: Vec<Position> = FENS
        .iter()
        .map(|fen| Position::from_fen(fen).expect("bench FEN must parse"))
        .collect();

    let mut list = MoveList::new();
    for kind in [GenType::All, GenType::Noisy, GenType::Quiet, GenType::Captures] {
        let mut moves = 0u64;
        let start = Instant::now();
        for _ in 0..rounds {
            for pos in &positions {
                generate(pos, kind, &mut list);
                moves += list.len() as u64;
            }
        }
        report(kind, moves, rounds as u64 * positions.len() as u64, start.elapsed());
    }
}

fn report(kind: GenType, moves: u64, calls: u64, elapsed: Duration) {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    println!(
        "{:<10} {:>12} moves {:>8.1} Mcalls/s {:>8.3?}",
        format!("{kind:?}"),
        moves,
        calls as f64 / secs / 1e6,
        elapsed
    );
}

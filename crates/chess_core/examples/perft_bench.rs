//! Perft driver for flamegraph runs.
//!
//!   cargo flamegraph --example perft_bench -p chess_core -- [depth] [fen]
//!
//! With a FEN the root moves are divided; otherwise a fixed set of
//! positions is counted.

use std::env;
use std::time::Instant;

use chess_core::{Position, perft, perft_divide};

const SUITE: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

fn main() {
    let mut args = env::args().skip(1);
    let depth: u8 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    match args.next() {
        Some(fen) => divide(&fen, depth),
        None => {
            let start = Instant::now();
            let mut total = 0;
            for fen in SUITE {
                let mut pos = Position::from_fen(fen).expect("bench FEN must parse");
                let nodes = perft(&mut pos, depth);
                println!("{nodes:>12}  {fen}");
                total += nodes;
            }
            summary(total, start);
        }
    }
}

fn divide(fen: &str, depth: u8) {
    let mut pos = match Position::from_fen(fen) {
        Ok(pos) => pos,
        Err(err) => {
            eprintln!("bad FEN: {err}");
            return;
        }
    };
    let start = Instant::now();
    let mut total = 0;
    for (mv, nodes) in perft_divide(&mut pos, depth) {
        println!("{mv}: {nodes}");
        total += nodes;
    }
    summary(total, start);
}

fn summary(nodes: u64, start: Instant) {
    let elapsed = start.elapsed();
    let nps = nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    println!("\n{nodes} nodes in {elapsed:.3?} ({nps:.0} nps)");
}

use crate::board::Position;
use crate::movegen::{GenType, MoveList, generate};
use crate::types::Move;

/// Pure perft node count.
/// Counts all legal positions from the current one down to `depth`.
pub fn perft(pos: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    generate(pos, GenType::All, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &mv in moves.iter() {
        pos.make_move(mv);
        nodes += perft(pos, depth - 1);
        pos.unmake_move(mv);
    }
    nodes
}

/// Per-root-move breakdown of [`perft`], in generation order.
pub fn perft_divide(pos: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    let mut moves = MoveList::new();
    generate(pos, GenType::All, &mut moves);
    moves
        .iter()
        .map(|&mv| {
            pos.make_move(mv);
            let nodes = perft(pos, depth.saturating_sub(1));
            pos.unmake_move(mv);
            (mv, nodes)
        })
        .collect()
}

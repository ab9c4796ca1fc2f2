use super::*;
use chess_core::{Move, SearchLimits, StopHandle};

fn report(id: usize, nodes: u64, completed: Option<(i32, i32)>) -> WorkerReport {
    WorkerReport {
        id,
        nodes,
        aborted: false,
        completed: completed.map(|(depth, score)| Iteration {
            depth,
            score,
            seldepth: depth as usize,
            pv: vec![Move::new(12, 28)],
        }),
    }
}

#[test]
fn test_deepest_worker_wins() {
    let reports = [report(0, 100, Some((5, 30))), report(1, 50, Some((6, -10)))];
    let (r, it) = pick_result(&reports).unwrap();
    assert_eq!(r.id, 1);
    assert_eq!(it.depth, 6);
}

#[test]
fn test_score_then_nodes_break_ties() {
    let reports = [report(0, 100, Some((6, 10))), report(1, 50, Some((6, 20)))];
    assert_eq!(pick_result(&reports).unwrap().0.id, 1);

    let reports = [report(0, 100, Some((6, 20))), report(1, 500, Some((6, 20)))];
    assert_eq!(pick_result(&reports).unwrap().0.id, 1);
}

#[test]
fn test_main_worker_keeps_exact_ties() {
    let reports = [report(0, 100, Some((6, 20))), report(1, 100, Some((6, 20)))];
    assert_eq!(pick_result(&reports).unwrap().0.id, 0);
}

#[test]
fn test_workers_without_iterations_are_ignored() {
    let reports = [report(0, 100, None), report(1, 10, Some((1, 0)))];
    assert_eq!(pick_result(&reports).unwrap().0.id, 1);
    assert!(pick_result(&[report(0, 1, None)]).is_none());
}

#[test]
fn test_stopped_before_first_iteration_plays_a_legal_move() {
    let pos = Position::startpos();
    let tt = TranspositionTable::new(1).unwrap();
    let limits = SearchLimits::infinite();
    let stop: StopHandle = limits.stop_handle();
    stop.stop();
    let tc = TimeControl::start(&limits, pos.side_to_move(), Duration::ZERO);
    let mut threads = vec![ThreadData::new(0, crate::eval::PstEvaluator::new())];

    let result = search(
        &mut threads,
        SearchJob {
            pos: &pos,
            tt: &tt,
            tc: &tc,
            max_depth: 10,
            infinite: true,
            info: None,
        },
    )
    .unwrap();

    assert_eq!(result.depth, 0);
    let mv = result.best_move.unwrap();
    assert!(legal_moves(&pos).contains(&mv));
}

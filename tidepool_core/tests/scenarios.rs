use tidepool_core::{
    Position, Puzzle, PuzzleLogic, PuzzleSolver, PuzzleState, Rejection, SolveOutcome,
    SolverConfig, TurnEvent, loader::parse_level, moves::PlayerMove,
};

fn solve(map: &str) -> SolveOutcome {
    PuzzleSolver::default().solve(&parse_level(map).unwrap())
}

fn positions_of(state: &PuzzleState) -> Vec<Position> {
    state.players.iter().map(|p| p.position).collect()
}

#[test]
fn adjacent_chest_is_one_step_away() {
    let solution = solve("CR CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 1);
}

#[test]
fn crab_walks_a_corridor_one_cell_per_turn() {
    let solution = solve("CR .. CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 2);
    assert_eq!(solution.steps.len(), 3);
}

#[test]
fn walled_corridor_has_no_solution() {
    assert_eq!(solve("CR WL CH"), SolveOutcome::Unsolvable);
}

#[test]
fn conveyor_carries_the_crab_past_its_destination() {
    let solution = solve("CR C> CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 1);

    let step = &solution.steps[1];
    assert_eq!(positions_of(&step.state), vec![Position::new(2, 0)]);
    assert!(matches!(
        step.events[..],
        [TurnEvent::Shift { from, .. }] if from == Position::new(1, 0)
    ));
}

#[test]
fn boxed_penguin_may_stay_while_the_other_moves() {
    // (0, 0) is boxed in by the wall on its right, (0, 1) is free.
    let level = parse_level("PG .. ..\nPG WL ..").unwrap();
    let mut puzzle = Puzzle::new(&level);
    let state = puzzle.snapshot();
    let successors = PuzzleLogic::new(&mut puzzle).next_states(&state);

    let moved: Vec<Vec<Position>> = successors.iter().map(|s| positions_of(&s.state)).collect();
    assert!(moved.contains(&vec![Position::new(0, 0), Position::new(1, 1)]));
}

#[test]
fn free_penguin_may_not_stay_behind() {
    // Bottom penguin is free, middle one boxed in, top one free.
    let level = parse_level("PG .. ..\nPG WL ..\nPG .. ..").unwrap();
    let mut puzzle = Puzzle::new(&level);
    let state = puzzle.snapshot();
    let successors = PuzzleLogic::new(&mut puzzle).next_states(&state);
    let moved: Vec<Vec<Position>> = successors.iter().map(|s| positions_of(&s.state)).collect();

    let bottom_stays = vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 2)];
    let both_move = vec![Position::new(1, 0), Position::new(0, 1), Position::new(1, 2)];
    assert!(!moved.contains(&bottom_stays));
    assert!(moved.contains(&both_move));
}

#[test]
fn button_lowers_the_spike_for_later_turns() {
    let solution = solve("CR BR SR+CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 2);
    assert_eq!(solution.steps[1].state.buttons, vec![true]);
    assert_eq!(positions_of(&solution.steps[1].state), vec![Position::new(1, 0)]);

    let mut puzzle = Puzzle::new(&parse_level("CR BR SR+CH").unwrap());
    assert_eq!(puzzle.is_spike_raised(Position::new(2, 0)), Some(true));
    puzzle.set_snapshot(&solution.steps[1].state);
    assert_eq!(puzzle.is_spike_raised(Position::new(2, 0)), Some(false));
}

#[test]
fn raised_spike_blocks_the_chest() {
    assert_eq!(solve("CR .. SR+CH"), SolveOutcome::Unsolvable);
    assert!(solve("CR .. Sr+CH").solution().is_some());
}

#[test]
fn plate_lowers_a_spike_only_while_occupied() {
    let level = parse_level("CR PB SB+CH").unwrap();
    let mut puzzle = Puzzle::new(&level);
    let spike = Position::new(2, 0);
    let right = PlayerMove::Walk {
        direction: Position::new(1, 0),
    };
    assert_eq!(puzzle.is_spike_raised(spike), Some(true));

    let start = puzzle.snapshot();
    let on_plate = PuzzleLogic::new(&mut puzzle)
        .try_move_players(&start, &[right])
        .unwrap();
    assert_eq!(puzzle.is_spike_raised(spike), Some(false));

    // Stepping off the plate raises the spike again in the same turn.
    assert_eq!(
        PuzzleLogic::new(&mut puzzle).try_move_players(&on_plate.state, &[right]),
        Err(Rejection::Spiked { position: spike })
    );
    assert_eq!(PuzzleSolver::default().solve(&level), SolveOutcome::Unsolvable);
}

#[test]
fn level_without_players_is_never_won() {
    let level = parse_level(".. CH").unwrap();
    assert!(!Puzzle::new(&level).is_won());
    assert_eq!(PuzzleSolver::default().solve(&level), SolveOutcome::Unsolvable);
}

#[test]
fn portal_pair_shortens_the_path() {
    let solution = solve("CR T1 .. .. .. T1 CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 2);
    assert!(matches!(
        solution.steps[1].events[..],
        [TurnEvent::Teleport { from, .. }] if from == Position::new(1, 0)
    ));
}

#[test]
fn ice_slides_the_crab_to_the_chest() {
    let solution = solve("CR IC IC IC CH").into_solution().unwrap();
    assert_eq!(solution.step_count(), 4);
    let sliding: Vec<_> = solution.steps[1..4]
        .iter()
        .map(|s| s.state.players[0].sliding)
        .collect();
    assert!(sliding.iter().all(|d| *d == Some(Position::new(1, 0))));
}

#[test]
fn small_budget_is_not_reported_as_unsolvable() {
    let level = parse_level(
        ".. .. .. .. ..\n\
         .. .. .. .. ..\n\
         CR .. .. .. CH",
    )
    .unwrap();
    let outcome = PuzzleSolver::new(SolverConfig { max_visited: 2 }).solve(&level);
    assert!(matches!(outcome, SolveOutcome::Exhausted { .. }));
    assert!(PuzzleSolver::default().solve(&level).solution().is_some());
}

// Grouping resolver - display numbering and group boundaries
//
// Pure functions over an ordered exercise slice. The session order is the
// single source of truth: members of one group are contiguous, and the
// human-facing display number is derived by a single left-to-right scan.
// Nothing here is persisted; every mutation recomputes from scratch.

use thiserror::Error;

use crate::model::{Exercise, GroupKind};

/// Precondition violations for group mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupingError {
    #[error("index {0} is out of bounds for {1} exercises")]
    OutOfBounds(usize, usize),

    #[error("exercise at index {0} is not in a group")]
    NotGrouped(usize),

    #[error("exercise at index {0} is in a superset; only circuits grow incrementally")]
    NotACircuit(usize),
}

/// Compute one display number per exercise.
///
/// The counter starts at 1 and increments once per ungrouped exercise and
/// once per group boundary, so all contiguous members of one group share a
/// number. O(n), and a pure function of the prefix: the number at index i
/// never depends on anything right of i.
pub fn compute_numbering(exercises: &[Exercise]) -> Vec<u32> {
    let mut numbers = Vec::with_capacity(exercises.len());
    let mut counter = 0u32;

    for (i, exercise) in exercises.iter().enumerate() {
        let starts_new_block = i == 0
            || exercise.group_id().is_none()
            || exercise.group_id() != exercises[i - 1].group_id();
        if starts_new_block {
            counter += 1;
        }
        numbers.push(counter);
    }

    numbers
}

/// True when index i opens a group run (or the sequence)
pub fn is_first_in_group(exercises: &[Exercise], i: usize) -> bool {
    i == 0 || exercises[i].group_id() != exercises[i - 1].group_id()
}

/// True when index i closes a group run (or the sequence)
pub fn is_last_in_group(exercises: &[Exercise], i: usize) -> bool {
    i + 1 == exercises.len() || exercises[i].group_id() != exercises[i + 1].group_id()
}

/// Insert `new_exercise` immediately after `after`, joining that circuit.
///
/// The inserted exercise takes over the group membership of the exercise at
/// `after`, which keeps the group contiguous by construction. Supersets are
/// created with a fixed size and rejected here; only circuits support
/// incremental growth.
pub fn append_to_circuit(
    exercises: &mut Vec<Exercise>,
    after: usize,
    mut new_exercise: Exercise,
) -> Result<(), GroupingError> {
    let len = exercises.len();
    let anchor = exercises
        .get(after)
        .ok_or(GroupingError::OutOfBounds(after, len))?;

    let group = anchor
        .group
        .clone()
        .ok_or(GroupingError::NotGrouped(after))?;
    if group.kind != GroupKind::Circuit {
        return Err(GroupingError::NotACircuit(after));
    }

    new_exercise.group = Some(group);
    exercises.insert(after + 1, new_exercise);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, GroupId, Metric};
    use crate::model::{Exercise, ExerciseId};

    /// Shorthand: `ex("A", None)` or `ex("B", Some(("g1", GroupKind::Circuit)))`
    fn ex(id: &str, group: Option<(&str, GroupKind)>) -> Exercise {
        Exercise {
            id: ExerciseId::new(id),
            name: id.to_string(),
            sets: 3,
            metric: Metric::Reps(8),
            weight: 0.0,
            group: group.map(|(gid, kind)| Group {
                kind,
                id: GroupId::new(gid),
            }),
        }
    }

    #[test]
    fn empty_sequence_gets_empty_numbering() {
        assert_eq!(compute_numbering(&[]), Vec::<u32>::new());
    }

    #[test]
    fn single_ungrouped_exercise_is_number_one() {
        assert_eq!(compute_numbering(&[ex("A", None)]), vec![1]);
    }

    #[test]
    fn group_members_share_one_number() {
        // [A(none), B(superset g1), C(superset g1), D(none)] -> [1, 2, 2, 3]
        let exercises = vec![
            ex("A", None),
            ex("B", Some(("g1", GroupKind::Superset))),
            ex("C", Some(("g1", GroupKind::Superset))),
            ex("D", None),
        ];
        assert_eq!(compute_numbering(&exercises), vec![1, 2, 2, 3]);
        assert!(is_first_in_group(&exercises, 1));
        assert!(!is_first_in_group(&exercises, 2));
        assert!(is_last_in_group(&exercises, 2));
        assert!(!is_last_in_group(&exercises, 1));
    }

    #[test]
    fn one_group_consumes_exactly_one_number() {
        for size in 1..=5 {
            let mut exercises = vec![ex("lead", None)];
            for i in 0..size {
                exercises.push(ex(
                    &format!("m{i}"),
                    Some(("g1", GroupKind::Circuit)),
                ));
            }
            exercises.push(ex("tail", None));

            let numbers = compute_numbering(&exercises);
            // every member shares the group's number
            for i in 1..=size {
                assert_eq!(numbers[i], 2, "size {size}, member {i}");
            }
            // and the group advanced the counter exactly once
            assert_eq!(*numbers.last().unwrap(), 3);
        }
    }

    #[test]
    fn adjacent_ungrouped_exercises_each_get_a_number() {
        let exercises = vec![ex("A", None), ex("B", None), ex("C", None)];
        assert_eq!(compute_numbering(&exercises), vec![1, 2, 3]);
    }

    #[test]
    fn numbering_is_prefix_stable() {
        let full = vec![
            ex("A", None),
            ex("B", Some(("g1", GroupKind::Superset))),
            ex("C", Some(("g1", GroupKind::Superset))),
            ex("D", None),
            ex("E", Some(("g2", GroupKind::Circuit))),
            ex("F", Some(("g2", GroupKind::Circuit))),
            ex("G", Some(("g2", GroupKind::Circuit))),
            ex("H", None),
        ];
        let numbers = compute_numbering(&full);

        for len in 0..=full.len() {
            assert_eq!(
                compute_numbering(&full[..len]),
                numbers[..len],
                "prefix of length {len} diverged"
            );
        }
    }

    #[test]
    fn distinct_back_to_back_groups_are_separate_blocks() {
        let exercises = vec![
            ex("A", Some(("g1", GroupKind::Circuit))),
            ex("B", Some(("g1", GroupKind::Circuit))),
            ex("C", Some(("g2", GroupKind::Circuit))),
        ];
        assert_eq!(compute_numbering(&exercises), vec![1, 1, 2]);
        assert!(is_last_in_group(&exercises, 1));
        assert!(is_first_in_group(&exercises, 2));
    }

    #[test]
    fn append_to_circuit_copies_membership_and_stays_contiguous() {
        let mut exercises = vec![
            ex("A", Some(("g1", GroupKind::Circuit))),
            ex("B", Some(("g1", GroupKind::Circuit))),
            ex("C", Some(("g1", GroupKind::Circuit))),
            ex("D", None),
        ];

        append_to_circuit(&mut exercises, 2, ex("X", None)).unwrap();

        assert_eq!(exercises[3].id.as_str(), "X");
        assert_eq!(
            exercises[3].group_id().map(GroupId::as_str),
            Some("g1")
        );
        // the inserted element shares its group with a neighbor on at
        // least one side, and the whole run is still contiguous
        assert_eq!(exercises[3].group_id(), exercises[2].group_id());
        assert_eq!(compute_numbering(&exercises), vec![1, 1, 1, 1, 2]);
    }

    #[test]
    fn append_at_last_element_of_trailing_circuit() {
        let mut exercises = vec![
            ex("A", None),
            ex("B", Some(("g1", GroupKind::Circuit))),
            ex("C", Some(("g1", GroupKind::Circuit))),
        ];

        append_to_circuit(&mut exercises, 2, ex("X", None)).unwrap();
        assert_eq!(compute_numbering(&exercises), vec![1, 2, 2, 2]);
        assert!(is_last_in_group(&exercises, 3));
    }

    #[test]
    fn append_to_ungrouped_exercise_is_rejected() {
        let mut exercises = vec![ex("A", None)];
        let err = append_to_circuit(&mut exercises, 0, ex("X", None)).unwrap_err();
        assert_eq!(err, GroupingError::NotGrouped(0));
        assert_eq!(exercises.len(), 1);
    }

    #[test]
    fn append_to_superset_is_rejected() {
        let mut exercises = vec![
            ex("A", Some(("g1", GroupKind::Superset))),
            ex("B", Some(("g1", GroupKind::Superset))),
        ];
        let err = append_to_circuit(&mut exercises, 0, ex("X", None)).unwrap_err();
        assert_eq!(err, GroupingError::NotACircuit(0));
    }

    #[test]
    fn append_out_of_bounds_is_rejected() {
        let mut exercises = vec![ex("A", None)];
        let err = append_to_circuit(&mut exercises, 5, ex("X", None)).unwrap_err();
        assert_eq!(err, GroupingError::OutOfBounds(5, 1));
    }

    #[test]
    fn removal_shrinks_group_without_renumbering_membership() {
        // removing one member leaves a size-1 group that still numbers
        // as a single block
        let mut exercises = vec![
            ex("A", Some(("g1", GroupKind::Superset))),
            ex("B", Some(("g1", GroupKind::Superset))),
            ex("C", None),
        ];
        exercises.remove(1);
        assert_eq!(compute_numbering(&exercises), vec![1, 2]);
        assert!(is_first_in_group(&exercises, 0));
        assert!(is_last_in_group(&exercises, 0));
    }
}

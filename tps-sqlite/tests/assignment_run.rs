use rstest::*;
use rstest_reuse::{self, *};
use std::any::Any;
use tps_core::{
    models::{
        Allocation, Applicant, AssignmentStatus, CapacityLedger, Outcome, PeriodId,
        PositionStatus, RunSummary, TeacherId,
    },
    ports::{Allocator, AssignmentRepository, PositionRepository, RunFailure},
};
use tps_solver::SerialDictatorship;
use tps_sqlite::Db;

mod common;
use common::all_backends;
use common::*;

/// An allocator that always gives up, to exercise rollback
struct Failing;

impl Allocator for Failing {
    type Error = std::fmt::Error;

    fn allocate(&self, _: Vec<Applicant>, _: CapacityLedger) -> Result<Allocation, Self::Error> {
        Err(std::fmt::Error)
    }
}

async fn outcomes(db: &Db, period_id: PeriodId) -> Vec<(TeacherId, Outcome)> {
    db.get_assignments(period_id)
        .await
        .unwrap()
        .into_iter()
        .map(|record| (record.teacher_id, record.outcome))
        .collect()
}

fn outcome_of(outcomes: &[(TeacherId, Outcome)], id: &str) -> Outcome {
    outcomes
        .iter()
        .find(|(teacher_id, _)| teacher_id.as_str() == id)
        .map(|(_, outcome)| *outcome)
        .unwrap()
}

#[apply(all_backends)]
async fn higher_score_wins_the_single_seat(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let a = teacher(&db, "10000000001", "Math", 90.0).await;
    let b = teacher(&db, "10000000002", "Math", 95.0).await;
    let x = position(&db, "X School", "Math", 1).await;
    prefer(&db, &a, period.id, &[x]).await;
    prefer(&db, &b, period.id, &[x]).await;

    let summary = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        summary,
        RunSummary {
            assigned_count: 1,
            unassigned_count: 1,
            total_teachers: 2,
        }
    );

    let records = db.get_assignments(period.id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].teacher_id, b);
    assert_eq!(records[0].outcome.status(), AssignmentStatus::Assigned);
    assert_eq!(records[0].outcome.position_id(), Some(x));
    assert_eq!(records[0].outcome.rank().map(|r| r.get()), Some(1));
    assert_eq!(records[0].assigned_at, Some(AFTER));
    assert_eq!(records[1].teacher_id, a);
    assert_eq!(records[1].outcome, Outcome::Unassigned);
    assert_eq!(records[1].assigned_at, None);
    assert_eq!(records[0].run_id, records[1].run_id);

    let history = db.run_history(period.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, records[0].run_id);
    assert_eq!(history[0].summary, summary);
    assert_eq!(history[0].started_at, AFTER);
}

#[apply(all_backends)]
async fn runs_are_refused_until_the_period_ends(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let a = teacher(&db, "10000000001", "Math", 90.0).await;
    let x = position(&db, "X School", "Math", 1).await;
    prefer(&db, &a, period.id, &[x]).await;

    let failure = db
        .run_assignment(period.id, DURING, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(failure, RunFailure::PeriodNotEnded { end: CLOSES });

    // the end instant itself is already past the window
    assert!(
        db.run_assignment(period.id, CLOSES, &SerialDictatorship)
            .await
            .unwrap()
            .is_ok()
    );

    let failure = db
        .run_assignment(PeriodId(404), AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(failure, RunFailure::PeriodNotFound(PeriodId(404)));
    assert_eq!(db.run_history(period.id).await.unwrap().len(), 1);
}

#[apply(all_backends)]
async fn empty_period_writes_nothing(#[case] backend: impl Future<Output = (Db, Box<dyn Any>)>) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    position(&db, "X School", "Math", 1).await;
    teacher(&db, "10000000001", "Math", 90.0).await;

    let summary = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary, RunSummary::default());
    assert!(db.get_assignments(period.id).await.unwrap().is_empty());
    assert!(db.run_history(period.id).await.unwrap().is_empty());
}

#[apply(all_backends)]
async fn rerunning_with_the_same_inputs_changes_nothing(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 1).await;
    let y = position(&db, "Y School", "Math", 2).await;
    let art = position(&db, "Z School", "Art", 1).await;
    let teachers = [
        (teacher(&db, "10000000001", "Math", 70.0).await, vec![x, y]),
        (teacher(&db, "10000000002", "Math", 80.0).await, vec![x, y]),
        (teacher(&db, "10000000003", "Math", 80.0).await, vec![x, y]),
        (teacher(&db, "10000000004", "Math", 60.0).await, vec![y, x]),
        (teacher(&db, "10000000005", "Art", 50.0).await, vec![art]),
    ];
    for (id, list) in teachers.iter() {
        prefer(&db, id, period.id, list).await;
    }

    let first = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    let before = outcomes(&db, period.id).await;
    let second = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    let after = outcomes(&db, period.id).await;

    assert_eq!(first, second);
    assert_eq!(before, after);
    assert_eq!(first.total_teachers, 5);
    assert_eq!(first.assigned_count, 4);
    assert_eq!(outcome_of(&after, "10000000002").position_id(), Some(x));
    assert_eq!(outcome_of(&after, "10000000004"), Outcome::Unassigned);
    assert_eq!(db.run_history(period.id).await.unwrap().len(), 2);
}

#[apply(all_backends)]
async fn rerun_is_a_full_recompute(#[case] backend: impl Future<Output = (Db, Box<dyn Any>)>) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 1).await;
    let y = position(&db, "Y School", "Math", 1).await;
    let a = teacher(&db, "10000000001", "Math", 90.0).await;
    prefer(&db, &a, period.id, &[x, y]).await;

    db.run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        outcome_of(&outcomes(&db, period.id).await, "10000000001").position_id(),
        Some(x)
    );

    // a newcomer outranks the earlier winner for the shared seat
    let c = teacher(&db, "10000000003", "Math", 99.0).await;
    prefer(&db, &c, period.id, &[x]).await;

    let summary = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.assigned_count, 2);

    let after = outcomes(&db, period.id).await;
    assert_eq!(outcome_of(&after, "10000000003").position_id(), Some(x));
    assert_eq!(outcome_of(&after, "10000000001").position_id(), Some(y));
    assert_eq!(outcome_of(&after, "10000000001").rank().map(|r| r.get()), Some(2));
}

#[apply(all_backends)]
async fn seats_held_outside_the_roster_are_respected(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 1).await;
    let a = teacher(&db, "10000000001", "Math", 50.0).await;
    prefer(&db, &a, period.id, &[x]).await;
    db.run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();

    // a withdraws; their seat stays taken
    prefer(&db, &a, period.id, &[]).await;
    let b = teacher(&db, "10000000002", "Math", 99.0).await;
    prefer(&db, &b, period.id, &[x]).await;

    let summary = db
        .run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_teachers, 1);
    assert_eq!(summary.unassigned_count, 1);

    let after = outcomes(&db, period.id).await;
    assert_eq!(outcome_of(&after, "10000000001").position_id(), Some(x));
    assert_eq!(outcome_of(&after, "10000000002"), Outcome::Unassigned);
}

#[apply(all_backends)]
async fn deactivated_positions_are_skipped(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 1).await;
    let y = position(&db, "Y School", "Math", 1).await;
    let a = teacher(&db, "10000000001", "Math", 90.0).await;
    prefer(&db, &a, period.id, &[x, y]).await;

    db.set_position_status(x, PositionStatus::Inactive)
        .await
        .unwrap()
        .unwrap();

    db.run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    let after = outcomes(&db, period.id).await;
    assert_eq!(outcome_of(&after, "10000000001").position_id(), Some(y));
}

#[apply(all_backends)]
async fn failed_allocation_rolls_everything_back(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 1).await;
    let a = teacher(&db, "10000000001", "Math", 90.0).await;
    prefer(&db, &a, period.id, &[x]).await;
    db.run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    let before = db.get_assignments(period.id).await.unwrap();

    let b = teacher(&db, "10000000002", "Math", 99.0).await;
    prefer(&db, &b, period.id, &[x]).await;
    let failure = db
        .run_assignment(period.id, AFTER, &Failing)
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(failure, RunFailure::Allocator(std::fmt::Error));
    assert_eq!(db.get_assignments(period.id).await.unwrap(), before);
    assert_eq!(db.run_history(period.id).await.unwrap().len(), 1);
}

#[apply(all_backends)]
async fn concurrent_runs_serialize(#[case] backend: impl Future<Output = (Db, Box<dyn Any>)>) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let x = position(&db, "X School", "Math", 2).await;
    for i in 1..=5 {
        let id = teacher(&db, &format!("100000000{i:02}"), "Math", 50.0 + i as f64).await;
        prefer(&db, &id, period.id, &[x]).await;
    }

    let (first, second) = tokio::join!(
        db.run_assignment(period.id, AFTER, &SerialDictatorship),
        db.run_assignment(period.id, AFTER, &SerialDictatorship),
    );
    assert_eq!(first.unwrap().unwrap(), second.unwrap().unwrap());

    let report = db.assignment_report(period.id).await.unwrap();
    assert_eq!(report.summary.total_assigned, 2);
    assert_eq!(report.positions[0].filled_count, 2);
    assert_eq!(db.run_history(period.id).await.unwrap().len(), 2);
}

#[apply(all_backends)]
async fn report_lists_winners_losers_and_fill(
    #[case] backend: impl Future<Output = (Db, Box<dyn Any>)>,
) {
    let (db, _guard) = backend.await;
    let period = period(&db).await;
    let big = position(&db, "Bravo School", "Math", 2).await;
    let small = position(&db, "Alpha School", "Math", 1).await;
    let idle = position(&db, "Charlie School", "Art", 3).await;
    let retired = position(&db, "Delta School", "Math", 1).await;
    db.set_position_status(retired, PositionStatus::Inactive)
        .await
        .unwrap()
        .unwrap();

    let a = teacher(&db, "10000000001", "Math", 91.0).await;
    let b = teacher(&db, "10000000002", "Math", 82.0).await;
    let c = teacher(&db, "10000000003", "Math", 73.0).await;
    let d = teacher(&db, "10000000004", "Math", 64.0).await;
    prefer(&db, &a, period.id, &[small, big]).await;
    prefer(&db, &b, period.id, &[small, big]).await;
    prefer(&db, &c, period.id, &[big]).await;
    prefer(&db, &d, period.id, &[small, big]).await;

    db.run_assignment(period.id, AFTER, &SerialDictatorship)
        .await
        .unwrap()
        .unwrap();
    let report = db.assignment_report(period.id).await.unwrap();

    let assigned: Vec<(&str, u32)> = report
        .assigned
        .iter()
        .map(|row| (row.teacher_id.as_str(), row.rank.get()))
        .collect();
    assert_eq!(
        assigned,
        vec![("10000000001", 1), ("10000000002", 2), ("10000000003", 1)]
    );
    assert_eq!(report.assigned[0].school_name, "Alpha School");
    assert_eq!(report.assigned[0].first_name, "First01");

    assert_eq!(report.unassigned.len(), 1);
    assert_eq!(report.unassigned[0].teacher_id, d);

    let fill: Vec<_> = report
        .positions
        .iter()
        .map(|p| (p.position_id, p.filled_count, p.quota))
        .collect();
    assert_eq!(fill, vec![(small, 1, 1), (big, 2, 2), (idle, 0, 3)]);

    assert_eq!(report.summary.total_assigned, 3);
    assert_eq!(report.summary.total_unassigned, 1);
    assert_eq!(report.summary.total_positions, 3);
    assert_eq!(report.summary.filled_positions, 2);
}

use clap::Parser as _;
use rstest::*;
use time::{OffsetDateTime, macros::datetime};
use tps_core::{
    models::{PeriodId, PeriodStatus, TeacherId},
    ports::{
        PeriodRepository, PositionRepository, PreferenceFailure, RunFailure, TeacherRepository,
    },
};
use tps_sqlite::{Db, config::SqliteConfig};
use tpsctl::{
    BaseArgs, CliError,
    commands::{
        Commands, PeriodCommand, PrefsCommand,
        import::{ImportSummary, import},
        period, prefs, run,
    },
    roster::{Roster, RosterError},
};

const DURING: OffsetDateTime = datetime!(2025-06-10 12:00 UTC);
const AFTER: OffsetDateTime = datetime!(2025-06-20 08:00 UTC);

fn teacher(id: &str, branch: &str, points: f64) -> serde_json::Value {
    serde_json::json!({
        "national_id": id,
        "first_name": format!("First{}", &id[9..]),
        "last_name": format!("Last{}", &id[9..]),
        "branch": branch,
        "placement_points": points
    })
}

fn position(key: &str, school: &str, branch: &str) -> serde_json::Value {
    serde_json::json!({
        "key": key,
        "school_name": school,
        "district": "Central",
        "branch": branch,
        "quota": 1
    })
}

fn prefer(id: &str, positions: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "national_id": id,
        "period": "summer",
        "positions": positions
    })
}

fn roster(preferences: Vec<serde_json::Value>) -> Roster {
    serde_json::from_value(serde_json::json!({
        "teachers": [
            teacher("10000000001", "Math", 90.0),
            teacher("10000000002", "Math", 80.0),
            teacher("10000000003", "Math", 70.0),
            teacher("10000000004", "Physics", 95.0),
        ],
        "positions": [
            position("a-math", "Atatürk Lisesi", "Math"),
            position("b-math", "Bahçelievler Lisesi", "Math"),
            position("a-phys", "Atatürk Lisesi", "Physics"),
        ],
        "periods": [
            {
                "key": "summer",
                "start": "2025-06-01T09:00:00Z",
                "end": "2025-06-15T17:00:00Z"
            }
        ],
        "preferences": preferences
    }))
    .unwrap()
}

fn tid(id: &str) -> TeacherId {
    id.parse().unwrap()
}

#[fixture]
async fn seeded() -> (Db, ImportSummary) {
    let db = Db::open(&SqliteConfig::default()).await.unwrap();
    let summary = import(
        &db,
        roster(vec![
            prefer("10000000001", &["a-math", "b-math"]),
            prefer("10000000002", &["a-math", "b-math"]),
            prefer("10000000003", &["a-math"]),
            prefer("10000000004", &["a-phys"]),
        ]),
        DURING,
    )
    .await
    .unwrap();
    (db, summary)
}

fn summer(summary: &ImportSummary) -> PeriodId {
    summary.periods["summer"]
}

#[rstest]
#[tokio::test]
async fn test_import_reports_assigned_ids(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    assert_eq!(summary.teachers, 4);
    assert_eq!(summary.positions.len(), 3);
    assert_eq!(summary.preferences, 4);

    let stats = prefs::stats(&db, summer(&summary)).await.unwrap();
    assert_eq!(stats.teachers_with_preferences, 4);
    assert_eq!(stats.total_preferences, 6);

    let listed = prefs::show(&db, &tid("10000000001"), summer(&summary))
        .await
        .unwrap();
    let ids = listed.iter().map(|p| p.position_id).collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![summary.positions["a-math"], summary.positions["b-math"]]
    );
}

#[rstest]
#[tokio::test]
async fn test_refused_roster_writes_nothing() {
    let db = Db::open(&SqliteConfig::default()).await.unwrap();

    // the Physics teacher ranks a Math position
    for _ in 0..2 {
        let error = import(&db, roster(vec![prefer("10000000004", &["a-math"])]), DURING)
            .await
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::Roster(RosterError::BranchMismatch { .. }))
        ));
    }

    assert_eq!(db.get_teacher(&tid("10000000004")).await.unwrap(), None);
    assert!(db.positions_for_branch("Math").await.unwrap().is_empty());
    assert!(db.positions_for_branch("Physics").await.unwrap().is_empty());
    assert_eq!(db.active_period(DURING).await.unwrap(), None);
    assert_eq!(db.get_period(PeriodId(1), DURING).await.unwrap(), None);
}

fn follow_up(preferences: Vec<serde_json::Value>) -> Roster {
    serde_json::from_value(serde_json::json!({
        "positions": [position("c-math", "Cumhuriyet Lisesi", "Math")],
        "periods": [
            {
                "key": "summer",
                "start": "2026-06-01T09:00:00Z",
                "end": "2026-06-15T17:00:00Z"
            }
        ],
        "preferences": preferences
    }))
    .unwrap()
}

#[rstest]
#[tokio::test]
async fn test_stored_teachers_are_checked(#[future] seeded: (Db, ImportSummary)) {
    let (db, _) = seeded.await;

    let refused = import(&db, follow_up(vec![prefer("10000000004", &["c-math"])]), DURING)
        .await
        .unwrap_err();
    assert!(matches!(
        refused.downcast_ref::<CliError>(),
        Some(CliError::Roster(RosterError::BranchMismatch { .. }))
    ));
    assert_eq!(db.positions_for_branch("Math").await.unwrap().len(), 2);

    let unknown = import(&db, follow_up(vec![prefer("19999999999", &["c-math"])]), DURING)
        .await
        .unwrap_err();
    assert!(matches!(
        unknown.downcast_ref::<CliError>(),
        Some(CliError::Roster(RosterError::UnknownTeacher(_)))
    ));
    assert_eq!(db.positions_for_branch("Math").await.unwrap().len(), 2);

    let accepted = import(&db, follow_up(vec![prefer("10000000001", &["c-math"])]), DURING)
        .await
        .unwrap();
    assert_eq!(accepted.teachers, 0);
    assert_eq!(accepted.preferences, 1);
    let listed = prefs::show(&db, &tid("10000000001"), accepted.periods["summer"])
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].position_id, accepted.positions["c-math"]);
}

#[rstest]
#[tokio::test]
async fn test_period_view(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;

    let open = period::show(&db, summer(&summary), DURING).await.unwrap();
    assert!(open.editable);
    assert!(!open.ended);

    let closed = period::show(&db, summer(&summary), AFTER).await.unwrap();
    assert!(!closed.editable);
    assert!(closed.ended);

    let missing = period::show(&db, PeriodId(999), DURING).await.unwrap_err();
    assert!(matches!(
        missing.downcast_ref::<CliError>(),
        Some(CliError::PeriodNotFound(PeriodId(999)))
    ));
}

#[rstest]
#[tokio::test]
async fn test_prefs_set_only_while_open(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    let teacher = tid("10000000003");
    let b_math = summary.positions["b-math"];

    let stored = prefs::set(&db, &teacher, summer(&summary), vec![b_math], DURING)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].position_id, b_math);
    assert_eq!(stored[0].rank.get(), 1);

    let late = prefs::set(&db, &teacher, summer(&summary), vec![], AFTER)
        .await
        .unwrap_err();
    assert!(matches!(
        late.downcast_ref::<CliError>(),
        Some(CliError::PeriodNotEditable { .. })
    ));

    // the refused edit left the list alone
    let listed = prefs::show(&db, &teacher, summer(&summary)).await.unwrap();
    assert_eq!(listed, stored);
}

#[rstest]
#[tokio::test]
async fn test_prefs_set_checks_branch(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    let error = prefs::set(
        &db,
        &tid("10000000001"),
        summer(&summary),
        vec![summary.positions["a-phys"]],
        DURING,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<CliError>(),
        Some(CliError::Preferences(
            PreferenceFailure::BranchMismatch { .. }
        ))
    ));
}

#[rstest]
#[tokio::test]
async fn test_positions_for_teacher(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    let positions = prefs::positions(&db, &tid("10000000002")).await.unwrap();
    let mut ids = positions.iter().map(|p| p.id).collect::<Vec<_>>();
    ids.sort();
    assert_eq!(
        ids,
        vec![summary.positions["a-math"], summary.positions["b-math"]]
    );

    let unknown = prefs::positions(&db, &tid("19999999999"))
        .await
        .unwrap_err();
    assert!(matches!(
        unknown.downcast_ref::<CliError>(),
        Some(CliError::TeacherNotFound(_))
    ));
}

#[rstest]
#[tokio::test]
async fn test_run_waits_for_the_period_to_end(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    let error = run::run(&db, summer(&summary), DURING).await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<CliError>(),
        Some(CliError::Run(RunFailure::PeriodNotEnded { .. }))
    ));
    assert!(
        run::history(&db, summer(&summary), DURING)
            .await
            .unwrap()
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn test_run_and_report(#[future] seeded: (Db, ImportSummary)) {
    let (db, summary) = seeded.await;
    let period_id = summer(&summary);

    let outcome = run::run(&db, period_id, AFTER).await.unwrap();
    assert_eq!(outcome.total_teachers, 4);
    assert_eq!(outcome.assigned_count, 3);
    assert_eq!(outcome.unassigned_count, 1);

    let report = run::report(&db, period_id, AFTER).await.unwrap();
    assert_eq!(report.summary.total_assigned, 3);
    assert_eq!(report.summary.total_unassigned, 1);
    assert_eq!(report.summary.total_positions, 3);
    assert_eq!(report.summary.filled_positions, 3);
    assert_eq!(report.unassigned[0].teacher_id, tid("10000000003"));

    let won = |id: &str| {
        report
            .assigned
            .iter()
            .find(|row| row.teacher_id == tid(id))
            .map(|row| row.position_id)
    };
    assert_eq!(won("10000000001"), Some(summary.positions["a-math"]));
    assert_eq!(won("10000000002"), Some(summary.positions["b-math"]));
    assert_eq!(won("10000000004"), Some(summary.positions["a-phys"]));

    let rows = run::assignments(&db, period_id, AFTER).await.unwrap();
    assert_eq!(rows.len(), 4);

    let history = run::history(&db, period_id, AFTER).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].summary, outcome);
}

#[rstest]
#[tokio::test]
async fn test_report_of_missing_period() {
    let db = Db::open(&SqliteConfig::default()).await.unwrap();
    let error = run::report(&db, PeriodId(7), AFTER).await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<CliError>(),
        Some(CliError::PeriodNotFound(PeriodId(7)))
    ));
}

#[test]
fn test_parse_prefs_set() {
    let args = BaseArgs::try_parse_from([
        "tpsctl",
        "--as-of",
        "2025-06-10T12:00:00Z",
        "prefs",
        "set",
        "10000000001",
        "1",
        "3",
        "2",
    ])
    .unwrap();
    assert_eq!(args.as_of, Some(DURING));
    match args.command {
        Commands::Prefs {
            command:
                PrefsCommand::Set {
                    teacher,
                    period,
                    positions,
                },
        } => {
            assert_eq!(teacher, tid("10000000001"));
            assert_eq!(period, PeriodId(1));
            assert_eq!(positions.iter().map(|p| p.0).collect::<Vec<_>>(), [3, 2]);
        }
        _ => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_parse_rejects_bad_national_id() {
    assert!(BaseArgs::try_parse_from(["tpsctl", "prefs", "positions", "123"]).is_err());
}

#[rstest]
#[case::upcoming("upcoming", Some(PeriodStatus::Upcoming))]
#[case::active("active", Some(PeriodStatus::Active))]
#[case::completed("completed", Some(PeriodStatus::Completed))]
#[case::closed("closed", None)]
fn test_parse_period_status(#[case] label: &str, #[case] expected: Option<PeriodStatus>) {
    let parsed = BaseArgs::try_parse_from(["tpsctl", "period", "set-status", "1", label]);
    match (parsed, expected) {
        (
            Ok(BaseArgs {
                command:
                    Commands::Period {
                        command: PeriodCommand::SetStatus { status, .. },
                    },
                ..
            }),
            Some(expected),
        ) => assert_eq!(status, expected),
        (Err(_), None) => {}
        _ => panic!("unexpected parse of {label:?}"),
    }
}

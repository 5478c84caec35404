#![allow(dead_code, unused_macros)]

use rstest_reuse::template;
use std::{any::Any, num::NonZeroU32};
use time::{OffsetDateTime, macros::datetime};
use tps_core::{
    models::{
        Period, PeriodData, PeriodId, Points, PositionData, PositionId, PreferenceList,
        TeacherId, TeacherRecord,
    },
    ports::{PeriodRepository, PositionRepository, PreferenceRepository, TeacherRepository},
};
use tps_sqlite::{Db, config::SqliteConfig};

pub async fn memory_backend() -> (Db, Box<dyn Any>) {
    let db = Db::open(&SqliteConfig::default())
        .await
        .expect("could not open in-memory db");
    (db, Box::new(()))
}

pub async fn file_backend() -> (Db, Box<dyn Any>) {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let config = SqliteConfig {
        database_path: Some(dir.path().join("placement.db")),
        ..Default::default()
    };
    let db = Db::open(&config).await.expect("could not open file db");
    // the directory must outlive the database
    (db, Box::new(dir))
}

// This creates a testing "template" to allow for the injection of each backend
// configuration

#[template]
#[rstest]
#[case::memory(memory_backend())]
#[case::file(file_backend())]
#[test_log::test(tokio::test)]
pub async fn all_backends(#[case] backend: impl Future<Output = (Db, Box<dyn Any>)>) -> () {}

/// The window every fixture period uses
pub const OPENS: OffsetDateTime = datetime!(2025-06-01 09:00 UTC);
pub const CLOSES: OffsetDateTime = datetime!(2025-06-15 17:00 UTC);
pub const DURING: OffsetDateTime = datetime!(2025-06-10 12:00 UTC);
pub const AFTER: OffsetDateTime = datetime!(2025-06-20 08:00 UTC);

pub fn tid(id: &str) -> TeacherId {
    id.parse().unwrap()
}

pub async fn teacher(db: &Db, id: &str, branch: &str, points: f64) -> TeacherId {
    let record = TeacherRecord {
        id: tid(id),
        first_name: format!("First{}", &id[9..]),
        last_name: format!("Last{}", &id[9..]),
        branch: branch.into(),
        placement_points: Points::new(points).unwrap(),
        current_assignment: None,
    };
    db.upsert_teacher(record).await.unwrap();
    tid(id)
}

pub async fn position(db: &Db, school: &str, branch: &str, quota: u32) -> PositionId {
    db.create_position(PositionData {
        school_name: school.into(),
        district: "Central".into(),
        branch: branch.into(),
        quota: NonZeroU32::new(quota).unwrap(),
    })
    .await
    .unwrap()
    .id
}

pub async fn period(db: &Db) -> Period {
    db.create_period(PeriodData::new(OPENS, CLOSES).unwrap(), DURING)
        .await
        .unwrap()
}

pub async fn prefer(db: &Db, teacher: &TeacherId, period: PeriodId, positions: &[PositionId]) {
    let list = PreferenceList::from_ordered(positions.iter().copied()).unwrap();
    db.replace_preferences(teacher, period, list)
        .await
        .unwrap()
        .unwrap();
}

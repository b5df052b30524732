use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use super::{classes, courses};
use crate::{error::StoreError, timetable::CourseScheduleMap};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub courses: usize,
    pub courses_created: usize,
    pub removed: u64,
    pub inserted: u64,
}

/// Replace all sync-derived classes with `schedule` in one transaction.
///
/// Manual classes are never touched and courses are only ever added. If any
/// statement fails the transaction is dropped, which rolls it back, and the
/// previous derived classes stay in place.
#[instrument(level = "info", skip_all, fields(courses = schedule.len()))]
pub async fn replace_derived_classes(
    pool: &SqlitePool,
    schedule: &CourseScheduleMap,
) -> Result<ReconcileSummary, StoreError> {
    let mut tx = pool.begin().await?;

    let mut summary = ReconcileSummary {
        courses: schedule.len(),
        removed: classes::delete_derived(&mut *tx).await?,
        ..Default::default()
    };

    for (name, slots) in schedule {
        let (course, created) = courses::find_or_create(&mut *tx, name).await?;
        if created {
            debug!(course = %name, id = course.id, "created course");
            summary.courses_created += 1;
        }
        for slot in slots {
            classes::insert_derived(&mut *tx, course.id, slot).await?;
            summary.inserted += 1;
        }
    }

    tx.commit().await?;
    info!(
        removed = summary.removed,
        inserted = summary.inserted,
        created = summary.courses_created,
        "reconciled derived classes"
    );
    Ok(summary)
}

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::{error::StoreError, timetable::ClassSlot};

/// A persisted weekly class of a course.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CourseClass {
    pub id: i64,
    pub course_id: i64,
    pub venue: String,
    pub time: String,
    pub day: i64,
    /// Entered by an operator; never touched by a sync run.
    pub is_manual: bool,
}

const COLUMNS: &str = "id, course_id, venue, time, day, is_manual";

/// Record an operator-entered class. Sync runs leave these rows alone.
pub async fn create_manual(
    pool: &SqlitePool,
    course_id: i64,
    slot: &ClassSlot,
) -> Result<CourseClass, StoreError> {
    let class = sqlx::query_as(&format!(
        "INSERT INTO course_classes (course_id, venue, time, day, is_manual)
         VALUES (?, ?, ?, ?, 1)
         RETURNING {COLUMNS}"
    ))
    .bind(course_id)
    .bind(&slot.venue)
    .bind(&slot.time)
    .bind(i64::from(slot.day))
    .fetch_one(pool)
    .await?;
    Ok(class)
}

pub(crate) async fn insert_derived(
    conn: &mut SqliteConnection,
    course_id: i64,
    slot: &ClassSlot,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO course_classes (course_id, venue, time, day, is_manual)
         VALUES (?, ?, ?, ?, 0)",
    )
    .bind(course_id)
    .bind(&slot.venue)
    .bind(&slot.time)
    .bind(i64::from(slot.day))
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove every class produced by a previous sync. Returns the number removed.
pub(crate) async fn delete_derived(conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM course_classes WHERE is_manual = 0")
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_for_course(
    pool: &SqlitePool,
    course_id: i64,
) -> Result<Vec<CourseClass>, StoreError> {
    let classes = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM course_classes WHERE course_id = ? ORDER BY day, time, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(classes)
}

pub async fn list_derived(pool: &SqlitePool) -> Result<Vec<CourseClass>, StoreError> {
    list_where(pool, false).await
}

pub async fn list_manual(pool: &SqlitePool) -> Result<Vec<CourseClass>, StoreError> {
    list_where(pool, true).await
}

async fn list_where(pool: &SqlitePool, manual: bool) -> Result<Vec<CourseClass>, StoreError> {
    let classes = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM course_classes WHERE is_manual = ? ORDER BY course_id, day, time, id"
    ))
    .bind(manual)
    .fetch_all(pool)
    .await?;
    Ok(classes)
}

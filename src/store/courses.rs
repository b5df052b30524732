use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Course>, StoreError> {
    let courses = sqlx::query_as("SELECT id, name FROM courses ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(courses)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Course>, StoreError> {
    let course = sqlx::query_as("SELECT id, name FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(course)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Course>, StoreError> {
    let course = sqlx::query_as("SELECT id, name FROM courses WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(course)
}

pub async fn create(pool: &SqlitePool, name: &str) -> Result<Course, StoreError> {
    let course = sqlx::query_as("INSERT INTO courses (name) VALUES (?) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(course)
}

/// Rename a course. Fails with [`StoreError::CourseNotFound`] for an unknown id.
pub async fn update(pool: &SqlitePool, id: i64, name: &str) -> Result<Course, StoreError> {
    let mut tx = pool.begin().await?;

    let course: Option<Course> =
        sqlx::query_as("UPDATE courses SET name = ? WHERE id = ? RETURNING id, name")
            .bind(name)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let course = course.ok_or(StoreError::CourseNotFound(id))?;

    tx.commit().await?;
    Ok(course)
}

/// Delete a course together with all of its classes, manual ones included.
/// Returns whether a course was removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Look a course up by exact name, inserting it when absent.
/// The flag is `true` when the course was created by this call.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(Course, bool), StoreError> {
    let inserted = sqlx::query("INSERT INTO courses (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let course = sqlx::query_as("SELECT id, name FROM courses WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok((course, inserted > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{classes, test_pool};
    use crate::timetable::ClassSlot;

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let pool = test_pool().await;

        let cs = create(&pool, "CS101").await.unwrap();
        let ma = create(&pool, "MA201").await.unwrap();
        assert_ne!(cs.id, ma.id);

        assert_eq!(find_by_id(&pool, cs.id).await.unwrap(), Some(cs.clone()));
        assert_eq!(find_by_name(&pool, "MA201").await.unwrap(), Some(ma.clone()));
        assert_eq!(find_by_name(&pool, "nope").await.unwrap(), None);

        let renamed = update(&pool, cs.id, "CS102").await.unwrap();
        assert_eq!(renamed.name, "CS102");
        assert_eq!(
            list(&pool).await.unwrap().iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["CS102", "MA201"]
        );

        assert!(delete(&pool, ma.id).await.unwrap());
        assert!(!delete(&pool, ma.id).await.unwrap());
        assert_eq!(find_by_id(&pool, ma.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = test_pool().await;
        create(&pool, "CS101").await.unwrap();
        assert!(matches!(
            create(&pool, "CS101").await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_course() {
        let pool = test_pool().await;
        let err = update(&pool, 42, "Ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::CourseNotFound(42)));
    }

    #[tokio::test]
    async fn test_find_or_create() {
        let pool = test_pool().await;
        let existing = create(&pool, "CS101").await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let (found, created) = find_or_create(&mut conn, "CS101").await.unwrap();
        assert_eq!(found, existing);
        assert!(!created);

        let (fresh, created) = find_or_create(&mut conn, "EE210").await.unwrap();
        assert_eq!(fresh.name, "EE210");
        assert!(created);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_classes() {
        let pool = test_pool().await;
        let course = create(&pool, "CS101").await.unwrap();
        let slot = ClassSlot {
            venue: "Room A".to_string(),
            time: "09:00-09:55".to_string(),
            day: 0,
        };
        classes::create_manual(&pool, course.id, &slot).await.unwrap();

        delete(&pool, course.id).await.unwrap();
        assert!(classes::list_manual(&pool).await.unwrap().is_empty());
    }
}

//! Storage and service functions for rider entries.
//!
//! All functions take a plain `SqliteConnection` so they can run inside
//! `DbConn::run` in request handlers and directly against
//! [`setup_test_db`](crate::orm::testing::setup_test_db) in tests.

use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;

use crate::error::ApiError;
use crate::models::{Entry, EntryFilter, EntrySubmission, NewEntry};
use crate::schema::entries;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a validated entry and returns its new id.
pub fn insert_entry(
    conn: &mut SqliteConnection,
    new_entry: &NewEntry,
) -> Result<i32, diesel::result::Error> {
    diesel::insert_into(entries::table)
        .values(new_entry)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    i32::try_from(last_id).map_err(|e| diesel::result::Error::DeserializationError(Box::new(e)))
}

/// Validates a rider submission and persists it.
///
/// # Returns
/// * `Ok(i32)` - Id of the stored entry
/// * `Err(ApiError::Validation)` - `date` or `riderName` missing, or a bad `tripCount`
/// * `Err(ApiError::Storage)` - The insert failed
pub fn submit_entry(
    conn: &mut SqliteConnection,
    submission: EntrySubmission,
) -> Result<i32, ApiError> {
    let new_entry = submission.validate(Utc::now().naive_utc())?;
    Ok(insert_entry(conn, &new_entry)?)
}

/// Escapes LIKE wildcards so the term only ever matches literally.
fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Builds the parameterized query for a filter, newest first.
fn filtered_query(filter: &EntryFilter) -> entries::BoxedQuery<'static, Sqlite> {
    let mut query = entries::table.into_boxed();

    if let Some(start) = &filter.start_date {
        query = query.filter(entries::date.ge(start.clone()));
    }
    if let Some(end) = &filter.end_date {
        query = query.filter(entries::date.le(end.clone()));
    }
    if let Some(rider) = &filter.rider {
        query = query.filter(entries::rider_name.like(like_contains(rider)).escape('\\'));
    }

    query.order((
        entries::date.desc(),
        entries::created_at.desc(),
        entries::id.desc(),
    ))
}

/// Lists entries matching every predicate in `filter`, ordered by date
/// (newest first) and then by creation time (newest first).
pub fn list_entries(
    conn: &mut SqliteConnection,
    filter: &EntryFilter,
) -> Result<Vec<Entry>, diesel::result::Error> {
    filtered_query(filter).load::<Entry>(conn)
}

/// Returns every distinct rider name in ascending order.
pub fn list_rider_names(conn: &mut SqliteConnection) -> Result<Vec<String>, diesel::result::Error> {
    entries::table
        .select(entries::rider_name)
        .distinct()
        .order(entries::rider_name.asc())
        .load::<String>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;
    use chrono::{NaiveDateTime, TimeDelta};

    fn base_time() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn add(conn: &mut SqliteConnection, date: &str, rider: &str, minutes: i64) -> i32 {
        let new_entry = NewEntry {
            date: date.to_string(),
            rider_name: rider.to_string(),
            trip_count: 1,
            incidents: String::new(),
            created_at: base_time() + TimeDelta::minutes(minutes),
        };
        insert_entry(conn, &new_entry).expect("insert entry")
    }

    fn add_entry(
        conn: &mut SqliteConnection,
        date: &str,
        rider: &str,
    ) -> Result<i32, diesel::result::Error> {
        insert_entry(
            conn,
            &NewEntry {
                date: date.to_string(),
                rider_name: rider.to_string(),
                trip_count: 0,
                incidents: String::new(),
                created_at: base_time(),
            },
        )
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.rider_name.as_str()).collect()
    }

    #[test]
    fn test_like_contains_escapes_wildcards() {
        assert_eq!(like_contains("ann"), "%ann%");
        assert_eq!(like_contains("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_ids_increase() {
        let mut conn = setup_test_db();
        let first = add(&mut conn, "2024-01-01", "Jo", 0);
        let second = add(&mut conn, "2024-01-01", "Jo", 1);
        let third = add(&mut conn, "2023-12-31", "Al", 2);
        assert!(first < second && second < third);
    }

    #[test]
    fn test_id_beyond_i32_is_an_error() {
        let mut conn = setup_test_db();
        diesel::sql_query(
            "INSERT INTO entries (id, date, riderName) VALUES (2147483647, '2024-01-01', 'Max')",
        )
        .execute(&mut conn)
        .unwrap();

        let err = add_entry(&mut conn, "2024-01-02", "Jo").unwrap_err();
        assert!(matches!(err, diesel::result::Error::DeserializationError(_)));
    }

    #[test]
    fn test_submit_entry_round_trip() {
        let mut conn = setup_test_db();
        let submission = EntrySubmission {
            date: Some(serde_json::json!("2024-03-01")),
            rider_name: Some(serde_json::json!("Jo")),
            trip_count: Some(serde_json::json!(5)),
            incidents: None,
        };
        let id = submit_entry(&mut conn, submission).expect("submit entry");

        let stored = list_entries(&mut conn, &EntryFilter::default()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].date, "2024-03-01");
        assert_eq!(stored[0].rider_name, "Jo");
        assert_eq!(stored[0].trip_count, 5);
        assert_eq!(stored[0].incidents, "");
    }

    #[test]
    fn test_submit_entry_invalid_creates_nothing() {
        let mut conn = setup_test_db();
        let submission = EntrySubmission {
            date: Some(serde_json::json!("2024-03-01")),
            ..Default::default()
        };
        let err = submit_entry(&mut conn, submission).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(list_entries(&mut conn, &EntryFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_unfiltered_order() {
        let mut conn = setup_test_db();
        add(&mut conn, "2024-01-10", "early-old", 0);
        add(&mut conn, "2024-01-20", "late-old", 1);
        add(&mut conn, "2024-01-10", "early-new", 2);
        add(&mut conn, "2024-01-20", "late-new", 3);

        let all = list_entries(&mut conn, &EntryFilter::default()).unwrap();
        assert_eq!(names(&all), vec!["late-new", "late-old", "early-new", "early-old"]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let mut conn = setup_test_db();
        add(&mut conn, "2024-01-09", "before", 0);
        add(&mut conn, "2024-01-10", "start", 1);
        add(&mut conn, "2024-01-15", "middle", 2);
        add(&mut conn, "2024-01-20", "end", 3);
        add(&mut conn, "2024-01-21", "after", 4);

        let filter = EntryFilter::new(
            Some("2024-01-10".to_string()),
            Some("2024-01-20".to_string()),
            None,
        );
        let found = list_entries(&mut conn, &filter).unwrap();
        assert_eq!(names(&found), vec!["end", "middle", "start"]);
    }

    #[test]
    fn test_rider_substring_filter() {
        let mut conn = setup_test_db();
        add(&mut conn, "2024-01-01", "Ann Smith", 0);
        add(&mut conn, "2024-01-02", "Susann", 1);
        add(&mut conn, "2024-01-03", "Bob", 2);

        let filter = EntryFilter::new(None, None, Some("ann".to_string()));
        let found = list_entries(&mut conn, &filter).unwrap();
        assert_eq!(names(&found), vec!["Susann", "Ann Smith"]);
    }

    #[test]
    fn test_rider_filter_treats_wildcards_literally() {
        let mut conn = setup_test_db();
        add(&mut conn, "2024-01-01", "Ann", 0);
        add(&mut conn, "2024-01-02", "A_n", 1);

        let filter = EntryFilter::new(None, None, Some("_".to_string()));
        let found = list_entries(&mut conn, &filter).unwrap();
        assert_eq!(names(&found), vec!["A_n"]);

        let filter = EntryFilter::new(None, None, Some("%".to_string()));
        assert!(list_entries(&mut conn, &filter).unwrap().is_empty());
    }

    #[test]
    fn test_filters_combine() {
        let mut conn = setup_test_db();
        add(&mut conn, "2024-01-05", "Jo", 0);
        add(&mut conn, "2024-01-12", "Jo", 1);
        add(&mut conn, "2024-01-12", "Al", 2);

        let filter = EntryFilter::new(Some("2024-01-10".to_string()), None, Some("Jo".to_string()));
        let found = list_entries(&mut conn, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, "2024-01-12");
        assert_eq!(found[0].rider_name, "Jo");
    }

    #[test]
    fn test_rider_names_sorted_and_distinct() {
        let mut conn = setup_test_db();
        assert!(list_rider_names(&mut conn).unwrap().is_empty());

        add(&mut conn, "2024-01-01", "Jo", 0);
        add(&mut conn, "2024-01-02", "Al", 1);
        add(&mut conn, "2024-01-03", "Jo", 2);
        add(&mut conn, "2024-01-04", "Mia", 3);

        assert_eq!(list_rider_names(&mut conn).unwrap(), vec!["Al", "Jo", "Mia"]);
    }
}

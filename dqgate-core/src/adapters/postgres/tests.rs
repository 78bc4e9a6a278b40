//! Unit tests for the PostgreSQL source.

#![allow(clippy::unwrap_used)]

use super::*;
use std::time::Duration;

fn events() -> TableRef {
    TableRef::new("mai", "events")
}

#[test]
fn test_parse_connection_config() {
    let connection_string = "postgres://dq_reader@localhost:5432/warehouse";
    let config = PostgresSource::parse_connection_config(connection_string).unwrap();

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, Some(5432));
    assert_eq!(config.database, Some("warehouse".to_string()));
    assert_eq!(config.username, Some("dq_reader".to_string()));
    assert!(config.read_only);
    assert_eq!(config.query_timeout, Duration::from_secs(60));
    assert_eq!(config.max_connections, 2);
}

#[test]
fn test_parse_connection_config_with_query_params() {
    let connection_string =
        "postgres://user@host/db?connect_timeout=10&statement_timeout=45000&pool_max_conns=4";
    let config = PostgresSource::parse_connection_config(connection_string).unwrap();

    assert_eq!(config.port, Some(5432));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.query_timeout, Duration::from_millis(45000));
    assert_eq!(config.max_connections, 4);
}

#[test]
fn test_parse_connection_config_minimal() {
    let config = PostgresSource::parse_connection_config("postgres://host").unwrap();

    assert_eq!(config.host, "host");
    assert_eq!(config.database, None);
    assert_eq!(config.username, None);
}

#[test]
fn test_parse_connection_config_invalid_scheme() {
    let result = PostgresSource::parse_connection_config("mysql://user@host/db");
    assert!(result.unwrap_err().to_string().contains("postgres://"));
}

#[test]
fn test_parse_connection_config_rejects_bad_names() {
    assert!(PostgresSource::parse_connection_config("postgres://host/1db").is_err());
    assert!(PostgresSource::parse_connection_config("postgres://bad-user@host/db").is_err());
}

#[test]
fn test_validate_rejects_long_statement_timeout() {
    let result =
        PostgresSource::validate_connection_string("postgres://host/db?statement_timeout=600000");
    assert!(result.is_err());
}

#[test]
fn test_count_sql_quotes_identifiers() {
    assert_eq!(count_rows_sql(&events()), r#"SELECT COUNT(*) FROM "mai"."events""#);
    assert_eq!(
        count_non_null_sql(&events(), "col1"),
        r#"SELECT COUNT("col1") FROM "mai"."events""#
    );
}

#[test]
fn test_identifier_injection_is_quoted() {
    let sql = count_non_null_sql(&events(), r#"x") FROM pg_user; --"#);
    assert!(sql.starts_with(r#"SELECT COUNT("x"") FROM pg_user; --")"#));
}

#[test]
fn test_duplicate_groups_sql_shape() {
    let keys = vec![
        "col1".to_string(),
        "col2".to_string(),
        "event_date".to_string(),
    ];
    let sql = duplicate_groups_sql(&events(), &keys);

    assert!(sql.contains(r#""col1"::text, "col2"::text, "event_date"::text"#));
    assert!(sql.contains(r#"GROUP BY "col1", "col2", "event_date""#));
    assert!(sql.contains("HAVING COUNT(*) > 1"));
    assert!(sql.contains(
        r#"ORDER BY dup_count DESC, "col1"::text COLLATE "C" NULLS LAST, "col2"::text"#
    ));
    assert!(sql.ends_with("LIMIT $1"));
}

#[test]
fn test_duplicate_group_count_sql_has_no_limit() {
    let keys = vec!["col1".to_string()];
    let sql = duplicate_group_count_sql(&events(), &keys);

    assert!(sql.contains(r#"GROUP BY "col1" HAVING COUNT(*) > 1"#));
    assert!(!sql.contains("LIMIT"));
}

#[test]
fn test_max_sql_casts() {
    assert_eq!(
        max_timestamp_sql(&events(), "load_dttm"),
        r#"SELECT MAX("load_dttm")::timestamptz FROM "mai"."events""#
    );
    assert_eq!(
        max_date_sql(&events(), "event_date"),
        r#"SELECT MAX("event_date")::date FROM "mai"."events""#
    );
}

#[tokio::test]
async fn test_new_is_lazy() {
    // No server is listening; construction must still succeed.
    let source = PostgresSource::new("postgres://dq@127.0.0.1:1/warehouse?pool_max_conns=3")
        .await
        .unwrap();
    assert_eq!(source.source_kind(), SourceKind::PostgreSQL);
    assert_eq!(source.config.max_connections, 3);
    assert_eq!(source.config.to_string(), "127.0.0.1:1/warehouse");
    let debug = format!("{:?}", source);
    assert!(debug.contains("PostgresSource"));
}

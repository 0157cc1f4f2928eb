use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{ResponseKind, ShellResponse};

// ── Key/value ──

pub fn get_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
        row.get(0)
    })
    .optional()
}

pub fn set_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

// ── Shell cache ──

pub fn open_bucket(conn: &Connection, name: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO shell_buckets (name) VALUES (?1)",
        params![name],
    )?;
    Ok(())
}

pub fn bucket_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM shell_buckets ORDER BY created_at, name")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut names = vec![];
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}

pub fn delete_bucket(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM shell_buckets WHERE name = ?1", params![name])?;
    Ok(count > 0)
}

pub fn put_entry(
    conn: &Connection,
    bucket: &str,
    method: &str,
    url: &str,
    response: &ShellResponse,
) -> anyhow::Result<()> {
    let headers = serde_json::to_string(&response.headers)?;

    open_bucket(conn, bucket)?;
    conn.execute(
        "INSERT INTO shell_entries (bucket, method, url, status, headers, body, kind, redirected)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(bucket, method, url) DO UPDATE SET
           status = excluded.status,
           headers = excluded.headers,
           body = excluded.body,
           kind = excluded.kind,
           redirected = excluded.redirected",
        params![
            bucket,
            method,
            url,
            response.status,
            headers,
            response.body.as_ref(),
            response.kind.as_str(),
            response.redirected,
        ],
    )?;
    Ok(())
}

pub fn get_entry(
    conn: &Connection,
    bucket: &str,
    method: &str,
    url: &str,
) -> anyhow::Result<Option<ShellResponse>> {
    let row = conn
        .query_row(
            "SELECT status, headers, body, kind, redirected FROM shell_entries
             WHERE bucket = ?1 AND method = ?2 AND url = ?3",
            params![bucket, method, url],
            |row| {
                Ok((
                    row.get::<_, u16>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((status, headers_json, body, kind, redirected)) => {
            let headers = serde_json::from_str(&headers_json)?;
            Ok(Some(ShellResponse {
                status,
                headers,
                body: body.into(),
                kind: ResponseKind::parse(&kind),
                redirected,
            }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn count_entries(conn: &Connection, bucket: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM shell_entries WHERE bucket = ?1",
            params![bucket],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn response(body: &'static str) -> ShellResponse {
        ShellResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: body.into(),
            kind: ResponseKind::Basic,
            redirected: false,
        }
    }

    #[test]
    fn test_set_and_get_value() {
        let conn = setup_db();
        assert_eq!(get_value(&conn, "fm_theme_v1").unwrap(), None);

        set_value(&conn, "fm_theme_v1", "\"light\"").unwrap();
        assert_eq!(
            get_value(&conn, "fm_theme_v1").unwrap().as_deref(),
            Some("\"light\"")
        );

        set_value(&conn, "fm_theme_v1", "\"dark\"").unwrap();
        assert_eq!(
            get_value(&conn, "fm_theme_v1").unwrap().as_deref(),
            Some("\"dark\"")
        );
    }

    #[test]
    fn test_put_and_get_entry() {
        let conn = setup_db();
        put_entry(&conn, "v1", "GET", "/index.html", &response("<html>")).unwrap();

        let entry = get_entry(&conn, "v1", "GET", "/index.html").unwrap().unwrap();
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body.as_ref(), b"<html>");
        assert_eq!(entry.kind, ResponseKind::Basic);
        assert_eq!(entry.headers[0].0, "content-type");

        assert!(get_entry(&conn, "v1", "POST", "/index.html").unwrap().is_none());
        assert!(get_entry(&conn, "v2", "GET", "/index.html").unwrap().is_none());
    }

    #[test]
    fn test_put_entry_overwrites() {
        let conn = setup_db();
        put_entry(&conn, "v1", "GET", "/", &response("old")).unwrap();
        put_entry(&conn, "v1", "GET", "/", &response("new")).unwrap();

        let entry = get_entry(&conn, "v1", "GET", "/").unwrap().unwrap();
        assert_eq!(entry.body.as_ref(), b"new");
        assert_eq!(count_entries(&conn, "v1"), 1);
    }

    #[test]
    fn test_delete_bucket_cascades() {
        let conn = setup_db();
        put_entry(&conn, "old", "GET", "/", &response("a")).unwrap();
        put_entry(&conn, "old", "GET", "/index.html", &response("b")).unwrap();
        open_bucket(&conn, "new").unwrap();

        assert_eq!(bucket_names(&conn).unwrap().len(), 2);
        assert!(delete_bucket(&conn, "old").unwrap());
        assert_eq!(bucket_names(&conn).unwrap(), vec!["new".to_string()]);
        assert_eq!(count_entries(&conn, "old"), 0);
        assert!(!delete_bucket(&conn, "old").unwrap());
    }
}

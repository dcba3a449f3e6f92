#![cfg(feature = "rusqlite")]
#![allow(dead_code)]

use std::path::Path;
use std::rc::Rc;

use sculpt::sqlite::SQLiteClient;
use sculpt::sqlite::rusqlite::Connection;

const SCHEMA: &str = "
    CREATE TABLE author (
        id INTEGER PRIMARY KEY,
        urn TEXT NOT NULL,
        name TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT 1
    );
    CREATE TABLE news (
        id INTEGER PRIMARY KEY,
        author_id INTEGER NOT NULL REFERENCES author (id),
        title TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '',
        meta TEXT,
        published_at DATETIME
    );
";

const SEED: &str = "
    INSERT INTO author (id, urn, name, active) VALUES
        (1, 'urn:profile:1', 'Jane', 1),
        (2, 'urn:profile:2', 'John', 0);
    INSERT INTO news (id, author_id, title, tags, meta, published_at) VALUES
        (1, 1, 'foo', 'a,b', '{\"views\":10}', '2016-03-01 10:00:00'),
        (2, 2, 'bar', '', NULL, '0000-00-00 00:00:00'),
        (3, 1, 'baz', 'c', '{\"views\":3}', NULL);
";

pub fn seed(conn: &Connection) {
    conn.execute_batch(SCHEMA).expect("Failed to create tables");
    conn.execute_batch(SEED).expect("Failed to seed tables");
}

pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    seed(&conn);
    conn
}

pub fn client() -> Rc<SQLiteClient> {
    Rc::new(SQLiteClient::new(setup_db()))
}

/// Creates and seeds a database file at `path`.
pub fn seed_file(path: &Path) {
    let conn = Connection::open(path).expect("Failed to create database file");
    seed(&conn);
}

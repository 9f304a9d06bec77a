/// SQL DDL for the cart database.
/// WAL mode + foreign keys enabled at connection time.
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS t_order (
    ord_usr INTEGER NOT NULL,
    ord_art INTEGER NOT NULL,
    ord_qt INTEGER NOT NULL,
    PRIMARY KEY (ord_usr, ord_art)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
"#;

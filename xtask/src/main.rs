// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Developer automation for the Trail France workspace.
//!
//! `cargo xtask ci` runs everything a pull request must pass. The other
//! commands run one step of it. No step needs an external service: tests
//! and the migration check use in-memory `SQLite`.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::process::Output;

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the application expects after all migrations are applied.
const EXPECTED_TABLES: [&str; 5] = ["accounts", "favorites", "races", "reports", "sessions"];

/// Tables that must not reference any other table. Reports outlive the
/// race they point at.
const DETACHED_TABLES: [&str; 1] = ["reports"];

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Everything below, in order
    CI,

    /// Build all targets
    #[command(visible_alias = "b")]
    Build,

    /// Type-check all targets
    #[command(visible_alias = "c")]
    Check,

    /// Check licenses and advisories with cargo-deny
    Deny,

    /// Find unused dependencies with cargo-machete
    #[command(visible_alias = "m")]
    Machete,

    /// Clippy, rustdoc, rustfmt and typos
    #[command(visible_alias = "l")]
    Lint,

    /// Reformat the workspace with nightly rustfmt
    #[command(visible_alias = "fmt")]
    Format,

    /// Unit, integration and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply, revert and re-apply migrations and check the schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.log_level_filter().as_trace())
        .without_time()
        .init();

    if let Err(err) = run(args.command) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::CI => {
            lint()?;
            cargo(&["deny", "check"])?;
            machete()?;
            cargo(&["build", "--all-targets", "--all-features"])?;
            test()?;
            verify_migrations()
        }
        Command::Build => cargo(&["build", "--all-targets", "--all-features"]),
        Command::Check => cargo(&["check", "--all-targets", "--all-features"]),
        Command::Deny => cargo(&["deny", "check"]),
        Command::Machete => machete(),
        Command::Lint => lint(),
        Command::Format => nightly_cargo(&["fmt", "--all"]),
        Command::Test => test(),
        Command::VerifyMigrations => verify_migrations(),
    }
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

fn lint() -> Result<()> {
    cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])?;
    lint_docs()?;
    nightly_cargo(&["fmt", "--all", "--check"])?;
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Builds every workspace package's docs the way docs.rs would, failing on
/// warnings.
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to read cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            ["doc", "--no-deps", "--all-features", "--package", &package.name],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }
    Ok(())
}

fn test() -> Result<()> {
    cargo(&["test", "--all-targets", "--all-features"])?;
    // doc tests last, they are the slowest
    cargo(&["test", "--doc", "--all-features"])
}

fn cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

fn nightly_cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args)
        // set by the outer cargo invocation, would pin the stable toolchain
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the embedded migrations.
///
/// ## What This Command Does
///
/// 1. Applies every migration to an in-memory `SQLite` database
/// 2. Checks the expected tables exist, each with a primary key
/// 3. Checks every foreign key points at an existing table and column
/// 4. Checks detached tables (crowd reports) carry no foreign key
/// 5. Reverts all migrations and checks no application table remains
/// 6. Re-applies the migrations and checks the schema is unchanged
fn verify_migrations() -> Result<()> {
    tracing::info!("Verifying migrations");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {}", e))?;
    tracing::info!("Migrations applied");

    let schema = introspect_schema(&mut conn)?;
    check_schema(&schema)?;

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {}", e))?;
    let reverted = introspect_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        return Err(eyre!(
            "❌ Migration check FAILED: tables left after revert: {:?}",
            reverted.tables.keys().collect::<Vec<_>>()
        ));
    }
    tracing::info!("Migrations reverted cleanly");

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {}", e))?;
    let reapplied = introspect_schema(&mut conn)?;
    if reapplied != schema {
        return Err(eyre!(
            "❌ Migration check FAILED: schema differs after revert and re-apply"
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    indexes: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

/// Introspect the `SQLite` schema, ignoring diesel's bookkeeping table
fn introspect_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );
            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
            table_info
                .indexes
                .insert(index_columns.into_iter().map(|c| c.name).collect());
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Check structural rules on the migrated schema and fail on the first
/// violation
fn check_schema(schema: &Schema) -> Result<()> {
    let actual: BTreeSet<&str> = schema.tables.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = EXPECTED_TABLES.into_iter().collect();

    if actual != expected {
        let mut errors = Vec::new();
        for table in expected.difference(&actual) {
            errors.push(format!("  - Table '{table}' is missing"));
        }
        for table in actual.difference(&expected) {
            errors.push(format!("  - Table '{table}' is not expected"));
        }
        return Err(eyre!(
            "❌ Migration check FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for (table_name, table) in &schema.tables {
        if table.primary_keys.is_empty() {
            return Err(eyre!(
                "❌ Migration check FAILED: table '{}' has no primary key",
                table_name
            ));
        }

        for fk in &table.foreign_keys {
            let target_exists = schema
                .tables
                .get(&fk.to_table)
                .is_some_and(|target| target.columns.contains_key(&fk.to_column));
            if !target_exists {
                return Err(eyre!(
                    "❌ Migration check FAILED: '{}.{}' references missing '{}.{}'",
                    table_name,
                    fk.from_column,
                    fk.to_table,
                    fk.to_column
                ));
            }
        }

        if DETACHED_TABLES.contains(&table_name.as_str()) && !table.foreign_keys.is_empty() {
            return Err(eyre!(
                "❌ Migration check FAILED: table '{}' must not have foreign keys: {:?}",
                table_name,
                table.foreign_keys
            ));
        }

        tracing::debug!(
            table = %table_name,
            columns = table.columns.len(),
            indexes = table.indexes.len(),
            "Table checked"
        );
    }

    Ok(())
}

/// Logs a `duct` expression before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running {self:?}");
        // repeated on failure, the first line has usually scrolled away
        self.run()
            .inspect_err(|_| tracing::error!("command failed: {self:?}"))
    }
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `journal_core` linkage.
//! - Open a migrated in-memory store and report its mood catalog.

use journal_core::{open_db_in_memory, CatalogRepository, SqliteCatalogRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("journal_core ping={}", journal_core::ping());
    println!("journal_core version={}", journal_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("journal_core db=error error={err}");
            return ExitCode::FAILURE;
        }
    };
    let moods = SqliteCatalogRepository::try_new(&conn).and_then(|repo| repo.list_moods());
    match moods {
        Ok(moods) => {
            println!("journal_core db=ok moods={}", moods.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("journal_core db=error error={err}");
            ExitCode::FAILURE
        }
    }
}

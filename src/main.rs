mod config;
mod db;
mod importer;
mod members;
mod prompt;
mod roster;

use anyhow::Context;
use clap::Parser;
use std::io;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("instructor_import=info")),
        )
        .with_writer(io::stderr)
        .init();

    let env_file = config::env_file_from_args(std::env::args());
    if config::load_env_file(&env_file)? {
        tracing::debug!("loaded {}", env_file.to_string_lossy());
    }

    let args = config::Args::parse();
    args.validate()?;

    let rows = roster::load_roster(&args.roster, &args.sheet)?;
    tracing::info!(rows = rows.len(), sheet = %args.sheet, "loaded roster");

    let directory = members::fetch_members(&args.api_base, &args.guild, &args.token)?;

    let conn = db::open_db(&args.db)
        .with_context(|| format!("failed to open database {}", args.db.to_string_lossy()))?;

    let bulk = importer::import_matches(&conn, &rows, &directory)?;

    let manual = if args.skip_manual {
        importer::skip_manual(&bulk.deferred)
    } else {
        let stdin = io::stdin();
        let mut prompt = prompt::LinePrompt::new(stdin.lock(), io::stdout());
        importer::resolve_deferred(&conn, &bulk.deferred, &mut prompt)?
    };

    let stored = db::count_instructors(&conn)?;
    importer::RunSummary::new(rows.len(), &bulk, manual, stored).log();
    Ok(())
}

use crate::db::{self, InstructorRecord};
use crate::members::{self, Member};
use crate::prompt::Prompt;
use crate::roster::RosterRow;
use rusqlite::Connection;

/// Operator answer meaning "this instructor has no chat account".
pub const NO_ACCOUNT_SENTINEL: &str = "0";

#[derive(Debug, Default)]
pub struct MatchPass {
    pub already_present: usize,
    pub matched: usize,
    pub deferred: Vec<RosterRow>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ManualPass {
    pub already_present: usize,
    pub resolved: usize,
    pub no_account: usize,
    pub unresolved: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub loaded: usize,
    pub already_present: usize,
    pub matched: usize,
    pub deferred: usize,
    pub manual: ManualPass,
    /// Rows in the instructors table once the run is over.
    pub stored: i64,
}

impl RunSummary {
    pub fn new(loaded: usize, bulk: &MatchPass, manual: ManualPass, stored: i64) -> Self {
        Self {
            loaded,
            already_present: bulk.already_present,
            matched: bulk.matched,
            deferred: bulk.deferred.len(),
            manual,
            stored,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            loaded = self.loaded,
            already_present = self.already_present,
            matched = self.matched,
            deferred = self.deferred,
            recheck_present = self.manual.already_present,
            resolved = self.manual.resolved,
            no_account = self.manual.no_account,
            unresolved = self.manual.unresolved,
            stored = self.stored,
            "import finished"
        );
    }
}

/// `"Robert (Bob)"` becomes `"Bob"`; names without a parenthesis pass through.
pub fn preferred_first_name(first: &str) -> String {
    let first = first.trim();
    match first.split('(').nth(1) {
        Some(inner) => inner
            .trim()
            .split(')')
            .next()
            .unwrap_or("")
            .trim()
            .to_string(),
        None => first.to_string(),
    }
}

pub fn display_name(row: &RosterRow) -> String {
    format!(
        "{} {}",
        preferred_first_name(&row.first_name),
        row.last_name.trim()
    )
}

/// Bulk pass: every row not yet stored is matched against the directory.
/// Matches are written in one transaction; misses are returned for the
/// manual pass.
pub fn import_matches(
    conn: &Connection,
    rows: &[RosterRow],
    directory: &[Member],
) -> anyhow::Result<MatchPass> {
    let tx = conn.unchecked_transaction()?;
    let mut pass = MatchPass::default();

    for row in rows {
        if db::instructor_exists(&tx, row.instructor_id)? {
            pass.already_present += 1;
            continue;
        }

        let full_name = display_name(row);
        let Some(member) = members::find_member(directory, &full_name) else {
            tracing::warn!("User not found: {} (instructor {})", full_name, row.instructor_id);
            pass.deferred.push(row.clone());
            continue;
        };

        tracing::debug!(
            instructor_id = row.instructor_id,
            discord_id = %member.platform_id,
            "matched {}",
            full_name
        );
        db::upsert_instructor(
            &tx,
            &InstructorRecord {
                id: row.instructor_id,
                discord_id: member.platform_id.clone(),
                name: full_name,
                email: row.email.trim().to_string(),
            },
        )?;
        pass.matched += 1;
    }

    tx.commit()?;
    Ok(pass)
}

/// Manual pass: asks the operator for each deferred row. Each answer is
/// committed on its own.
pub fn resolve_deferred<P: Prompt>(
    conn: &Connection,
    deferred: &[RosterRow],
    prompt: &mut P,
) -> anyhow::Result<ManualPass> {
    let mut pass = ManualPass::default();

    for row in deferred {
        if db::instructor_exists(conn, row.instructor_id)? {
            pass.already_present += 1;
            continue;
        }

        let answer = prompt.ask(&format!(
            "{} {} ({}) ",
            row.first_name, row.last_name, row.status
        ))?;
        if answer.is_empty() {
            pass.unresolved += 1;
            continue;
        }

        let discord_id = if answer == NO_ACCOUNT_SENTINEL {
            pass.no_account += 1;
            String::new()
        } else {
            pass.resolved += 1;
            answer
        };
        db::upsert_instructor(
            conn,
            &InstructorRecord {
                id: row.instructor_id,
                discord_id,
                name: format!("{} {}", row.first_name.trim(), row.last_name.trim()),
                email: row.email.trim().to_string(),
            },
        )?;
    }

    Ok(pass)
}

/// Deferred rows left for a future run when no operator is available.
pub fn skip_manual(deferred: &[RosterRow]) -> ManualPass {
    ManualPass {
        unresolved: deferred.len(),
        ..ManualPass::default()
    }
}

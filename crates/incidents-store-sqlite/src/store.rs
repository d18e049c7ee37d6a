//! The SQLite implementation of [`IncidentStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::{OptionalExtension as _, TransactionBehavior};

use incidents_core::{
  attachment::{Attachment, AttachmentInfo, StatementFile, statement_filename},
  incident::{Incident, IncidentPupil, IncidentStatus, format_identifier},
  pupil::{Pupil, split_name},
  reconcile::{self, ReconcileCounts, SubmittedSlot},
  store::IncidentStore,
};

use crate::{
  Result,
  encode::{
    INCIDENT_COLUMNS, IncidentColumns, RawAssociation, RawIncident,
    SELECT_ASSOCIATION, SELECT_INCIDENT, decode_status, encode_status,
  },
  schema::SCHEMA,
};

/// Outcome of work done on the database thread that may fail for a domain
/// reason. A domain failure drops the open transaction, rolling it back.
type Outcome<T> = std::result::Result<T, incidents_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An incident store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        let mut stmt = conn.prepare(
          "INSERT OR IGNORE INTO incident_status (name, sequence) VALUES (?1, ?2)",
        )?;
        for status in IncidentStatus::ALL {
          stmt.execute(rusqlite::params![
            encode_status(status),
            status.sequence()
          ])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Synchronous helpers (run on the database thread) ────────────────────────

fn incident_exists(
  conn: &rusqlite::Connection,
  incident_id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM incidents WHERE incident_id = ?1",
        rusqlite::params![incident_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn pupil_exists(conn: &rusqlite::Connection, pupil_id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM pupils WHERE pupil_id = ?1",
        rusqlite::params![pupil_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn load_associations(
  conn: &rusqlite::Connection,
  incident_id: i64,
) -> rusqlite::Result<Vec<RawAssociation>> {
  let mut stmt = conn.prepare(&format!(
    "{SELECT_ASSOCIATION} WHERE ip.incident_id = ?1 ORDER BY ip.association_id"
  ))?;
  stmt
    .query_map(rusqlite::params![incident_id], RawAssociation::from_row)?
    .collect()
}

/// Look a pupil up by exact name, creating it on first reference.
fn get_or_create_pupil(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT OR IGNORE INTO pupils (name) VALUES (?1)",
    rusqlite::params![name],
  )?;
  conn.query_row(
    "SELECT pupil_id FROM pupils WHERE name = ?1",
    rusqlite::params![name],
    |r| r.get(0),
  )
}

/// Plan and apply a reconciliation inside the caller's transaction.
fn reconcile_in(
  conn: &rusqlite::Connection,
  incident_id: i64,
  slots: Vec<SubmittedSlot>,
) -> rusqlite::Result<Outcome<ReconcileCounts>> {
  let current: Vec<IncidentPupil> = load_associations(conn, incident_id)?
    .into_iter()
    .map(RawAssociation::into_incident_pupil)
    .collect();

  let plan = match reconcile::plan(&current, slots) {
    Ok(plan) => plan,
    Err(e) => return Ok(Err(e)),
  };
  if plan.is_noop() {
    tracing::debug!(incident_id, "pupil submission changes nothing");
    return Ok(Ok(plan.counts()));
  }

  for (association_id, upload) in plan.replacements() {
    conn.execute(
      "UPDATE incident_pupils
       SET statement = ?1, statement_extension = ?2
       WHERE association_id = ?3",
      rusqlite::params![upload.data, upload.extension(), association_id],
    )?;
  }

  for added in &plan.added {
    let pupil_id = get_or_create_pupil(conn, &added.pupil_name)?;
    let data = added.statement.as_ref().map(|u| u.data.as_slice());
    let extension = added.statement.as_ref().map(|u| u.extension());
    conn.execute(
      "INSERT INTO incident_pupils
         (incident_id, pupil_id, statement, statement_extension)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![incident_id, pupil_id, data, extension],
    )?;
  }

  for association_id in &plan.removed {
    conn.execute(
      "DELETE FROM incident_pupils WHERE association_id = ?1",
      rusqlite::params![association_id],
    )?;
  }

  Ok(Ok(plan.counts()))
}

fn log_counts(incident_id: i64, counts: ReconcileCounts) {
  tracing::info!(
    incident_id,
    retained = counts.retained,
    replaced = counts.replaced,
    added = counts.added,
    removed = counts.removed,
    "reconciled incident pupils"
  );
}

// ─── IncidentStore impl ──────────────────────────────────────────────────────

impl IncidentStore for SqliteStore {
  type Error = crate::Error;

  // ── Incidents ─────────────────────────────────────────────────────────────

  async fn create_incident(&self, draft: Incident) -> Result<Incident> {
    let cols = IncidentColumns::from_incident(&draft);

    let incident_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO incidents ({INCIDENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
          ),
          cols.bind().as_slice(),
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::info!(incident_id, "incident created");

    Ok(Incident {
      incident_id: Some(incident_id),
      pupils: Vec::new(),
      ..draft
    })
  }

  async fn get_incident(&self, incident_id: i64) -> Result<Option<Incident>> {
    let found: Option<(RawIncident, Vec<RawAssociation>)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("{SELECT_INCIDENT} WHERE incident_id = ?1"),
            rusqlite::params![incident_id],
            RawIncident::from_row,
          )
          .optional()?;
        match raw {
          Some(raw) => Ok(Some((raw, load_associations(conn, incident_id)?))),
          None => Ok(None),
        }
      })
      .await?;

    found
      .map(|(raw, assocs)| {
        raw.into_incident(
          assocs
            .into_iter()
            .map(RawAssociation::into_incident_pupil)
            .collect(),
        )
      })
      .transpose()
  }

  async fn list_incidents(&self) -> Result<Vec<Incident>> {
    let (raws, assocs): (Vec<RawIncident>, Vec<RawAssociation>) = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("{SELECT_INCIDENT} ORDER BY incident_id"))?;
        let raws = stmt
          .query_map([], RawIncident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn
          .prepare(&format!("{SELECT_ASSOCIATION} ORDER BY ip.association_id"))?;
        let assocs = stmt
          .query_map([], RawAssociation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((raws, assocs))
      })
      .await?;

    let mut by_incident: HashMap<i64, Vec<IncidentPupil>> = HashMap::new();
    for a in assocs {
      by_incident
        .entry(a.incident_id)
        .or_default()
        .push(a.into_incident_pupil());
    }

    raws
      .into_iter()
      .map(|raw| {
        let pupils = by_incident.remove(&raw.incident_id).unwrap_or_default();
        raw.into_incident(pupils)
      })
      .collect()
  }

  async fn update_incident(
    &self,
    incident: Incident,
    slots: Vec<SubmittedSlot>,
  ) -> Result<i64> {
    let incident_id = incident
      .incident_id
      .ok_or(incidents_core::Error::Unsaved)?;
    let cols = IncidentColumns::from_incident(&incident);

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let params = cols
          .bind()
          .into_iter()
          .chain(std::iter::once(&incident_id as &dyn rusqlite::ToSql));
        let updated = tx.execute(
          "UPDATE incidents SET
             one_liner = ?1, description = ?2,
             is_incident = ?3, is_racial = ?4, is_bullying = ?5, is_concern = ?6,
             other_type = ?7, logged_on = ?8, status = ?9, action_taken = ?10
           WHERE incident_id = ?11",
          rusqlite::params_from_iter(params),
        )?;
        if updated == 0 {
          return Ok(Err(incidents_core::Error::IncidentNotFound(incident_id)));
        }

        let counts = match reconcile_in(&tx, incident_id, slots)? {
          Ok(counts) => counts,
          Err(e) => return Ok(Err(e)),
        };
        tx.commit()?;
        Ok(Ok(counts))
      })
      .await??;

    tracing::info!(incident_id, "incident updated");
    log_counts(incident_id, counts);
    Ok(incident_id)
  }

  async fn reconcile_incident_pupils(
    &self,
    incident_id: i64,
    slots: Vec<SubmittedSlot>,
  ) -> Result<i64> {
    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !incident_exists(&tx, incident_id)? {
          return Ok(Err(incidents_core::Error::IncidentNotFound(incident_id)));
        }
        let counts = match reconcile_in(&tx, incident_id, slots)? {
          Ok(counts) => counts,
          Err(e) => return Ok(Err(e)),
        };
        tx.commit()?;
        Ok(Ok(counts))
      })
      .await??;

    log_counts(incident_id, counts);
    Ok(incident_id)
  }

  async fn delete_incident(&self, incident_id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM incidents WHERE incident_id = ?1",
          rusqlite::params![incident_id],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(incidents_core::Error::IncidentNotFound(incident_id).into());
    }
    tracing::info!(incident_id, "incident deleted");
    Ok(())
  }

  // ── Pupils and statements ─────────────────────────────────────────────────

  async fn add_pupil(&self, name: String) -> Result<Pupil> {
    split_name(&name)?;

    Ok(
      self
        .conn
        .call(move |conn| {
          let pupil_id = get_or_create_pupil(conn, &name)?;
          Ok(Pupil { pupil_id, name })
        })
        .await?,
    )
  }

  async fn list_pupils(&self) -> Result<Vec<Pupil>> {
    let mut pupils: Vec<Pupil> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT pupil_id, name FROM pupils")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Pupil { pupil_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    pupils.sort();
    Ok(pupils)
  }

  async fn get_statement(
    &self,
    incident_id: i64,
    pupil_id: i64,
  ) -> Result<Option<StatementFile>> {
    let row: Outcome<Option<(String, Vec<u8>, Option<String>)>> = self
      .conn
      .call(move |conn| {
        if !incident_exists(conn, incident_id)? {
          return Ok(Err(incidents_core::Error::IncidentNotFound(incident_id)));
        }
        if !pupil_exists(conn, pupil_id)? {
          return Ok(Err(incidents_core::Error::PupilNotFound(pupil_id)));
        }
        Ok(Ok(
          conn
            .query_row(
              "SELECT p.name, ip.statement, ip.statement_extension
               FROM incident_pupils ip JOIN pupils p ON p.pupil_id = ip.pupil_id
               WHERE ip.incident_id = ?1 AND ip.pupil_id = ?2
                 AND ip.statement IS NOT NULL
               ORDER BY ip.association_id DESC
               LIMIT 1",
              rusqlite::params![incident_id, pupil_id],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?,
        ))
      })
      .await?;

    Ok(row?.map(|(name, data, extension)| StatementFile {
      filename: statement_filename(
        &format_identifier(incident_id),
        &name,
        extension.as_deref().unwrap_or_default(),
      ),
      data,
    }))
  }

  // ── Incident-level attachments ────────────────────────────────────────────

  async fn add_attachment(
    &self,
    incident_id: i64,
    attachment: Attachment,
  ) -> Result<AttachmentInfo> {
    let filename = attachment.filename.clone();

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        if !incident_exists(conn, incident_id)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO attachments (incident_id, filename, data)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![incident_id, attachment.filename, attachment.data],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let attachment_id =
      inserted.ok_or(incidents_core::Error::IncidentNotFound(incident_id))?;
    tracing::info!(incident_id, attachment_id, %filename, "attachment added");

    Ok(AttachmentInfo { attachment_id, incident_id, filename })
  }

  async fn list_attachments(&self, incident_id: i64) -> Result<Vec<AttachmentInfo>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT attachment_id, incident_id, filename FROM attachments
             WHERE incident_id = ?1 ORDER BY attachment_id",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![incident_id], |row| {
              Ok(AttachmentInfo {
                attachment_id: row.get(0)?,
                incident_id:   row.get(1)?,
                filename:      row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_attachment(
    &self,
    attachment_id: i64,
  ) -> Result<Option<(AttachmentInfo, Attachment)>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT incident_id, filename, data FROM attachments
                 WHERE attachment_id = ?1",
                rusqlite::params![attachment_id],
                |row| {
                  let filename: String = row.get(1)?;
                  Ok((
                    AttachmentInfo {
                      attachment_id,
                      incident_id: row.get(0)?,
                      filename: filename.clone(),
                    },
                    Attachment { filename, data: row.get(2)? },
                  ))
                },
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn list_statuses(&self) -> Result<Vec<IncidentStatus>> {
    let names: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT name FROM incident_status ORDER BY sequence")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    names.iter().map(|n| decode_status(n)).collect()
  }
}

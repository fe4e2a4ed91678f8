//! Record store over SQLite.
//!
//! Two collections: `patients` (caller-supplied JSON payloads, stored
//! verbatim) and `reports` (extraction results referencing a patient by
//! id). Ids are store-assigned UUIDv4 strings. A connection is opened per
//! operation; nothing is shared between requests beyond the database file.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use super::sqlite::open_database;
use super::DatabaseError;

/// A persisted patient record.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub id: String,
    pub data: serde_json::Value,
    pub created_at: String,
}

impl PatientRecord {
    /// Render the record as one JSON object with the store-assigned id
    /// merged in as a string field.
    pub fn into_json(self) -> serde_json::Value {
        let mut obj = match self.data {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        obj.insert("id".into(), serde_json::Value::String(self.id));
        serde_json::Value::Object(obj)
    }
}

/// A report to be inserted for an existing patient.
#[derive(Debug)]
pub struct NewReport<'a> {
    pub patient_id: &'a str,
    pub file_category: &'a str,
    pub raw_text: &'a str,
    pub structured_data: &'a str,
    pub source_filename: &'a str,
}

/// A persisted extraction report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub id: String,
    pub patient_id: String,
    pub file_category: String,
    pub raw_text: String,
    pub structured_data: String,
    pub source_filename: String,
    pub created_at: String,
}

/// Handle to the record store. Cheap to clone; opens a fresh connection
/// per operation.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    /// Open the store, creating the database file and running migrations
    /// if needed.
    pub fn open(db_path: &Path) -> Result<Self, DatabaseError> {
        // Eager open validates the path and applies migrations once.
        let _ = open_database(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        open_database(&self.db_path)
    }

    /// Insert a patient payload, returning the store-assigned id.
    pub fn insert_patient(&self, data: &serde_json::Value) -> Result<String, DatabaseError> {
        let conn = self.connect()?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO patients (id, data, created_at) VALUES (?1, ?2, ?3)",
            params![id, data.to_string(), now()],
        )?;
        tracing::debug!(patient_id = %id, "Patient record inserted");
        Ok(id)
    }

    pub fn get_patient(&self, id: &str) -> Result<Option<PatientRecord>, DatabaseError> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT id, data, created_at FROM patients WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, data, created_at)) => Ok(Some(PatientRecord {
                id,
                data: serde_json::from_str(&data)?,
                created_at,
            })),
            None => Ok(None),
        }
    }

    pub fn patient_exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All patient records, oldest first.
    pub fn list_patients(&self) -> Result<Vec<PatientRecord>, DatabaseError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT id, data, created_at FROM patients ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut patients = Vec::new();
        for row in rows {
            let (id, data, created_at) = row?;
            patients.push(PatientRecord {
                id,
                data: serde_json::from_str(&data)?,
                created_at,
            });
        }
        Ok(patients)
    }

    /// Insert a report for an already-verified patient, returning the
    /// store-assigned id. Duplicates for the same patient/category are
    /// allowed to accumulate.
    pub fn insert_report(&self, report: &NewReport<'_>) -> Result<String, DatabaseError> {
        let conn = self.connect()?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO reports
             (id, patient_id, file_category, raw_text, structured_data, source_filename, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                report.patient_id,
                report.file_category,
                report.raw_text,
                report.structured_data,
                report.source_filename,
                now(),
            ],
        )?;
        tracing::debug!(report_id = %id, patient_id = report.patient_id, "Report record inserted");
        Ok(id)
    }

    /// All reports referencing the given patient, insertion order.
    pub fn reports_for_patient(&self, patient_id: &str) -> Result<Vec<ReportRecord>, DatabaseError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, patient_id, file_category, raw_text, structured_data, source_filename, created_at
             FROM reports WHERE patient_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![patient_id], |row| {
            Ok(ReportRecord {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                file_category: row.get(2)?,
                raw_text: row.get(3)?,
                structured_data: row.get(4)?,
                source_filename: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn patient_round_trip() {
        let (_dir, store) = temp_store();
        let payload = json!({"name": "Jane Doe", "date_of_birth": "1980-02-14"});
        let id = store.insert_patient(&payload).unwrap();

        let fetched = store.get_patient(&id).unwrap().expect("patient exists");
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.data, payload);
    }

    #[test]
    fn patient_json_rendering_includes_id() {
        let (_dir, store) = temp_store();
        let id = store.insert_patient(&json!({"name": "Sam"})).unwrap();
        let rendered = store.get_patient(&id).unwrap().unwrap().into_json();
        assert_eq!(rendered["id"], id);
        assert_eq!(rendered["name"], "Sam");
    }

    #[test]
    fn unknown_patient_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.get_patient("no-such-id").unwrap().is_none());
        assert!(!store.patient_exists("no-such-id").unwrap());
    }

    #[test]
    fn list_patients_returns_all() {
        let (_dir, store) = temp_store();
        store.insert_patient(&json!({"name": "A"})).unwrap();
        store.insert_patient(&json!({"name": "B"})).unwrap();
        assert_eq!(store.list_patients().unwrap().len(), 2);
    }

    #[test]
    fn report_references_patient() {
        let (_dir, store) = temp_store();
        let patient_id = store.insert_patient(&json!({"name": "P"})).unwrap();
        let report_id = store
            .insert_report(&NewReport {
                patient_id: &patient_id,
                file_category: "lab",
                raw_text: "A\n\nB",
                structured_data: "{}",
                source_filename: "report.pdf",
            })
            .unwrap();

        let reports = store.reports_for_patient(&patient_id).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, report_id);
        assert_eq!(reports[0].raw_text, "A\n\nB");
        assert_eq!(reports[0].file_category, "lab");
    }

    #[test]
    fn duplicate_reports_accumulate() {
        let (_dir, store) = temp_store();
        let patient_id = store.insert_patient(&json!({"name": "P"})).unwrap();
        let report = NewReport {
            patient_id: &patient_id,
            file_category: "lab",
            raw_text: "text",
            structured_data: "{}",
            source_filename: "scan.png",
        };
        store.insert_report(&report).unwrap();
        store.insert_report(&report).unwrap();
        assert_eq!(store.reports_for_patient(&patient_id).unwrap().len(), 2);
    }
}

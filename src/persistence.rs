//! JSON load/save for an appointment system.
//!
//! A saved system looks like:
//!
//! ```json
//! {
//!     "name": "UBC Student Hospital",
//!     "appointment_list": [{"Student number": 11111111}, null],
//!     "wait_list": [{"Student number": 12345678}]
//! }
//! ```
//!
//! `null` marks a cancelled slot. Files written with the older
//! `"appointment list"` / `"wait list"` keys are still accepted.
//!
//! Student numbers are read as unsigned. A document holding a negative
//! `"Student number"` is rejected as malformed rather than loaded.

use crate::activity::AuditSink;
use crate::config::AllocatorConfig;
use crate::error::PersistenceError;
use crate::models::Patient;
use crate::scheduler::AppointmentSystem;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialized form of an [`AppointmentSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDocument {
    pub name: String,
    #[serde(alias = "appointment list")]
    pub appointment_list: Vec<Option<Patient>>,
    #[serde(alias = "wait list")]
    pub wait_list: Vec<Patient>,
}

impl SystemDocument {
    pub fn from_system(system: &AppointmentSystem) -> Self {
        SystemDocument {
            name: system.name().to_string(),
            appointment_list: system
                .slots()
                .iter()
                .map(|slot| slot.map(Patient::from))
                .collect(),
            wait_list: system.waitlist().map(|(_, sn)| Patient::from(sn)).collect(),
        }
    }

    /// Build a fresh system holding exactly these lists.
    pub fn into_system(self, config: AllocatorConfig, audit: Arc<dyn AuditSink>) -> AppointmentSystem {
        let slots = self
            .appointment_list
            .into_iter()
            .map(|slot| slot.map(|p| p.student_number))
            .collect();
        let waitlist = self
            .wait_list
            .into_iter()
            .map(|p| p.student_number)
            .collect();
        AppointmentSystem::from_parts(self.name, config, slots, waitlist, audit)
    }
}

/// JSON file holding one saved appointment system.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved system into a new [`AppointmentSystem`].
    ///
    /// Nothing outside the returned value is touched, so a failed load leaves
    /// whatever system the caller already holds intact.
    pub fn load(
        &self,
        config: AllocatorConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Result<AppointmentSystem, PersistenceError> {
        let data = fs::read_to_string(&self.path).map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let document: SystemDocument =
            serde_json::from_str(&data).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if document.appointment_list.len() != config.capacity {
            warn!(
                "{} holds {} slots, configured for {}",
                self.path.display(),
                document.appointment_list.len(),
                config.capacity
            );
        }
        info!(
            "loaded {} from {} ({} slots, {} waiting)",
            document.name,
            self.path.display(),
            document.appointment_list.len(),
            document.wait_list.len()
        );
        Ok(document.into_system(config, audit))
    }

    /// Replace `system` with the saved one, keeping its configuration and
    /// audit sink.
    ///
    /// `system` is only overwritten once the whole document has been read and
    /// parsed; on error it is left exactly as it was.
    pub fn reload(&self, system: &mut AppointmentSystem) -> Result<(), PersistenceError> {
        let loaded = self.load(system.config(), system.audit_sink())?;
        *system = loaded;
        Ok(())
    }

    /// Write `system` to the store.
    ///
    /// The document goes to a sibling temporary file first and is renamed over
    /// the target, so a failed save never leaves a partial file behind.
    pub fn save(&self, system: &AppointmentSystem) -> Result<(), PersistenceError> {
        let document = SystemDocument::from_system(system);
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(source));
        }

        info!("saved {} to {}", document.name, self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::EventLog;
    use crate::models::StudentNumber;
    use tempfile::tempdir;

    fn sn(value: u32) -> StudentNumber {
        StudentNumber::new(value)
    }

    fn log() -> Arc<EventLog> {
        Arc::new(EventLog::new())
    }

    fn busy_system(log: Arc<EventLog>) -> AppointmentSystem {
        let mut system = AppointmentSystem::new(
            "UBC Vancouver Student Hospital",
            AllocatorConfig::default(),
            log,
        );
        for id in 1..=9 {
            system.book_appointment(sn(11111110 + id));
        }
        system.book_appointment(sn(12345678));
        system.book_appointment(sn(98765432));
        system.book_appointment(sn(55556666));
        system.cancel_appointment(sn(11111113));
        system
    }

    #[test]
    fn save_then_load_reproduces_lists() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("system.json"));
        let original = busy_system(log());

        store.save(&original).unwrap();
        let loaded = store.load(AllocatorConfig::default(), log()).unwrap();

        assert_eq!(loaded.name(), original.name());
        assert_eq!(loaded.slots(), original.slots());
        assert_eq!(loaded.appointment_time(sn(12345678)), Some(10));
        assert_eq!(
            loaded.waitlist().collect::<Vec<_>>(),
            vec![(1, sn(98765432)), (2, sn(55556666))]
        );
        assert!(loaded.is_full());
    }

    #[test]
    fn save_then_load_keeps_hole_positions() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("system.json"));
        let mut original = AppointmentSystem::new("Clinic", AllocatorConfig::default(), log());
        for id in 1..=4 {
            original.book_appointment(sn(id));
        }
        original.cancel_appointment(sn(2));
        original.cancel_appointment(sn(4));

        store.save(&original).unwrap();
        let loaded = store.load(AllocatorConfig::default(), log()).unwrap();

        assert_eq!(loaded.slots(), &[Some(sn(1)), None, Some(sn(3)), None]);
        assert_eq!(
            SystemDocument::from_system(&loaded),
            SystemDocument::from_system(&original)
        );
    }

    #[test]
    fn save_writes_expected_document() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("system.json"));
        let mut system = AppointmentSystem::new("Clinic", AllocatorConfig::new(1, 8).unwrap(), log());
        system.book_appointment(sn(1));
        system.book_appointment(sn(2));
        system.book_appointment(sn(1));
        system.cancel_waitlist(sn(1));
        system.cancel_appointment(sn(1));

        store.save(&system).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Clinic",
                "appointment_list": [{"Student number": 2}],
                "wait_list": []
            })
        );
        assert!(!dir.path().join("nested").join("system.json.tmp").exists());
    }

    #[test]
    fn load_accepts_holes_and_any_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.json");
        fs::write(
            &path,
            r#"{"name": "Annex", "appointment_list": [null, {"Student number": 22222222}, null],
                "wait_list": [{"Student number": 33333333}]}"#,
        )
        .unwrap();

        let system = JsonStore::new(&path)
            .load(AllocatorConfig::default(), log())
            .unwrap();
        assert_eq!(system.name(), "Annex");
        assert_eq!(system.appointment_count(), 3);
        assert_eq!(system.appointment_time(sn(22222222)), Some(9));
        assert_eq!(system.waitlist_position(sn(33333333)), Some(1));
        assert!(!system.is_full());
    }

    #[test]
    fn load_accepts_legacy_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{"name": "UBC Student Hospital",
                "appointment list": [{"Student number": 11111111}],
                "wait list": []}"#,
        )
        .unwrap();

        let system = JsonStore::new(&path)
            .load(AllocatorConfig::default(), log())
            .unwrap();
        assert_eq!(system.appointment_time(sn(11111111)), Some(8));
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("noSuchFile.json"));
        let err = store.load(AllocatorConfig::default(), log()).unwrap_err();
        assert!(matches!(err, PersistenceError::Read { .. }));
    }

    #[test]
    fn load_malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"name": "Clinic", "appointment_list": [{"Student number": "x"}]}"#)
            .unwrap();
        let err = JsonStore::new(&path)
            .load(AllocatorConfig::default(), log())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }

    #[test]
    fn failed_reload_leaves_live_system_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        let mut live = busy_system(log());
        let before = SystemDocument::from_system(&live);

        let err = JsonStore::new(&path).reload(&mut live).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
        assert_eq!(SystemDocument::from_system(&live), before);

        let err = JsonStore::new(dir.path().join("missing.json"))
            .reload(&mut live)
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Read { .. }));
        assert_eq!(SystemDocument::from_system(&live), before);
    }

    #[test]
    fn reload_swaps_in_saved_system_with_same_sink() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("system.json"));
        store.save(&busy_system(log())).unwrap();

        let live_log = log();
        let mut live = AppointmentSystem::new("Empty", AllocatorConfig::default(), live_log.clone());
        store.reload(&mut live).unwrap();

        assert_eq!(live.name(), "UBC Vancouver Student Hospital");
        assert_eq!(live.config(), AllocatorConfig::default());
        assert_eq!(live.waitlist_position(sn(98765432)), Some(1));

        assert!(live_log.is_empty());
        live.cancel_appointment(sn(12345678));
        assert_eq!(live_log.len(), 1);
    }

    #[test]
    fn load_rejects_negative_student_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("negative.json");
        fs::write(
            &path,
            r#"{"name": "Clinic", "appointment_list": [{"Student number": -5}], "wait_list": []}"#,
        )
        .unwrap();
        let err = JsonStore::new(&path)
            .load(AllocatorConfig::default(), log())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }

    #[test]
    fn save_into_unwritable_location_fails_cleanly() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = JsonStore::new(blocker.join("system.json"));

        let err = store.save(&busy_system(log())).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
        assert!(!blocker.join("system.json").exists());
    }
}

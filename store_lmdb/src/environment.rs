//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::records::LmdbRecordStore;
use crate::LmdbError;

/// The schema version that the current code writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    users_db: Database<Bytes, Bytes>,
    checks_db: Database<Bytes, Bytes>,
    user_checks_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Io(e.to_string()))?;

        // SAFETY: the environment is opened once per process for this
        // directory and never concurrently re-opened with different options.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
        let users_db = env.create_database(&mut wtxn, Some("users"))?;
        let checks_db = env.create_database(&mut wtxn, Some("checks"))?;
        let user_checks_db = env.create_database(&mut wtxn, Some("user_checks"))?;

        let stored = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(raw) => Some(decode_version(raw)?),
            None => None,
        };
        match stored {
            Some(found) if found > CURRENT_SCHEMA_VERSION => {
                return Err(LmdbError::SchemaVersion {
                    found,
                    supported: CURRENT_SCHEMA_VERSION,
                });
            }
            Some(found) => {
                tracing::info!(version = found, "record store schema is up to date");
            }
            None => {
                meta_db.put(
                    &mut wtxn,
                    SCHEMA_VERSION_KEY,
                    &CURRENT_SCHEMA_VERSION.to_be_bytes(),
                )?;
                tracing::info!(version = CURRENT_SCHEMA_VERSION, "initialized record store");
            }
        }
        wtxn.commit()?;

        Ok(Self {
            env,
            users_db,
            checks_db,
            user_checks_db,
        })
    }

    /// Record store backed by this environment.
    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: self.env.clone(),
            users_db: self.users_db,
            checks_db: self.checks_db,
            user_checks_db: self.user_checks_db,
        }
    }
}

fn decode_version(raw: &[u8]) -> Result<u32, LmdbError> {
    let bytes: [u8; 4] = raw
        .try_into()
        .map_err(|_| LmdbError::Serialization("schema version must be 4 bytes".into()))?;
    Ok(u32::from_be_bytes(bytes))
}

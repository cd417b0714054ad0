//! Reserved output scripts.
//!
//! A wallet hands out a script to receive funds before it knows whether the
//! script will be used. If it is, the key behind it must be taken out of the
//! pool for good; if not, nothing happens. The caller picks which of the two
//! applies when the reservation is made.

use crate::Script;

/// Access to a wallet's pool of pre-generated keys.
pub trait KeyPool {
    /// Permanently remove the key at `index` from the pool.
    fn keep_key(&mut self, index: u64);
}

/// What keeping a reserved script does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeepScript {
    /// Nothing to commit.
    Noop,
    /// Commit the pool key at this index.
    CommitReservedKey(u64),
}

/// A script reserved for a future output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveScript {
    pub script: Script,
    pub keep: KeepScript,
}

impl ReserveScript {
    /// Reserve a script with nothing to commit.
    pub fn new(script: Script) -> Self {
        ReserveScript { script, keep: KeepScript::Noop }
    }

    /// Reserve a script backed by the pool key at `index`.
    pub fn from_pool_key(script: Script, index: u64) -> Self {
        ReserveScript { script, keep: KeepScript::CommitReservedKey(index) }
    }

    /// Mark the script as used and return it.
    pub fn keep_script(self, pool: &mut impl KeyPool) -> Script {
        if let KeepScript::CommitReservedKey(index) = self.keep {
            tracing::debug!(index, "keeping reserved pool key");
            pool.keep_key(index);
        }
        self.script
    }
}

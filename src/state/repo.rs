// ABOUTME: Repositories over the deployment state document, one per resource kind.
// ABOUTME: Each operation is load, mutate, save; no record is held between calls.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DeploymentState, DiskRecord, StateError, StateStore, StemcellRecord};
use crate::types::{DiskCid, DiskId, StemcellCid, StemcellId, VmCid};

/// The current VM, stored by CID only.
#[derive(Clone)]
pub struct VmRepo {
    store: Arc<dyn StateStore>,
}

impl VmRepo {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn find_current(&self) -> Result<Option<VmCid>, StateError> {
        Ok(self.store.load()?.current_vm_cid)
    }

    pub fn update_current(&self, cid: &VmCid) -> Result<(), StateError> {
        let mut state = self.store.load()?;
        state.current_vm_cid = Some(cid.clone());
        self.store.save(&state)
    }

    pub fn clear_current(&self) -> Result<(), StateError> {
        let mut state = self.store.load()?;
        if state.current_vm_cid.take().is_some() {
            self.store.save(&state)?;
        }
        Ok(())
    }
}

/// A record kind stored as a list plus a "current" pointer in the state document.
pub trait RecordKind: Clone {
    /// Human-readable kind, used in errors.
    const NAME: &'static str;

    type Id: Clone + PartialEq + Display;
    type Cid: Clone + PartialEq + Display;

    fn id(&self) -> &Self::Id;
    fn cid(&self) -> &Self::Cid;
    fn records(state: &mut DeploymentState) -> &mut Vec<Self>;
    fn current(state: &mut DeploymentState) -> &mut Option<Self::Id>;
}

impl RecordKind for DiskRecord {
    const NAME: &'static str = "disk";

    type Id = DiskId;
    type Cid = DiskCid;

    fn id(&self) -> &DiskId {
        &self.id
    }

    fn cid(&self) -> &DiskCid {
        &self.cid
    }

    fn records(state: &mut DeploymentState) -> &mut Vec<Self> {
        &mut state.disks
    }

    fn current(state: &mut DeploymentState) -> &mut Option<DiskId> {
        &mut state.current_disk_id
    }
}

impl RecordKind for StemcellRecord {
    const NAME: &'static str = "stemcell";

    type Id = StemcellId;
    type Cid = StemcellCid;

    fn id(&self) -> &StemcellId {
        &self.id
    }

    fn cid(&self) -> &StemcellCid {
        &self.cid
    }

    fn records(state: &mut DeploymentState) -> &mut Vec<Self> {
        &mut state.stemcells
    }

    fn current(state: &mut DeploymentState) -> &mut Option<StemcellId> {
        &mut state.current_stemcell_id
    }
}

/// Repository for one record kind.
pub struct RecordRepo<K> {
    store: Arc<dyn StateStore>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for RecordRepo<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

pub type DiskRepo = RecordRepo<DiskRecord>;
pub type StemcellRepo = RecordRepo<StemcellRecord>;

impl<K: RecordKind> RecordRepo<K> {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// The current record, if the pointer is set and the record still exists.
    pub fn find_current(&self) -> Result<Option<K>, StateError> {
        let mut state = self.store.load()?;
        let Some(current) = K::current(&mut state).clone() else {
            return Ok(None);
        };
        Ok(K::records(&mut state)
            .iter()
            .find(|r| r.id() == &current)
            .cloned())
    }

    pub fn update_current(&self, id: &K::Id) -> Result<(), StateError> {
        let mut state = self.store.load()?;
        if !K::records(&mut state).iter().any(|r| r.id() == id) {
            return Err(StateError::RecordNotFound {
                kind: K::NAME,
                id: id.to_string(),
            });
        }
        *K::current(&mut state) = Some(id.clone());
        self.store.save(&state)
    }

    pub fn clear_current(&self) -> Result<(), StateError> {
        let mut state = self.store.load()?;
        if K::current(&mut state).take().is_some() {
            self.store.save(&state)?;
        }
        Ok(())
    }

    pub fn find(&self, cid: &K::Cid) -> Result<Option<K>, StateError> {
        let mut state = self.store.load()?;
        Ok(K::records(&mut state)
            .iter()
            .find(|r| r.cid() == cid)
            .cloned())
    }

    pub fn all(&self) -> Result<Vec<K>, StateError> {
        let mut state = self.store.load()?;
        Ok(std::mem::take(K::records(&mut state)))
    }

    /// Records that are not the current one.
    pub fn unused(&self) -> Result<Vec<K>, StateError> {
        let mut state = self.store.load()?;
        let current = K::current(&mut state).clone();
        Ok(std::mem::take(K::records(&mut state))
            .into_iter()
            .filter(|r| Some(r.id()) != current.as_ref())
            .collect())
    }

    /// Drop a record, clearing the current pointer if it referenced it.
    /// Deleting a record that is already gone is not an error.
    pub fn delete(&self, id: &K::Id) -> Result<(), StateError> {
        let mut state = self.store.load()?;
        let records = K::records(&mut state);
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() != before;

        let current = K::current(&mut state);
        let cleared = current.as_ref() == Some(id);
        if cleared {
            *current = None;
        }

        if removed || cleared {
            self.store.save(&state)?;
        }
        Ok(())
    }

    fn insert(&self, record: K) -> Result<K, StateError> {
        let mut state = self.store.load()?;
        let records = K::records(&mut state);
        if records.iter().any(|r| r.cid() == record.cid()) {
            return Err(StateError::DuplicateCid {
                kind: K::NAME,
                cid: record.cid().to_string(),
            });
        }
        records.push(record.clone());
        self.store.save(&state)?;
        Ok(record)
    }
}

impl RecordRepo<DiskRecord> {
    pub fn save(
        &self,
        cid: &DiskCid,
        size: u64,
        cloud_properties: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DiskRecord, StateError> {
        self.insert(DiskRecord {
            id: DiskId::generate(),
            cid: cid.clone(),
            size,
            cloud_properties,
        })
    }
}

impl RecordRepo<StemcellRecord> {
    pub fn save(
        &self,
        name: &str,
        version: &str,
        cid: &StemcellCid,
        api_version: u32,
    ) -> Result<StemcellRecord, StateError> {
        self.insert(StemcellRecord {
            id: StemcellId::generate(),
            name: name.to_string(),
            version: version.to_string(),
            api_version,
            cid: cid.clone(),
        })
    }
}

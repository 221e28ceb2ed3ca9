use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use timeline_model::{
    canonical_key, new_record_id, Batch, BatchPatch, Equipment, EquipmentPatch, Operation,
    OperationPatch, OwnerInfo, RecordKind,
};
use timeline_store::{tables, Record, RecordStore, Value};

use crate::mapping;
use crate::{DataProvider, ProviderError, Result};

const DEFAULT_STATE_CODE: &str = "0";
const DEFAULT_OPERATION_KIND: &str = "Production";

/// [`DataProvider`] over the embedded [`RecordStore`].
///
/// Owns the store handle it is given at construction; no hidden global
/// lookup.
#[derive(Debug, Clone)]
pub struct LocalDataProvider {
    store: RecordStore,
}

impl LocalDataProvider {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn load_equipment(&self) -> Result<Vec<Equipment>> {
        self.store
            .list(tables::EQUIPMENT)?
            .iter()
            .map(mapping::equipment_from_row)
            .collect()
    }

    fn load_batches(&self) -> Result<Vec<Batch>> {
        self.store
            .list(tables::BATCHES)?
            .iter()
            .map(mapping::batch_from_row)
            .collect()
    }

    fn load_operations(&self) -> Result<Vec<Operation>> {
        self.store
            .list(tables::OPERATIONS)?
            .iter()
            .map(mapping::operation_from_row)
            .collect()
    }
}

#[async_trait]
impl DataProvider for LocalDataProvider {
    async fn get_equipment(&self) -> Result<Vec<Equipment>> {
        self.load_equipment()
    }

    async fn get_batches(&self) -> Result<Vec<Batch>> {
        self.load_batches()
    }

    async fn get_operations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Operation>> {
        // Interval overlap, filtered in SQL against the (start_time,
        // end_time) index.
        self.store
            .list_filtered(
                tables::OPERATIONS,
                "start_time <= ?1 AND end_time >= ?2",
                &[Value::from(end), Value::from(start)],
            )?
            .iter()
            .map(mapping::operation_from_row)
            .collect()
    }

    async fn save_equipment(&self, patch: EquipmentPatch) -> Result<Equipment> {
        let now = Utc::now();
        match patch.id {
            Some(id) => {
                let mut equipment = self
                    .load_equipment()?
                    .into_iter()
                    .find(|eq| eq.id == id)
                    .ok_or(ProviderError::NotFound {
                        kind: RecordKind::Equipment,
                        id: id.clone(),
                    })?;
                if let Some(tag) = patch.tag {
                    equipment.tag = tag;
                }
                if let Some(description) = patch.description {
                    equipment.description = description;
                }
                if let Some(sort_order) = patch.sort_order {
                    equipment.sort_order = sort_order;
                }
                equipment.tag_and_description =
                    Equipment::display_label(&equipment.tag, &equipment.description);
                equipment.modified_on = now;

                let mut row = mapping::equipment_to_row(&equipment);
                row.shift_remove("equipment_id");
                row.shift_remove("created_on");
                self.store.update(tables::EQUIPMENT, "equipment_id", &id, &row)?;
                Ok(equipment)
            }
            None => {
                let next_order = self
                    .load_equipment()?
                    .iter()
                    .map(|eq| eq.sort_order)
                    .max()
                    .map_or(0, |max| max + 1);
                let tag = patch.tag.unwrap_or_default();
                let description = patch.description.unwrap_or_default();
                let equipment = Equipment {
                    id: new_record_id(),
                    tag_and_description: Equipment::display_label(&tag, &description),
                    tag,
                    description,
                    sort_order: patch.sort_order.unwrap_or(next_order),
                    created_on: now,
                    modified_on: now,
                    owner: OwnerInfo::default(),
                    state_code: DEFAULT_STATE_CODE.to_string(),
                };
                self.store
                    .insert(tables::EQUIPMENT, &mapping::equipment_to_row(&equipment))?;
                Ok(equipment)
            }
        }
    }

    async fn save_batch(&self, patch: BatchPatch) -> Result<Batch> {
        let now = Utc::now();
        let existing = self.load_batches()?;

        // Canonical-key uniqueness is enforced here; the store has no notion
        // of it.
        let check_collision = |key: &str, own_id: Option<&str>| -> Result<()> {
            let clash = existing.iter().any(|batch| {
                batch.canonical_key() == key && Some(batch.batches_id.as_str()) != own_id
            });
            if clash {
                Err(ProviderError::DuplicateBatch {
                    key: key.to_string(),
                })
            } else {
                Ok(())
            }
        };

        let target = patch
            .batches_id
            .as_ref()
            .and_then(|id| existing.iter().find(|batch| batch.batches_id == *id))
            .cloned();

        match target {
            Some(mut batch) => {
                if let Some(batch_number) = patch.batch_number {
                    batch.batch_number = batch_number;
                }
                check_collision(
                    canonical_key(&batch.batch_number, &batch.batches_id),
                    Some(&batch.batches_id),
                )?;
                batch.modified_on = now;

                let mut row = mapping::batch_to_row(&batch);
                row.shift_remove("batches_id");
                row.shift_remove("created_on");
                self.store
                    .update(tables::BATCHES, "batches_id", &batch.batches_id, &row)?;
                Ok(batch)
            }
            None => {
                let batch = Batch {
                    batches_id: patch.batches_id.unwrap_or_else(new_record_id),
                    batch_number: patch.batch_number.unwrap_or_default(),
                    created_on: now,
                    modified_on: now,
                    owner: OwnerInfo::default(),
                    state_code: DEFAULT_STATE_CODE.to_string(),
                };
                check_collision(batch.canonical_key(), None)?;
                self.store
                    .insert(tables::BATCHES, &mapping::batch_to_row(&batch))?;
                Ok(batch)
            }
        }
    }

    async fn save_operation(&self, patch: OperationPatch) -> Result<Operation> {
        let now = Utc::now();
        match patch.id.clone() {
            Some(id) => {
                let current = self
                    .load_operations()?
                    .into_iter()
                    .find(|op| op.id == id);
                match current {
                    Some(mut op) => {
                        apply_operation_patch(&mut op, &patch);
                        op.modified_on = now;
                        let mut row = mapping::operation_to_row(&op);
                        row.shift_remove("operations_id");
                        row.shift_remove("created_on");
                        self.store
                            .update(tables::OPERATIONS, "operations_id", &id, &row)?;
                        Ok(op)
                    }
                    None => {
                        // Undo/redo reconciliation re-saves records whose rows
                        // were deleted; re-insert under the supplied id.
                        debug!(id = %id, "re-inserting operation for a known id");
                        let op = new_operation(Some(id), &patch, now);
                        self.store
                            .insert(tables::OPERATIONS, &mapping::operation_to_row(&op))?;
                        Ok(op)
                    }
                }
            }
            None => {
                let op = new_operation(None, &patch, now);
                self.store
                    .insert(tables::OPERATIONS, &mapping::operation_to_row(&op))?;
                Ok(op)
            }
        }
    }

    async fn delete_operation(&self, id: &str) -> Result<()> {
        self.store.delete(tables::OPERATIONS, "operations_id", id)?;
        Ok(())
    }

    async fn delete_equipment(&self, id: &str) -> Result<()> {
        Err(ProviderError::DeletionDisabled {
            kind: RecordKind::Equipment,
            id: id.to_string(),
        })
    }

    async fn delete_batch(&self, id: &str) -> Result<()> {
        Err(ProviderError::DeletionDisabled {
            kind: RecordKind::Batch,
            id: id.to_string(),
        })
    }

    async fn reorder_equipment(&self, ordered_ids: &[String]) -> Result<Vec<Equipment>> {
        let mut equipment = self.load_equipment()?;
        equipment.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.id.cmp(&b.id))
        });

        // Listed ids first, in the requested order; stragglers keep their
        // relative order after them.
        let mut reordered = Vec::with_capacity(equipment.len());
        for id in ordered_ids {
            if let Some(index) = equipment.iter().position(|eq| eq.id == *id) {
                reordered.push(equipment.remove(index));
            }
        }
        reordered.append(&mut equipment);

        let now = Utc::now();
        for (index, eq) in reordered.iter_mut().enumerate() {
            eq.sort_order = index as i64;
            eq.modified_on = now;
            let mut row = Record::new();
            row.insert("sort_order".into(), Value::from(eq.sort_order));
            row.insert("modified_on".into(), Value::from(eq.modified_on));
            self.store
                .update(tables::EQUIPMENT, "equipment_id", &eq.id, &row)?;
        }
        Ok(reordered)
    }
}

fn apply_operation_patch(op: &mut Operation, patch: &OperationPatch) {
    if let Some(equipment_id) = &patch.equipment_id {
        op.equipment_id = equipment_id.clone();
    }
    if let Some(batch_id) = &patch.batch_id {
        op.batch_id = batch_id.clone();
    }
    if let Some(start_time) = patch.start_time {
        op.start_time = start_time;
    }
    if let Some(end_time) = patch.end_time {
        op.end_time = end_time;
    }
    if let Some(kind) = &patch.kind {
        op.kind = kind.clone();
    }
    if let Some(description) = &patch.description {
        op.description = description.clone();
    }
}

fn new_operation(id: Option<String>, patch: &OperationPatch, now: DateTime<Utc>) -> Operation {
    Operation {
        id: id.unwrap_or_else(new_record_id),
        equipment_id: patch.equipment_id.clone().unwrap_or_default(),
        batch_id: patch.batch_id.clone().unwrap_or(None),
        start_time: patch.start_time.unwrap_or(now),
        end_time: patch.end_time.unwrap_or(now),
        kind: patch
            .kind
            .clone()
            .unwrap_or_else(|| DEFAULT_OPERATION_KIND.to_string()),
        description: patch.description.clone().unwrap_or_default(),
        created_on: now,
        modified_on: now,
        state_code: DEFAULT_STATE_CODE.to_string(),
        status_code: DEFAULT_STATE_CODE.to_string(),
    }
}

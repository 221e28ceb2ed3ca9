//! Typed row mapping at the provider boundary.
//!
//! Store rows are duck-typed property bags; nothing untyped leaks past this
//! module. A row that cannot be mapped is a [`ProviderError::Corrupt`].

use chrono::{DateTime, Utc};

use timeline_model::{Batch, Equipment, Operation, OwnerInfo, RecordKind};
use timeline_store::{Record, Value};

use crate::{ProviderError, Result};

pub(crate) fn equipment_from_row(row: &Record) -> Result<Equipment> {
    const KIND: RecordKind = RecordKind::Equipment;
    Ok(Equipment {
        id: required_text(KIND, row, "equipment_id")?,
        tag: required_text(KIND, row, "tag")?,
        description: optional_text(row, "description").unwrap_or_default(),
        tag_and_description: optional_text(row, "tag_and_description").unwrap_or_default(),
        sort_order: optional_integer(row, "sort_order").unwrap_or(0),
        created_on: required_timestamp(KIND, row, "created_on")?,
        modified_on: required_timestamp(KIND, row, "modified_on")?,
        owner: owner_from_row(row),
        state_code: optional_text(row, "state_code").unwrap_or_default(),
    })
}

pub(crate) fn equipment_to_row(equipment: &Equipment) -> Record {
    let mut row = Record::new();
    row.insert("equipment_id".into(), Value::from(equipment.id.clone()));
    row.insert("tag".into(), Value::from(equipment.tag.clone()));
    row.insert(
        "description".into(),
        Value::from(equipment.description.clone()),
    );
    row.insert(
        "tag_and_description".into(),
        Value::from(equipment.tag_and_description.clone()),
    );
    row.insert("sort_order".into(), Value::from(equipment.sort_order));
    row.insert("created_on".into(), Value::from(equipment.created_on));
    row.insert("modified_on".into(), Value::from(equipment.modified_on));
    owner_to_row(&mut row, &equipment.owner);
    row.insert("state_code".into(), Value::from(equipment.state_code.clone()));
    row
}

pub(crate) fn batch_from_row(row: &Record) -> Result<Batch> {
    const KIND: RecordKind = RecordKind::Batch;
    Ok(Batch {
        batches_id: required_text(KIND, row, "batches_id")?,
        batch_number: optional_text(row, "batch_number").unwrap_or_default(),
        created_on: required_timestamp(KIND, row, "created_on")?,
        modified_on: required_timestamp(KIND, row, "modified_on")?,
        owner: owner_from_row(row),
        state_code: optional_text(row, "state_code").unwrap_or_default(),
    })
}

pub(crate) fn batch_to_row(batch: &Batch) -> Record {
    let mut row = Record::new();
    row.insert("batches_id".into(), Value::from(batch.batches_id.clone()));
    row.insert("batch_number".into(), Value::from(batch.batch_number.clone()));
    row.insert("created_on".into(), Value::from(batch.created_on));
    row.insert("modified_on".into(), Value::from(batch.modified_on));
    owner_to_row(&mut row, &batch.owner);
    row.insert("state_code".into(), Value::from(batch.state_code.clone()));
    row
}

pub(crate) fn operation_from_row(row: &Record) -> Result<Operation> {
    const KIND: RecordKind = RecordKind::Operation;
    Ok(Operation {
        id: required_text(KIND, row, "operations_id")?,
        equipment_id: optional_text(row, "equipment_id").unwrap_or_default(),
        batch_id: optional_text(row, "batch_id"),
        start_time: required_timestamp(KIND, row, "start_time")?,
        end_time: required_timestamp(KIND, row, "end_time")?,
        kind: optional_text(row, "kind").unwrap_or_default(),
        description: optional_text(row, "description").unwrap_or_default(),
        created_on: required_timestamp(KIND, row, "created_on")?,
        modified_on: required_timestamp(KIND, row, "modified_on")?,
        state_code: optional_text(row, "state_code").unwrap_or_default(),
        status_code: optional_text(row, "status_code").unwrap_or_default(),
    })
}

pub(crate) fn operation_to_row(op: &Operation) -> Record {
    let mut row = Record::new();
    row.insert("operations_id".into(), Value::from(op.id.clone()));
    row.insert("equipment_id".into(), Value::from(op.equipment_id.clone()));
    row.insert("batch_id".into(), Value::from(op.batch_id.clone()));
    row.insert("start_time".into(), Value::from(op.start_time));
    row.insert("end_time".into(), Value::from(op.end_time));
    row.insert("kind".into(), Value::from(op.kind.clone()));
    row.insert("description".into(), Value::from(op.description.clone()));
    row.insert("created_on".into(), Value::from(op.created_on));
    row.insert("modified_on".into(), Value::from(op.modified_on));
    row.insert("state_code".into(), Value::from(op.state_code.clone()));
    row.insert("status_code".into(), Value::from(op.status_code.clone()));
    row
}

fn owner_from_row(row: &Record) -> OwnerInfo {
    OwnerInfo {
        id: optional_text(row, "owner_id").unwrap_or_default(),
        name: optional_text(row, "owner_name").unwrap_or_default(),
        kind: optional_text(row, "owner_kind").unwrap_or_default(),
        yomi_name: optional_text(row, "owner_yomi_name").unwrap_or_default(),
    }
}

fn owner_to_row(row: &mut Record, owner: &OwnerInfo) {
    row.insert("owner_id".into(), Value::from(owner.id.clone()));
    row.insert("owner_name".into(), Value::from(owner.name.clone()));
    row.insert("owner_kind".into(), Value::from(owner.kind.clone()));
    row.insert(
        "owner_yomi_name".into(),
        Value::from(owner.yomi_name.clone()),
    );
}

fn required_text(kind: RecordKind, row: &Record, column: &str) -> Result<String> {
    optional_text(row, column).ok_or_else(|| ProviderError::Corrupt {
        kind,
        detail: format!("missing text column {column}"),
    })
}

fn optional_text(row: &Record, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

fn optional_integer(row: &Record, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_integer)
}

fn required_timestamp(kind: RecordKind, row: &Record, column: &str) -> Result<DateTime<Utc>> {
    let text = required_text(kind, row, column)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| ProviderError::Corrupt {
            kind,
            detail: format!("unparseable timestamp in {column}: {err}"),
        })
}

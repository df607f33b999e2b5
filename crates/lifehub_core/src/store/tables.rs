//! Table record and schema operations.
//!
//! Every operation here addresses the table by its payload id (`Table::id`),
//! not by the wrapping item id.

use super::{AppStore, PropertyDefinitionPatch, StoreError, StoreResult};
use crate::model::now_epoch_ms;
use crate::model::table::{
    PropertyDefinition, PropertyId, PropertyValue, RecordId, Table, TableId, TableRecord,
};
use crate::repo::state_repo::StateRepository;
use crate::validate::{validate_record_values, ValidationPolicy};
use log::debug;
use std::collections::HashSet;

impl<R: StateRepository> AppStore<R> {
    /// Appends a record with a fresh id and no tags.
    pub fn add_table_record(
        &mut self,
        table_id: TableId,
        properties: Vec<PropertyValue>,
    ) -> StoreResult<TableRecord> {
        let policy = self.policy;
        let record = self.edit_table(table_id, |table| {
            check_record_values(policy, table, &properties)?;
            let record = TableRecord::new(table.id, properties);
            table.records.push(record.clone());
            Ok(record)
        })?;

        debug!(
            "event=record_add module=store status=ok table_id={} record_id={} cells={}",
            table_id,
            record.id,
            record.properties.len()
        );
        self.commit("record_add");
        Ok(record)
    }

    /// Replaces the whole `properties` list of one record.
    ///
    /// Cells omitted from `properties` are dropped, not kept.
    pub fn update_table_record(
        &mut self,
        table_id: TableId,
        record_id: RecordId,
        properties: Vec<PropertyValue>,
    ) -> StoreResult<()> {
        let policy = self.policy;
        self.edit_table(table_id, |table| {
            check_record_values(policy, table, &properties)?;
            let record = record_mut(table, record_id)?;
            record.properties = properties;
            record.updated_at = now_epoch_ms();
            Ok(())
        })?;

        debug!(
            "event=record_update module=store status=ok table_id={} record_id={}",
            table_id, record_id
        );
        self.commit("record_update");
        Ok(())
    }

    pub fn delete_table_record(
        &mut self,
        table_id: TableId,
        record_id: RecordId,
    ) -> StoreResult<TableRecord> {
        let removed = self.edit_table(table_id, |table| {
            let index = table
                .records
                .iter()
                .position(|record| record.id == record_id)
                .ok_or(StoreError::RecordNotFound {
                    table_id,
                    record_id,
                })?;
            Ok(table.records.remove(index))
        })?;

        debug!(
            "event=record_delete module=store status=ok table_id={} record_id={}",
            table_id, record_id
        );
        self.commit("record_delete");
        Ok(removed)
    }

    /// Appends one column to the schema. Existing records are left as-is.
    pub fn add_property_definition(
        &mut self,
        table_id: TableId,
        definition: PropertyDefinition,
    ) -> StoreResult<()> {
        self.check_name("property name", &definition.name)?;
        let property_id = definition.id;
        self.edit_table(table_id, |table| {
            if table.definition(property_id).is_some() {
                return Err(StoreError::DuplicateProperty {
                    table_id,
                    property_id,
                });
            }
            table.property_definitions.push(definition);
            Ok(())
        })?;

        debug!(
            "event=property_add module=store status=ok table_id={} property_id={}",
            table_id, property_id
        );
        self.commit("property_add");
        Ok(())
    }

    /// Merges `patch` into one column definition.
    ///
    /// Existing cells are not re-validated against a changed type.
    pub fn update_property_definition(
        &mut self,
        table_id: TableId,
        property_id: PropertyId,
        patch: PropertyDefinitionPatch,
    ) -> StoreResult<()> {
        if let Some(name) = patch.name.as_deref() {
            self.check_name("property name", name)?;
        }
        self.edit_table(table_id, |table| {
            let definition = table
                .property_definitions
                .iter_mut()
                .find(|definition| definition.id == property_id)
                .ok_or(StoreError::PropertyNotFound {
                    table_id,
                    property_id,
                })?;
            patch.apply_to(definition);
            Ok(())
        })?;

        debug!(
            "event=property_update module=store status=ok table_id={} property_id={}",
            table_id, property_id
        );
        self.commit("property_update");
        Ok(())
    }

    /// Removes one column and every record cell that references it.
    pub fn delete_property_definition(
        &mut self,
        table_id: TableId,
        property_id: PropertyId,
    ) -> StoreResult<PropertyDefinition> {
        let (removed, touched_records) = self.edit_table(table_id, |table| {
            let index = table
                .property_definitions
                .iter()
                .position(|definition| definition.id == property_id)
                .ok_or(StoreError::PropertyNotFound {
                    table_id,
                    property_id,
                })?;
            let removed = table.property_definitions.remove(index);

            let now = now_epoch_ms();
            let mut touched_records = 0usize;
            for record in &mut table.records {
                let before = record.properties.len();
                record
                    .properties
                    .retain(|cell| cell.property_id != property_id);
                if record.properties.len() != before {
                    record.updated_at = now;
                    touched_records += 1;
                }
            }
            Ok((removed, touched_records))
        })?;

        debug!(
            "event=property_delete module=store status=ok table_id={} property_id={} touched_records={}",
            table_id, property_id, touched_records
        );
        self.commit("property_delete");
        Ok(removed)
    }
}

/// Enforces one cell per property always, and schema fit under `Strict`.
fn check_record_values(
    policy: ValidationPolicy,
    table: &Table,
    values: &[PropertyValue],
) -> StoreResult<()> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = values.iter().find(|cell| !seen.insert(cell.property_id)) {
        return Err(StoreError::DuplicateProperty {
            table_id: table.id,
            property_id: duplicate.property_id,
        });
    }
    if policy.is_strict() {
        validate_record_values(&table.property_definitions, values)?;
    }
    Ok(())
}

pub(super) fn record_mut(table: &mut Table, record_id: RecordId) -> StoreResult<&mut TableRecord> {
    let table_id = table.id;
    table
        .records
        .iter_mut()
        .find(|record| record.id == record_id)
        .ok_or(StoreError::RecordNotFound {
            table_id,
            record_id,
        })
}

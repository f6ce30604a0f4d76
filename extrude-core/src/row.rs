use crate::{Error, ErrorContext, Key, Reflect, Result, TypeDescriptor, Value};
use std::sync::Arc;

/// Shared column names of a result set.
pub type RowNames = Arc<[String]>;
/// Values of one row.
pub type Row = Box<[Value]>;

/// A row with its column names.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
}

impl TypeDescriptor {
    /// Every column value of `instance`, in column order.
    pub fn row(&self, instance: &dyn Reflect) -> Result<Row> {
        self.check(instance)?;
        self.fields()
            .iter()
            .map(|field| {
                field
                    .value(instance)
                    .ok_or_else(|| {
                        Error::msg(format!(
                            "Cannot read field `{}` of {}",
                            field.name, self.type_name
                        ))
                    })?
                    .get_value()
                    .with_context(|| format!("While reading column `{}`", field.name))
            })
            .collect()
    }

    /// Same as [`TypeDescriptor::row`], labeled with the column names.
    pub fn row_labeled(&self, instance: &dyn Reflect) -> Result<RowLabeled> {
        Ok(RowLabeled::new(self.labels.clone(), self.row(instance)?))
    }

    /// Write the values of `row` into `instance`, labels that are not columns are ignored.
    pub fn assign(&self, instance: &mut dyn Reflect, row: &RowLabeled) -> Result<()> {
        self.check(instance)?;
        for (label, value) in row.labels.iter().zip(row.values.iter()) {
            let Some(field) = self.field(label) else {
                continue;
            };
            field
                .value_mut(instance)
                .ok_or_else(|| {
                    Error::msg(format!(
                        "Cannot write field `{}` of {}",
                        field.name, self.type_name
                    ))
                })?
                .set_value(value.clone())
                .with_context(|| format!("While assigning column `{}`", field.name))?;
        }
        Ok(())
    }

    /// Build a new record out of `row`, columns absent from the row keep their default.
    pub fn from_row<T: Reflect + Default>(&self, row: &RowLabeled) -> Result<T> {
        let mut result = T::default();
        self.assign(&mut result, row)?;
        Ok(result)
    }

    /// Key of a row read from this descriptor's table.
    pub fn row_key(&self, row: &RowLabeled) -> Result<Key> {
        let parts = self
            .primary_key()
            .map(|field| {
                row.get_column(field.name).cloned().ok_or_else(|| {
                    Error::msg(format!(
                        "Column `{}` does not exist in the row provided",
                        field.name
                    ))
                })
            })
            .collect::<Result<Box<[Value]>>>()?;
        Ok(Key::new(self.table, parts))
    }
}

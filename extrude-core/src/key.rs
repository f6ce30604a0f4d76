use crate::{Reflect, Result, TypeDescriptor, Value};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// Table name and primary key values of one row.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    table: Cow<'static, str>,
    parts: Box<[Value]>,
}

impl Key {
    pub fn new(table: impl Into<Cow<'static, str>>, parts: impl Into<Box<[Value]>>) -> Self {
        Self {
            table: table.into(),
            parts: parts.into(),
        }
    }
    pub fn table(&self) -> &str {
        &self.table
    }
    pub fn parts(&self) -> &[Value] {
        &self.parts
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.table)?;
        for (i, v) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str(")")
    }
}

impl TypeDescriptor {
    /// Primary key of `instance`, in primary key order.
    pub fn extract_key(&self, instance: &dyn Reflect) -> Result<Key> {
        self.check(instance)?;
        let parts = self
            .primary_key()
            .map(|field| match field.value(instance) {
                Some(v) => v.get_value(),
                None => Err(crate::Error::msg(format!(
                    "Cannot read field `{}` of {}",
                    field.name, self.type_name
                ))),
            })
            .collect::<Result<Box<[Value]>>>()?;
        Ok(Key::new(self.table, parts))
    }
}

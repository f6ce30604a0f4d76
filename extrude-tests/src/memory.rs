use extrude::{
    CreateDatabase, Error, Executor, Key, Mutation, ReadRequest, Result, Row, RowLabeled, Value,
    WriteKind,
    stream::{self, Stream},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

#[derive(Default, Clone, Debug)]
struct Table {
    columns: Vec<String>,
    primary_key: Vec<usize>,
    rows: Vec<(Box<[Value]>, Row)>,
}

impl Table {
    /// Parse the statements rendered by `extrude::write_create_table`.
    fn parse(statement: &str) -> Result<(String, Table)> {
        let context = || format!("Cannot parse `{}`", statement);
        let mut lines = statement.lines();
        let name = lines
            .next()
            .and_then(|v| v.strip_prefix("CREATE TABLE "))
            .and_then(|v| v.strip_suffix(" ("))
            .ok_or_else(|| Error::msg(context()))?;
        let mut table = Table::default();
        for line in lines {
            if let Some(column) = line.strip_prefix('\t') {
                let column = column.split('\t').next().unwrap_or_default();
                table.columns.push(column.to_string());
            } else if let Some(primary_key) = line
                .strip_prefix(") PRIMARY KEY (")
                .and_then(|v| v.strip_suffix(')'))
            {
                for column in primary_key.split(", ").filter(|v| !v.is_empty()) {
                    let Some(i) = table.columns.iter().position(|v| v == column) else {
                        return Err(Error::msg(format!(
                            "Primary key column `{}` is not declared",
                            column
                        ))
                        .context(context()));
                    };
                    table.primary_key.push(i);
                }
            } else {
                return Err(Error::msg(format!("Unexpected line `{}`", line)).context(context()));
            }
        }
        Ok((name.to_string(), table))
    }

    fn position(&self, key: &[Value]) -> Option<usize> {
        self.rows.iter().position(|(k, _)| k.as_ref() == key)
    }

    fn write(&mut self, kind: WriteKind, table: &str, columns: &[String], values: &Row) -> Result<()> {
        let mut row: Row = vec![Value::Null; self.columns.len()].into_boxed_slice();
        for (column, value) in columns.iter().zip(values.iter()) {
            let Some(i) = self.columns.iter().position(|v| v == column) else {
                return Err(Error::msg(format!(
                    "Column `{}` does not exist in table {}",
                    column, table
                )));
            };
            row[i] = value.clone();
        }
        let key: Box<[Value]> = self.primary_key.iter().map(|i| row[*i].clone()).collect();
        let position = self.position(&key);
        match (kind, position) {
            (WriteKind::Insert, Some(..)) => {
                return Err(Error::msg(format!(
                    "Row {} already exists",
                    Key::new(table.to_string(), key)
                )));
            }
            (WriteKind::Update, None) => {
                return Err(Error::msg(format!(
                    "Row {} does not exist",
                    Key::new(table.to_string(), key)
                )));
            }
            (WriteKind::Update | WriteKind::InsertOrUpdate, Some(i)) => {
                let existing = &mut self.rows[i].1;
                for column in columns {
                    if let Some(c) = self.columns.iter().position(|v| v == column) {
                        existing[c] = row[c].clone();
                    }
                }
            }
            (WriteKind::Insert | WriteKind::InsertOrUpdate, None) => {
                self.rows.push((key, row));
            }
        }
        Ok(())
    }
}

#[derive(Default, Debug)]
struct State {
    databases: Vec<CreateDatabase>,
    tables: HashMap<String, Table>,
}

/// Executor keeping every table in memory.
///
/// Clones share the same storage, keep one around to inspect what a
/// `Session` wrote.
#[derive(Default, Clone, Debug)]
pub struct MemoryExecutor {
    state: Arc<Mutex<State>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Every database creation request received so far.
    pub fn databases(&self) -> Vec<CreateDatabase> {
        self.with_state(|state| state.databases.clone())
    }

    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<_> = self.with_state(|state| state.tables.keys().cloned().collect());
        tables.sort();
        tables
    }

    /// Number of rows stored in `table`, `None` if it does not exist.
    pub fn rows(&self, table: &str) -> Option<usize> {
        self.with_state(|state| state.tables.get(table).map(|v| v.rows.len()))
    }

    fn lookup(&self, request: &ReadRequest) -> Result<Vec<RowLabeled>> {
        self.with_state(|state| {
            let Some(table) = state.tables.get(request.table.as_ref()) else {
                return Err(Error::msg(format!("Table {} does not exist", request.table)));
            };
            let projection = request
                .columns
                .iter()
                .map(|column| {
                    table.columns.iter().position(|v| v == column).ok_or_else(|| {
                        Error::msg(format!(
                            "Column `{}` does not exist in table {}",
                            column, request.table
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(request
                .keys
                .iter()
                .filter_map(|key| table.position(key.parts()))
                .map(|i| {
                    let row = &table.rows[i].1;
                    RowLabeled::new(
                        request.columns.clone(),
                        projection.iter().map(|c| row[*c].clone()).collect(),
                    )
                })
                .collect())
        })
    }
}

impl Executor for MemoryExecutor {
    async fn create_database(&mut self, request: CreateDatabase) -> Result<()> {
        let tables = request
            .extra_statements
            .iter()
            .map(|v| Table::parse(v))
            .collect::<Result<Vec<_>>>()?;
        self.with_state(|state| {
            if state
                .databases
                .iter()
                .any(|v| v.parent == request.parent && v.statement == request.statement)
            {
                return Err(Error::msg(format!(
                    "Database already exists: {}",
                    request.statement
                )));
            }
            for (name, table) in tables {
                if state.tables.contains_key(&name) {
                    return Err(Error::msg(format!("Table {} already exists", name)));
                }
                state.tables.insert(name, table);
            }
            log::debug!("Created the database with {}", request.statement);
            state.databases.push(request);
            Ok(())
        })
    }

    async fn apply(&mut self, mutations: Vec<Mutation>) -> Result<()> {
        self.with_state(|state| {
            let mut tables = state.tables.clone();
            for mutation in &mutations {
                let Some(table) = tables.get_mut(mutation.table()) else {
                    return Err(Error::msg(format!(
                        "Table {} does not exist",
                        mutation.table()
                    )));
                };
                match mutation {
                    Mutation::Write {
                        kind,
                        table: name,
                        columns,
                        values,
                    } => table.write(*kind, name, columns, values)?,
                    Mutation::Delete(key) => {
                        if let Some(i) = table.position(key.parts()) {
                            table.rows.remove(i);
                        }
                    }
                }
            }
            state.tables = tables;
            Ok(())
        })
    }

    fn read(&mut self, request: ReadRequest) -> impl Stream<Item = Result<RowLabeled>> + Send {
        let rows = match self.lookup(&request) {
            Ok(rows) => rows.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(rows)
    }
}

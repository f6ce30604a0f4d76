use crate::{Key, Result, Row, RowLabeled, RowNames, stream::Stream};
use std::{borrow::Cow, future::Future};

/// Request to create a database together with its tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateDatabase {
    /// `projects/<project>/instances/<instance>`.
    pub parent: String,
    /// ``CREATE DATABASE `<name>` ``.
    pub statement: String,
    /// One `CREATE TABLE` per record type.
    pub extra_statements: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriteKind {
    /// Fails if the row exists.
    Insert,
    /// Fails if the row does not exist.
    Update,
    InsertOrUpdate,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Write {
        kind: WriteKind,
        table: Cow<'static, str>,
        columns: RowNames,
        values: Row,
    },
    Delete(Key),
}

impl Mutation {
    pub fn table(&self) -> &str {
        match self {
            Mutation::Write { table, .. } => table,
            Mutation::Delete(key) => key.table(),
        }
    }
}

/// Point read of rows by primary key.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadRequest {
    pub table: Cow<'static, str>,
    pub keys: Vec<Key>,
    /// Projection, the labels of the returned rows.
    pub columns: RowNames,
}

/// Database client the session hands statements, mutations and reads to.
pub trait Executor: Send {
    fn create_database(&mut self, request: CreateDatabase)
    -> impl Future<Output = Result<()>> + Send;

    /// Apply every mutation or none of them.
    fn apply(&mut self, mutations: Vec<Mutation>) -> impl Future<Output = Result<()>> + Send;

    /// Rows found for the requested keys, missing keys produce no row.
    fn read(&mut self, request: ReadRequest) -> impl Stream<Item = Result<RowLabeled>> + Send;
}

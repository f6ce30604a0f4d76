use crate::{
    CreateDatabase, DatabaseConfig, DescriptorCache, ErrorContext, Executor, ExtrudeError, Key,
    Mutation, ReadRequest, Reflect, Result, RowLabeled, TypeDescriptor, TypeInfo, WriteKind,
    stream::TryStreamExt, truncate_long,
};
use std::sync::Arc;

/// Record level operations on top of an [`Executor`].
///
/// Records are passed as `&dyn Reflect`, the table, key and row of each one
/// come from its descriptor in the shared [`DescriptorCache`]. Every call is a
/// single executor round trip and fails as a whole.
pub struct Session<E: Executor> {
    executor: E,
    config: DatabaseConfig,
    cache: Arc<DescriptorCache>,
}

impl<E: Executor> Session<E> {
    pub fn new(executor: E, config: DatabaseConfig) -> Self {
        Self::with_cache(executor, config, Default::default())
    }

    pub fn with_cache(executor: E, config: DatabaseConfig, cache: Arc<DescriptorCache>) -> Self {
        Self {
            executor,
            config,
            cache,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Table the record is stored in.
    pub fn table(&self, instance: &dyn Reflect) -> Result<&'static str> {
        Ok(self.cache.describe_of(instance)?.table())
    }

    pub fn key(&self, instance: &dyn Reflect) -> Result<Key> {
        self.cache.describe_of(instance)?.extract_key(instance)
    }

    /// Create the configured database with one table for each of the `types`.
    pub async fn create_database(&mut self, types: &[TypeInfo]) -> Result<()> {
        let extra_statements = types
            .iter()
            .map(|v| Ok(self.cache.describe_type(v)?.create_table()))
            .collect::<Result<Vec<_>>>()?;
        let request = CreateDatabase {
            parent: self.config.parent(),
            statement: self.config.create_statement(),
            extra_statements,
        };
        log::debug!("{}", truncate_long!(request.statement));
        for statement in &request.extra_statements {
            log::debug!("{}", truncate_long!(statement));
        }
        let context = format!("While creating the database {}", self.config.path());
        self.executor
            .create_database(request)
            .await
            .map_err(|e| {
                let e = e.context(context);
                log::error!("{:#}", e);
                e
            })
    }

    /// Insert a new row, fails if the key is already present.
    pub async fn insert(&mut self, instance: &dyn Reflect) -> Result<Key> {
        self.write(WriteKind::Insert, instance).await
    }

    /// Overwrite an existing row, fails if the key is not present.
    pub async fn update(&mut self, instance: &dyn Reflect) -> Result<Key> {
        self.write(WriteKind::Update, instance).await
    }

    pub async fn insert_or_update(&mut self, instance: &dyn Reflect) -> Result<Key> {
        self.write(WriteKind::InsertOrUpdate, instance).await
    }

    /// Insert every record of the sequence `instances`.
    pub async fn insert_multi(&mut self, instances: &dyn Reflect) -> Result<Vec<Key>> {
        self.write_multi(WriteKind::Insert, instances).await
    }

    pub async fn update_multi(&mut self, instances: &dyn Reflect) -> Result<Vec<Key>> {
        self.write_multi(WriteKind::Update, instances).await
    }

    pub async fn insert_or_update_multi(&mut self, instances: &dyn Reflect) -> Result<Vec<Key>> {
        self.write_multi(WriteKind::InsertOrUpdate, instances).await
    }

    /// Read the row with the key of `instance` and write its columns back.
    pub async fn get(&mut self, instance: &mut dyn Reflect) -> Result<()> {
        let descriptor = self.cache.describe_of(instance)?;
        let key = descriptor.extract_key(instance)?;
        let rows = self.read(&descriptor, vec![key.clone()]).await?;
        let row = rows
            .into_iter()
            .find_map(|(k, row)| (k == key).then_some(row))
            .ok_or(ExtrudeError::NotFound { key })?;
        let snapshot = descriptor.row_labeled(instance)?;
        if let Err(e) = descriptor.assign(instance, &row) {
            restore(&descriptor, instance, &snapshot);
            return Err(e);
        }
        Ok(())
    }

    /// Same as [`Session::get`] for every record of the sequence `instances`.
    ///
    /// Nothing is written unless every row is found, a record that fails to
    /// take its row leaves every record of the sequence as it was.
    pub async fn get_multi(&mut self, instances: &mut dyn Reflect) -> Result<()> {
        let len = sequence_len(instances)?;
        let Some(first) = instances.target().element(0) else {
            return Ok(());
        };
        let descriptor = self.cache.describe_of(first)?;
        let keys = (0..len)
            .map(|i| descriptor.extract_key(element(instances, i)?))
            .collect::<Result<Vec<_>>>()?;
        let rows = self.read(&descriptor, keys.clone()).await?;
        let mut matched = Vec::with_capacity(len);
        for key in keys {
            let Some((_, row)) = rows.iter().find(|(k, _)| *k == key) else {
                return Err(ExtrudeError::NotFound { key }.into());
            };
            matched.push(row);
        }
        let snapshots = (0..len)
            .map(|i| descriptor.row_labeled(element(instances, i)?))
            .collect::<Result<Vec<_>>>()?;
        let target = instances.target_mut();
        for (i, row) in matched.into_iter().enumerate() {
            let result = element_mut(target, i).and_then(|v| descriptor.assign(v, row));
            if let Err(e) = result {
                for (j, snapshot) in snapshots.iter().enumerate().take(i + 1) {
                    if let Some(instance) = target.element_mut(j) {
                        restore(&descriptor, instance, snapshot);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub async fn delete(&mut self, key: Key) -> Result<()> {
        self.apply(vec![Mutation::Delete(key)]).await
    }

    pub async fn delete_multi(&mut self, keys: Vec<Key>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.apply(keys.into_iter().map(Mutation::Delete).collect())
            .await
    }

    async fn write(&mut self, kind: WriteKind, instance: &dyn Reflect) -> Result<Key> {
        let (mutation, key) = self.mutation(kind, instance)?;
        self.apply(vec![mutation]).await?;
        Ok(key)
    }

    async fn write_multi(&mut self, kind: WriteKind, instances: &dyn Reflect) -> Result<Vec<Key>> {
        let len = sequence_len(instances)?;
        let mut mutations = Vec::with_capacity(len);
        let mut keys = Vec::with_capacity(len);
        for i in 0..len {
            let (mutation, key) = self.mutation(kind, element(instances, i)?)?;
            mutations.push(mutation);
            keys.push(key);
        }
        if !mutations.is_empty() {
            self.apply(mutations).await?;
        }
        Ok(keys)
    }

    fn mutation(&self, kind: WriteKind, instance: &dyn Reflect) -> Result<(Mutation, Key)> {
        let descriptor = self.cache.describe_of(instance)?;
        let key = descriptor.extract_key(instance)?;
        let values = descriptor.row(instance)?;
        Ok((
            Mutation::Write {
                kind,
                table: descriptor.table().into(),
                columns: descriptor.labels().clone(),
                values,
            },
            key,
        ))
    }

    async fn apply(&mut self, mutations: Vec<Mutation>) -> Result<()> {
        log::debug!(
            "Applying {} mutations to {}",
            mutations.len(),
            self.config.database
        );
        let context = format!(
            "While applying {} mutations to {}",
            mutations.len(),
            self.config.path()
        );
        self.executor.apply(mutations).await.map_err(|e| {
            let e = e.context(context);
            log::error!("{:#}", e);
            e
        })
    }

    /// Rows of `keys` paired with their own key, in the order the executor returned them.
    async fn read(
        &mut self,
        descriptor: &TypeDescriptor,
        keys: Vec<Key>,
    ) -> Result<Vec<(Key, RowLabeled)>> {
        let request = ReadRequest {
            table: descriptor.table().into(),
            keys,
            columns: descriptor.labels().clone(),
        };
        log::debug!(
            "Reading {} keys from {}",
            request.keys.len(),
            request.table
        );
        let context = format!("While reading from {}", request.table);
        let rows = self
            .executor
            .read(request)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| {
                let e = e.context(context);
                log::error!("{:#}", e);
                e
            })?;
        rows.into_iter()
            .map(|row| Ok((descriptor.row_key(&row)?, row)))
            .collect()
    }
}

fn sequence_len(instances: &dyn Reflect) -> Result<usize> {
    instances.target().sequence_len().ok_or_else(|| {
        ExtrudeError::UnsupportedShape {
            type_name: instances.reflect_type().name,
        }
        .into()
    })
}

fn element(instances: &dyn Reflect, index: usize) -> Result<&dyn Reflect> {
    instances
        .target()
        .element(index)
        .with_context(|| format!("Cannot read element {} of the sequence", index))
}

fn element_mut(instances: &mut dyn Reflect, index: usize) -> Result<&mut dyn Reflect> {
    instances
        .element_mut(index)
        .with_context(|| format!("Cannot write element {} of the sequence", index))
}

/// Put back the columns of `instance` read before a failed assignment.
fn restore(descriptor: &TypeDescriptor, instance: &mut dyn Reflect, snapshot: &RowLabeled) {
    if let Err(e) = descriptor.assign(instance, snapshot) {
        log::error!(
            "Could not restore {} after a failed read: {:#}",
            descriptor.type_name(),
            e
        );
    }
}

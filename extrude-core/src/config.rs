use crate::{Error, ErrorContext, Result};
use std::{env, str::FromStr};
use url::Url;
use urlencoding::decode;

/// Location of a Spanner database.
///
/// Parsed from `spanner://<project>/<instance>/<database>` or read from the
/// `GCLOUD_PROJECT_ID`, `GCLOUD_SPANNER_INSTANCE` and `GCLOUD_SPANNER_DBNAME`
/// environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseConfig {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl DatabaseConfig {
    pub const SCHEME: &'static str = "spanner";
    pub const PROJECT_VAR: &'static str = "GCLOUD_PROJECT_ID";
    pub const INSTANCE_VAR: &'static str = "GCLOUD_SPANNER_INSTANCE";
    pub const DATABASE_VAR: &'static str = "GCLOUD_SPANNER_DBNAME";

    pub fn new(
        project: impl Into<String>,
        instance: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            instance: instance.into(),
            database: database.into(),
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While parsing the database url `{}`", url);
        let prefix = format!("{}://", Self::SCHEME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!("Database url must start with `{}`", &prefix))
                .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let parsed = Url::parse(url).with_context(context)?;
        let project = parsed.host_str().unwrap_or_default();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|v| v.filter(|v| !v.is_empty()).collect())
            .unwrap_or_default();
        let [instance, database] = segments.as_slice() else {
            let error = Error::msg(format!(
                "Database url must have the form `{}<project>/<instance>/<database>`",
                &prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        };
        if project.is_empty() {
            let error = Error::msg("Database url is missing the project").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Self::new(
            decode(project).with_context(context)?,
            decode(instance).with_context(context)?,
            decode(database).with_context(context)?,
        ))
    }

    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            env::var(name).with_context(|| format!("Environment variable `{}` is not set", name))
        };
        Ok(Self::new(
            var(Self::PROJECT_VAR)?,
            var(Self::INSTANCE_VAR)?,
            var(Self::DATABASE_VAR)?,
        ))
    }

    /// `projects/<project>/instances/<instance>`.
    pub fn parent(&self) -> String {
        format!("projects/{}/instances/{}", self.project, self.instance)
    }

    /// `projects/<project>/instances/<instance>/databases/<database>`.
    pub fn path(&self) -> String {
        format!("{}/databases/{}", self.parent(), self.database)
    }

    pub fn create_statement(&self) -> String {
        format!("CREATE DATABASE `{}`", self.database)
    }
}

impl FromStr for DatabaseConfig {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_url(s)
    }
}

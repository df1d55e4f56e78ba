use std::sync::Arc;
use tokio::time::Duration;

use crate::config::Config;
use crate::schema::FieldSchema;
use crate::source::{JsonFile, StaticText};
use crate::store::Store;
use crate::Error;

/// Everything a command needs: the shared record store plus the configuration that is fixed for
/// the lifetime of the process. Cloning is cheap; every connection holds its own clone.
#[derive(Clone)]
pub struct Context {
    pub store: Store,
    pub schema: Arc<FieldSchema>,
    pub text: Arc<StaticText>,
}

impl Context {
    pub fn new(store: Store, schema: FieldSchema, text: StaticText) -> Context {
        Context {
            store,
            schema: Arc::new(schema),
            text: Arc::new(text),
        }
    }

    pub fn from_config(config: &Config) -> Result<Context, Error> {
        let store = Store::new(
            JsonFile::new(&config.entries),
            Duration::from_secs(config.reload_cooldown),
        )?;

        let schema = FieldSchema::new(
            config.always_fields.iter().cloned(),
            config.search_fields.iter().cloned(),
            config.filterable_fields.iter().cloned(),
        );

        let text = StaticText::load(
            config.status_file.as_deref(),
            config.siteinfo_file.as_deref(),
        )?;

        Ok(Context::new(store, schema, text))
    }
}

#[cfg(test)]
impl Context {
    /// A context over fixed records with the default status and siteinfo text.
    pub(crate) fn with_records(records: Vec<crate::record::Record>, schema: FieldSchema) -> Context {
        Context::new(Store::from_records(records), schema, StaticText::default())
    }
}

use strum::IntoEnumIterator;
use table::{IntoTable, Table};

pub(crate) mod table;

use modelcat::models::ModelCollection;
use modelcat::providers::providers::ProviderIdentifier;
use modelcat::Registry;

use crate::{die, ListArgs, ListModelArgs, ListObject, ListingFormat};

#[derive(serde::Serialize)]
struct Model {
    model_id: String,
    provider: String,
    #[serde(rename = "type")]
    model_type: String,
    context: Option<u64>,
    input_per_million: Option<f64>,
    output_per_million: Option<f64>,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "unknown".to_string(),
    }
}

impl From<Vec<Model>> for Table {
    fn from(value: Vec<Model>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["MODEL", "PROVIDER", "TYPE", "CONTEXT", "INPUT/M", "OUTPUT/M"]);

        for model in value {
            tab.add_row(vec![
                model.model_id,
                model.provider,
                model.model_type,
                optional(model.context),
                optional(model.input_per_million),
                optional(model.output_per_million),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
struct Provider {
    provider: ProviderIdentifier,
    priority: u8,
    enabled: bool,
}

impl From<Vec<Provider>> for Table {
    fn from(value: Vec<Provider>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["PROVIDER", "PRIORITY", "ENABLED"]);

        for provider in value {
            tab.add_row(vec![
                provider.provider.to_string(),
                provider.priority.to_string(),
                if provider.enabled {
                    "enabled".to_string()
                } else {
                    "disabled".to_string()
                },
            ]);
        }

        tab
    }
}

fn get_providers(registry: &Registry) -> Vec<Provider> {
    ProviderIdentifier::iter()
        .map(|id| Provider {
            provider: id,
            priority: registry.priority(id),
            enabled: registry.provider(id).is_some(),
        })
        .collect()
}

fn filter_models(collection: &ModelCollection, args: &ListModelArgs) -> ModelCollection {
    let mut models = collection.clone();

    if let Some(provider) = &args.provider {
        models = models.by_provider(provider);
    }

    if let Some(family) = &args.family {
        models = models.by_family(family);
    }

    if let Some(model_type) = args.model_type {
        models = models.by_type(model_type);
    }

    models
}

async fn get_models(registry: &Registry, args: &ListModelArgs) -> Vec<Model> {
    let collection = match registry.collection().await {
        Ok(collection) => collection,
        Err(err) => die!("failed to list models: {}", err),
    };

    filter_models(&collection, args)
        .iter()
        .map(|m| Model {
            model_id: m.id().to_string(),
            provider: m.provider().to_string(),
            model_type: m.model_type().to_string(),
            context: m.context_window(),
            input_per_million: m.pricing().input_per_million(),
            output_per_million: m.pricing().output_per_million(),
        })
        .collect()
}

pub(crate) fn format_output<O: IntoTable + serde::Serialize>(object: O, format: ListingFormat) {
    match format {
        ListingFormat::Json => match serde_json::to_string_pretty(&object) {
            Ok(output) => println!("{}", output),
            Err(err) => die!("failed to serialize output: {}", err),
        },
        ListingFormat::Table => {
            let tab = object.into_table();

            print!("{}", tab);
        }
        ListingFormat::HeaderlessTable => {
            let mut tab = object.into_table();

            tab.print_header(false);

            print!("{}", tab);
        }
    }
}

pub(crate) async fn list_cmd(registry: &Registry, args: &ListArgs, format: ListingFormat) {
    match &args.object {
        ListObject::Models(args) => {
            let models = get_models(registry, args).await;
            format_output(models, format);
        }
        ListObject::Providers => {
            let providers = get_providers(registry);
            format_output(providers, format);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelcat::models::{Modalities, ModelType};
    use modelcat::ModelRecord;

    fn collection() -> ModelCollection {
        ModelCollection::new(vec![
            ModelRecord::new("gpt-4o", "openai").unwrap().with_family("gpt"),
            ModelRecord::new("text-embedding-3-small", "openai")
                .unwrap()
                .with_modalities(Modalities::new(["text"], ["embeddings"])),
            ModelRecord::new("llama3", "ollama").unwrap().with_family("llama"),
        ])
    }

    fn ids(collection: &ModelCollection) -> Vec<&str> {
        collection.iter().map(|m| m.id()).collect()
    }

    #[test]
    fn test_filter_models() {
        let all = collection();

        let args = ListModelArgs::default();
        assert_eq!(ids(&filter_models(&all, &args)).len(), 3);

        let args = ListModelArgs {
            provider: Some("openai".to_string()),
            model_type: Some(ModelType::Embedding),
            ..Default::default()
        };
        assert_eq!(ids(&filter_models(&all, &args)), vec!["text-embedding-3-small"]);

        let args = ListModelArgs {
            family: Some("llama".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_models(&all, &args)), vec!["llama3"]);
    }

    #[test]
    fn test_model_table() {
        let models = vec![Model {
            model_id: "gpt-4o".to_string(),
            provider: "openai".to_string(),
            model_type: "chat".to_string(),
            context: Some(128000),
            input_per_million: Some(2.5),
            output_per_million: None,
        }];

        let mut tab: Table = models.into();
        tab.print_header(false);

        assert_eq!(tab.to_string(), "gpt-4o  openai  chat  128000  2.5  unknown\n");
    }
}

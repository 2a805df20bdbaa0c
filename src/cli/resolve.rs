use modelcat::{ModelRecord, ModelSpec, Registry, ResolveOptions};

use super::list::table::Table;
use crate::{die, warn, ListingFormat, ResolveArgs};

#[derive(serde::Serialize)]
struct Description {
    #[serde(flatten)]
    model: ModelRecord,
    dispatch_id: String,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn joined<'a, I: IntoIterator<Item = &'a String>>(values: I) -> String {
    let values: Vec<&str> = values.into_iter().map(String::as_str).collect();

    match values.is_empty() {
        true => "-".to_string(),
        false => values.join(","),
    }
}

impl From<Description> for Table {
    fn from(value: Description) -> Self {
        let model = &value.model;
        let pricing = model.pricing();

        let mut tab = Table::new();

        tab.set_header(vec!["FIELD", "VALUE"]);

        let rows = [
            ("id", model.id().to_string()),
            ("name", model.name().to_string()),
            ("provider", model.provider().to_string()),
            ("dispatch_id", value.dispatch_id.clone()),
            ("type", model.model_type().to_string()),
            ("family", optional(model.family())),
            ("context_window", optional(model.context_window())),
            ("max_output_tokens", optional(model.max_output_tokens())),
            ("input", joined(&model.modalities().input)),
            ("output", joined(&model.modalities().output)),
            ("capabilities", joined(model.capabilities())),
            ("input_per_million", optional(pricing.input_per_million())),
            ("output_per_million", optional(pricing.output_per_million())),
            ("knowledge_cutoff", optional(model.knowledge_cutoff())),
            ("created_at", optional(model.created_at().map(|d| d.to_rfc3339()))),
        ];

        for (field, value) in rows {
            tab.add_row(vec![field.to_string(), value]);
        }

        tab
    }
}

pub(crate) async fn resolve_cmd(registry: &Registry, args: &ResolveArgs, format: ListingFormat) {
    let spec = match ModelSpec::scoped(args.provider.as_deref(), &args.spec) {
        Ok(spec) => spec,
        Err(err) => die!("invalid model spec \"{}\": {}", args.spec, err),
    };

    let options = ResolveOptions {
        assume_exists: args.assume_exists,
    };

    let model = if args.dispatch {
        match registry.resolve(&spec, options).await {
            Ok(resolved) => resolved.model,
            Err(err) => die!("failed to resolve \"{}\": {}", spec, err),
        }
    } else {
        match registry.find(&spec, options).await {
            Ok(model) => model,
            Err(err) => die!("failed to resolve \"{}\": {}", spec, err),
        }
    };

    if let Some(warning) = model.warning() {
        warn!("{}", warning);
    }

    let description = Description {
        dispatch_id: model.dispatch_id().to_string(),
        model: ModelRecord::clone(&model),
    };

    super::list::format_output(description, format);
}

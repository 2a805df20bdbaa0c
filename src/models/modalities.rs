use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Input and output modalities of a model (e.g. `text`, `image`, `audio`,
/// `embeddings`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modalities {
    #[serde(default)]
    pub input: BTreeSet<String>,
    #[serde(default)]
    pub output: BTreeSet<String>,
}

impl Modalities {
    pub fn new<I, O>(input: I, output: O) -> Modalities
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Modalities {
            input: input.into_iter().map(Into::into).collect(),
            output: output.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, modality: &str) -> bool {
        self.input.contains(modality)
    }

    pub fn produces(&self, modality: &str) -> bool {
        self.output.contains(modality)
    }
}

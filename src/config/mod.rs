use qfilter::ComparisonOperator;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Attribute definitions used to fill in CLI defaults.
#[derive(Debug, Deserialize, Serialize)]
pub struct FiltersConfig {
    #[serde(default = "default_operator")]
    pub default_operator: ComparisonOperator,
    #[serde(default)]
    pub attributes: Vec<AttributeConfig>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn load_optional(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn attribute(&self, attribute_id: &str) -> Option<&AttributeConfig> {
        self.attributes.iter().find(|attr| attr.id == attribute_id)
    }

    /// Pick the operator and replace mode for an edit on `attribute_id`.
    ///
    /// Explicit arguments win over the attribute definition, which wins over
    /// `default_operator`.
    pub fn resolve(
        &self,
        attribute_id: &str,
        operator: Option<ComparisonOperator>,
        replace: bool,
    ) -> (ComparisonOperator, bool) {
        let attribute = self.attribute(attribute_id);
        let operator = operator
            .or_else(|| attribute.and_then(|attr| attr.operator))
            .unwrap_or(self.default_operator);
        let replace = replace || attribute.is_some_and(|attr| attr.single_select);
        (operator, replace)
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            default_operator: default_operator(),
            attributes: Vec::new(),
        }
    }
}

fn default_operator() -> ComparisonOperator {
    ComparisonOperator::Equal
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AttributeConfig {
    pub id: String,
    #[serde(default)]
    pub operator: Option<ComparisonOperator>,
    /// A new value replaces existing equality filters instead of adding one.
    #[serde(default)]
    pub single_select: bool,
}

//! Field mapping: matching canonical target fields to source field paths.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classify::{passes_trending, Classification, DataStructure, StructureClassifier};
use crate::schema::{DataSchema, FieldSchema, FieldType};

use super::rules::{
    FieldMappingRule, ENTITY_RULES, META_RULES, PRICE_RULES, QUOTE_RULES, TIME_RULES,
};

/// Output of the field mapper: the classified shape plus, per rule set, the
/// source field chosen for each canonical target field. Targets with no
/// matching candidate are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingTemplate {
    /// Classification result the mapping was built for.
    pub data_type: DataStructure,
    /// Path segments to the data, possibly containing the `[DATE]` sentinel.
    pub data_path: Vec<String>,
    /// Whether the data is iterated as an array.
    pub is_array: bool,
    /// Entity identity mappings (symbol, name, exchange, ...).
    pub entity: IndexMap<String, String>,
    /// OHLCV price mappings.
    pub price: IndexMap<String, String>,
    /// Quote mappings (price rules plus bid/ask/change/...).
    pub quote: IndexMap<String, String>,
    /// Temporal mappings (date, time, timestamp).
    pub time: IndexMap<String, String>,
    /// Metadata descriptor mappings, with dotted paths from the root.
    pub meta: IndexMap<String, String>,
}

impl MappingTemplate {
    /// Every mapping actually present, merged for provenance reporting.
    pub fn all_mappings(&self) -> IndexMap<String, String> {
        let mut merged = IndexMap::new();
        for map in [&self.entity, &self.price, &self.quote, &self.time, &self.meta] {
            for (target, source) in map {
                merged.entry(target.clone()).or_insert_with(|| source.clone());
            }
        }
        merged
    }
}

/// Builds a [`MappingTemplate`] from a schema by scanning field names at
/// the classified nesting level against the static rule tables.
#[derive(Debug, Clone, Default)]
pub struct FieldMapper;

impl FieldMapper {
    /// Create a new field mapper.
    pub fn new() -> Self {
        Self
    }

    /// Classify the schema and build the mapping template for it.
    pub fn generate(&self, schema: &DataSchema) -> MappingTemplate {
        let classification = StructureClassifier::new().classify(schema);
        self.generate_for(schema, &classification)
    }

    /// Build the mapping template for an already-computed classification.
    pub fn generate_for(
        &self,
        schema: &DataSchema,
        classification: &Classification,
    ) -> MappingTemplate {
        let fields = Self::fields_at(schema, classification);
        let meta_fields = Self::flatten_metadata(schema);

        let template = MappingTemplate {
            data_type: classification.structure,
            data_path: classification.data_path.clone(),
            is_array: classification.is_array,
            entity: Self::apply_rules(&fields, ENTITY_RULES),
            price: Self::apply_rules(&fields, PRICE_RULES),
            quote: Self::apply_rules(&fields, &QUOTE_RULES),
            time: Self::apply_rules(&fields, TIME_RULES),
            meta: Self::apply_rules(&meta_fields, META_RULES),
        };

        tracing::debug!(
            data_type = %template.data_type,
            mapped = template.all_mappings().len(),
            candidates = fields.len(),
            "generated mapping template"
        );

        template
    }

    /// Resolve the set of candidate field names (and their types) at the
    /// nesting level the classification points to.
    fn fields_at(
        schema: &DataSchema,
        classification: &Classification,
    ) -> Vec<(String, FieldType)> {
        let mut current: &IndexMap<String, FieldSchema> = &schema.data_fields;

        for segment in &classification.data_path {
            match current.get(segment).and_then(|f| f.object_schema.as_ref()) {
                Some(next) => current = next,
                None => return Vec::new(),
            }
        }

        // A trending path may stop at a wrapper object whose children are
        // the gainer/loser arrays; candidates come from the element shape.
        if classification.structure == DataStructure::Trending && !passes_trending(current) {
            if let Some(elem) = current
                .values()
                .filter(|f| f.is_object_array())
                .filter_map(|f| f.object_schema.as_ref())
                .find(|elem| passes_trending(elem))
            {
                current = elem;
            }
        }

        current
            .iter()
            .map(|(name, field)| (name.clone(), field.field_type))
            .collect()
    }

    /// Flatten metadata sections one level, producing dotted candidate
    /// paths like `Meta Data.2. Symbol`.
    fn flatten_metadata(schema: &DataSchema) -> Vec<(String, FieldType)> {
        let mut out = Vec::new();
        for (name, field) in &schema.metadata {
            match &field.object_schema {
                Some(children) if field.field_type == FieldType::Object => {
                    for (child_name, child) in children {
                        out.push((format!("{}.{}", name, child_name), child.field_type));
                    }
                }
                _ => out.push((name.clone(), field.field_type)),
            }
        }
        out
    }

    /// Run a rule table over the candidate fields. A rule only replaces an
    /// existing match for the same target when its priority is strictly
    /// higher; equal priority keeps the earlier rule's match.
    fn apply_rules(
        fields: &[(String, FieldType)],
        rules: &[FieldMappingRule],
    ) -> IndexMap<String, String> {
        let mut selected: IndexMap<&'static str, (u8, String)> = IndexMap::new();

        for rule in rules {
            let Some(source) = Self::find_source_field(fields, rule) else {
                continue;
            };
            match selected.get(rule.target_field) {
                Some((priority, _)) if *priority >= rule.priority => {}
                _ => {
                    selected.insert(rule.target_field, (rule.priority, source));
                }
            }
        }

        selected
            .into_iter()
            .map(|(target, (_, source))| (target.to_string(), source))
            .collect()
    }

    /// Find the best source field for one rule: a bidirectional
    /// case-insensitive substring match with a compatible type. Exact name
    /// matches beat pattern-in-name matches beat name-in-pattern matches;
    /// remaining ties keep the first candidate found.
    fn find_source_field(
        fields: &[(String, FieldType)],
        rule: &FieldMappingRule,
    ) -> Option<String> {
        let mut best: Option<(u8, &str)> = None;

        for (name, field_type) in fields {
            if let Some(required) = rule.required_types {
                if !required.contains(field_type) {
                    continue;
                }
            }

            let quality = rule
                .source_patterns
                .iter()
                .filter_map(|pattern| Self::match_quality(pattern, name))
                .max();

            if let Some(quality) = quality {
                match best {
                    Some((best_quality, _)) if best_quality >= quality => {}
                    _ => best = Some((quality, name)),
                }
            }
        }

        best.map(|(_, name)| name.to_string())
    }

    fn match_quality(pattern: &str, name: &str) -> Option<u8> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        let pattern = pattern.to_lowercase();

        if name == pattern {
            Some(2)
        } else if pattern.chars().count() == 1 {
            // One-letter patterns (Finnhub's "t") occur as substrings of
            // nearly every field name; they only count as exact names.
            None
        } else if name.contains(&pattern) {
            Some(1)
        } else if pattern.contains(&name) {
            Some(0)
        } else {
            None
        }
    }
}

//! Sérialisation d'une instance du modèle générique en fragment XML pour Put

use std::fmt::Write;

use quick_xml::escape::escape;
use serde::Deserialize;
use tracing::warn;

use super::document::{Node, NodeMap, Scalar};
use crate::config::WsmanConfig;
use crate::error::{Result, WsmanError};
use crate::namespace::resolve;

/// Ordre d'émission des champs d'une instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    /// Ordre du document d'origine (ordre d'insertion de la map)
    #[default]
    Document,
    /// Ordre lexicographique des noms de champ
    Sorted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodySerializer {
    order: FieldOrder,
}

impl BodySerializer {
    pub fn new(order: FieldOrder) -> Self {
        Self { order }
    }

    pub fn from_config(config: &WsmanConfig) -> Self {
        Self::new(config.field_order)
    }

    /// Sérialise l'instance `class_name` du Body, ou une chaîne vide en cas
    /// d'échec (classe absente, namespace inconnu, valeur qui n'est pas un objet).
    pub fn serialize_put_body(&self, class_name: &str, body: &NodeMap) -> String {
        match self.try_serialize(class_name, body) {
            Ok(Some(fragment)) => fragment,
            Ok(None) => String::new(),
            Err(err) => {
                warn!(class = class_name, error = %err, "Cannot serialize Put body");
                String::new()
            }
        }
    }

    /// Comme [`serialize_put_body`](Self::serialize_put_body) mais expose
    /// l'erreur. `Ok(None)` signifie que la classe n'est pas dans le Body.
    ///
    /// Un champ de type non supporté est signalé par un avertissement et omis.
    pub fn try_serialize(&self, class_name: &str, body: &NodeMap) -> Result<Option<String>> {
        let Some(instance) = body.get(class_name) else {
            return Ok(None);
        };
        let resource_uri = resolve(class_name)?;
        let fields = instance
            .as_object()
            .ok_or_else(|| WsmanError::NotAnInstance(class_name.to_string()))?;

        let mut entries: Vec<(&String, &Node)> = fields.iter().collect();
        if self.order == FieldOrder::Sorted {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }

        let mut fragment = format!("\t\t<r:{class_name} xmlns:r=\"{resource_uri}\">\n");
        for (name, value) in entries {
            match leaf_text(name, value) {
                Ok(text) => {
                    let _ = writeln!(fragment, "\t\t\t<r:{name}>{text}</r:{name}>");
                }
                Err(err) => warn!(class = class_name, error = %err, "Skipping field"),
            }
        }
        fragment.push_str(&format!("\t\t</r:{class_name}>"));

        Ok(Some(fragment))
    }
}

/// Texte d'un champ feuille, échappé pour XML
fn leaf_text(name: &str, value: &Node) -> Result<String> {
    match value {
        Node::Null => Ok(String::new()),
        Node::Scalar(Scalar::String(text)) => Ok(escape(text.as_str()).into_owned()),
        Node::Scalar(scalar) => Ok(scalar.to_string()),
        Node::Object(_) | Node::Collection(_) => Err(WsmanError::UnsupportedValueType {
            field: name.to_string(),
            kind: value.kind(),
        }),
    }
}

/// Sérialise avec l'ordre du document
pub fn serialize_put_body(class_name: &str, body: &NodeMap) -> String {
    BodySerializer::default().serialize_put_body(class_name, body)
}

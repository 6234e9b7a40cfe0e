//! Modèle générique d'un message WSMAN analysé
//!
//! Un document est une paire `Header`/`Body`, chacun associant le nom local
//! d'un élément à un [`Node`]. Une balise répétée sous un même parent devient
//! une [`Node::Collection`]; une balise unique reste un nœud nu, jamais une
//! collection d'un seul élément. Il faut donc toujours tester la nature d'un
//! nœud avant de l'indexer, ou passer par [`Node::as_slice`].

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Enfants d'un élément, dans l'ordre de première apparition
pub type NodeMap = IndexMap<String, Node>;

/// Valeur feuille dont le type est déduit du texte
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Boolean(value) => write!(f, "{value}"),
            Scalar::String(value) => f.write_str(value),
        }
    }
}

/// Nœud de l'arbre générique
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Valeur absente. Jamais produite par le parser, seulement posée par
    /// l'appelant avant un Put pour émettre un élément vide.
    Null,
    Scalar(Scalar),
    Object(NodeMap),
    Collection(Vec<Node>),
}

impl Node {
    /// Nom de la variante, pour les diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Scalar(Scalar::Integer(_)) => "integer",
            Node::Scalar(Scalar::Boolean(_)) => "boolean",
            Node::Scalar(Scalar::String(_)) => "string",
            Node::Object(_) => "object",
            Node::Collection(_) => "collection",
        }
    }

    /// Enfant `key` d'un objet
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_object_mut().and_then(|map| map.get_mut(key))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Scalar(Scalar::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&NodeMap> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut NodeMap> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Node]> {
        match self {
            Node::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Vue « un ou plusieurs »: une collection donne ses éléments, tout autre
    /// nœud se donne lui-même.
    pub fn as_slice(&self) -> &[Node] {
        match self {
            Node::Collection(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Texte d'un scalaire, quel que soit le type déduit au parsing
    pub fn scalar_text(&self) -> Option<String> {
        self.as_scalar().map(Scalar::to_string)
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::String(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Integer(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Boolean(value))
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Node::Object(map)
    }
}

/// Message SOAP analysé
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    #[serde(rename = "Header")]
    pub header: NodeMap,

    #[serde(rename = "Body")]
    pub body: NodeMap,
}

impl DocumentModel {
    /// Contexte d'énumération d'une réponse Enumerate ou Pull.
    ///
    /// Le contexte est rendu sous forme textuelle même s'il a été lu comme
    /// entier ou booléen.
    pub fn enumeration_context(&self) -> Option<String> {
        ["EnumerateResponse", "PullResponse"]
            .into_iter()
            .filter_map(|response| self.body.get(response))
            .find_map(|response| response.get("EnumerationContext"))
            .and_then(Node::scalar_text)
    }
}

/// Page de résultats extraite d'une réponse Pull
#[derive(Debug, Clone, PartialEq)]
pub struct PullPage {
    pub items: Vec<Node>,
    pub end_of_sequence: bool,
    pub context: Option<String>,
}

impl PullPage {
    /// Extrait les instances de `class_name` d'une réponse Pull.
    ///
    /// Retourne `None` quand le Body ne contient pas de `PullResponse`, ce qui
    /// signale la fin des résultats.
    pub fn from_document(document: &DocumentModel, class_name: &str) -> Option<Self> {
        let response = document.body.get("PullResponse")?;
        let items = response
            .get("Items")
            .and_then(|items| items.get(class_name))
            .map(|found| found.as_slice().to_vec())
            .unwrap_or_default();

        Some(PullPage {
            items,
            end_of_sequence: response.get("EndOfSequence").is_some(),
            context: response.get("EnumerationContext").and_then(Node::scalar_text),
        })
    }
}

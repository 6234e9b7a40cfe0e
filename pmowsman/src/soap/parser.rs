//! Parser des réponses WSMAN vers le modèle générique

use std::io::{BufReader, Read};

use indexmap::IndexMap;
use tracing::debug;
use xmltree::{Element, XMLNode};

use super::document::{DocumentModel, Node, NodeMap, Scalar};
use crate::error::{Result, WsmanError};

/// Parse une enveloppe SOAP complète à partir de bytes XML
///
/// `Header` et `Body` sont cherchés dans tout le document par nom local, quel
/// que soit le préfixe de namespace de l'enveloppe.
///
/// # Errors
///
/// - [`WsmanError::Xml`] si le flux n'est pas du XML bien formé
/// - [`WsmanError::MissingElement`] si `Header` ou `Body` est absent
pub fn parse_wsman(xml: &[u8]) -> Result<DocumentModel> {
    parse_wsman_reader(xml)
}

/// Variante de [`parse_wsman`] lisant depuis un flux
pub fn parse_wsman_reader<R: Read>(reader: R) -> Result<DocumentModel> {
    let root = Element::parse(BufReader::new(reader))?;

    let header = find_element(&root, "Header").ok_or(WsmanError::MissingElement("Header"))?;
    let body = find_element(&root, "Body").ok_or(WsmanError::MissingElement("Body"))?;

    let document = DocumentModel {
        header: parse_children(header),
        body: parse_children(body),
    };

    debug!(
        root = %root.name,
        header_keys = document.header.len(),
        body_keys = ?document.body.keys().collect::<Vec<_>>(),
        "Parsed WSMAN envelope"
    );

    Ok(document)
}

/// Parse un élément isolé (par exemple un corps de Put sérialisé).
///
/// Le résultat associe le nom local de la racine à son nœud.
pub fn parse_fragment(xml: &[u8]) -> Result<NodeMap> {
    let root = Element::parse(BufReader::new(xml))?;
    let mut fragment = NodeMap::new();
    fragment.insert(root.name.clone(), parse_node(&root));
    Ok(fragment)
}

/// Premier élément nommé `name` en ordre de document, racine comprise
fn find_element<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    xml_children(element).find_map(|child| find_element(child, name))
}

/// Helper to iterate over XML element children (filters out non-element nodes)
fn xml_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(elem) => Some(elem),
        _ => None,
    })
}

fn parse_node(element: &Element) -> Node {
    if xml_children(element).next().is_some() {
        Node::Object(parse_children(element))
    } else {
        let text = element.get_text().unwrap_or_default();
        Node::Scalar(infer_scalar(&text))
    }
}

/// Convertit les enfants directs d'un élément.
///
/// Les nœuds sont regroupés par balise dans l'ordre de première apparition;
/// une balise vue plusieurs fois devient une collection ordonnée, une balise
/// vue une seule fois reste un nœud nu.
fn parse_children(element: &Element) -> NodeMap {
    let mut grouped: IndexMap<String, Vec<Node>> = IndexMap::new();
    for child in xml_children(element) {
        grouped
            .entry(child.name.clone())
            .or_default()
            .push(parse_node(child));
    }

    grouped
        .into_iter()
        .filter_map(|(tag, mut nodes)| {
            let node = if nodes.len() > 1 {
                Node::Collection(nodes)
            } else {
                nodes.pop()?
            };
            Some((tag, node))
        })
        .collect()
}

/// Déduit le type d'un texte feuille: entier 64 bits, puis booléen, puis chaîne
pub fn infer_scalar(text: &str) -> Scalar {
    if let Ok(value) = text.parse::<i64>() {
        return Scalar::Integer(value);
    }
    if let Some(value) = parse_bool(text) {
        return Scalar::Boolean(value);
    }
    Scalar::String(text.to_string())
}

/// Graphies booléennes canoniques
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

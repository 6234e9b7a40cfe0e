//! # Module SOAP - enveloppes WS-Management
//!
//! Ce module construit les requêtes WSMAN (Get, Enumerate, Pull, Put) et
//! convertit les réponses SOAP en un modèle générique sans schéma.
//!
//! ## Architecture
//!
//! - [`DocumentModel`] : message analysé, sections `Header` et `Body`
//! - [`Node`] : scalaire, objet ou collection
//! - [`EnvelopeBuilder`] : rendu des quatre enveloppes de requête
//! - [`BodySerializer`] : instance du modèle vers fragment XML de Put
//!
//! ## Example
//!
//! ```
//! use pmowsman::soap::{build_put, parse_wsman, serialize_put_body, Node};
//!
//! let response = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
//!   <s:Header><MessageID>uuid:1</MessageID></s:Header>
//!   <s:Body>
//!     <AMT_GeneralSettings><HostName>nuc</HostName></AMT_GeneralSettings>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let mut document = parse_wsman(response.as_bytes()).unwrap();
//! if let Some(settings) = document.body.get_mut("AMT_GeneralSettings").and_then(Node::as_object_mut) {
//!     settings.insert("HostName".to_string(), Node::from("NUCMC"));
//! }
//!
//! let body = serialize_put_body("AMT_GeneralSettings", &document.body);
//! let request = build_put("AMT_GeneralSettings", "urn:uuid:1", "", &body);
//! assert!(request.contains("<r:HostName>NUCMC</r:HostName>"));
//! ```

mod builder;
mod document;
mod parser;
mod serializer;

pub use builder::{
    EnvelopeBuilder, MAX_ELEMENTS, SOAP_ENV_NS, WSA_NS, WSEN_NS, WSMAN_NS, WsmanAction, build_enumerate,
    build_get, build_pull, build_put, render_selector_set,
};
pub use document::{DocumentModel, Node, NodeMap, PullPage, Scalar};
pub use parser::{infer_scalar, parse_fragment, parse_wsman, parse_wsman_reader};
pub use serializer::{BodySerializer, FieldOrder, serialize_put_body};

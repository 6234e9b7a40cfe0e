//! # pmowsman - WS-Management pour agents CIM/AMT
//!
//! Construction des requêtes SOAP WS-Management (Get, Enumerate, Pull, Put)
//! et analyse des réponses en un arbre générique.
//!
//! - [`namespace`] : préfixes de classe `AMT`, `CIM`, `IPS` vers URI de schéma
//! - [`soap`] : enveloppes, parser, modèle de document, sérialiseur de Put
//! - [`client`] : session Get/Enumerate/Put au-dessus d'un transport externe
//! - [`config`] : réglages YAML et variables d'environnement
//!
//! Le transport HTTP, l'authentification et le chargement des credentials ne
//! font pas partie de ce crate.

pub mod client;
pub mod config;
pub mod error;
pub mod namespace;
pub mod soap;

pub use client::{WsmanSession, WsmanTransport};
pub use config::{WsmanConfig, get_config};
pub use error::{Result, WsmanError};
pub use namespace::{ResourceUri, SchemaFamily, resolve};
pub use soap::{DocumentModel, Node, NodeMap, Scalar};

//! Gestion des erreurs WS-Management

use thiserror::Error;

/// Type Result personnalisé pour pmowsman
pub type Result<T> = std::result::Result<T, WsmanError>;

/// Erreurs possibles lors de la construction ou de l'analyse d'un message WSMAN
#[derive(Error, Debug)]
pub enum WsmanError {
    /// Préfixe de classe absent de la table des namespaces (AMT, CIM, IPS)
    #[error("Unknown namespace for class {0}")]
    UnknownNamespace(String),

    /// Nom de classe trop court pour porter un préfixe de trois caractères
    #[error("Class name {0:?} is too short to carry a namespace prefix")]
    ClassNameTooShort(String),

    /// XML illisible
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),

    /// Élément Header ou Body introuvable dans l'enveloppe
    #[error("Missing SOAP {0} element")]
    MissingElement(&'static str),

    /// Valeur hors de l'ensemble {string, integer, boolean, null}
    #[error("Unsupported value type {kind} for field {field}")]
    UnsupportedValueType { field: String, kind: &'static str },

    /// La classe est présente dans le Body mais n'est pas une instance unique
    #[error("{0} is not a single instance object in the body")]
    NotAnInstance(String),

    /// Erreur remontée par le transport HTTP externe
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No enumeration context returned for {0}")]
    MissingEnumerationContext(String),

    #[error("Enumeration stopped after {0} pull requests")]
    PullLimitExceeded(usize),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl WsmanError {
    pub fn transport(message: impl Into<String>) -> Self {
        WsmanError::Transport(message.into())
    }
}

//! Résolution des namespaces CIM/AMT/IPS
//!
//! Un nom de classe WSMAN (`AMT_GeneralSettings`, `CIM_SoftwareIdentity`...)
//! commence par un préfixe de trois lettres qui désigne la famille de schéma.
//! La ressource adressée est l'URI de base de cette famille suivie du nom de
//! classe complet.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WsmanError};

/// Famille de schéma identifiée par le préfixe d'un nom de classe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFamily {
    Amt,
    Cim,
    Ips,
}

impl SchemaFamily {
    pub const ALL: [SchemaFamily; 3] = [SchemaFamily::Amt, SchemaFamily::Cim, SchemaFamily::Ips];

    /// Préfixe de classe, sensible à la casse
    pub fn prefix(self) -> &'static str {
        match self {
            SchemaFamily::Amt => "AMT",
            SchemaFamily::Cim => "CIM",
            SchemaFamily::Ips => "IPS",
        }
    }

    pub fn base_uri(self) -> &'static str {
        match self {
            SchemaFamily::Amt => "http://intel.com/wbem/wscim/1/amt-schema/1/",
            SchemaFamily::Cim => "http://schemas.dmtf.org/wbem/wscim/1/cim-schema/2/",
            SchemaFamily::Ips => "http://intel.com/wbem/wscim/1/ips-schema/1/",
        }
    }

    /// Famille d'un nom de classe complet, d'après ses trois premiers caractères
    pub fn of_class(class_name: &str) -> Result<Self> {
        let prefix = class_name
            .get(..3)
            .ok_or_else(|| WsmanError::ClassNameTooShort(class_name.to_string()))?;
        prefix
            .parse()
            .map_err(|_| WsmanError::UnknownNamespace(class_name.to_string()))
    }
}

impl FromStr for SchemaFamily {
    type Err = WsmanError;

    fn from_str(prefix: &str) -> Result<Self> {
        SchemaFamily::ALL
            .into_iter()
            .find(|family| family.prefix() == prefix)
            .ok_or_else(|| WsmanError::UnknownNamespace(prefix.to_string()))
    }
}

impl fmt::Display for SchemaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// URI de ressource complète d'une classe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    family: SchemaFamily,
    uri: String,
}

impl ResourceUri {
    pub fn family(&self) -> SchemaFamily {
        self.family
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Résout un nom de classe en URI de ressource
///
/// # Errors
///
/// - [`WsmanError::ClassNameTooShort`] si le nom fait moins de trois caractères
/// - [`WsmanError::UnknownNamespace`] si le préfixe n'est pas dans la table
pub fn resolve(class_name: &str) -> Result<ResourceUri> {
    let family = SchemaFamily::of_class(class_name)?;
    Ok(ResourceUri {
        family,
        uri: format!("{}{}", family.base_uri(), class_name),
    })
}

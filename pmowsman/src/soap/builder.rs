//! Construction des requêtes WSMAN
//!
//! Les quatre enveloppes (Get, Enumerate, Pull, Put) partagent le même
//! en-tête WS-Addressing/WS-Management. Ce sont de simples substitutions de
//! chaînes: le nom de classe, l'identifiant de message et le contexte
//! d'énumération sont insérés tels quels. Les appelants ne doivent passer que
//! des identifiants bien formés, sauf à activer `escape_fields`.

use std::borrow::Cow;

use quick_xml::escape::escape;
use tracing::{trace, warn};

use crate::config::WsmanConfig;
use crate::error::Result;
use crate::namespace::resolve;

pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const WSA_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
pub const WSMAN_NS: &str = "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd";
pub const WSEN_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/enumeration";

const ACTION_GET: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Get";
const ACTION_PUT: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Put";
const ACTION_ENUMERATE: &str = "http://schemas.xmlsoap.org/ws/2004/09/enumeration/Enumerate";
const ACTION_PULL: &str = "http://schemas.xmlsoap.org/ws/2004/09/enumeration/Pull";

const ANONYMOUS_ADDRESS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous";
const OPERATION_TIMEOUT: &str = "PT60S";

/// Nombre maximal d'éléments que l'agent peut renvoyer par Pull
pub const MAX_ELEMENTS: u32 = 999;

/// Opération WSMAN et ses paramètres propres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsmanAction<'a> {
    Get,
    Enumerate,
    Pull {
        context: &'a str,
    },
    Put {
        selector: &'a str,
        body: &'a str,
    },
}

impl WsmanAction<'_> {
    pub fn action_uri(&self) -> &'static str {
        match self {
            WsmanAction::Get => ACTION_GET,
            WsmanAction::Enumerate => ACTION_ENUMERATE,
            WsmanAction::Pull { .. } => ACTION_PULL,
            WsmanAction::Put { .. } => ACTION_PUT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WsmanAction::Get => "Get",
            WsmanAction::Enumerate => "Enumerate",
            WsmanAction::Pull { .. } => "Pull",
            WsmanAction::Put { .. } => "Put",
        }
    }
}

/// Générateur d'enveloppes de requête
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeBuilder {
    escape_fields: bool,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WsmanConfig) -> Self {
        Self {
            escape_fields: config.escape_fields,
        }
    }

    /// Échappe les champs substitués (URI de ressource, identifiant de
    /// message, contexte d'énumération) au lieu de les insérer tels quels.
    pub fn with_escaped_fields(mut self, escape_fields: bool) -> Self {
        self.escape_fields = escape_fields;
        self
    }

    /// Construit l'enveloppe d'une opération.
    ///
    /// Les fragments de sélecteur et de corps d'un Put sont toujours insérés
    /// tels quels.
    pub fn render(&self, action: WsmanAction<'_>, class_name: &str, message_id: &str) -> Result<String> {
        let resource_uri = resolve(class_name)?;

        let (extra_header, body) = match action {
            WsmanAction::Get => (Cow::Borrowed(""), "\t<a:Body/>".to_string()),
            WsmanAction::Enumerate => (
                Cow::Borrowed(""),
                format!("\t<a:Body>\n\t\t<Enumerate xmlns=\"{WSEN_NS}\" />\n\t</a:Body>"),
            ),
            WsmanAction::Pull { context } => (
                Cow::Borrowed(""),
                format!(
                    "\t<a:Body>\n\t\t<Pull xmlns=\"{WSEN_NS}\">\n\t\t\t<EnumerationContext>{}</EnumerationContext>\n\t\t\t<MaxElements>{MAX_ELEMENTS}</MaxElements>\n\t\t</Pull>\n\t</a:Body>",
                    self.field(context)
                ),
            ),
            WsmanAction::Put { selector, body } => (
                Cow::Owned(format!("\t\t{selector}\n")),
                format!("\t<a:Body>\n{body}\n\t</a:Body>"),
            ),
        };

        let envelope = format!(
            r#"<?xml version="1.0" encoding="UTF-8" ?>
<a:Envelope xmlns:a="{SOAP_ENV_NS}"
	xmlns:b="{WSA_NS}"
	xmlns:c="{WSMAN_NS}">
	<a:Header>
		<b:Action mustUnderstand="true">{action}</b:Action>
		<b:To>/wsman</b:To>
		<c:ResourceURI>{resource_uri}</c:ResourceURI>
		<b:MessageID>{message_id}</b:MessageID>
		<b:ReplyTo><b:Address>{ANONYMOUS_ADDRESS}</b:Address></b:ReplyTo>
		<c:OperationTimeout>{OPERATION_TIMEOUT}</c:OperationTimeout>
{extra_header}	</a:Header>
{body}
</a:Envelope>
"#,
            action = action.action_uri(),
            resource_uri = self.field(resource_uri.as_str()),
            message_id = self.field(message_id),
        );

        trace!(action = action.name(), class = class_name, %envelope, "Rendered WSMAN request");
        Ok(envelope)
    }

    fn field<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.escape_fields {
            escape(value)
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Rend l'enveloppe ou une chaîne vide si la classe n'est pas résolue
    fn render_or_empty(&self, action: WsmanAction<'_>, class_name: &str, message_id: &str) -> String {
        self.render(action, class_name, message_id)
            .unwrap_or_else(|err| {
                warn!(action = action.name(), class = class_name, error = %err, "Cannot build WSMAN request");
                String::new()
            })
    }

    pub fn build_get(&self, class_name: &str, message_id: &str) -> String {
        self.render_or_empty(WsmanAction::Get, class_name, message_id)
    }

    pub fn build_enumerate(&self, class_name: &str, message_id: &str) -> String {
        self.render_or_empty(WsmanAction::Enumerate, class_name, message_id)
    }

    /// `context` vient de l'`EnumerationContext` de la réponse précédente
    pub fn build_pull(&self, class_name: &str, message_id: &str, context: &str) -> String {
        self.render_or_empty(WsmanAction::Pull { context }, class_name, message_id)
    }

    /// `selector` va dans l'en-tête (peut être vide), `body` dans le corps
    pub fn build_put(&self, class_name: &str, message_id: &str, selector: &str, body: &str) -> String {
        self.render_or_empty(WsmanAction::Put { selector, body }, class_name, message_id)
    }
}

pub fn build_get(class_name: &str, message_id: &str) -> String {
    EnvelopeBuilder::new().build_get(class_name, message_id)
}

pub fn build_enumerate(class_name: &str, message_id: &str) -> String {
    EnvelopeBuilder::new().build_enumerate(class_name, message_id)
}

pub fn build_pull(class_name: &str, message_id: &str, context: &str) -> String {
    EnvelopeBuilder::new().build_pull(class_name, message_id, context)
}

pub fn build_put(class_name: &str, message_id: &str, selector: &str, body: &str) -> String {
    EnvelopeBuilder::new().build_put(class_name, message_id, selector, body)
}

/// Construit un `SelectorSet` à passer comme sélecteur d'un Put.
///
/// Les noms sont des identifiants insérés tels quels, les valeurs sont
/// échappées. Une liste vide donne une chaîne vide.
pub fn render_selector_set(selectors: &[(&str, &str)]) -> String {
    if selectors.is_empty() {
        return String::new();
    }
    let mut fragment = String::from("<c:SelectorSet>");
    for (name, value) in selectors {
        fragment.push_str(&format!(
            "<c:Selector Name=\"{name}\">{}</c:Selector>",
            escape(*value)
        ));
    }
    fragment.push_str("</c:SelectorSet>");
    fragment
}

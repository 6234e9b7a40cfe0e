//! Session WSMAN au-dessus d'un transport fourni par l'appelant
//!
//! Le transport HTTP (POST sur `/wsman`, `text/xml`, authentification digest)
//! reste externe: il suffit d'implémenter [`WsmanTransport`].

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::WsmanConfig;
use crate::error::{Result, WsmanError};
use crate::soap::{
    BodySerializer, DocumentModel, EnvelopeBuilder, Node, NodeMap, PullPage, WsmanAction, parse_wsman,
};

/// Envoie une requête SOAP et retourne le corps brut de la réponse
pub trait WsmanTransport {
    fn post(&self, envelope: &str) -> Result<Vec<u8>>;
}

impl<T: WsmanTransport + ?Sized> WsmanTransport for &T {
    fn post(&self, envelope: &str) -> Result<Vec<u8>> {
        (**self).post(envelope)
    }
}

pub struct WsmanSession<T> {
    transport: T,
    builder: EnvelopeBuilder,
    serializer: BodySerializer,
    max_pulls: usize,
}

impl<T: WsmanTransport> WsmanSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, &WsmanConfig::default())
    }

    pub fn with_config(transport: T, config: &WsmanConfig) -> Self {
        Self {
            transport,
            builder: EnvelopeBuilder::from_config(config),
            serializer: BodySerializer::from_config(config),
            max_pulls: config.max_pulls,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn next_message_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn call(&self, action: WsmanAction<'_>, class_name: &str) -> Result<DocumentModel> {
        let envelope = self.builder.render(action, class_name, &Self::next_message_id())?;
        let response = self.transport.post(&envelope)?;
        parse_wsman(&response)
    }

    /// Lit l'instance d'une classe
    pub fn get(&self, class_name: &str) -> Result<DocumentModel> {
        self.call(WsmanAction::Get, class_name)
    }

    /// Énumère toutes les instances d'une classe.
    ///
    /// Enchaîne un Enumerate puis des Pull jusqu'à `EndOfSequence` ou une
    /// réponse sans `PullResponse`.
    pub fn enumerate(&self, class_name: &str) -> Result<Vec<Node>> {
        let response = self.call(WsmanAction::Enumerate, class_name)?;
        let mut context = response
            .enumeration_context()
            .ok_or_else(|| WsmanError::MissingEnumerationContext(class_name.to_string()))?;

        let mut items = Vec::new();
        for pull in 1..=self.max_pulls {
            let response = self.call(WsmanAction::Pull { context: &context }, class_name)?;
            let Some(page) = PullPage::from_document(&response, class_name) else {
                debug!(class = class_name, pull, "No PullResponse, enumeration finished");
                return Ok(items);
            };

            debug!(class = class_name, pull, count = page.items.len(), "Pulled items");
            items.extend(page.items);

            if page.end_of_sequence {
                info!(class = class_name, total = items.len(), "Enumeration complete");
                return Ok(items);
            }
            if let Some(next) = page.context {
                context = next;
            }
        }

        Err(WsmanError::PullLimitExceeded(self.max_pulls))
    }

    /// Écrit l'instance `class_name` de `body` (typiquement le Body d'un Get
    /// modifié par l'appelant).
    ///
    /// `selector` est un fragment `SelectorSet` éventuellement vide.
    pub fn put(&self, class_name: &str, selector: &str, body: &NodeMap) -> Result<DocumentModel> {
        let fragment = self
            .serializer
            .try_serialize(class_name, body)?
            .ok_or_else(|| WsmanError::NotAnInstance(class_name.to_string()))?;
        self.call(
            WsmanAction::Put {
                selector,
                body: &fragment,
            },
            class_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Transport rejouant des réponses préenregistrées
    struct ScriptedTransport {
        responses: RefCell<VecDeque<String>>,
        requests: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: RefCell::new(responses.iter().map(|r| r.to_string()).collect()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl WsmanTransport for ScriptedTransport {
        fn post(&self, envelope: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(envelope.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .map(String::into_bytes)
                .ok_or_else(|| WsmanError::transport("no more scripted responses"))
        }
    }

    fn envelope(body: &str) -> String {
        format!(
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Header><RelatesTo>1</RelatesTo></s:Header><s:Body>{body}</s:Body></s:Envelope>"#
        )
    }

    #[test]
    fn test_enumerate_stops_on_end_of_sequence() {
        let responses = [
            envelope("<EnumerateResponse><EnumerationContext>CTX1</EnumerationContext></EnumerateResponse>"),
            envelope("<PullResponse><EnumerationContext>CTX2</EnumerationContext><Items><CIM_SoftwareIdentity><InstanceID>a</InstanceID></CIM_SoftwareIdentity><CIM_SoftwareIdentity><InstanceID>b</InstanceID></CIM_SoftwareIdentity></Items></PullResponse>"),
            envelope("<PullResponse><Items><CIM_SoftwareIdentity><InstanceID>c</InstanceID></CIM_SoftwareIdentity></Items><EndOfSequence/></PullResponse>"),
        ];
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let transport = ScriptedTransport::new(&refs);
        let session = WsmanSession::new(&transport);

        let items = session.enumerate("CIM_SoftwareIdentity").unwrap();
        let ids: Vec<&str> = items
            .iter()
            .filter_map(|item| item.get("InstanceID").and_then(Node::as_str))
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 3);
        assert!(requests[1].contains("<EnumerationContext>CTX1</EnumerationContext>"));
        assert!(requests[2].contains("<EnumerationContext>CTX2</EnumerationContext>"));
    }

    #[test]
    fn test_enumerate_stops_without_pull_response() {
        let responses = [
            envelope("<EnumerateResponse><EnumerationContext>CTX1</EnumerationContext></EnumerateResponse>"),
            envelope(""),
        ];
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let session = WsmanSession::new(ScriptedTransport::new(&refs));

        assert!(session.enumerate("CIM_SoftwareIdentity").unwrap().is_empty());
    }

    #[test]
    fn test_enumerate_without_context() {
        let responses = [envelope("<EnumerateResponse/>")];
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let session = WsmanSession::new(ScriptedTransport::new(&refs));

        assert!(matches!(
            session.enumerate("CIM_SoftwareIdentity"),
            Err(WsmanError::MissingEnumerationContext(_))
        ));
    }

    #[test]
    fn test_enumerate_pull_limit() {
        let pull = envelope("<PullResponse><EnumerationContext>CTX</EnumerationContext><Items/></PullResponse>");
        let responses = [
            envelope("<EnumerateResponse><EnumerationContext>CTX</EnumerationContext></EnumerateResponse>"),
            pull.clone(),
            pull,
        ];
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let config = WsmanConfig {
            max_pulls: 2,
            ..WsmanConfig::default()
        };
        let session = WsmanSession::with_config(ScriptedTransport::new(&refs), &config);

        assert!(matches!(
            session.enumerate("CIM_SoftwareIdentity"),
            Err(WsmanError::PullLimitExceeded(2))
        ));
    }

    #[test]
    fn test_unknown_class_never_reaches_transport() {
        let transport = ScriptedTransport::new(&[]);
        let session = WsmanSession::new(&transport);

        assert!(matches!(session.get("XYZ_Foo"), Err(WsmanError::UnknownNamespace(_))));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_get_then_put() {
        let responses = [
            envelope("<AMT_GeneralSettings><HostName>nuc</HostName><DDNSTTL>900</DDNSTTL></AMT_GeneralSettings>"),
            envelope("<AMT_GeneralSettings><HostName>NUCMC</HostName><DDNSTTL>900</DDNSTTL></AMT_GeneralSettings>"),
        ];
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let transport = ScriptedTransport::new(&refs);
        let session = WsmanSession::new(&transport);

        let mut document = session.get("AMT_GeneralSettings").unwrap();
        document
            .body
            .get_mut("AMT_GeneralSettings")
            .and_then(Node::as_object_mut)
            .unwrap()
            .insert("HostName".to_string(), Node::from("NUCMC"));

        let updated = session.put("AMT_GeneralSettings", "", &document.body).unwrap();
        assert_eq!(
            updated.body["AMT_GeneralSettings"].get("HostName").and_then(Node::as_str),
            Some("NUCMC")
        );

        let requests = transport.requests.borrow();
        assert!(requests[1].contains("transfer/Put"));
        assert!(requests[1].contains("<r:HostName>NUCMC</r:HostName>"));
        assert!(requests[1].contains("<r:DDNSTTL>900</r:DDNSTTL>"));
    }

    #[test]
    fn test_put_missing_class() {
        let session = WsmanSession::new(ScriptedTransport::new(&[]));
        assert!(matches!(
            session.put("AMT_GeneralSettings", "", &NodeMap::new()),
            Err(WsmanError::NotAnInstance(_))
        ));
    }
}

use pmowsman::soap::{
    BodySerializer, FieldOrder, Node, PullPage, build_get, build_pull, build_put, parse_fragment,
    parse_wsman, parse_wsman_reader, render_selector_set, serialize_put_body,
};
use pmowsman::{SchemaFamily, WsmanError, resolve};

const GENERAL_SETTINGS: &[u8] = include_bytes!("data/gensettings.xml");
const ENUMERATE_RESPONSE: &[u8] = include_bytes!("data/enumerate_response.xml");
const PULL_RESPONSE: &[u8] = include_bytes!("data/pull_response.xml");

#[test]
fn test_resolve_every_family() {
    for family in SchemaFamily::ALL {
        let class = format!("{}_Something", family.prefix());
        let uri = resolve(&class).unwrap();
        assert_eq!(uri.as_str(), format!("{}{}", family.base_uri(), class));
    }
    assert!(matches!(resolve("WMI_Foo"), Err(WsmanError::UnknownNamespace(_))));
}

#[test]
fn test_parse_general_settings() {
    let document = parse_wsman(GENERAL_SETTINGS).unwrap();
    let settings = &document.body["AMT_GeneralSettings"];

    assert_eq!(settings.get("HostName"), Some(&Node::from("nuc")));
    assert_eq!(settings.get("DDNSTTL"), Some(&Node::from(900)));
    assert_eq!(settings.get("WsmanOnlyMode"), Some(&Node::from(false)));
    assert_eq!(settings.get("DomainName"), Some(&Node::from("")));
    assert_eq!(
        settings.get("DigestRealm").and_then(Node::as_str),
        Some("Digest:A3829B3827DE4D33D4449B366831FD01")
    );
    assert_eq!(
        document.header["ResourceURI"].as_str(),
        Some("http://intel.com/wbem/wscim/1/amt-schema/1/AMT_GeneralSettings")
    );
}

#[test]
fn test_parse_from_reader() {
    let from_reader = parse_wsman_reader(std::io::Cursor::new(GENERAL_SETTINGS)).unwrap();
    assert_eq!(from_reader, parse_wsman(GENERAL_SETTINGS).unwrap());
}

#[test]
fn test_enumerate_then_pull() {
    let document = parse_wsman(ENUMERATE_RESPONSE).unwrap();
    let context = document.body["EnumerateResponse"].get("EnumerationContext");
    assert_eq!(context.and_then(Node::as_str), Some("CTX123"));
    assert_eq!(document.enumeration_context().as_deref(), Some("CTX123"));

    let pull = build_pull("CIM_SoftwareIdentity", "urn:uuid:pull-1", "CTX123");
    assert!(pull.contains("<EnumerationContext>CTX123</EnumerationContext>"));
}

#[test]
fn test_pull_page() {
    let document = parse_wsman(PULL_RESPONSE).unwrap();
    let page = PullPage::from_document(&document, "CIM_SoftwareIdentity").unwrap();

    assert!(page.end_of_sequence);
    assert_eq!(page.context, None);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].get("InstanceID").and_then(Node::as_str), Some("Flash"));
    assert_eq!(page.items[2].get("VersionString").and_then(Node::as_i64), Some(1934));
    assert_eq!(page.items[1].get("IsEntity").and_then(Node::as_bool), Some(true));
}

#[test]
fn test_single_item_is_not_wrapped() {
    let xml = br#"<a:Envelope xmlns:a="http://www.w3.org/2003/05/soap-envelope"><a:Header/><a:Body><PullResponse><Items><CIM_SoftwareIdentity><InstanceID>Flash</InstanceID></CIM_SoftwareIdentity></Items></PullResponse></a:Body></a:Envelope>"#;
    let document = parse_wsman(xml).unwrap();

    let found = document.body["PullResponse"]
        .get("Items")
        .and_then(|items| items.get("CIM_SoftwareIdentity"))
        .unwrap();
    assert!(found.as_collection().is_none());
    assert!(found.as_object().is_some());

    let page = PullPage::from_document(&document, "CIM_SoftwareIdentity").unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(!page.end_of_sequence);
}

#[test]
fn test_get_unknown_class() {
    assert_eq!(build_get("XYZ_Foo", "urn:uuid:abc"), "");
    let xml = build_get("AMT_GeneralSettings", "urn:uuid:abc");
    assert!(xml.contains("urn:uuid:abc"));
    assert!(xml.contains("AMT_GeneralSettings</c:ResourceURI>"));
}

#[test]
fn test_update_host_name_round_trip() {
    let mut document = parse_wsman(GENERAL_SETTINGS).unwrap();
    document
        .body
        .get_mut("AMT_GeneralSettings")
        .and_then(Node::as_object_mut)
        .unwrap()
        .insert("HostName".to_string(), Node::from("NUCMC"));

    let fragment = serialize_put_body("AMT_GeneralSettings", &document.body);
    let reparsed = parse_fragment(fragment.as_bytes()).unwrap();
    assert_eq!(
        reparsed["AMT_GeneralSettings"].get("HostName").and_then(Node::as_str),
        Some("NUCMC")
    );

    // Tous les scalaires reviennent à l'identique
    assert_eq!(reparsed["AMT_GeneralSettings"], document.body["AMT_GeneralSettings"]);

    let selector = render_selector_set(&[("InstanceID", "Intel(r) AMT: General Settings")]);
    let put = build_put("AMT_GeneralSettings", "urn:uuid:put-1", &selector, &fragment);
    let request = parse_wsman(put.as_bytes()).unwrap();
    assert_eq!(
        request.header["SelectorSet"].get("Selector").and_then(Node::as_str),
        Some("Intel(r) AMT: General Settings")
    );
    assert_eq!(
        request.body["AMT_GeneralSettings"].get("HostName").and_then(Node::as_str),
        Some("NUCMC")
    );
}

#[test]
fn test_sorted_serialization_is_stable() {
    let document = parse_wsman(GENERAL_SETTINGS).unwrap();
    let serializer = BodySerializer::new(FieldOrder::Sorted);

    let first = serializer.serialize_put_body("AMT_GeneralSettings", &document.body);
    let second = serializer.serialize_put_body("AMT_GeneralSettings", &document.body);
    assert_eq!(first, second);

    let amt = first.find("<r:AMTNetworkEnabled>").unwrap();
    let wsman = first.find("<r:WsmanOnlyMode>").unwrap();
    assert!(amt < wsman);
}

#[test]
fn test_json_dump() {
    let document = parse_wsman(PULL_RESPONSE).unwrap();
    let json = serde_json::to_value(&document).unwrap();

    let items = &json["Body"]["PullResponse"]["Items"]["CIM_SoftwareIdentity"];
    assert_eq!(items.as_array().map(Vec::len), Some(3));
    assert_eq!(items[2]["VersionString"], 1934);
    assert_eq!(json["Body"]["PullResponse"]["EndOfSequence"], "");
}

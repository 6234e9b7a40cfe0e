//! Affiche les quatre requêtes WSMAN pour une classe
//!
//! Usage: `cargo run -p pmowsman --example build_requests -- AMT_GeneralSettings`

use pmowsman::get_config;
use pmowsman::soap::{BodySerializer, EnvelopeBuilder, Node, NodeMap, render_selector_set};
use uuid::Uuid;

fn main() {
    tracing_subscriber::fmt::init();

    let class = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "AMT_GeneralSettings".to_string());

    let config = get_config();
    let builder = EnvelopeBuilder::from_config(&config);

    println!("=== Get ===\n{}", builder.build_get(&class, &Uuid::new_v4().to_string()));
    println!("=== Enumerate ===\n{}", builder.build_enumerate(&class, &Uuid::new_v4().to_string()));
    println!(
        "=== Pull ===\n{}",
        builder.build_pull(&class, &Uuid::new_v4().to_string(), "CTX123")
    );

    let mut instance = NodeMap::new();
    instance.insert("HostName".to_string(), Node::from("NUCMC"));
    instance.insert("DDNSTTL".to_string(), Node::from(900));
    let mut body = NodeMap::new();
    body.insert(class.clone(), Node::Object(instance));

    let fragment = BodySerializer::from_config(&config).serialize_put_body(&class, &body);
    let selector = render_selector_set(&[("InstanceID", "Intel(r) AMT: General Settings")]);
    println!(
        "=== Put ===\n{}",
        builder.build_put(&class, &Uuid::new_v4().to_string(), &selector, &fragment)
    );
}

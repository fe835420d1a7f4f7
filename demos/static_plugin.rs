//! # Static Plugin
//!
//! Registers the `debughttp` plugin into the process-wide registry and uses
//! its source twice:
//!
//! 1. Explicitly: create `debughttpsrc`, set `location`, stream the body to a
//!    hex dump until end of stream.
//! 2. By URI: ask the registry for any source handling an `https://` URI and
//!    check that the debug source was chosen.
//!
//! ```text
//! [debughttpsrc] → hexdump
//! ```
//!
//! Run: `RUST_LOG=debughttp=debug cargo run --example static_plugin`

use debughttp::bus::{Bus, Message};
use debughttp::error::{Error, Result};
use debughttp::flow::FlowStatus;
use debughttp::plugin::Registry;
use debughttp::uri::UriType;
use tracing_subscriber::EnvFilter;

const CHUNK: usize = 4096;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let factory = debughttp::register_static()?;
    let registry = Registry::global();

    println!("=== Static Plugin Example ===\n");
    for plugin in registry.list_plugins() {
        if let Some(meta) = registry.plugin_metadata(&plugin) {
            println!("plugin {} {} ({})", meta.name, meta.version, meta.description);
        }
    }

    println!("\n1. Explicit invocation");
    explicit_invocation(registry, factory)?;

    println!("\n2. Invocation by URI");
    uri_invocation(registry, factory)?;

    Ok(())
}

fn explicit_invocation(registry: &Registry, factory: &str) -> Result<()> {
    let src = registry.make_element(factory, None)?;
    let (bus, messages) = Bus::new();
    src.set_bus(Some(bus));

    src.set_property("location", "https://www.example.com")?;
    src.start()?;

    let mut total = 0u64;
    let flow = loop {
        match src.create(0, CHUNK) {
            Ok(buffer) => {
                hexdump(total, buffer.as_slice());
                total += buffer.size() as u64;
            }
            Err(flow) => break flow,
        }
    };
    src.stop()?;

    for message in messages.drain() {
        match message {
            Message::Warning(w) => eprintln!("warning: {w}"),
            Message::Error(e) => eprintln!("error: {e}"),
        }
    }

    println!("{total} bytes, stopped with {flow}");
    match flow {
        FlowStatus::EndOfStream => Ok(()),
        flow => Err(Error::InvalidState(format!("streaming stopped: {flow}"))),
    }
}

fn uri_invocation(registry: &Registry, factory: &str) -> Result<()> {
    let src = registry.make_element_from_uri(
        UriType::Src,
        "https://another.example.com",
        Some("httpSrc"),
    )?;

    let location = src.property_as::<String>("location")?.unwrap_or_default();
    println!(
        "{} created by {:?} for {location}",
        src.name(),
        src.factory_name()
    );

    if src.factory_name() != Some(factory) {
        return Err(Error::ElementNotFound(format!(
            "expected {factory} to handle the URI"
        )));
    }
    Ok(())
}

fn hexdump(base: u64, data: &[u8]) {
    for (i, line) in data.chunks(16).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{b:02x}")).collect();
        let text: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        println!("{:08x}  {:<47}  |{text}|", base + (i * 16) as u64, hex.join(" "));
    }
}

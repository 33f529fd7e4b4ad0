use std::path::Path;
use std::process;
use std::sync::Arc;

use serde::Serialize;

use dotbit_address::{AddressFormat, ChainAddress, ChainType, LockArgsCodec};
use dotbit_types::bytes::decode_hex;

use crate::config::CliConfig;
use crate::{report_error, OutputFormat};

/// One decoded segment. `address_normal` is absent when the display form
/// needs a contract the config does not name.
#[derive(Debug, Serialize)]
struct SegmentView {
    chain_type: ChainType,
    tag: u8,
    address_hex: String,
    address_normal: Option<String>,
}

fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> CliConfig {
    match CliConfig::load_optional(path) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

fn segment_view(format: &AddressFormat, addr: &ChainAddress) -> SegmentView {
    let address_normal = match format.hex_to_normal(addr) {
        Ok(normal) => Some(normal.address_normal),
        Err(e) => {
            tracing::debug!(chain = %addr.chain_type(), error = %e, "no display form");
            None
        }
    };
    SegmentView {
        chain_type: addr.chain_type(),
        tag: addr.chain_type().tag(),
        address_hex: addr.to_address_hex().address_hex,
        address_normal,
    }
}

pub(crate) fn cmd_decode_args(args: &str, config: Option<&Path>, output: OutputFormat, quiet: bool) {
    let config = load_config(config, output, quiet);
    let registry = match config.registry() {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let blob = match decode_hex(args) {
        Ok(b) => b,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let format = AddressFormat::new(
        config.net,
        LockArgsCodec::new(config.length_table()),
        Arc::new(registry),
    );
    let (owner, manager) = match format.codec().decode(&blob) {
        Ok(pair) => pair,
        Err(e) => {
            report_error(&format!("error: malformed lock args: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let owner = segment_view(&format, &owner);
    let manager = segment_view(&format, &manager);
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({ "owner": owner, "manager": manager });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            for (role, seg) in [("owner", &owner), ("manager", &manager)] {
                println!(
                    "{:<8} {} {} {}",
                    role,
                    seg.chain_type,
                    seg.address_hex,
                    seg.address_normal.as_deref().unwrap_or("-")
                );
            }
        }
    }
}

pub(crate) fn cmd_encode_args(
    owner: (ChainType, &str),
    manager: (ChainType, &str),
    config: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config, output, quiet);
    let table = config.length_table();
    let mut segments = Vec::with_capacity(2);
    for (chain, payload_hex) in [owner, manager] {
        let addr = decode_hex(payload_hex)
            .map_err(|e| e.to_string())
            .and_then(|payload| {
                ChainAddress::new(chain, payload, &table).map_err(|e| e.to_string())
            });
        match addr {
            Ok(a) => segments.push(a),
            Err(msg) => {
                report_error(&format!("error: {}", msg), output, quiet);
                process::exit(1);
            }
        }
    }
    let codec = LockArgsCodec::new(table);
    let args = match codec.encode(&segments[0], &segments[1]) {
        Ok(a) => a,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let hex_args = format!("0x{}", hex::encode(&args));
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "args": hex_args }));
        }
        OutputFormat::Text => println!("{}", hex_args),
    }
}

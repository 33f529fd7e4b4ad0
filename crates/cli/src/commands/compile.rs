use std::path::Path;
use std::process;
use std::sync::Arc;

use dotbit_message::{CellLineItem, MessageCompiler, StaticWitnessDecoder, TransactionSummary};

use crate::config::CliConfig;
use crate::fixture::TxFixture;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_compile(
    tx_path: &Path,
    config_path: &Path,
    chain_id: Option<u64>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = match CliConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let registry = match config.registry() {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let fixture = match TxFixture::load(tx_path) {
        Ok(f) => f,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let compiler = MessageCompiler::new(
        config.net,
        Arc::new(registry),
        Arc::new(fixture.cell_lookup()),
        Arc::new(StaticWitnessDecoder::new(fixture.witness.clone())),
    )
    .with_length_table(config.length_table());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("error: failed to start runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let evm_chain_id = chain_id.unwrap_or(config.evm_chain_id);
    let summary = match rt.block_on(compiler.compile(&fixture.transaction, evm_chain_id)) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                report_error(&format!("error: {}", e), output, quiet);
                process::exit(1);
            }
        },
        OutputFormat::Text => print_summary(&summary, quiet),
    }
}

fn print_summary(summary: &TransactionSummary, quiet: bool) {
    if quiet {
        println!("{}", summary.message);
        return;
    }
    println!("action:   {} ({})", summary.action.action, summary.action.params);
    println!("chain id: {}", summary.chain_id);
    println!("inputs:   {}", summary.inputs_capacity);
    println!("outputs:  {}", summary.outputs_capacity);
    println!("fee:      {}", summary.fee);
    print_cells("input cells", &summary.inputs);
    print_cells("output cells", &summary.outputs);
    println!("message:  {}", summary.message);
}

fn print_cells(label: &str, cells: &[CellLineItem]) {
    if cells.is_empty() {
        return;
    }
    println!("{}:", label);
    for (i, cell) in cells.iter().enumerate() {
        println!("  [{}] {}", i, cell.capacity);
        println!("      lock:  {}", cell.lock);
        println!("      type:  {}", cell.type_);
        println!("      data:  {}", cell.data);
        if !cell.extra_data.is_empty() {
            println!("      extra: {}", cell.extra_data);
        }
    }
}

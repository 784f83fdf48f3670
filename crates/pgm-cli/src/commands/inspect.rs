//! Dataset inspection: metadata and buffer requirements, without parsing
//! any cell.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use pgm_cli::OutputFormat;
use pgm_core::meta_data;
use pgm_io::{BufferDescriptor, Deserializer, ElementsPerScenario};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

#[derive(Serialize)]
struct DatasetReport<'a> {
    dataset: &'a str,
    version: &'a str,
    is_batch: bool,
    batch_size: usize,
    components: Vec<ComponentReport<'a>>,
}

#[derive(Serialize)]
struct ComponentReport<'a> {
    #[serde(flatten)]
    descriptor: &'a BufferDescriptor<'a>,
    record_size: usize,
    data_size: usize,
    needs_indptr: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    declared_attributes: Option<Vec<&'a str>>,
}

pub fn handle(file: &Path, format: OutputFormat) -> Result<()> {
    info!("Inspecting dataset {}", file.display());
    let deserializer = Deserializer::from_json_file(file, meta_data())?;
    let report = DatasetReport {
        dataset: deserializer.dataset_name(),
        version: deserializer.version(),
        is_batch: deserializer.is_batch(),
        batch_size: deserializer.batch_size(),
        components: deserializer
            .buffer_descriptors()
            .iter()
            .map(|descriptor| ComponentReport {
                descriptor,
                record_size: descriptor.component.size(),
                data_size: descriptor.data_size(),
                needs_indptr: descriptor.needs_indptr(),
                declared_attributes: deserializer
                    .declared_attributes(descriptor.name())
                    .map(|attrs| attrs.iter().map(|a| a.name()).collect()),
            })
            .collect(),
    };

    match format {
        OutputFormat::Plain => print_report(&report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn print_report(report: &DatasetReport) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Dataset:\t{}", report.dataset)?;
    writeln!(writer, "Version:\t{}", report.version)?;
    writeln!(writer, "Batch:\t{}", report.is_batch)?;
    writeln!(writer, "Batch size:\t{}", report.batch_size)?;
    writeln!(writer, "Components:\t{}", report.components.len())?;
    writer.flush()?;

    if report.components.is_empty() {
        return Ok(());
    }
    println!();

    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "COMPONENT\tPER SCENARIO\tTOTAL\tRECORD BYTES\tBUFFER BYTES\tINDPTR"
    )?;
    for component in &report.components {
        let per_scenario = match component.descriptor.elements_per_scenario {
            ElementsPerScenario::Uniform(n) => n.to_string(),
            ElementsPerScenario::Variable => "variable".to_string(),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            component.descriptor.name(),
            per_scenario,
            component.descriptor.total_elements,
            component.record_size,
            component.data_size,
            if component.needs_indptr { "yes" } else { "no" },
        )?;
    }
    writer.flush()?;
    Ok(())
}

//! Full deserialization of a dataset into owned buffers, printing the
//! decoded records.
//!
//! The JSON output is itself a valid keyed-row dataset document: attributes
//! left at their sentinel are omitted, infinities are written as `"inf"` /
//! `"-inf"`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use pgm_cli::OutputFormat;
use pgm_core::{meta_data, AttributeValue};
use pgm_io::{ComponentBuffer, Deserializer, OwnedBuffer, OwnedBuffers};
use serde_json::{json, Map, Number, Value};
use tabwriter::TabWriter;
use tracing::{info, warn};

/// Header fields captured before the buffers are read back.
struct Summary {
    dataset: &'static str,
    version: String,
    is_batch: bool,
    batch_size: usize,
}

pub fn handle(
    file: &Path,
    components: &[String],
    format: OutputFormat,
    out: Option<&Path>,
) -> Result<()> {
    info!("Parsing dataset {}", file.display());
    let mut deserializer = Deserializer::from_json_file(file, meta_data())?;

    for name in components {
        if !deserializer.dataset().has_component(name) {
            bail!(
                "Component '{}' does not exist in dataset '{}'",
                name,
                deserializer.dataset_name()
            );
        }
        if deserializer.find_buffer_descriptor(name).is_none() {
            warn!("Component '{name}' has no rows in {}", file.display());
        }
    }

    let summary = Summary {
        dataset: deserializer.dataset_name(),
        version: deserializer.version().to_string(),
        is_batch: deserializer.is_batch(),
        batch_size: deserializer.batch_size(),
    };

    let selection: Vec<&str> = components.iter().map(String::as_str).collect();
    let mut buffers = OwnedBuffers::allocate(
        &deserializer,
        (!selection.is_empty()).then_some(selection.as_slice()),
    );
    buffers
        .bind(&mut deserializer)
        .context("binding component buffers")?;
    deserializer
        .parse()
        .with_context(|| format!("deserializing '{}'", file.display()))?;
    drop(deserializer);

    info!(
        "Deserialized {} component(s) from {} scenario(s)",
        buffers.len(),
        summary.batch_size
    );

    let mut output = Vec::new();
    match format {
        OutputFormat::Plain => write_tables(&mut output, &summary, &buffers)?,
        OutputFormat::Json => {
            let document = to_document(&summary, &buffers);
            serde_json::to_writer_pretty(&mut output, &document)?;
            writeln!(output)?;
        }
    }

    match out {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("writing output to '{}'", path.display()))?;
            info!("Wrote records to {}", path.display());
        }
        None => io::stdout().write_all(&output)?,
    }
    Ok(())
}

fn write_tables(output: &mut Vec<u8>, summary: &Summary, buffers: &OwnedBuffers) -> Result<()> {
    writeln!(
        output,
        "{} dataset (version {}), {} scenario(s)",
        summary.dataset, summary.version, summary.batch_size
    )?;

    for buffer in buffers.iter() {
        let view = buffer.view();
        let component = view.component();
        writeln!(output)?;
        writeln!(output, "{} ({} records)", component.name(), view.len())?;

        let mut writer = TabWriter::new(&mut *output);
        let mut header: Vec<String> = Vec::new();
        if summary.is_batch {
            header.push("SCENARIO".to_string());
        }
        header.extend(component.attributes().iter().map(|a| a.name().to_uppercase()));
        writeln!(writer, "{}", header.join("\t"))?;

        for scenario in 0..summary.batch_size {
            let Some(range) = buffer.scenario_range(scenario) else {
                continue;
            };
            for index in range {
                let Some(values) = view.values(index) else {
                    continue;
                };
                let mut cells: Vec<String> = Vec::with_capacity(values.len() + 1);
                if summary.is_batch {
                    cells.push(scenario.to_string());
                }
                cells.extend(values.iter().map(|(_, value)| format_value(value)));
                writeln!(writer, "{}", cells.join("\t"))?;
            }
        }
        writer.flush()?;
    }
    Ok(())
}

/// Rebuild a keyed-row document from the filled buffers.
fn to_document(summary: &Summary, buffers: &OwnedBuffers) -> Value {
    let scenarios: Vec<Value> = (0..summary.batch_size)
        .map(|scenario| {
            let mut components = Map::new();
            for buffer in buffers.iter() {
                let rows = scenario_rows(buffer, scenario);
                if !rows.is_empty() {
                    components.insert(buffer.descriptor.name().to_string(), Value::Array(rows));
                }
            }
            Value::Object(components)
        })
        .collect();

    let data = if summary.is_batch {
        Value::Array(scenarios)
    } else {
        scenarios
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Map::new()))
    };

    json!({
        "version": summary.version,
        "type": summary.dataset,
        "is_batch": summary.is_batch,
        "data": data,
    })
}

fn scenario_rows(buffer: &OwnedBuffer, scenario: usize) -> Vec<Value> {
    let view: ComponentBuffer = buffer.view();
    let Some(range) = buffer.scenario_range(scenario) else {
        return Vec::new();
    };
    range
        .filter_map(|index| view.values(index))
        .map(|values| {
            let row: Map<String, Value> = values
                .into_iter()
                .filter(|(_, value)| !value.is_na())
                .map(|(name, value)| (name.to_string(), value_to_json(&value)))
                .collect();
            Value::Object(row)
        })
        .collect()
}

fn real_to_json(value: f64) -> Value {
    if value.is_nan() {
        Value::Null
    } else if value.is_infinite() {
        Value::String(if value > 0.0 { "inf" } else { "-inf" }.to_string())
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn value_to_json(value: &AttributeValue) -> Value {
    if value.is_na() {
        return Value::Null;
    }
    match value {
        AttributeValue::Int32(v) => json!(v),
        AttributeValue::Int8(v) => json!(v),
        AttributeValue::Bool(v) => json!(v),
        AttributeValue::Double(v) => real_to_json(*v),
        AttributeValue::Double3(phases) => {
            Value::Array(phases.iter().copied().map(real_to_json).collect())
        }
    }
}

fn format_real(value: f64) -> String {
    if value.is_nan() {
        "null".to_string()
    } else {
        value.to_string()
    }
}

fn format_value(value: &AttributeValue) -> String {
    if value.is_na() {
        return "null".to_string();
    }
    match value {
        AttributeValue::Int32(v) => v.to_string(),
        AttributeValue::Int8(v) => v.to_string(),
        AttributeValue::Bool(v) => v.map_or("null".to_string(), |b| b.to_string()),
        AttributeValue::Double(v) => format_real(*v),
        AttributeValue::Double3(phases) => format!(
            "[{}, {}, {}]",
            format_real(phases[0]),
            format_real(phases[1]),
            format_real(phases[2])
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinities_round_trip_as_strings() {
        assert_eq!(real_to_json(f64::INFINITY), json!("inf"));
        assert_eq!(real_to_json(f64::NEG_INFINITY), json!("-inf"));
        assert_eq!(real_to_json(f64::NAN), Value::Null);
        assert_eq!(real_to_json(0.5), json!(0.5));
    }

    #[test]
    fn partial_phase_renders_null_phase() {
        let value = AttributeValue::Double3([1.0, f64::NAN, 3.0]);
        assert_eq!(value_to_json(&value), json!([1.0, null, 3.0]));
        assert_eq!(format_value(&value), "[1, null, 3]");
    }

    #[test]
    fn sentinel_renders_as_null() {
        assert_eq!(format_value(&AttributeValue::Int32(pgm_core::NA_INT32)), "null");
        assert_eq!(format_value(&AttributeValue::Bool(Some(true))), "true");
    }
}

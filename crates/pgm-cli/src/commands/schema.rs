//! Listing of the built-in component registry.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use pgm_cli::OutputFormat;
use pgm_core::{meta_data, ComponentMeta, DatasetMeta};
use serde_json::{Map, Value};
use tabwriter::TabWriter;

pub fn handle(dataset: Option<&str>, component: Option<&str>, format: OutputFormat) -> Result<()> {
    let selected = select(dataset, component)?;
    match format {
        OutputFormat::Plain => print_tables(&selected),
        OutputFormat::Json => {
            let mut datasets = Map::new();
            for (dataset, components) in &selected {
                datasets.insert(
                    dataset.name().to_string(),
                    serde_json::to_value(components)?,
                );
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(datasets))?);
            Ok(())
        }
    }
}

type Selection = Vec<(&'static DatasetMeta, Vec<&'static ComponentMeta>)>;

fn select(dataset: Option<&str>, component: Option<&str>) -> Result<Selection> {
    let meta = meta_data();
    let datasets: Vec<&DatasetMeta> = match dataset {
        Some(name) => vec![meta.get_dataset(name)?],
        None => meta.datasets().iter().collect(),
    };

    let selected: Selection = datasets
        .into_iter()
        .map(|dataset| {
            let components: Vec<&ComponentMeta> = dataset
                .components()
                .iter()
                .filter(|c| component.map_or(true, |name| c.name() == name))
                .collect();
            (dataset, components)
        })
        .filter(|(_, components)| !components.is_empty())
        .collect();

    if selected.is_empty() {
        if let Some(name) = component {
            return Err(anyhow!("Unknown component '{name}'"));
        }
    }
    Ok(selected)
}

fn print_tables(selected: &Selection) -> Result<()> {
    let mut stdout = io::stdout();
    for (dataset, components) in selected {
        for component in components {
            writeln!(
                stdout,
                "{}/{} ({} bytes, align {})",
                dataset.name(),
                component.name(),
                component.size(),
                component.alignment()
            )?;
            let mut writer = TabWriter::new(&mut stdout);
            writeln!(writer, "  ATTRIBUTE\tTYPE\tOFFSET\tSIZE")?;
            for attribute in component.attributes() {
                writeln!(
                    writer,
                    "  {}\t{}\t{}\t{}",
                    attribute.name(),
                    attribute.ctype(),
                    attribute.offset(),
                    attribute.size()
                )?;
            }
            writer.flush()?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

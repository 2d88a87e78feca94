//! Known fruit listing

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

use crate::client::{ApiClient, FruitList};
use crate::output::{print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct FruitRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Fruit")]
    name: String,
}

/// List the fruits the server can price
pub async fn list_fruits(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: FruitList = client.get("fruits").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.available_fruits.is_empty() {
                print_warning("No fruits found");
                return Ok(());
            }

            let rows: Vec<FruitRow> = result
                .available_fruits
                .iter()
                .enumerate()
                .map(|(i, name)| FruitRow {
                    index: i + 1,
                    name: name.clone(),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} fruits", result.available_fruits.len());
        }
    }

    Ok(())
}

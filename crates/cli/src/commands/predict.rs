//! Price prediction command

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::client::{ApiClient, PredictRequest, PredictionResult};
use crate::output::{format_price, print_json, print_success, print_warning, OutputFormat};

/// Form the fruit is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Form {
    Fresh,
    Frozen,
    Dried,
    Juice,
}

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Model")]
    model: &'static str,
    #[tabled(rename = "Predicted Price")]
    price: String,
}

/// Build the request body, setting exactly the flag for `form`
pub fn build_request(
    fruit: String,
    form: Form,
    yield_factor: f64,
    cup_eq_size: f64,
    cup_eq_price: f64,
) -> PredictRequest {
    PredictRequest {
        fruit,
        form_dried: form == Form::Dried,
        form_fresh: form == Form::Fresh,
        form_frozen: form == Form::Frozen,
        form_juice: form == Form::Juice,
        yield_factor,
        cup_eq_size,
        cup_eq_price,
    }
}

/// Request a prediction and print the three model outputs
pub async fn predict_price(
    client: &ApiClient,
    request: &PredictRequest,
    format: OutputFormat,
) -> Result<()> {
    let result: PredictionResult = client.post("predict", request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.matched_fruit.eq_ignore_ascii_case(request.fruit.trim()) {
                print_success(&format!("Fruit: {}", result.matched_fruit));
            } else {
                print_warning(&format!(
                    "'{}' matched to {}",
                    request.fruit,
                    result.matched_fruit.bold()
                ));
            }

            let p = &result.predictions;
            let rows = vec![
                PredictionRow {
                    model: "Random Forest",
                    price: format_price(p.random_forest),
                },
                PredictionRow {
                    model: "Linear Regression",
                    price: format_price(p.linear_regression),
                },
                PredictionRow {
                    model: "Decision Tree",
                    price: format_price(p.decision_tree),
                },
            ];

            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

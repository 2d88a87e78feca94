//! Service status command

use anyhow::Result;
use serde::Serialize;

use crate::client::{ApiClient, HealthStatus, ServiceInfo};
use crate::output::{color_status, print_info, print_json, OutputFormat};

#[derive(Serialize)]
struct InfoReport {
    service: ServiceInfo,
    health: HealthStatus,
}

/// Show the service banner, the models it serves and its health
pub async fn show_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let service: ServiceInfo = client.get("").await?;
    let health: HealthStatus = client.get("healthz").await?;

    match format {
        OutputFormat::Json => print_json(&InfoReport { service, health })?,
        OutputFormat::Table => {
            print_info(&service.message);
            println!("Status: {}", color_status(&health.status));
            println!("Known fruits: {}", health.known_fruits);
            println!("\nModels ({}):", health.models_loaded);
            for model in &service.models {
                println!("  - {}", model);
            }
        }
    }

    Ok(())
}

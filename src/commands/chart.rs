//! Chart calculation and place lookup against the backend

use anyhow::{Context, Result};

use crate::backend::{ChartRequest, ElementKind};
use crate::Site;

/// Look up a birth place, calculate a temporary chart and print its summary
pub async fn run(site: &Site, birth_date: &str, birth_time: Option<&str>, place: &str) -> Result<()> {
    let backend = site.backend();

    let predictions = backend.autocomplete(place).await?;
    let prediction = predictions
        .first()
        .with_context(|| format!("No place found for {:?}", place))?;
    tracing::info!("Using place: {}", prediction.description);

    let details = backend.place_details(&prediction.place_id).await?;
    let request = ChartRequest::new(birth_date, birth_time, &details);
    let chart_id = backend.calculate_chart(&request).await?;
    println!("Temporary chart: {}", chart_id);

    let chart = backend.chart(&chart_id).await?;
    for name in ["energy_type", "strategy", "authority", "profile"] {
        if let Some(value) = chart.attribute(name) {
            println!("  {}: {}", name, value);
        }
    }
    println!(
        "  centers: {}, channels: {}, gates: {}",
        chart.elements_of(ElementKind::Center).count(),
        chart.elements_of(ElementKind::Channel).count(),
        chart.elements_of(ElementKind::Gate).count()
    );

    Ok(())
}

/// Print place predictions for a partial input
pub async fn places(site: &Site, input: &str) -> Result<()> {
    let predictions = site.backend().autocomplete(input).await?;
    for p in predictions {
        println!("{}  [{}]", p.description, p.place_id);
    }
    Ok(())
}

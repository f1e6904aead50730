//! Estimates the monthly climate of central Oslo.
//!
//! Needs a Frost client id in `FROST_CLIENT_ID`.

use frost_climate::{
    FrostClimate, FrostClimateError, Point, MEAN_AIR_TEMPERATURE, MEAN_CLOUD_AREA_FRACTION,
    MEAN_SNOW_COVERAGE_TYPE,
};

#[tokio::main]
async fn main() -> Result<(), FrostClimateError> {
    let client = FrostClimate::from_env()?;

    let profile = client
        .climate_profile()
        .location(Point::new(59.91, 10.75).with_elevation(23.0))
        .elements(vec![
            MEAN_AIR_TEMPERATURE.to_string(),
            MEAN_SNOW_COVERAGE_TYPE.to_string(),
            MEAN_CLOUD_AREA_FRACTION.to_string(),
        ])
        .call()
        .await?;

    for element in profile.elements() {
        let series = profile.get(element).unwrap_or_default();
        let formatted: Vec<String> = series.iter().map(|v| format!("{v:.2}")).collect();
        println!("{element}: [{}]", formatted.join(", "));
    }
    println!("{} request(s)", profile.request_count());

    Ok(())
}

//! Average daily cycle of solar radiation at the station closest to Trondheim.

use frost_climate::{FrostClimate, FrostClimateError, Point, TimeInterval, HOURLY_SHORTWAVE_FLUX};

#[tokio::main]
async fn main() -> Result<(), FrostClimateError> {
    let client = FrostClimate::from_env()?;

    let hours = client
        .nearest_window()
        .location(Point::new(63.43, 10.39))
        .element(HOURLY_SHORTWAVE_FLUX)
        .interval(TimeInterval::Hour)
        .call()
        .await?;

    for (hour, flux) in hours.iter().enumerate() {
        println!("{hour:02}:00  {flux:>7.1} W/m²");
    }

    Ok(())
}

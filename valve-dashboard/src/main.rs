//! Valve Condition Monitor - Dashboard Client
//!
//! Loads the raw hydraulic cycle files, aligns the two sensor streams to the
//! resampling method the prediction service was trained for, and requests a
//! condition prediction for one cycle.

mod api;
mod config;
mod data;
mod state;

use std::time::Duration;

use anyhow::Context;

use api::ApiClient;
use data::{load_dataset, DatasetFiles};
use state::SessionState;

/// How long to keep polling the service before giving up.
const SERVICE_WAIT: Duration = Duration::from_secs(60);
/// Pause between readiness attempts.
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    let cycle = cycle_arg()?;

    let client = ApiClient::new(config.api_uri.clone());

    log::info!("Waiting for prediction service at {}", config.api_uri);
    let method = client
        .wait_for_resampling_method(SERVICE_WAIT, RETRY_INTERVAL)
        .await
        .context("prediction service did not become ready")?;
    log::info!("Service is up, model resampling method: {}", method);

    let files = DatasetFiles::in_dir(&config.data_dir);
    let (data, target) = load_dataset(&files, method)?;
    let mut session = SessionState::new(data, target, method);
    log::info!(
        "Loaded {} cycles of length {}",
        session.num_cycles(),
        session.channel_len()
    );

    let cycle_input = session.cycle(cycle).with_context(|| {
        format!(
            "cycle {} out of range (0..{})",
            cycle,
            session.num_cycles()
        )
    })?;

    let prediction = client.predict_from_cycle(cycle_input).await?;
    session.record_prediction(prediction);

    let prediction = session
        .last_prediction()
        .context("prediction was not recorded in the session")?;
    println!(
        "Cycle {} ({} alignment): valve condition is {}",
        cycle,
        session.method(),
        prediction.valve_condition
    );
    if let Some(label) = session.label(cycle) {
        println!("Recorded condition code for this cycle: {}", label);
    }
    println!(
        "According to the prediction model, the valve has a {:.2}% chance to be in {} condition.",
        prediction.confidence * 100.0,
        prediction.valve_condition
    );

    Ok(())
}

/// Cycle index from argv (defaults to the first cycle).
fn cycle_arg() -> anyhow::Result<usize> {
    match std::env::args().nth(1) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid cycle index '{}'", raw)),
        None => Ok(0),
    }
}

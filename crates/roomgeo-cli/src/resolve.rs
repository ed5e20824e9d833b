use roomgeo_core::AppConfig;

use crate::build_resolver;

/// Resolves a single address and prints the update as pretty JSON.
///
/// Resolution itself never fails; a provider failure shows up as a
/// `failed` update carrying the fallback coordinates.
pub(crate) async fn run_resolve(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let resolver = build_resolver(config)?;
    let region = *resolver.region();
    let resolution = resolver.resolve_detailed(address, &region).await;

    if let Some(failure) = &resolution.failure {
        eprintln!("warning: {failure} (kind: {:?})", failure.kind());
    }

    println!("{}", serde_json::to_string_pretty(&resolution.update)?);
    Ok(())
}

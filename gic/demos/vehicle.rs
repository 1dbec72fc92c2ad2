//! A vehicle assembled by gic.

use std::sync::Arc;

use gic::prelude::*;
use tracing::info;

// === Parts ===

#[derive(Injectable)]
struct Disc;

#[derive(Injectable)]
struct StereoUnit {
    #[allow(dead_code)]
    disc: Arc<Disc>,
    model: String,
    watts: u32,
}

impl StereoUnit {
    fn play(&self) -> String {
        format!("{} playing at {}W", self.model, self.watts)
    }
}

#[derive(Injectable)]
struct PowerSource;

#[derive(Injectable)]
struct Vehicle {
    stereo: Arc<StereoUnit>,
    power: Arc<PowerSource>,
}

// === Modules ===

struct AudioModule;

impl Module for AudioModule {
    fn register(&self, registry: &mut Registry) -> Result<()> {
        registry.transient::<Disc>()?;
        registry.transient::<StereoUnit>()
    }

    fn name(&self) -> &str {
        "audio"
    }
}

struct ElectricalModule;

impl Module for ElectricalModule {
    fn register(&self, registry: &mut Registry) -> Result<()> {
        registry.singleton::<PowerSource>()
    }

    fn name(&self) -> &str {
        "electrical"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("gic_container=debug,vehicle=info")
        .init();

    let mut registry = Registry::new();
    registry.install(&AudioModule)?;
    registry.install(&ElectricalModule)?;

    let report = registry.validate()?;
    println!("Validated {} registered types", report.types_checked);

    let resolver = Resolver::new(registry);
    info!(registered = resolver.registry().len(), "Garage ready");

    let plan = resolver.plan::<Vehicle>()?;
    println!("\nConstruction plan ({} extra arguments):", plan.extras_needed());
    println!("{plan}");

    info!("Assembling two vehicles");
    let first = resolver.resolve_with::<Vehicle>(
        ExtraArguments::new()
            .with(String::from("GeosDIC Stereo"))
            .with(40u32),
    )?;
    let second = resolver.resolve_with::<Vehicle>(
        ExtraArguments::new()
            .with(String::from("GeosDIC Stereo Pro"))
            .with(80u32),
    )?;

    println!("First:  {}", first.stereo.play());
    println!("Second: {}", second.stereo.play());
    println!(
        "Shared power source: {}",
        Arc::ptr_eq(&first.power, &second.power)
    );

    // No extras this time, so the stereo's model is missing.
    match resolver.resolve::<Vehicle>() {
        Ok(_) => println!("Unexpectedly resolved without a stereo model"),
        Err(err) => println!("\nExpected failure:\n{err}"),
    }

    Ok(())
}

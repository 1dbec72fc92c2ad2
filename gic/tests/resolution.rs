//! End-to-end resolution through `#[derive(Injectable)]`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gic::graph::StepKind;
use gic::prelude::*;

static DISCS_PRESSED: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Disc {
    serial: usize,
}

impl Injectable for Disc {
    fn parameters() -> Vec<TypeKey> {
        vec![]
    }

    fn construct(_: &mut Arguments) -> Result<Self> {
        Ok(Disc {
            serial: DISCS_PRESSED.fetch_add(1, Ordering::SeqCst),
        })
    }
}

#[derive(Debug, Injectable)]
struct StereoUnit {
    disc: Arc<Disc>,
}

#[derive(Debug, Injectable)]
struct PowerSource;

#[derive(Debug, Injectable)]
struct Vehicle {
    stereo: Arc<StereoUnit>,
    power: Arc<PowerSource>,
}

#[derive(Debug, Injectable)]
struct Radio(Arc<PowerSource>, String, u32);

#[derive(Debug, Injectable)]
#[injectable(crate = "gic")]
struct Dashboard {
    radio: Arc<Radio>,
    label: String,
}

fn garage() -> Registry {
    let mut registry = Registry::new();
    registry.transient::<StereoUnit>().unwrap();
    registry.singleton::<PowerSource>().unwrap();
    registry.transient::<Disc>().unwrap();
    registry
}

#[test]
fn derived_parameters_follow_field_order() {
    assert_eq!(
        Vehicle::parameters(),
        vec![TypeKey::of::<StereoUnit>(), TypeKey::of::<PowerSource>()]
    );
    assert_eq!(
        Radio::parameters(),
        vec![
            TypeKey::of::<PowerSource>(),
            TypeKey::of::<String>(),
            TypeKey::of::<u32>(),
        ]
    );
    assert!(PowerSource::parameters().is_empty());
}

#[test]
fn vehicles_get_fresh_stereos_and_shared_power() {
    let resolver = Resolver::new(garage());

    let first = resolver.resolve::<Vehicle>().unwrap();
    let second = resolver.resolve::<Vehicle>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first.stereo, &second.stereo));
    assert_ne!(first.stereo.disc.serial, second.stereo.disc.serial);
    assert!(Arc::ptr_eq(&first.power, &second.power));
}

#[test]
fn tuple_struct_takes_extras_in_order() {
    let resolver = Resolver::new(garage());
    let radio = resolver
        .resolve_with::<Radio>(ExtraArguments::new().with(String::from("Sony")).with(18u32))
        .unwrap();

    assert_eq!(radio.1, "Sony");
    assert_eq!(radio.2, 18);
    assert!(Arc::ptr_eq(&radio.0, &resolver.resolve::<PowerSource>().unwrap()));
}

#[test]
fn extras_are_shared_across_the_whole_graph() {
    // Dashboard(Radio(PowerSource, String, u32), String): the radio's
    // parameters are met first, depth first.
    let mut registry = garage();
    registry.transient::<Radio>().unwrap();
    let resolver = Resolver::new(registry);

    let extras = ExtraArguments::new()
        .with(String::from("Sony"))
        .with(18u32)
        .with(String::from("front"));
    let dashboard = resolver.resolve_with::<Dashboard>(extras).unwrap();

    assert_eq!(dashboard.radio.1, "Sony");
    assert_eq!(dashboard.radio.2, 18);
    assert_eq!(dashboard.label, "front");
}

#[test]
fn missing_dependency_reports_and_keeps_cache_empty() {
    let resolver = Resolver::new(garage());

    match resolver.resolve::<Radio>().unwrap_err() {
        GicError::UnregisteredDependency(e) => {
            assert_eq!(e.requested, TypeKey::of::<String>());
            assert_eq!(e.required_by, TypeKey::of::<Radio>());
        }
        other => panic!("Expected UnregisteredDependency, got: {other:?}"),
    }
    assert!(resolver.singletons().is_empty());
}

#[test]
fn rejecting_duplicates_is_explicit() {
    let mut registry = Registry::new().with_duplicate_policy(DuplicatePolicy::Reject);
    registry.singleton::<PowerSource>().unwrap();

    assert!(matches!(
        registry.transient::<PowerSource>(),
        Err(GicError::AmbiguousRegistration(_))
    ));
}

#[test]
fn plan_describes_vehicle_construction() {
    let resolver = Resolver::new(garage());
    let plan = resolver.plan::<Vehicle>().unwrap();

    let kinds: Vec<StepKind> = plan.steps().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::Construct(Scope::Transient),
            StepKind::Construct(Scope::Transient),
            StepKind::Construct(Scope::Singleton),
            StepKind::ConstructRoot,
        ]
    );
    assert!(plan.to_string().contains("[Root]      Vehicle"));
}

#[test]
fn registry_validates_derived_graph() {
    let mut registry = garage();
    registry.transient::<Radio>().unwrap();
    registry.transient::<Dashboard>().unwrap();

    let report = registry.validate().unwrap();
    assert_eq!(report.types_checked, 5);
    assert!(report.captive_dependencies.is_empty());
}

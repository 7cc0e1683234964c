//! Composite-source behaviour across models.

use approx::assert_relative_eq;

use trident_common::{BoundariesConfig, EcrhConfig, InitialConfig};
use trident_geometry::CircularGeometryBuilder;
use trident_physics::sources::{
    Bremsstrahlung, CompositeSource, EcrhHeating, IonElectronExchange, OhmicHeating,
};
use trident_physics::{CoreProfiles, PlasmaComposition};

fn setup() -> (trident_geometry::Geometry, CoreProfiles, PlasmaComposition) {
    let geometry = CircularGeometryBuilder::new(40, 3.0, 1.0, 5.0).build().unwrap();
    let profiles = CoreProfiles::initial(
        &geometry,
        &InitialConfig::default(),
        &BoundariesConfig::default(),
    )
    .unwrap();
    (geometry, profiles, PlasmaComposition::default())
}

#[test]
fn empty_composite_returns_zero_terms_with_empty_ledger() {
    let (geometry, profiles, composition) = setup();
    let composite = CompositeSource::new();
    let terms = composite
        .compute_terms(&profiles, &geometry, &composition)
        .unwrap();

    terms.validate(40).unwrap();
    assert!(terms.metadata.is_empty());
    assert_relative_eq!(terms.q_i.sum(), 0.0);
    assert_relative_eq!(terms.q_e.sum(), 0.0);
    assert_relative_eq!(terms.s_n.sum(), 0.0);
    assert_relative_eq!(terms.s_j.sum(), 0.0);
}

#[test]
fn composite_terms_equal_the_sum_of_model_terms() {
    let (geometry, profiles, composition) = setup();
    let ecrh_config = EcrhConfig {
        enabled: true,
        power_mw: 8.0,
        deposition_rho: 0.25,
        width: 0.2,
    };

    let mut composite = CompositeSource::new();
    composite.push(Box::new(OhmicHeating));
    composite.push(Box::new(IonElectronExchange));
    composite.push(Box::new(EcrhHeating::new(&ecrh_config, &geometry).unwrap()));
    composite.push(Box::new(Bremsstrahlung));

    let total = composite
        .compute_terms(&profiles, &geometry, &composition)
        .unwrap();

    let singles: Vec<CompositeSource> = {
        let mut list = Vec::new();
        for model in [
            Box::new(OhmicHeating) as Box<dyn trident_physics::sources::SourceModel>,
            Box::new(IonElectronExchange),
            Box::new(EcrhHeating::new(&ecrh_config, &geometry).unwrap()),
            Box::new(Bremsstrahlung),
        ] {
            let mut single = CompositeSource::new();
            single.push(model);
            list.push(single);
        }
        list
    };

    let mut summed_q_e = ndarray::Array1::<f64>::zeros(40);
    for single in &singles {
        let terms = single
            .compute_terms(&profiles, &geometry, &composition)
            .unwrap();
        summed_q_e += &terms.q_e;
    }

    for i in 0..40 {
        assert_relative_eq!(total.q_e[i], summed_q_e[i], max_relative = 1e-12, epsilon = 1e-15);
    }
}

#[test]
fn ledger_totals_equal_per_model_sums() {
    let (geometry, profiles, composition) = setup();
    let mut composite = CompositeSource::new();
    composite.push(Box::new(OhmicHeating));
    composite.push(Box::new(IonElectronExchange));

    let collection = composite
        .metadata_collection(&profiles, &geometry, &composition)
        .unwrap();
    assert_eq!(collection.len(), 2);

    let per_model_ion: f64 = collection.entries().iter().map(|entry| entry.ion_power).sum();
    assert_relative_eq!(collection.total_ion_power(), per_model_ion);

    // The exchange ledger cancels between channels, the ohmic one does not.
    let net = collection.total_ion_power() + collection.total_electron_power();
    assert_relative_eq!(net, collection.total_ohmic_power(), max_relative = 1e-9);
}

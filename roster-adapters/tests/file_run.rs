use roster_adapters::{entry_id_for, Collaborators};
use roster_core::{CanonicalId, DirectorySource, Field, RosterPatch, SyncConfig, TriggerKind};
use roster_sync::RosterWriter;
use tempfile::TempDir;

const EXPORT: &str = r#"[
  {"staffId": "S1", "firstName": "Jane", "lastName": "Doe", "email": "jane@x.com",
   "businessPhone": "", "officePhone": "555-0100", "officeId": "OFF-1",
   "officeName": "Austin Downtown",
   "officeAddress": {"street": "12 Main St", "city": "Austin", "state": "TX", "postalCode": "78701"},
   "bioRichText": "<p>Top producer</p>", "specialtyTag": "Luxury", "licenseNumbers": ["TX-1", "TX-2"]},
  {"staffId": "S2", "firstName": "Sam", "lastName": "", "officeId": "OFF-1"},
  {"staffId": "S3", "firstName": "Ana", "lastName": "Ruiz", "officeName": "Dallas North"}
]"#;

fn setup() -> (TempDir, SyncConfig) {
    let home = TempDir::new().unwrap();
    let export = home.path().join("export.json");
    std::fs::write(&export, EXPORT).unwrap();
    let config = SyncConfig::new(
        vec!["OFF-1".into(), "dallas".into()],
        DirectorySource::File { path: export },
    );
    (home, config)
}

#[tokio::test]
async fn file_directory_run_maps_fields_and_is_idempotent() {
    let (home, config) = setup();
    let collaborators = Collaborators::from_config(&config, home.path());
    let engine = collaborators.engine();

    let first = engine
        .commit(&config, TriggerKind::Interactive)
        .await
        .unwrap();
    assert_eq!(first.added, 2, "{first:?}");
    assert!(first.errors.is_empty());

    let entries = collaborators.store.load_all().await.unwrap();
    let jane = entries
        .iter()
        .find(|e| e.id == entry_id_for(&CanonicalId::from("S1")))
        .expect("jane");
    assert_eq!(jane.fields.get(Field::Name), "Jane Doe");
    assert_eq!(jane.fields.get(Field::Phone), "555-0100");
    assert_eq!(jane.fields.get(Field::Office), "Austin Downtown");
    assert_eq!(jane.fields.get(Field::Address), "12 Main St, Austin, TX 78701");
    assert_eq!(jane.fields.get(Field::Title), "Luxury");
    assert_eq!(jane.fields.get(Field::LicenseId), "TX-1");
    assert_eq!(jane.slug.as_deref(), Some("jane-doe"));

    let second = engine
        .commit(&config, TriggerKind::Interactive)
        .await
        .unwrap();
    assert_eq!((second.added, second.updated, second.skipped), (0, 0, 2));
}

#[tokio::test]
async fn removed_agent_is_deactivated_on_next_run() {
    let (home, config) = setup();
    let collaborators = Collaborators::from_config(&config, home.path());
    let engine = collaborators.engine();
    engine
        .commit(&config, TriggerKind::Background)
        .await
        .unwrap();

    // An editor publishes Jane.
    let jane = entry_id_for(&CanonicalId::from("S1"));
    let publish = RosterPatch {
        active: Some(true),
        ..Default::default()
    };
    collaborators.store.patch(&jane, &publish).await.unwrap();

    let DirectorySource::File { path } = &config.directory else {
        unreachable!("file directory configured");
    };
    std::fs::write(
        path,
        r#"[{"staffId": "S3", "firstName": "Ana", "lastName": "Ruiz", "officeName": "Dallas North"}]"#,
    )
    .unwrap();

    let report = engine
        .commit(&config, TriggerKind::Background)
        .await
        .unwrap();
    assert_eq!(report.deactivated, 1);
    assert_eq!(report.skipped, 1);

    let entries = collaborators.store.load_all().await.unwrap();
    let jane = entries.iter().find(|e| e.id == jane).expect("jane kept");
    assert!(!jane.active);
    assert!(jane.overrides.active_locked());
}

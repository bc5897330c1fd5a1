use emissions_classifier::prelude::*;

fn sample() -> Table {
    Table::from_columns(vec![
        Column::categorical(
            "manufacturer",
            vec![Some("Ford".into()), Some("O'Brien \"Motors\"".into()), None],
        ),
        Column::numeric("co2", vec![Some(150.0), None, Some(210.5)]),
        Column::categorical("tax_band", vec![Some("C".into()), None, Some("F".into())]),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_table_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emissions.db");

    let store = SqliteStore::open(&path).await.unwrap();
    store.write_table(EMISSIONS_TABLE, &sample()).await.unwrap();
    store.close().await;

    let store = SqliteStore::open(&path).await.unwrap();
    let table = store.read_table(EMISSIONS_TABLE).await.unwrap();
    store.close().await;

    assert_eq!(table, sample());
    assert!(table.column("co2").unwrap().is_numeric());
    assert!(!table.column("tax_band").unwrap().is_numeric());
}

#[tokio::test]
async fn test_writing_again_replaces_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emissions.db");
    let store = SqliteStore::open(&path).await.unwrap();

    store.write_table(EMISSIONS_TABLE, &sample()).await.unwrap();
    let smaller = sample().take(&[0]);
    store.write_table(EMISSIONS_TABLE, &smaller).await.unwrap();

    let table = store.read_table(EMISSIONS_TABLE).await.unwrap();
    assert_eq!(table.shape(), (1, 3));
    assert_eq!(table, smaller);
    store.close().await;
}

#[tokio::test]
async fn test_tables_are_independent() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.write_table("emissions", &sample()).await.unwrap();
    store
        .write_table("emissions backup", &sample().take(&[2, 1]))
        .await
        .unwrap();

    assert_eq!(store.read_table("emissions").await.unwrap().n_rows(), 3);
    assert_eq!(store.read_table("emissions backup").await.unwrap().n_rows(), 2);
    assert!(matches!(
        store.read_table("missing").await,
        Err(PipelineError::MissingTable(_))
    ));
}

#[tokio::test]
async fn test_empty_table_is_rejected() {
    let store = SqliteStore::in_memory().await.unwrap();
    let result = store.write_table(EMISSIONS_TABLE, &Table::new()).await;
    assert!(matches!(result, Err(PipelineError::EmptyData(_))));
}

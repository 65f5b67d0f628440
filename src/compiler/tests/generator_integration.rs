use std::sync::Arc;

use common::config::{CompilerConfig, FailurePolicy};
use common::model::{
    ColumnMatchGroup, ColumnValue, DataMapperRecord, DeletionMatch, PartitionDescriptor,
    PartitionKeyValue, TableDescriptor, TypedValue,
};
use common::testing::data_mapper_record;
use compiler::sources::{InMemoryCatalog, InMemoryDataMapperStore, InMemoryDeletionQueue};
use compiler::{CompileError, QueryGenerator};

const JOB_ID: &str = "job-1234";

fn generator(
    catalog: InMemoryCatalog,
    matches: Vec<DeletionMatch>,
    records: Vec<DataMapperRecord>,
    failure_policy: FailurePolicy,
) -> QueryGenerator {
    QueryGenerator::new(
        Arc::new(catalog),
        Arc::new(InMemoryDeletionQueue::new().with_job(JOB_ID, matches)),
        Arc::new(InMemoryDataMapperStore::new(records)),
        CompilerConfig {
            concurrency: 4,
            failure_policy,
        },
    )
}

fn customer_table() -> TableDescriptor {
    TableDescriptor::new("test_db", "test_table").with_column("customer_id", "string")
}

fn composite(pairs: &[(&str, &str)]) -> DeletionMatch {
    DeletionMatch::composite(
        pairs
            .iter()
            .map(|(column, value)| ColumnValue::new(*column, *value)),
    )
}

#[tokio::test]
async fn test_simple_match_expands_to_configured_column() {
    let catalog = InMemoryCatalog::new().with_table(customer_table(), []);
    let generator = generator(
        catalog,
        vec![DeletionMatch::simple("hi")],
        vec![data_mapper_record("a", "test_table", &["customer_id"])],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();

    assert_eq!(report.queries.len(), 1);
    let query = &report.queries[0];
    assert_eq!(query.data_mapper_id, "a");
    assert_eq!(query.database, "test_db");
    assert_eq!(query.table, "test_table");
    assert!(query.partition_keys.is_empty());
    assert_eq!(
        query.columns,
        vec![ColumnMatchGroup::Simple {
            column: "customer_id".to_string(),
            match_ids: vec![TypedValue::from("hi")],
        }]
    );
}

#[tokio::test]
async fn test_composite_matches_group_by_column_set() {
    let table = TableDescriptor::new("test_db", "test_table")
        .with_column("first_name", "string")
        .with_column("last_name", "string")
        .with_column("age", "int");
    let catalog = InMemoryCatalog::new().with_table(table, []);
    let generator = generator(
        catalog,
        vec![
            composite(&[("first_name", "John"), ("last_name", "Doe")]),
            composite(&[("last_name", "Smith"), ("age", "28")]),
            composite(&[("last_name", "Doe"), ("first_name", "Jane")]),
        ],
        vec![data_mapper_record(
            "a",
            "test_table",
            &["first_name", "last_name", "age"],
        )],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();

    assert_eq!(
        report.queries[0].columns,
        vec![
            ColumnMatchGroup::Composite {
                columns: vec!["first_name".to_string(), "last_name".to_string()],
                match_ids: vec![
                    vec![TypedValue::from("John"), TypedValue::from("Doe")],
                    vec![TypedValue::from("Jane"), TypedValue::from("Doe")],
                ],
            },
            ColumnMatchGroup::Composite {
                columns: vec!["age".to_string(), "last_name".to_string()],
                match_ids: vec![vec![TypedValue::Int(28), TypedValue::from("Smith")]],
            },
        ]
    );
}

#[tokio::test]
async fn test_partitions_cross_product_with_typed_keys() {
    let table = customer_table()
        .with_partition_key("year", "int")
        .with_partition_key("month", "int");
    let catalog = InMemoryCatalog::new().with_page_size(1).with_table(
        table,
        [
            PartitionDescriptor::new(["2010", "1"]),
            PartitionDescriptor::new(["2010", "2"]),
            PartitionDescriptor::new(["2011", "1"]),
        ],
    );
    let generator = generator(
        catalog.clone(),
        vec![DeletionMatch::simple("hi")],
        vec![data_mapper_record("a", "test_table", &["customer_id"])],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();

    assert_eq!(report.queries.len(), 3);
    assert!(
        report
            .queries
            .windows(2)
            .all(|pair| pair[0].columns == pair[1].columns)
    );
    assert_eq!(
        report.queries[0].partition_keys,
        vec![
            PartitionKeyValue::new("year", 2010_i64),
            PartitionKeyValue::new("month", 1_i64),
        ]
    );
    assert_eq!(
        report.queries[2].partition_keys,
        vec![
            PartitionKeyValue::new("year", 2011_i64),
            PartitionKeyValue::new("month", 1_i64),
        ]
    );
    assert_eq!(catalog.page_fetches(), 3);
}

#[tokio::test]
async fn test_scoped_matches_only_reach_their_data_mapper() {
    let catalog = InMemoryCatalog::new().with_table(customer_table(), []);
    let generator = generator(
        catalog,
        vec![DeletionMatch::simple("only-a").with_data_mappers(["A"])],
        vec![
            data_mapper_record("A", "test_table", &["customer_id"]),
            data_mapper_record("B", "test_table", &["customer_id"]),
        ],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();

    let ids: Vec<&str> = report
        .queries
        .iter()
        .map(|q| q.data_mapper_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A"]);
}

#[tokio::test]
async fn test_no_applicable_matches_produce_no_queries() {
    let catalog = InMemoryCatalog::new().with_table(customer_table(), []);
    let generator = generator(
        catalog,
        Vec::new(),
        vec![data_mapper_record("a", "test_table", &["customer_id"])],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();
    assert!(report.queries.is_empty());
}

#[tokio::test]
async fn test_nested_struct_paths_are_cast_to_their_field_types() {
    let table = TableDescriptor::new("test_db", "test_table").with_column(
        "user",
        "struct<type:int,x:map<string,struct<a:int>>,info:struct<user_id:int,name:string>>",
    );
    let catalog = InMemoryCatalog::new().with_table(table, []);
    let generator = generator(
        catalog,
        vec![
            DeletionMatch::simple("1234567890"),
            composite(&[
                ("user.info.name", "john_doe"),
                ("user.info.user_id", "1234567890"),
            ]),
        ],
        vec![data_mapper_record(
            "a",
            "test_table",
            &["user.info.name", "user.info.user_id"],
        )],
        FailurePolicy::Abort,
    );

    let report = generator.generate(JOB_ID).await.unwrap();

    assert_eq!(
        report.queries[0].columns,
        vec![
            ColumnMatchGroup::Simple {
                column: "user.info.name".to_string(),
                match_ids: vec![TypedValue::from("1234567890")],
            },
            ColumnMatchGroup::Simple {
                column: "user.info.user_id".to_string(),
                match_ids: vec![TypedValue::Int(1234567890)],
            },
            ColumnMatchGroup::Composite {
                columns: vec!["user.info.name".to_string(), "user.info.user_id".to_string()],
                match_ids: vec![vec![
                    TypedValue::from("john_doe"),
                    TypedValue::Int(1234567890)
                ]],
            },
        ]
    );
}

#[tokio::test]
async fn test_paths_through_maps_are_rejected() {
    let table = TableDescriptor::new("test_db", "test_table")
        .with_column("user", "struct<x:map<string,struct<a:int>>>");
    let catalog = InMemoryCatalog::new().with_table(table, []);
    let generator = generator(
        catalog,
        vec![DeletionMatch::simple("1")],
        vec![data_mapper_record("a", "test_table", &["user.x.a"])],
        FailurePolicy::Abort,
    );

    let err = generator.generate(JOB_ID).await.unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedType { .. }));
}

#[tokio::test]
async fn test_malformed_schema_fails_for_any_path() {
    for column in ["user", "user.name", "user.missing.deeper"] {
        let table = TableDescriptor::new("test_db", "test_table")
            .with_column("user", "struct<name:string,age:int,s:struct<n:int>,b:string");
        let catalog = InMemoryCatalog::new().with_table(table, []);
        let generator = generator(
            catalog,
            vec![DeletionMatch::simple("x")],
            vec![data_mapper_record("a", "test_table", &[column])],
            FailurePolicy::Abort,
        );

        let err = generator.generate(JOB_ID).await.unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidSchema { .. }),
            "{column}: {err:?}"
        );
        assert_eq!(err.to_string(), "Column schema is not valid");
    }
}

#[tokio::test]
async fn test_unknown_executor_fails_only_its_own_record_when_skipping() {
    let catalog = InMemoryCatalog::new().with_table(customer_table(), []);
    let mut invalid = data_mapper_record("bad", "test_table", &["customer_id"]);
    invalid.query_executor = "invalid".to_string();

    let records = vec![
        invalid.clone(),
        data_mapper_record("good", "test_table", &["customer_id"]),
    ];

    let skipping = generator(
        catalog.clone(),
        vec![DeletionMatch::simple("hi")],
        records.clone(),
        FailurePolicy::Skip,
    );
    let report = skipping.generate(JOB_ID).await.unwrap();
    assert_eq!(report.queries.len(), 1);
    assert_eq!(report.queries[0].data_mapper_id, "good");
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        CompileError::Configuration(_)
    ));

    let aborting = generator(
        catalog,
        vec![DeletionMatch::simple("hi")],
        records,
        FailurePolicy::Abort,
    );
    let err = aborting.generate(JOB_ID).await.unwrap_err();
    assert_eq!(err.to_string(), "Unsupported query executor: invalid");
}

#[tokio::test]
async fn test_repeated_compilation_is_identical() {
    let table = TableDescriptor::new("test_db", "test_table")
        .with_column("customer_id", "string")
        .with_column("first_name", "string")
        .with_column("last_name", "string")
        .with_column("age", "int")
        .with_partition_key("product_category", "string");
    let catalog = InMemoryCatalog::new().with_page_size(2).with_table(
        table,
        [
            PartitionDescriptor::new(["Books"]),
            PartitionDescriptor::new(["Music"]),
            PartitionDescriptor::new(["Games"]),
        ],
    );
    let matches = vec![
        DeletionMatch::simple("12345"),
        DeletionMatch::simple("23456"),
        DeletionMatch::simple("23456"),
        composite(&[("first_name", "John"), ("last_name", "Doe")]),
        composite(&[("last_name", "Smith"), ("age", "28")]),
    ];
    let records = vec![
        data_mapper_record(
            "a",
            "test_table",
            &["customer_id", "first_name", "last_name", "age"],
        ),
        data_mapper_record("b", "test_table", &["customer_id"]),
    ];
    let generator = generator(catalog, matches, records, FailurePolicy::Abort);

    let first = generator.generate(JOB_ID).await.unwrap();
    let second = generator.generate(JOB_ID).await.unwrap();

    assert_eq!(first.queries.len(), 6);
    assert_eq!(first.queries, second.queries);
}

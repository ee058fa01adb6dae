//! Placeholder and bind-list agreement across statement shapes.

use serde_json::json;
use sphinxql::prelude::*;

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

fn assert_binds_match((sql, params): &(String, Vec<Value>)) {
    assert_eq!(
        placeholders(sql),
        params.len(),
        "placeholder count differs from bind count in {sql}"
    );
    assert!(
        params.iter().all(|p| !p.is_array()),
        "bind list must be flat for {sql}"
    );
}

#[test]
fn typed_selects_bind_one_value_per_placeholder() {
    let builder = QueryBuilder::new("articles");
    let cases = [
        ("", Filters::new()),
        ("cats", Filters::new()),
        ("cats", Filters::new().filter("views", 5_i64)),
        ("cats", Filters::new().filter("author_id", vec![1_i64, 2, 3])),
        ("", Filters::new().filter("views", 10_i64..=20)),
        ("", Filters::new().filter("score", ..1.5_f64)),
        ("dogs", Filters::new().filter("views", !Comparison::in_list([4_i64, 5]))),
        (
            "dogs",
            Filters::new()
                .conditions(Condition::new("created_at > ? OR views > ?", [
                    Value::BigInt(100),
                    Value::BigInt(5),
                ]))
                .filter("status", "published")
                .order_by(OrderBy::desc("relevance"))
                .limit(10)
                .offset(20)
                .option("max_matches", 500),
        ),
    ];

    for (query, filters) in &cases {
        assert_binds_match(&builder.select(query, filters));
    }
}

#[test]
fn json_selects_bind_one_value_per_placeholder() {
    let builder = QueryBuilder::new("articles");
    let descriptions = [
        json!({}),
        json!({"views": 10, "tags": [1, 2, 3]}),
        json!({"views": {"between": [1, 9]}, "rank": {"not": {"in": [1, 2]}}}),
        json!({"score": {"lte": 2.5}, "title": {"not": "draft"}}),
        json!({"conditions": ["tags IN(?, ?)", [1, 2]]}),
        json!({"conditions": ["tags IN(?, ?, ?) OR views = ?", [[1, 2], 3], 4]}),
        json!({
            "attrs": ["id", "views"],
            "conditions": ["views > ? AND views < ?", 3, 7],
            "order": {"relevance": "desc", "views": "asc"},
            "group": "author_id",
            "limit": "15",
            "options": {"field_weights": {"title": 5, "body": 1}},
        }),
    ];

    for desc in &descriptions {
        let filters = Filters::from_json(desc).expect("valid description");
        assert_binds_match(&builder.select("needle", &filters));
    }
}

#[test]
fn comparison_bind_count_matches_rendered_fragment() {
    let comparisons = [
        Comparison::equal(1_i64),
        Comparison::in_list(["a", "b", "c"]),
        Comparison::in_list(Vec::<i64>::new()),
        Comparison::between(1_i64, 5_i64),
        Comparison::gt(2.5_f64),
        !Comparison::lte(9_i64),
        !!Comparison::in_list([1_i64, 2]),
    ];

    for comparison in &comparisons {
        let fragment = comparison.for_attribute("attr");
        assert_eq!(placeholders(fragment.sql()), comparison.bind_count());
        assert_eq!(fragment.params().len(), comparison.bind_count());
    }
}

#[test]
fn batch_insert_binds_columns_plus_id_per_row() {
    let builder = QueryBuilder::new("articles");
    let rows: Vec<(i64, Attributes)> = (1..=4)
        .map(|id| {
            (
                id,
                Attributes::new()
                    .set("title", format!("doc {id}"))
                    .set("views", id * 10)
                    .set("score", 0.5_f64),
            )
        })
        .collect();

    let stmt = builder.insert_many(&rows).expect("non-empty batch");
    assert_binds_match(&stmt);
    assert_eq!(stmt.1.len(), rows.len() * (3 + 1));
    assert!(stmt.0.ends_with("(title, views, score, id) VALUES (?, ?, ?, ?), (?, ?, ?, ?), (?, ?, ?, ?), (?, ?, ?, ?)"));

    // id is the last bind of every row group
    let ids: Vec<_> = stmt.1.chunks(4).map(|group| group[3].clone()).collect();
    assert_eq!(
        ids,
        [1_i64, 2, 3, 4].map(Value::BigInt).to_vec()
    );
}

#[test]
fn multi_value_attributes_expand_in_place() {
    let builder = QueryBuilder::new("articles");
    let attrs = Attributes::new()
        .set("tags", vec![3_i64, 4, 5])
        .set("views", 1_i64);

    let update = builder
        .update(vec![10_i64, 11], &attrs)
        .expect("attributes present");
    assert_binds_match(&update);
    assert_eq!(
        update.0,
        "UPDATE articles SET tags = (?, ?, ?), views = ? WHERE id IN(?, ?)"
    );

    let replace = builder.replace(10, &attrs);
    assert_binds_match(&replace);
    assert_eq!(replace.1.len(), 3 + 1 + 1);
}

#[test]
fn selecting_twice_gives_identical_statements() {
    let builder = QueryBuilder::new("articles");
    let filters = Filters::new()
        .filter("views", 100_i64..)
        .order_by(OrderBy::desc("relevance"))
        .limit(5);

    let first = builder.select("cats", &filters);
    let second = builder.select("cats", &filters);
    assert_eq!(first, second);
}

//! The recursive evaluator.
//!
//! Rendering is depth-first and left-to-right: a child subtree, including all
//! of its fetches, is finished before the next sibling starts. Any error
//! aborts the whole build.

use serde_json::Value;

use crate::context::{Context, EmptyContext, Row, is_empty, type_name};
use crate::definition::Definition;
use crate::error::{Result, SculptError};
use crate::provider::{Collected, Collection, Fetch, Provider};
use crate::{sculpt_trace_build, sculpt_trace_fetch};

/// Renders [`Definition`]s into JSON values.
#[derive(Debug, Default, Clone, Copy)]
pub struct Builder;

impl Builder {
    pub fn new() -> Self {
        Self
    }

    /// Renders `definition` against an optional root context.
    pub fn build(&self, definition: &Definition, context: Option<&dyn Context>) -> Result<Value> {
        self.render(definition, context, 0)
    }

    fn render(
        &self,
        definition: &Definition,
        context: Option<&dyn Context>,
        depth: usize,
    ) -> Result<Value> {
        sculpt_trace_build!(definition.kind(), depth);

        match definition {
            Definition::Scalar(Value::String(name)) => match context {
                Some(context) => context
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| SculptError::UnknownContextKey(name.clone())),
                None => Ok(Value::String(name.clone())),
            },
            Definition::Scalar(literal) => Ok(literal.clone()),
            Definition::Field(field) => field.apply(context.unwrap_or(&EmptyContext)),
            Definition::Provider(provider) => self.resolve(provider, context, depth),
            Definition::Row => Ok(context
                .and_then(|context| context.to_row())
                .map_or(Value::Null, Value::Object)),
            Definition::Map(entries) => {
                let mut record = Row::new();
                for (key, child) in entries {
                    let value = self.render(child, context, depth + 1)?;
                    record.insert(key.clone(), value);
                }
                Ok(Value::Object(record))
            }
        }
    }

    fn resolve(
        &self,
        provider: &Provider,
        context: Option<&dyn Context>,
        depth: usize,
    ) -> Result<Value> {
        let fetch = provider.fetch();
        let params = fetch.parameters.resolve(context)?;
        sculpt_trace_fetch!(provider.kind(), fetch.source.label(), params.len());
        let data = fetch.source.fetch(&params)?;

        match provider {
            Provider::Value(fetch) => self.resolve_value(fetch, data, depth),
            Provider::Entity(fetch) => self.resolve_entity(fetch, data, depth),
            Provider::Column(fetch) => self.resolve_column(fetch, data, depth),
            Provider::Collection(collection) => self.resolve_collection(collection, data, depth),
        }
    }

    fn resolve_value(&self, fetch: &Fetch, data: Value, depth: usize) -> Result<Value> {
        if is_empty(&data) {
            return Ok(Value::Null);
        }
        match data {
            Value::Object(row) => self.render_row(&fetch.definition, &row, depth),
            Value::Array(rows) => match rows.into_iter().next() {
                Some(Value::Object(row)) => self.render_row(&fetch.definition, &row, depth),
                Some(other) => Err(not_a_row("value", &other)),
                None => Ok(Value::Null),
            },
            scalar => Ok(scalar),
        }
    }

    fn resolve_entity(&self, fetch: &Fetch, data: Value, depth: usize) -> Result<Value> {
        if is_empty(&data) {
            return Ok(Value::Null);
        }
        match data {
            Value::Object(row) => self.render_row(&fetch.definition, &row, depth),
            Value::Array(rows) => match rows.into_iter().next() {
                Some(Value::Object(row)) => self.render_row(&fetch.definition, &row, depth),
                Some(other) => Err(not_a_row("entity", &other)),
                None => Ok(Value::Null),
            },
            other => Err(not_a_row("entity", &other)),
        }
    }

    fn resolve_column(&self, fetch: &Fetch, data: Value, depth: usize) -> Result<Value> {
        if is_empty(&data) {
            return Ok(Value::Array(Vec::new()));
        }
        let rows = into_rows("column", data)?;
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let row = expect_row("column", row)?;
            values.push(self.render_row(&fetch.definition, &row, depth)?);
        }
        Ok(Value::Array(values))
    }

    fn resolve_collection(
        &self,
        collection: &Collection,
        data: Value,
        depth: usize,
    ) -> Result<Value> {
        if is_empty(&data) {
            return Ok(collection.empty().into());
        }
        let rows = into_rows("collection", data)?;
        let definition = &collection.fetch.definition;

        let collected = match &collection.key {
            Some(key) => {
                let mut map = Row::new();
                for row in rows {
                    let row = expect_row("collection", row)?;
                    let key = key.key(&row)?;
                    map.insert(key, self.render_row(definition, &row, depth)?);
                }
                Collected::Keyed(map)
            }
            None => {
                let mut items = Vec::with_capacity(rows.len());
                for row in rows {
                    let row = expect_row("collection", row)?;
                    items.push(self.render_row(definition, &row, depth)?);
                }
                Collected::List(items)
            }
        };

        let collected = match &collection.filter {
            Some(filter) => filter.apply(collected)?,
            None => collected,
        };
        Ok(collected.into())
    }

    fn render_row(&self, definition: &Definition, row: &Row, depth: usize) -> Result<Value> {
        self.render(definition, Some(row), depth + 1)
    }
}

/// Renders `definition` with a default [`Builder`].
pub fn build(definition: &Definition, context: Option<&dyn Context>) -> Result<Value> {
    Builder::new().build(definition, context)
}

fn into_rows(provider: &str, data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Array(rows) => Ok(rows),
        other => Err(SculptError::shape(format!(
            "{provider} provider expected a sequence of rows, found {}",
            type_name(&other)
        ))),
    }
}

fn expect_row(provider: &str, value: Value) -> Result<Row> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(not_a_row(provider, &other)),
    }
}

fn not_a_row(provider: &str, value: &Value) -> SculptError {
    SculptError::shape(format!(
        "{provider} provider expected a row, found {}",
        type_name(value)
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::field::FieldTransform;
    use crate::params::{BoundParams, Parameters};
    use crate::provider::Filter;
    use crate::source::{Client, Source};

    /// Serves canned rows per SQL text and records every call.
    #[derive(Default)]
    struct FakeClient {
        tables: Vec<(&'static str, Value)>,
        calls: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl FakeClient {
        fn with(mut self, sql: &'static str, rows: Value) -> Self {
            self.tables.push((sql, rows));
            self
        }
    }

    impl Client for FakeClient {
        fn query(&self, sql: &str, params: &BoundParams) -> Result<Vec<Row>> {
            self.calls
                .borrow_mut()
                .push((sql.to_string(), params.values().cloned().collect()));
            let rows = self
                .tables
                .iter()
                .find(|(known, _)| *known == sql)
                .map(|(_, rows)| rows.clone())
                .ok_or_else(|| SculptError::Fetch(format!("no such query: {sql}")))?;
            Ok(rows
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|row| row.as_object().cloned())
                .collect())
        }
    }

    fn news_rows() -> Value {
        json!([
            {"id": 1, "authorId": 1, "title": "foo", "tags": "a,b"},
            {"id": 2, "authorId": 2, "title": "bar", "tags": ""},
        ])
    }

    fn news_definition() -> Definition {
        Definition::map([
            ("id", FieldTransform::integer("id").into()),
            ("title", "title".into()),
            ("tags", FieldTransform::csv("tags").into()),
        ])
    }

    #[test]
    fn scalar_definitions() {
        let row = json!({"title": "foo"});
        assert_eq!(build(&"title".into(), Some(&row)).unwrap(), json!("foo"));
        assert_eq!(build(&"title".into(), None).unwrap(), json!("title"));
        assert_eq!(build(&json!(42).into(), Some(&row)).unwrap(), json!(42));

        let err = build(&"missing".into(), Some(&row)).unwrap_err();
        assert!(matches!(err, SculptError::UnknownContextKey(key) if key == "missing"));
    }

    #[test]
    fn maps_preserve_insertion_order() {
        let definition = Definition::map([
            ("zeta", Definition::from(json!(1))),
            ("alpha", Definition::from(json!(2))),
            ("empty", Definition::map(Vec::<(String, Definition)>::new())),
        ]);
        let rendered = build(&definition, None).unwrap();
        assert_eq!(
            serde_json::to_string(&rendered).unwrap(),
            r#"{"zeta":1,"alpha":2,"empty":{}}"#
        );
    }

    #[test]
    fn collection_renders_rows_in_fetch_order() {
        let definition: Definition =
            Provider::collection(news_rows(), news_definition()).into();

        let rendered = build(&definition, None).unwrap();
        assert_eq!(
            rendered,
            json!([
                {"id": 1, "title": "foo", "tags": ["a", "b"]},
                {"id": 2, "title": "bar", "tags": []},
            ])
        );
    }

    #[test]
    fn keyed_collection_is_last_wins() {
        let rows = json!([
            {"id": 1, "title": "first"},
            {"id": 2, "title": "second"},
            {"id": 1, "title": "third"},
        ]);
        let definition: Definition = Provider::collection(rows, Definition::map([("title", "title".into())]))
            .key_by("id")
            .into();

        let rendered = build(&definition, None).unwrap();
        assert_eq!(
            serde_json::to_string(&rendered).unwrap(),
            r#"{"1":{"title":"third"},"2":{"title":"second"}}"#
        );
    }

    #[test]
    fn empty_results() {
        let empty = || Source::Static(json!([]));

        let cases: Vec<(Provider, Value)> = vec![
            (Provider::value(empty(), "cnt"), Value::Null),
            (Provider::entity(empty(), "id"), Value::Null),
            (Provider::entity(Value::Null, "id"), Value::Null),
            (Provider::column(empty(), "id"), json!([])),
            (Provider::collection(empty(), "id").into(), json!([])),
            (Provider::collection(empty(), "id").key_by("id").into(), json!({})),
        ];
        for (provider, expected) in cases {
            let kind = provider.kind();
            assert_eq!(build(&provider.into(), None).unwrap(), expected, "{kind}");
        }
    }

    #[test]
    fn entity_parameters_are_resolved_against_the_parent_row() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = seen.clone();
        let author = Provider::entity(
            Source::from_fn(move |params| {
                recorder.borrow_mut().push(params.get("id").cloned());
                Ok(json!({"id": 7, "name": "Jane"}))
            }),
            Definition::map([("name", "name".into())]),
        )
        .with_params(Parameters::new().named_ref("id", "authorId"));
        let definition: Definition = author.into();

        let rendered = build(&definition, Some(&json!({"authorId": 7}))).unwrap();
        assert_eq!(rendered, json!({"name": "Jane"}));
        assert_eq!(seen.borrow().as_slice(), &[Some(json!(7))]);

        let err = build(&definition, Some(&json!({"id": 1}))).unwrap_err();
        assert!(matches!(err, SculptError::ReferenceResolution(name) if name == "authorId"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn nested_providers_issue_one_fetch_per_row() {
        let client = Rc::new(
            FakeClient::default()
                .with("SELECT * FROM news", news_rows())
                .with(
                    "SELECT * FROM author WHERE id = ?",
                    json!([{"id": 1, "name": "Jane"}]),
                ),
        );
        let author = Provider::entity(
            Source::query("SELECT * FROM author WHERE id = ?", client.clone()),
            Definition::map([("name", "name".into())]),
        )
        .with_params(Parameters::new().bind_ref("authorId"));
        let definition: Definition = Provider::collection(
            Source::query("SELECT * FROM news", client.clone()),
            Definition::map([("id", "id".into()), ("author", author.into())]),
        )
        .into();

        let rendered = build(&definition, None).unwrap();
        assert_eq!(
            rendered,
            json!([
                {"id": 1, "author": {"name": "Jane"}},
                {"id": 2, "author": {"name": "Jane"}},
            ])
        );

        let calls = client.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].1, vec![json!(1)]);
        assert_eq!(calls[2].1, vec![json!(2)]);
    }

    #[test]
    fn end_to_end_count_and_entries() {
        let client = Rc::new(
            FakeClient::default()
                .with("SELECT COUNT(*) AS cnt FROM news", json!([{"cnt": 2}]))
                .with(
                    "SELECT id, title FROM news",
                    json!([{"id": 1, "title": "foo"}, {"id": 2, "title": "bar"}]),
                ),
        );
        let definition = Definition::map([
            (
                "totalEntries",
                Provider::value(
                    Source::query("SELECT COUNT(*) AS cnt FROM news", client.clone()),
                    FieldTransform::integer("cnt"),
                )
                .into(),
            ),
            (
                "entries",
                Provider::collection(
                    Source::query("SELECT id, title FROM news", client.clone()),
                    Definition::map([
                        ("id", FieldTransform::integer("id").into()),
                        ("title", "title".into()),
                    ]),
                )
                .into(),
            ),
        ]);

        let rendered = build(&definition, None).unwrap();
        assert_eq!(
            serde_json::to_string(&rendered).unwrap(),
            r#"{"totalEntries":2,"entries":[{"id":1,"title":"foo"},{"id":2,"title":"bar"}]}"#
        );
    }

    #[test]
    fn build_is_idempotent() {
        let definition: Definition = Provider::collection(news_rows(), news_definition())
            .key_by("id")
            .into();
        let builder = Builder::new();

        let first = builder.build(&definition, None).unwrap();
        let second = builder.build(&definition, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn filter_runs_over_the_rendered_collection() {
        let authors = json!({
            "1": {"id": "urn:profile:1"},
            "2": {"id": "urn:profile:2"},
        });
        let author = Provider::entity(
            Source::from_fn(move |params| {
                let id = params.values().next().cloned().unwrap_or_default();
                Ok(authors[id.as_str().unwrap_or_default()].clone())
            }),
            Definition::map([("id", "id".into())]),
        )
        .with_params(Parameters::new().bind_ref("authorId"));

        let rows = json!([
            {"id": 1, "authorId": "1"},
            {"id": 2, "authorId": "2"},
            {"id": 3, "authorId": "1"},
        ]);
        let keep = Filter::retain(|news| news["author"]["id"] == json!("urn:profile:1"));

        let list: Definition = Provider::collection(
            rows.clone(),
            Definition::map([("id", "id".into()), ("author", author.clone().into())]),
        )
        .with_filter(keep.clone())
        .into();
        let rendered = build(&list, None).unwrap();
        assert_eq!(
            rendered,
            json!([
                {"id": 1, "author": {"id": "urn:profile:1"}},
                {"id": 3, "author": {"id": "urn:profile:1"}},
            ])
        );

        let keyed: Definition = Provider::collection(
            rows,
            Definition::map([("id", "id".into()), ("author", author.into())]),
        )
        .key_by("id")
        .with_filter(keep)
        .into();
        let rendered = build(&keyed, None).unwrap();
        assert_eq!(
            serde_json::to_string(&rendered).unwrap(),
            r#"{"1":{"id":1,"author":{"id":"urn:profile:1"}},"3":{"id":3,"author":{"id":"urn:profile:1"}}}"#
        );
    }

    #[test]
    fn whole_row_definition() {
        let definition: Definition =
            Provider::collection(json!([{"b": 2, "a": 1}, {"c": null}]), Definition::Row).into();
        assert_eq!(
            serde_json::to_string(&build(&definition, None).unwrap()).unwrap(),
            r#"[{"b":2,"a":1},{"c":null}]"#
        );

        assert_eq!(build(&Definition::Row, None).unwrap(), Value::Null);
        assert_eq!(
            build(&Definition::Row, Some(&json!({"id": 1}))).unwrap(),
            json!({"id": 1})
        );
    }

    #[test]
    fn key_errors_abort_the_collection() {
        let definition: Definition = Provider::collection(
            json!([{"id": 1, "title": "foo"}, {"title": "bar"}]),
            "title",
        )
        .key_by("id")
        .into();
        let err = build(&definition, None).unwrap_err();
        assert!(matches!(err, SculptError::UnknownContextKey(name) if name == "id"));
    }

    #[test]
    fn column_projects_each_row() {
        let definition: Definition =
            Provider::column(json!([{"id": 3}, {"id": 1}, {"id": 2}]), "id").into();
        assert_eq!(build(&definition, None).unwrap(), json!([3, 1, 2]));

        let definition: Definition =
            Provider::column(json!([{"id": "3"}]), FieldTransform::integer("id")).into();
        assert_eq!(build(&definition, None).unwrap(), json!([3]));
    }

    #[test]
    fn value_renders_first_row_or_scalar() {
        let definition: Definition =
            Provider::value(json!([{"cnt": "4"}, {"cnt": "9"}]), FieldTransform::integer("cnt")).into();
        assert_eq!(build(&definition, None).unwrap(), json!(4));

        let definition: Definition = Provider::value(json!(12), "ignored").into();
        assert_eq!(build(&definition, None).unwrap(), json!(12));
    }

    #[test]
    fn shape_errors() {
        let cases: Vec<Provider> = vec![
            Provider::collection(json!([1, 2]), "id").into(),
            Provider::collection(json!({"id": 1}), "id").into(),
            Provider::entity(json!("scalar"), "id"),
            Provider::entity(json!([[1]]), "id"),
            Provider::column(json!(["a"]), "id"),
            Provider::value(json!([true]), "id"),
        ];
        for provider in cases {
            let kind = provider.kind();
            let err = build(&provider.into(), None).unwrap_err();
            assert!(matches!(err, SculptError::Shape(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn one_bad_leaf_aborts_the_build() {
        let definition = Definition::map([
            ("ok", Definition::from(json!(1))),
            (
                "news",
                Provider::collection(news_rows(), Definition::map([("nope", "nope".into())])).into(),
            ),
        ]);
        let err = build(&definition, None).unwrap_err();
        assert!(matches!(err, SculptError::UnknownContextKey(key) if key == "nope"));
    }

    #[test]
    fn fields_at_the_root_see_an_empty_context() {
        let definition: Definition = FieldTransform::boolean("active").into();
        assert_eq!(build(&definition, None).unwrap(), Value::Null);
    }
}

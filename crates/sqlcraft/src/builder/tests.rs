//! End-to-end render tests over the MySQL dialect.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{JoinType, Logic, Query, SqlError, Value};

fn anchor() -> NaiveDateTime {
    // A Wednesday.
    NaiveDate::from_ymd_opt(2025, 3, 12)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

// ==================== SELECT basics ====================

#[test]
fn select_all() {
    let sql = Query::new().table("user").select_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM user");
}

#[test]
fn select_with_conditions() {
    let sql = Query::new()
        .table("user")
        .where_cond("id", ">", 1)
        .where_eq("name", "alice")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id > 1 AND name = 'alice'");
}

#[test]
fn select_field_list() {
    let sql = Query::new()
        .table("user")
        .field("id,name")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT id,name FROM user");
}

#[test]
fn select_field_alias_and_raw() {
    let sql = Query::new()
        .table("user")
        .field_alias("name", "n")
        .field_raw("count(*) AS total")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT name AS n,count(*) AS total FROM user");
}

#[test]
fn select_field_except() {
    let sql = Query::new()
        .table("user")
        .fields(&["id", "name", "email"])
        .field_except(&["email"])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT id,name FROM user");
}

#[test]
fn select_distinct() {
    let sql = Query::new()
        .table("user")
        .field("name")
        .distinct(true)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT DISTINCT name FROM user");
}

#[test]
fn select_json_member() {
    let sql = Query::new()
        .table("user")
        .field("info->name")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT json_extract(info, '$.name') FROM user");
}

#[test]
fn kitchen_sink_clause_order() {
    let sql = Query::new()
        .table("user")
        .field("id,name")
        .where_eq("status", 1)
        .group("type")
        .having("count(*)>1")
        .order("id desc")
        .limit(10)
        .comment("main")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT id,name FROM user WHERE status = 1 GROUP BY type \
         HAVING count(*)>1 ORDER BY id desc LIMIT 10 /* main */"
    );
}

// ==================== Conditions ====================

#[test]
fn in_list() {
    let sql = Query::new()
        .table("user")
        .where_in("id", vec![1, 5, 8])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id IN (1,5,8)");
}

#[test]
fn in_comma_string() {
    let sql = Query::new()
        .table("user")
        .where_in("id", "1,5,8")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id IN (1,5,8)");
}

#[test]
fn in_empty_list_matches_nothing() {
    let sql = Query::new()
        .table("user")
        .where_in("id", Vec::<i64>::new())
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id IN ('')");
}

#[test]
fn in_deduplicates() {
    let sql = Query::new()
        .table("user")
        .where_not_in("id", vec![1, 1, 2])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id NOT IN (1,2)");
}

#[test]
fn null_tests() {
    let sql = Query::new()
        .table("user")
        .where_null("email")
        .where_not_null("name")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE email IS NULL AND name IS NOT NULL"
    );
}

#[test]
fn eq_null_normalizes_to_null_test() {
    let sql = Query::new()
        .table("user")
        .where_eq("email", Value::Null)
        .where_cond("name", "<>", Value::Null)
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE email IS NULL AND name IS NOT NULL"
    );
}

#[test]
fn between_comma_string() {
    let sql = Query::new()
        .table("user")
        .where_between("id", "1,8")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id BETWEEN 1 AND 8");
}

#[test]
fn between_requires_two_values() {
    let err = Query::new()
        .table("user")
        .where_between("id", vec![1])
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::MalformedCondition(_)));
}

#[test]
fn like_single_and_list() {
    let sql = Query::new()
        .table("user")
        .where_like("name", "ali%")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE name LIKE 'ali%'");

    let sql = Query::new()
        .table("user")
        .where_like("name", vec!["ali%", "%son"])
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE (name LIKE 'ali%' OR name LIKE '%son')"
    );
}

#[test]
fn like_list_with_and_combinator() {
    let sql = Query::new()
        .table("user")
        .where_like_all("name", vec!["ali%", "%son"])
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE (name LIKE 'ali%' AND name LIKE '%son')"
    );
}

#[test]
fn multi_field_pipe_and_amp() {
    let sql = Query::new()
        .table("user")
        .where_eq("name|title", "amy")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE (name = 'amy' OR title = 'amy')"
    );

    let sql = Query::new()
        .table("user")
        .where_eq("name&title", "amy")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE (name = 'amy' AND title = 'amy')"
    );
}

#[test]
fn multi_ops_on_one_field() {
    let sql = Query::new()
        .table("user")
        .where_multi("id", vec![(">", 1.into()), ("<", 10.into())], Logic::And)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (id > 1 AND id < 10)");
}

#[test]
fn and_group_emits_before_or() {
    // Insertion order AND, OR, AND; emission keeps AND nodes together first.
    let sql = Query::new()
        .table("user")
        .where_eq("a", 1)
        .or_where("b", "=", 2)
        .where_eq("c", 3)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE a = 1 AND c = 3 OR b = 2");
}

#[test]
fn xor_group() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .xor_where("name", "=", "x")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id = 1 XOR name = 'x'");
}

#[test]
fn raw_fragments() {
    let sql = Query::new()
        .table("user")
        .where_raw("id=1 OR id=2")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (id=1 OR id=2)");
}

#[test]
fn raw_fragment_with_positional_binds() {
    let sql = Query::new()
        .table("user")
        .where_raw_bind("id=? AND name=?", vec![Value::Int(7), "x".into()])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (id=7 AND name='x')");
}

#[test]
fn condition_syntax_in_field_demotes_to_raw() {
    let sql = Query::new()
        .table("user")
        .where_eq("id=1 AND status=1", Value::Null)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (id=1 AND status=1)");
}

#[test]
fn nested_group_closure() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .or_where_group(|q| q.where_eq("name", "a").or_where("name", "=", "b"))
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE id = 1 OR (name = 'a' OR name = 'b')"
    );
}

#[test]
fn empty_nested_group_is_dropped() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .where_group(|q| q)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id = 1");
}

#[test]
fn exists_subquery() {
    let sql = Query::new()
        .table("user")
        .where_exists(|q| q.table("user_info").field("user_id"))
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE EXISTS (SELECT user_id FROM user_info)"
    );
}

#[test]
fn not_exists_trusted_fragment() {
    let sql = Query::new()
        .table("user")
        .where_cond(
            "",
            "not exists",
            crate::Expr::new("SELECT 1 FROM banned WHERE banned.uid = user.id"),
        )
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE NOT EXISTS (SELECT 1 FROM banned WHERE banned.uid = user.id)"
    );
}

#[test]
fn exists_rejects_scalars() {
    let err = Query::new()
        .table("user")
        .where_cond("", "exists", 1)
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::MalformedCondition(_)));
}

#[test]
fn exp_fragment() {
    let sql = Query::new()
        .table("user")
        .where_exp("id", "IN (1,3,8)")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (id IN (1,3,8))");
}

#[test]
fn column_compare() {
    let sql = Query::new()
        .table("user")
        .where_column("update_time", ">", "create_time")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE (update_time > create_time)");
}

#[test]
fn column_compare_rejects_non_comparison() {
    let err = Query::new()
        .table("user")
        .where_column("a", "like", "b")
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidColumnCompare(_)));
}

#[test]
fn unknown_operator_is_malformed() {
    let err = Query::new()
        .table("user")
        .where_cond("id", "frob", 1)
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::MalformedCondition(_)));
}

#[test]
fn regexp_via_dialect_extension() {
    let sql = Query::new()
        .table("user")
        .where_cond("name", "regexp", "^ali")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE name REGEXP '^ali'");
}

#[test]
fn operator_aliases() {
    let sql = Query::new()
        .table("user")
        .where_cond("id", "egt", 5)
        .where_cond("score", "NEQ", 0)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id >= 5 AND score <> 0");
}

#[test]
fn subquery_as_in_candidates() {
    let sql = Query::new()
        .table("user")
        .where_in(
            "id",
            Value::sub(|q| q.table("user_info").field("user_id")),
        )
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE id IN (SELECT user_id FROM user_info)"
    );
}

#[test]
fn subquery_as_comparison_value() {
    let sql = Query::new()
        .table("user")
        .where_cond("id", "=", Value::sub(|q| q.table("user").field_raw("max(id)")))
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id = (SELECT max(id) FROM user)");
}

#[test]
fn where_map_shorthand() {
    let sql = Query::new()
        .table("user")
        .where_map(vec![
            ("a", Value::Int(1)),
            ("b", Value::Null),
            ("c", Value::List(vec![1.into(), 2.into()])),
        ])
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE a = 1 AND b IS NULL AND c IN (1,2)"
    );
}

#[test]
fn where_map_json_object() {
    let sql = Query::new()
        .table("user")
        .where_map_json(serde_json::json!({"name": "x", "status": 1}))
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE name = 'x' AND status = 1");
}

#[test]
fn where_list_triples() {
    let sql = Query::new()
        .table("user")
        .where_list(vec![("a", ">", 1), ("b", "=", 2)])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE a > 1 AND b = 2");
}

#[test]
fn where_query_merges_group_wise() {
    let base = Query::new()
        .table("user")
        .where_eq("status", 1)
        .or_where("vip", "=", 1);
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .where_query(&base)
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE id = 1 AND status = 1 OR vip = 1"
    );
}

// ==================== Identifier resolution ====================

#[test]
fn alias_rewrites_qualified_keys() {
    let sql = Query::new()
        .table("user")
        .alias("a")
        .where_eq("user.id", 1)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user a WHERE a.id = 1");
}

#[test]
fn table_placeholder_resolves_to_primary_table() {
    let sql = Query::new()
        .table("user")
        .where_eq("__TABLE__.id", 1)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE user.id = 1");
}

#[test]
fn via_prefixes_unqualified_keys() {
    let sql = Query::new()
        .table("user")
        .via("u")
        .where_eq("id", 1)
        .order("id desc")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE u.id = 1 ORDER BY u.id desc");
}

#[test]
fn strict_mode_rejects_unsafe_keys() {
    let err = Query::new()
        .table("user")
        .where_cond("id;drop", "=", 1)
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::FieldNotAllowed(_)));
}

#[test]
fn relaxed_mode_passes_keys_through() {
    let sql = Query::new()
        .table("user")
        .strict(false)
        .where_cond("id;drop", "=", 1)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id;drop = 1");
}

// ==================== Joins and unions ====================

#[test]
fn left_join_with_aliases() {
    let sql = Query::new()
        .table("user")
        .alias("a")
        .left_join("user_info b", "b.user_id=a.id")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user a LEFT JOIN user_info b ON b.user_id=a.id"
    );
}

#[test]
fn join_with_condition_list() {
    let sql = Query::new()
        .table("user")
        .alias("a")
        .join_on(
            "user_info b",
            &["b.user_id=a.id", "b.status=a.status"],
            JoinType::Left,
        )
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user a LEFT JOIN user_info b ON b.user_id=a.id AND b.status=a.status"
    );
}

#[test]
fn join_on_comparison_passes_through() {
    let sql = Query::new()
        .table("user a")
        .left_join("user_info b", "b.score>=a.score")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user a LEFT JOIN user_info b ON b.score>=a.score"
    );
}

#[test]
fn subquery_as_join_target() {
    let sub = Query::new()
        .table("user")
        .field("id,name")
        .where_eq("status", 1)
        .build_subquery()
        .unwrap();
    let sql = Query::new()
        .table("user u")
        .left_join(&format!("{sub} w"), "w.id=u.id")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user u LEFT JOIN ( SELECT id,name FROM user WHERE status = 1 ) w ON w.id=u.id"
    );
}

#[test]
fn union_literal_and_sub() {
    let sql = Query::new()
        .table("user")
        .field("id")
        .union("SELECT id FROM admin")
        .union_all_sub(|q| q.table("guest").field("id"))
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT id FROM user UNION SELECT id FROM admin UNION ALL ( SELECT id FROM guest )"
    );
}

// ==================== Ordering and paging ====================

#[test]
fn order_variants() {
    let sql = Query::new()
        .table("user")
        .order("id desc")
        .order("name")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user ORDER BY id desc,name");
}

#[test]
fn order_rand() {
    let sql = Query::new().table("user").order_rand().select_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM user ORDER BY rand()");
}

#[test]
fn order_field_priority() {
    let sql = Query::new()
        .table("user")
        .order_field_priority("status", vec![1.into(), 2.into(), 3.into()], Some("desc"))
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user ORDER BY field(status,1,2,3) desc");
}

#[test]
fn order_raw_fragment() {
    let sql = Query::new()
        .table("user")
        .order_raw("convert(name using gbk)", vec![])
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user ORDER BY convert(name using gbk)");
}

#[test]
fn order_rejects_unknown_direction() {
    let err = Query::new()
        .table("user")
        .order("id sideways")
        .select_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::MalformedCondition(_)));
}

#[test]
fn limit_and_pagination() {
    let sql = Query::new().table("user").limit(10).select_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM user LIMIT 10");

    let sql = Query::new()
        .table("user")
        .limit_offset(20, 10)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user LIMIT 20,10");

    let sql = Query::new().table("user").page(1, 10).select_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM user LIMIT 0,10");

    let sql = Query::new().table("user").page(3, 25).select_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM user LIMIT 50,25");
}

#[test]
fn explicit_limit_wins_over_pagination() {
    let sql = Query::new()
        .table("user")
        .page(2, 10)
        .limit(5)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user LIMIT 5");
}

// ==================== Decorations ====================

#[test]
fn row_locking() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .lock(true)
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id = 1 FOR UPDATE");

    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .lock_clause("lock in share mode")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user WHERE id = 1 lock in share mode");
}

#[test]
fn comment_truncates_at_terminator() {
    let sql = Query::new()
        .table("user")
        .comment("from dashboard")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user /* from dashboard */");

    let sql = Query::new()
        .table("user")
        .comment("x */ DROP TABLE user")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user /* x */");
}

#[test]
fn index_hints() {
    let sql = Query::new()
        .table("user")
        .force_index("idx_name")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user FORCE INDEX (idx_name)");

    let sql = Query::new()
        .table("user")
        .ignore_index("idx_name")
        .select_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM user IGNORE INDEX (idx_name)");
}

// ==================== Time conditions ====================

#[test]
fn time_comparison_with_rule_name() {
    let sql = Query::new()
        .table("user")
        .time_anchor(anchor())
        .where_time("create_time", ">", "today")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE create_time > '2025-03-12 00:00:00'"
    );
}

#[test]
fn time_between_explicit_dates() {
    let sql = Query::new()
        .table("user")
        .where_between_time("create_time", "2025-01-01", "2025-02-01")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE create_time BETWEEN '2025-01-01 00:00:00' AND '2025-02-01 00:00:00'"
    );
}

#[test]
fn time_between_rule_name() {
    let sql = Query::new()
        .table("user")
        .time_anchor(anchor())
        .where_cond("create_time", "between time", "month")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE create_time BETWEEN '2025-03-01 00:00:00' AND '2025-04-01 00:00:00'"
    );
}

#[test]
fn custom_time_rule() {
    let sql = Query::new()
        .table("user")
        .time_rule("fiscal", "2025-04-01 00:00:00", "2026-03-31 23:59:59")
        .where_cond("create_time", "between time", "fiscal")
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE create_time BETWEEN '2025-04-01 00:00:00' AND '2026-03-31 23:59:59'"
    );
}

#[test]
fn time_comparison_with_timestamp() {
    let sql = Query::new()
        .table("user")
        .where_time("create_time", ">", 0)
        .select_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM user WHERE create_time > '1970-01-01 00:00:00'"
    );
}

// ==================== INSERT / REPLACE ====================

#[test]
fn insert_statement() {
    let sql = Query::new()
        .table("user")
        .data("foo", "bar")
        .data("bar", "foo")
        .insert_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO user (foo, bar) VALUES ('bar', 'foo')");
}

#[test]
fn replace_statement() {
    let sql = Query::new()
        .table("user")
        .data("foo", 1)
        .replace_sql()
        .unwrap();
    assert_eq!(sql, "REPLACE INTO user (foo) VALUES (1)");
}

#[test]
fn insert_without_data_is_empty() {
    let sql = Query::new().table("user").insert_sql().unwrap();
    assert_eq!(sql, "");
    assert!(Query::new().table("user").build_insert().unwrap().is_empty());
}

#[test]
fn insert_rejects_non_object_json() {
    let err = Query::new()
        .table("user")
        .data_json(serde_json::json!([1, 2]))
        .insert_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::UnsupportedDataShape(_)));
}

#[test]
fn insert_from_json_object() {
    let sql = Query::new()
        .table("user")
        .data_json(serde_json::json!({"name": "x", "status": 1}))
        .insert_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO user (name, status) VALUES ('x', 1)");
}

// ==================== UPDATE ====================

#[test]
fn update_statement() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .data("name", "alice")
        .update_sql()
        .unwrap();
    assert_eq!(sql, "UPDATE user SET name = 'alice' WHERE id = 1");
}

#[test]
fn update_without_data_is_empty() {
    let sql = Query::new()
        .table("user")
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(sql, "");
}

#[test]
fn update_with_step_helpers() {
    let sql = Query::new()
        .table("user")
        .inc("read_count", 1)
        .dec("score", 3)
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE user SET read_count = read_count + 1, score = score - 3 WHERE id = 1"
    );
}

#[test]
fn update_with_expression() {
    let sql = Query::new()
        .table("user")
        .data_expr("login_time", "now()")
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(sql, "UPDATE user SET login_time = now() WHERE id = 1");
}

#[test]
fn update_json_member() {
    let sql = Query::new()
        .table("user")
        .data("info->name", "amy")
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE user SET info = json_set(info, '$.name', 'amy') WHERE id = 1"
    );
}

#[test]
fn update_join_precedes_set() {
    let sql = Query::new()
        .table("user")
        .alias("a")
        .left_join("user_info b", "b.user_id=a.id")
        .data("b.nickname", "x")
        .where_eq("a.id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE user a LEFT JOIN user_info b ON b.user_id=a.id SET b.nickname = 'x' WHERE a.id = 1"
    );
}

#[test]
fn data_outside_declared_fields_is_rejected() {
    let err = Query::new()
        .table("user")
        .field("name")
        .data("password", "x")
        .where_eq("id", 1)
        .update_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::FieldNotAllowed(_)));
}

#[test]
fn relaxed_mode_skips_undeclared_data_keys() {
    let sql = Query::new()
        .table("user")
        .field("name")
        .strict(false)
        .data("password", "x")
        .data("name", "y")
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(sql, "UPDATE user SET name = 'y' WHERE id = 1");
}

#[test]
fn list_value_requires_json_column() {
    let err = Query::new()
        .table("user")
        .data("tags", vec!["a", "b"])
        .where_eq("id", 1)
        .update_sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::UnsupportedDataShape(_)));

    let sql = Query::new()
        .table("user")
        .json_type("tags", "json")
        .data("tags", vec!["a", "b"])
        .where_eq("id", 1)
        .update_sql()
        .unwrap();
    assert_eq!(sql, "UPDATE user SET tags = '[\\\"a\\\",\\\"b\\\"]' WHERE id = 1");
}

// ==================== DELETE ====================

#[test]
fn delete_with_condition() {
    let sql = Query::new()
        .table("user")
        .where_cond("id", "<", 10)
        .delete_sql(false)
        .unwrap();
    assert_eq!(sql, "DELETE FROM user WHERE id < 10");
}

#[test]
fn delete_without_condition_is_refused() {
    let err = Query::new().table("user").delete_sql(false).unwrap_err();
    assert!(matches!(err, SqlError::MissingDeleteCondition));
}

#[test]
fn forced_delete_without_condition() {
    let sql = Query::new().table("user").delete_sql(true).unwrap();
    assert_eq!(sql, "DELETE FROM user");
}

#[test]
fn delete_with_using() {
    let sql = Query::new()
        .table("user")
        .using("user_info")
        .where_eq("id", 1)
        .delete_sql(false)
        .unwrap();
    assert_eq!(sql, "DELETE FROM user USING user_info WHERE id = 1");
}

// ==================== Binding and idempotence ====================

#[test]
fn bind_table_matches_placeholders() {
    let stmt = Query::new()
        .table("user")
        .where_cond("id", ">", 1)
        .where_eq("name", "alice")
        .build_select()
        .unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM user WHERE id > :b1 AND name = :b2");
    assert_eq!(stmt.binds.len(), 2);
    assert!(!stmt.display().contains(":b"));
}

#[test]
fn rendering_is_idempotent() {
    let q = Query::new()
        .table("user")
        .where_in("id", vec![1, 2, 3])
        .where_eq("name", "x");
    let first = q.select_sql().unwrap();
    let second = q.select_sql().unwrap();
    assert_eq!(first, second);

    let a = q.build_select().unwrap();
    let b = q.build_select().unwrap();
    assert_eq!(a.binds.len(), b.binds.len());
}

#[test]
fn intent_flags_are_recorded() {
    let q = Query::new()
        .table("user")
        .cache("user:1")
        .fail_on_empty(true)
        .fetch_collection(true)
        .master(true);
    assert_eq!(q.cache_key(), Some("user:1"));
    assert!(q.fails_on_empty());
    assert!(q.wants_collection());
    assert!(q.prefers_master());
}

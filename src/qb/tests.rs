//! Cross-builder tests: one condition tree driven through several
//! builders, sub-selects spliced between builders, parameter plumbing.

use super::*;
use crate::cond::Field;
use mysql_async::Value;

fn f(name: &str) -> Field {
    Field::new(name)
}

#[test]
fn same_condition_renders_alike_across_builders() {
    let cond = || f("status").eq("active").and(f("age").gte(18));

    let select_sql = select("users").filter(cond()).to_sql();
    let count_sql = count("users").filter(cond()).to_sql();
    let delete_sql = delete("users").filter(cond()).to_sql();

    let suffix = " FROM `users` WHERE `status`=? AND `age`>=?";
    assert_eq!(select_sql, format!("SELECT *{suffix}"));
    assert_eq!(count_sql, format!("SELECT count(1){suffix}"));
    assert_eq!(delete_sql, format!("DELETE{suffix}"));
}

#[test]
fn subselect_in_delete_where() {
    let banned = select("bans").collect(&["user_id"]).filter(f("active").eq(1));
    let qb = delete("sessions").filter(f("user_id").in_select(banned));
    let (sql, params) = qb.build();
    assert_eq!(
        sql,
        "DELETE FROM `sessions` WHERE `user_id` IN \
         (SELECT `user_id` FROM `bans` WHERE `active`=?)"
    );
    assert_eq!(params, vec![Value::Int(1)]);
}

#[test]
fn count_over_nested_select_via_outer_filter() {
    let recent = select("orders").filter(f("total").gt(50)).slice(1, 100);
    let qb = select_from_query(recent)
        .filter(f("status").eq("paid"))
        .group_by(&["user_id"]);
    let (sql, params) = qb.build();
    assert_eq!(
        sql,
        "SELECT * FROM (SELECT * FROM `orders` WHERE `total`>? LIMIT 0,100) AS t \
         WHERE `t`.`status`=? GROUP BY `t`.`user_id`"
    );
    assert_eq!(
        params,
        vec![Value::Int(50), Value::Bytes(b"paid".to_vec())]
    );
}

#[test]
fn update_and_insert_share_value_conversions() {
    let upd = update("accounts")
        .set(f("balance").add(100))
        .filter(f("id").eq(9));
    let (sql, params) = upd.build();
    assert_eq!(sql, "UPDATE `accounts` SET `balance`=`balance`+? WHERE `id`=?");
    assert_eq!(params, vec![Value::Int(100), Value::Int(9)]);

    let ins = insert("accounts").set("owner", "carol").set("balance", 0);
    assert_eq!(
        ins.to_sql(),
        "INSERT INTO `accounts`(`owner`,`balance`) VALUES (?,?)"
    );
}

#[test]
fn empty_params_map_to_params_empty() {
    assert!(matches!(to_params(Vec::new()), Params::Empty));
    assert!(matches!(
        to_params(vec![Value::Int(1)]),
        Params::Positional(_)
    ));
}

#[test]
fn validation_failure_propagates_through_in_select() {
    let bad_inner = select("orders").slice(0, 10);
    let qb = select("users").filter(f("id").in_select(bad_inner));
    assert!(qb.validate().is_err());
}

#[test]
fn free_functions_match_builder_constructors() {
    assert_eq!(select("T").to_sql(), SelectQb::new("T").to_sql());
    assert_eq!(count("T").to_sql(), CountQb::new("T").to_sql());
    assert_eq!(delete("T").to_sql(), DeleteQb::new("T").to_sql());
    assert_eq!(
        update("T").set(f("a").assign(1)).to_sql(),
        UpdateQb::new("T").set(f("a").assign(1)).to_sql()
    );
}

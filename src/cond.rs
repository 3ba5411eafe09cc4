//! Composable WHERE/HAVING conditions.
//!
//! A [`Field`] is a handle on a column name obtained from
//! [`Table::field`](crate::table::Table::field). Each comparison constructor
//! produces a new [`Cond`] value, so a condition carries exactly one
//! comparison by construction; further predicates are attached with
//! [`Cond::and`] / [`Cond::or`], which preserve left-to-right order for both
//! rendering and parameter extraction.
//!
//! Rendering takes an optional table alias and qualifies every column
//! reference structurally (`` `t`.`col` ``); there is no text-rewrite pass
//! over already-rendered SQL.

use crate::ident::{qualify, quote};
use crate::qb::SelectQb;
use mysql_async::Value;

/// Boolean connector between chained conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn keyword(self) -> &'static str {
        match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        }
    }
}

/// Right-hand side of a comparison: a literal value or a spliced
/// condition expression (e.g. `` `credits`=`credits`+? ``).
#[derive(Clone, Debug)]
enum Rhs {
    Value(Value),
    Expr(Box<Cond>),
}

/// One predicate node.
#[derive(Clone, Debug)]
enum Pred {
    /// `` `col`<op>? `` or `` `col`=<expr> ``
    Cmp {
        column: String,
        op: &'static str,
        rhs: Rhs,
    },
    /// `` `col`+? `` / `` `col`-? `` — an expression fragment, usable as
    /// the spliced right-hand side of an equality.
    Arith {
        column: String,
        op: &'static str,
        value: Value,
    },
    /// `` DATE_FORMAT(`col`,'fmt')<op>? ``
    DateCmp {
        column: String,
        format: String,
        op: &'static str,
        value: Value,
    },
    /// `` `col` IN ('a','b') `` — values inlined as quoted literals, not
    /// parameterized; literal escaping is the caller's responsibility.
    InLiteral {
        column: String,
        values: Vec<String>,
        negated: bool,
    },
    /// `` `col` IN (SELECT ...) `` with the sub-query's parameters spliced
    /// in order.
    InSelect {
        column: String,
        query: Box<SelectQb>,
        negated: bool,
    },
}

/// A comparison predicate on a column, extendable with AND/OR into an
/// ordered chain. Renders to parameterized SQL text via [`Cond::to_sql`];
/// [`Cond::params`] yields the bound values in the same left-to-right order
/// as the rendered placeholders.
#[derive(Clone, Debug)]
pub struct Cond {
    pred: Pred,
    children: Vec<(Connector, Cond)>,
}

impl Cond {
    fn leaf(pred: Pred) -> Self {
        Self {
            pred,
            children: Vec::new(),
        }
    }

    /// Append a sibling condition with the AND connector.
    pub fn and(mut self, other: Cond) -> Self {
        self.children.push((Connector::And, other));
        self
    }

    /// Append a sibling condition with the OR connector.
    pub fn or(mut self, other: Cond) -> Self {
        self.children.push((Connector::Or, other));
        self
    }

    /// Render this condition chain, qualifying every column reference with
    /// `alias` when one is given.
    pub fn to_sql(&self, alias: Option<&str>) -> String {
        let mut sql = self.render_pred(alias);
        for (connector, child) in &self.children {
            sql.push_str(connector.keyword());
            sql.push_str(&child.to_sql(alias));
        }
        sql
    }

    /// Bound parameters, own first, then each child's, left to right.
    pub fn params(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    /// Check any nested sub-select for builder misconfiguration.
    pub(crate) fn validate(&self) -> crate::error::OrmResult<()> {
        match &self.pred {
            Pred::InSelect { query, .. } => query.validate()?,
            Pred::Cmp {
                rhs: Rhs::Expr(expr),
                ..
            } => expr.validate()?,
            _ => {}
        }
        for (_, child) in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    fn render_pred(&self, alias: Option<&str>) -> String {
        match &self.pred {
            Pred::Cmp { column, op, rhs } => match rhs {
                Rhs::Value(_) => format!("{}{op}?", qualify(alias, column)),
                Rhs::Expr(expr) => {
                    format!("{}{op}{}", qualify(alias, column), expr.to_sql(alias))
                }
            },
            Pred::Arith { column, op, .. } => format!("{}{op}?", qualify(alias, column)),
            Pred::DateCmp {
                column,
                format,
                op,
                ..
            } => format!("DATE_FORMAT({},'{format}'){op}?", qualify(alias, column)),
            Pred::InLiteral {
                column,
                values,
                negated,
            } => {
                let list = values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(",");
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {op} ({list})", qualify(alias, column))
            }
            Pred::InSelect {
                column,
                query,
                negated,
            } => {
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {op} ({})", qualify(alias, column), query.to_sql())
            }
        }
    }

    fn collect_params(&self, out: &mut Vec<Value>) {
        match &self.pred {
            Pred::Cmp { rhs, .. } => match rhs {
                Rhs::Value(v) => out.push(v.clone()),
                Rhs::Expr(expr) => expr.collect_params(out),
            },
            Pred::Arith { value, .. } => out.push(value.clone()),
            Pred::DateCmp { value, .. } => out.push(value.clone()),
            Pred::InLiteral { .. } => {}
            Pred::InSelect { query, .. } => out.extend(query.build().1),
        }
        for (_, child) in &self.children {
            child.collect_params(out);
        }
    }
}

/// A column handle yielding condition and assignment constructors.
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn cmp(&self, op: &'static str, value: impl Into<Value>) -> Cond {
        Cond::leaf(Pred::Cmp {
            column: self.name.clone(),
            op,
            rhs: Rhs::Value(value.into()),
        })
    }

    /// `` `col`=? ``
    pub fn eq(&self, value: impl Into<Value>) -> Cond {
        self.cmp("=", value)
    }

    /// `` `col`<>? ``
    pub fn ne(&self, value: impl Into<Value>) -> Cond {
        self.cmp("<>", value)
    }

    /// `` `col`<? ``
    pub fn lt(&self, value: impl Into<Value>) -> Cond {
        self.cmp("<", value)
    }

    /// `` `col`<=? ``
    pub fn lte(&self, value: impl Into<Value>) -> Cond {
        self.cmp("<=", value)
    }

    /// `` `col`>? ``
    pub fn gt(&self, value: impl Into<Value>) -> Cond {
        self.cmp(">", value)
    }

    /// `` `col`>=? ``
    pub fn gte(&self, value: impl Into<Value>) -> Cond {
        self.cmp(">=", value)
    }

    /// `` `col` LIKE ? ``
    pub fn like(&self, pattern: impl Into<Value>) -> Cond {
        self.cmp(" LIKE ", pattern)
    }

    /// `` `col`=<expr> `` — splices another condition's rendered fragment
    /// and its parameters as the right-hand side.
    pub fn eq_expr(&self, expr: Cond) -> Cond {
        Cond::leaf(Pred::Cmp {
            column: self.name.clone(),
            op: "=",
            rhs: Rhs::Expr(Box::new(expr)),
        })
    }

    /// Expression fragment `` `col`+? ``, for splicing via [`Field::eq_expr`].
    pub fn plus(&self, value: impl Into<Value>) -> Cond {
        Cond::leaf(Pred::Arith {
            column: self.name.clone(),
            op: "+",
            value: value.into(),
        })
    }

    /// Expression fragment `` `col`-? ``, for splicing via [`Field::eq_expr`].
    pub fn minus(&self, value: impl Into<Value>) -> Cond {
        Cond::leaf(Pred::Arith {
            column: self.name.clone(),
            op: "-",
            value: value.into(),
        })
    }

    fn date_cmp(&self, op: &'static str, format: &str, value: impl Into<Value>) -> Cond {
        Cond::leaf(Pred::DateCmp {
            column: self.name.clone(),
            format: format.to_string(),
            op,
            value: value.into(),
        })
    }

    /// `` DATE_FORMAT(`col`,'fmt')=? ``
    pub fn date_eq(&self, format: &str, value: impl Into<Value>) -> Cond {
        self.date_cmp("=", format, value)
    }

    /// `` DATE_FORMAT(`col`,'fmt')<=? ``
    pub fn date_lte(&self, format: &str, value: impl Into<Value>) -> Cond {
        self.date_cmp("<=", format, value)
    }

    /// `` DATE_FORMAT(`col`,'fmt')>=? ``
    pub fn date_gte(&self, format: &str, value: impl Into<Value>) -> Cond {
        self.date_cmp(">=", format, value)
    }

    /// `` `col` IN ('a','b') `` — literal list, not parameterized.
    pub fn in_values<I, S>(&self, values: I) -> Cond
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cond::leaf(Pred::InLiteral {
            column: self.name.clone(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        })
    }

    /// `` `col` NOT IN ('a','b') `` — literal list, not parameterized.
    pub fn not_in_values<I, S>(&self, values: I) -> Cond
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cond::leaf(Pred::InLiteral {
            column: self.name.clone(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        })
    }

    /// `` `col` IN (SELECT ...) ``
    pub fn in_select(&self, query: SelectQb) -> Cond {
        Cond::leaf(Pred::InSelect {
            column: self.name.clone(),
            query: Box::new(query),
            negated: false,
        })
    }

    /// `` `col` NOT IN (SELECT ...) ``
    pub fn not_in_select(&self, query: SelectQb) -> Cond {
        Cond::leaf(Pred::InSelect {
            column: self.name.clone(),
            query: Box::new(query),
            negated: true,
        })
    }

    /// SET-clause assignment: `` `col`=? ``
    pub fn assign(&self, value: impl Into<Value>) -> Assign {
        Assign {
            column: self.name.clone(),
            op: AssignOp::Set,
            value: value.into(),
        }
    }

    /// SET-clause increment: `` `col`=`col`+? ``
    pub fn add(&self, value: impl Into<Value>) -> Assign {
        Assign {
            column: self.name.clone(),
            op: AssignOp::Add,
            value: value.into(),
        }
    }

    /// SET-clause decrement: `` `col`=`col`-? ``
    pub fn sub(&self, value: impl Into<Value>) -> Assign {
        Assign {
            column: self.name.clone(),
            op: AssignOp::Sub,
            value: value.into(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum AssignOp {
    Set,
    Add,
    Sub,
}

/// One SET-clause expression for an UPDATE, carrying both the assignment
/// fragment and its bound value.
#[derive(Clone, Debug)]
pub struct Assign {
    column: String,
    op: AssignOp,
    value: Value,
}

impl Assign {
    pub(crate) fn to_sql(&self) -> String {
        let col = quote(&self.column);
        match self.op {
            AssignOp::Set => format!("{col}=?"),
            AssignOp::Add => format!("{col}={col}+?"),
            AssignOp::Sub => format!("{col}={col}-?"),
        }
    }

    pub(crate) fn value(&self) -> Value {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::select;

    fn f(name: &str) -> Field {
        Field::new(name)
    }

    #[test]
    fn eq_renders_exact_fragment() {
        let cond = f("c").eq(5);
        assert_eq!(cond.to_sql(None), "`c`=?");
        assert_eq!(cond.params(), vec![Value::Int(5)]);
    }

    #[test]
    fn every_comparison_operator() {
        assert_eq!(f("c").ne(1).to_sql(None), "`c`<>?");
        assert_eq!(f("c").lt(1).to_sql(None), "`c`<?");
        assert_eq!(f("c").lte(1).to_sql(None), "`c`<=?");
        assert_eq!(f("c").gt(1).to_sql(None), "`c`>?");
        assert_eq!(f("c").gte(1).to_sql(None), "`c`>=?");
        assert_eq!(f("c").like("%x%").to_sql(None), "`c` LIKE ?");
    }

    #[test]
    fn and_concatenates_sql_and_params() {
        let a = f("a").eq(1);
        let b = f("b").gt(2);
        let a_sql = a.to_sql(None);
        let b_sql = b.to_sql(None);
        let mut expected_params = a.params();
        expected_params.extend(b.params());

        let chained = a.and(b);
        assert_eq!(chained.to_sql(None), format!("{a_sql} AND {b_sql}"));
        assert_eq!(chained.params(), expected_params);
    }

    #[test]
    fn deep_mixed_chain_preserves_order() {
        let cond = f("a").eq(1).or(f("b").eq(2)).and(f("c").lt(3).or(f("d").gte(4)));
        assert_eq!(
            cond.to_sql(None),
            "`a`=? OR `b`=? AND `c`<? OR `d`>=?"
        );
        assert_eq!(
            cond.params(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn alias_qualifies_every_column() {
        let cond = f("a").eq(1).and(f("b").gt(2));
        assert_eq!(cond.to_sql(Some("t")), "`t`.`a`=? AND `t`.`b`>?");
    }

    #[test]
    fn date_format_comparisons() {
        let cond = f("created").date_lte("%Y-%m-%d", "2024-01-01");
        assert_eq!(cond.to_sql(None), "DATE_FORMAT(`created`,'%Y-%m-%d')<=?");
        assert_eq!(cond.params(), vec![Value::Bytes(b"2024-01-01".to_vec())]);
    }

    #[test]
    fn in_literal_list_is_inlined() {
        let cond = f("status").in_values(["new", "open"]);
        assert_eq!(cond.to_sql(None), "`status` IN ('new','open')");
        assert!(cond.params().is_empty());

        let cond = f("status").not_in_values(["done"]);
        assert_eq!(cond.to_sql(None), "`status` NOT IN ('done')");
    }

    #[test]
    fn in_select_splices_subquery_and_params() {
        let sub = select("orders").collect(&["user_id"]).filter(f("total").gt(100));
        let cond = f("id").in_select(sub);
        assert_eq!(
            cond.to_sql(None),
            "`id` IN (SELECT `user_id` FROM `orders` WHERE `total`>?)"
        );
        assert_eq!(cond.params(), vec![Value::Int(100)]);
    }

    #[test]
    fn eq_expr_splices_fragment_and_params() {
        let cond = f("credits").eq_expr(f("credits").plus(5));
        assert_eq!(cond.to_sql(None), "`credits`=`credits`+?");
        assert_eq!(cond.params(), vec![Value::Int(5)]);
    }

    #[test]
    fn assignments() {
        assert_eq!(f("n").assign(1).to_sql(), "`n`=?");
        assert_eq!(f("n").add(1).to_sql(), "`n`=`n`+?");
        assert_eq!(f("n").sub(1).to_sql(), "`n`=`n`-?");
    }
}

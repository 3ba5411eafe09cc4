//! Backtick quoting for MySQL identifiers.
//!
//! Every column or table name that reaches a rendered statement goes through
//! [`quote`] / [`qualify`], so alias qualification happens structurally at
//! render time rather than by rewriting already-rendered SQL.

/// Quote a single identifier: `` name -> `name` ``.
///
/// Embedded backticks are escaped by doubling, per MySQL quoting rules.
pub fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
    out
}

/// Quote an identifier, optionally qualified by a table alias:
/// `` qualify(Some("t"), "col") -> `t`.`col` ``.
pub fn qualify(alias: Option<&str>, name: &str) -> String {
    match alias {
        Some(a) => format!("{}.{}", quote(a), quote(name)),
        None => quote(name),
    }
}

/// Quote and comma-join a list of identifiers.
pub fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| quote(n.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

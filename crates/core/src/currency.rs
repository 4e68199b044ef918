//! BRL amount formatting.
//!
//! Two distinct output forms:
//!
//! - [`format_brl`] - pt-BR display form (`R$ 1.234,56`)
//! - [`format_amount`] - fixed two-decimal, dot-separated form for the PIX
//!   payload (`10.5` -> `"10.50"`), never grouped

use rust_decimal::Decimal;

/// Format an amount for display as Brazilian currency.
///
/// Rounds to two decimal places, groups thousands with `.` and uses `,` as
/// the decimal separator: `1234.5` -> `"R$ 1.234,50"`.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let fixed = format_amount(amount);
    let (sign, digits) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    format!("{sign}R$ {},{frac_part}", group_thousands(int_part))
}

/// Format an amount for embedding in a PIX payload.
///
/// Always two decimal places, dot-separated, no grouping: `10.5` ->
/// `"10.50"`, `3` -> `"3.00"`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp(2);
    value.rescale(2);
    value.to_string()
}

/// Insert a `.` between every group of three digits, right to left.
fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

use std::sync::Arc;

/// Stable key for a zone or control feature.
/// Keep the original key text (with leading zeros) but avoid repeated owned Strings.
pub type ZoneId = Arc<str>;

/// Render a numeric key the way it was written in the source table:
/// integral values lose the trailing `.0`, everything else keeps its float form.
pub(crate) fn numeric_id(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::numeric_id;

    #[test]
    fn integral_keys_drop_the_decimal_point() {
        assert_eq!(numeric_id(7.0), "7");
        assert_eq!(numeric_id(-3.0), "-3");
        assert_eq!(numeric_id(0.0), "0");
    }

    #[test]
    fn fractional_keys_keep_their_float_form() {
        assert_eq!(numeric_id(3.5), "3.5");
    }
}

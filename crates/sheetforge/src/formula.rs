//! Formula text helpers
//!
//! Pure string composition. Arguments are inserted verbatim, nothing is
//! parsed or escaped, and the result carries no leading `=`.

pub fn sum(range: &str) -> String {
    format!("SUM({})", range)
}

pub fn average(range: &str) -> String {
    format!("AVERAGE({})", range)
}

pub fn count(range: &str) -> String {
    format!("COUNT({})", range)
}

/// `criteria` is wrapped in double quotes
pub fn count_if(range: &str, criteria: &str) -> String {
    format!("COUNTIF({},\"{}\")", range, criteria)
}

pub fn sum_if(range: &str, criteria: &str, sum_range: Option<&str>) -> String {
    match sum_range {
        Some(sum_range) => format!("SUMIF({},\"{}\",{})", range, criteria, sum_range),
        None => format!("SUMIF({},\"{}\")", range, criteria),
    }
}

/// `exact_match` selects FALSE as the range-lookup argument
pub fn vlookup(lookup_value: &str, table_range: &str, col_index: u32, exact_match: bool) -> String {
    format!(
        "VLOOKUP({},{},{},{})",
        lookup_value,
        table_range,
        col_index,
        if exact_match { "FALSE" } else { "TRUE" }
    )
}

/// Both branches are emitted as string literals
pub fn if_formula(condition: &str, value_if_true: &str, value_if_false: &str) -> String {
    format!("IF({},\"{}\",\"{}\")", condition, value_if_true, value_if_false)
}

pub fn concat(values: &[&str]) -> String {
    format!("CONCATENATE({})", values.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates() {
        assert_eq!(sum("B2:B10"), "SUM(B2:B10)");
        assert_eq!(average("C2:C5"), "AVERAGE(C2:C5)");
        assert_eq!(count("A:A"), "COUNT(A:A)");
    }

    #[test]
    fn test_conditional_aggregates() {
        assert_eq!(count_if("A2:A9", ">10"), "COUNTIF(A2:A9,\">10\")");
        assert_eq!(sum_if("A2:A9", "East", None), "SUMIF(A2:A9,\"East\")");
        assert_eq!(
            sum_if("A2:A9", "East", Some("C2:C9")),
            "SUMIF(A2:A9,\"East\",C2:C9)"
        );
    }

    #[test]
    fn test_lookup_and_logic() {
        assert_eq!(vlookup("A2", "Prices!A:B", 2, true), "VLOOKUP(A2,Prices!A:B,2,FALSE)");
        assert_eq!(vlookup("A2", "Prices!A:B", 2, false), "VLOOKUP(A2,Prices!A:B,2,TRUE)");
        assert_eq!(if_formula("B2>0", "Profit", "Loss"), "IF(B2>0,\"Profit\",\"Loss\")");
        assert_eq!(concat(&["A2", "\" \"", "B2"]), "CONCATENATE(A2,\" \",B2)");
    }
}

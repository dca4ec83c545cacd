/// One CSV column, as produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Header row for a record type
pub fn csv_header(fields: &[CsvField]) -> String {
    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_joins_names() {
        let fields = [
            CsvField { name: "date", required: true, description: "" },
            CsvField { name: "amount", required: true, description: "" },
        ];
        assert_eq!(csv_header(&fields), "date,amount");
    }
}

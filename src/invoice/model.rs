use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::macros::format_description;
use time::Date;

pub const FIELD_DATE_INVOICE: &str = "date_invoice";
pub const FIELD_MONTH_INVOICE: &str = "month_invoice";

pub const BAD_RANGE_MESSAGE: &str =
    r#""Date From" is later than "Date To". Please select valid period."#;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateRange {
    pub from: Date,
    pub to: Date,
}

impl DateRange {
    /// Rejects inverted ranges, so every `DateRange` value satisfies `from <= to`.
    pub fn new(from: Date, to: Date) -> Result<DateRange> {
        if from > to {
            return Err(Error::InvalidInput(BAD_RANGE_MESSAGE.into()));
        }
        Ok(DateRange { from, to })
    }

    /// First and last day of the calendar month preceding `today`.
    pub fn previous_month(today: Date) -> Result<DateRange> {
        let to = today
            .replace_day(1)?
            .previous_day()
            .ok_or("Date is outside of the supported range")?;
        let from = to.replace_day(1)?;
        Ok(DateRange { from, to })
    }
}

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryPayload {
    pub invoice_date_from: String,
    pub invoice_date_to: String,
    pub execute_immediately: String,
}

impl QueryPayload {
    pub fn new(range: &DateRange) -> Result<QueryPayload> {
        let format = format_description!("[year]-[month]-[day] 00:00:00");
        Ok(QueryPayload {
            invoice_date_from: range.from.format(&format)?,
            invoice_date_to: range.to.format(&format)?,
            execute_immediately: "True".into(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceList {
    pub invoices: Vec<Map<String, Value>>,
    pub count: usize,
    pub message: Option<String>,
}

impl InvoiceList {
    pub fn shaped(records: Vec<Map<String, Value>>) -> Result<InvoiceList> {
        let invoices = shape(records)?;
        Ok(InvoiceList {
            count: invoices.len(),
            invoices,
            message: None,
        })
    }

    pub fn empty(message: Option<String>) -> InvoiceList {
        InvoiceList {
            invoices: vec![],
            count: 0,
            message,
        }
    }
}

/// Attaches a `month_invoice` grouping key to every record and sorts the
/// batch by `date_invoice`. Records sharing a date keep their original
/// relative order. A record without a parseable `date_invoice` fails the
/// whole batch.
pub fn shape(records: Vec<Map<String, Value>>) -> Result<Vec<Map<String, Value>>> {
    let date_format = format_description!("[year]-[month]-[day]");
    let month_format = format_description!("[year]-[month]");
    let mut shaped: Vec<(Date, Map<String, Value>)> = Vec::with_capacity(records.len());
    for mut record in records {
        let date_invoice = record
            .get(FIELD_DATE_INVOICE)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("Invoice record has no {FIELD_DATE_INVOICE} field"))?;
        let date_invoice = Date::parse(date_invoice, &date_format)?;
        record.insert(
            FIELD_MONTH_INVOICE.into(),
            date_invoice.format(&month_format)?.into(),
        );
        shaped.push((date_invoice, record));
    }
    shaped.sort_by_key(|(date_invoice, _)| *date_invoice);
    Ok(shaped.into_iter().map(|(_, record)| record).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::mock_invoice;
    use crate::Result;
    use time::macros::date;

    #[test]
    fn query_payload_renders_midnight_timestamps() -> Result<()> {
        let range = DateRange::new(date!(2024 - 02 - 01), date!(2024 - 02 - 29))?;
        let query = QueryPayload::new(&range)?;
        assert_eq!("2024-02-01 00:00:00", query.invoice_date_from);
        assert_eq!("2024-02-29 00:00:00", query.invoice_date_to);
        assert_eq!("True", query.execute_immediately);
        Ok(())
    }

    #[test]
    fn range_allows_single_day() -> Result<()> {
        let range = DateRange::new(date!(2024 - 03 - 01), date!(2024 - 03 - 01))?;
        assert_eq!(range.from, range.to);
        Ok(())
    }

    #[test]
    fn range_rejects_inverted_dates() {
        let res = DateRange::new(date!(2024 - 03 - 10), date!(2024 - 03 - 01));
        assert!(res.is_err());
        assert_eq!(BAD_RANGE_MESSAGE, res.unwrap_err().to_string());
    }

    #[test]
    fn previous_month_spans_whole_month() -> Result<()> {
        let range = DateRange::previous_month(date!(2024 - 03 - 15))?;
        assert_eq!(date!(2024 - 02 - 01), range.from);
        assert_eq!(date!(2024 - 02 - 29), range.to);
        Ok(())
    }

    #[test]
    fn previous_month_rolls_over_year_boundary() -> Result<()> {
        let range = DateRange::previous_month(date!(2024 - 01 - 10))?;
        assert_eq!(date!(2023 - 12 - 01), range.from);
        assert_eq!(date!(2023 - 12 - 31), range.to);
        Ok(())
    }

    #[test]
    fn shape_sorts_by_invoice_date() -> Result<()> {
        let records = vec![
            mock_invoice("INV-3", "2024-02-10"),
            mock_invoice("INV-1", "2024-02-01"),
            mock_invoice("INV-2", "2024-02-20"),
        ];
        let shaped = shape(records)?;
        let dates: Vec<&str> = shaped
            .iter()
            .map(|it| it[FIELD_DATE_INVOICE].as_str().unwrap())
            .collect();
        assert_eq!(vec!["2024-02-01", "2024-02-10", "2024-02-20"], dates);
        Ok(())
    }

    #[test]
    fn shape_derives_month_key() -> Result<()> {
        let shaped = shape(vec![mock_invoice("INV-1", "2024-03-15")])?;
        assert_eq!("2024-03", shaped[0][FIELD_MONTH_INVOICE].as_str().unwrap());
        Ok(())
    }

    #[test]
    fn shape_keeps_original_fields() -> Result<()> {
        let shaped = shape(vec![mock_invoice("INV-1", "2024-03-15")])?;
        assert_eq!("INV-1", shaped[0]["number"].as_str().unwrap());
        assert_eq!(
            FIELD_MONTH_INVOICE,
            shaped[0].keys().last().unwrap(),
            "grouping key should be appended after the upstream fields",
        );
        Ok(())
    }

    #[test]
    fn shape_is_stable_for_equal_dates() -> Result<()> {
        let records = vec![
            mock_invoice("INV-1", "2024-03-01"),
            mock_invoice("INV-2", "2024-03-01"),
            mock_invoice("INV-3", "2024-03-01"),
        ];
        let shaped = shape(records)?;
        let numbers: Vec<&str> = shaped
            .iter()
            .map(|it| it["number"].as_str().unwrap())
            .collect();
        assert_eq!(vec!["INV-1", "INV-2", "INV-3"], numbers);
        Ok(())
    }

    #[test]
    fn shape_preserves_sorted_order() -> Result<()> {
        let records = vec![
            mock_invoice("INV-1", "2024-03-01"),
            mock_invoice("INV-2", "2024-03-02"),
            mock_invoice("INV-3", "2024-03-03"),
        ];
        let shaped = shape(shape(records)?)?;
        let numbers: Vec<&str> = shaped
            .iter()
            .map(|it| it["number"].as_str().unwrap())
            .collect();
        assert_eq!(vec!["INV-1", "INV-2", "INV-3"], numbers);
        Ok(())
    }

    #[test]
    fn shape_fails_on_missing_invoice_date() {
        let mut record = mock_invoice("INV-1", "2024-03-15");
        record.remove(FIELD_DATE_INVOICE);
        assert!(shape(vec![record]).is_err());
    }

    #[test]
    fn shape_fails_on_malformed_invoice_date() {
        assert!(shape(vec![mock_invoice("INV-1", "15.03.2024")]).is_err());
    }
}

//! Row-per-record summary table, written as xlsx or CSV.

use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Artifact, Result};
use crate::error::ExportError;
use crate::models::record::InvoiceRecord;

/// Column headers, in output order.
pub const TABLE_HEADERS: [&str; 6] = [
    "Supplier",
    "Invoice Ref.",
    "Amount",
    "IBAN",
    "BIC",
    "Payment Date",
];

/// Spreadsheet flavour of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    /// Excel workbook.
    #[default]
    Xlsx,
    /// Comma-separated values.
    Csv,
}

impl TabularFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Xlsx => "xlsx",
            TabularFormat::Csv => "csv",
        }
    }
}

/// One row per record, fields passed through, date as `YYYY-MM-DD`.
pub fn table_rows(records: &[InvoiceRecord]) -> Vec<[String; 6]> {
    records
        .iter()
        .map(|r| {
            [
                r.supplier_name.clone(),
                r.invoice_reference.clone(),
                r.amount_due.clone(),
                r.creditor_iban.clone(),
                r.creditor_bic.clone(),
                r.payment_date.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect()
}

/// Tabular exporter.
pub struct TabularExporter {
    format: TabularFormat,
    file_stem: String,
}

impl TabularExporter {
    pub fn new(format: TabularFormat) -> Self {
        Self {
            format,
            file_stem: "reglements_factures".to_string(),
        }
    }

    /// Set the file name without extension.
    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Serialize the records.
    pub fn export(&self, records: &[InvoiceRecord]) -> Result<Artifact> {
        if records.is_empty() {
            return Err(ExportError::EmptyBatch);
        }

        let rows = table_rows(records);
        let bytes = match self.format {
            TabularFormat::Xlsx => write_xlsx(&rows)?,
            TabularFormat::Csv => write_csv(&rows)?,
        };

        info!("Exported {} rows as {}", rows.len(), self.format.extension());

        Ok(Artifact::new(
            format!("{}.{}", self.file_stem, self.format.extension()),
            bytes,
        ))
    }
}

fn write_xlsx(rows: &[[String; 6]]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in TABLE_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32 + 1, col as u16, value.as_str())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_csv(rows: &[[String; 6]]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(TABLE_HEADERS)?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Table(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn records() -> Vec<InvoiceRecord> {
        vec![
            InvoiceRecord {
                supplier_name: "Papeterie Durand".to_string(),
                invoice_reference: "Facture n° FA-2024-0042".to_string(),
                amount_due: "54.00".to_string(),
                creditor_iban: "FR76 3000 6000 0112 3456 7890 189".to_string(),
                creditor_bic: "AGRIFRPP".to_string(),
                payment_date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            },
            InvoiceRecord {
                supplier_name: String::new(),
                invoice_reference: "Réf, \"B\"".to_string(),
                amount_due: "abc".to_string(),
                creditor_iban: String::new(),
                creditor_bic: String::new(),
                payment_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            },
        ]
    }

    #[test]
    fn test_table_rows_pass_through() {
        let rows = table_rows(&records());
        assert_eq!(rows[0][5], "2024-02-05");
        assert_eq!(rows[1][1], "Réf, \"B\"");
        assert_eq!(rows[1][2], "abc");
    }

    #[test]
    fn test_empty_batch_rejected() {
        for format in [TabularFormat::Xlsx, TabularFormat::Csv] {
            assert!(matches!(
                TabularExporter::new(format).export(&[]),
                Err(ExportError::EmptyBatch)
            ));
        }
    }

    #[test]
    fn test_xlsx_round_trip() {
        let artifact = TabularExporter::new(TabularFormat::Xlsx)
            .export(&records())
            .unwrap();
        assert_eq!(artifact.file_name, "reglements_factures.xlsx");

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(artifact.bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();

        let cells: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();

        let mut expected = vec![TABLE_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        expected.extend(table_rows(&records()).into_iter().map(|r| r.to_vec()));

        assert_eq!(cells, expected);
    }

    #[test]
    fn test_csv_export() {
        let artifact = TabularExporter::new(TabularFormat::Csv)
            .with_file_stem("summary")
            .export(&records())
            .unwrap();
        assert_eq!(artifact.file_name, "summary.csv");

        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(
            text,
            "Supplier,Invoice Ref.,Amount,IBAN,BIC,Payment Date\n\
             Papeterie Durand,Facture n° FA-2024-0042,54.00,FR76 3000 6000 0112 3456 7890 189,AGRIFRPP,2024-02-05\n\
             ,\"Réf, \"\"B\"\"\",abc,,,2024-12-31\n"
        );
    }
}

//! SEPA credit-transfer initiation (ISO 20022 pain.001.001.03).

use std::fmt::Display;

use chrono::{Local, NaiveDateTime};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{Artifact, Result};
use crate::error::ExportError;
use crate::invoice::rules::amount::{is_plain_decimal, parse_amount};
use crate::models::config::{ExportConfig, OriginatorConfig, VirementConfig};
use crate::models::record::InvoiceRecord;

/// Default namespace of the root element.
pub const PAIN_001_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";

/// Sum of every amount that parses as a plain non-negative decimal.
///
/// Records with other amounts are skipped here but still become transactions.
pub fn control_sum(records: &[InvoiceRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |sum, record| match parse_amount(&record.amount_due) {
            Some(amount) => match sum.checked_add(amount) {
                Some(total) => total,
                None => {
                    warn!("Amount '{}' overflows the control sum, skipped", record.amount_due);
                    sum
                }
            },
            None if is_plain_decimal(&record.amount_due) => {
                warn!(
                    "Amount '{}' of '{}' is too large to represent, left out of the control sum",
                    record.amount_due, record.invoice_reference
                );
                sum
            }
            None => {
                warn!(
                    "Amount '{}' of '{}' is not a plain decimal, left out of the control sum",
                    record.amount_due, record.invoice_reference
                );
                sum
            }
        })
}

/// Render a control sum with at least one fractional digit (`30.0`, `12.75`).
pub fn format_control_sum(sum: Decimal) -> String {
    let normalized = sum.normalize();
    if normalized.scale() == 0 {
        format!("{}.0", normalized)
    } else {
        normalized.to_string()
    }
}

/// SEPA pain.001 serializer for a single-debtor batch.
pub struct SepaSerializer {
    originator: OriginatorConfig,
    message_id: String,
    payment_info_id: String,
    currency: String,
    file_name: String,
    created_at: Option<NaiveDateTime>,
}

impl SepaSerializer {
    /// Create a serializer with the default identifiers.
    pub fn new(originator: OriginatorConfig) -> Self {
        let export = ExportConfig::default();
        Self {
            originator,
            message_id: export.message_id,
            payment_info_id: export.payment_info_id,
            currency: export.currency,
            file_name: export.xml_file_name,
            created_at: None,
        }
    }

    /// Create a serializer from the full configuration.
    pub fn from_config(config: &VirementConfig) -> Self {
        Self {
            originator: config.originator.clone(),
            message_id: config.export.message_id.clone(),
            payment_info_id: config.export.payment_info_id.clone(),
            currency: config.export.currency.clone(),
            file_name: config.export.xml_file_name.clone(),
            created_at: None,
        }
    }

    /// Pin the creation time instead of reading the clock at export.
    pub fn with_creation_time(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Serialize the batch into an artifact.
    pub fn export(&self, records: &[InvoiceRecord]) -> Result<Artifact> {
        let bytes = self.serialize(records)?;
        Ok(Artifact::new(self.file_name.clone(), bytes))
    }

    /// Serialize the batch into UTF-8 XML bytes.
    pub fn serialize(&self, records: &[InvoiceRecord]) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(ExportError::EmptyBatch);
        }

        let created_at = self
            .created_at
            .unwrap_or_else(|| Local::now().naive_local());
        let sum = control_sum(records);

        let mut xml = PainWriter::new();
        xml.declaration()?;
        xml.open_with_attr("Document", ("xmlns", PAIN_001_NAMESPACE))?;
        xml.open("CstmrCdtTrfInitn")?;

        xml.open("GrpHdr")?;
        xml.leaf("MsgId", &self.message_id)?;
        xml.leaf("CreDtTm", &created_at.format("%Y-%m-%dT%H:%M:%S").to_string())?;
        xml.leaf("NbOfTxs", &records.len().to_string())?;
        xml.leaf("CtrlSum", &format_control_sum(sum))?;
        xml.open("InitgPty")?;
        xml.leaf("Nm", &self.originator.name)?;
        xml.close("InitgPty")?;
        xml.close("GrpHdr")?;

        xml.open("PmtInf")?;
        xml.leaf("PmtInfId", &self.payment_info_id)?;
        xml.leaf("PmtMtd", "TRF")?;
        xml.leaf("BtchBookg", "true")?;
        xml.leaf("ReqdExctnDt", &created_at.format("%Y-%m-%d").to_string())?;

        xml.open("Dbtr")?;
        xml.leaf("Nm", &self.originator.name)?;
        xml.close("Dbtr")?;
        xml.account("DbtrAcct", &self.originator.iban)?;
        xml.agent("DbtrAgt", &self.originator.bic)?;

        for record in records {
            self.write_transaction(&mut xml, record)?;
        }

        xml.close("PmtInf")?;
        xml.close("CstmrCdtTrfInitn")?;
        xml.close("Document")?;

        info!(
            "Serialized SEPA batch: {} transactions, control sum {}",
            records.len(),
            format_control_sum(sum)
        );

        Ok(xml.into_inner())
    }

    fn write_transaction(&self, xml: &mut PainWriter, record: &InvoiceRecord) -> Result<()> {
        xml.open("CdtTrfTxInf")?;

        xml.open("PmtId")?;
        xml.leaf("EndToEndId", &record.invoice_reference)?;
        xml.close("PmtId")?;

        // Amount goes out verbatim, valid or not.
        xml.open("Amt")?;
        xml.leaf_with_attr("InstdAmt", ("Ccy", self.currency.as_str()), &record.amount_due)?;
        xml.close("Amt")?;

        xml.agent("CdtrAgt", &record.creditor_bic)?;

        xml.open("Cdtr")?;
        xml.leaf("Nm", &record.supplier_name)?;
        xml.close("Cdtr")?;
        xml.account("CdtrAcct", &record.creditor_iban)?;

        xml.open("RmtInf")?;
        xml.leaf("Ustrd", &record.invoice_reference)?;
        xml.close("RmtInf")?;

        xml.close("CdtTrfTxInf")
    }
}

/// Indented element writer over an in-memory buffer.
struct PainWriter {
    writer: Writer<Vec<u8>>,
}

fn xml_error(err: impl Display) -> ExportError {
    ExportError::Xml(err.to_string())
}

/// XML 1.0 `Char`: no C0 controls except tab, LF and CR, no U+FFFE / U+FFFF.
fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

fn check_text(element: &str, text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(ExportError::Xml(format!(
            "<{}> contains U+{:04X}, which is not allowed in XML",
            element, c as u32
        ))),
        None => Ok(()),
    }
}

impl PainWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn declaration(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn open_with_attr(&mut self, name: &str, attr: (&str, &str)) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name).with_attributes([attr])))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        check_text(name, text)?;
        self.open(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn leaf_with_attr(&mut self, name: &str, attr: (&str, &str), text: &str) -> Result<()> {
        check_text(name, attr.1)?;
        check_text(name, text)?;
        self.open_with_attr(name, attr)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// `<name><Id><IBAN>..</IBAN></Id></name>`
    fn account(&mut self, name: &str, iban: &str) -> Result<()> {
        self.open(name)?;
        self.open("Id")?;
        self.leaf("IBAN", iban)?;
        self.close("Id")?;
        self.close(name)
    }

    /// `<name><FinInstnId><BIC>..</BIC></FinInstnId></name>`
    fn agent(&mut self, name: &str, bic: &str) -> Result<()> {
        self.open(name)?;
        self.open("FinInstnId")?;
        self.leaf("BIC", bic)?;
        self.close("FinInstnId")?;
        self.close(name)
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn record(reference: &str, amount: &str) -> InvoiceRecord {
        InvoiceRecord {
            supplier_name: format!("Supplier {}", reference),
            invoice_reference: reference.to_string(),
            amount_due: amount.to_string(),
            creditor_iban: "FR7630006000011234567890189".to_string(),
            creditor_bic: "AGRIFRPP".to_string(),
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn serialize(records: &[InvoiceRecord]) -> String {
        let bytes = SepaSerializer::new(OriginatorConfig::default())
            .with_creation_time(created_at())
            .serialize(records)
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_control_sum_exact() {
        let records = vec![record("A", "0.10"), record("B", "0.20"), record("C", "1000000.01")];
        assert_eq!(control_sum(&records), Decimal::from_str("1000000.31").unwrap());
    }

    #[test]
    fn test_control_sum_skips_malformed() {
        let records = vec![record("A", "10.00"), record("B", "abc"), record("C", "20.00")];
        assert_eq!(format_control_sum(control_sum(&records)), "30.0");
    }

    #[test]
    fn test_control_sum_skips_unrepresentable() {
        let huge = "9".repeat(32);
        let records = vec![record("A", &huge), record("B", "1.00")];
        assert_eq!(format_control_sum(control_sum(&records)), "1.0");
        assert!(!records[0].validate().is_empty());
    }

    #[test]
    fn test_format_control_sum() {
        assert_eq!(format_control_sum(Decimal::ZERO), "0.0");
        assert_eq!(format_control_sum(Decimal::from_str("30.00").unwrap()), "30.0");
        assert_eq!(format_control_sum(Decimal::from_str("12.750").unwrap()), "12.75");
        assert_eq!(format_control_sum(Decimal::from_str("0.5").unwrap()), "0.5");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let serializer = SepaSerializer::new(OriginatorConfig::default());
        assert!(matches!(serializer.serialize(&[]), Err(ExportError::EmptyBatch)));
    }

    #[test]
    fn test_full_document() {
        let xml = serialize(&[record("FA-1", "54.00")]);

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.03">
  <CstmrCdtTrfInitn>
    <GrpHdr>
      <MsgId>BATCH_PAYMENT</MsgId>
      <CreDtTm>2024-03-01T09:30:05</CreDtTm>
      <NbOfTxs>1</NbOfTxs>
      <CtrlSum>54.0</CtrlSum>
      <InitgPty>
        <Nm>Nom_Emetteur</Nm>
      </InitgPty>
    </GrpHdr>
    <PmtInf>
      <PmtInfId>BATCH_001</PmtInfId>
      <PmtMtd>TRF</PmtMtd>
      <BtchBookg>true</BtchBookg>
      <ReqdExctnDt>2024-03-01</ReqdExctnDt>
      <Dbtr>
        <Nm>Nom_Emetteur</Nm>
      </Dbtr>
      <DbtrAcct>
        <Id>
          <IBAN>FR7630004006950002160341716</IBAN>
        </Id>
      </DbtrAcct>
      <DbtrAgt>
        <FinInstnId>
          <BIC>BNPAFRPPXXX</BIC>
        </FinInstnId>
      </DbtrAgt>
      <CdtTrfTxInf>
        <PmtId>
          <EndToEndId>FA-1</EndToEndId>
        </PmtId>
        <Amt>
          <InstdAmt Ccy="EUR">54.00</InstdAmt>
        </Amt>
        <CdtrAgt>
          <FinInstnId>
            <BIC>AGRIFRPP</BIC>
          </FinInstnId>
        </CdtrAgt>
        <Cdtr>
          <Nm>Supplier FA-1</Nm>
        </Cdtr>
        <CdtrAcct>
          <Id>
            <IBAN>FR7630006000011234567890189</IBAN>
          </Id>
        </CdtrAcct>
        <RmtInf>
          <Ustrd>FA-1</Ustrd>
        </RmtInf>
      </CdtTrfTxInf>
    </PmtInf>
  </CstmrCdtTrfInitn>
</Document>"#;

        assert_eq!(xml, expected);
    }

    #[test]
    fn test_malformed_amount_still_emitted() {
        let xml = serialize(&[record("A", "10.00"), record("B", "abc"), record("C", "20.00")]);

        assert!(xml.contains("<NbOfTxs>3</NbOfTxs>"));
        assert!(xml.contains("<CtrlSum>30.0</CtrlSum>"));
        assert_eq!(xml.matches("<CdtTrfTxInf>").count(), 3);

        let amounts: Vec<&str> = xml
            .match_indices("<InstdAmt Ccy=\"EUR\">")
            .map(|(idx, tag)| {
                let rest = &xml[idx + tag.len()..];
                &rest[..rest.find('<').unwrap()]
            })
            .collect();
        assert_eq!(amounts, vec!["10.00", "abc", "20.00"]);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut rec = record("R&D <1>", "5");
        rec.supplier_name = "Dupont & Fils".to_string();
        let xml = serialize(&[rec]);

        assert!(xml.contains("<EndToEndId>R&amp;D &lt;1&gt;</EndToEndId>"));
        assert!(xml.contains("<Nm>Dupont &amp; Fils</Nm>"));
        assert!(xml.contains("<CtrlSum>5.0</CtrlSum>"));
    }

    #[test]
    fn test_control_characters_rejected() {
        let mut bad = record("1", "10.00");
        bad.supplier_name = "A\u{1}B\u{c}".to_string();

        let result = SepaSerializer::new(OriginatorConfig::default())
            .with_creation_time(created_at())
            .export(&[record("0", "5.00"), bad]);
        match result {
            Err(ExportError::Xml(msg)) => assert!(msg.contains("<Nm>"), "{}", msg),
            other => panic!("expected an XML error, got {:?}", other.map(|a| a.file_name)),
        }
    }

    #[test]
    fn test_tab_and_newline_allowed() {
        let mut record = record("1", "10.00");
        record.supplier_name = "Durand\tFils\nSARL".to_string();
        assert!(serialize(&[record]).contains("Durand\tFils\nSARL"));
    }

    #[test]
    fn test_empty_fields_keep_elements() {
        let mut rec = record("", "");
        rec.supplier_name.clear();
        rec.creditor_bic.clear();
        let xml = serialize(&[rec]);

        assert!(xml.contains("<EndToEndId></EndToEndId>"));
        assert!(xml.contains("<InstdAmt Ccy=\"EUR\"></InstdAmt>"));
        assert!(xml.contains("<BIC></BIC>"));
        assert!(xml.contains("<CtrlSum>0.0</CtrlSum>"));
    }

    #[test]
    fn test_config_overrides_identifiers() {
        let mut config = VirementConfig::default();
        config.originator.name = "ACME SARL".to_string();
        config.export.message_id = "MSG-42".to_string();
        config.export.currency = "CHF".to_string();

        let artifact = SepaSerializer::from_config(&config)
            .with_creation_time(created_at())
            .export(&[record("A", "1.00")])
            .unwrap();
        let xml = String::from_utf8(artifact.bytes).unwrap();

        assert_eq!(artifact.file_name, "virements_batch.xml");
        assert!(xml.contains("<MsgId>MSG-42</MsgId>"));
        assert!(xml.contains("<InstdAmt Ccy=\"CHF\">1.00</InstdAmt>"));
        assert_eq!(xml.matches("<Nm>ACME SARL</Nm>").count(), 2);
    }
}

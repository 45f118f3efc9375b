//! Dispense row and record models
//!
//! [`SourceRow`] is the typed view of one row as read from the store.
//! [`NormalizedRecord`] is what the downstream endpoint receives, and
//! [`BatchKey`] addresses a row for status reconciliation.

use serde::{Deserialize, Serialize};

macro_rules! source_row {
    ($($column:ident),* $(,)?) => {
        /// One dispense row as read from the source table
        ///
        /// Every column is carried as optional text. Column read failures are
        /// collected in `decode_errors` so that a single bad row never aborts
        /// the stream it came from.
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct SourceRow {
            $(pub $column: Option<String>,)*
            /// Columns that could not be read, as `column: message`
            pub decode_errors: Vec<String>,
        }

        impl SourceRow {
            /// Column names read from the source table, in select order
            pub const COLUMNS: &'static [&'static str] = &[$(stringify!($column)),*];

            /// Populates a row by asking `lookup` for each column once
            pub fn from_lookup<F>(mut lookup: F) -> Self
            where
                F: FnMut(&str) -> Result<Option<String>, String>,
            {
                let mut row = SourceRow::default();
                $(
                    match lookup(stringify!($column)) {
                        Ok(value) => row.$column = value,
                        Err(e) => row
                            .decode_errors
                            .push(format!("{}: {}", stringify!($column), e)),
                    }
                )*
                row
            }
        }
    };
}

source_row!(
    rx_no,
    seq_no,
    rx_date,
    rx_time,
    modified_at,
    order_no,
    visit_no,
    chart_no,
    patient_id,
    patient_name,
    patient_sex,
    birth_date,
    patient_age,
    patient_weight,
    patient_height,
    allergy_note,
    bed_info,
    ward_name,
    dept_code,
    dept_name,
    nurse_station,
    doctor_info,
    order_date,
    order_time,
    start_date,
    start_time,
    end_date,
    end_time,
    dispense_date,
    dispense_time,
    drug_code,
    drug_name,
    generic_name,
    drug_spec,
    dosage_info,
    frequency_code,
    frequency_desc,
    days,
    total_qty,
    qty_unit,
    dispense_qty,
    urgency_code,
    high_alert,
    grind_flag,
    order_status,
    order_type,
    pharmacist_info,
    checker_code,
    cabinet_no,
    package_type,
    drug_barcode,
    insurance_code,
    unit_price,
    remark,
    doctor_remark,
    pharmacist_remark,
);

/// Key addressing one dispense line in the store
///
/// A prescription may span several lines, so the key carries the line
/// number next to the prescription number. Used only for reconciliation;
/// never part of the outbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    /// Prescription number
    pub rx_no: String,
    /// Line number as stored, absent when the column is null or blank
    pub seq_no: Option<String>,
    /// Stored record date
    pub rx_date: String,
}

impl BatchKey {
    /// Creates a new key
    ///
    /// `seq_no` is trimmed; a blank value is treated as absent.
    pub fn new(
        rx_no: impl Into<String>,
        seq_no: Option<&str>,
        rx_date: impl Into<String>,
    ) -> Self {
        Self {
            rx_no: rx_no.into(),
            seq_no: seq_no
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            rx_date: rx_date.into(),
        }
    }
}

/// One dispense line in the shape the downstream endpoint expects
///
/// Text fields are either trimmed and non-empty or absent. Absent fields are
/// left out of the serialized JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    // Identifiers
    pub rx_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<i64>,
    pub rx_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_no: Option<String>,

    // Patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub patient_sex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergy_note: Option<String>,

    // Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse_station: Option<String>,

    // Prescriber
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_license: Option<String>,

    // Order timeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_datetime: Option<String>,

    // Drug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_spec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_code: Option<String>,

    // Flags
    pub prn_flag: String,
    pub stat_flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_alert_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grind_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,

    // Pharmacy handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacist_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checker_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,

    // Free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacist_remark: Option<String>,
}

impl NormalizedRecord {
    /// Every text value carried by the record, present or not
    ///
    /// Used to check the no-blank-text invariant.
    pub fn text_fields(&self) -> Vec<Option<&str>> {
        let required = [
            Some(self.rx_no.as_str()),
            Some(self.rx_date.as_str()),
            Some(self.patient_sex.as_str()),
            Some(self.prn_flag.as_str()),
            Some(self.stat_flag.as_str()),
        ];
        let optional = [
            &self.rx_datetime,
            &self.modified_at,
            &self.order_no,
            &self.visit_no,
            &self.chart_no,
            &self.patient_id,
            &self.patient_name,
            &self.patient_birth_date,
            &self.allergy_note,
            &self.ward_code,
            &self.ward_name,
            &self.room_no,
            &self.bed_no,
            &self.dept_code,
            &self.dept_name,
            &self.nurse_station,
            &self.doctor_code,
            &self.doctor_name,
            &self.doctor_license,
            &self.order_datetime,
            &self.start_datetime,
            &self.end_datetime,
            &self.dispense_datetime,
            &self.drug_code,
            &self.drug_name,
            &self.drug_generic_name,
            &self.drug_spec,
            &self.drug_barcode,
            &self.dose_unit,
            &self.route_code,
            &self.frequency_code,
            &self.frequency_desc,
            &self.qty_unit,
            &self.insurance_code,
            &self.high_alert_flag,
            &self.grind_flag,
            &self.order_status,
            &self.order_type,
            &self.pharmacist_code,
            &self.pharmacist_name,
            &self.checker_code,
            &self.cabinet_no,
            &self.package_type,
            &self.remark,
            &self.doctor_remark,
            &self.pharmacist_remark,
        ];

        required
            .into_iter()
            .chain(optional.into_iter().map(|v| v.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_columns_cover_every_field() {
        assert_eq!(SourceRow::COLUMNS.len(), 56);
        assert_eq!(SourceRow::COLUMNS[0], "rx_no");
        assert!(SourceRow::COLUMNS.contains(&"pharmacist_remark"));
    }

    #[test]
    fn test_from_lookup_collects_decode_errors() {
        let mut values = HashMap::new();
        values.insert("rx_no", "RX001");
        values.insert("rx_date", "2025-03-01");

        let row = SourceRow::from_lookup(|column| match column {
            "days" => Err("invalid type".to_string()),
            other => Ok(values.get(other).map(|v| v.to_string())),
        });

        assert_eq!(row.rx_no.as_deref(), Some("RX001"));
        assert_eq!(row.rx_date.as_deref(), Some("2025-03-01"));
        assert!(row.drug_code.is_none());
        assert_eq!(row.decode_errors, vec!["days: invalid type".to_string()]);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let record = NormalizedRecord {
            rx_no: "RX001".to_string(),
            rx_date: "2025-03-01".to_string(),
            patient_sex: "U".to_string(),
            prn_flag: "0".to_string(),
            stat_flag: "0".to_string(),
            dose: Some(2.5),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["rx_no"], "RX001");
        assert_eq!(object["dose"], 2.5);
        assert!(!object.contains_key("drug_name"));
        assert!(!object.contains_key("seq_no"));
    }

    #[test]
    fn test_line_key_trims_seq_no() {
        let key = BatchKey::new("RX9", Some(" 02 "), "2025-03-01 10:00");
        assert_eq!(key.seq_no.as_deref(), Some("02"));

        assert_eq!(BatchKey::new("RX9", Some("  "), "2025-03-01").seq_no, None);
        assert_ne!(
            BatchKey::new("RX9", Some("1"), "2025-03-01"),
            BatchKey::new("RX9", Some("2"), "2025-03-01")
        );
    }
}

//! Field mapping from source rows to normalized records
//!
//! The mapper is a pure transform: it reads one [`SourceRow`] and either
//! produces a [`NormalizedRecord`] or a [`MappingError`] describing why the
//! row must be skipped. It never touches the store or the network.
//!
//! # Example
//!
//! ```rust
//! use rxsync::core::mapping::FieldMapper;
//! use rxsync::domain::SourceRow;
//!
//! let mapper = FieldMapper::new("%Y-%m-%d");
//! let row = SourceRow {
//!     rx_no: Some(" RX001 ".to_string()),
//!     rx_date: Some("2025-03-01".to_string()),
//!     bed_info: Some("W5^512^B".to_string()),
//!     ..Default::default()
//! };
//!
//! let record = mapper.map(&row).unwrap();
//! assert_eq!(record.rx_no, "RX001");
//! assert_eq!(record.bed_no.as_deref(), Some("B"));
//! assert_eq!(record.patient_sex, "U");
//! ```

pub mod fields;

use crate::domain::{BatchKey, MappingError, NormalizedRecord, SourceRow};
use chrono::NaiveDate;
use fields::{carrier, date_time, decimal, integer, sex, text, urgency};

/// Maps source rows to normalized records
#[derive(Debug, Clone)]
pub struct FieldMapper {
    date_format: String,
}

impl FieldMapper {
    /// Creates a mapper that validates record dates against `date_format`
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Maps one row
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the row has column decode errors, lacks
    /// its prescription number or record date, or its record date does not
    /// begin with a calendar date in the configured format.
    pub fn map(&self, row: &SourceRow) -> Result<NormalizedRecord, MappingError> {
        let rx_no = text(row.rx_no.as_deref());
        let rx_date = text(row.rx_date.as_deref());

        if !row.decode_errors.is_empty() {
            let key = match (&rx_no, &rx_date) {
                (Some(rx_no), Some(rx_date)) => {
                    Some(BatchKey::new(rx_no, row.seq_no.as_deref(), rx_date))
                }
                _ => None,
            };
            return Err(MappingError::ColumnDecode {
                detail: row.decode_errors.clone(),
                key,
            });
        }

        let rx_no = rx_no.ok_or_else(|| MappingError::MissingIdentifier {
            record_date: rx_date.clone(),
        })?;
        let rx_date = rx_date.ok_or_else(|| MappingError::MissingRecordDate {
            rx_no: rx_no.clone(),
        })?;

        if NaiveDate::parse_and_remainder(&rx_date, &self.date_format).is_err() {
            return Err(MappingError::InvalidRecordDate {
                rx_no,
                seq_no: text(row.seq_no.as_deref()),
                value: rx_date,
            });
        }

        let [ward_code, room_no, bed_no] = carrier::<3>(row.bed_info.as_deref());
        let [doctor_code, doctor_name, doctor_license] = carrier::<3>(row.doctor_info.as_deref());
        let [dose, dose_unit, route_code] = carrier::<3>(row.dosage_info.as_deref());
        let [pharmacist_code, pharmacist_name] = carrier::<2>(row.pharmacist_info.as_deref());
        let (prn_flag, stat_flag) = urgency(row.urgency_code.as_deref());

        Ok(NormalizedRecord {
            rx_datetime: date_time(Some(rx_date.as_str()), row.rx_time.as_deref()),
            rx_no,
            seq_no: integer(row.seq_no.as_deref()),
            rx_date,
            modified_at: text(row.modified_at.as_deref()),
            order_no: text(row.order_no.as_deref()),
            visit_no: text(row.visit_no.as_deref()),
            chart_no: text(row.chart_no.as_deref()),

            patient_id: text(row.patient_id.as_deref()),
            patient_name: text(row.patient_name.as_deref()),
            patient_sex: sex(row.patient_sex.as_deref()),
            patient_birth_date: text(row.birth_date.as_deref()),
            patient_age: integer(row.patient_age.as_deref()),
            patient_weight: decimal(row.patient_weight.as_deref()),
            patient_height: decimal(row.patient_height.as_deref()),
            allergy_note: text(row.allergy_note.as_deref()),

            ward_code,
            ward_name: text(row.ward_name.as_deref()),
            room_no,
            bed_no,
            dept_code: text(row.dept_code.as_deref()),
            dept_name: text(row.dept_name.as_deref()),
            nurse_station: text(row.nurse_station.as_deref()),

            doctor_code,
            doctor_name,
            doctor_license,

            order_datetime: date_time(row.order_date.as_deref(), row.order_time.as_deref()),
            start_datetime: date_time(row.start_date.as_deref(), row.start_time.as_deref()),
            end_datetime: date_time(row.end_date.as_deref(), row.end_time.as_deref()),
            dispense_datetime: date_time(
                row.dispense_date.as_deref(),
                row.dispense_time.as_deref(),
            ),

            drug_code: text(row.drug_code.as_deref()),
            drug_name: text(row.drug_name.as_deref()),
            drug_generic_name: text(row.generic_name.as_deref()),
            drug_spec: text(row.drug_spec.as_deref()),
            drug_barcode: text(row.drug_barcode.as_deref()),
            dose: decimal(dose.as_deref()),
            dose_unit,
            route_code,
            frequency_code: text(row.frequency_code.as_deref()),
            frequency_desc: text(row.frequency_desc.as_deref()),
            days: integer(row.days.as_deref()),
            total_qty: decimal(row.total_qty.as_deref()),
            qty_unit: text(row.qty_unit.as_deref()),
            dispense_qty: decimal(row.dispense_qty.as_deref()),
            unit_price: decimal(row.unit_price.as_deref()),
            insurance_code: text(row.insurance_code.as_deref()),

            prn_flag,
            stat_flag,
            high_alert_flag: text(row.high_alert.as_deref()),
            grind_flag: text(row.grind_flag.as_deref()),
            order_status: text(row.order_status.as_deref()),
            order_type: text(row.order_type.as_deref()),

            pharmacist_code,
            pharmacist_name,
            checker_code: text(row.checker_code.as_deref()),
            cabinet_no: text(row.cabinet_no.as_deref()),
            package_type: text(row.package_type.as_deref()),

            remark: text(row.remark.as_deref()),
            doctor_remark: text(row.doctor_remark.as_deref()),
            pharmacist_remark: text(row.pharmacist_remark.as_deref()),
        })
    }
}

//! Header layout descriptions.
//!
//! A [`HeaderFormat`] names every recognized field of a fixed-length
//! header record: its byte offset, width and signedness.  The standard
//! layouts for the 400-byte binary reel header and the 240-byte trace
//! header (Revision 0 and Revision 1) ship as built-ins; survey-specific
//! layouts that hide values in unassigned bytes can be loaded from a JSON
//! description instead.
//!
//! Offsets are zero-based from the start of the record.  Printed SEG Y
//! documentation numbers bytes from 1, so its "bytes 115-116" is offset
//! 114 here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::codec::FieldKind;
use crate::error::{Result, SegYError};

pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_HEADER_LEN: usize = 240;

/// One named field inside a header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub offset: usize,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Offset one past the field's last byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.kind.size()
    }
}

// Serde-facing shape of a format description.  Construction always goes
// through `HeaderFormat::new` so the name index and validation cannot be
// skipped.
#[derive(Serialize, Deserialize)]
struct FormatDoc {
    name: String,
    record_len: usize,
    fields: Vec<FieldDescriptor>,
}

/// A validated header layout: non-overlapping named fields inside a
/// record of fixed length.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFormat {
    name: String,
    record_len: usize,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl HeaderFormat {
    /// Validate a layout: every field inside the record, no duplicate
    /// names, no overlapping byte ranges.
    pub fn new(name: &str, record_len: usize, fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if field.end() > record_len {
                return Err(SegYError::InvalidHeaderFormat {
                    format: name.to_string(),
                    field: field.name.clone(),
                    reason: "field extends past the end of the record",
                });
            }
            if index.insert(field.name.clone(), i).is_some() {
                return Err(SegYError::InvalidHeaderFormat {
                    format: name.to_string(),
                    field: field.name.clone(),
                    reason: "duplicate field name",
                });
            }
        }

        let mut spans: Vec<(usize, usize, &str)> = fields
            .iter()
            .map(|f| (f.offset, f.end(), f.name.as_str()))
            .collect();
        spans.sort_unstable();
        for pair in spans.windows(2) {
            if pair[1].0 < pair[0].1 {
                return Err(SegYError::InvalidHeaderFormat {
                    format: name.to_string(),
                    field: pair[1].2.to_string(),
                    reason: "field overlaps an earlier field",
                });
            }
        }

        Ok(HeaderFormat {
            name: name.to_string(),
            record_len,
            fields,
            index,
        })
    }

    /// Parse a JSON format description, validating it like [`Self::new`].
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: FormatDoc = serde_json::from_str(text)?;
        HeaderFormat::new(&doc.name, doc.record_len, doc.fields)
    }

    /// Serialize back to the JSON description shape.
    pub fn to_json(&self) -> Result<String> {
        let doc = FormatDoc {
            name: self.name.clone(),
            record_len: self.record_len,
            fields: self.fields.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn record_len(&self) -> usize {
        self.record_len
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Position of a field in declaration order, used to key value arrays.
    pub(crate) fn field_position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The standard 400-byte binary reel header layout.
    pub fn binary_reel() -> Self {
        builtin("binary-reel", BINARY_HEADER_LEN, BINARY_REEL_FIELDS)
    }

    /// The Revision 0 trace header layout (bytes 180-239 undefined).
    pub fn trace_rev0() -> Self {
        builtin("trace-rev0", TRACE_HEADER_LEN, TRACE_REV0_FIELDS)
    }

    /// The Revision 1 trace header layout.
    pub fn trace_rev1() -> Self {
        let table: Vec<(&str, usize, FieldKind)> = TRACE_REV0_FIELDS
            .iter()
            .chain(TRACE_REV1_EXTRAS)
            .copied()
            .collect();
        builtin("trace-rev1", TRACE_HEADER_LEN, &table)
    }
}

// The built-in tables are static and checked by tests, so construction
// does not go through the fallible validator.
fn builtin(name: &str, record_len: usize, table: &[(&str, usize, FieldKind)]) -> HeaderFormat {
    let fields: Vec<FieldDescriptor> = table
        .iter()
        .map(|&(name, offset, kind)| FieldDescriptor {
            name: name.to_string(),
            offset,
            kind,
        })
        .collect();
    let index = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.clone(), i))
        .collect();
    HeaderFormat {
        name: name.to_string(),
        record_len,
        fields,
        index,
    }
}

use FieldKind::{Int16, Int32, UInt16};

const BINARY_REEL_FIELDS: &[(&str, usize, FieldKind)] = &[
    ("job_id_num", 0, Int32),
    ("line_num", 4, Int32),
    ("reel_num", 8, Int32),
    ("data_traces_per_ensemble", 12, Int16),
    ("auxiliary_traces_per_ensemble", 14, Int16),
    ("sample_interval", 16, UInt16),
    ("original_field_sample_interval", 18, UInt16),
    ("num_samples", 20, UInt16),
    ("original_field_num_samples", 22, UInt16),
    ("data_sample_format", 24, Int16),
    ("ensemble_fold", 26, Int16),
    ("trace_sorting", 28, Int16),
    ("vertical_sum_code", 30, Int16),
    ("sweep_frequency_at_start", 32, Int16),
    ("sweep_frequency_at_end", 34, Int16),
    ("sweep_length", 36, Int16),
    ("sweep_type", 38, Int16),
    ("sweep_trace_number", 40, Int16),
    ("sweep_trace_taper_length_at_start", 42, Int16),
    ("sweep_trace_taper_length_at_end", 44, Int16),
    ("taper_type", 46, Int16),
    ("correlated_data_traces", 48, Int16),
    ("binary_gain_recovered", 50, Int16),
    ("amplitude_recovery_method", 52, Int16),
    ("measurement_system", 54, Int16),
    ("impulse_signal_polarity", 56, Int16),
    ("vibratory_polarity_code", 58, Int16),
    ("format_revision_num", 300, UInt16),
    ("fixed_length_trace_flag", 302, UInt16),
    ("num_extended_textual_headers", 304, Int16),
];

const TRACE_REV0_FIELDS: &[(&str, usize, FieldKind)] = &[
    ("line_sequence_num", 0, Int32),
    ("file_sequence_num", 4, Int32),
    ("field_record_num", 8, Int32),
    ("trace_num", 12, Int32),
    ("energy_source_point_num", 16, Int32),
    ("ensemble_num", 20, Int32),
    ("ensemble_trace_num", 24, Int32),
    ("trace_identification_code", 28, Int16),
    ("num_vertically_summed_traces", 30, Int16),
    ("num_horizontally_stacked_traces", 32, Int16),
    ("data_use", 34, Int16),
    ("source_receiver_offset", 36, Int32),
    ("receiver_group_elevation", 40, Int32),
    ("surface_elevation_at_source", 44, Int32),
    ("source_depth_below_surface", 48, Int32),
    ("datum_elevation_at_receiver_group", 52, Int32),
    ("datum_elevation_at_source", 56, Int32),
    ("water_depth_at_source", 60, Int32),
    ("water_depth_at_group", 64, Int32),
    ("elevation_scalar", 68, Int16),
    ("xy_scalar", 70, Int16),
    ("source_x", 72, Int32),
    ("source_y", 76, Int32),
    ("group_x", 80, Int32),
    ("group_y", 84, Int32),
    ("coordinate_units", 88, Int16),
    ("weathering_velocity", 90, Int16),
    ("subweathering_velocity", 92, Int16),
    ("uphole_time_at_source", 94, Int16),
    ("uphole_time_at_group", 96, Int16),
    ("source_static_correction", 98, Int16),
    ("group_static_correction", 100, Int16),
    ("total_static_applied", 102, Int16),
    ("lag_time_a", 104, Int16),
    ("lag_time_b", 106, Int16),
    ("delay_recording_time", 108, Int16),
    ("mute_time_start", 110, Int16),
    ("mute_time_end", 112, Int16),
    ("num_samples", 114, UInt16),
    ("sample_interval", 116, UInt16),
    ("gain_type", 118, Int16),
    ("instrument_gain_constant", 120, Int16),
    ("instrument_initial_gain", 122, Int16),
    ("correlated", 124, Int16),
    ("sweep_frequency_at_start", 126, Int16),
    ("sweep_frequency_at_end", 128, Int16),
    ("sweep_length", 130, Int16),
    ("sweep_type", 132, Int16),
    ("sweep_trace_taper_length_at_start", 134, Int16),
    ("sweep_trace_taper_length_at_end", 136, Int16),
    ("taper_type", 138, Int16),
    ("alias_filter_frequency", 140, Int16),
    ("alias_filter_slope", 142, Int16),
    ("notch_filter_frequency", 144, Int16),
    ("notch_filter_slope", 146, Int16),
    ("low_cut_frequency", 148, Int16),
    ("high_cut_frequency", 150, Int16),
    ("low_cut_slope", 152, Int16),
    ("high_cut_slope", 154, Int16),
    ("year_recorded", 156, Int16),
    ("day_of_year", 158, Int16),
    ("hour_of_day", 160, Int16),
    ("minute_of_hour", 162, Int16),
    ("second_of_minute", 164, Int16),
    ("time_basis_code", 166, Int16),
    ("trace_weighting_factor", 168, Int16),
    ("geophone_group_num_roll1", 170, Int16),
    ("geophone_group_num_first_trace", 172, Int16),
    ("geophone_group_num_last_trace", 174, Int16),
    ("gap_size", 176, Int16),
    ("over_travel", 178, Int16),
];

const TRACE_REV1_EXTRAS: &[(&str, usize, FieldKind)] = &[
    ("cdp_x", 180, Int32),
    ("cdp_y", 184, Int32),
    ("inline_num", 188, Int32),
    ("crossline_num", 192, Int32),
    ("shotpoint", 196, Int32),
    ("shotpoint_scalar", 200, Int16),
    ("trace_value_measurement_unit", 202, Int16),
    ("transduction_constant_mantissa", 204, Int32),
    ("transduction_constant_power", 208, Int16),
    ("transduction_units", 210, Int16),
    ("device_trace_identifier", 212, Int16),
    ("time_scalar", 214, Int16),
    ("source_type", 216, Int16),
    ("source_energy_direction_mantissa", 218, Int32),
    ("source_energy_direction_exponent", 222, Int16),
    ("source_measurement_mantissa", 224, Int32),
    ("source_measurement_exponent", 228, Int16),
    ("source_measurement_unit", 230, Int16),
    ("unassigned_int1", 232, Int32),
    ("unassigned_int2", 236, Int32),
];

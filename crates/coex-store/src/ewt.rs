//! Text format for edge-weight tables.
//!
//! ```text
//! # freespace point
//! 1, 2, 0.3521
//! 1, 7, 0.0412
//! ```
//!
//! The header names the model and the coordination mode; an older header
//! with only the model name reads as point coordination. Every other line
//! holds one unordered pair and its weight.

use std::fmt::Write as _;
use std::path::Path;

use coex_ir::{Coordination, DeviceId, EdgeKey, EdgeWeightTable};

use crate::error::{StoreError, StoreResult};

/// Render a table in the `.ewt` text format.
pub fn encode_table(table: &EdgeWeightTable) -> String {
    let mut out = format!("# {} {}\n", table.model(), table.coordination());
    for (key, weight) in table.iter() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}, {}, {}", key.first(), key.second(), weight);
    }
    out
}

/// Parse a table from the `.ewt` text format. `path` is only used in errors.
pub fn decode_table(content: &str, path: &Path) -> StoreResult<EdgeWeightTable> {
    let format_error = |line: usize, reason: String| StoreError::Format {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = content.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, l)) if l.trim().is_empty() => continue,
            Some((n, l)) => break (n + 1, l.trim()),
            None => return Err(format_error(1, "missing '# <model>' header".to_string())),
        }
    };

    let (header_line, header_text) = header;
    let Some(rest) = header_text.strip_prefix('#') else {
        return Err(format_error(
            header_line,
            format!("expected '# <model>' header, found '{header_text}'"),
        ));
    };
    let mut words = rest.split_whitespace();
    let model = words
        .next()
        .ok_or_else(|| format_error(header_line, "header has no model name".to_string()))?;
    let coordination = match words.next() {
        Some(word) => word
            .parse::<Coordination>()
            .map_err(|e| format_error(header_line, e))?,
        None => Coordination::Point,
    };

    let mut table = EdgeWeightTable::new(model, coordination);
    for (n, line) in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [a, b, w] = fields.as_slice() else {
            return Err(format_error(
                n + 1,
                format!("expected 'id1, id2, weight', found '{line}'"),
            ));
        };
        let weight: f64 = w
            .parse()
            .map_err(|_| format_error(n + 1, format!("invalid weight '{w}'")))?;
        let key = EdgeKey::new(DeviceId::from(*a), DeviceId::from(*b))
            .map_err(|e| format_error(n + 1, e.to_string()))?;
        table
            .insert(key, weight)
            .map_err(|e| format_error(n + 1, e.to_string()))?;
    }

    Ok(table)
}

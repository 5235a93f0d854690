//! Wire shapes for the two campaign sources and the positional record they
//! both reduce to.

use serde::Deserialize;
use serde_json::Value;

/// Envelope of a Google Visualization (`gviz`) query response.
#[derive(Debug, Deserialize)]
pub(crate) struct GvizResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<GvizError>,
    #[serde(default)]
    pub table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GvizError {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detailed_message: Option<String>,
}

impl GvizError {
    pub(crate) fn describe(&self) -> String {
        self.detailed_message
            .as_deref()
            .or(self.message.as_deref())
            .or(self.reason.as_deref())
            .unwrap_or("unknown error")
            .to_owned()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GvizTable {
    #[serde(default)]
    pub rows: Vec<SheetRow>,
}

/// One spreadsheet row: positional cells, any of which may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    #[serde(default)]
    pub c: Vec<Option<SheetCell>>,
}

/// A gviz cell: raw value `v` plus the optional formatted string `f`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetCell {
    #[serde(default)]
    pub v: Option<Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl SheetRow {
    /// Builds a row from plain strings, one cell per entry.
    #[must_use]
    pub fn from_texts(cells: &[&str]) -> Self {
        Self {
            c: cells
                .iter()
                .map(|text| {
                    Some(SheetCell {
                        v: Some(Value::String((*text).to_owned())),
                        f: None,
                    })
                })
                .collect(),
        }
    }

    fn cell(&self, idx: usize) -> Option<&SheetCell> {
        self.c.get(idx).and_then(Option::as_ref)
    }

    /// Text of a cell: the raw value when it is truthy, otherwise the
    /// formatted value.
    #[must_use]
    pub fn cell_text(&self, idx: usize) -> Option<String> {
        let cell = self.cell(idx)?;
        cell.v
            .as_ref()
            .and_then(truthy_text)
            .or_else(|| cell.f.clone().filter(|f| !f.is_empty()))
    }

    /// Raw value of a cell when present, otherwise the formatted value.
    #[must_use]
    pub fn cell_raw(&self, idx: usize) -> Option<String> {
        let cell = self.cell(idx)?;
        match cell.v.as_ref() {
            Some(v) if !v.is_null() => Some(value_text(v)),
            _ => cell.f.clone(),
        }
    }

    /// Reduces the row to the positional campaign record:
    /// post URL, comment count, winners, recent commenters.
    #[must_use]
    pub fn to_record(&self) -> CampaignRecord {
        CampaignRecord {
            post_url: self.cell_text(0),
            comments_count: self.cell_raw(1),
            winners: self.cell_text(2).unwrap_or_default(),
            recent: self.cell_text(3).unwrap_or_default(),
        }
    }
}

fn truthy_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(value_text(v)),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

/// Renders a JSON scalar the way a spreadsheet user would read it.
/// Integral floats drop their fractional part (`1234.0` → `"1234"`).
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                i.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                match n.as_f64() {
                    #[allow(clippy::cast_possible_truncation)]
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
                    _ => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

/// Source-agnostic campaign row: the four positional cells as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignRecord {
    pub post_url: Option<String>,
    pub comments_count: Option<String>,
    pub winners: String,
    pub recent: String,
}

/// Campaign object as stored in the fallback JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCampaign {
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub accounts: Vec<LegacyAccount>,
    /// Free text, or an array of lines.
    #[serde(default)]
    pub recent: Option<Value>,
    #[serde(default)]
    pub stats: Option<LegacyStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAccount {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStats {
    #[serde(default)]
    pub total_comments: Option<u64>,
}

impl LegacyCampaign {
    /// The `recent` field flattened to newline-separated text.
    #[must_use]
    pub fn recent_text(&self) -> String {
        match self.recent.as_ref() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(value_text)
                .collect::<Vec<_>>()
                .join("\n"),
            Some(other) => value_text(other),
        }
    }
}

//! Campaign feed ingestion.
//!
//! Turns the operator-maintained campaign table (a Google Sheet, or the static
//! fallback JSON file) into validated [`igdraw_core::Campaign`] values.

pub mod error;
pub mod fallback;
pub mod ingest;
pub mod parse;
pub mod sheet;
pub mod types;

mod retry;

pub use error::FeedError;
pub use fallback::load_fallback_campaigns;
pub use ingest::{
    convert_legacy, ingest_record, ingest_records, ingest_sheet_rows, RowOutcome, SkipReason,
};
pub use parse::{parse_number, parse_recent_entries, parse_winners};
pub use sheet::{CampaignFeed, SheetClient};
pub use types::{CampaignRecord, LegacyAccount, LegacyCampaign, SheetCell, SheetRow};

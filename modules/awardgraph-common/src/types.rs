use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Fixed page size for award search. No cursor; callers wanting more
/// must narrow their filters.
pub const SEARCH_RESULT_CAP: i64 = 100;

/// Filter set encoded into the FPDS Atom feed URL. All fields optional;
/// absent fields contribute nothing to the encoded query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SearchCriteria {
    /// Inclusive (start, end) range on the feed's last-modified date.
    #[builder(default, setter(strip_option))]
    pub last_mod_date: Option<(NaiveDate, NaiveDate)>,
    #[builder(default, setter(strip_option, into))]
    pub agency_code: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub agency_name: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub award_status: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub contract_type: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub piid: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub vendor_uei: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub cage_code: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub naics_code: Option<String>,
}

/// One contract award parsed from a feed entry's FPDS payload.
/// Immutable once constructed; the PIID is the natural key in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAward {
    pub piid: String,
    pub agency_code: String,
    /// Agency display name. Empty when the feed omits the name attribute.
    pub agency_name: String,
    pub award_status: String,
    pub date_signed: DateTime<Utc>,
    pub obligated_amount: f64,
    pub vendor_uei: String,
    pub cage_code: Option<String>,
    pub naics_code: Option<String>,
}

/// Read-side filters for award search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct AwardFilters {
    #[builder(default, setter(strip_option))]
    pub start_date: Option<NaiveDate>,
    #[builder(default, setter(strip_option))]
    pub end_date: Option<NaiveDate>,
    #[builder(default, setter(strip_option, into))]
    pub agency_code: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub vendor_uei: Option<String>,
}

/// Aggregate view of a vendor's awards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub uei: String,
    pub cage_code: Option<String>,
    pub award_count: i64,
    pub total_obligated: f64,
    pub agency_count: i64,
    pub agencies: Vec<String>,
}

/// A single entry pulled from the Atom feed, before payload extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Feed-native entry id.
    pub id: String,
    pub title: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    /// Embedded FPDS XML payload. Empty when the entry carries no content.
    pub content: String,
}
